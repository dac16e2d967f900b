//! Two-tier configuration (§9A), mirroring the teacher's split between
//! compile-time and runtime settings:
//!
//! 1. **Compile-time** ([`constants`]): values that must be `const` to stay
//!    branchless in the requote/book-update hot path (ring capacity, default
//!    book depth, bp scale).
//! 2. **Runtime** ([`types::Config`]): everything that varies per deployment
//!    — instrument list, per-instrument [`types::QuotingParameters`], router
//!    and cooldown knobs, logging/metrics endpoints — loaded from a TOML
//!    file with `serde` + `toml` and validated before use (`Config::validate`
//!    lives on the type itself in [`types`]).
//!
//! [`profiles`] offers named [`types::QuotingParameters`] presets
//! (`conservative`, `aggressive`, `testing`) as a runtime stand-in for the
//! teacher's compile-time Cargo-feature risk profiles, since this system's
//! risk knobs (spreads, skew, fill caps) are deployment data, not constants.

pub mod constants;
pub mod profiles;
pub mod types;

pub use constants::*;
pub use profiles::{ConfigProfile, ProfileName};
pub use types::*;

use anyhow::Context;
use std::path::Path;

impl Config {
    /// Parse and validate a runtime config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::load_str(&text)
    }

    /// Parse and validate a runtime config from an already-loaded TOML string.
    pub fn load_str(text: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(text).context("parsing config TOML")?;
        config.validate().context("validating config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HittingLogic;
    use rust_decimal_macros::dec;

    #[test]
    fn load_str_rejects_invalid_config() {
        let bad = r#"
            instrument_csv_path = "instruments.csv"
            instruments = []
        "#;
        assert!(Config::load_str(bad).is_err(), "empty instrument list must fail validation (§9A)");
    }

    #[test]
    fn load_str_accepts_profile_built_config() {
        let params = ConfigProfile::conservative(1, 1);
        let config = Config {
            instrument_csv_path: "instruments.csv".into(),
            instruments: vec![params],
            router: RouterConfig::default(),
            cooldown: CooldownConfig::default(),
            observability: ObservabilityConfig::default(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::load_str(&text).unwrap();
        assert_eq!(parsed.instruments[0].hitting_logic, HittingLogic::OurBest);
        assert_eq!(parsed.instruments[0].size, dec!(0.01));
    }
}
