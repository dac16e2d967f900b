//! Runtime configuration types (§3 `QuotingParameters`, §9A ambient config).
//!
//! Split two ways, as in the teacher's two-tier philosophy: values that
//! gate the hot requote path live as `const` in [`super::constants`];
//! everything else — instrument list, per-instrument quoting parameters,
//! router/cooldown knobs, logging/metrics endpoints — is ordinary runtime
//! TOML, deserialized with `serde`.

use crate::core::HittingLogic;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which fair-value provider variant to instantiate for an instrument (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FvModel {
    Midp,
    BestMidp,
    VwapMidp,
    Grouped,
}

/// Which `Quoter` variant drives one side of a quote pair (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoterType {
    Log,
    Single,
    GroupedSingle,
    Layered,
    Shadow,
    ShadowMaker,
}

fn default_hitting_logic() -> HittingLogic {
    HittingLogic::AllowAll
}

/// `{instrument_id, fv_instrument_id, fv_model, ask_spread_bp, bid_spread_bp,
/// skew_bp, size, depth, bid_quoter_type, ask_quoter_type, post_only,
/// max_cum_bid_fills, max_cum_ask_fills, hitting_logic, grouping_bp}` (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotingParameters {
    pub instrument_id: u64,
    pub fv_instrument_id: u64,
    pub fv_model: FvModel,
    pub bid_spread_bp: f64,
    pub ask_spread_bp: f64,
    pub skew_bp: f64,
    pub size: Decimal,
    pub depth: usize,
    pub bid_quoter_type: QuoterType,
    pub ask_quoter_type: QuoterType,
    pub post_only: bool,
    pub max_cum_bid_fills: Decimal,
    pub max_cum_ask_fills: Decimal,
    #[serde(default = "default_hitting_logic")]
    pub hitting_logic: HittingLogic,
    pub grouping_bp: f64,
}

impl QuotingParameters {
    /// "Tunable" fields per §4.7: mutating only these does an in-place
    /// retune rather than a retire-and-reconstruct.
    pub fn tunable_fields_eq(&self, other: &Self) -> bool {
        self.instrument_id == other.instrument_id
            && self.fv_instrument_id == other.fv_instrument_id
            && self.fv_model == other.fv_model
            && self.bid_quoter_type == other.bid_quoter_type
            && self.ask_quoter_type == other.ask_quoter_type
            && self.depth == other.depth
            && self.post_only == other.post_only
    }
}

/// Lazy-deregistration router knobs (§4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_dereg_capacity")]
    pub deregistration_capacity: usize,
    /// Tag embedded in the high bits of generated order ids (§4.6).
    pub order_source: u16,
}

fn default_dereg_capacity() -> usize {
    crate::router::DEFAULT_DEREGISTRATION_CAPACITY
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { deregistration_capacity: default_dereg_capacity(), order_source: 1 }
    }
}

/// Cooldown after a full fill before the engine resumes quoting (§4.4, §8 scenario 3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooldownConfig {
    pub after_full_fill_secs: f64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { after_full_fill_secs: 3.0 }
    }
}

/// Logging/metrics endpoints (§9A ambient stack) — cold path, safe to reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
    #[serde(default = "default_runtime_log_interval_ticks")]
    pub runtime_log_interval_ticks: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_metrics_addr() -> String {
    "127.0.0.1:9090".to_string()
}
fn default_metrics_path() -> String {
    "/metrics".to_string()
}
fn default_runtime_log_interval_ticks() -> usize {
    10
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            metrics_addr: default_metrics_addr(),
            metrics_path: default_metrics_path(),
            runtime_log_interval_ticks: default_runtime_log_interval_ticks(),
        }
    }
}

/// Path to the §6 instrument metadata CSV plus the per-instrument quoting
/// parameters to deploy at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub instrument_csv_path: PathBuf,
    pub instruments: Vec<QuotingParameters>,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.instruments.is_empty() {
            anyhow::bail!("config must deploy at least one instrument's quoting parameters");
        }
        for p in &self.instruments {
            if p.size <= Decimal::ZERO {
                anyhow::bail!("instrument {}: size must be positive", p.instrument_id);
            }
            if p.depth == 0 {
                anyhow::bail!("instrument {}: depth must be at least 1", p.instrument_id);
            }
            if p.max_cum_bid_fills < Decimal::ZERO || p.max_cum_ask_fills < Decimal::ZERO {
                anyhow::bail!("instrument {}: max_cum_*_fills must be non-negative", p.instrument_id);
            }
        }
        if self.router.deregistration_capacity == 0 {
            anyhow::bail!("router.deregistration_capacity must be at least 1");
        }
        if self.cooldown.after_full_fill_secs < 0.0 {
            anyhow::bail!("cooldown.after_full_fill_secs must be non-negative");
        }
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.observability.log_level.as_str()) {
            anyhow::bail!("invalid log level '{}'", self.observability.log_level);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_params(instrument_id: u64) -> QuotingParameters {
        QuotingParameters {
            instrument_id,
            fv_instrument_id: instrument_id,
            fv_model: FvModel::Grouped,
            bid_spread_bp: -10.0,
            ask_spread_bp: 10.0,
            skew_bp: 2.0,
            size: dec!(0.01),
            depth: 3,
            bid_quoter_type: QuoterType::GroupedSingle,
            ask_quoter_type: QuoterType::GroupedSingle,
            post_only: true,
            max_cum_bid_fills: dec!(1.0),
            max_cum_ask_fills: dec!(1.0),
            hitting_logic: HittingLogic::Pennying,
            grouping_bp: 5.0,
        }
    }

    #[test]
    fn tunable_vs_core_field_classification() {
        let base = sample_params(1);
        let mut tuned = base.clone();
        tuned.bid_spread_bp = -20.0;
        tuned.skew_bp = 5.0;
        assert!(base.tunable_fields_eq(&tuned), "spread/skew changes are tunable (§4.7)");

        let mut core_change = base.clone();
        core_change.fv_model = FvModel::Midp;
        assert!(!base.tunable_fields_eq(&core_change), "fv_model change requires retire+reconstruct (§4.7)");
    }

    #[test]
    fn validate_rejects_empty_instrument_list() {
        let config = Config {
            instrument_csv_path: PathBuf::from("instruments.csv"),
            instruments: vec![],
            router: RouterConfig::default(),
            cooldown: CooldownConfig::default(),
            observability: ObservabilityConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_config() {
        let config = Config {
            instrument_csv_path: PathBuf::from("instruments.csv"),
            instruments: vec![sample_params(1)],
            router: RouterConfig::default(),
            cooldown: CooldownConfig::default(),
            observability: ObservabilityConfig::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config {
            instrument_csv_path: PathBuf::from("instruments.csv"),
            instruments: vec![sample_params(1), sample_params(2)],
            router: RouterConfig::default(),
            cooldown: CooldownConfig::default(),
            observability: ObservabilityConfig::default(),
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
