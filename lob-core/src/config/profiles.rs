//! Named `QuotingParameters` presets (§9A), replacing the teacher's
//! Cargo-feature risk-profile matrix: this system has no compile-time
//! position-risk features, so profiles are expressed as plain builders
//! instead, selected at runtime (e.g. via CLI flag in `lob-bins`).

use super::types::{FvModel, QuotingParameters, QuoterType};
use crate::core::HittingLogic;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Which named preset to build a [`QuotingParameters`] from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileName {
    /// Wide spreads, small size, conservative fill caps — safe default for
    /// an unfamiliar instrument or a freshly reconnected exchange.
    Conservative,
    /// Tight spreads, larger size, pennying hitting logic — for a liquid
    /// instrument with a trusted feed.
    Aggressive,
    /// Minimal size and depth, used by integration tests and demo binaries.
    Testing,
}

impl ProfileName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Aggressive => "aggressive",
            Self::Testing => "testing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "conservative" => Some(Self::Conservative),
            "aggressive" => Some(Self::Aggressive),
            "testing" | "test" => Some(Self::Testing),
            _ => None,
        }
    }
}

/// Builds a [`QuotingParameters`] from a named profile for a given
/// instrument, overriding only what the profile cares about; the caller
/// still supplies the instrument/FV ids and grouping parameters.
pub struct ConfigProfile;

impl ConfigProfile {
    pub fn build(profile: ProfileName, instrument_id: u64, fv_instrument_id: u64) -> QuotingParameters {
        match profile {
            ProfileName::Conservative => Self::conservative(instrument_id, fv_instrument_id),
            ProfileName::Aggressive => Self::aggressive(instrument_id, fv_instrument_id),
            ProfileName::Testing => Self::testing(instrument_id, fv_instrument_id),
        }
    }

    pub fn conservative(instrument_id: u64, fv_instrument_id: u64) -> QuotingParameters {
        QuotingParameters {
            instrument_id,
            fv_instrument_id,
            fv_model: FvModel::Grouped,
            bid_spread_bp: -20.0,
            ask_spread_bp: 20.0,
            skew_bp: 1.0,
            size: dec!(0.01),
            depth: 1,
            bid_quoter_type: QuoterType::GroupedSingle,
            ask_quoter_type: QuoterType::GroupedSingle,
            post_only: true,
            max_cum_bid_fills: dec!(0.1),
            max_cum_ask_fills: dec!(0.1),
            hitting_logic: HittingLogic::OurBest,
            grouping_bp: 5.0,
        }
    }

    pub fn aggressive(instrument_id: u64, fv_instrument_id: u64) -> QuotingParameters {
        QuotingParameters {
            instrument_id,
            fv_instrument_id,
            fv_model: FvModel::VwapMidp,
            bid_spread_bp: -5.0,
            ask_spread_bp: 5.0,
            skew_bp: 3.0,
            size: dec!(0.5),
            depth: 3,
            bid_quoter_type: QuoterType::Layered,
            ask_quoter_type: QuoterType::Layered,
            post_only: false,
            max_cum_bid_fills: dec!(2.0),
            max_cum_ask_fills: dec!(2.0),
            hitting_logic: HittingLogic::Pennying,
            grouping_bp: 2.0,
        }
    }

    pub fn testing(instrument_id: u64, fv_instrument_id: u64) -> QuotingParameters {
        QuotingParameters {
            instrument_id,
            fv_instrument_id,
            fv_model: FvModel::Midp,
            bid_spread_bp: -10.0,
            ask_spread_bp: 10.0,
            skew_bp: 2.0,
            size: dec!(0.001),
            depth: 1,
            bid_quoter_type: QuoterType::Log,
            ask_quoter_type: QuoterType::Log,
            post_only: false,
            max_cum_bid_fills: Decimal::MAX,
            max_cum_ask_fills: Decimal::MAX,
            hitting_logic: HittingLogic::AllowAll,
            grouping_bp: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_name_round_trips_through_str() {
        for p in [ProfileName::Conservative, ProfileName::Aggressive, ProfileName::Testing] {
            assert_eq!(ProfileName::from_str(p.as_str()), Some(p));
        }
        assert_eq!(ProfileName::from_str("bogus"), None);
    }

    #[test]
    fn conservative_is_tighter_risk_than_aggressive() {
        let cons = ConfigProfile::conservative(1, 1);
        let aggr = ConfigProfile::aggressive(1, 1);
        assert!(cons.ask_spread_bp > aggr.ask_spread_bp, "conservative quotes wider");
        assert!(cons.max_cum_bid_fills < aggr.max_cum_bid_fills, "conservative caps inventory tighter");
        assert!(cons.post_only && !aggr.post_only);
    }
}
