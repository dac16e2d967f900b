//! Domain-specific error types for the quoting pipeline
//!
//! Hot-path error types (`OverflowError`, `ConversionError`, `FillError`,
//! `OrderBookError`) use manual `Display`/`Error` impls so they stay
//! zero-cost to construct and match on. [`CoreError`] is the coarser,
//! `thiserror`-derived umbrella used at service boundaries (§7) where an
//! `anyhow`-friendly error is more useful than a tight enum.

use std::fmt;

/// Errors from checked fixed-point arithmetic on `Price`/`Quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowError {
    /// Overflow when adding to a `Quantity`.
    QuantityOverflow { old: i64, delta: i64 },
    /// Overflow when adding to a `Price`.
    PriceOverflow { old: i64, delta: i64 },
}

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowError::QuantityOverflow { old, delta } => {
                write!(f, "quantity overflow: {} + {} would exceed i64 limits", old, delta)
            }
            OverflowError::PriceOverflow { old, delta } => {
                write!(f, "price overflow: {} + {} would exceed i64 limits", old, delta)
            }
        }
    }
}

impl std::error::Error for OverflowError {}

/// Errors from decimal <-> fixed-point conversions at system boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Value is too large to represent in fixed-point.
    OutOfRange { value: f64 },
    /// Value is NaN.
    NotANumber,
    /// Value is infinite.
    Infinite { positive: bool },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::OutOfRange { value } => {
                write!(f, "value {} is out of range for fixed-point representation", value)
            }
            ConversionError::NotANumber => write!(f, "cannot convert NaN to fixed-point"),
            ConversionError::Infinite { positive } => {
                write!(f, "cannot convert {} infinity to fixed-point", if *positive { "positive" } else { "negative" })
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Errors applying a fill to an `Order` (§4.6 fill de-duplication).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillError {
    /// Fill quantity is zero.
    ZeroQuantity,
    /// Fill price is zero (would give away money).
    ZeroPrice,
    /// Execution id already recorded on this order — not an error, just a no-op signal.
    DuplicateExecution,
    /// Fill quantity exceeds the order's remaining leaves quantity.
    ExceedsRemaining { fill_qty: i64, leaves_qty: i64 },
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::ZeroQuantity => write!(f, "fill quantity cannot be zero"),
            FillError::ZeroPrice => write!(f, "fill price cannot be zero"),
            FillError::DuplicateExecution => write!(f, "execution id already recorded"),
            FillError::ExceedsRemaining { fill_qty, leaves_qty } => write!(
                f,
                "fill quantity {} exceeds leaves quantity {}",
                fill_qty, leaves_qty
            ),
        }
    }
}

impl std::error::Error for FillError {}

/// Errors from applying a `MarketDataEvent` to an `OrderBook` (§4.2, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBookError {
    /// `seq <= last_update_seq`; event silently dropped.
    StaleEvent { seq: u64, last_update_seq: u64 },
    /// `prev_seq` did not match the book's `last_update_seq`; book marked stale.
    SequenceGap { expected: u64, got_prev_seq: u64 },
    /// A new-level insert landed past `max_depth` on an already-full side.
    DepthExceeded,
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::StaleEvent { seq, last_update_seq } => {
                write!(f, "stale event: seq {} <= last_update_seq {}", seq, last_update_seq)
            }
            OrderBookError::SequenceGap { expected, got_prev_seq } => {
                write!(f, "sequence gap: expected prev_seq {}, got {}", expected, got_prev_seq)
            }
            OrderBookError::DepthExceeded => write!(f, "price worse than every tracked level at capacity"),
        }
    }
}

impl std::error::Error for OrderBookError {}

/// Coarse-grained error kinds named in §7, used at service boundaries
/// (router, instance manager, binaries) where `anyhow`/`thiserror` context
/// is more useful than the hot-path enums above.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("stale event dropped (seq {seq} <= last_update_seq {last_update_seq})")]
    StaleEvent { seq: u64, last_update_seq: u64 },

    #[error("sequence gap detected, awaiting snapshot (expected prev_seq {expected}, got {got})")]
    SequenceGap { expected: u64, got: u64 },

    #[error("failed to parse upstream feed message: {reason}")]
    ParseError { reason: String },

    #[error("ring buffer full, event dropped")]
    QueueFull,

    #[error("illegal order transition: {from} -> {attempted}")]
    IllegalOrderTransition { from: String, attempted: String },

    #[error("gateway rejected order: {reason}")]
    GatewayReject { reason: String },

    #[error("fair value unavailable: {reason}")]
    PriceUnavailable { reason: String },

    #[error("fatal structural invariant violation: {reason}")]
    Fatal { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_error_display() {
        let err = OverflowError::QuantityOverflow { old: i64::MAX - 100, delta: 200 };
        assert!(format!("{}", err).contains("overflow"));
    }

    #[test]
    fn conversion_error_display() {
        let err = ConversionError::OutOfRange { value: 1e20 };
        assert!(format!("{}", err).contains("out of range"));
    }

    #[test]
    fn fill_error_exceeds_remaining_display() {
        let err = FillError::ExceedsRemaining { fill_qty: 10, leaves_qty: 5 };
        assert!(format!("{}", err).contains("exceeds leaves quantity"));
    }

    #[test]
    fn core_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::QueueFull);
        assert_eq!(err.to_string(), "ring buffer full, event dropped");
    }
}
