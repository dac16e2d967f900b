//! Zero-overhead core types for the quoting pipeline
//!
//! All types in this module are designed for:
//! - Zero heap allocations
//! - Copy semantics
//! - Branchless fixed-point arithmetic
//!
//! Decimal arithmetic never appears on the hot path: `Price` and `Quantity`
//! are plain `i64` tick counts. Conversion to/from decimal is explicit and
//! happens only at the edges (parsing exchange messages, formatting for
//! display/logging) as required by the design notes.

use crate::core::errors::{ConversionError, OverflowError};
use rust_decimal::Decimal;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Fixed-point scale for `Quantity`: 1e-8 per tick, matching typical
/// exchange base-asset precision. Unlike `Price`, quantity scale is the
/// same across instruments, so it is a single global constant.
pub const QUANTITY_SCALE: i64 = 100_000_000;

/// A signed tick count denominated in an instrument's tick size.
///
/// `Price` carries no scale of its own — the scale is the instrument's
/// `minimum_price_variation` (tick size), supplied by the caller at the
/// decimal boundary. This keeps the type a bare `i64` in the hot path
/// (comparisons, arithmetic, array indexing) while still being unambiguous
/// once paired with an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Price(pub i64);

impl Price {
    #[inline(always)]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    #[inline(always)]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Convert to decimal using the instrument's tick size.
    #[inline]
    pub fn to_decimal(self, tick_size: Decimal) -> Decimal {
        Decimal::from(self.0) * tick_size
    }

    /// Convert from decimal, rounding to the nearest tick.
    ///
    /// Returns `None` if `tick_size` is zero or the result does not fit in
    /// an `i64`.
    #[inline]
    pub fn from_decimal(value: Decimal, tick_size: Decimal) -> Option<Self> {
        if tick_size.is_zero() {
            return None;
        }
        let ticks = (value / tick_size).round();
        ticks.to_string().parse::<i64>().ok().map(Self)
    }

    /// Round down to the nearest multiple of `step_ticks` ticks (bid side rounding).
    #[inline]
    pub fn floor_to(self, step_ticks: i64) -> Self {
        if step_ticks <= 1 {
            return self;
        }
        Self(self.0.div_euclid(step_ticks) * step_ticks)
    }

    /// Round up to the nearest multiple of `step_ticks` ticks (ask side rounding).
    #[inline]
    pub fn ceil_to(self, step_ticks: i64) -> Self {
        if step_ticks <= 1 {
            return self;
        }
        let floored = self.0.div_euclid(step_ticks) * step_ticks;
        if floored == self.0 {
            Self(floored)
        } else {
            Self(floored + step_ticks)
        }
    }

    #[inline(always)]
    pub fn checked_add(self, rhs: Self) -> Result<Self, OverflowError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(OverflowError::PriceOverflow { old: self.0, delta: rhs.0 })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}tick", self.0)
    }
}

impl Add for Price {
    type Output = Price;
    #[inline(always)]
    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Price;
    #[inline(always)]
    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl Neg for Price {
    type Output = Price;
    #[inline(always)]
    fn neg(self) -> Price {
        Price(-self.0)
    }
}

/// A signed fixed-point quantity at [`QUANTITY_SCALE`] (1e-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Quantity(pub i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    #[inline(always)]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline(always)]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline(always)]
    pub fn is_zero_or_negative(self) -> bool {
        self.0 <= 0
    }

    #[inline]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 0) / Decimal::new(QUANTITY_SCALE, 0)
    }

    #[inline]
    pub fn from_decimal(value: Decimal) -> Result<Self, ConversionError> {
        let scaled = value * Decimal::new(QUANTITY_SCALE, 0);
        let rounded = scaled.round();
        rounded
            .to_string()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ConversionError::OutOfRange {
                value: value.to_string().parse().unwrap_or(f64::NAN),
            })
    }

    #[inline(always)]
    pub fn checked_add(self, rhs: Self) -> Result<Self, OverflowError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(OverflowError::QuantityOverflow { old: self.0, delta: rhs.0 })
    }

    /// Clamp-at-zero subtraction used by fill accounting (§4.4): the
    /// opposite-side counter decrements but never goes negative.
    #[inline(always)]
    pub fn saturating_sub_clamped(self, rhs: Self) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Quantity {
    type Output = Quantity;
    #[inline(always)]
    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;
    #[inline(always)]
    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

/// Unique identifier for a client order.
///
/// Encodes `[timestamp_micros:64][order_source:16][counter:48]` in a single
/// u128 so IDs are monotonic-ish, collision free across threads, and carry
/// the issuing source for traceability (§4.6 router responsibilities)
/// without an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct OrderId(pub u128);

impl OrderId {
    #[inline(always)]
    pub const fn new(id: u128) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl From<u128> for OrderId {
    #[inline(always)]
    fn from(id: u128) -> Self {
        Self(id)
    }
}

/// Generates monotonic [`OrderId`]s, encoding an "order source" tag in the
/// high bits for traceability across components (§4.6).
///
/// Thread-safe: the counter is a per-generator atomic, so a single
/// `OrderIdGenerator` may be shared across feed/router/engine threads.
pub struct OrderIdGenerator {
    source: u16,
    counter: std::sync::atomic::AtomicU64,
}

impl OrderIdGenerator {
    pub fn new(source: u16) -> Self {
        Self {
            source,
            counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Generate the next id: `[timestamp_micros:64][source:16][counter:48]`.
    #[inline]
    pub fn next(&self) -> OrderId {
        use std::sync::atomic::Ordering;
        use std::time::{SystemTime, UNIX_EPOCH};

        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed) & 0x0000_FFFF_FFFF_FFFF;

        let id = ((ts as u128) << 64) | ((self.source as u128) << 48) | (counter as u128);
        OrderId(id)
    }
}

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    #[inline(always)]
    pub const fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type as sent to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderType {
    Limit = 0,
    Market = 1,
    PostOnly = 2,
}

/// Order status, per the lifecycle state machine in §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum OrderStatus {
    Pending = 0,
    NewRequest = 1,
    New = 2,
    PartiallyFilled = 3,
    ReplaceRequest = 4,
    CancelRequest = 5,
    Filled = 6,
    Cancelled = 7,
    Rejected = 8,
}

impl OrderStatus {
    /// Terminal statuses never transition further.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected)
    }

    /// Statuses in which `replace` is permitted (§4.6).
    #[inline]
    pub const fn is_replaceable(self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::PartiallyFilled)
    }

    /// Statuses in which `cancel` is permitted.
    #[inline]
    pub const fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::New | OrderStatus::PartiallyFilled | OrderStatus::NewRequest
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Hitting logic applied by the market maker when snapping a computed quote
/// against the market's current best (§4.4 step 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HittingLogic {
    /// Accept the computed price as-is.
    AllowAll,
    /// Cap our quote at the market's own best (never better than the book).
    OurBest,
    /// Improve by one tick inside the opposing best when we would otherwise cross it.
    Pennying,
}
