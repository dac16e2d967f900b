//! Single price-level record (§3).

use crate::core::types::{Price, Quantity};

/// One price level of a [`super::side::BookSide`]. `is_empty` and
/// `total_qty <= 0` are equivalent by invariant — an empty level never
/// persists inside a `BookSide`, it is removed instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Price,
    pub total_qty: Quantity,
    pub order_count: u32,
    pub last_update_seq: u64,
    pub last_update_ts: u64,
}

impl PriceLevel {
    pub fn new(price: Price, total_qty: Quantity, seq: u64, ts: u64) -> Self {
        Self { price, total_qty, order_count: 1, last_update_seq: seq, last_update_ts: ts }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total_qty.raw() <= 0
    }
}
