//! One side (bid or ask) of an order book: a sorted, depth-bounded ladder of
//! [`PriceLevel`]s (§3, §4.2).
//!
//! Ordering is side-specific: bids sort descending by price (best = highest,
//! at index 0), asks sort ascending (best = lowest, at index 0). Both are
//! maintained by binary-search insert/evict so lookups and best-of queries
//! stay O(log N)/O(1) while updates are O(N) for the tail shift — acceptable
//! at the depths real exchanges quote (`max_depth` default 5000, §3).

use super::level::PriceLevel;
use crate::core::types::{Price, Quantity, Side};

pub struct BookSide {
    side: Side,
    levels: Vec<PriceLevel>,
    max_depth: usize,
}

impl BookSide {
    pub fn new(side: Side, max_depth: usize) -> Self {
        Self { side, levels: Vec::with_capacity(max_depth.min(256)), max_depth }
    }

    #[inline]
    fn order_key(&self, price: Price) -> std::cmp::Reverse<Price> {
        // Reverse(price) sorts ascending-by-key into descending-by-price —
        // exactly bid order. Reverse(-price) cancels back out to plain
        // ascending-by-price — ask order. Wrapping both arms in `Reverse`
        // keeps the match's two branches the same type.
        match self.side {
            Side::Buy => std::cmp::Reverse(price),
            Side::Sell => std::cmp::Reverse(-price),
        }
    }

    fn locate(&self, price: Price) -> Result<usize, usize> {
        let key = self.order_key(price);
        self.levels.binary_search_by_key(&key, |lvl| self.order_key(lvl.price))
    }

    /// Apply a single level update (§4.2 per-side update algorithm).
    ///
    /// Returns `false` only when a brand-new level would sort worse than
    /// every currently tracked level on an already-full side (rejected per
    /// §4.2: "price is worse than any tracked level").
    pub fn apply_update(&mut self, price: Price, quantity: Quantity, seq: u64, ts: u64) -> bool {
        match self.locate(price) {
            Ok(idx) => {
                if quantity.is_zero_or_negative() {
                    self.levels.remove(idx);
                } else {
                    let lvl = &mut self.levels[idx];
                    lvl.total_qty = quantity;
                    lvl.last_update_seq = seq;
                    lvl.last_update_ts = ts;
                }
                true
            }
            Err(idx) => {
                if quantity.is_zero_or_negative() {
                    return true;
                }
                if self.levels.len() >= self.max_depth {
                    if idx >= self.max_depth {
                        return false;
                    }
                    self.levels.pop();
                }
                self.levels.insert(idx, PriceLevel::new(price, quantity, seq, ts));
                true
            }
        }
    }

    /// Replace the side wholesale (§4.2 `Snapshot`). `levels` need not be
    /// pre-sorted; sortedness and the depth cap are enforced here.
    pub fn replace_all(&mut self, mut levels: Vec<PriceLevel>) {
        levels.retain(|l| !l.is_empty());
        levels.sort_by_key(|l| self.order_key(l.price));
        levels.dedup_by_key(|l| l.price);
        levels.truncate(self.max_depth);
        self.levels = levels;
    }

    #[inline]
    pub fn best(&self) -> Option<&PriceLevel> {
        self.levels.first()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Sum of `total_qty` across the top `n` levels.
    pub fn depth(&self, n: usize) -> Quantity {
        let n = n.min(self.levels.len());
        let mut total = Quantity::ZERO;
        for lvl in &self.levels[..n] {
            total = total + lvl.total_qty;
        }
        total
    }

    pub fn top_levels(&self, n: usize) -> &[PriceLevel] {
        let n = n.min(self.levels.len());
        &self.levels[..n]
    }

    /// `true` iff price strictly increases in stored (search) order from
    /// index 0 — i.e. the ladder really is sorted with no duplicates.
    #[cfg(test)]
    pub(crate) fn is_strictly_ordered(&self) -> bool {
        self.levels.windows(2).all(|w| self.order_key(w[0].price) < self.order_key(w[1].price))
    }
}
