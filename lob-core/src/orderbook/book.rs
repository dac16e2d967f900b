//! Limit order book: a pair of [`BookSide`]s plus sequence bookkeeping and
//! gap-aware snapshot/delta application (§3, §4.2).

use super::level::PriceLevel;
use super::side::BookSide;
use crate::core::errors::OrderBookError;
use crate::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry};
use crate::resilience::gap_detector::GapDetector;
use rust_decimal::Decimal;
use crate::core::types::{Price, Quantity, Side};

pub const DEFAULT_MAX_DEPTH: usize = 5000;

/// Outcome of [`OrderBook::apply_event`]. Mirrors §7's coarse error kinds
/// for the book-specific subset (`StaleEvent`, `SequenceGap`); `Applied`
/// additionally reports how many of the batch's level updates were rejected
/// for exceeding depth (§4.2), which is not itself an error — those levels
/// were simply worse than every tracked level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum ApplyResult {
    Applied { depth_rejections: u32 },
    Stale,
    Gap,
}

/// A single instrument's limit order book. Owned exclusively by the
/// distributor thread (§5); other threads read it only through a snapshot.
pub struct OrderBook {
    pub instrument_id: u64,
    pub bids: BookSide,
    pub asks: BookSide,
    last_update_seq: u64,
    last_trade_seq: u64,
    /// Set on a sequence gap; cleared only by a `Snapshot` (§4.2).
    stale: bool,
    gap_detector: GapDetector,
}

impl OrderBook {
    pub fn new(instrument_id: u64, max_depth: usize) -> Self {
        Self {
            instrument_id,
            bids: BookSide::new(Side::Buy, max_depth),
            asks: BookSide::new(Side::Sell, max_depth),
            last_update_seq: 0,
            last_trade_seq: 0,
            stale: true,
            gap_detector: GapDetector::new(),
        }
    }

    pub fn last_update_seq(&self) -> u64 {
        self.last_update_seq
    }

    pub fn last_trade_seq(&self) -> u64 {
        self.last_trade_seq
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Apply one batched market-data event, idempotently (§4.2).
    pub fn apply_event(&mut self, evt: &MarketDataEvent) -> ApplyResult {
        if evt.kind != MarketDataEventKind::Snapshot {
            if self.stale {
                return ApplyResult::Gap;
            }
            if evt.seq <= self.last_update_seq {
                return ApplyResult::Stale;
            }
            if evt.prev_seq != self.last_update_seq {
                self.stale = true;
                return ApplyResult::Gap;
            }
        }

        self.gap_detector.check(evt.seq);

        match evt.kind {
            MarketDataEventKind::Snapshot => {
                self.apply_snapshot(evt.updates.as_slice());
                self.last_update_seq = evt.seq;
                self.stale = false;
                ApplyResult::Applied { depth_rejections: 0 }
            }
            MarketDataEventKind::Trade => {
                self.last_trade_seq = evt.seq;
                self.last_update_seq = evt.seq;
                ApplyResult::Applied { depth_rejections: 0 }
            }
            MarketDataEventKind::Add | MarketDataEventKind::Update | MarketDataEventKind::Delete => {
                let mut depth_rejections = 0u32;
                for entry in evt.updates.as_slice() {
                    let side = self.side_mut(entry.side);
                    if !side.apply_update(entry.price, entry.quantity, evt.seq, evt.ts_micros) {
                        depth_rejections += 1;
                    }
                }
                self.last_update_seq = evt.seq;
                ApplyResult::Applied { depth_rejections }
            }
        }
    }

    fn apply_snapshot(&mut self, entries: &[PriceLevelEntry]) {
        let mut bid_levels = Vec::new();
        let mut ask_levels = Vec::new();
        for e in entries {
            let lvl = PriceLevel::new(e.price, e.quantity, 0, 0);
            match e.side {
                Side::Buy => bid_levels.push(lvl),
                Side::Sell => ask_levels.push(lvl),
            }
        }
        self.bids.replace_all(bid_levels);
        self.asks.replace_all(ask_levels);
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best().map(|l| l.price)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best().map(|l| l.price)
    }

    /// Spread in ticks, `None` if either side is empty.
    pub fn spread_ticks(&self) -> Option<i64> {
        Some(self.best_ask()?.ticks() - self.best_bid()?.ticks())
    }

    /// Exact decimal midpoint, `None` if either side is empty (§4.3 failure
    /// case: FV is undefined when a side is empty).
    pub fn mid_price(&self, tick_size: Decimal) -> Option<Decimal> {
        let bid = self.best_bid()?.to_decimal(tick_size);
        let ask = self.best_ask()?.to_decimal(tick_size);
        Some((bid + ask) / Decimal::from(2))
    }

    pub fn depth(&self, side: Side, n: usize) -> Quantity {
        self.side(side).depth(n)
    }

    pub fn get_top_levels(&self, side: Side, n: usize) -> &[PriceLevel] {
        self.side(side).top_levels(n)
    }

    /// `true` iff the book currently respects the non-crossing invariant
    /// (§8): best-bid < best-ask, or one side is empty.
    pub fn is_non_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) => b < a,
            _ => true,
        }
    }

    pub fn error_for(&self, result: ApplyResult, evt: &MarketDataEvent) -> Option<OrderBookError> {
        match result {
            ApplyResult::Stale => Some(OrderBookError::StaleEvent { seq: evt.seq, last_update_seq: self.last_update_seq }),
            ApplyResult::Gap => Some(OrderBookError::SequenceGap { expected: self.last_update_seq, got_prev_seq: evt.prev_seq }),
            ApplyResult::Applied { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UpdateBatch;
    use std::sync::Arc;

    fn entry(side: Side, price: i64, qty: i64) -> PriceLevelEntry {
        PriceLevelEntry { side, price: Price::from_ticks(price), quantity: Quantity::from_raw(qty) }
    }

    fn snapshot(seq: u64, entries: Vec<PriceLevelEntry>) -> MarketDataEvent {
        MarketDataEvent {
            prev_seq: 0,
            seq,
            ts_micros: seq,
            kind: MarketDataEventKind::Snapshot,
            instrument_id: 1,
            exchange: Arc::from("test"),
            topic_id: 0,
            updates: UpdateBatch::from_slice(&entries),
        }
    }

    fn delta(prev_seq: u64, seq: u64, kind: MarketDataEventKind, entries: Vec<PriceLevelEntry>) -> MarketDataEvent {
        MarketDataEvent {
            prev_seq,
            seq,
            ts_micros: seq,
            kind,
            instrument_id: 1,
            exchange: Arc::from("test"),
            topic_id: 0,
            updates: UpdateBatch::from_slice(&entries),
        }
    }

    #[test]
    fn snapshot_bootstraps_book_and_clears_staleness() {
        let mut book = OrderBook::new(1, 10);
        assert!(book.is_stale());
        let evt = snapshot(10, vec![entry(Side::Buy, 100, 5), entry(Side::Sell, 105, 5)]);
        assert_eq!(book.apply_event(&evt), ApplyResult::Applied { depth_rejections: 0 });
        assert!(!book.is_stale());
        assert_eq!(book.best_bid(), Some(Price::from_ticks(100)));
        assert_eq!(book.best_ask(), Some(Price::from_ticks(105)));
        assert_eq!(book.last_update_seq(), 10);
    }

    #[test]
    fn delta_before_any_snapshot_is_a_gap() {
        let mut book = OrderBook::new(1, 10);
        let evt = delta(0, 1, MarketDataEventKind::Update, vec![entry(Side::Buy, 100, 5)]);
        assert_eq!(book.apply_event(&evt), ApplyResult::Gap);
    }

    #[test]
    fn gap_then_snapshot_recovers() {
        let mut book = OrderBook::new(1, 10);
        book.apply_event(&snapshot(10, vec![entry(Side::Buy, 100, 5), entry(Side::Sell, 105, 5)]));

        let gapped = delta(10, 15, MarketDataEventKind::Update, vec![entry(Side::Buy, 101, 5)]);
        assert_eq!(book.apply_event(&gapped), ApplyResult::Gap);
        assert!(book.is_stale());

        // further deltas are rejected while stale
        let still_stale = delta(15, 16, MarketDataEventKind::Update, vec![entry(Side::Buy, 102, 5)]);
        assert_eq!(book.apply_event(&still_stale), ApplyResult::Gap);

        let recovery = snapshot(20, vec![entry(Side::Buy, 200, 1), entry(Side::Sell, 205, 1)]);
        assert_eq!(book.apply_event(&recovery), ApplyResult::Applied { depth_rejections: 0 });
        assert!(!book.is_stale());
        assert_eq!(book.best_bid(), Some(Price::from_ticks(200)));
    }

    #[test]
    fn stale_duplicate_sequence_is_dropped() {
        let mut book = OrderBook::new(1, 10);
        book.apply_event(&snapshot(10, vec![entry(Side::Buy, 100, 5), entry(Side::Sell, 105, 5)]));
        let dup = delta(10, 10, MarketDataEventKind::Update, vec![entry(Side::Buy, 100, 9)]);
        assert_eq!(book.apply_event(&dup), ApplyResult::Stale);
        assert_eq!(book.best_bid().unwrap(), Price::from_ticks(100));
    }

    #[test]
    fn book_never_crosses_after_valid_updates() {
        let mut book = OrderBook::new(1, 10);
        book.apply_event(&snapshot(1, vec![entry(Side::Buy, 100, 5), entry(Side::Sell, 105, 5)]));
        book.apply_event(&delta(1, 2, MarketDataEventKind::Update, vec![entry(Side::Buy, 104, 3)]));
        assert!(book.is_non_crossed());
    }

    #[test]
    fn trade_event_only_advances_trade_sequence() {
        let mut book = OrderBook::new(1, 10);
        book.apply_event(&snapshot(1, vec![entry(Side::Buy, 100, 5), entry(Side::Sell, 105, 5)]));
        let trade = delta(1, 2, MarketDataEventKind::Trade, vec![]);
        book.apply_event(&trade);
        assert_eq!(book.last_trade_seq(), 2);
        assert_eq!(book.best_bid(), Some(Price::from_ticks(100)));
    }
}
