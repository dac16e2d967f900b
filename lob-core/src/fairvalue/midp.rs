//! Midp and BestMidp/OppositeBest fair-value providers (§4.3).

use super::{FairValueChanged, FairValueProvider};
use crate::core::types::Side;
use crate::orderbook::OrderBook;
use rust_decimal::Decimal;

/// `(best_bid + best_ask) / 2`. Undefined if either side is empty.
pub struct MidpProvider {
    instrument_id: u64,
    tick_size: Decimal,
    last_value: Option<Decimal>,
}

impl MidpProvider {
    pub fn new(instrument_id: u64, tick_size: Decimal) -> Self {
        Self { instrument_id, tick_size, last_value: None }
    }
}

impl FairValueProvider for MidpProvider {
    fn instrument_id(&self) -> u64 {
        self.instrument_id
    }

    fn update(&mut self, book: &OrderBook, ts_micros: u64) -> Option<FairValueChanged> {
        let mid = book.mid_price(self.tick_size)?;
        if self.last_value == Some(mid) {
            return None;
        }
        self.last_value = Some(mid);
        Some(FairValueChanged { instrument_id: self.instrument_id, fv: mid, ts_micros })
    }

    fn last_value(&self) -> Option<Decimal> {
        self.last_value
    }
}

/// Uses one side's own best price directly as FV (§4.3: "BestMidp /
/// OppositeBest: use best bid / best ask directly for one side") — e.g. to
/// anchor a quote to the opposing venue's best rather than its midpoint.
pub struct BestPriceProvider {
    instrument_id: u64,
    tick_size: Decimal,
    side: Side,
    last_value: Option<Decimal>,
}

impl BestPriceProvider {
    pub fn new(instrument_id: u64, tick_size: Decimal, side: Side) -> Self {
        Self { instrument_id, tick_size, side, last_value: None }
    }
}

impl FairValueProvider for BestPriceProvider {
    fn instrument_id(&self) -> u64 {
        self.instrument_id
    }

    fn update(&mut self, book: &OrderBook, ts_micros: u64) -> Option<FairValueChanged> {
        let best = match self.side {
            Side::Buy => book.best_bid(),
            Side::Sell => book.best_ask(),
        }?;
        let fv = best.to_decimal(self.tick_size);
        if self.last_value == Some(fv) {
            return None;
        }
        self.last_value = Some(fv);
        Some(FairValueChanged { instrument_id: self.instrument_id, fv, ts_micros })
    }

    fn last_value(&self) -> Option<Decimal> {
        self.last_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Price, Quantity};
    use crate::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn book_with(bid: i64, ask: i64) -> OrderBook {
        let mut book = OrderBook::new(1, 10);
        let entries = vec![
            PriceLevelEntry { side: Side::Buy, price: Price::from_ticks(bid), quantity: Quantity::from_raw(1) },
            PriceLevelEntry { side: Side::Sell, price: Price::from_ticks(ask), quantity: Quantity::from_raw(1) },
        ];
        book.apply_event(&MarketDataEvent {
            prev_seq: 0,
            seq: 1,
            ts_micros: 1,
            kind: MarketDataEventKind::Snapshot,
            instrument_id: 1,
            exchange: Arc::from("test"),
            topic_id: 0,
            updates: UpdateBatch::from_slice(&entries),
        });
        book
    }

    #[test]
    fn midp_fires_on_change_only() {
        let mut provider = MidpProvider::new(1, dec!(1));
        let book = book_with(100, 110);
        let first = provider.update(&book, 1);
        assert_eq!(first.unwrap().fv, dec!(105));
        let second = provider.update(&book, 2);
        assert!(second.is_none(), "unchanged FV must not refire");
    }

    #[test]
    fn best_price_provider_uses_own_best() {
        let mut provider = BestPriceProvider::new(1, dec!(1), Side::Buy);
        let book = book_with(100, 110);
        assert_eq!(provider.update(&book, 1).unwrap().fv, dec!(100));
    }

    #[test]
    fn undefined_when_one_side_empty() {
        let mut provider = MidpProvider::new(1, dec!(1));
        let book = OrderBook::new(1, 10);
        assert!(provider.update(&book, 1).is_none());
    }
}
