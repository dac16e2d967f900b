//! Grouped-midp fair value: quantizes the book to a tick group sized off the
//! instrument's own fair value, then fires only on a grouped-midpoint change
//! (§4.3). This trades off precision for fewer, more stable FV updates —
//! useful for quoters that would otherwise re-quote on every tick twitch.

use super::{FairValueChanged, FairValueProvider};
use crate::orderbook::OrderBook;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// `(grouped_bid + grouped_ask) / 2`, where the group size is locked on the
/// first successful tick to `max(1, round(raw_fv * 1bp / tick_size))` and
/// held fixed for the provider's lifetime (§4.3, §9 Open Question).
pub struct GroupedMidpProvider {
    instrument_id: u64,
    tick_size: Decimal,
    group_ticks: Option<i64>,
    last_value: Option<Decimal>,
}

impl GroupedMidpProvider {
    pub fn new(instrument_id: u64, tick_size: Decimal) -> Self {
        Self { instrument_id, tick_size, group_ticks: None, last_value: None }
    }

    fn lock_group_ticks(&mut self, raw_fv: Decimal) -> i64 {
        if let Some(g) = self.group_ticks {
            return g;
        }
        let one_bp = raw_fv * Decimal::new(1, 4);
        let ticks = (one_bp / self.tick_size).round().to_i64().unwrap_or(1).max(1);
        self.group_ticks = Some(ticks);
        ticks
    }
}

impl FairValueProvider for GroupedMidpProvider {
    fn instrument_id(&self) -> u64 {
        self.instrument_id
    }

    fn update(&mut self, book: &OrderBook, ts_micros: u64) -> Option<FairValueChanged> {
        let raw_bid = book.best_bid()?;
        let raw_ask = book.best_ask()?;
        let raw_fv = (raw_bid.to_decimal(self.tick_size) + raw_ask.to_decimal(self.tick_size)) / Decimal::from(2);

        let group = self.lock_group_ticks(raw_fv);
        let grouped_bid = raw_bid.floor_to(group);
        let grouped_ask = raw_ask.ceil_to(group);
        let fv = (grouped_bid.to_decimal(self.tick_size) + grouped_ask.to_decimal(self.tick_size)) / Decimal::from(2);

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
