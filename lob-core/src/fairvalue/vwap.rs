//! Volume-weighted fair value over the top-N levels of each side (§4.3).

use super::{FairValueChanged, FairValueProvider};
use crate::core::types::{Quantity, Side};
use crate::orderbook::{OrderBook, PriceLevel};
use rust_decimal::Decimal;

/// Volume-weighted average price over `levels`, or `None` if the levels
/// carry no quantity at all. Stops once `target_qty` has been filled so a
/// caller can cap VWAP to a notional window rather than the full depth.
pub fn calculate_vwap(levels: &[PriceLevel], tick_size: Decimal, target_qty: Quantity) -> Option<Decimal> {
    if levels.is_empty() || target_qty.is_zero_or_negative() {
        return None;
    }

    let mut remaining = target_qty;
    let mut notional = Decimal::ZERO;
    let mut filled = Quantity::ZERO;

    for lvl in levels {
        if remaining.is_zero_or_negative() {
            break;
        }
        let take = if lvl.total_qty.raw() < remaining.raw() { lvl.total_qty } else { remaining };
        notional += lvl.price.to_decimal(tick_size) * take.to_decimal();
        filled = filled + take;
        remaining = remaining - take;
    }

    if filled.is_zero_or_negative() {
        return None;
    }
    Some(notional / filled.to_decimal())
}

/// Midpoint of each side's VWAP over its top `depth` levels, capped at
/// `window_qty` notional per side (§4.3).
pub struct VwapMidpProvider {
    instrument_id: u64,
    tick_size: Decimal,
    depth: usize,
    window_qty: Quantity,
    last_value: Option<Decimal>,
}

impl VwapMidpProvider {
    pub fn new(instrument_id: u64, tick_size: Decimal, depth: usize, window_qty: Quantity) -> Self {
        Self { instrument_id, tick_size, depth, window_qty, last_value: None }
    }
}

impl FairValueProvider for VwapMidpProvider {
    fn instrument_id(&self) -> u64 {
        self.instrument_id
    }

    fn update(&mut self, book: &OrderBook, ts_micros: u64) -> Option<FairValueChanged> {
        let bid_vwap = calculate_vwap(book.get_top_levels(Side::Buy, self.depth), self.tick_size, self.window_qty)?;
        let ask_vwap = calculate_vwap(book.get_top_levels(Side::Sell, self.depth), self.tick_size, self.window_qty)?;
        let fv = (bid_vwap + ask_vwap) / Decimal::from(2);

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
    use crate::core::types::Price;

    fn level(price: i64, qty: i64) -> PriceLevel {
        PriceLevel::new(Price::from_ticks(price), Quantity::from_raw(qty), 0, 0)
    }

    #[test]
    fn vwap_weights_by_quantity() {
        let levels = vec![level(100, 1 * crate::core::types::QUANTITY_SCALE), level(200, 3 * crate::core::types::QUANTITY_SCALE)];
        let vwap = calculate_vwap(&levels, Decimal::ONE, Quantity::from_raw(4 * crate::core::types::QUANTITY_SCALE)).unwrap();
        assert_eq!(vwap, Decimal::from(175));
    }

    #[test]
    fn vwap_stops_at_target_quantity() {
        let levels = vec![level(100, 2 * crate::core::types::QUANTITY_SCALE), level(200, 2 * crate::core::types::QUANTITY_SCALE)];
        let vwap = calculate_vwap(&levels, Decimal::ONE, Quantity::from_raw(1 * crate::core::types::QUANTITY_SCALE)).unwrap();
        assert_eq!(vwap, Decimal::from(100), "window smaller than first level uses only that level's price");
    }

    #[test]
    fn vwap_none_on_empty_levels() {
        assert!(calculate_vwap(&[], Decimal::ONE, Quantity::from_raw(1)).is_none());
    }
}
