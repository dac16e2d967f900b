//! Fair-value providers: derive a single anchor price from an `OrderBook`
//! and notify only on material change (§4.3).
//!
//! All variants share one contract: `update(book)` recomputes FV and fires
//! `FairValueChanged` only when it materially changed. Called synchronously
//! on the distributor thread (§5) — the FV observed by a `QuotingEngine` is
//! always consistent with the book update that produced it.

pub mod grouped;
pub mod midp;
pub mod vwap;

use crate::orderbook::OrderBook;
use rust_decimal::Decimal;

pub use grouped::GroupedMidpProvider;
pub use midp::{BestPriceProvider, MidpProvider};
pub use vwap::{calculate_vwap, VwapMidpProvider};

/// Fired when a provider's fair value materially changes (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FairValueChanged {
    pub instrument_id: u64,
    pub fv: Decimal,
    pub ts_micros: u64,
}

/// Common fair-value provider contract (§4.3).
///
/// `update` is called once per relevant book change. Returning `None` means
/// either FV is currently undefined (§4.3 failure case: a side is empty) or
/// it was recomputed but did not materially change.
pub trait FairValueProvider: Send {
    fn instrument_id(&self) -> u64;
    fn update(&mut self, book: &OrderBook, ts_micros: u64) -> Option<FairValueChanged>;
    fn last_value(&self) -> Option<Decimal>;
}
