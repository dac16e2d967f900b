//! `Log`: a pure sink quoter used for testing (§4.5) — records the latest
//! intended quote and invokes lifecycle callbacks, but places no real order.

use super::Quoter;
use crate::quote::Quote;
use async_trait::async_trait;
use lob_core::core::Side;
use rust_decimal::Decimal;
use tracing::debug;

pub struct LogQuoter {
    instrument_id: u64,
    side: Side,
    last_quote: Option<Quote>,
    update_calls: usize,
    cancel_calls: usize,
}

impl LogQuoter {
    pub fn new(instrument_id: u64, side: Side) -> Self {
        Self { instrument_id, side, last_quote: None, update_calls: 0, cancel_calls: 0 }
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls
    }
}

#[async_trait]
impl Quoter for LogQuoter {
    fn side(&self) -> Side {
        self.side
    }

    async fn update_quote(&mut self, target: Option<Quote>, _mid_price: Option<Decimal>, _is_buy_taker: bool) {
        self.update_calls += 1;
        debug!(instrument_id = self.instrument_id, side = ?self.side, ?target, "log quoter recorded target");
        self.last_quote = target;
    }

    async fn cancel_all(&mut self) {
        self.cancel_calls += 1;
        self.last_quote = None;
    }

    fn live_quote(&self) -> Option<Quote> {
        self.last_quote
    }
}
