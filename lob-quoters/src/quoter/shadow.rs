//! `Shadow` / `ShadowMaker`: aggressive hit-then-rest variants (§4.5).
//!
//! `Shadow` is IOC-like: it only ever submits while `is_buy_taker` signals a
//! genuine crossing opportunity, sent as `OrderType::Market` since this
//! system has no dedicated IOC flag, and cancels any unfilled remainder the
//! moment that opportunity passes. `ShadowMaker` instead rests a passive
//! limit order at the target and only cancels it when the target has moved
//! away from the resting price — i.e. when it has been outquoted and lost
//! price priority.

use super::{Quoter, QuoterContext};
use crate::quote::Quote;
use async_trait::async_trait;
use lob_core::core::{OrderId, OrderType, Side};
use rust_decimal::Decimal;

pub struct ShadowQuoter {
    ctx: QuoterContext,
    live_order_id: Option<OrderId>,
    live_quote: Option<Quote>,
}

impl ShadowQuoter {
    pub fn new(ctx: QuoterContext) -> Self {
        Self { ctx, live_order_id: None, live_quote: None }
    }
}

#[async_trait]
impl Quoter for ShadowQuoter {
    fn side(&self) -> Side {
        self.ctx.side
    }

    async fn update_quote(&mut self, target: Option<Quote>, _mid_price: Option<Decimal>, is_buy_taker: bool) {
        if let Some(id) = self.live_order_id {
            if !is_buy_taker || target.is_none() {
                // The crossing opportunity is gone; don't let the remainder rest.
                self.ctx.cancel(id).await;
                self.live_order_id = None;
                self.live_quote = None;
            }
        }

        if self.live_order_id.is_none() {
            if let Some(q) = target {
                if is_buy_taker {
                    if let Some(id) = self.ctx.submit_new(q.price, q.quantity, OrderType::Market, false).await {
                        self.live_order_id = Some(id);
                        self.live_quote = Some(q);
                    }
                }
            }
        }
    }

    async fn cancel_all(&mut self) {
        if let Some(id) = self.live_order_id.take() {
            self.ctx.cancel(id).await;
        }
        self.live_quote = None;
    }

    fn live_quote(&self) -> Option<Quote> {
        self.live_quote
    }
}

/// Rests passively at the target; only cancels (and, on the next tick,
/// resubmits) when the target price has moved away from the live order,
/// meaning it no longer holds price priority.
pub struct ShadowMakerQuoter {
    ctx: QuoterContext,
    post_only: bool,
    live_order_id: Option<OrderId>,
    live_quote: Option<Quote>,
}

impl ShadowMakerQuoter {
    pub fn new(ctx: QuoterContext, post_only: bool) -> Self {
        Self { ctx, post_only, live_order_id: None, live_quote: None }
    }

    async fn submit(&mut self, q: Quote) {
        let order_type = super::order_type_for(self.post_only);
        if let Some(id) = self.ctx.submit_new(q.price, q.quantity, order_type, self.post_only).await {
            self.live_order_id = Some(id);
            self.live_quote = Some(q);
        }
    }
}

#[async_trait]
impl Quoter for ShadowMakerQuoter {
    fn side(&self) -> Side {
        self.ctx.side
    }

    async fn update_quote(&mut self, target: Option<Quote>, _mid_price: Option<Decimal>, _is_buy_taker: bool) {
        match (self.live_order_id, target) {
            (None, Some(q)) => self.submit(q).await,
            (Some(id), Some(q)) => {
                let outquoted = self.live_quote.map(|lq| lq.price) != Some(q.price);
                if outquoted {
                    self.ctx.cancel(id).await;
                    self.live_order_id = None;
                    self.live_quote = None;
                    // Resubmission happens on the next tick, once the
                    // cancel has been confirmed off the book.
                }
            }
            (Some(id), None) => {
                self.ctx.cancel(id).await;
                self.live_order_id = None;
                self.live_quote = None;
            }
            (None, None) => {}
        }
    }

    async fn cancel_all(&mut self) {
        if let Some(id) = self.live_order_id.take() {
            self.ctx.cancel(id).await;
        }
        self.live_quote = None;
    }

    fn live_quote(&self) -> Option<Quote> {
        self.live_quote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lob_core::core::{Price, Quantity};
    use lob_core::testing::MockOrderGateway;
    use std::sync::Arc;

    fn ctx(gw: Arc<MockOrderGateway>) -> QuoterContext {
        QuoterContext::new(Arc::new(lob_core::router::OrderRouter::new(1)), gw, 1, Arc::from("BTC-USDT"), Side::Buy, None)
    }

    #[tokio::test]
    async fn shadow_only_takes_when_flagged_a_taker() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = ShadowQuoter::new(ctx(gw.clone()));
        let quote = Quote { price: Price::from_ticks(100), quantity: Quantity::from_raw(1) };

        q.update_quote(Some(quote), None, false).await;
        assert_eq!(gw.new_order_calls().len(), 0, "not flagged as a crossing opportunity yet");

        q.update_quote(Some(quote), None, true).await;
        assert_eq!(gw.new_order_calls().len(), 1);
        assert_eq!(gw.new_order_calls()[0].order_type, OrderType::Market);
    }

    #[tokio::test]
    async fn shadow_maker_cancels_only_when_outquoted() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = ShadowMakerQuoter::new(ctx(gw.clone()), true);
        let first = Quote { price: Price::from_ticks(100), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(first), None, false).await;
        q.update_quote(Some(first), None, false).await;
        assert_eq!(gw.cancel_calls().len(), 0, "unchanged target keeps the resting order in place");

        let moved = Quote { price: Price::from_ticks(105), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(moved), None, false).await;
        assert_eq!(gw.cancel_calls().len(), 1, "losing price priority cancels the resting order");
    }
}
