//! `Single`: owns at most one live order per side (§4.5).
//!
//! Reconciliation per call: no live order → submit; live order but target
//! price differs → replace; target is null → cancel. Replace is only
//! attempted while the order is in `{New, PartiallyFilled}` — while a prior
//! request is still in flight, this tick is a no-op.

use super::{order_type_for, Quoter, QuoterContext};
use crate::quote::Quote;
use async_trait::async_trait;
use lob_core::core::{OrderId, OrderStatus, Side};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct SingleQuoter {
    ctx: QuoterContext,
    post_only: bool,
    live_order_id: Option<OrderId>,
    live_quote: Option<Quote>,
}

impl SingleQuoter {
    pub fn new(ctx: QuoterContext, post_only: bool) -> Self {
        Self { ctx, post_only, live_order_id: None, live_quote: None }
    }

    async fn submit(&mut self, q: Quote) {
        let order_type = order_type_for(self.post_only);
        if let Some(id) = self.ctx.submit_new(q.price, q.quantity, order_type, self.post_only).await {
            self.live_order_id = Some(id);
            self.live_quote = Some(q);
        }
    }
}

#[async_trait]
impl Quoter for SingleQuoter {
    fn side(&self) -> Side {
        self.ctx.side
    }

    async fn update_quote(&mut self, target: Option<Quote>, _mid_price: Option<Decimal>, _is_buy_taker: bool) {
        match (self.live_order_id, target) {
            (None, Some(q)) => self.submit(q).await,
            (Some(id), Some(q)) => {
                let status = self.ctx.router.with_order(id, |o| o.status);
                match status {
                    Some(s) if s.is_terminal() => {
                        self.live_order_id = None;
                        self.live_quote = None;
                        self.submit(q).await;
                    }
                    Some(s) if s.is_replaceable() && self.live_quote != Some(q) => {
                        if self.ctx.replace(id, q.price, q.quantity).await {
                            self.live_quote = Some(q);
                        }
                    }
                    Some(OrderStatus::PartiallyFilled) | Some(OrderStatus::New) => {
                        // replaceable but target unchanged: nothing to do
                    }
                    _ => {
                        // a request is already in flight; wait for its report
                    }
                }
            }
            (Some(id), None) => {
                if self.ctx.cancel(id).await {
                    self.live_order_id = None;
                    self.live_quote = None;
                }
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

    fn ctx(gateway: Arc<MockOrderGateway>) -> QuoterContext {
        QuoterContext::new(
            Arc::new(lob_core::router::OrderRouter::new(1)),
            gateway,
            1,
            Arc::from("BTC-USDT"),
            Side::Buy,
            None,
        )
    }

    #[tokio::test]
    async fn submits_on_first_target_then_replaces_on_price_change() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = SingleQuoter::new(ctx(gw.clone()), true);

        let first = Quote { price: Price::from_ticks(100), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(first), None, false).await;
        assert_eq!(q.live_quote(), Some(first));
        assert_eq!(gw.new_order_calls().len(), 1);

        let second = Quote { price: Price::from_ticks(101), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(second), None, false).await;
        assert_eq!(q.live_quote(), Some(second));
        assert_eq!(gw.replace_calls().len(), 1, "price change triggers a replace, not a resubmit");
    }

    #[tokio::test]
    async fn null_target_cancels_live_order() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = SingleQuoter::new(ctx(gw.clone()), true);
        let quote = Quote { price: Price::from_ticks(100), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(quote), None, false).await;

        q.update_quote(None, None, false).await;
        assert_eq!(q.live_quote(), None);
        assert_eq!(gw.cancel_calls().len(), 1);
    }
}
