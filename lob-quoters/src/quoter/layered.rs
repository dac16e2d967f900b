//! `Layered` (a.k.a. `OrdersOnGroup`): maintains a ladder of `depth` orders
//! centered on the target, spaced `grouping_bp` apart (§4.5). Layers are
//! built outermost-first, innermost-last, so the passive legs are already
//! resting by the time the most aggressive layer goes out. On a
//! significant move of the target price, every layer is cancelled; the
//! ladder is rebuilt from scratch on the next tick rather than reshuffled
//! in place.

use super::{order_type_for, Quoter, QuoterContext};
use crate::quote::Quote;
use async_trait::async_trait;
use lob_core::core::{OrderId, Price, Quantity, Side};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub struct LayeredQuoter {
    ctx: QuoterContext,
    tick_size: Decimal,
    depth: usize,
    grouping_bp: f64,
    post_only: bool,
    layers: Vec<Option<OrderId>>,
    center: Option<Price>,
    size: Quantity,
}

impl LayeredQuoter {
    pub fn new(ctx: QuoterContext, tick_size: Decimal, depth: usize, grouping_bp: f64, post_only: bool) -> Self {
        let depth = depth.max(1);
        Self {
            ctx,
            tick_size,
            depth,
            grouping_bp,
            post_only,
            layers: vec![None; depth],
            center: None,
            size: Quantity::ZERO,
        }
    }

    fn layer_spacing_ticks(&self, price: Price) -> i64 {
        let price_dec = price.to_decimal(self.tick_size);
        let bp = Decimal::from_f64_retain(self.grouping_bp).unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
        let spacing = price_dec * bp / Decimal::new(10_000, 0);
        (spacing / self.tick_size).round().to_i64().unwrap_or(1).max(1)
    }

    async fn rebuild(&mut self, target: Price, quantity: Quantity) {
        let spacing = self.layer_spacing_ticks(target);
        let sign: i64 = match self.ctx.side {
            Side::Buy => -1,
            Side::Sell => 1,
        };
        let order_type = order_type_for(self.post_only);
        // Outermost (largest offset) first, innermost (offset 0, the target
        // price itself) last.
        for i in (0..self.depth).rev() {
            let offset = sign * spacing * i as i64;
            let price = Price::from_ticks(target.ticks() + offset);
            if let Some(id) = self.ctx.submit_new(price, quantity, order_type, self.post_only).await {
                self.layers[i] = Some(id);
            }
        }
        self.center = Some(target);
        self.size = quantity;
    }

    async fn cancel_layers(&mut self) {
        for slot in self.layers.iter_mut() {
            if let Some(id) = slot.take() {
                self.ctx.cancel(id).await;
            }
        }
        self.center = None;
    }
}

#[async_trait]
impl Quoter for LayeredQuoter {
    fn side(&self) -> Side {
        self.ctx.side
    }

    async fn update_quote(&mut self, target: Option<Quote>, _mid_price: Option<Decimal>, _is_buy_taker: bool) {
        match (self.center, target) {
            (_, None) => self.cancel_layers().await,
            (None, Some(q)) => self.rebuild(q.price, q.quantity).await,
            (Some(center), Some(q)) => {
                let spacing = self.layer_spacing_ticks(q.price);
                let moved_ticks = (q.price.ticks() - center.ticks()).abs();
                if moved_ticks >= spacing {
                    // Significant move: cancel now, rebuild on the next tick
                    // once every layer has confirmed cancelled.
                    self.cancel_layers().await;
                }
            }
        }
    }

    async fn cancel_all(&mut self) {
        self.cancel_layers().await;
    }

    fn live_quote(&self) -> Option<Quote> {
        self.center.map(|price| Quote { price, quantity: self.size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lob_core::testing::MockOrderGateway;
    use std::sync::Arc;

    fn quoter(gw: Arc<MockOrderGateway>, depth: usize) -> LayeredQuoter {
        let ctx = QuoterContext::new(
            Arc::new(lob_core::router::OrderRouter::new(1)),
            gw,
            1,
            Arc::from("BTC-USDT"),
            Side::Buy,
            None,
        );
        LayeredQuoter::new(ctx, Decimal::new(1, 2), depth, 5.0, true)
    }

    #[tokio::test]
    async fn builds_outermost_first_and_innermost_last() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = quoter(gw.clone(), 3);
        let target = Quote { price: Price::from_ticks(100_00), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(target), None, false).await;

        let calls = gw.new_order_calls();
        assert_eq!(calls.len(), 3, "one order per layer");
        // Bid side: outermost (layer 2) has the lowest price, innermost
        // (layer 0, the target itself) the highest.
        assert!(calls[0].price.ticks() < calls[1].price.ticks());
        assert!(calls[1].price.ticks() < calls[2].price.ticks());
        assert_eq!(calls[2].price, target.price, "innermost layer rests at the target price");
    }

    #[tokio::test]
    async fn significant_move_cancels_the_whole_ladder() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = quoter(gw.clone(), 2);
        let first = Quote { price: Price::from_ticks(100_00), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(first), None, false).await;

        let far = Quote { price: Price::from_ticks(50_00), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(far), None, false).await;

        assert_eq!(gw.cancel_calls().len(), 2, "both layers cancelled on a large move");
        assert_eq!(q.live_quote(), None, "ladder is torn down, rebuilt on a later tick");
    }
}
