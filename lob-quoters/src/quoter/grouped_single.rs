//! `GroupedSingle`: like [`super::SingleQuoter`], but the target price has
//! already been quantized to the engine's frozen `N · tick_size` group
//! (§4.4 step 6), so a replace is skipped whenever the grouped price is
//! unchanged. Additionally, a partially filled order is cancelled rather
//! than chased once the new target drifts outside a ±3bp "near-mid" band
//! around the current midpoint (§4.5) — chasing a partial fill that far is
//! more likely to cross the spread than to improve the average price.

use super::{order_type_for, Quoter, QuoterContext};
use crate::quote::Quote;
use async_trait::async_trait;
use lob_core::core::{OrderId, OrderStatus, Side};
use rust_decimal::Decimal;

const NEAR_MID_BAND_BP: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

pub struct GroupedSingleQuoter {
    ctx: QuoterContext,
    tick_size: Decimal,
    post_only: bool,
    live_order_id: Option<OrderId>,
    live_quote: Option<Quote>,
}

impl GroupedSingleQuoter {
    pub fn new(ctx: QuoterContext, tick_size: Decimal, post_only: bool) -> Self {
        Self { ctx, tick_size, post_only, live_order_id: None, live_quote: None }
    }

    async fn submit(&mut self, q: Quote) {
        let order_type = order_type_for(self.post_only);
        if let Some(id) = self.ctx.submit_new(q.price, q.quantity, order_type, self.post_only).await {
            self.live_order_id = Some(id);
            self.live_quote = Some(q);
        }
    }

    async fn cancel_live(&mut self) {
        if let Some(id) = self.live_order_id.take() {
            self.ctx.cancel(id).await;
        }
        self.live_quote = None;
    }

    /// Distance between the target price and `mid`, in basis points.
    fn distance_bp(&self, price: lob_core::core::Price, mid: Decimal) -> Decimal {
        if mid.is_zero() {
            return Decimal::ZERO;
        }
        let price_dec = price.to_decimal(self.tick_size);
        ((price_dec - mid) / mid).abs() * Decimal::new(10_000, 0)
    }
}

#[async_trait]
impl Quoter for GroupedSingleQuoter {
    fn side(&self) -> Side {
        self.ctx.side
    }

    async fn update_quote(&mut self, target: Option<Quote>, mid_price: Option<Decimal>, _is_buy_taker: bool) {
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
                    Some(OrderStatus::PartiallyFilled) => {
                        let chasing_too_far = mid_price.is_some_and(|mid| self.distance_bp(q.price, mid) > NEAR_MID_BAND_BP);
                        if chasing_too_far {
                            self.cancel_live().await;
                        } else if self.live_quote.map(|lq| lq.price) != Some(q.price)
                            && self.ctx.replace(id, q.price, q.quantity).await
                        {
                            self.live_quote = Some(q);
                        }
                    }
                    Some(s) if s.is_replaceable() => {
                        if self.live_quote.map(|lq| lq.price) != Some(q.price) && self.ctx.replace(id, q.price, q.quantity).await {
                            self.live_quote = Some(q);
                        }
                    }
                    _ => {}
                }
            }
            (Some(_), None) => self.cancel_live().await,
            (None, None) => {}
        }
    }

    async fn cancel_all(&mut self) {
        self.cancel_live().await;
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
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn quoter(gw: Arc<MockOrderGateway>) -> GroupedSingleQuoter {
        let ctx = QuoterContext::new(
            Arc::new(lob_core::router::OrderRouter::new(1)),
            gw,
            1,
            Arc::from("BTC-USDT"),
            Side::Buy,
            None,
        );
        GroupedSingleQuoter::new(ctx, dec!(0.01), true)
    }

    #[tokio::test]
    async fn unchanged_grouped_price_does_not_replace() {
        let gw = Arc::new(MockOrderGateway::new());
        let mut q = quoter(gw.clone());
        let quote = Quote { price: Price::from_ticks(10_000), quantity: Quantity::from_raw(1) };
        q.update_quote(Some(quote), None, false).await;
        q.update_quote(Some(quote), None, false).await;
        assert_eq!(gw.replace_calls().len(), 0, "identical grouped price must not trigger a replace");
    }

    #[test]
    fn distance_bp_is_symmetric_around_mid() {
        let q = GroupedSingleQuoter::new(
            QuoterContext::new(
                Arc::new(lob_core::router::OrderRouter::new(1)),
                Arc::new(MockOrderGateway::new()),
                1,
                Arc::from("BTC-USDT"),
                Side::Buy,
                None,
            ),
            dec!(0.01),
            true,
        );
        let mid = dec!(100);
        let above = q.distance_bp(Price::from_decimal(dec!(101), dec!(0.01)).unwrap(), mid);
        let below = q.distance_bp(Price::from_decimal(dec!(99), dec!(0.01)).unwrap(), mid);
        assert_eq!(above, below);
    }
}
