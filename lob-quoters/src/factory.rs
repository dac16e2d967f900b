//! Reference [`MarketMakerFactory`] that dispatches on `QuotingParameters`'s
//! `bid_quoter_type`/`ask_quoter_type` (§4.5, §4.7) to build the concrete
//! `Quoter` pair. `QuotingInstanceManager` takes its factory as a trait
//! object precisely so this dispatch lives outside `instance_manager`
//! itself — router/gateway/book-name wiring belongs to the application, not
//! the instance manager — but a real deployment (or a demo binary) still
//! needs *some* implementation of that dispatch, so this one is exported
//! for reuse instead of requiring every caller to reinvent it.

use crate::market_maker::{EngineFillObserver, MarketMaker, QuotingEngine};
use crate::quoter::{
    GroupedSingleQuoter, LayeredQuoter, LogQuoter, Quoter, QuoterContext, ShadowMakerQuoter, ShadowQuoter, SingleQuoter,
};
use lob_core::config::{QuoterType, QuotingParameters};
use lob_core::core::{OrderObserver, Side};
use lob_core::external::fx::Currency;
use lob_core::external::OrderGateway;
use lob_core::router::OrderRouter;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Builds a [`MarketMaker`] from [`QuotingParameters`] by matching each
/// side's `QuoterType` against the concrete `Quoter` variant it names.
pub struct StandardMarketMakerFactory {
    router: Arc<OrderRouter>,
    gateway: Arc<dyn OrderGateway>,
    book_name: Arc<str>,
    tick_size: Decimal,
    fv_currency: Currency,
    quote_currency: Currency,
    cooldown: Duration,
}

impl StandardMarketMakerFactory {
    pub fn new(
        router: Arc<OrderRouter>,
        gateway: Arc<dyn OrderGateway>,
        book_name: Arc<str>,
        tick_size: Decimal,
        fv_currency: Currency,
        quote_currency: Currency,
        cooldown: Duration,
    ) -> Self {
        Self { router, gateway, book_name, tick_size, fv_currency, quote_currency, cooldown }
    }

    fn build_side(&self, quoter_type: QuoterType, side: Side, instrument_id: u64, depth: usize, grouping_bp: f64, post_only: bool, observer: Arc<dyn OrderObserver>) -> Box<dyn Quoter> {
        let ctx = QuoterContext::new(self.router.clone(), self.gateway.clone(), instrument_id, self.book_name.clone(), side, Some(observer));
        match quoter_type {
            QuoterType::Log => Box::new(LogQuoter::new(instrument_id, side)),
            QuoterType::Single => Box::new(SingleQuoter::new(ctx, post_only)),
            QuoterType::GroupedSingle => Box::new(GroupedSingleQuoter::new(ctx, self.tick_size, post_only)),
            QuoterType::Layered => Box::new(LayeredQuoter::new(ctx, self.tick_size, depth, grouping_bp, post_only)),
            QuoterType::Shadow => Box::new(ShadowQuoter::new(ctx)),
            QuoterType::ShadowMaker => Box::new(ShadowMakerQuoter::new(ctx, post_only)),
        }
    }
}

impl crate::instance_manager::MarketMakerFactory for StandardMarketMakerFactory {
    fn build(&self, params: &QuotingParameters) -> MarketMaker {
        let engine = Arc::new(QuotingEngine::new(
            params.clone(),
            self.tick_size,
            self.fv_currency.clone(),
            self.quote_currency.clone(),
            self.cooldown,
        ));
        let observer: Arc<dyn OrderObserver> = Arc::new(EngineFillObserver::new(engine.clone()));
        let bid_quoter = self.build_side(
            params.bid_quoter_type,
            Side::Buy,
            params.instrument_id,
            params.depth,
            params.grouping_bp,
            params.post_only,
            observer.clone(),
        );
        let ask_quoter = self.build_side(
            params.ask_quoter_type,
            Side::Sell,
            params.instrument_id,
            params.depth,
            params.grouping_bp,
            params.post_only,
            observer,
        );
        MarketMaker::new(engine, bid_quoter, ask_quoter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance_manager::{MarketMakerFactory, QuotingInstanceManager};
    use lob_core::config::FvModel;
    use lob_core::core::HittingLogic;
    use lob_core::testing::MockOrderGateway;
    use rust_decimal_macros::dec;

    fn params(quoter_type: QuoterType) -> QuotingParameters {
        QuotingParameters {
            instrument_id: 1,
            fv_instrument_id: 1,
            fv_model: FvModel::Midp,
            bid_spread_bp: -10.0,
            ask_spread_bp: 10.0,
            skew_bp: 1.0,
            size: dec!(1),
            depth: 2,
            bid_quoter_type: quoter_type,
            ask_quoter_type: quoter_type,
            post_only: true,
            max_cum_bid_fills: dec!(100),
            max_cum_ask_fills: dec!(100),
            hitting_logic: HittingLogic::AllowAll,
            grouping_bp: 1.0,
        }
    }

    fn factory() -> StandardMarketMakerFactory {
        StandardMarketMakerFactory::new(
            Arc::new(OrderRouter::new(1)),
            Arc::new(MockOrderGateway::new()),
            Arc::from("BTC-USDT"),
            dec!(0.01),
            "USDT".to_string(),
            "USDT".to_string(),
            Duration::from_secs(3),
        )
    }

    #[test]
    fn builds_a_market_maker_for_every_quoter_type() {
        for qt in [
            QuoterType::Log,
            QuoterType::Single,
            QuoterType::GroupedSingle,
            QuoterType::Layered,
            QuoterType::Shadow,
            QuoterType::ShadowMaker,
        ] {
            let mm = factory().build(&params(qt));
            assert_eq!(mm.engine.params().bid_quoter_type, qt);
        }
    }

    #[tokio::test]
    async fn wires_through_the_instance_manager_end_to_end() {
        let mgr = QuotingInstanceManager::new(Arc::new(factory()));
        mgr.update_instance_parameters(params(QuoterType::Layered), Arc::from("test-exchange")).await;
        assert_eq!(mgr.is_active(1).await, Some(false));
        mgr.update_instance_parameters(params(QuoterType::Layered), Arc::from("test-exchange")).await;
        assert_eq!(mgr.is_active(1).await, Some(true));
    }
}
