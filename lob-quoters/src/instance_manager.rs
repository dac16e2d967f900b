//! `QuotingInstanceManager` (§4.7): owns one [`MarketMaker`] per instrument
//! and reconciles configuration changes and exchange connectivity against
//! it.
//!
//! Deploy logic: no existing instance → construct inactive; an existing
//! instance whose parameters differ only in the "tunable" fields (spreads,
//! skew, size, fill caps, hitting logic, grouping) → retune in place and
//! flip `active` (so pushing the *same* parameters twice toggles the
//! instance off then back on — a deliberate pause/resume lever); anything
//! else differing → retire the old instance and construct a fresh one.
//!
//! Each instance lives behind `Arc<tokio::sync::Mutex<_>>` in a `DashMap`
//! keyed by instrument id. Call sites clone the `Arc` out and drop the map
//! guard before `.await`ing the instance lock, so one slow instrument never
//! blocks a `DashMap` shard other instruments share.
//!
//! An instance's `exchange` is additionally tracked in a parallel
//! `DashMap<u64, Arc<str>>`, outside the per-instance mutex. Deciding which
//! instances a connection-state change affects only ever needs that one
//! field, and an instance can be locked for the whole duration of a
//! requote's gateway round-trip (`on_fair_value_changed` holds the lock
//! across an `.await`) — gating membership on a `try_lock` of the instance
//! itself would let a mid-requote instance dodge retirement on disconnect
//! just because it happened to be busy.

use crate::market_maker::MarketMaker;
use dashmap::DashMap;
use lob_core::config::QuotingParameters;
use lob_core::external::fx::FxRateService;
use lob_core::external::AdapterConnectionStateChanged;
use lob_core::fairvalue::FairValueChanged;
use lob_core::orderbook::OrderBook;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

pub struct QuotingInstance {
    pub params: QuotingParameters,
    pub market_maker: MarketMaker,
    pub active: bool,
    pub exchange: Arc<str>,
}

/// Builds a fresh [`MarketMaker`] (and its backing [`crate::market_maker::QuotingEngine`]
/// and quoters) for a given parameter set. Supplied by the caller since
/// constructing the quoters needs the router/gateway/book wiring that lives
/// outside this module.
pub trait MarketMakerFactory: Send + Sync {
    fn build(&self, params: &QuotingParameters) -> MarketMaker;
}

impl<F> MarketMakerFactory for F
where
    F: Fn(&QuotingParameters) -> MarketMaker + Send + Sync,
{
    fn build(&self, params: &QuotingParameters) -> MarketMaker {
        self(params)
    }
}

pub struct QuotingInstanceManager {
    instances: DashMap<u64, Arc<Mutex<QuotingInstance>>>,
    /// Mirrors each instance's `exchange`, but lock-free and never held
    /// across an `.await` — see the module doc for why this can't just be
    /// read off the instance under a `try_lock`.
    exchange_by_instrument: DashMap<u64, Arc<str>>,
    factory: Arc<dyn MarketMakerFactory>,
}

impl QuotingInstanceManager {
    pub fn new(factory: Arc<dyn MarketMakerFactory>) -> Self {
        Self { instances: DashMap::new(), exchange_by_instrument: DashMap::new(), factory }
    }

    /// Deploy, retune, or retire-and-reconstruct the instance for
    /// `params.instrument_id`, per §4.7.
    pub async fn update_instance_parameters(&self, params: QuotingParameters, exchange: Arc<str>) {
        let existing = self.instances.get(&params.instrument_id).map(|e| e.clone());

        match existing {
            None => {
                let market_maker = self.factory.build(&params);
                let instrument_id = params.instrument_id;
                let instance = QuotingInstance { params, market_maker, active: false, exchange: exchange.clone() };
                self.instances.insert(instrument_id, Arc::new(Mutex::new(instance)));
                self.exchange_by_instrument.insert(instrument_id, exchange);
            }
            Some(slot) => {
                let mut guard = slot.lock().await;
                if guard.params.tunable_fields_eq(&params) {
                    guard.market_maker.engine.retune(params.clone());
                    guard.active = !guard.active;
                    guard.params = params;
                    guard.exchange = exchange.clone();
                    self.exchange_by_instrument.insert(guard.params.instrument_id, exchange);
                    info!(instrument_id = guard.params.instrument_id, active = guard.active, "retuned quoting instance in place");
                } else {
                    guard.market_maker.cancel_all().await;
                    let instrument_id = params.instrument_id;
                    let market_maker = self.factory.build(&params);
                    *guard = QuotingInstance { params, market_maker, active: true, exchange: exchange.clone() };
                    self.exchange_by_instrument.insert(instrument_id, exchange);
                    info!(instrument_id, "retired and reconstructed quoting instance");
                }
            }
        }
    }

    /// Deactivate an instance and cancel any live orders it holds, keeping
    /// the shell around so a later redeploy can reuse its fill counters.
    pub async fn retire_instance(&self, instrument_id: u64) {
        if let Some(slot) = self.instances.get(&instrument_id).map(|e| e.clone()) {
            let mut guard = slot.lock().await;
            guard.active = false;
            guard.market_maker.cancel_all().await;
        }
    }

    /// React to a feed adapter's connectivity flip (§4.7): on disconnect,
    /// retire every instance on that exchange immediately; on reconnect,
    /// wait `stabilisation_delay` before reactivating them, so a flapping
    /// connection doesn't thrash orders.
    pub async fn on_connection_state_changed(self: &Arc<Self>, event: AdapterConnectionStateChanged, stabilisation_delay: Duration) {
        let affected: Vec<u64> = self
            .exchange_by_instrument
            .iter()
            .filter(|e| *e.value() == event.exchange)
            .map(|e| *e.key())
            .collect();

        if !event.connected {
            for id in affected {
                self.retire_instance(id).await;
            }
            return;
        }

        let this = Arc::clone(self);
        let exchange = event.exchange.clone();
        tokio::spawn(async move {
            tokio::time::sleep(stabilisation_delay).await;
            for id in affected {
                if let Some(slot) = this.instances.get(&id).map(|e| e.clone()) {
                    let mut guard = slot.lock().await;
                    if guard.exchange == exchange {
                        guard.active = true;
                        info!(instrument_id = id, "reactivated quoting instance after reconnect stabilisation");
                    }
                }
            }
        });
    }

    pub async fn is_active(&self, instrument_id: u64) -> Option<bool> {
        let slot = self.instances.get(&instrument_id).map(|e| e.clone())?;
        let guard = slot.lock().await;
        Some(guard.active)
    }

    /// Forwards a fair-value update to `instrument_id`'s managed
    /// `MarketMaker`, the distributor-thread callback the instance manager
    /// exists to gate (§5 "FV → quote → order-submit"). A silent no-op if
    /// no instance is deployed, or it's inactive — retired instances must
    /// not resume quoting just because the book kept ticking.
    pub async fn on_fair_value_changed(&self, instrument_id: u64, event: FairValueChanged, quoted_book: &OrderBook, fx: &dyn FxRateService) {
        let Some(slot) = self.instances.get(&instrument_id).map(|e| e.clone()) else { return };
        let mut guard = slot.lock().await;
        if !guard.active {
            return;
        }
        guard.market_maker.on_fair_value_changed(event, quoted_book, fx).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_maker::QuotingEngine;
    use crate::quoter::LogQuoter;
    use lob_core::config::{FvModel, QuoterType};
    use lob_core::core::Side;
    use rust_decimal_macros::dec;
    use std::time::Duration as StdDuration;

    fn params(instrument_id: u64, bid_spread_bp: f64) -> QuotingParameters {
        QuotingParameters {
            instrument_id,
            fv_instrument_id: instrument_id,
            fv_model: FvModel::Midp,
            bid_spread_bp,
            ask_spread_bp: 10.0,
            skew_bp: 1.0,
            size: dec!(1),
            depth: 1,
            bid_quoter_type: QuoterType::Log,
            ask_quoter_type: QuoterType::Log,
            post_only: true,
            max_cum_bid_fills: dec!(100),
            max_cum_ask_fills: dec!(100),
            hitting_logic: lob_core::core::HittingLogic::AllowAll,
            grouping_bp: 0.0,
        }
    }

    struct LogFactory;
    impl MarketMakerFactory for LogFactory {
        fn build(&self, params: &QuotingParameters) -> MarketMaker {
            let engine = Arc::new(QuotingEngine::new(
                params.clone(),
                dec!(0.01),
                "USDT".to_string(),
                "USDT".to_string(),
                StdDuration::from_secs(3),
            ));
            MarketMaker::new(
                engine,
                Box::new(LogQuoter::new(params.instrument_id, Side::Buy)),
                Box::new(LogQuoter::new(params.instrument_id, Side::Sell)),
            )
        }
    }

    #[tokio::test]
    async fn first_deploy_is_inactive() {
        let mgr = QuotingInstanceManager::new(Arc::new(LogFactory));
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        assert_eq!(mgr.is_active(1).await, Some(false));
    }

    #[tokio::test]
    async fn repeating_identical_tunable_params_toggles_active() {
        let mgr = QuotingInstanceManager::new(Arc::new(LogFactory));
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        assert_eq!(mgr.is_active(1).await, Some(true));
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        assert_eq!(mgr.is_active(1).await, Some(false));
    }

    #[tokio::test]
    async fn core_field_change_reconstructs_and_activates() {
        let mgr = QuotingInstanceManager::new(Arc::new(LogFactory));
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        let mut changed = params(1, -10.0);
        changed.bid_quoter_type = QuoterType::Single;
        mgr.update_instance_parameters(changed, Arc::from("test-exchange")).await;
        assert_eq!(mgr.is_active(1).await, Some(true));
    }

    #[tokio::test]
    async fn disconnect_retires_every_instance_on_that_exchange() {
        let mgr = Arc::new(QuotingInstanceManager::new(Arc::new(LogFactory)));
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("ex-a")).await;
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("ex-a")).await;
        assert_eq!(mgr.is_active(1).await, Some(true));

        mgr.on_connection_state_changed(
            AdapterConnectionStateChanged { exchange: Arc::from("ex-a"), connected: false, reason: None },
            StdDuration::from_millis(10),
        )
        .await;
        assert_eq!(mgr.is_active(1).await, Some(false));
    }

    #[tokio::test]
    async fn fair_value_updates_only_reach_an_active_instance() {
        use crate::quoter::{QuoterContext, SingleQuoter};
        use lob_core::external::fx::BfsFxRateService;
        use lob_core::router::OrderRouter;
        use lob_core::testing::MockOrderGateway;

        struct SingleFactory {
            router: Arc<OrderRouter>,
            gateway: Arc<MockOrderGateway>,
        }

        impl MarketMakerFactory for SingleFactory {
            fn build(&self, params: &QuotingParameters) -> MarketMaker {
                let engine = Arc::new(QuotingEngine::new(
                    params.clone(),
                    dec!(1),
                    "USDT".to_string(),
                    "USDT".to_string(),
                    StdDuration::from_secs(3),
                ));
                let ctx = |side| QuoterContext::new(self.router.clone(), self.gateway.clone(), params.instrument_id, Arc::from("BTC-USDT"), side, None);
                MarketMaker::new(
                    engine,
                    Box::new(SingleQuoter::new(ctx(Side::Buy), false)),
                    Box::new(SingleQuoter::new(ctx(Side::Sell), false)),
                )
            }
        }

        let gateway = Arc::new(MockOrderGateway::new());
        let factory = Arc::new(SingleFactory { router: Arc::new(OrderRouter::new(1)), gateway: gateway.clone() });
        let mgr = QuotingInstanceManager::new(factory);

        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        let book = book_with_top(9_900, 10_100);
        let fx = BfsFxRateService::new(&[], vec![]);
        let event = FairValueChanged { instrument_id: 1, fv: dec!(10_000), ts_micros: 1 };

        // Deployed but inactive: no orders go out.
        mgr.on_fair_value_changed(1, event, &book, &fx).await;
        assert_eq!(gateway.new_order_calls().len(), 0);

        // Toggle active: the same update now reaches the market maker.
        mgr.update_instance_parameters(params(1, -10.0), Arc::from("test-exchange")).await;
        mgr.on_fair_value_changed(1, event, &book, &fx).await;
        assert!(!gateway.new_order_calls().is_empty());
    }

    fn book_with_top(bid: i64, ask: i64) -> OrderBook {
        use lob_core::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
        use lob_core::core::{Price, Quantity};

        let mut book = OrderBook::new(1, 100);
        let entries = vec![
            PriceLevelEntry { side: Side::Buy, price: Price::from_ticks(bid), quantity: Quantity::from_raw(100) },
            PriceLevelEntry { side: Side::Sell, price: Price::from_ticks(ask), quantity: Quantity::from_raw(100) },
        ];
        book.apply_event(&MarketDataEvent {
            prev_seq: 0,
            seq: 1,
            ts_micros: 0,
            kind: MarketDataEventKind::Snapshot,
            instrument_id: 1,
            exchange: Arc::from("test"),
            topic_id: 0,
            updates: UpdateBatch::from_slice(&entries),
        });
        book
    }
}
