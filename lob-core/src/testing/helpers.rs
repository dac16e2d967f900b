//! Deterministic fakes for the §6 external seams, retargeted from the
//! teacher's `testing::helpers` (Huginn snapshot/position/signal builders) at
//! this system's own `FeedAdapter` / `OrderGateway` traits, plus fixture
//! builders for market-data events and instrument rows used throughout
//! `lob-core` and `lob-quoters` tests.

use crate::core::types::{OrderId, Price, Quantity, Side};
use crate::core::OrderStatusReport;
use crate::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
use crate::external::feed::{AdapterConnectionStateChanged, FeedAdapter, FeedEventSink};
use crate::external::gateway::{CancelRequest, NewOrderRequest, OrderGateway, ReplaceRequest, SendResult};
use crate::external::instrument::Instrument;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Builds a `PriceLevelEntry` fixture.
pub fn entry(side: Side, price_ticks: i64, qty_raw: i64) -> PriceLevelEntry {
    PriceLevelEntry { side, price: Price::from_ticks(price_ticks), quantity: Quantity::from_raw(qty_raw) }
}

/// Builds a `Snapshot` `MarketDataEvent` fixture for `instrument_id`.
pub fn snapshot_event(instrument_id: u64, seq: u64, entries: Vec<PriceLevelEntry>) -> MarketDataEvent {
    MarketDataEvent {
        prev_seq: 0,
        seq,
        ts_micros: seq,
        kind: MarketDataEventKind::Snapshot,
        instrument_id,
        exchange: Arc::from("test-exchange"),
        topic_id: 0,
        updates: UpdateBatch::from_slice(&entries),
    }
}

/// Builds a delta (`Add`/`Update`/`Delete`/`Trade`) `MarketDataEvent` fixture.
pub fn delta_event(
    instrument_id: u64,
    prev_seq: u64,
    seq: u64,
    kind: MarketDataEventKind,
    entries: Vec<PriceLevelEntry>,
) -> MarketDataEvent {
    MarketDataEvent {
        prev_seq,
        seq,
        ts_micros: seq,
        kind,
        instrument_id,
        exchange: Arc::from("test-exchange"),
        topic_id: 0,
        updates: UpdateBatch::from_slice(&entries),
    }
}

/// A minimal `BTC/USDT`-shaped instrument fixture.
pub fn test_instrument(instrument_id: u64) -> Instrument {
    Instrument {
        instrument_id,
        market: "test-exchange".to_string(),
        symbol: "BTCUSDT".to_string(),
        product_type: "spot".to_string(),
        base_currency: "BTC".to_string(),
        quote_currency: "USDT".to_string(),
        minimum_price_variation: Decimal::new(1, 2),
        lot_size: Decimal::new(1, 5),
        contract_multiplier: Decimal::ONE,
        minimum_order_size: Decimal::new(1, 4),
    }
}

/// Builds an [`OrderId`] fixture for tests that need a stable id without
/// going through `OrderIdGenerator`.
pub fn fixed_order_id(n: u128) -> OrderId {
    OrderId::new(n)
}

/// A programmable [`FeedAdapter`] fixture. `start`/`stop`/`subscribe` calls
/// are recorded for assertions; test code drives market data and connection
/// state by calling [`MockFeedAdapter::push_event`] /
/// [`MockFeedAdapter::push_connection_state`] against an attached sink,
/// mirroring the teacher's programmable Huginn feed mock.
pub struct MockFeedAdapter {
    exchange: Arc<str>,
    sink: Mutex<Option<Arc<dyn FeedEventSink>>>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    subscribed_topics: Mutex<Vec<u32>>,
}

impl MockFeedAdapter {
    pub fn new(exchange: impl Into<Arc<str>>) -> Self {
        Self {
            exchange: exchange.into(),
            sink: Mutex::new(None),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            subscribed_topics: Mutex::new(Vec::new()),
        }
    }

    pub fn attach_sink(&self, sink: Arc<dyn FeedEventSink>) {
        *self.sink.lock() = Some(sink);
    }

    pub fn push_event(&self, event: MarketDataEvent) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.on_market_data(event);
        }
    }

    pub fn push_report(&self, report: OrderStatusReport) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.on_order_report(report);
        }
    }

    pub fn push_connection_state(&self, connected: bool, reason: Option<&str>) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.on_connection_state_changed(AdapterConnectionStateChanged {
                exchange: self.exchange.clone(),
                connected,
                reason: reason.map(Arc::from),
            });
        }
    }

    pub fn start_call_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_call_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn subscribed_topics(&self) -> Vec<u32> {
        self.subscribed_topics.lock().clone()
    }
}

impl FeedAdapter for MockFeedAdapter {
    fn start(&mut self, _symbols: &[Arc<str>]) -> anyhow::Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn subscribe(&mut self, topics: &[u32]) -> anyhow::Result<()> {
        self.subscribed_topics.lock().extend_from_slice(topics);
        Ok(())
    }

    fn unsubscribe(&mut self, topics: &[u32]) -> anyhow::Result<()> {
        self.subscribed_topics.lock().retain(|t| !topics.contains(t));
        Ok(())
    }

    fn exchange(&self) -> Arc<str> {
        self.exchange.clone()
    }
}

/// A programmable [`OrderGateway`] fixture: every call is recorded, and
/// responses default to immediate acceptance but can be overridden per-call
/// with [`MockOrderGateway::reject_next_new`] to exercise §7 gateway
/// rejections.
pub struct MockOrderGateway {
    new_calls: Mutex<Vec<NewOrderRequest>>,
    replace_calls: Mutex<Vec<ReplaceRequest>>,
    cancel_calls: Mutex<Vec<CancelRequest>>,
    reject_next_new: Mutex<bool>,
}

impl Default for MockOrderGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderGateway {
    pub fn new() -> Self {
        Self {
            new_calls: Mutex::new(Vec::new()),
            replace_calls: Mutex::new(Vec::new()),
            cancel_calls: Mutex::new(Vec::new()),
            reject_next_new: Mutex::new(false),
        }
    }

    pub fn reject_next_new(&self) {
        *self.reject_next_new.lock() = true;
    }

    pub fn new_order_calls(&self) -> Vec<NewOrderRequest> {
        self.new_calls.lock().clone()
    }

    pub fn replace_calls(&self) -> Vec<ReplaceRequest> {
        self.replace_calls.lock().clone()
    }

    pub fn cancel_calls(&self) -> Vec<CancelRequest> {
        self.cancel_calls.lock().clone()
    }
}

#[async_trait]
impl OrderGateway for MockOrderGateway {
    async fn send_new(&self, req: NewOrderRequest) -> SendResult {
        self.new_calls.lock().push(req);
        if std::mem::take(&mut *self.reject_next_new.lock()) {
            return SendResult::rejected("mock rejection");
        }
        SendResult::accepted()
    }

    async fn send_replace(&self, req: ReplaceRequest) -> SendResult {
        self.replace_calls.lock().push(req);
        SendResult::accepted()
    }

    async fn send_cancel(&self, req: CancelRequest) -> SendResult {
        self.cancel_calls.lock().push(req);
        SendResult::accepted()
    }
}
