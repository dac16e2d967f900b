//! `FeedAdapter` (§6 inbound): the core never parses exchange wire formats.
//! An adapter turns some transport (WebSocket, shared memory, a replay file)
//! into [`MarketDataEvent`](crate::event::MarketDataEvent)s and
//! [`OrderStatusReport`](crate::core::OrderStatusReport)s pushed onto the
//! feed-reader thread's ring (§5 thread 1), and raises connection-state
//! changes the instance manager reacts to (§4.7).

use crate::core::OrderStatusReport;
use crate::event::MarketDataEvent;
use std::sync::Arc;

/// Raised when an adapter's upstream connection transitions (§4.7, §5
/// "cancellation & timeouts"). The instance manager retires every instance
/// quoting on `exchange` when `connected` goes false, and redeploys them
/// after a stabilisation delay once it goes true again.
#[derive(Debug, Clone)]
pub struct AdapterConnectionStateChanged {
    pub exchange: Arc<str>,
    pub connected: bool,
    pub reason: Option<Arc<str>>,
}

/// Delivery sink an adapter pushes events into. Implemented by whatever
/// owns the feed-reader-to-distributor ring (§4.1, §5); the adapter itself
/// only needs to know it can call `on_market_data`/`on_order_report`.
pub trait FeedEventSink: Send + Sync {
    fn on_market_data(&self, event: MarketDataEvent);
    fn on_order_report(&self, report: OrderStatusReport);
    fn on_connection_state_changed(&self, change: AdapterConnectionStateChanged);
}

/// An inbound market-data/execution-report source (§6). The wire format is
/// entirely the implementor's concern; the core only sees the typed events
/// delivered through the attached [`FeedEventSink`].
pub trait FeedAdapter: Send + Sync {
    /// Begin streaming the given symbols. Blocking reads happen on the
    /// feed-reader thread (§5 thread 1), not here; `start` only arms the
    /// adapter and returns once subscriptions are confirmed or rejected.
    fn start(&mut self, symbols: &[Arc<str>]) -> anyhow::Result<()>;

    /// Stop streaming and release any underlying transport resources.
    fn stop(&mut self) -> anyhow::Result<()>;

    fn subscribe(&mut self, topics: &[u32]) -> anyhow::Result<()>;

    fn unsubscribe(&mut self, topics: &[u32]) -> anyhow::Result<()>;

    /// Exchange identifier this adapter serves, used to scope
    /// [`AdapterConnectionStateChanged`] events to the right instances.
    fn exchange(&self) -> Arc<str>;
}
