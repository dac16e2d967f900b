//! lob-core: the market-data to order-book to quoting pipeline.
//!
//! This crate holds the hard engineering of a high-frequency quoting system:
//! a lock-free ring buffer for wait-free handoff between threads, a sorted
//! limit order book with gap-aware snapshot+delta application, fair-value
//! providers with bp-quantized hysteresis, and the order lifecycle/router
//! that tolerates late exchange reports after cancel or fill.
//!
//! What it is *not*: exchange wire parsing, REST encoding, persistence, or
//! a strategy layer. Those live behind the traits in [`external`] and in the
//! `lob-quoters` crate, which consumes this one.
//!
//! ## Modules
//! - [`core`]: fixed-point scalars, order entity, connection FSM, errors.
//! - [`event`]: wire-level market data event model.
//! - [`ring`]: SPSC/MPSC lock-free ring buffers.
//! - [`orderbook`]: sorted price ladders and the gap-aware book.
//! - [`fairvalue`]: Midp/BestMidp/VwapMidp/Grouped fair-value providers.
//! - [`router`]: client order id assignment, report routing, lazy deregistration.
//! - [`external`]: trait seams for feed adapters, order gateways, instrument
//!   metadata, and FX conversion, plus reference implementations.
//! - [`resilience`]: gap detection and exponential backoff.
//! - [`monitoring`]: Prometheus metrics, HTTP exporter, periodic log reporter.
//! - [`config`]: compile-time constants and runtime (TOML) configuration.
//! - [`perf`]: CPU pinning, object pools, cache-aligned counters.
//! - [`utils`]: logging setup.
//! - [`testing`]: mock adapters/gateways and fixtures for downstream tests.

pub mod config;
pub mod core;
pub mod event;
pub mod external;
pub mod fairvalue;
pub mod monitoring;
pub mod orderbook;
pub mod perf;
pub mod resilience;
pub mod ring;
pub mod router;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use anyhow::{Error, Result};

/// Convenient imports for consumers of this crate (e.g. `lob-quoters`).
pub mod prelude {
    pub use crate::core::{
        CoreError, Fill, HittingLogic, Order, OrderId, OrderIdGenerator, OrderObserver,
        OrderOutcome, OrderParams, OrderStatus, OrderStatusReport, OrderType, Price, Quantity,
        ReportKind, Side,
    };
    pub use crate::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
    pub use crate::external::{
        AdapterConnectionStateChanged, FeedAdapter, FxRateService, Instrument,
        InstrumentRepository, OrderGateway,
    };
    pub use crate::fairvalue::{FairValueChanged, FairValueProvider};
    pub use crate::orderbook::{ApplyResult, OrderBook};
    pub use crate::router::OrderRouter;
    pub use crate::{Error, Result};
}
