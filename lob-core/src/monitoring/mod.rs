//! Observability surface (§6): Prometheus metrics export, an HTTP scrape
//! endpoint, and a periodic structured-log reporter.

pub mod metrics;
pub mod runtime;
pub mod server;

pub use metrics::{BookMetrics, FeedMetrics, MetricsRegistry, QuotingMetrics, RingMetrics};
pub use runtime::{RuntimeMonitor, RuntimeMonitorConfig};
pub use server::{MetricsServer, MetricsServerConfig};
