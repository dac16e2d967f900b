//! Prometheus metrics for the observability surface named in §6: per-instrument
//! throughput, dropped events, sequence gaps, best/spread, fill totals, and
//! active-instance count, plus the ring-buffer backpressure gauges the ambient
//! stack adds on top (queue depth / queue-full counts never named in §6 but
//! needed to operate the pipeline).

use prometheus::{GaugeVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};
use std::sync::Arc;

/// Top-level metrics registry. One instance per process, shared via `Arc`
/// with anything that needs to record a measurement.
pub struct MetricsRegistry {
    registry: Arc<Registry>,
    feed: Arc<FeedMetrics>,
    book: Arc<BookMetrics>,
    quoting: Arc<QuotingMetrics>,
    ring: Arc<RingMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());
        let feed = Arc::new(FeedMetrics::new(&registry)?);
        let book = Arc::new(BookMetrics::new(&registry)?);
        let quoting = Arc::new(QuotingMetrics::new(&registry)?);
        let ring = Arc::new(RingMetrics::new(&registry)?);
        Ok(Self { registry, feed, book, quoting, ring })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn feed(&self) -> &FeedMetrics {
        &self.feed
    }

    pub fn book(&self) -> &BookMetrics {
        &self.book
    }

    pub fn quoting(&self) -> &QuotingMetrics {
        &self.quoting
    }

    pub fn ring(&self) -> &RingMetrics {
        &self.ring
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new().expect("metrics registry registration should never fail on a fresh registry")
    }
}

/// Feed/distributor-facing counters (§6 observability surface, §7 error kinds).
pub struct FeedMetrics {
    /// Events received, labeled by instrument and event kind (`add`/`update`/`delete`/`trade`/`snapshot`).
    pub events_total: IntCounterVec,
    /// `QueueFull` drops (§7) and parse failures, labeled by instrument.
    pub dropped_events_total: IntCounterVec,
    /// `SequenceGap` occurrences (§7), labeled by instrument.
    pub sequence_gaps_total: IntCounterVec,
    /// `StaleEvent` occurrences (§7), labeled by instrument.
    pub stale_events_total: IntCounterVec,
}

impl FeedMetrics {
    fn new(registry: &Registry) -> prometheus::Result<Self> {
        let events_total = IntCounterVec::new(
            Opts::new("lob_feed_events_total", "Market data events applied, by instrument and kind"),
            &["instrument_id", "kind"],
        )?;
        let dropped_events_total = IntCounterVec::new(
            Opts::new("lob_feed_dropped_events_total", "Market data events dropped (queue full or parse error)"),
            &["instrument_id"],
        )?;
        let sequence_gaps_total = IntCounterVec::new(
            Opts::new("lob_feed_sequence_gaps_total", "Sequence gaps detected, by instrument"),
            &["instrument_id"],
        )?;
        let stale_events_total = IntCounterVec::new(
            Opts::new("lob_feed_stale_events_total", "Stale (already-seen) events rejected, by instrument"),
            &["instrument_id"],
        )?;

        registry.register(Box::new(events_total.clone()))?;
        registry.register(Box::new(dropped_events_total.clone()))?;
        registry.register(Box::new(sequence_gaps_total.clone()))?;
        registry.register(Box::new(stale_events_total.clone()))?;

        Ok(Self { events_total, dropped_events_total, sequence_gaps_total, stale_events_total })
    }
}

/// Order-book snapshot gauges (§6: "best/spread").
pub struct BookMetrics {
    pub best_bid: GaugeVec,
    pub best_ask: GaugeVec,
    pub spread_ticks: GaugeVec,
}

impl BookMetrics {
    fn new(registry: &Registry) -> prometheus::Result<Self> {
        let best_bid = GaugeVec::new(
            Opts::new("lob_book_best_bid", "Best bid price, in ticks, by instrument"),
            &["instrument_id"],
        )?;
        let best_ask = GaugeVec::new(
            Opts::new("lob_book_best_ask", "Best ask price, in ticks, by instrument"),
            &["instrument_id"],
        )?;
        let spread_ticks = GaugeVec::new(
            Opts::new("lob_book_spread_ticks", "Best ask minus best bid, in ticks, by instrument"),
            &["instrument_id"],
        )?;

        registry.register(Box::new(best_bid.clone()))?;
        registry.register(Box::new(best_ask.clone()))?;
        registry.register(Box::new(spread_ticks.clone()))?;

        Ok(Self { best_bid, best_ask, spread_ticks })
    }
}

/// Quoting-side counters and gauges (§6: "buy/sell fill totals, active-instance count").
pub struct QuotingMetrics {
    pub buy_fills_total: IntCounterVec,
    pub sell_fills_total: IntCounterVec,
    pub active_instances: IntGauge,
    /// `IllegalOrderTransition` / `GatewayReject` occurrences (§7), by instrument.
    pub order_rejects_total: IntCounterVec,
}

impl QuotingMetrics {
    fn new(registry: &Registry) -> prometheus::Result<Self> {
        let buy_fills_total = IntCounterVec::new(
            Opts::new("lob_quoting_buy_fills_total", "Cumulative quantity filled on the buy side, by instrument"),
            &["instrument_id"],
        )?;
        let sell_fills_total = IntCounterVec::new(
            Opts::new("lob_quoting_sell_fills_total", "Cumulative quantity filled on the sell side, by instrument"),
            &["instrument_id"],
        )?;
        let active_instances = IntGauge::new(
            "lob_quoting_active_instances",
            "Number of currently active quoting instances",
        )?;
        let order_rejects_total = IntCounterVec::new(
            Opts::new("lob_quoting_order_rejects_total", "Gateway rejections and illegal-transition requests, by instrument"),
            &["instrument_id"],
        )?;

        registry.register(Box::new(buy_fills_total.clone()))?;
        registry.register(Box::new(sell_fills_total.clone()))?;
        registry.register(Box::new(active_instances.clone()))?;
        registry.register(Box::new(order_rejects_total.clone()))?;

        Ok(Self { buy_fills_total, sell_fills_total, active_instances, order_rejects_total })
    }
}

/// Ring-buffer backpressure gauges — ambient addition (SPEC_FULL §9A), not
/// named explicitly in §6 but required to operate the pipeline in production.
pub struct RingMetrics {
    pub queue_full_total: IntCounterVec,
    pub queue_depth: IntGaugeVec,
}

impl RingMetrics {
    fn new(registry: &Registry) -> prometheus::Result<Self> {
        let queue_full_total = IntCounterVec::new(
            Opts::new("lob_ring_queue_full_total", "try_write rejections due to a full ring, by ring name"),
            &["ring"],
        )?;
        let queue_depth = IntGaugeVec::new(
            Opts::new("lob_ring_queue_depth", "Current occupied slots in a ring, by ring name"),
            &["ring"],
        )?;

        registry.register(Box::new(queue_full_total.clone()))?;
        registry.register(Box::new(queue_depth.clone()))?;

        Ok(Self { queue_full_total, queue_depth })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Encoder;

    #[test]
    fn registers_without_collision() {
        let registry = MetricsRegistry::new().unwrap();
        registry.feed().events_total.with_label_values(&["1", "update"]).inc();
        registry.book().best_bid.with_label_values(&["1"]).set(100.0);
        registry.quoting().active_instances.set(3);
        registry.ring().queue_depth.with_label_values(&["md_spsc"]).set(12);

        let encoder = prometheus::TextEncoder::new();
        let families = registry.registry().gather();
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("lob_feed_events_total"));
        assert!(text.contains("lob_book_best_bid"));
        assert!(text.contains("lob_quoting_active_instances 3"));
        assert!(text.contains("lob_ring_queue_depth"));
    }
}
