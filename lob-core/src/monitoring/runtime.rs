//! Periodic structured-log reporter for the timer/monitor thread (§5 thread 5).
//!
//! Complements the Prometheus exporter with a human-readable status line at
//! a configurable interval — useful when nobody is scraping `/metrics` (e.g.
//! a paper-trading run watched over SSH).

use std::time::{Duration, Instant};
use tracing::info;

/// One instrument's worth of the §6 observability surface, as sampled by the
/// caller at report time.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstrumentReport {
    pub instrument_id: u64,
    pub events_per_sec: f64,
    pub dropped_events: u64,
    pub sequence_gaps: u64,
    pub best_bid: Option<i64>,
    pub best_ask: Option<i64>,
    pub buy_fills_total: u64,
    pub sell_fills_total: u64,
}

#[derive(Debug, Clone)]
pub struct RuntimeMonitorConfig {
    /// How often to emit the status report (ticks of the timer thread).
    pub log_interval_ticks: usize,
}

impl Default for RuntimeMonitorConfig {
    fn default() -> Self {
        Self { log_interval_ticks: 10 }
    }
}

/// Periodic status reporter. `on_tick` is expected to be called once per
/// timer-thread wakeup (§5); it logs a report every `log_interval_ticks`
/// ticks rather than on every call, so the timer can run at a tight interval
/// (e.g. cooldown-deadline checks) without spamming the log.
pub struct RuntimeMonitor {
    config: RuntimeMonitorConfig,
    start_time: Instant,
    tick_count: usize,
}

impl RuntimeMonitor {
    pub fn new(config: RuntimeMonitorConfig) -> Self {
        info!(
            log_interval_ticks = config.log_interval_ticks,
            "runtime monitor initialized"
        );
        Self { config, start_time: Instant::now(), tick_count: 0 }
    }

    /// Record a tick; returns `true` if this tick produced a report (the
    /// caller should call [`Self::report`] in that case).
    pub fn on_tick(&mut self) -> bool {
        self.tick_count += 1;
        self.tick_count % self.config.log_interval_ticks == 0
    }

    /// Emit one status line per instrument plus an overall summary.
    pub fn report(&self, instruments: &[InstrumentReport], active_instances: usize) {
        for r in instruments {
            info!(
                instrument_id = r.instrument_id,
                events_per_sec = r.events_per_sec,
                dropped_events = r.dropped_events,
                sequence_gaps = r.sequence_gaps,
                best_bid = ?r.best_bid,
                best_ask = ?r.best_ask,
                buy_fills_total = r.buy_fills_total,
                sell_fills_total = r.sell_fills_total,
                "instrument status"
            );
        }
        info!(
            tick = self.tick_count,
            uptime = %format_duration(self.start_time.elapsed()),
            active_instances,
            "runtime status"
        );
    }

    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_on_interval_only() {
        let mut monitor = RuntimeMonitor::new(RuntimeMonitorConfig { log_interval_ticks: 3 });
        let fired: Vec<bool> = (0..6).map(|_| monitor.on_tick()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn format_duration_buckets() {
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1h 1m 5s");
    }
}
