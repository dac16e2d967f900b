//! Common utilities shared by the demo binaries (§9A ambient stack): CLI
//! arg parsing, logging init, and CPU pinning, mirroring the teacher's
//! `bog-bins::common`.

use anyhow::Result;
use clap::Parser;
use lob_core::perf::cpu;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CLI arguments shared by every demo binary in this crate.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CommonArgs {
    /// Instrument id to quote
    #[arg(short, long, default_value = "1")]
    pub instrument_id: u64,

    /// CPU core to pin the distributor thread to (for latency stability)
    #[arg(short = 'c', long)]
    pub cpu_core: Option<usize>,

    /// Enable real-time scheduling priority (requires privileges)
    #[arg(long)]
    pub realtime: bool,

    /// Number of simulated market-data ticks to run before exiting
    #[arg(short, long, default_value = "50")]
    pub ticks: usize,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Initialize tracing/logging (§9A).
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}

/// Set up CPU affinity and real-time priority for the calling thread (§5, §9A).
pub fn setup_performance(cpu_core: Option<usize>, realtime: bool) -> Result<()> {
    if let Some(core) = cpu_core {
        cpu::pin_to_core(core)?;
        tracing::info!("pinned thread to CPU core {}", core);
    }

    #[cfg(target_os = "linux")]
    if realtime {
        cpu::set_realtime_priority(50)?;
        tracing::info!("enabled real-time priority");
    }

    #[cfg(not(target_os = "linux"))]
    if realtime {
        tracing::warn!("real-time priority only supported on Linux");
    }

    Ok(())
}

/// Final-run summary shared by the demo binaries' closing log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub events_processed: u64,
    pub fv_updates: u64,
    pub quotes_sent: u64,
    pub dropped_events: u64,
    pub sequence_gaps: u64,
}

pub fn print_stats(stats: &RunStats) {
    tracing::info!("=== final run statistics ===");
    tracing::info!("market-data events processed: {}", stats.events_processed);
    tracing::info!("fair-value updates: {}", stats.fv_updates);
    tracing::info!("quote requotes dispatched: {}", stats.quotes_sent);
    tracing::info!("dropped events: {}", stats.dropped_events);
    tracing::info!("sequence gaps: {}", stats.sequence_gaps);
}
