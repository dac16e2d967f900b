//! Simulated single-quoter demo (§2 data flow, end to end).
//!
//! Wires the whole pipeline with in-memory stand-ins for everything §6
//! declares external: a synthetic feed pushes `MarketDataEvent`s onto an
//! SPSC ring, a distributor loop drains it into an `OrderBook` and a
//! `Midp` fair-value provider, and a `QuotingEngine` driving two
//! `SingleQuoter`s submits against a `MockOrderGateway`. Not a
//! representative latency benchmark — just the cheapest rig that proves
//! the wiring in `lob-core`/`lob-quoters` actually fits together.

use clap::Parser;
use lob_bins::common::{init_logging, print_stats, setup_performance, CommonArgs, RunStats};
use lob_core::core::{Quantity, Side};
use lob_core::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
use lob_core::external::fx::BfsFxRateService;
use lob_core::fairvalue::{FairValueProvider, MidpProvider};
use lob_core::orderbook::{ApplyResult, OrderBook, DEFAULT_MAX_DEPTH};
use lob_core::ring::SpscRing;
use lob_core::router::OrderRouter;
use lob_core::testing::MockOrderGateway;
use lob_quoters::market_maker::{EngineFillObserver, MarketMaker, QuotingEngine};
use lob_quoters::quoter::{QuoterContext, SingleQuoter};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommonArgs::parse();
    init_logging(&args.log_level)?;
    setup_performance(args.cpu_core, args.realtime)?;

    let instrument_id = args.instrument_id;
    let tick_size = dec!(0.5);
    let book_name: Arc<str> = Arc::from("BTC-USDT");

    let ring: Arc<SpscRing<MarketDataEvent>> = Arc::new(SpscRing::with_capacity(1024));
    let dropped = Arc::new(AtomicU64::new(0));

    // Feed-reader thread (§5 thread 1): a deterministic random walk in
    // place of a real exchange WebSocket.
    {
        let ring = ring.clone();
        let dropped = dropped.clone();
        let ticks = args.ticks;
        std::thread::spawn(move || {
            let mut rng_state: u64 = 0x9E3779B97F4A7C15;
            let mut mid: i64 = 100_000; // ticks, i.e. 50_000.0 at tick_size=0.5
            let mut seq: u64 = 0;

            let mut next_rand = move || {
                rng_state ^= rng_state << 13;
                rng_state ^= rng_state >> 7;
                rng_state ^= rng_state << 17;
                rng_state
            };

            for i in 0..ticks {
                let step = ((next_rand() % 5) as i64) - 2; // -2..=2 ticks
                mid += step;
                seq += 1;
                let kind = if i == 0 { MarketDataEventKind::Snapshot } else { MarketDataEventKind::Update };
                let entries = vec![
                    PriceLevelEntry {
                        side: Side::Buy,
                        price: lob_core::core::Price::from_ticks(mid - 4),
                        quantity: Quantity::from_raw(5_000_000_00),
                    },
                    PriceLevelEntry {
                        side: Side::Sell,
                        price: lob_core::core::Price::from_ticks(mid + 4),
                        quantity: Quantity::from_raw(5_000_000_00),
                    },
                ];
                let evt = MarketDataEvent {
                    prev_seq: if i == 0 { 0 } else { seq - 1 },
                    seq,
                    ts_micros: seq,
                    kind,
                    instrument_id,
                    exchange: Arc::from("sim-exchange"),
                    topic_id: 0,
                    updates: UpdateBatch::from_slice(&entries),
                };
                if !ring.try_write(evt) {
                    dropped.fetch_add(1, Ordering::Relaxed);
                }
                std::thread::sleep(Duration::from_millis(2));
            }
        });
    }

    let gateway = Arc::new(MockOrderGateway::new());
    let router = Arc::new(OrderRouter::new(1));
    let engine = Arc::new(QuotingEngine::new(
        lob_core::config::ConfigProfile::testing(instrument_id, instrument_id),
        tick_size,
        "USDT".to_string(),
        "USDT".to_string(),
        Duration::from_secs(3),
    ));
    let observer: Arc<dyn lob_core::core::OrderObserver> = Arc::new(EngineFillObserver::new(engine.clone()));

    let bid_ctx = QuoterContext::new(router.clone(), gateway.clone(), instrument_id, book_name.clone(), Side::Buy, Some(observer.clone()));
    let ask_ctx = QuoterContext::new(router.clone(), gateway.clone(), instrument_id, book_name.clone(), Side::Sell, Some(observer));
    let bid_quoter = Box::new(SingleQuoter::new(bid_ctx, true));
    let ask_quoter = Box::new(SingleQuoter::new(ask_ctx, true));
    let mut market_maker = MarketMaker::new(engine.clone(), bid_quoter, ask_quoter);

    let fx = BfsFxRateService::new(&[], vec![("USD".to_string(), "USDT".to_string())]);
    let mut book = OrderBook::new(instrument_id, DEFAULT_MAX_DEPTH);
    let mut fv_provider = MidpProvider::new(instrument_id, tick_size);

    let mut stats = RunStats::default();

    loop {
        match ring.try_read() {
            Some(evt) => {
                stats.events_processed += 1;
                match book.apply_event(&evt) {
                    ApplyResult::Gap => {
                        stats.sequence_gaps += 1;
                        tracing::warn!(instrument_id, "sequence gap detected, awaiting snapshot");
                        continue;
                    }
                    ApplyResult::Stale => continue,
                    ApplyResult::Applied { .. } => {}
                }

                if let Some(fv_changed) = fv_provider.update(&book, evt.ts_micros) {
                    stats.fv_updates += 1;
                    market_maker.on_fair_value_changed(fv_changed, &book, &fx).await;
                    stats.quotes_sent += 1;
                }

                // Synthesize one partial fill midway through the run to
                // exercise the skew/inventory counters end to end (§4.4
                // step 3, §8 scenario 2) without a real exchange.
                if stats.events_processed == (args.ticks as u64) / 2 {
                    engine.record_fill(Side::Buy, Quantity::from_raw(100_000_000), false);
                }
            }
            None => {
                if stats.events_processed >= args.ticks as u64 {
                    break;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }

    stats.dropped_events = dropped.load(Ordering::Relaxed);
    print_stats(&stats);
    tracing::info!(bid_spread_bp = engine.params().bid_spread_bp, "run complete");
    Ok(())
}
