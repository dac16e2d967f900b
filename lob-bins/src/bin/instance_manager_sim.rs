//! Simulated instance-manager demo (§4.7): deploys a quoting instance
//! through `QuotingInstanceManager` + `StandardMarketMakerFactory` (so the
//! concrete `Quoter` variant comes from `QuotingParameters::bid_quoter_type`
//! / `ask_quoter_type` rather than being hardcoded, unlike the single- and
//! layered-quoter sims), then mid-run simulates an exchange disconnect and
//! reconnect to exercise the retire/redeploy path end to end.

use clap::Parser;
use lob_bins::common::{init_logging, print_stats, setup_performance, CommonArgs, RunStats};
use lob_core::config::{ConfigProfile, ProfileName};
use lob_core::core::{Quantity, Side};
use lob_core::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
use lob_core::external::fx::BfsFxRateService;
use lob_core::fairvalue::{FairValueProvider, MidpProvider};
use lob_core::orderbook::{ApplyResult, OrderBook, DEFAULT_MAX_DEPTH};
use lob_core::ring::SpscRing;
use lob_core::router::OrderRouter;
use lob_core::testing::MockOrderGateway;
use lob_quoters::instance_manager::QuotingInstanceManager;
use lob_quoters::StandardMarketMakerFactory;
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
    let exchange: Arc<str> = Arc::from("sim-exchange");
    let book_name: Arc<str> = Arc::from("BTC-USDT");

    let ring: Arc<SpscRing<MarketDataEvent>> = Arc::new(SpscRing::with_capacity(1024));
    let dropped = Arc::new(AtomicU64::new(0));

    {
        let ring = ring.clone();
        let dropped = dropped.clone();
        let ticks = args.ticks;
        let exchange = exchange.clone();
        std::thread::spawn(move || {
            let mut rng_state: u64 = 0xD1B54A32D192ED03;
            let mut mid: i64 = 100_000;
            let mut seq: u64 = 0;

            let mut next_rand = move || {
                rng_state ^= rng_state << 13;
                rng_state ^= rng_state >> 7;
                rng_state ^= rng_state << 17;
                rng_state
            };

            for i in 0..ticks {
                let step = ((next_rand() % 5) as i64) - 2;
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
                    exchange: exchange.clone(),
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
    let factory = Arc::new(StandardMarketMakerFactory::new(
        router,
        gateway,
        book_name,
        tick_size,
        "USDT".to_string(),
        "USDT".to_string(),
        Duration::from_secs(3),
    ));
    let manager = Arc::new(QuotingInstanceManager::new(factory));

    let params = ConfigProfile::build(ProfileName::Aggressive, instrument_id, instrument_id);
    // Two identical deploys: the first constructs inactive, the second activates (§4.7).
    manager.update_instance_parameters(params.clone(), exchange.clone()).await;
    manager.update_instance_parameters(params, exchange.clone()).await;

    let fx = BfsFxRateService::new(&[], vec![("USD".to_string(), "USDT".to_string())]);
    let mut book = OrderBook::new(instrument_id, DEFAULT_MAX_DEPTH);
    let mut fv_provider = MidpProvider::new(instrument_id, tick_size);

    let mut stats = RunStats::default();
    let disconnect_at = (args.ticks as u64) / 2;
    let mut disconnected = false;

    loop {
        match ring.try_read() {
            Some(evt) => {
                stats.events_processed += 1;
                match book.apply_event(&evt) {
                    ApplyResult::Gap => {
                        stats.sequence_gaps += 1;
                        continue;
                    }
                    ApplyResult::Stale => continue,
                    ApplyResult::Applied { .. } => {}
                }

                if stats.events_processed == disconnect_at && !disconnected {
                    disconnected = true;
                    tracing::warn!(%exchange, "simulating exchange disconnect");
                    manager
                        .on_connection_state_changed(
                            lob_core::external::AdapterConnectionStateChanged {
                                exchange: exchange.clone(),
                                connected: false,
                                reason: Some(Arc::from("simulated")),
                            },
                            Duration::from_millis(50),
                        )
                        .await;
                    manager
                        .on_connection_state_changed(
                            lob_core::external::AdapterConnectionStateChanged {
                                exchange: exchange.clone(),
                                connected: true,
                                reason: None,
                            },
                            Duration::from_millis(50),
                        )
                        .await;
                }

                if let Some(fv_changed) = fv_provider.update(&book, evt.ts_micros) {
                    stats.fv_updates += 1;
                    manager.on_fair_value_changed(instrument_id, fv_changed, &book, &fx).await;
                    stats.quotes_sent += 1;
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

    // Give the reconnect stabilisation task a chance to reactivate before exit.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let active = manager.is_active(instrument_id).await;

    stats.dropped_events = dropped.load(Ordering::Relaxed);
    print_stats(&stats);
    tracing::info!(?active, "instance manager run complete");
    Ok(())
}
