use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lob_core::core::types::{Price, Quantity, Side};
use lob_core::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
use lob_core::orderbook::OrderBook;
use std::sync::Arc;

fn entry(side: Side, price: i64, qty: i64) -> PriceLevelEntry {
    PriceLevelEntry { side, price: Price::from_ticks(price), quantity: Quantity::from_raw(qty) }
}

fn snapshot_event(seq: u64, depth: usize) -> MarketDataEvent {
    let mut entries = Vec::with_capacity(depth * 2);
    for i in 0..depth {
        entries.push(entry(Side::Buy, 100_000 - i as i64, 1_000_000));
        entries.push(entry(Side::Sell, 100_010 + i as i64, 1_000_000));
    }
    MarketDataEvent {
        prev_seq: 0,
        seq,
        ts_micros: seq,
        kind: MarketDataEventKind::Snapshot,
        instrument_id: 1,
        exchange: Arc::from("bench"),
        topic_id: 0,
        updates: UpdateBatch::from_slice(&entries),
    }
}

fn update_event(prev_seq: u64, seq: u64, price: i64, qty: i64) -> MarketDataEvent {
    MarketDataEvent {
        prev_seq,
        seq,
        ts_micros: seq,
        kind: MarketDataEventKind::Update,
        instrument_id: 1,
        exchange: Arc::from("bench"),
        topic_id: 0,
        updates: UpdateBatch::from_slice(&[entry(Side::Buy, price, qty)]),
    }
}

fn bench_snapshot_bootstrap(c: &mut Criterion) {
    c.bench_function("orderbook/apply_snapshot_50_levels", |b| {
        b.iter(|| {
            let mut book = OrderBook::new(1, 5000);
            black_box(book.apply_event(&snapshot_event(1, 50)));
        })
    });
}

fn bench_update_application(c: &mut Criterion) {
    let mut book = OrderBook::new(1, 5000);
    book.apply_event(&snapshot_event(1, 50));
    let mut seq = 1u64;

    c.bench_function("orderbook/apply_update_existing_price", |b| {
        b.iter(|| {
            seq += 1;
            black_box(book.apply_event(&update_event(seq - 1, seq, 100_000, 2_000_000)));
        })
    });
}

fn bench_insert_new_level(c: &mut Criterion) {
    let mut book = OrderBook::new(1, 5000);
    book.apply_event(&snapshot_event(1, 50));
    let mut seq = 1u64;
    let mut price = 99_949i64;

    c.bench_function("orderbook/insert_new_best_level", |b| {
        b.iter(|| {
            seq += 1;
            price += 1;
            black_box(book.apply_event(&update_event(seq - 1, seq, price, 1_000_000)));
        })
    });
}

fn bench_best_and_depth(c: &mut Criterion) {
    let mut book = OrderBook::new(1, 5000);
    book.apply_event(&snapshot_event(1, 50));

    c.bench_function("orderbook/best_bid_ask", |b| {
        b.iter(|| black_box((book.best_bid(), book.best_ask())))
    });

    c.bench_function("orderbook/depth_top_10", |b| {
        b.iter(|| black_box(book.depth(Side::Buy, 10)))
    });

    c.bench_function("orderbook/get_top_levels_10", |b| {
        b.iter(|| black_box(book.get_top_levels(Side::Buy, 10)))
    });
}

criterion_group!(
    benches,
    bench_snapshot_bootstrap,
    bench_update_application,
    bench_insert_new_level,
    bench_best_and_depth,
);
criterion_main!(benches);
