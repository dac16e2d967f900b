//! End-to-end requote scenarios with literal inputs, matching the exact
//! numbers worked through the quoting algorithm step by step: grouped
//! pricing, inventory skew, and pennying self-respect.

use lob_core::config::{FvModel, QuoterType, QuotingParameters};
use lob_core::core::{HittingLogic, Price, Quantity, Side};
use lob_core::event::{MarketDataEvent, MarketDataEventKind, PriceLevelEntry, UpdateBatch};
use lob_core::external::fx::BfsFxRateService;
use lob_core::orderbook::OrderBook;
use lob_quoters::market_maker::QuotingEngine;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn book_with_top(tick_size: rust_decimal::Decimal, bid: rust_decimal::Decimal, ask: rust_decimal::Decimal) -> OrderBook {
    let bid_ticks = Price::from_decimal(bid, tick_size).unwrap();
    let ask_ticks = Price::from_decimal(ask, tick_size).unwrap();
    let entries = vec![
        PriceLevelEntry { side: Side::Buy, price: bid_ticks, quantity: Quantity::from_raw(100) },
        PriceLevelEntry { side: Side::Sell, price: ask_ticks, quantity: Quantity::from_raw(100) },
    ];
    let mut book = OrderBook::new(1, 100);
    book.apply_event(&MarketDataEvent {
        prev_seq: 0,
        seq: 1,
        ts_micros: 0,
        kind: MarketDataEventKind::Snapshot,
        instrument_id: 1,
        exchange: Arc::from("test"),
        topic_id: 0,
        updates: UpdateBatch::from_slice(&entries),
    });
    book
}

fn base_params() -> QuotingParameters {
    QuotingParameters {
        instrument_id: 1,
        fv_instrument_id: 1,
        fv_model: FvModel::Midp,
        bid_spread_bp: -10.0,
        ask_spread_bp: 10.0,
        skew_bp: 2.0,
        size: dec!(100),
        depth: 1,
        bid_quoter_type: QuoterType::Single,
        ask_quoter_type: QuoterType::Single,
        post_only: true,
        max_cum_bid_fills: dec!(1_000_000),
        max_cum_ask_fills: dec!(1_000_000),
        hitting_logic: HittingLogic::AllowAll,
        grouping_bp: 0.0,
    }
}

/// §8 scenario 1: tick=0.5, grouping_bp=5, book bid 50000/ask 50010, FV=50005,
/// spreads -10/+10bp. Expected bid = 49950, ask = 50075 (both exact
/// multiples of the 25-tick-wide group).
#[test]
fn grouped_pricing_matches_the_worked_example() {
    let tick_size = dec!(0.5);
    let mut params = base_params();
    params.skew_bp = 0.0;
    params.grouping_bp = 5.0;
    let engine = QuotingEngine::new(params, tick_size, "USDT".to_string(), "USDT".to_string(), Duration::from_secs(3));

    let book = book_with_top(tick_size, dec!(50000), dec!(50010));
    let fx = BfsFxRateService::new(&[], vec![]);
    let pair = engine.compute_quote_pair(dec!(50005), &book, &fx);

    let bid = pair.bid.expect("bid quotes");
    let ask = pair.ask.expect("ask quotes");
    assert_eq!(bid.price.to_decimal(tick_size), dec!(49950));
    assert_eq!(ask.price.to_decimal(tick_size), dec!(50075));
}

/// §8 scenario 2: tick=0.5, size=100, skew_bp=2. One buy fill of qty 120
/// arrives (N_buy = floor(120/100) = 1, N_sell = 0, adj = 2*(0-1) = -2bp).
/// At the next FV=50001 the effective bid/ask spreads are both shifted by
/// -2bp from their -10/+10bp baseline, i.e. -12bp / +8bp.
#[test]
fn skew_shifts_both_spreads_by_the_same_amount_after_a_one_sided_fill() {
    let tick_size = dec!(0.5);
    let params = base_params(); // bid -10bp, ask +10bp, skew_bp 2, size 100
    let engine = QuotingEngine::new(params, tick_size, "USDT".to_string(), "USDT".to_string(), Duration::from_secs(3));
    engine.record_fill(Side::Buy, Quantity::from_decimal(dec!(120)).unwrap(), false);

    let book = book_with_top(tick_size, dec!(49900), dec!(50100));
    let fx = BfsFxRateService::new(&[], vec![]);
    let pair = engine.compute_quote_pair(dec!(50001), &book, &fx);

    let bid = pair.bid.expect("bid quotes");
    let ask = pair.ask.expect("ask quotes");

    // Effective spreads: bid -10-2=-12bp, ask +10-2=+8bp.
    let expected_bid = dec!(50001) * (rust_decimal::Decimal::ONE - dec!(0.0012));
    let expected_ask = dec!(50001) * (rust_decimal::Decimal::ONE + dec!(0.0008));
    let expected_bid_price = Price::from_decimal(expected_bid, tick_size).unwrap();
    let expected_ask_price = Price::from_decimal(expected_ask, tick_size).unwrap();

    assert_eq!(bid.price, expected_bid_price, "bid spread must shift by the full -2bp skew adjustment");
    assert_eq!(ask.price, expected_ask_price, "ask spread must shift by the same -2bp skew adjustment");
}

/// §8 scenario 6: market best bid = 10000. Our computed intent = 10002.
/// Under `Pennying` the emitted bid pulls to one tick inside the market
/// best: 10000.5 at tick_size=0.5. If our own resting order is already the
/// book's best bid at 10002 (i.e. already better than any outside quote),
/// the same logic leaves it unchanged rather than chasing itself tighter.
#[test]
fn pennying_pulls_to_one_tick_inside_market_best() {
    let tick_size = dec!(0.5);
    let mut params = base_params();
    params.bid_spread_bp = 0.0; // raw_bid == fv exactly, isolating the pennying step
    params.ask_spread_bp = 0.0;
    params.skew_bp = 0.0;
    params.hitting_logic = HittingLogic::Pennying;
    let engine = QuotingEngine::new(params, tick_size, "USDT".to_string(), "USDT".to_string(), Duration::from_secs(3));

    let book = book_with_top(tick_size, dec!(10000), dec!(10100));
    let fx = BfsFxRateService::new(&[], vec![]);
    let pair = engine.compute_quote_pair(dec!(10002), &book, &fx);

    let bid = pair.bid.expect("bid quotes");
    assert_eq!(bid.price.to_decimal(tick_size), dec!(10000.5), "pulled to one tick inside the market best bid");
}

#[test]
fn pennying_leaves_an_already_better_own_order_unchanged() {
    let tick_size = dec!(0.5);
    let mut params = base_params();
    params.bid_spread_bp = 0.0;
    params.ask_spread_bp = 0.0;
    params.skew_bp = 0.0;
    params.hitting_logic = HittingLogic::Pennying;
    let engine = QuotingEngine::new(params, tick_size, "USDT".to_string(), "USDT".to_string(), Duration::from_secs(3));

    // The book's best bid *is* our own resting order at 10002 — the target
    // computed from FV equals the market best exactly, so there is nothing
    // to pull inside of.
    let book = book_with_top(tick_size, dec!(10002), dec!(10100));
    let fx = BfsFxRateService::new(&[], vec![]);
    let pair = engine.compute_quote_pair(dec!(10002), &book, &fx);

    let bid = pair.bid.expect("bid quotes");
    assert_eq!(bid.price.to_decimal(tick_size), dec!(10002), "already at/better than market best, left unchanged");
}
