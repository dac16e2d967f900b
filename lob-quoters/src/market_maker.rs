//! `QuotingEngine` + `MarketMaker`: the per-instrument computation and
//! dispatch loop described in §4.4.
//!
//! `QuotingEngine` is the pure-ish computation: given a fair value, the
//! quoted instrument's book, and an FX service, it produces a `QuotePair`
//! (or decides to skip the requote entirely). `MarketMaker` is the thin
//! shell around it that owns the two `Quoter`s and feeds their outputs.
//! Fill bookkeeping lives on the engine so a retune or a quoter swap never
//! loses the running inventory counters.

use crate::quote::Quote;
use crate::quoter::Quoter;
use lob_core::core::{HittingLogic, OrderObserver, Price, Quantity, Side};
use lob_core::external::fx::{Currency, FxRateService};
use lob_core::fairvalue::FairValueChanged;
use lob_core::orderbook::OrderBook;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-side output of [`QuotingEngine::compute_quote_pair`]. A `None` quote
/// means "cancel this side" — either it's inventory-capped out or a
/// precondition (FV unavailable) suppressed the whole requote.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotePair {
    pub bid: Option<Quote>,
    pub ask: Option<Quote>,
    pub bid_is_taker: bool,
    pub ask_is_taker: bool,
}

/// The computation half of one instrument's market-making logic (§4.4).
///
/// Inventory counters are plain `Decimal` behind a `Mutex` rather than true
/// atomics — `Decimal` has no lock-free atomic representation — but the
/// mutex is only ever held for the duration of a single read-modify-write,
/// matching the "consistent view via atomic loads" intent of §5.
pub struct QuotingEngine {
    params: RwLock<lob_core::config::QuotingParameters>,
    tick_size: Decimal,
    fv_currency: Currency,
    quote_currency: Currency,
    total_buy_fills: Mutex<Decimal>,
    total_sell_fills: Mutex<Decimal>,
    cooldown_until: Mutex<Option<Instant>>,
    cooldown: Duration,
}

impl QuotingEngine {
    pub fn new(
        params: lob_core::config::QuotingParameters,
        tick_size: Decimal,
        fv_currency: Currency,
        quote_currency: Currency,
        cooldown: Duration,
    ) -> Self {
        Self {
            params: RwLock::new(params),
            tick_size,
            fv_currency,
            quote_currency,
            total_buy_fills: Mutex::new(Decimal::ZERO),
            total_sell_fills: Mutex::new(Decimal::ZERO),
            cooldown_until: Mutex::new(None),
            cooldown,
        }
    }

    pub fn params(&self) -> lob_core::config::QuotingParameters {
        self.params.read().clone()
    }

    /// Swap in new tunable parameters (§4.7 in-place retune).
    pub fn retune(&self, params: lob_core::config::QuotingParameters) {
        *self.params.write() = params;
    }

    fn is_paused(&self) -> bool {
        match *self.cooldown_until.lock() {
            Some(until) => Instant::now() < until,
            None => false,
        }
    }

    /// Fill accounting (§4.4): the same-side counter accumulates, the
    /// opposite-side counter decays toward zero, and a full fill arms the
    /// post-fill cooldown.
    pub fn record_fill(&self, side: Side, quantity: Quantity, fully_filled: bool) {
        let qty = quantity.to_decimal();
        let (same, opposite) = match side {
            Side::Buy => (&self.total_buy_fills, &self.total_sell_fills),
            Side::Sell => (&self.total_sell_fills, &self.total_buy_fills),
        };
        *same.lock() += qty;
        let mut opp = opposite.lock();
        *opp = (*opp - qty).max(Decimal::ZERO);
        drop(opp);

        if fully_filled {
            let until = Instant::now() + self.cooldown;
            *self.cooldown_until.lock() = Some(until);
            debug!(?side, seconds = self.cooldown.as_secs_f64(), "full fill, entering cooldown");
        }
    }

    /// The §4.4 nine-step computation. Returns an all-`None` pair while
    /// paused or when FV can't be converted into the quoted currency.
    pub fn compute_quote_pair(&self, fv: Decimal, quoted_book: &OrderBook, fx: &dyn FxRateService) -> QuotePair {
        if self.is_paused() {
            return QuotePair::default();
        }

        let converted_fv = if self.fv_currency == self.quote_currency {
            Some(fv)
        } else {
            fx.convert(fv, &self.fv_currency, &self.quote_currency)
        };
        let Some(fv) = converted_fv else {
            debug!(from = %self.fv_currency, to = %self.quote_currency, "fx path unavailable, skipping requote");
            return QuotePair::default();
        };

        let params = self.params.read().clone();
        let size = params.size;
        let total_buy = *self.total_buy_fills.lock();
        let total_sell = *self.total_sell_fills.lock();

        let n_buy = if size.is_zero() { Decimal::ZERO } else { (total_buy / size).floor() };
        let n_sell = if size.is_zero() { Decimal::ZERO } else { (total_sell / size).floor() };
        let adj_bp = rust_decimal::prelude::ToPrimitive::to_f64(&(n_sell - n_buy)).unwrap_or(0.0) * params.skew_bp;

        let effective_bid_spread_bp = params.bid_spread_bp + adj_bp;
        let effective_ask_spread_bp = params.ask_spread_bp + adj_bp;

        let raw_bid = fv * (Decimal::ONE + Decimal::try_from(effective_bid_spread_bp / 10_000.0).unwrap_or(Decimal::ZERO));
        let raw_ask = fv * (Decimal::ONE + Decimal::try_from(effective_ask_spread_bp / 10_000.0).unwrap_or(Decimal::ZERO));

        let Some(mut bid_price) = Price::from_decimal(raw_bid, self.tick_size) else {
            return QuotePair::default();
        };
        let Some(mut ask_price) = Price::from_decimal(raw_ask, self.tick_size) else {
            return QuotePair::default();
        };
        // Bid rounds down, ask rounds up: quoting never crosses its own raw target.
        bid_price = bid_price.floor_to(1);
        ask_price = ask_price.ceil_to(1);

        if params.grouping_bp > 0.0 {
            let group_ticks = group_step_ticks(fv, params.grouping_bp, self.tick_size);
            bid_price = bid_price.floor_to(group_ticks);
            ask_price = ask_price.ceil_to(group_ticks);
        }

        let mut bid_is_taker = false;
        let mut ask_is_taker = false;
        if let Some(best_bid) = quoted_book.best_bid() {
            bid_is_taker = bid_price > best_bid;
        }
        if let Some(best_ask) = quoted_book.best_ask() {
            ask_is_taker = ask_price < best_ask;
        }

        match params.hitting_logic {
            HittingLogic::AllowAll => {}
            HittingLogic::OurBest => {
                if let Some(best_bid) = quoted_book.best_bid() {
                    bid_price = bid_price.min(best_bid);
                }
                if let Some(best_ask) = quoted_book.best_ask() {
                    ask_price = ask_price.max(best_ask);
                }
                bid_is_taker = false;
                ask_is_taker = false;
            }
            HittingLogic::Pennying => {
                if let Some(best_bid) = quoted_book.best_bid() {
                    if bid_price > best_bid {
                        bid_price = Price::from_ticks(best_bid.ticks() + 1);
                    }
                }
                if let Some(best_ask) = quoted_book.best_ask() {
                    if ask_price < best_ask {
                        ask_price = Price::from_ticks(best_ask.ticks() - 1);
                    }
                }
                bid_is_taker = false;
                ask_is_taker = false;
            }
        }

        let bid = if total_buy <= params.max_cum_bid_fills {
            Some(Quote { price: bid_price, quantity: Quantity::from_decimal(size).unwrap_or(Quantity::ZERO) })
        } else {
            None
        };
        let ask = if total_sell <= params.max_cum_ask_fills {
            Some(Quote { price: ask_price, quantity: Quantity::from_decimal(size).unwrap_or(Quantity::ZERO) })
        } else {
            None
        };

        QuotePair { bid, ask, bid_is_taker, ask_is_taker }
    }
}

/// Rounds `fv * grouping_bp` into a tick count, matching
/// [`lob_core::fairvalue::grouped::GroupedMidpProvider`]'s formula but
/// recomputed every tick rather than locked at first observation — the
/// engine's grouping band tracks price level, the fair-value provider's
/// hysteresis band does not.
fn group_step_ticks(fv: Decimal, grouping_bp: f64, tick_size: Decimal) -> i64 {
    if tick_size.is_zero() {
        return 1;
    }
    let bp = Decimal::try_from(grouping_bp).unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
    let group_value = fv * bp / Decimal::new(10_000, 0);
    let ticks = (group_value / tick_size).round();
    rust_decimal::prelude::ToPrimitive::to_i64(&ticks).unwrap_or(1).max(1)
}

/// Owns the two live quoters for one instrument and drives them from fair
/// value updates (§4.4).
pub struct MarketMaker {
    pub engine: Arc<QuotingEngine>,
    bid_quoter: Box<dyn Quoter>,
    ask_quoter: Box<dyn Quoter>,
}

impl MarketMaker {
    pub fn new(engine: Arc<QuotingEngine>, bid_quoter: Box<dyn Quoter>, ask_quoter: Box<dyn Quoter>) -> Self {
        Self { engine, bid_quoter, ask_quoter }
    }

    pub async fn on_fair_value_changed(&mut self, event: FairValueChanged, quoted_book: &OrderBook, fx: &dyn FxRateService) {
        let pair = self.engine.compute_quote_pair(event.fv, quoted_book, fx);
        let mid = quoted_book.mid_price(self.engine.tick_size);
        self.bid_quoter.update_quote(pair.bid, mid, pair.bid_is_taker).await;
        self.ask_quoter.update_quote(pair.ask, mid, pair.ask_is_taker).await;
    }

    pub async fn cancel_all(&mut self) {
        self.bid_quoter.cancel_all().await;
        self.ask_quoter.cancel_all().await;
    }
}

/// Feeds confirmed fills back into a [`QuotingEngine`]'s inventory counters
/// (§4.4). Attached to an order as its [`OrderObserver`] at submission time.
pub struct EngineFillObserver {
    engine: Arc<QuotingEngine>,
}

impl EngineFillObserver {
    pub fn new(engine: Arc<QuotingEngine>) -> Self {
        Self { engine }
    }
}

impl OrderObserver for EngineFillObserver {
    fn on_filled(&self, order: &lob_core::core::Order, fill: &lob_core::core::Fill, fully_filled: bool) {
        self.engine.record_fill(order.side, fill.quantity, fully_filled);
    }
}
