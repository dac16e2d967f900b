//! Order entity and lifecycle state machine (§4.6).
//!
//! # State diagram
//!
//! ```text
//! Pending ──submit──► NewRequest ──ack──► New
//!                               │            │
//!                               │            ├──partial──► PartiallyFilled ──fill──► Filled (terminal)
//!                               │            ├──replace──► ReplaceRequest ──ack──► New
//!                               │            ├──cancel ──► CancelRequest  ──ack──► Cancelled (terminal)
//!                               │
//!                               └──reject──► Rejected (terminal)
//! ```
//!
//! Unlike [`connection_fsm`](super::connection_fsm), this is a *runtime*
//! state machine rather than a typestate: the router keeps one pooled
//! `Order` object per live order and mutates it in place (§9 design note on
//! object pooling — resetting an order for reuse must clear its observer
//! list). A typestate encoding would force a new allocation per transition,
//! which defeats the pooling this component exists for.

use super::errors::FillError;
use super::types::{OrderId, OrderStatus, OrderType, Price, Quantity, Side};
use std::sync::Arc;

/// An immutable execution report, de-duplicated by `execution_id` (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub instrument_id: u64,
    pub book_name: Arc<str>,
    pub client_order_id: OrderId,
    pub exchange_order_id: Arc<str>,
    pub execution_id: Arc<str>,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub ts_micros: u64,
}

/// The kind of execution report arriving from the order gateway (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    Ack { exchange_order_id: Arc<str> },
    Reject { reason: Arc<str> },
    ReplaceAck { new_price: Price, new_quantity: Quantity },
    CancelAck,
    Fill { execution_id: Arc<str>, last_price: Price, last_quantity: Quantity },
}

/// A status report routed to an `Order` by the `OrderRouter` (§4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusReport {
    pub client_order_id: Option<OrderId>,
    pub exchange_order_id: Option<Arc<str>>,
    pub ts_micros: u64,
    pub kind: ReportKind,
}

/// What happened when a report was applied to an order — forwarded by the
/// router to engine/quoter observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Acked,
    Rejected { reason: Arc<str> },
    Replaced,
    Cancelled,
    PartiallyFilled(Fill),
    Filled(Fill),
    /// Report ignored: illegal transition, stale timestamp, or duplicate execution.
    Ignored { reason: &'static str },
}

/// Observer callback for order lifecycle events (§9 design note).
///
/// A small, single-writer list per order. `Order::reset` clears it so a
/// pooled order returning to the free list never leaks a stale observer.
pub trait OrderObserver: Send + Sync {
    fn on_status_changed(&self, _order: &Order, _old: OrderStatus, _new: OrderStatus) {}
    fn on_filled(&self, _order: &Order, _fill: &Fill, _fully_filled: bool) {}
}

/// Parameters used to (re)initialize a pooled `Order`.
#[derive(Debug, Clone)]
pub struct OrderParams {
    pub client_order_id: OrderId,
    pub instrument_id: u64,
    pub book_name: Arc<str>,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub order_type: OrderType,
    pub post_only: bool,
}

/// A live order. Owned exclusively by the `OrderRouter` once registered
/// (§3 ownership summary) — other components hold only its `client_order_id`
/// plus an observer handle.
#[derive(Clone)]
pub struct Order {
    pub client_order_id: OrderId,
    pub exchange_order_id: Option<Arc<str>>,
    pub instrument_id: u64,
    pub book_name: Arc<str>,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub leaves_qty: Quantity,
    pub order_type: OrderType,
    pub post_only: bool,
    pub status: OrderStatus,
    pub last_update_time: u64,
    pub fills: Vec<Fill>,
    observers: Vec<Arc<dyn OrderObserver>>,
    /// Status to revert to if a transient `*Request` state's synchronous
    /// gateway call fails (§4.6).
    prior_stable_status: OrderStatus,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            client_order_id: OrderId::default(),
            exchange_order_id: None,
            instrument_id: 0,
            book_name: Arc::from(""),
            side: Side::Buy,
            price: Price::default(),
            quantity: Quantity::ZERO,
            leaves_qty: Quantity::ZERO,
            order_type: OrderType::Limit,
            post_only: false,
            status: OrderStatus::Pending,
            last_update_time: 0,
            fills: Vec::new(),
            observers: Vec::new(),
            prior_stable_status: OrderStatus::Pending,
        }
    }
}

impl Order {
    pub fn new(params: OrderParams) -> Self {
        Self {
            client_order_id: params.client_order_id,
            exchange_order_id: None,
            instrument_id: params.instrument_id,
            book_name: params.book_name,
            side: params.side,
            price: params.price,
            quantity: params.quantity,
            leaves_qty: params.quantity,
            order_type: params.order_type,
            post_only: params.post_only,
            status: OrderStatus::Pending,
            last_update_time: 0,
            fills: Vec::new(),
            observers: Vec::new(),
            prior_stable_status: OrderStatus::Pending,
        }
    }

    /// Reset a pooled order for reuse. Clears fills and, critically, the
    /// observer list (§9 design note).
    pub fn reset(&mut self, params: OrderParams) {
        self.client_order_id = params.client_order_id;
        self.exchange_order_id = None;
        self.instrument_id = params.instrument_id;
        self.book_name = params.book_name;
        self.side = params.side;
        self.price = params.price;
        self.quantity = params.quantity;
        self.leaves_qty = params.quantity;
        self.order_type = params.order_type;
        self.post_only = params.post_only;
        self.status = OrderStatus::Pending;
        self.last_update_time = 0;
        self.fills.clear();
        self.observers.clear();
        self.prior_stable_status = OrderStatus::Pending;
    }

    pub fn subscribe(&mut self, observer: Arc<dyn OrderObserver>) {
        self.observers.push(observer);
    }

    fn transition(&mut self, new_status: OrderStatus) {
        let old = self.status;
        self.status = new_status;
        for obs in &self.observers {
            obs.on_status_changed(self, old, new_status);
        }
    }

    /// `Pending -> NewRequest`. No-op (returns `false`) if not `Pending`.
    pub fn submit(&mut self) -> bool {
        if self.status != OrderStatus::Pending {
            return false;
        }
        self.prior_stable_status = OrderStatus::Pending;
        self.transition(OrderStatus::NewRequest);
        true
    }

    /// If the gateway's synchronous `send_new` call fails outright (§4.6),
    /// the transient state reverts rather than waiting for a report.
    pub fn revert_to_prior_stable(&mut self) {
        if matches!(self.status, OrderStatus::NewRequest | OrderStatus::ReplaceRequest | OrderStatus::CancelRequest) {
            self.transition(self.prior_stable_status);
        }
    }

    /// `New/PartiallyFilled -> ReplaceRequest`. Returns `false` (ignored) if
    /// the current status does not permit replace.
    pub fn replace(&mut self, new_price: Price, new_quantity: Quantity) -> bool {
        if !self.status.is_replaceable() {
            return false;
        }
        self.prior_stable_status = self.status;
        self.price = new_price;
        self.quantity = new_quantity;
        self.transition(OrderStatus::ReplaceRequest);
        true
    }

    /// `New/PartiallyFilled/NewRequest -> CancelRequest`.
    pub fn cancel(&mut self) -> bool {
        if !self.status.is_cancellable() {
            return false;
        }
        self.prior_stable_status = self.status;
        self.transition(OrderStatus::CancelRequest);
        true
    }

    /// Apply an incoming status report, gated on timestamp ordering (§5):
    /// reports older than `last_update_time` are ignored.
    pub fn on_report(&mut self, report: &OrderStatusReport) -> OrderOutcome {
        if report.ts_micros < self.last_update_time {
            return OrderOutcome::Ignored { reason: "report older than last_update_time" };
        }

        match &report.kind {
            ReportKind::Ack { exchange_order_id } => {
                if !matches!(self.status, OrderStatus::NewRequest | OrderStatus::ReplaceRequest) {
                    return OrderOutcome::Ignored { reason: "ack while not in a request state" };
                }
                self.exchange_order_id = Some(exchange_order_id.clone());
                self.last_update_time = report.ts_micros;
                let was_replace = self.status == OrderStatus::ReplaceRequest;
                self.transition(OrderStatus::New);
                if was_replace {
                    OrderOutcome::Replaced
                } else {
                    OrderOutcome::Acked
                }
            }
            ReportKind::ReplaceAck { new_price, new_quantity } => {
                if self.status != OrderStatus::ReplaceRequest {
                    return OrderOutcome::Ignored { reason: "replace ack while not in ReplaceRequest" };
                }
                self.price = *new_price;
                self.quantity = *new_quantity;
                self.last_update_time = report.ts_micros;
                self.transition(OrderStatus::New);
                OrderOutcome::Replaced
            }
            ReportKind::Reject { reason } => {
                if self.status != OrderStatus::NewRequest {
                    return OrderOutcome::Ignored { reason: "reject while not pending ack" };
                }
                self.last_update_time = report.ts_micros;
                self.transition(OrderStatus::Rejected);
                OrderOutcome::Rejected { reason: reason.clone() }
            }
            ReportKind::CancelAck => {
                if self.status.is_terminal() {
                    return OrderOutcome::Ignored { reason: "cancel ack on terminal order" };
                }
                self.last_update_time = report.ts_micros;
                self.leaves_qty = Quantity::ZERO;
                self.transition(OrderStatus::Cancelled);
                OrderOutcome::Cancelled
            }
            ReportKind::Fill { execution_id, last_price, last_quantity } => {
                self.apply_fill(execution_id.clone(), *last_price, *last_quantity, report.ts_micros)
                    .map(|(fill, fully_filled)| {
                        for obs in &self.observers {
                            obs.on_filled(self, &fill, fully_filled);
                        }
                        if fully_filled {
                            OrderOutcome::Filled(fill)
                        } else {
                            OrderOutcome::PartiallyFilled(fill)
                        }
                    })
                    .unwrap_or_else(|reason| OrderOutcome::Ignored { reason })
            }
        }
    }

    /// Fill de-duplication and leaves-quantity accounting (§4.6, §8).
    ///
    /// Returns `(fill, fully_filled)` on success, or a static reason string
    /// when the report is a no-op (zero qty/price, or a duplicate
    /// `execution_id` already recorded on this order).
    fn apply_fill(
        &mut self,
        execution_id: Arc<str>,
        last_price: Price,
        last_quantity: Quantity,
        ts_micros: u64,
    ) -> Result<(Fill, bool), &'static str> {
        if last_quantity.raw() <= 0 {
            return Err("fill quantity not positive");
        }
        if last_price.ticks() <= 0 {
            return Err("fill price not positive");
        }
        if self.fills.iter().any(|f| f.execution_id == execution_id) {
            return Err("duplicate execution_id");
        }

        let fill = Fill {
            instrument_id: self.instrument_id,
            book_name: self.book_name.clone(),
            client_order_id: self.client_order_id,
            exchange_order_id: self.exchange_order_id.clone().unwrap_or_else(|| Arc::from("")),
            execution_id,
            side: self.side,
            price: last_price,
            quantity: last_quantity,
            ts_micros,
        };

        self.fills.push(fill.clone());
        self.leaves_qty = Quantity::from_raw((self.leaves_qty.raw() - last_quantity.raw()).max(0));
        self.last_update_time = ts_micros;

        let fully_filled = self.leaves_qty.raw() == 0;
        self.transition(if fully_filled { OrderStatus::Filled } else { OrderStatus::PartiallyFilled });
        Ok((fill, fully_filled))
    }

    pub fn filled_quantity(&self) -> Quantity {
        Quantity::from_raw(self.quantity.raw() - self.leaves_qty.raw())
    }

    #[inline]
    pub fn validate_fill_input(quantity: Quantity, price: Price) -> Result<(), FillError> {
        if quantity.raw() <= 0 {
            return Err(FillError::ZeroQuantity);
        }
        if price.ticks() <= 0 {
            return Err(FillError::ZeroPrice);
        }
        Ok(())
    }
}
