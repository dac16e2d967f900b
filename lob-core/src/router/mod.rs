//! `OrderRouter` (§4.6): client-order-id assignment, concurrent order
//! registry, and lazy deregistration of terminated orders.
//!
//! Grounded on the teacher's `execution::order_bridge` client/exchange id
//! bridging idiom, generalized from a single execution mode to the
//! concurrent-map-plus-per-order-mutex model this spec's §5 concurrency
//! section calls for.

use crate::core::{Order, OrderId, OrderIdGenerator, OrderObserver, OrderOutcome, OrderParams, OrderStatusReport};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default lazy-deregistration FIFO capacity (§4.6: "capacity K, default ~20").
pub const DEFAULT_DEREGISTRATION_CAPACITY: usize = 20;

struct RegisteredOrder {
    order: Mutex<Order>,
}

/// Registers live orders under a monotonic `client_order_id`, routes
/// incoming `OrderStatusReport`s to the right one, and tolerates the
/// straggler-fill-after-cancel race via a bounded FIFO of terminated orders
/// (§4.6, §8 scenario 4).
///
/// The active map and the exchange-id bridge are concurrent (`dashmap`);
/// each order's state transitions are additionally guarded by its own
/// mutex, matching §5's "per-order mutex" resource policy.
pub struct OrderRouter {
    id_gen: OrderIdGenerator,
    active: DashMap<OrderId, Arc<RegisteredOrder>>,
    exchange_to_client: DashMap<Arc<str>, OrderId>,
    deregistration_fifo: Mutex<VecDeque<OrderId>>,
    deregistration_capacity: usize,
}

impl OrderRouter {
    pub fn new(order_source: u16) -> Self {
        Self::with_capacity(order_source, DEFAULT_DEREGISTRATION_CAPACITY)
    }

    pub fn with_capacity(order_source: u16, deregistration_capacity: usize) -> Self {
        Self {
            id_gen: OrderIdGenerator::new(order_source),
            active: DashMap::new(),
            exchange_to_client: DashMap::new(),
            deregistration_fifo: Mutex::new(VecDeque::with_capacity(deregistration_capacity)),
            deregistration_capacity,
        }
    }

    /// Assign a fresh client order id and register a new order built from
    /// `params` (whose `client_order_id` field is overwritten). Returns the
    /// assigned id.
    pub fn register_new(&self, mut params: OrderParams, observer: Option<Arc<dyn OrderObserver>>) -> OrderId {
        let id = self.id_gen.next();
        params.client_order_id = id;
        let mut order = Order::new(params);
        if let Some(obs) = observer {
            order.subscribe(obs);
        }
        self.active.insert(id, Arc::new(RegisteredOrder { order: Mutex::new(order) }));
        id
    }

    /// Run `f` against the live order registered under `id`, if any.
    pub fn with_order<R>(&self, id: OrderId, f: impl FnOnce(&mut Order) -> R) -> Option<R> {
        let entry = self.active.get(&id)?;
        let mut guard = entry.order.lock();
        Some(f(&mut guard))
    }

    /// Record the gateway-assigned exchange order id so later reports that
    /// arrive without a client id can still be bridged (§4.6, §6).
    pub fn bind_exchange_id(&self, client_order_id: OrderId, exchange_order_id: Arc<str>) {
        self.exchange_to_client.insert(exchange_order_id, client_order_id);
    }

    /// Route an incoming report to its order, apply it, and lazily
    /// deregister if it terminated. Returns `None` if the id is unknown —
    /// either never registered, or already evicted from the FIFO (§4.6,
    /// §8 scenario 4), which is the expected shape for a late straggler
    /// report on an order that has long since been forgotten.
    pub fn route_report(&self, report: &OrderStatusReport) -> Option<OrderOutcome> {
        let client_id = report
            .client_order_id
            .or_else(|| report.exchange_order_id.as_ref().and_then(|ex| self.exchange_to_client.get(ex).map(|r| *r)))?;

        let entry = match self.active.get(&client_id) {
            Some(e) => e,
            None => {
                debug!(?client_id, "report for unknown or already-evicted order, dropping");
                return None;
            }
        };

        let (outcome, now_terminal) = {
            let mut order = entry.order.lock();
            if let Some(exchange_id) = &report.exchange_order_id {
                if order.exchange_order_id.is_none() {
                    self.exchange_to_client.insert(exchange_id.clone(), client_id);
                }
            }
            let outcome = order.on_report(report);
            (outcome, order.status.is_terminal())
        };

        if now_terminal {
            self.deregister(client_id);
        }

        Some(outcome)
    }

    /// Push a terminated order into the lazy-deregistration FIFO. When the
    /// FIFO is at capacity, the oldest entry is evicted and *that* order is
    /// finally removed from the active map (§4.6). Orders still inside the
    /// FIFO keep receiving reports; evicted orders do not.
    fn deregister(&self, id: OrderId) {
        let mut fifo = self.deregistration_fifo.lock();
        if fifo.contains(&id) {
            // Already queued for eviction from an earlier terminal transition
            // (e.g. Cancelled then a late straggler Fill on the same order).
            return;
        }
        fifo.push_back(id);
        while fifo.len() > self.deregistration_capacity {
            if let Some(evicted) = fifo.pop_front() {
                if let Some((_, reg)) = self.active.remove(&evicted) {
                    let mut order = reg.order.lock();
                    if let Some(ex) = order.exchange_order_id.take() {
                        self.exchange_to_client.remove(&ex);
                    }
                } else {
                    warn!(?evicted, "FIFO held an id already absent from the active map");
                }
            }
        }
    }

    /// Number of orders still resident in the active map (including those
    /// inside the lazy-deregistration FIFO).
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn deregistration_capacity(&self) -> usize {
        self.deregistration_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Price, Quantity, ReportKind, Side};

    fn params(side: Side) -> OrderParams {
        OrderParams {
            client_order_id: OrderId::default(),
            instrument_id: 1,
            book_name: Arc::from("BTC-USDT"),
            side,
            price: Price::from_ticks(100_000),
            quantity: Quantity::from_raw(1_000_000_00),
            order_type: crate::core::OrderType::Limit,
            post_only: true,
        }
    }

    fn ack(id: OrderId, ts: u64) -> OrderStatusReport {
        OrderStatusReport {
            client_order_id: Some(id),
            exchange_order_id: Some(Arc::from(format!("EX{}", id.0))),
            ts_micros: ts,
            kind: ReportKind::Ack { exchange_order_id: Arc::from(format!("EX{}", id.0)) },
        }
    }

    fn cancel_ack(id: OrderId, ts: u64) -> OrderStatusReport {
        OrderStatusReport { client_order_id: Some(id), exchange_order_id: None, ts_micros: ts, kind: ReportKind::CancelAck }
    }

    fn fill(id: OrderId, ts: u64, exec_id: &str) -> OrderStatusReport {
        OrderStatusReport {
            client_order_id: Some(id),
            exchange_order_id: None,
            ts_micros: ts,
            kind: ReportKind::Fill {
                execution_id: Arc::from(exec_id),
                last_price: Price::from_ticks(100_000),
                last_quantity: Quantity::from_raw(1_000_000_00),
            },
        }
    }

    #[test]
    fn route_report_applies_to_registered_order() {
        let router = OrderRouter::new(1);
        let id = router.register_new(params(Side::Buy), None);
        router.with_order(id, |o| o.submit());

        let outcome = router.route_report(&ack(id, 1));
        assert_eq!(outcome, Some(OrderOutcome::Acked));
    }

    #[test]
    fn lazy_deregistration_tolerates_late_fill_for_still_resident_order() {
        // §8 scenario 4: FIFO capacity 3, create 4 orders, deregister 1..4 in
        // order (evicting order 1), then a late fill for order 1 is ignored
        // while one for order 2 (still resident) fires.
        let router = OrderRouter::with_capacity(1, 3);
        let mut ids = Vec::new();
        for _ in 0..4 {
            let id = router.register_new(params(Side::Buy), None);
            router.with_order(id, |o| o.submit());
            router.route_report(&ack(id, 1));
            ids.push(id);
        }
        for (i, &id) in ids.iter().enumerate() {
            router.route_report(&cancel_ack(id, (10 + i) as u64));
        }
        assert_eq!(router.active_count(), 3, "FIFO capacity 3 keeps the 3 most recently terminated orders");

        let late_for_evicted = router.route_report(&fill(ids[0], 100, "STRAGGLER"));
        assert_eq!(late_for_evicted, None, "order 1 was evicted; its straggler fill is silently ignored");

        let late_for_resident = router.route_report(&fill(ids[1], 101, "STRAGGLER2"));
        assert!(
            matches!(late_for_resident, Some(OrderOutcome::Filled(_))),
            "order 2 is still resident in the FIFO, so its straggler fill is routed and applied, \
             unlike order 1's which never reached the order at all"
        );
    }

    #[test]
    fn unknown_client_order_id_is_dropped() {
        let router = OrderRouter::new(1);
        let bogus = OrderId::new(999);
        assert_eq!(router.route_report(&ack(bogus, 1)), None);
    }

    #[test]
    fn report_bridged_via_exchange_order_id_when_client_id_absent() {
        let router = OrderRouter::new(1);
        let id = router.register_new(params(Side::Buy), None);
        router.with_order(id, |o| o.submit());
        router.bind_exchange_id(id, Arc::from("EXBOUND"));

        let report = OrderStatusReport {
            client_order_id: None,
            exchange_order_id: Some(Arc::from("EXBOUND")),
            ts_micros: 5,
            kind: ReportKind::CancelAck,
        };
        let outcome = router.route_report(&report);
        assert_eq!(outcome, Some(OrderOutcome::Cancelled));
    }
}
