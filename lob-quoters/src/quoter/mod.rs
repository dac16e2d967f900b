//! The `Quoter` variants of §4.5: each owns the live-order reconciliation
//! for one side of one instrument, translating a target [`Quote`] into
//! submit/replace/cancel calls against the shared [`OrderRouter`] and
//! [`OrderGateway`].

pub mod grouped_single;
pub mod layered;
pub mod log;
pub mod shadow;
pub mod single;

pub use grouped_single::GroupedSingleQuoter;
pub use layered::LayeredQuoter;
pub use log::LogQuoter;
pub use shadow::{ShadowMakerQuoter, ShadowQuoter};
pub use single::SingleQuoter;

use crate::quote::Quote;
use async_trait::async_trait;
use lob_core::core::{OrderId, OrderObserver, OrderParams, OrderType, Side};
use lob_core::external::{CancelRequest, NewOrderRequest, OrderGateway, ReplaceRequest};
use lob_core::router::OrderRouter;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

/// Common contract shared by every quoter variant (§4.5).
///
/// `mid_price` is the quoted instrument's current book midpoint, passed so
/// variants that need it (grouped/near-mid banding) don't have to re-derive
/// it from the book themselves. `is_buy_taker` flags whether the target
/// price would currently cross the opposing book side — only the `Shadow`
/// variants act on it.
#[async_trait]
pub trait Quoter: Send {
    fn side(&self) -> Side;

    async fn update_quote(&mut self, target: Option<Quote>, mid_price: Option<Decimal>, is_buy_taker: bool);

    /// Cancel any live order for this side without waiting for a new target
    /// (used on retirement and connection loss).
    async fn cancel_all(&mut self);

    /// The quoter's current resting quote, if any.
    fn live_quote(&self) -> Option<Quote>;
}

/// Picks the wire order type for a post-only flag; this system has no
/// separate "IOC" order type, so the aggressive `Shadow` variant uses
/// `OrderType::Market` directly instead (see `shadow.rs`).
pub(crate) fn order_type_for(post_only: bool) -> OrderType {
    if post_only {
        OrderType::PostOnly
    } else {
        OrderType::Limit
    }
}

/// Shared submit/replace/cancel plumbing against the router and gateway,
/// composed into each concrete quoter rather than duplicated per variant.
///
/// Public so a `MarketMakerFactory` implementation outside this crate (a
/// real deployment, or the demo binaries in `lob-bins`) can build the
/// concrete `Quoter` variants directly instead of only through this crate's
/// own tests.
pub struct QuoterContext {
    pub router: Arc<OrderRouter>,
    pub gateway: Arc<dyn OrderGateway>,
    pub instrument_id: u64,
    pub book_name: Arc<str>,
    pub side: Side,
    pub observer: Option<Arc<dyn OrderObserver>>,
}

impl QuoterContext {
    pub fn new(
        router: Arc<OrderRouter>,
        gateway: Arc<dyn OrderGateway>,
        instrument_id: u64,
        book_name: Arc<str>,
        side: Side,
        observer: Option<Arc<dyn OrderObserver>>,
    ) -> Self {
        Self { router, gateway, instrument_id, book_name, side, observer }
    }

    /// Register, submit, and send a new order. Reverts the transient
    /// `NewRequest` state and returns `None` if the gateway rejects it
    /// synchronously (§4.6).
    pub async fn submit_new(
        &self,
        price: lob_core::core::Price,
        quantity: lob_core::core::Quantity,
        order_type: OrderType,
        post_only: bool,
    ) -> Option<OrderId> {
        let params = OrderParams {
            client_order_id: OrderId::default(),
            instrument_id: self.instrument_id,
            book_name: self.book_name.clone(),
            side: self.side,
            price,
            quantity,
            order_type,
            post_only,
        };
        let id = self.router.register_new(params, self.observer.clone());
        self.router.with_order(id, |o| o.submit());

        let req = NewOrderRequest {
            client_order_id: id,
            instrument_id: self.instrument_id,
            side: self.side,
            price,
            quantity,
            order_type,
            post_only,
        };
        let result = self.gateway.send_new(req).await;
        if !result.ok {
            self.router.with_order(id, |o| o.revert_to_prior_stable());
            warn!(?id, reason = ?result.failure_reason, "new order rejected synchronously");
            return None;
        }
        if let Some(report) = &result.report {
            self.router.route_report(report);
        }
        Some(id)
    }

    /// Replace a live order's price/quantity. No-op (returns `false`) if the
    /// order isn't currently in a replaceable state (§4.6).
    pub async fn replace(&self, id: OrderId, new_price: lob_core::core::Price, new_quantity: lob_core::core::Quantity) -> bool {
        let accepted_locally = self.router.with_order(id, |o| o.replace(new_price, new_quantity)).unwrap_or(false);
        if !accepted_locally {
            return false;
        }
        let exchange_order_id =
            self.router.with_order(id, |o| o.exchange_order_id.clone()).flatten().unwrap_or_else(|| Arc::from(""));
        let req = ReplaceRequest { client_order_id: id, exchange_order_id, instrument_id: self.instrument_id, new_price, new_quantity };
        let result = self.gateway.send_replace(req).await;
        if !result.ok {
            self.router.with_order(id, |o| o.revert_to_prior_stable());
            return false;
        }
        if let Some(report) = &result.report {
            self.router.route_report(report);
        }
        true
    }

    /// Cancel a live order.
    pub async fn cancel(&self, id: OrderId) -> bool {
        let accepted_locally = self.router.with_order(id, |o| o.cancel()).unwrap_or(false);
        if !accepted_locally {
            return false;
        }
        let exchange_order_id =
            self.router.with_order(id, |o| o.exchange_order_id.clone()).flatten().unwrap_or_else(|| Arc::from(""));
        let req = CancelRequest { client_order_id: id, exchange_order_id, instrument_id: self.instrument_id };
        let result = self.gateway.send_cancel(req).await;
        if !result.ok {
            self.router.with_order(id, |o| o.revert_to_prior_stable());
            return false;
        }
        if let Some(report) = &result.report {
            self.router.route_report(report);
        }
        true
    }
}
