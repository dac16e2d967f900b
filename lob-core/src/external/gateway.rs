//! `OrderGateway` (§6 outbound): three async methods returning result
//! envelopes. REST/FIX wire encoding is entirely the implementor's concern;
//! quoters and the market maker only see these typed requests/results.

use crate::core::{OrderId, OrderStatusReport, Price, Quantity, Side};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub client_order_id: OrderId,
    pub instrument_id: u64,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub order_type: crate::core::OrderType,
    pub post_only: bool,
}

#[derive(Debug, Clone)]
pub struct ReplaceRequest {
    pub client_order_id: OrderId,
    pub exchange_order_id: Arc<str>,
    pub instrument_id: u64,
    pub new_price: Price,
    pub new_quantity: Quantity,
}

#[derive(Debug, Clone)]
pub struct CancelRequest {
    pub client_order_id: OrderId,
    pub exchange_order_id: Arc<str>,
    pub instrument_id: u64,
}

/// Synchronous-acceptance envelope common to all three gateway calls (§6).
/// `ok=false` means the gateway rejected the request outright (e.g. a
/// connectivity or validation failure) without ever reaching the exchange;
/// the caller reverts the order's transient state (§4.6) rather than
/// waiting for a report that will never come.
#[derive(Debug, Clone)]
pub struct SendResult {
    pub ok: bool,
    pub failure_reason: Option<Arc<str>>,
    /// An immediate report, when the gateway can synthesize one (e.g. an
    /// immediate ack) instead of making the caller wait for the async
    /// report-reader thread (§5 thread 4).
    pub report: Option<OrderStatusReport>,
}

impl SendResult {
    pub fn accepted() -> Self {
        Self { ok: true, failure_reason: None, report: None }
    }

    pub fn rejected(reason: impl Into<Arc<str>>) -> Self {
        Self { ok: false, failure_reason: Some(reason.into()), report: None }
    }
}

/// An outbound order gateway (§6). All three methods suspend only at the
/// network I/O point (§5): book/FV/quote computation never awaits.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn send_new(&self, req: NewOrderRequest) -> SendResult;
    async fn send_replace(&self, req: ReplaceRequest) -> SendResult;
    async fn send_cancel(&self, req: CancelRequest) -> SendResult;
}
