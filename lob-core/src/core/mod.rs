//! Core zero-overhead types for the quoting pipeline
//!
//! This module provides the fundamental building blocks:
//! - [`types`]: fixed-point `Price`/`Quantity`, `OrderId`, `Side`, `OrderStatus`
//! - [`order`]: the `Order` entity and its runtime-checked lifecycle
//! - [`connection_fsm`]: typestate connection lifecycle for exchange/feed links
//! - [`errors`]: domain error types (§7)

pub mod connection_fsm;
pub mod errors;
pub mod order;
pub mod types;

pub use errors::{ConversionError, CoreError, FillError, OrderBookError, OverflowError};
pub use order::{Fill, Order, OrderObserver, OrderOutcome, OrderParams, OrderStatusReport, ReportKind};
pub use types::{
    HittingLogic, OrderId, OrderIdGenerator, OrderStatus, OrderType, Price, Quantity, Side, QUANTITY_SCALE,
};
