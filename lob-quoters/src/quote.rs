//! The `Quote` value an engine hands to a quoter (§4.4, §4.5).

use lob_core::core::{Price, Quantity};

/// A single-side target the owning `Quoter` reconciles its live order
/// against. A `None` target (carried at the call site, not in this type)
/// means "no quote this side; cancel any live order."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub price: Price,
    pub quantity: Quantity,
}
