//! Lock-free ring buffers for wait-free handoff between pipeline stages (§4.1).
//!
//! ```text
//! feed adapter ──MD event──► SPSC ring ──► distributor ──► order book
//! order gateway ──report──► MPSC ring ──► router
//! ```
//!
//! Both variants are bounded, power-of-two capacity, and non-blocking:
//! `try_write`/`try_read` never park a thread. Producers publish with
//! release semantics before advancing a sequence; consumers read a sequence
//! with acquire semantics before reading the slot's data. No locks, no
//! allocation once constructed.

pub mod mpsc;
pub mod spsc;

pub use mpsc::MpscRing;
pub use spsc::SpscRing;
