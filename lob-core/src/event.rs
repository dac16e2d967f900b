//! Wire-level event model: the cache-line-friendly value records that cross
//! the ring buffer boundary (§3, §4.1).
//!
//! `MarketDataEvent` carries a *batch* of level updates so a single network
//! read produces one ring entry instead of one per level — the inline/heap
//! split in [`UpdateBatch`] is the §9 Open Question decision: small deltas
//! (the overwhelming common case) never allocate, while `Snapshot` events,
//! which can carry thousands of levels, spill to a heap `Vec`.

use crate::core::types::{Price, Quantity, Side};
use std::sync::Arc;

/// Inline capacity for the common delta case. Chosen so `MarketDataEvent`
/// stays a handful of cache lines for `Add`/`Update`/`Delete`/`Trade`; a
/// `Snapshot` almost always exceeds this and falls back to `Heap`.
pub const INLINE_UPDATE_CAPACITY: usize = 40;

/// A single price-level change within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevelEntry {
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

/// A batch of price-level updates, stored inline up to
/// [`INLINE_UPDATE_CAPACITY`] entries or on the heap beyond that.
///
/// This is the resolution of the §9 Open Question on the inline cap: rather
/// than silently truncating a batch larger than the inline array (losing
/// levels), a batch that would overflow is built directly as `Heap` by the
/// feed adapter. No data is ever dropped to fit the inline form.
#[derive(Debug, Clone)]
pub enum UpdateBatch {
    Inline { len: u8, entries: [PriceLevelEntry; INLINE_UPDATE_CAPACITY] },
    Heap(Vec<PriceLevelEntry>),
}

impl UpdateBatch {
    const EMPTY_ENTRY: PriceLevelEntry =
        PriceLevelEntry { side: Side::Buy, price: Price::from_ticks(0), quantity: Quantity::ZERO };

    pub fn empty() -> Self {
        UpdateBatch::Inline { len: 0, entries: [Self::EMPTY_ENTRY; INLINE_UPDATE_CAPACITY] }
    }

    /// Builds the most compact representation for `entries`: inline if it
    /// fits, heap-backed otherwise.
    pub fn from_slice(entries: &[PriceLevelEntry]) -> Self {
        if entries.len() <= INLINE_UPDATE_CAPACITY {
            let mut buf = [Self::EMPTY_ENTRY; INLINE_UPDATE_CAPACITY];
            buf[..entries.len()].copy_from_slice(entries);
            UpdateBatch::Inline { len: entries.len() as u8, entries: buf }
        } else {
            UpdateBatch::Heap(entries.to_vec())
        }
    }

    pub fn as_slice(&self) -> &[PriceLevelEntry] {
        match self {
            UpdateBatch::Inline { len, entries } => &entries[..*len as usize],
            UpdateBatch::Heap(v) => v.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The kind of book-affecting event (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketDataEventKind {
    Add,
    Update,
    Delete,
    Trade,
    Snapshot,
}

/// A single batched market-data event arriving over the ring (§3, §4.2).
#[derive(Debug, Clone)]
pub struct MarketDataEvent {
    pub prev_seq: u64,
    pub seq: u64,
    pub ts_micros: u64,
    pub kind: MarketDataEventKind,
    pub instrument_id: u64,
    pub exchange: Arc<str>,
    pub topic_id: u32,
    pub updates: UpdateBatch,
}

impl MarketDataEvent {
    pub fn update_count(&self) -> usize {
        self.updates.len()
    }
}
