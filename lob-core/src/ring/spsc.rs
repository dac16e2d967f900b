//! Single-producer/single-consumer ring buffer (§4.1).
//!
//! Producer and consumer each own a sequence counter in its own cache line
//! (via `CachePadded`) so the two sides never false-share. Each side also
//! caches its last observed view of the other's sequence and only re-reads
//! the atomic when the cached value would otherwise indicate full/empty —
//! the fast path touches no cross-core cache line at all.

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A bounded, wait-free SPSC ring buffer of capacity `C` (rounded up to the
/// next power of two). `try_write`/`try_read` never block.
pub struct SpscRing<T> {
    buffer: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,

    /// Owned by the producer; read by the consumer with `Acquire`.
    write_seq: CachePadded<AtomicUsize>,
    /// Owned by the consumer; read by the producer with `Acquire`.
    read_seq: CachePadded<AtomicUsize>,

    /// Producer's cached view of `read_seq`, refreshed only on apparent-full.
    cached_read_seq: CachePadded<UnsafeCell<usize>>,
    /// Consumer's cached view of `write_seq`, refreshed only on apparent-empty.
    cached_write_seq: CachePadded<UnsafeCell<usize>>,
}

unsafe impl<T: Send> Send for SpscRing<T> {}
unsafe impl<T: Send> Sync for SpscRing<T> {}

impl<T> SpscRing<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let mut buffer = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            buffer.push(UnsafeCell::new(MaybeUninit::uninit()));
        }
        Self {
            buffer: buffer.into_boxed_slice(),
            mask: capacity - 1,
            write_seq: CachePadded::new(AtomicUsize::new(0)),
            read_seq: CachePadded::new(AtomicUsize::new(0)),
            cached_read_seq: CachePadded::new(UnsafeCell::new(0)),
            cached_write_seq: CachePadded::new(UnsafeCell::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Non-blocking push. Returns `false` immediately if the ring is full —
    /// callers drop the item and bump a "dropped" counter, per §4.1 failure
    /// semantics; the ring never blocks the producer.
    ///
    /// Single-producer only: calling this from more than one thread is a
    /// logic error (use [`crate::ring::mpsc::MpscRing`] instead).
    pub fn try_write(&self, item: T) -> bool {
        let write = self.write_seq.load(Ordering::Relaxed);
        let cached_read = unsafe { *self.cached_read_seq.get() };

        if write.wrapping_sub(cached_read) >= self.capacity() {
            let read = self.read_seq.load(Ordering::Acquire);
            unsafe { *self.cached_read_seq.get() = read };
            if write.wrapping_sub(read) >= self.capacity() {
                return false;
            }
        }

        let idx = write & self.mask;
        unsafe {
            (*self.buffer[idx].get()).write(item);
        }
        self.write_seq.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Non-blocking pop. Returns `None` immediately if the ring is empty —
    /// the consumer should back off adaptively (spin → yield → short sleep)
    /// rather than busy-loop here.
    ///
    /// Single-consumer only.
    pub fn try_read(&self) -> Option<T> {
        let read = self.read_seq.load(Ordering::Relaxed);
        let cached_write = unsafe { *self.cached_write_seq.get() };

        if read == cached_write {
            let write = self.write_seq.load(Ordering::Acquire);
            unsafe { *self.cached_write_seq.get() = write };
            if read == write {
                return None;
            }
        }

        let idx = read & self.mask;
        let item = unsafe { (*self.buffer[idx].get()).assume_init_read() };
        self.read_seq.store(read.wrapping_add(1), Ordering::Release);
        Some(item)
    }

    /// Approximate occupancy, for metrics/backpressure monitoring. May be
    /// stale by the time the caller observes it.
    pub fn len(&self) -> usize {
        let write = self.write_seq.load(Ordering::Acquire);
        let read = self.read_seq.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for SpscRing<T> {
    fn drop(&mut self) {
        while self.try_read().is_some() {}
    }
}
