//! Multi-producer/single-consumer ring buffer (§4.1), using the standard
//! Vyukov bounded MPMC-queue claim-then-publish scheme specialized to a
//! single consumer.
//!
//! Each slot carries a generation counter, `available`, with two distinct
//! meanings depending on its value relative to a claim `c` at that slot's
//! index: `available == c` means the slot is empty and ready for the
//! producer claiming `c` to write into; `available == c + 1` means the slot
//! holds the data that producer wrote, ready for the consumer to read at
//! position `c`. A producer claims a slot by reading the shared write
//! sequence and only advancing it, via compare-exchange, once it has checked
//! the slot it would claim is actually marked empty; a slot it finds
//! occupied means the ring is full and it reports failure *without*
//! advancing the sequence. This matters: a claim taken unconditionally (e.g.
//! via `fetch_add`) before checking occupancy burns that sequence number
//! forever once it's rejected, permanently skipping the slot it would have
//! owned on its next lap — the CAS loop here retries the same claim instead,
//! so the position becomes claimable again the moment the consumer frees it.
//! After writing, the producer stores the second marker value. The consumer
//! only reads once it observes the second value for its own read position,
//! and after reading stores `read + capacity` — the *empty* marker the
//! producer that wraps around to claim this index next will be looking for.
//! Without that republish step the producer's check would keep matching the
//! stale post-write marker forever and overwrite unconsumed data (see the
//! ring's test `rejects_writes_past_capacity`).

use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Slot<T> {
    available: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// A bounded, wait-free-on-the-consumer-side MPSC ring buffer. Producers may
/// contend with each other on the claim (a compare-exchange retry loop); the
/// consumer never blocks and never contends with producers beyond a single
/// atomic load per slot.
pub struct MpscRing<T> {
    buffer: Box<[Slot<T>]>,
    mask: usize,

    /// Shared among all producers; claimed via a compare-exchange retry loop
    /// so a rejected claim (ring full) never burns a sequence number.
    write_seq: CachePadded<AtomicUsize>,
    /// Owned by the single consumer.
    read_seq: CachePadded<AtomicUsize>,
}

unsafe impl<T: Send> Send for MpscRing<T> {}
unsafe impl<T: Send> Sync for MpscRing<T> {}

impl<T> MpscRing<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let mut buffer = Vec::with_capacity(capacity);
        for i in 0..capacity {
            buffer.push(Slot {
                // Slot i is empty and ready for the first producer to claim
                // index i, i.e. claim number i itself.
                available: AtomicUsize::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            });
        }
        Self {
            buffer: buffer.into_boxed_slice(),
            mask: capacity - 1,
            write_seq: CachePadded::new(AtomicUsize::new(0)),
            read_seq: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Non-blocking push, safe to call from any number of producer threads.
    /// Returns `false` immediately if the ring is full.
    pub fn try_write(&self, item: T) -> bool {
        let mut claimed = self.write_seq.load(Ordering::Relaxed);
        loop {
            let idx = claimed & self.mask;
            let slot = &self.buffer[idx];
            let avail = slot.available.load(Ordering::Acquire);
            let diff = avail.wrapping_sub(claimed) as isize;

            if diff == 0 {
                // Slot is empty for exactly this claim. Try to own it; a
                // losing CAS means another producer claimed first, so reload
                // and retry rather than silently skipping ahead.
                match self.write_seq.compare_exchange_weak(
                    claimed,
                    claimed.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(actual) => claimed = actual,
                }
            } else if diff < 0 {
                // The consumer hasn't drained this index's previous
                // occupant yet — ring full, report failure without
                // advancing `write_seq`, so this exact claim stays
                // available to retry once a slot frees up.
                return false;
            } else {
                // Stale read of `write_seq`: another producer already moved
                // it past what we loaded. Refresh and recheck.
                claimed = self.write_seq.load(Ordering::Relaxed);
            }
        }

        let idx = claimed & self.mask;
        let slot = &self.buffer[idx];
        unsafe {
            (*slot.value.get()).write(item);
        }
        slot.available.store(claimed.wrapping_add(1), Ordering::Release);
        true
    }

    /// Non-blocking pop. Single-consumer only.
    pub fn try_read(&self) -> Option<T> {
        let read = self.read_seq.load(Ordering::Relaxed);
        let idx = read & self.mask;
        let slot = &self.buffer[idx];

        if slot.available.load(Ordering::Acquire) != read.wrapping_add(1) {
            return None;
        }

        let item = unsafe { (*slot.value.get()).assume_init_read() };
        // Publish the slot back to "empty, ready for claim `read +
        // capacity`" — exactly the claim a producer wrapping around to this
        // index next will make — before advancing our own read sequence.
        // Without this the producer's check would keep matching the stale
        // post-write marker this slot already holds, regardless of whether
        // we actually drained it.
        slot.available.store(read.wrapping_add(self.capacity()), Ordering::Release);
        self.read_seq.store(read.wrapping_add(1), Ordering::Release);
        Some(item)
    }

    pub fn len(&self) -> usize {
        let write = self.write_seq.load(Ordering::Acquire);
        let read = self.read_seq.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Drop for MpscRing<T> {
    fn drop(&mut self) {
        while self.try_read().is_some() {}
    }
}
