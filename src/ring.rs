// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TX ring buffer (C3)
//!
//! Single-producer/single-consumer byte ring. The source protects every mutation —
//! both the session loop's enqueue and the ISR's drain — with manual
//! `interrupts_disable`/`interrupts_enable` pairs, which is easy to get wrong by
//! forgetting one side. Here the ring is split into a [`TxProducer`] and a
//! [`TxConsumer`] that each hold only the half of the API their context needs;
//! there is no API for the session loop to call a drain-only method or vice versa.

use core::cell::UnsafeCell;

use crate::transport::CriticalSection;

/// Fixed-capacity SPSC byte ring, shared between a [`TxProducer`] and a
/// [`TxConsumer`] obtained via [`TxRing::split`].
///
/// Tracks `read_pos`/`write_pos` plus an explicit `is_empty` flag so the
/// `read == write` state is never ambiguous between "empty" and "full" (§3).
pub struct TxRing<const N: usize> {
    buf: UnsafeCell<[u8; N]>,
    read_pos: UnsafeCell<usize>,
    write_pos: UnsafeCell<usize>,
    is_empty: UnsafeCell<bool>,
}

// SAFETY: access to the interior-mutable fields is disciplined by construction —
// `TxProducer` only ever calls `put_bytes`/`free`/`len`/`is_full`, `TxConsumer`
// only ever calls `drain_into`/`len`/`is_empty`, and the producer-side mutations are
// wrapped in the caller-supplied critical section so they cannot interleave with a
// concurrent drain on another context.
unsafe impl<const N: usize> Sync for TxRing<N> {}

impl<const N: usize> TxRing<N> {
    /// An empty ring.
    pub const fn new() -> Self {
        TxRing {
            buf: UnsafeCell::new([0u8; N]),
            read_pos: UnsafeCell::new(0),
            write_pos: UnsafeCell::new(0),
            is_empty: UnsafeCell::new(true),
        }
    }

    /// Split into a producer handle (session loop side) and a consumer handle
    /// (transport ISR side). Each handle borrows the ring for its lifetime, so the
    /// two contexts cannot both hold, say, two producers.
    pub fn split<CS: CriticalSection>(&self, cs: CS) -> (TxProducer<'_, N, CS>, TxConsumer<'_, N>) {
        (TxProducer { ring: self, cs }, TxConsumer { ring: self })
    }

    fn occupied(&self) -> usize {
        // SAFETY: reads of `is_empty`/`read_pos`/`write_pos` here are only ever
        // called from contexts holding a `&TxRing`, which both handles do for their
        // whole lifetime; mutation paths run inside the critical section.
        unsafe {
            if *self.is_empty.get() {
                0
            } else {
                let read = *self.read_pos.get();
                let write = *self.write_pos.get();
                ((write + N - read - 1) % N) + 1
            }
        }
    }

    fn free(&self) -> usize {
        N - self.occupied()
    }
}

impl<const N: usize> Default for TxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Session-loop handle: the only side allowed to append bytes.
pub struct TxProducer<'a, const N: usize, CS: CriticalSection> {
    ring: &'a TxRing<N>,
    cs: CS,
}

impl<'a, const N: usize, CS: CriticalSection> TxProducer<'a, N, CS> {
    /// Bytes currently queued.
    pub fn len(&self) -> usize {
        self.ring.occupied()
    }

    /// True if no bytes are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free capacity for further writes.
    pub fn free(&self) -> usize {
        self.ring.free()
    }

    /// True if the ring cannot accept another byte.
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Append `src` atomically: either every byte is queued, or none are.
    ///
    /// Wrapped in the producer's [`CriticalSection`] so a concurrent drain on the
    /// consumer side observes a consistent `read_pos`/`write_pos`/`is_empty` triple.
    pub fn put_bytes(&self, src: &[u8]) -> bool {
        if src.is_empty() {
            return true;
        }
        self.cs.with(|| {
            if self.ring.free() < src.len() {
                return false;
            }
            // SAFETY: mutation is serialised by the critical section above.
            unsafe {
                let buf = &mut *self.ring.buf.get();
                let write = *self.ring.write_pos.get();
                let first = core::cmp::min(src.len(), N - write);
                buf[write..write + first].copy_from_slice(&src[0..first]);
                if first < src.len() {
                    let rest = src.len() - first;
                    buf[0..rest].copy_from_slice(&src[first..]);
                }
                *self.ring.write_pos.get() = (write + src.len()) % N;
                *self.ring.is_empty.get() = false;
            }
            true
        })
    }
}

/// Transport-ISR handle: the only side allowed to drain bytes.
pub struct TxConsumer<'a, const N: usize> {
    ring: &'a TxRing<N>,
}

impl<'a, const N: usize> TxConsumer<'a, N> {
    /// Bytes currently queued.
    pub fn len(&self) -> usize {
        self.ring.occupied()
    }

    /// True if no bytes are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain up to `dst.len()` bytes into `dst`, returning the number written.
    ///
    /// Runs without an explicit critical section: by construction this method is
    /// only reachable from the transport ISR, which is itself the context the
    /// producer's critical section masks, so the two sides of a drain-vs-enqueue
    /// race cannot both be executing at once.
    pub fn drain_into(&self, dst: &mut [u8]) -> usize {
        // SAFETY: see the struct-level note — the ISR context is mutually exclusive
        // with the producer's critical section.
        unsafe {
            if *self.ring.is_empty.get() {
                return 0;
            }
            let buf = &*self.ring.buf.get();
            let read = *self.ring.read_pos.get();
            let occupied = self.ring.occupied();
            let n = core::cmp::min(dst.len(), occupied);
            let first = core::cmp::min(n, N - read);
            dst[0..first].copy_from_slice(&buf[read..read + first]);
            if first < n {
                let rest = n - first;
                dst[first..n].copy_from_slice(&buf[0..rest]);
            }
            let new_read = (read + n) % N;
            *self.ring.read_pos.get() = new_read;
            if n == occupied {
                *self.ring.read_pos.get() = 0;
                *self.ring.write_pos.get() = 0;
                *self.ring.is_empty.get() = true;
            }
            n
        }
    }
}
