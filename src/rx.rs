// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RX assembler (C4)
//!
//! Couples the incremental decoder to a fixed buffer fed by the transport context.
//! Holds at most one in-flight frame at a time; `message_available` is the
//! handshake flag the transport context sets and the session loop clears (§5), so
//! it is an `AtomicBool` rather than a plain `bool` even though this crate targets
//! single-core parts, matching the source's `volatile` qualifier.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::protocol::codec::{decode, DecodeOutcome};
use crate::protocol::header::FrameHeader;

/// Fixed-capacity byte assembler recovering frame alignment from an arbitrary byte
/// stream (§4.4).
pub struct RxAssembler<const N: usize> {
    buf: [u8; N],
    rx_pos: usize,
    message_available: AtomicBool,
    /// Bytes dropped because the buffer was full while a frame was already pending.
    pub dropped_bytes: AtomicU32,
    /// Number of times the decoder has resynchronised past garbage or a bad header.
    pub resyncs: AtomicU32,
}

impl<const N: usize> RxAssembler<N> {
    /// An empty assembler.
    pub const fn new() -> Self {
        RxAssembler {
            buf: [0u8; N],
            rx_pos: 0,
            message_available: AtomicBool::new(false),
            dropped_bytes: AtomicU32::new(0),
            resyncs: AtomicU32::new(0),
        }
    }

    /// Whether a complete, CRC-valid frame is waiting in the buffer.
    pub fn message_available(&self) -> bool {
        self.message_available.load(Ordering::Acquire)
    }

    /// Feed one burst of bytes from the transport.
    ///
    /// While a message is already pending, incoming bytes are dropped rather than
    /// appended — this is the implicit back-pressure §4.4 describes, and it keeps
    /// the pending frame's bytes stable for [`Self::peek_message`] until the session
    /// loop consumes it.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.message_available() {
            self.dropped_bytes
                .fetch_add(bytes.len() as u32, Ordering::Relaxed);
            return;
        }
        let mut accepted = 0;
        for &b in bytes {
            if self.rx_pos >= N {
                let dropped = (bytes.len() - accepted) as u32;
                self.dropped_bytes.fetch_add(dropped, Ordering::Relaxed);
                #[cfg(feature = "log")]
                log::warn!("rx buffer full, dropping {dropped} byte(s)");
                break;
            }
            self.buf[self.rx_pos] = b;
            self.rx_pos += 1;
            accepted += 1;
        }
        self.run_decode_loop();
    }

    fn run_decode_loop(&mut self) {
        loop {
            match decode(&self.buf[0..self.rx_pos]) {
                DecodeOutcome::Frame { .. } => {
                    self.message_available.store(true, Ordering::Release);
                    return;
                }
                DecodeOutcome::Skip(k) => {
                    self.resyncs.fetch_add(1, Ordering::Relaxed);
                    #[cfg(feature = "log")]
                    log::trace!("decoder resync, skipping {k} byte(s)");
                    self.buf.copy_within(k..self.rx_pos, 0);
                    self.rx_pos -= k;
                }
                DecodeOutcome::NeedMore(_) => return,
            }
        }
    }

    /// Borrow the pending frame's header and payload, if one is available.
    pub fn peek_message(&self) -> Option<(FrameHeader, &[u8])> {
        if !self.message_available() {
            return None;
        }
        match decode(&self.buf[0..self.rx_pos]) {
            DecodeOutcome::Frame { header, total_len } => {
                let payload = &self.buf[FrameHeader::SIZE..total_len];
                Some((header, payload))
            }
            _ => None,
        }
    }

    /// Discard the pending frame and resume accepting bytes.
    pub fn consume_message(&mut self) {
        if let DecodeOutcome::Frame { total_len, .. } = decode(&self.buf[0..self.rx_pos]) {
            self.buf.copy_within(total_len..self.rx_pos, 0);
            self.rx_pos -= total_len;
        }
        self.message_available.store(false, Ordering::Release);
        self.run_decode_loop();
    }
}

impl<const N: usize> Default for RxAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}
