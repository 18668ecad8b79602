// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session controller (C6)
//!
//! Ties the RX assembler, sampler, and TX producer together into one per-tick
//! driver, replacing the source's module-scope globals with a single owned value
//! (see the crate's design notes on global mutable state).

use core::sync::atomic::{AtomicU32, Ordering};

use crate::protocol::codec::Encoder;
use crate::protocol::header::FrameHeader;
use crate::protocol::message::{ErrorCode, MessageType};
use crate::ring::TxProducer;
use crate::rx::RxAssembler;
use crate::sampler::{Sampler, VariableDescriptor};
use crate::transport::{CriticalSection, ReadMemory};

/// App-specific handling for message types the session controller does not own.
///
/// The source delegates unrecognised message types to application code; this trait
/// is that seam. The default no-op implementation (used when an app has nothing to
/// add) always reports [`ErrorCode::UnexpectedMessage`].
pub trait AppHandler {
    /// Handle a message of a type the session controller does not dispatch itself.
    /// Returns the error code to place in the resulting ACK.
    fn handle_unknown(&mut self, msg_type: u8, payload: &[u8]) -> ErrorCode;
}

/// An [`AppHandler`] that rejects everything, for sessions with no app-specific
/// message types.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectUnknown;

impl AppHandler for RejectUnknown {
    fn handle_unknown(&mut self, _msg_type: u8, _payload: &[u8]) -> ErrorCode {
        ErrorCode::UnexpectedMessage
    }
}

/// Per-tick driver coupling the RX assembler, sampler, and TX path (§4.6).
///
/// `RX` and `TX` are the RX/TX buffer capacities; `M` is a [`ReadMemory`]
/// implementation for the sampler's variable reads.
pub struct Session<M: ReadMemory, const RX: usize, const TX: usize> {
    rx: RxAssembler<RX>,
    sampler: Sampler,
    encoder: Encoder,
    memory: M,
    scratch: [u8; TX],
    /// Outgoing ACK/VERSION frames dropped because the TX ring was full.
    pub dropped_acks: AtomicU32,
}

impl<M: ReadMemory, const RX: usize, const TX: usize> Session<M, RX, TX> {
    /// A fresh session: zeroed sequence counter, empty sampler table, stopped.
    pub const fn new(memory: M) -> Self {
        Session {
            rx: RxAssembler::new(),
            sampler: Sampler::new(),
            encoder: Encoder::new(),
            memory,
            scratch: [0u8; TX],
            dropped_acks: AtomicU32::new(0),
        }
    }

    /// Feed one burst of transport-received bytes into the RX assembler.
    pub fn feed_rx(&mut self, bytes: &[u8]) {
        self.rx.feed(bytes);
    }

    /// Read-only access to the sampler, for diagnostics.
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Run one tick (§4.6):
    /// 1. sample first, so a sample frame reflects `ticks` before any message this
    ///    same tick mutates sampler state;
    /// 2. dispatch at most one pending message;
    /// 3. emit its mandatory response (VERSION replies with VERSION; everything
    ///    else replies with ACK);
    /// 4. consume the message.
    pub fn run_step<CS: CriticalSection, H: AppHandler>(
        &mut self,
        ticks: u32,
        tx: &TxProducer<'_, TX, CS>,
        app: &mut H,
    ) {
        let sampler = &self.sampler;
        let encoder = &mut self.encoder;
        let memory = &self.memory;
        let mut sample_scratch = [0u8; TX];
        sampler.sample(ticks, memory, encoder, &mut sample_scratch[..], |frame| {
            tx.put_bytes(frame)
        });

        let dispatched = match self.rx.peek_message() {
            Some((header, payload)) => {
                handle_message(
                    ticks,
                    &header,
                    payload,
                    &mut self.sampler,
                    &mut self.encoder,
                    &mut self.scratch,
                    &self.dropped_acks,
                    tx,
                    app,
                );
                true
            }
            None => false,
        };
        if dispatched {
            self.rx.consume_message();
        }
    }
}

/// Dispatch one already-decoded message and send its mandatory response.
///
/// Takes the session's fields individually, rather than `&mut Session`, so that
/// `payload` — the real borrow of [`RxAssembler`]'s internal buffer returned by
/// `peek_message` — can be passed straight through to `app.handle_unknown` with no
/// copy and no cap on its length (the RX buffer's documented capacity, not 32
/// bytes, is the only limit on how large it can be).
#[allow(clippy::too_many_arguments)]
fn handle_message<const TX: usize, CS: CriticalSection, H: AppHandler>(
    ticks: u32,
    header: &FrameHeader,
    payload: &[u8],
    sampler: &mut Sampler,
    encoder: &mut Encoder,
    scratch: &mut [u8; TX],
    dropped_acks: &AtomicU32,
    tx: &TxProducer<'_, TX, CS>,
    app: &mut H,
) {
    let msg_type = MessageType::from_u8(header.msg_type);

    if msg_type == Some(MessageType::Version) {
        let n = encoder.encode_version(scratch, header.seq).unwrap_or(0);
        if n > 0 && !tx.put_bytes(&scratch[0..n]) {
            dropped_acks.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "log")]
            log::warn!("tx ring full, dropping VERSION response");
        }
        return;
    }

    let error = match msg_type {
        Some(MessageType::Ping) => ErrorCode::None,
        Some(MessageType::Ack) => ErrorCode::None,
        Some(MessageType::SamplerRegisterVariable) => {
            dispatch_register_variable(sampler, payload)
        }
        Some(MessageType::SamplerClear) => {
            sampler.clear();
            ErrorCode::None
        }
        Some(MessageType::SamplerStart) => match sampler.start(ticks) {
            Ok(()) => ErrorCode::None,
            Err(err) => err.into(),
        },
        Some(MessageType::SamplerStop) => {
            sampler.stop();
            ErrorCode::None
        }
        Some(MessageType::SamplerSample) | None => app.handle_unknown(header.msg_type, payload),
        Some(MessageType::Version) => unreachable!("handled above"),
    };

    let n = encoder
        .encode_ack(scratch, header.seq, error as u16)
        .unwrap_or(0);
    if n > 0 && !tx.put_bytes(&scratch[0..n]) {
        dropped_acks.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "log")]
        log::warn!("tx ring full, dropping ACK response");
    }
}

fn dispatch_register_variable(sampler: &mut Sampler, payload: &[u8]) -> ErrorCode {
    if payload.len() < 16 {
        return ErrorCode::General;
    }
    let phase = u32::from_le_bytes(payload[0..4].try_into().unwrap());
    let period = u32::from_le_bytes(payload[4..8].try_into().unwrap());
    let address = u32::from_le_bytes(payload[8..12].try_into().unwrap());
    let size = u16::from_le_bytes(payload[12..14].try_into().unwrap());
    match sampler.register_variable(VariableDescriptor {
        phase_ticks: phase,
        period_ticks: period,
        address,
        size,
    }) {
        Ok(()) => ErrorCode::None,
        Err(err) => err.into(),
    }
}
