// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Periodic sampler engine (C5)
//!
//! Owns the fixed-capacity variable table and decides, tick by tick, which rows to
//! snapshot into a single outgoing sample frame.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Error, Result};
use crate::protocol::codec::Encoder;
use crate::transport::ReadMemory;

/// Maximum number of variables the table can hold (§3).
pub const MAX_VARS: usize = 128;

/// Largest single variable snapshot this sampler will read. The wire format's
/// `size` field is a `u16` supplied by the host and is not otherwise bounded, so
/// this caps how much stack scratch `sample()` needs per row and how large a row's
/// `register_variable` call may declare.
pub const MAX_VAR_SIZE: usize = 256;

/// One row of the sampler table: a memory region and the (phase, period) schedule
/// that selects when it is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDescriptor {
    /// Tick offset, within `period_ticks`, at which this row matches.
    pub phase_ticks: u32,
    /// Sampling period in ticks; `1` is the sample-every-tick fast path.
    pub period_ticks: u32,
    /// Wire-supplied address, interpreted by a [`ReadMemory`] implementation.
    pub address: u32,
    /// Number of bytes to snapshot at `address`.
    pub size: u16,
}

impl VariableDescriptor {
    fn matches(&self, relative: u32) -> bool {
        self.period_ticks == 1 || relative % self.period_ticks == self.phase_ticks
    }
}

/// The sampler's table and running state (§3's "Sampler state").
pub struct Sampler {
    table: [VariableDescriptor; MAX_VARS],
    size: usize,
    running: bool,
    start_ticks: u32,
    /// Sample frames dropped because the TX ring had no room for them (§4.5's
    /// "Failure semantics").
    pub dropped_samples: AtomicU32,
    /// Rows skipped during a tick because their wire-supplied `size` exceeds
    /// [`MAX_VAR_SIZE`].
    pub oversized_variable_skips: AtomicU32,
}

impl Sampler {
    /// An empty, stopped sampler.
    pub const fn new() -> Self {
        const ZERO: VariableDescriptor = VariableDescriptor {
            phase_ticks: 0,
            period_ticks: 1,
            address: 0,
            size: 0,
        };
        Sampler {
            table: [ZERO; MAX_VARS],
            size: 0,
            running: false,
            start_ticks: 0,
            dropped_samples: AtomicU32::new(0),
            oversized_variable_skips: AtomicU32::new(0),
        }
    }

    /// Current table occupancy.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether sampling is currently active.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Append a row. Fails if the table is already at [`MAX_VARS`] capacity, or if
    /// `descriptor.size` exceeds [`MAX_VAR_SIZE`] (the wire `size` field is a `u16`
    /// supplied by the host and is otherwise unbounded; rejecting it here, rather
    /// than at sample time, tells the host immediately instead of silently
    /// skipping the row on every matching tick).
    pub fn register_variable(&mut self, descriptor: VariableDescriptor) -> Result<()> {
        if descriptor.size as usize > MAX_VAR_SIZE {
            return Err(Error::VariableSizeExceedsLimit);
        }
        if self.size >= MAX_VARS {
            return Err(Error::SamplerTableFull);
        }
        self.table[self.size] = descriptor;
        self.size += 1;
        Ok(())
    }

    /// Empty the table and stop sampling.
    pub fn clear(&mut self) {
        self.running = false;
        self.size = 0;
    }

    /// Start sampling from `ticks`. Fails if the table is empty.
    pub fn start(&mut self, ticks: u32) -> Result<()> {
        if self.size == 0 {
            return Err(Error::SamplerTableEmpty);
        }
        self.running = true;
        self.start_ticks = ticks;
        Ok(())
    }

    /// Stop sampling without clearing the table.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Run one tick: snapshot matching rows' memory and hand the resulting frame to
    /// `put_frame`, a closure encoding the bytes `put_frame` returns `true` for as
    /// having been successfully enqueued.
    ///
    /// No-op if not running. Emits nothing if no row matches this tick (§4.5:
    /// "If none matched, emit nothing"). A full TX ring silently drops the frame
    /// for this tick; `dropped_samples` counts that without otherwise affecting
    /// protocol state.
    pub fn sample<M: ReadMemory>(
        &self,
        ticks: u32,
        memory: &M,
        encoder: &mut Encoder,
        scratch: &mut [u8],
        mut put_frame: impl FnMut(&[u8]) -> bool,
    ) {
        if !self.running {
            return;
        }
        let relative = ticks.wrapping_sub(self.start_ticks);
        let mut any_matched = false;
        let frame_len = {
            let mut builder = match encoder.begin_sample(scratch) {
                Ok(b) => b,
                Err(_) => return,
            };
            for row in &self.table[0..self.size] {
                if !row.matches(relative) {
                    continue;
                }
                if row.size as usize > MAX_VAR_SIZE {
                    self.oversized_variable_skips.fetch_add(1, Ordering::Relaxed);
                    #[cfg(feature = "log")]
                    log::warn!(
                        "skipping variable at address {:#x}, size {} exceeds MAX_VAR_SIZE",
                        row.address,
                        row.size
                    );
                    continue;
                }
                let mut var_buf = [0u8; MAX_VAR_SIZE];
                let dst = &mut var_buf[0..row.size as usize];
                if memory.read(row.address, dst).is_err() {
                    continue;
                }
                if builder.add_var(dst).is_err() {
                    continue;
                }
                any_matched = true;
            }
            if !any_matched {
                return;
            }
            match builder.finish(relative) {
                Ok(n) => n,
                Err(_) => return,
            }
        };
        if !put_frame(&scratch[0..frame_len]) {
            self.dropped_samples.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "log")]
            log::warn!("tx ring full, dropping sample frame for tick {ticks}");
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}
