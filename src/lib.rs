// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # emolog
//!
//! A `no_std` framed wire protocol and embedded-side runtime for streaming
//! periodic samples of in-memory variables from a resource-constrained device to a
//! host over a reliable but unframed byte stream (typically a UART).
//!
//! ## Design Constraints
//!
//! - **No heap allocations** (const generics for fixed buffers)
//! - **`no_std` compatible**
//! - `unsafe` is confined to two narrow spots: the wire-supplied-address read in
//!   [`transport::RawPointerMemory`], and the lock-free SPSC layout of
//!   [`ring::TxRing`]
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Session controller (run_step)           |
//! +-----------------------------------------+
//!       v               v              ^
//! +-----------+   +-----------+   +-----------+
//! |  Sampler  |   |  RX       |   |  TX ring  |
//! |  engine   |   |  assembler|   |  (SPSC)   |
//! +-----------+   +-----------+   +-----------+
//!       v               ^              ^
//! +-----------------------------------------+
//! |  Frame codec (header, encode, decode)    |
//! +-----------------------------------------+
//!       v                              ^
//! +-----------------------------------------+
//! |  CRC-8 engine                            |
//! +-----------------------------------------+
//! ```
//!
//! Byte I/O, interrupt enable/disable, and board bring-up are supplied by the
//! embedding environment through [`transport::CriticalSection`] and
//! [`transport::ReadMemory`] — this crate never touches a UART or a clock
//! register directly.
//!
//! ## Feature Flags
//!
//! - `log` -- route diagnostics through the `log` facade
//! - `critical-section` -- use the `critical-section` crate to implement
//!   [`transport::CriticalSection`]
//! - `std` -- enable `std::error::Error` impls (for host-side testing)

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Error types for emolog
pub mod error;

/// CRC-8 engine (C1)
pub mod crc;

/// Wire format: frame header, message types, and the codec (C2)
pub mod protocol;

/// TX ring buffer (C3)
pub mod ring;

/// RX assembler (C4)
pub mod rx;

/// Periodic sampler engine (C5)
pub mod sampler;

/// Session controller (C6)
pub mod session;

/// Transport adapter interface (C7)
pub mod transport;

pub use crate::error::{Error, Result};
pub use crate::protocol::{decode, DecodeOutcome, Encoder, ErrorCode, FrameHeader, MessageType};
pub use crate::ring::{TxConsumer, TxProducer, TxRing};
pub use crate::rx::RxAssembler;
pub use crate::sampler::{Sampler, VariableDescriptor, MAX_VARS};
pub use crate::session::{AppHandler, RejectUnknown, Session};
pub use crate::transport::{CriticalSection, ReadMemory};

/// Recommended RX buffer capacity in bytes (§3's "recommended 1024 bytes").
pub const RX_BUF_SIZE: usize = 1024;

/// Recommended TX ring capacity in bytes, matching the larger of the source's two
/// observed configurations.
pub const TX_BUF_SIZE: usize = 32768;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
