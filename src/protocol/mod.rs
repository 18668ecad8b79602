// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire format: frame header, message types, and the codec built on top of them (C2)

pub mod codec;
pub mod header;
pub mod message;

pub use codec::{decode, DecodeOutcome, Encoder, SampleFrameBuilder, PROTOCOL_VERSION};
pub use header::FrameHeader;
pub use message::{ErrorCode, MessageType};
