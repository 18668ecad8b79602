// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message type and error code enumerations (§6)

/// Wire message type, carried in the header's `type` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Protocol handshake/version exchange
    Version = 1,
    /// Liveness probe
    Ping = 2,
    /// Generic acknowledgement carrying an [`ErrorCode`]
    Ack = 3,
    /// Register one variable in the sampler table
    SamplerRegisterVariable = 4,
    /// Empty the sampler table and stop sampling
    SamplerClear = 5,
    /// Start sampling from the current tick
    SamplerStart = 6,
    /// Stop sampling without clearing the table
    SamplerStop = 7,
    /// Fire-and-forget sample frame (device to host only)
    SamplerSample = 8,
}

impl MessageType {
    /// Recover a [`MessageType`] from its wire value, if it is one of §6's values.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(MessageType::Version),
            2 => Some(MessageType::Ping),
            3 => Some(MessageType::Ack),
            4 => Some(MessageType::SamplerRegisterVariable),
            5 => Some(MessageType::SamplerClear),
            6 => Some(MessageType::SamplerStart),
            7 => Some(MessageType::SamplerStop),
            8 => Some(MessageType::SamplerSample),
            _ => None,
        }
    }
}

/// Application-layer error code, carried as a `u16` in an ACK payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    /// Handled successfully
    None = 0,
    /// Reserved for app-specific handler use
    General = 1,
    /// Message type not recognized by the session controller or app handler
    UnexpectedMessage = 2,
    /// Header CRC did not validate (framing-layer; not normally surfaced in an ACK)
    BadHeaderCrc = 3,
    /// Payload CRC did not validate (framing-layer; not normally surfaced in an ACK)
    BadPayloadCrc = 4,
    /// `REGISTER_VARIABLE` was sent with the table already at `MAX_VARS`
    SamplerRegisterVariableSizeExceeded = 5,
    /// `START` was sent with no registered variables
    SamplerTableEmpty = 6,
}

impl From<crate::error::Error> for ErrorCode {
    fn from(err: crate::error::Error) -> Self {
        match err {
            crate::error::Error::SamplerTableFull => {
                ErrorCode::SamplerRegisterVariableSizeExceeded
            }
            crate::error::Error::SamplerTableEmpty => ErrorCode::SamplerTableEmpty,
            crate::error::Error::BufferTooSmall
            | crate::error::Error::InvalidAddress
            | crate::error::Error::VariableSizeExceedsLimit => ErrorCode::General,
        }
    }
}
