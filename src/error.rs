// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for emolog

use core::fmt;

/// Result type for emolog operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for emolog operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Destination buffer too small for the requested encode operation
    BufferTooSmall,

    /// The variable table is already at `MAX_VARS` capacity
    SamplerTableFull,

    /// `start()` was called with an empty variable table
    SamplerTableEmpty,

    /// `read_memory` was asked to read an address/size it cannot service
    InvalidAddress,

    /// `register_variable`'s `size` field exceeds `sampler::MAX_VAR_SIZE`
    VariableSizeExceedsLimit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall => write!(f, "buffer too small"),
            Error::SamplerTableFull => write!(f, "variable table is full"),
            Error::SamplerTableEmpty => write!(f, "variable table is empty"),
            Error::InvalidAddress => write!(f, "invalid memory address or size"),
            Error::VariableSizeExceedsLimit => write!(f, "variable size exceeds limit"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
