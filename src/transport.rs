// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport adapter (C7, interface only)
//!
//! Everything the embedding environment must supply: a way to mask interrupts around
//! a shared-ring mutation, and a way to read the memory a registered variable points
//! at. Neither concrete UART/socket drivers nor board bring-up are in scope here (see
//! the crate's top-level scope notes) — these traits are the seam a platform crate
//! implements.

/// A scoped critical section around a mutation shared with an interrupt context.
///
/// On real hardware this disables and re-enables the relevant interrupt; in tests
/// (or on hosted targets where the "interrupt" is just another thread/task) it can be
/// a no-op or a mutex guard. The source's `interrupts_disable()`/`interrupts_enable()`
/// pair is replaced by this single scoped call so a forgotten re-enable is not
/// representable.
pub trait CriticalSection {
    /// Run `f` with interrupts that could mutate the TX ring masked.
    fn with<R>(&self, f: impl FnOnce() -> R) -> R;
}

/// A [`CriticalSection`] with no-op masking, for single-threaded hosted tests where
/// no interrupt context can possibly race with the session loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCriticalSection;

impl CriticalSection for NullCriticalSection {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// A [`CriticalSection`] backed by the `critical-section` crate, for embedders that
/// already provide a `critical-section` implementation for their target.
#[cfg(feature = "critical-section")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalCriticalSection;

#[cfg(feature = "critical-section")]
impl CriticalSection for GlobalCriticalSection {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

/// Capability to snapshot the bytes at a registered variable's address.
///
/// The wire format carries addresses as plain `u32`s (§3); turning one back into a
/// dereferenceable pointer is inherently `unsafe` and platform-specific, so the
/// sampler never does it directly. Implementors decide what "address" means for
/// their platform (a raw pointer on a freestanding target, an offset into a shared
/// memory region on a hosted one, etc).
pub trait ReadMemory {
    /// Copy `dst.len()` bytes starting at `address` into `dst`.
    fn read(&self, address: u32, dst: &mut [u8]) -> crate::error::Result<()>;
}

/// Default [`ReadMemory`] for freestanding 32-bit targets: reinterprets `address` as
/// a raw pointer and copies `dst.len()` bytes from it.
///
/// # Safety
///
/// The caller (ultimately, the host sending `REGISTER_VARIABLE` messages) asserts
/// that `address` points at `dst.len()` readable bytes for the lifetime of the
/// session. This crate has no way to verify that; the `unsafe` block below exists
/// solely to perform the read the wire format requires. (The TX ring in
/// [`crate::ring`] carries its own, separately justified, unsafe for its lock-free
/// SPSC layout — this is the only `unsafe` arising from untrusted wire data.)
#[derive(Debug, Default, Clone, Copy)]
pub struct RawPointerMemory;

impl ReadMemory for RawPointerMemory {
    fn read(&self, address: u32, dst: &mut [u8]) -> crate::error::Result<()> {
        if address == 0 {
            return Err(crate::error::Error::InvalidAddress);
        }
        // SAFETY: see the struct-level Safety section. `address` and `dst.len()` come
        // from a variable descriptor registered by the host over the wire; this crate
        // has no independent way to validate the claim.
        unsafe {
            let src = core::slice::from_raw_parts(address as usize as *const u8, dst.len());
            dst.copy_from_slice(src);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_critical_section_runs_closure() {
        let cs = NullCriticalSection;
        let result = cs.with(|| 1 + 1);
        assert_eq!(result, 2);
    }

    #[test]
    fn test_raw_pointer_memory_reads_local_value() {
        let value: u32 = 0xCAFEBABE;
        let address = &value as *const u32 as usize as u32;
        let mut dst = [0u8; 4];
        RawPointerMemory.read(address, &mut dst).unwrap();
        assert_eq!(dst, value.to_ne_bytes());
    }

    #[test]
    fn test_raw_pointer_memory_rejects_null() {
        let mut dst = [0u8; 4];
        assert_eq!(
            RawPointerMemory.read(0, &mut dst),
            Err(crate::error::Error::InvalidAddress)
        );
    }
}
