// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! SecureBuffer - High-level buffer over a provider Region.
//!
//! Provides with_read_access/with_write_access scopes with automatic
//! protect/unprotect. If a region cannot be hidden again after a scope, it
//! is wiped and the process aborts.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use stash_page::{MemoryProvider, PageError, Protection, Region};

use crate::error::BufferError;

/// A fixed-size guarded memory region holding secret bytes.
///
/// While idle, the pages are `NoAccess` if the provider supports protection
/// changes, `ReadWrite` otherwise. Access only happens inside the scopes
/// opened by [`with_read_access`](Self::with_read_access) and
/// [`with_write_access`](Self::with_write_access), at most one at a time.
///
/// The buffer cannot be resized: a different length means a new buffer, so
/// the old memory is always wiped on its own.
pub struct SecureBuffer {
    provider: &'static dyn MemoryProvider,
    region: Option<Region>,
    len: usize,
    allocated_len: usize,
    locked: bool,
    toggles_protection: bool,
    protection: AtomicU8,
    in_scope: AtomicBool,
}

impl SecureBuffer {
    /// Allocates a buffer of `len` bytes through `provider`.
    ///
    /// The region is zeroed, locked if the provider manages to, and hidden
    /// (`NoAccess`) if the provider can change its protection.
    ///
    /// A failed initial protect is not an error: the buffer stays
    /// `ReadWrite` for its whole life and
    /// [`toggles_protection`](Self::toggles_protection) reports `false`,
    /// the same as on a provider without protection support.
    pub fn allocate(provider: &'static dyn MemoryProvider, len: usize) -> Result<Self, BufferError> {
        let region = provider.allocate(len)?;

        let toggles_protection = match provider.protect(&region, Protection::NoAccess) {
            Ok(()) => true,
            Err(PageError::UnsupportedOperation) => false,
            Err(e) => {
                log::warn!("{}: cannot hide idle secret pages ({e}), keeping them read-write", provider.name());
                false
            }
        };

        let idle = Self::idle_protection(toggles_protection);

        Ok(Self {
            provider,
            len,
            allocated_len: region.len(),
            locked: region.is_locked(),
            region: Some(region),
            toggles_protection,
            protection: AtomicU8::new(idle as u8),
            in_scope: AtomicBool::new(false),
        })
    }

    const fn idle_protection(toggles_protection: bool) -> Protection {
        if toggles_protection {
            Protection::NoAccess
        } else {
            Protection::ReadWrite
        }
    }

    fn enter(&self, protection: Protection) -> Result<AccessScope<'_>, BufferError> {
        let region = self.region.as_ref().ok_or(BufferError::BufferClosed)?;

        if self
            .in_scope
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(BufferError::ReentrantAccess);
        }

        if self.toggles_protection {
            // On failure the pages keep their idle protection.
            if let Err(e) = self.provider.protect(region, protection) {
                self.in_scope.store(false, Ordering::Release);
                return Err(e.into());
            }

            self.protection.store(protection as u8, Ordering::Release);
        }

        Ok(AccessScope {
            buffer: self,
            region,
        })
    }

    /// Runs `f` with read-only access to the `len` secret bytes.
    ///
    /// # Errors
    /// - [`BufferError::BufferClosed`] after [`release`](Self::release)
    /// - [`BufferError::ReentrantAccess`] while another scope is open
    /// - [`BufferError::Page`] if the pages could not be made readable
    pub fn with_read_access<F, R>(&self, f: F) -> Result<R, BufferError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        let scope = self.enter(Protection::ReadOnly)?;
        let slice = unsafe { scope.region.as_slice() };

        Ok(f(&slice[..self.len]))
    }

    /// Runs `f` with read-write access to the `len` secret bytes.
    ///
    /// # Errors
    /// Same as [`with_read_access`](Self::with_read_access).
    pub fn with_write_access<F, R>(&self, f: F) -> Result<R, BufferError>
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        let scope = self.enter(Protection::ReadWrite)?;
        // Safety: the scope flag guarantees this is the only live view.
        let slice = unsafe { scope.region.as_mut_slice() };

        Ok(f(&mut slice[..self.len]))
    }

    /// Copies as many bytes as fit from `self` into `dst`, returning the count.
    ///
    /// Both buffers are opened in nested scopes; passing the same buffer
    /// twice fails with [`BufferError::ReentrantAccess`].
    pub fn copy_into(&self, dst: &SecureBuffer) -> Result<usize, BufferError> {
        self.with_read_access(|src| {
            dst.with_write_access(|dst| {
                let n = src.len().min(dst.len());
                dst[..n].copy_from_slice(&src[..n]);
                n
            })
        })?
    }

    /// Zeroes the whole allocated region without releasing it.
    pub fn wipe(&mut self) -> Result<(), BufferError> {
        let region = self.region.as_ref().ok_or(BufferError::BufferClosed)?;

        self.provider.wipe(region);
        self.protection
            .store(Protection::ReadWrite as u8, Ordering::Release);

        if self.toggles_protection {
            self.provider.protect(region, Protection::NoAccess)?;
            self.protection
                .store(Protection::NoAccess as u8, Ordering::Release);
        }

        Ok(())
    }

    /// Wipes the region and returns it to the provider.
    ///
    /// Idempotent: later calls do nothing. Also runs on drop.
    pub fn release(&mut self) {
        let Some(region) = self.region.take() else {
            return;
        };

        self.provider.wipe(&region);
        self.protection
            .store(Protection::ReadWrite as u8, Ordering::Release);

        // Already wiped, a failure here only leaks address space.
        if let Err(e) = self.provider.release(region) {
            log::warn!("secure buffer wiped but not released: {e}");
        }
    }

    /// Requested length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds zero secret bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the underlying region (a multiple of the page size).
    pub fn allocated_len(&self) -> usize {
        self.allocated_len
    }

    /// Whether the pages were locked against swap at allocation.
    ///
    /// `false` after release.
    pub fn is_locked(&self) -> bool {
        self.locked && self.region.is_some()
    }

    /// Whether idle pages are hidden with `NoAccess`.
    pub fn toggles_protection(&self) -> bool {
        self.toggles_protection
    }

    /// Current page protection.
    pub fn protection(&self) -> Protection {
        Protection::from_u8(self.protection.load(Ordering::Acquire))
    }

    /// Whether [`release`](Self::release) has run.
    pub fn is_released(&self) -> bool {
        self.region.is_none()
    }

    /// Name of the provider owning the region.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl core::fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SecureBuffer")
            .field("len", &self.len)
            .field("allocated_len", &self.allocated_len)
            .field("locked", &self.is_locked())
            .field("protection", &self.protection())
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

/// An open access scope. Restores idle protection on every exit path.
struct AccessScope<'a> {
    buffer: &'a SecureBuffer,
    region: &'a Region,
}

impl Drop for AccessScope<'_> {
    fn drop(&mut self) {
        let buffer = self.buffer;

        if buffer.toggles_protection {
            if let Err(e) = buffer.provider.protect(self.region, Protection::NoAccess) {
                // The secret would stay exposed: wipe it, then abort.
                buffer.provider.wipe(self.region);
                stash_page::abort(e);
            }

            buffer
                .protection
                .store(Protection::NoAccess as u8, Ordering::Release);
        }

        buffer.in_scope.store(false, Ordering::Release);
    }
}
