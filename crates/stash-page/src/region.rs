// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Region - a page-aligned mapping handed out by a [`MemoryProvider`](crate::MemoryProvider).

use core::ptr::NonNull;
use core::sync::atomic::{AtomicU8, Ordering};

use crate::protection::Protection;

/// A page-aligned memory region owned by whoever holds it.
///
/// A region carries no destructor: it must be returned to the provider that
/// created it through [`MemoryProvider::release`](crate::MemoryProvider::release).
/// It is deliberately not `Clone`.
#[derive(Debug)]
pub struct Region {
    ptr: NonNull<u8>,
    len: usize,
    locked: bool,
    protection: AtomicU8,
}

// Safety: Region is the unique owner of its mapping; access to the bytes is
// only possible through the unsafe views below.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Builds a region from its raw parts.
    ///
    /// # Safety
    /// `ptr` must point to `len` bytes of page-aligned memory mapped by the
    /// provider that will later release this region, and nothing else may
    /// own that mapping. The pages must be readable and writable.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, len: usize, locked: bool) -> Self {
        Self {
            ptr,
            len,
            locked,
            protection: AtomicU8::new(Protection::ReadWrite as u8),
        }
    }

    /// Base address of the mapping.
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Allocated length in bytes (a multiple of the page size).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the region spans zero bytes. Providers never hand these out.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the pages are locked against swap.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Protection last applied by the owning provider.
    ///
    /// Starts as `ReadWrite`. A failed protection change leaves it as it was.
    pub fn protection(&self) -> Protection {
        Protection::from_u8(self.protection.load(Ordering::Acquire))
    }

    /// Records a protection change. Providers call this after the operating
    /// system accepted the change.
    ///
    /// # Safety
    /// `protection` must match what is actually enforced on the pages:
    /// [`MemoryProvider::wipe`](crate::MemoryProvider::wipe) relies on it to
    /// decide whether the region can be written.
    pub unsafe fn set_protection(&self, protection: Protection) {
        self.protection.store(protection as u8, Ordering::Release);
    }

    /// Returns a view of the whole region.
    ///
    /// # Safety
    /// The region must currently be readable, otherwise the access faults.
    /// No mutable view may be alive at the same time.
    pub unsafe fn as_slice(&self) -> &[u8] {
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Returns a mutable view of the whole region.
    ///
    /// # Safety
    /// The region must currently be writable, otherwise the access faults.
    /// The caller must guarantee no other view is alive for the lifetime of
    /// the returned slice.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn as_mut_slice(&self) -> &mut [u8] {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}
