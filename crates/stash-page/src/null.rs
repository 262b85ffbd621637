// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! NullProvider - Standard allocation provider (no locking, no protection)
//!
//! Works everywhere. Used as the system provider on platforms without a
//! dedicated implementation, and by callers that accept degraded operation.

use std::alloc::{self, Layout};

use crate::error::PageError;
use crate::protection::Protection;
use crate::provider::{MemoryProvider, round_to_page};
use crate::region::Region;

const NULL_PAGE_SIZE: usize = 4096;

/// Heap-backed provider without any operating system protections.
///
/// Regions are page-aligned zeroed heap blocks. They are never locked and
/// their protection cannot change: [`protect`](MemoryProvider::protect)
/// always reports [`PageError::UnsupportedOperation`]. Wiping still happens.
#[derive(Debug)]
pub struct NullProvider(());

impl NullProvider {
    /// Creates the provider. It holds no state.
    pub const fn new() -> Self {
        Self(())
    }

    fn layout(len: usize) -> Result<Layout, PageError> {
        Layout::from_size_align(len, NULL_PAGE_SIZE).map_err(|_| PageError::AllocationFailed)
    }
}

impl Default for NullProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider for NullProvider {
    fn name(&self) -> &'static str {
        "null"
    }

    fn page_size(&self) -> usize {
        NULL_PAGE_SIZE
    }

    fn allocate(&self, len: usize) -> Result<Region, PageError> {
        let size = round_to_page(len, NULL_PAGE_SIZE).ok_or(PageError::AllocationFailed)?;
        let layout = Self::layout(size)?;

        // Safety: layout has non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = core::ptr::NonNull::new(ptr).ok_or(PageError::AllocationFailed)?;

        log::debug!("allocated {size} unlocked heap bytes");

        Ok(unsafe { Region::from_raw_parts(ptr, size, false) })
    }

    fn protect(&self, _region: &Region, _protection: Protection) -> Result<(), PageError> {
        Err(PageError::UnsupportedOperation)
    }

    fn release(&self, region: Region) -> Result<(), PageError> {
        self.wipe(&region);

        let layout = Self::layout(region.len()).map_err(|_| PageError::ReleaseFailed)?;

        // Safety: the region was allocated above with this exact layout.
        unsafe { alloc::dealloc(region.as_ptr(), layout) };

        Ok(())
    }
}
