// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Providers that wrap or replace the system provider in tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use stash_page::{MemoryProvider, PageError, Protection, Region};

/// Leaks a provider so it can be handed to APIs taking `&'static dyn MemoryProvider`.
pub fn leak<P: MemoryProvider + 'static>(provider: P) -> &'static P {
    Box::leak(Box::new(provider))
}

/// Delegates to an inner provider and snapshots every region's bytes at the
/// moment it is handed back for release, before the inner provider wipes and
/// unmaps it.
///
/// This is the test hook for observing freed memory without touching
/// unmapped pages.
#[derive(Debug)]
pub struct InspectingProvider {
    inner: &'static dyn MemoryProvider,
    allocations: AtomicUsize,
    snapshots: Mutex<Vec<Vec<u8>>>,
}

impl InspectingProvider {
    /// Wraps `inner`.
    pub fn new(inner: &'static dyn MemoryProvider) -> Self {
        Self {
            inner,
            allocations: AtomicUsize::new(0),
            snapshots: Mutex::new(Vec::new()),
        }
    }

    /// Wraps the system provider.
    pub fn system() -> Self {
        Self::new(stash_page::system())
    }

    /// Number of successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Number of inspected releases so far.
    pub fn releases(&self) -> usize {
        self.snapshots.lock().expect("Failed to lock()").len()
    }

    /// Bytes of the most recently released region, across its allocated length.
    pub fn last_release(&self) -> Option<Vec<u8>> {
        self.snapshots.lock().expect("Failed to lock()").last().cloned()
    }
}

impl MemoryProvider for InspectingProvider {
    fn name(&self) -> &'static str {
        "inspecting"
    }

    fn page_size(&self) -> usize {
        self.inner.page_size()
    }

    fn allocate(&self, len: usize) -> Result<Region, PageError> {
        let region = self.inner.allocate(len)?;
        self.allocations.fetch_add(1, Ordering::SeqCst);

        Ok(region)
    }

    fn protect(&self, region: &Region, protection: Protection) -> Result<(), PageError> {
        self.inner.protect(region, protection)
    }

    fn release(&self, region: Region) -> Result<(), PageError> {
        // Snapshot what the caller left behind, before the inner provider wipes.
        let readable = region.protection().is_readable()
            || self.inner.protect(&region, Protection::ReadOnly).is_ok();

        if readable {
            // Safety: the region is readable and nothing else views it during release.
            let snapshot = unsafe { region.as_slice() }.to_vec();
            self.snapshots
                .lock()
                .expect("Failed to lock()")
                .push(snapshot);
        }

        self.inner.release(region)
    }
}

/// Provider whose allocations always fail with a fixed error.
#[derive(Debug)]
pub struct FailingProvider {
    error: PageError,
}

impl FailingProvider {
    /// Fails every allocation with `error`.
    pub const fn new(error: PageError) -> Self {
        Self { error }
    }
}

impl MemoryProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn page_size(&self) -> usize {
        4096
    }

    fn allocate(&self, _len: usize) -> Result<Region, PageError> {
        Err(self.error)
    }

    fn protect(&self, _region: &Region, _protection: Protection) -> Result<(), PageError> {
        Err(PageError::UnsupportedOperation)
    }

    fn release(&self, _region: Region) -> Result<(), PageError> {
        // Never hands out regions.
        Err(PageError::ReleaseFailed)
    }
}
