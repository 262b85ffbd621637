// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for stash-buffer.

use core::sync::atomic::{AtomicUsize, Ordering};

use stash_page::{MemoryProvider, PageError, Protection, Region};

/// Delegates to the system provider but fails one specific `protect` call.
///
/// Calls are numbered from 1 in the order they reach the provider.
#[derive(Debug)]
pub struct FlakyProtectProvider {
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl FlakyProtectProvider {
    pub const fn new(fail_on_call: usize) -> Self {
        Self {
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }
}

impl MemoryProvider for FlakyProtectProvider {
    fn name(&self) -> &'static str {
        "flaky-protect"
    }

    fn page_size(&self) -> usize {
        stash_page::system().page_size()
    }

    fn allocate(&self, len: usize) -> Result<Region, PageError> {
        stash_page::system().allocate(len)
    }

    fn protect(&self, region: &Region, protection: Protection) -> Result<(), PageError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if call == self.fail_on_call {
            return Err(PageError::ProtectFailed);
        }

        stash_page::system().protect(region, protection)
    }

    fn release(&self, region: Region) -> Result<(), PageError> {
        stash_page::system().release(region)
    }
}
