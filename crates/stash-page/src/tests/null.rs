// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Tests for NullProvider.

use crate::{MemoryProvider, NullProvider, PageError, Protection};

#[test]
fn test_allocate_rounds_to_page_and_is_zeroed() {
    let provider = NullProvider::new();
    let region = provider.allocate(100).expect("Failed to allocate()");

    assert_eq!(region.len(), provider.page_size());
    assert_eq!(region.as_ptr() as usize % provider.page_size(), 0);
    assert!(unsafe { region.as_slice() }.iter().all(|&b| b == 0));

    provider.release(region).expect("Failed to release()");
}

#[test]
fn test_allocate_never_locks() {
    let provider = NullProvider::new();
    let region = provider.allocate(1).expect("Failed to allocate()");

    assert!(!region.is_locked());

    provider.release(region).expect("Failed to release()");
}

#[test]
fn test_allocate_overflow_fails() {
    let provider = NullProvider::new();

    assert!(matches!(
        provider.allocate(usize::MAX),
        Err(PageError::AllocationFailed)
    ));
}

#[test]
fn test_protect_is_unsupported() {
    let provider = NullProvider::new();
    let region = provider.allocate(1).expect("Failed to allocate()");

    for protection in [Protection::NoAccess, Protection::ReadOnly, Protection::ReadWrite] {
        assert_eq!(
            provider.protect(&region, protection),
            Err(PageError::UnsupportedOperation)
        );
        assert_eq!(region.protection(), Protection::ReadWrite);
    }

    provider.release(region).expect("Failed to release()");
}

#[test]
fn test_wipe_works_without_protection_support() {
    let provider = NullProvider::new();
    let region = provider.allocate(64).expect("Failed to allocate()");

    unsafe { region.as_mut_slice().fill(0x5A) };
    provider.wipe(&region);

    assert!(unsafe { region.as_slice() }.iter().all(|&b| b == 0));

    provider.release(region).expect("Failed to release()");
}
