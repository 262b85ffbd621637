// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Exhaustive tests for UnixProvider.

use serial_test::serial;

use crate::{MemoryProvider, PageError, Protection, UnixProvider};

// =============================================================================
// allocate()
// =============================================================================

#[test]
#[serial(page)]
fn test_allocate_is_zeroed() {
    let provider = UnixProvider::new();
    let region = provider.allocate(32).expect("Failed to allocate()");

    assert!(unsafe { region.as_slice() }.iter().all(|&b| b == 0));

    provider.release(region).expect("Failed to release()");
}

#[test]
#[serial(page)]
fn test_allocate_len_matches_page_size() {
    let provider = UnixProvider::new();
    let system_page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;

    let region = provider.allocate(1).expect("Failed to allocate()");

    assert_eq!(provider.page_size(), system_page_size);
    assert_eq!(region.len(), system_page_size);
    assert_eq!(region.as_ptr() as usize % system_page_size, 0);

    provider.release(region).expect("Failed to release()");
}

#[test]
#[serial(page)]
fn test_allocate_spans_multiple_pages() {
    let provider = UnixProvider::new();
    let page_size = provider.page_size();

    let region = provider.allocate(page_size + 1).expect("Failed to allocate()");

    assert_eq!(region.len(), 2 * page_size);

    provider.release(region).expect("Failed to release()");
}

#[test]
#[serial(page)]
fn test_allocate_fails_when_address_space_exhausted() {
    let provider = UnixProvider::new();

    let result = provider.allocate(isize::MAX as usize);

    assert!(matches!(result, Err(PageError::AllocationFailed)));
}

#[test]
#[serial(page)]
fn test_allocate_reports_lock_state() {
    let provider = UnixProvider::new();
    let region = provider.allocate(32).expect("Failed to allocate()");

    let lockable = unsafe { libc::mlock(region.as_ptr() as *const _, region.len()) } == 0;

    assert_eq!(region.is_locked(), lockable);

    provider.release(region).expect("Failed to release()");
}

// =============================================================================
// protect()
// =============================================================================

#[test]
#[serial(page)]
fn test_protect_roundtrip_preserves_data() {
    let provider = UnixProvider::new();
    let region = provider.allocate(32).expect("Failed to allocate()");

    unsafe { region.as_mut_slice()[0] = 0xFF };

    provider
        .protect(&region, Protection::NoAccess)
        .expect("Failed to protect(NoAccess)");
    assert_eq!(region.protection(), Protection::NoAccess);

    provider
        .protect(&region, Protection::ReadOnly)
        .expect("Failed to protect(ReadOnly)");
    assert_eq!(region.protection(), Protection::ReadOnly);

    assert_eq!(unsafe { region.as_slice()[0] }, 0xFF);

    provider
        .protect(&region, Protection::ReadWrite)
        .expect("Failed to protect(ReadWrite)");

    unsafe { region.as_mut_slice()[1] = 0xEE };
    assert_eq!(unsafe { region.as_slice()[1] }, 0xEE);

    provider.release(region).expect("Failed to release()");
}

#[test]
#[serial(page)]
fn test_multiple_protect_cycles() {
    let provider = UnixProvider::new();
    let region = provider.allocate(32).expect("Failed to allocate()");

    for i in 0..5u8 {
        unsafe { region.as_mut_slice()[0] = i };

        provider
            .protect(&region, Protection::NoAccess)
            .expect("Failed to protect(NoAccess)");
        provider
            .protect(&region, Protection::ReadWrite)
            .expect("Failed to protect(ReadWrite)");

        assert_eq!(unsafe { region.as_slice()[0] }, i);
    }

    provider.release(region).expect("Failed to release()");
}

// =============================================================================
// release()
// =============================================================================

#[test]
#[serial(page)]
fn test_release_of_no_access_region() {
    let provider = UnixProvider::new();
    let region = provider.allocate(32).expect("Failed to allocate()");

    unsafe { region.as_mut_slice().fill(0xFF) };
    provider
        .protect(&region, Protection::NoAccess)
        .expect("Failed to protect(NoAccess)");

    provider.release(region).expect("Failed to release()");
}

#[test]
#[serial(page)]
fn test_full_lifecycle() {
    let provider = UnixProvider::new();
    let region = provider.allocate(64).expect("Failed to allocate()");

    // Write sensitive data
    unsafe { region.as_mut_slice().fill(0xDE) };

    // Idle
    provider
        .protect(&region, Protection::NoAccess)
        .expect("Failed to protect(NoAccess)");

    // Read, idle again
    provider
        .protect(&region, Protection::ReadOnly)
        .expect("Failed to protect(ReadOnly)");
    assert_eq!(unsafe { region.as_slice()[0] }, 0xDE);
    provider
        .protect(&region, Protection::NoAccess)
        .expect("Failed to protect(NoAccess)");

    // Wipe is observable before the mapping goes away
    provider.wipe(&region);
    assert_eq!(region.protection(), Protection::ReadWrite);
    assert!(unsafe { region.as_slice() }.iter().all(|&b| b == 0));

    provider.release(region).expect("Failed to release()");
}

// =============================================================================
// Degraded kernels (seccomp)
// =============================================================================

#[cfg(target_os = "linux")]
mod seccomp {
    use super::*;
    use crate::tests::utils::{block_mlock, block_mprotect, run_test_as_subprocess};

    #[test]
    #[ignore]
    fn subprocess_test_allocate_without_mlock_is_unlocked() {
        block_mlock();

        let provider = UnixProvider::new();
        let region = provider.allocate(32).expect("Failed to allocate()");

        assert!(!region.is_locked());
        unsafe { region.as_mut_slice()[0] = 0x42 };
        assert_eq!(unsafe { region.as_slice()[0] }, 0x42);

        provider.release(region).expect("Failed to release()");
    }

    #[test]
    #[serial(page)]
    fn test_allocate_without_mlock_is_unlocked() {
        let exit_code = run_test_as_subprocess(
            "tests::unix::seccomp::subprocess_test_allocate_without_mlock_is_unlocked",
        );

        assert_eq!(exit_code, Some(0), "Subprocess should exit cleanly after assertion");
    }

    #[test]
    #[ignore]
    fn subprocess_test_protect_without_mprotect_keeps_region_writable() {
        let provider = UnixProvider::new();
        let region = provider.allocate(32).expect("Failed to allocate()");
        unsafe { region.as_mut_slice().fill(0xAA) };

        block_mprotect();

        assert_eq!(
            provider.protect(&region, Protection::NoAccess),
            Err(PageError::ProtectFailed)
        );
        assert_eq!(region.protection(), Protection::ReadWrite);

        // Already writable: wipe() does not need mprotect and must not abort.
        provider.wipe(&region);
        assert!(unsafe { region.as_slice() }.iter().all(|&b| b == 0));

        provider.release(region).expect("Failed to release()");
    }

    #[test]
    #[serial(page)]
    fn test_protect_without_mprotect_keeps_region_writable() {
        let exit_code = run_test_as_subprocess(
            "tests::unix::seccomp::subprocess_test_protect_without_mprotect_keeps_region_writable",
        );

        assert_eq!(exit_code, Some(0), "Subprocess should exit cleanly after assertion");
    }
}
