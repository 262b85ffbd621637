// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! UnixProvider - mmap/mlock/mprotect backed regions.

use core::ptr::{self, NonNull};
use std::io;
use std::sync::OnceLock;

use crate::error::PageError;
use crate::protection::Protection;
use crate::provider::{MemoryProvider, round_to_page};
use crate::region::Region;

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Provider for Unix-like systems.
///
/// Regions are private anonymous mappings, locked with `mlock` when the
/// process is allowed to, and excluded from core dumps where the platform
/// supports it.
#[derive(Debug)]
pub struct UnixProvider(());

impl UnixProvider {
    /// Creates the provider. It holds no state.
    pub const fn new() -> Self {
        Self(())
    }
}

impl Default for UnixProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider for UnixProvider {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn page_size(&self) -> usize {
        static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

        *PAGE_SIZE.get_or_init(|| match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
            size if size > 0 => size as usize,
            _ => FALLBACK_PAGE_SIZE,
        })
    }

    fn allocate(&self, len: usize) -> Result<Region, PageError> {
        let size = round_to_page(len, self.page_size()).ok_or(PageError::AllocationFailed)?;

        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            log::debug!("mmap of {size} bytes failed: {}", io::Error::last_os_error());
            return Err(PageError::AllocationFailed);
        }

        let ptr = NonNull::new(ptr as *mut u8).ok_or(PageError::AllocationFailed)?;

        // Anonymous mappings are zero-filled by the kernel.
        let mut region = unsafe { Region::from_raw_parts(ptr, size, false) };

        match mlock(&region) {
            Ok(()) => region.set_locked(true),
            Err(e) => log::warn!("mlock of {size} bytes failed, region may be swapped: {e}"),
        }

        if let Err(e) = exclude_from_core_dumps(&region) {
            log::debug!("madvise failed, region may appear in core dumps: {e}");
        }

        log::debug!("allocated {size} bytes (locked: {})", region.is_locked());

        Ok(region)
    }

    // NOTE Protection acts on entire pages.
    fn protect(&self, region: &Region, protection: Protection) -> Result<(), PageError> {
        let prot = match protection {
            Protection::NoAccess => libc::PROT_NONE,
            Protection::ReadOnly => libc::PROT_READ,
            Protection::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
        };

        match unsafe { libc::mprotect(region.as_ptr() as *mut _, region.len(), prot) } {
            0 => {
                unsafe { region.set_protection(protection) };
                Ok(())
            }
            _ => {
                log::debug!("mprotect to {protection:?} failed: {}", io::Error::last_os_error());
                Err(PageError::ProtectFailed)
            }
        }
    }

    fn release(&self, region: Region) -> Result<(), PageError> {
        self.wipe(&region);

        if region.is_locked() {
            // May fail (unchecked), the mapping goes away next anyway.
            unsafe { libc::munlock(region.as_ptr() as *const _, region.len()) };
        }

        match unsafe { libc::munmap(region.as_ptr() as *mut _, region.len()) } {
            0 => {
                log::debug!("released {} bytes", region.len());
                Ok(())
            }
            _ => Err(PageError::ReleaseFailed),
        }
    }
}

fn mlock(region: &Region) -> io::Result<()> {
    match unsafe { libc::mlock(region.as_ptr() as *const _, region.len()) } {
        0 => Ok(()),
        _ => Err(io::Error::last_os_error()),
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn exclude_from_core_dumps(region: &Region) -> io::Result<()> {
    madvise(region, libc::MADV_DONTDUMP)
}

#[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
fn exclude_from_core_dumps(region: &Region) -> io::Result<()> {
    madvise(region, libc::MADV_NOCORE)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly"
)))]
fn exclude_from_core_dumps(_region: &Region) -> io::Result<()> {
    Ok(())
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
fn madvise(region: &Region, advice: libc::c_int) -> io::Result<()> {
    match unsafe { libc::madvise(region.as_ptr() as *mut _, region.len(), advice) } {
        0 => Ok(()),
        _ => Err(io::Error::last_os_error()),
    }
}
