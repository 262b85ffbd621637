// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! WindowsProvider - VirtualAlloc/VirtualLock/VirtualProtect backed regions.

use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};
use std::io;
use std::sync::OnceLock;

use windows_sys::Win32::System::{Memory as win, SystemInformation as win_info};

use crate::error::PageError;
use crate::protection::Protection;
use crate::provider::{MemoryProvider, round_to_page};
use crate::region::Region;

/// Provider for Windows.
///
/// Regions are committed with `VirtualAlloc` and locked into the working set
/// with `VirtualLock` when the process quota allows it.
#[derive(Debug)]
pub struct WindowsProvider(());

impl WindowsProvider {
    /// Creates the provider. It holds no state.
    pub const fn new() -> Self {
        Self(())
    }
}

impl Default for WindowsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider for WindowsProvider {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn page_size(&self) -> usize {
        static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

        *PAGE_SIZE.get_or_init(|| {
            let sys_info = {
                let mut sys_info = MaybeUninit::<win_info::SYSTEM_INFO>::uninit();
                unsafe {
                    win_info::GetSystemInfo(sys_info.as_mut_ptr());
                    sys_info.assume_init()
                }
            };

            sys_info.dwPageSize as usize
        })
    }

    fn allocate(&self, len: usize) -> Result<Region, PageError> {
        let size = round_to_page(len, self.page_size()).ok_or(PageError::AllocationFailed)?;

        let ptr = unsafe {
            win::VirtualAlloc(
                ptr::null(),
                size,
                win::MEM_COMMIT | win::MEM_RESERVE,
                win::PAGE_READWRITE,
            )
        };

        let Some(ptr) = NonNull::new(ptr as *mut u8) else {
            log::debug!("VirtualAlloc of {size} bytes failed: {}", io::Error::last_os_error());
            return Err(PageError::AllocationFailed);
        };

        // Committed pages are zero-filled by the system.
        let mut region = unsafe { Region::from_raw_parts(ptr, size, false) };

        match unsafe { win::VirtualLock(region.as_ptr() as *const _, size) } {
            0 => log::warn!(
                "VirtualLock of {size} bytes failed, region may be paged out: {}",
                io::Error::last_os_error()
            ),
            _ => region.set_locked(true),
        }

        log::debug!("allocated {size} bytes (locked: {})", region.is_locked());

        Ok(region)
    }

    // NOTE Protection acts on entire pages.
    fn protect(&self, region: &Region, protection: Protection) -> Result<(), PageError> {
        let flags = match protection {
            Protection::NoAccess => win::PAGE_NOACCESS,
            Protection::ReadOnly => win::PAGE_READONLY,
            Protection::ReadWrite => win::PAGE_READWRITE,
        };

        let mut old_flags = 0;
        match unsafe {
            win::VirtualProtect(region.as_ptr() as *const _, region.len(), flags, &mut old_flags)
        } {
            0 => {
                log::debug!(
                    "VirtualProtect to {protection:?} failed: {}",
                    io::Error::last_os_error()
                );
                Err(PageError::ProtectFailed)
            }
            _ => {
                unsafe { region.set_protection(protection) };
                Ok(())
            }
        }
    }

    fn release(&self, region: Region) -> Result<(), PageError> {
        self.wipe(&region);

        if region.is_locked() {
            // May fail (unchecked), the pages are freed next anyway.
            unsafe { win::VirtualUnlock(region.as_ptr() as *const _, region.len()) };
        }

        match unsafe { win::VirtualFree(region.as_ptr() as *mut _, 0, win::MEM_RELEASE) } {
            0 => Err(PageError::ReleaseFailed),
            _ => {
                log::debug!("released {} bytes", region.len());
                Ok(())
            }
        }
    }
}
