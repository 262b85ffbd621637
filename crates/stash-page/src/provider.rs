// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! MemoryProvider - the per-platform seam for page allocation and protection.

use zeroize::Zeroize;

use crate::error::PageError;
use crate::protection::Protection;
use crate::region::Region;

/// Platform memory operations behind one interface.
///
/// Implementations exist per platform family, plus [`NullProvider`](crate::NullProvider)
/// for targets (or callers) without locking and protection.
pub trait MemoryProvider: Send + Sync + core::fmt::Debug {
    /// Short identifier, e.g. `"unix"`.
    fn name(&self) -> &'static str;

    /// Granularity of allocation and protection.
    fn page_size(&self) -> usize;

    /// Maps a fresh zeroed read-write region of at least `len` bytes and
    /// attempts to lock it against swap.
    ///
    /// A lock failure is not an error: the region comes back with
    /// `is_locked() == false`.
    fn allocate(&self, len: usize) -> Result<Region, PageError>;

    /// Changes the protection of every page in `region`.
    ///
    /// On success the new state is recorded on the region
    /// ([`Region::protection`]). On failure the region keeps its previous
    /// protection.
    fn protect(&self, region: &Region, protection: Protection) -> Result<(), PageError>;

    /// Wipes and unmaps `region`.
    fn release(&self, region: Region) -> Result<(), PageError>;

    /// Overwrites every byte of `region` with zero.
    ///
    /// Leaves the region ReadWrite. Never returns an error: if the pages are
    /// not writable and cannot be made so, the process aborts.
    fn wipe(&self, region: &Region) {
        if !region.protection().is_writable() {
            match self.protect(region, Protection::ReadWrite) {
                Ok(()) | Err(PageError::UnsupportedOperation) => {}
                Err(e) => abort(e),
            }
        }

        // Safety: the region is writable here and callers hold no views.
        unsafe { region.as_mut_slice() }.zeroize();
    }
}

/// Rounds `len` up to a whole number of pages. Zero rounds to one page.
pub fn round_to_page(len: usize, page_size: usize) -> Option<usize> {
    let len = len.max(1);
    let pages = len.checked_add(page_size - 1)? / page_size;

    pages.checked_mul(page_size)
}

/// Terminates the process after an invariant violation that would otherwise
/// leave secret memory mapped without a wipe.
#[cold]
#[inline(never)]
pub fn abort(error: PageError) -> ! {
    log::error!("aborting: unrecoverable secure memory failure: {error}");

    // Exit code carries the error so subprocess tests can assert on it.
    #[cfg(test)]
    std::process::exit(error as i32);

    #[cfg(not(test))]
    std::process::abort()
}

/// Returns the provider for the current platform.
pub fn system() -> &'static dyn MemoryProvider {
    #[cfg(unix)]
    {
        static PROVIDER: crate::unix::UnixProvider = crate::unix::UnixProvider::new();
        &PROVIDER
    }

    #[cfg(windows)]
    {
        static PROVIDER: crate::windows::WindowsProvider = crate::windows::WindowsProvider::new();
        &PROVIDER
    }

    #[cfg(not(any(unix, windows)))]
    {
        static PROVIDER: crate::null::NullProvider = crate::null::NullProvider::new();
        &PROVIDER
    }
}
