// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Platform memory providers for guarded secret storage.
//!
//! A [`MemoryProvider`] hands out page-aligned [`Region`]s and exposes the
//! handful of operations secret storage needs:
//!
//! - allocation of fresh zeroed pages, locked against swap when permitted
//! - page protection changes (no access / read-only / read-write)
//! - wiping that the optimizer cannot remove
//! - release back to the operating system
//!
//! # Providers
//!
//! - `UnixProvider` (Unix only): `mmap`, `mlock`, `mprotect`, `madvise`
//! - `WindowsProvider` (Windows only): `VirtualAlloc`, `VirtualLock`, `VirtualProtect`
//! - [`NullProvider`]: heap fallback with no locking and no protection
//!
//! [`system()`] returns the provider for the current platform.
//!
//! # Example
//!
//! ```rust
//! use stash_page::{MemoryProvider, PageError, Protection};
//!
//! fn example() -> Result<(), PageError> {
//!     let provider = stash_page::system();
//!     let region = provider.allocate(32)?;
//!
//!     assert!(region.len() >= 32);
//!     assert_eq!(region.len() % provider.page_size(), 0);
//!
//!     match provider.protect(&region, Protection::NoAccess) {
//!         Ok(()) | Err(PageError::UnsupportedOperation) => {}
//!         Err(e) => return Err(e),
//!     }
//!
//!     // Wiped, unlocked and unmapped
//!     provider.release(region)
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

mod error;
mod null;
mod protection;
mod provider;
mod region;

#[cfg(unix)]
pub use unix::UnixProvider;

#[cfg(windows)]
pub use windows::WindowsProvider;

pub use error::PageError;
pub use null::NullProvider;
pub use protection::Protection;
pub use provider::{MemoryProvider, abort, round_to_page, system};
pub use region::Region;
