// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Guarded memory buffers with scoped access and wipe-on-release.
//!
//! A [`SecureBuffer`] owns one page-aligned region obtained from a
//! [`MemoryProvider`](stash_page::MemoryProvider):
//! - Locked against swap when the process is allowed to
//! - Hidden (`NoAccess`) while idle when the provider supports protection
//! - Readable or writable only inside a closure scope, one scope at a time
//! - Wiped and released exactly once, explicitly or on drop
//!
//! # Example
//!
//! ```rust
//! use stash_buffer::{BufferError, SecureBuffer};
//!
//! fn example() -> Result<(), BufferError> {
//!     let mut buffer = SecureBuffer::allocate(stash_page::system(), 32)?;
//!
//!     buffer.with_write_access(|bytes| bytes.fill(42))?;
//!
//!     let first = buffer.with_read_access(|bytes| bytes[0])?;
//!     assert_eq!(first, 42);
//!
//!     // Wiped, unlocked and unmapped
//!     buffer.release();
//!     assert_eq!(buffer.with_read_access(|_| ()), Err(BufferError::BufferClosed));
//!
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
mod tests;

mod error;
mod secure_buffer;

pub use error::BufferError;
pub use secure_buffer::SecureBuffer;
