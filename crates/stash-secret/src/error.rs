// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for stash-secret.
use thiserror::Error;

use stash_buffer::BufferError;
use stash_page::PageError;

/// Errors returned by secret handles and the allocation entry point.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum SecretError {
    /// Requested length is zero or above the platform maximum.
    #[error("invalid secret size {len} (expected 1..={max})")]
    InvalidSize {
        /// Requested length.
        len: usize,
        /// Largest accepted length.
        max: usize,
    },

    /// The handle has been closed.
    #[error("secret handle is closed")]
    HandleClosed,

    /// The stored bytes are not a valid encoding for the requested type.
    #[error("secret bytes do not decode as the requested type")]
    Malformed,

    /// An error occurred in the underlying buffer.
    #[error("BufferError: {0}")]
    Buffer(#[from] BufferError),
}

impl SecretError {
    /// Returns true if the provider refused to allocate memory.
    ///
    /// This is how locked-page budget exhaustion surfaces.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            SecretError::Buffer(BufferError::Page(PageError::AllocationFailed))
        )
    }

    /// Returns true if another access scope was already open on the handle.
    pub fn is_reentrant_access(&self) -> bool {
        matches!(self, SecretError::Buffer(BufferError::ReentrantAccess))
    }
}
