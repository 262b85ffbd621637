// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for stash-buffer.
use thiserror::Error;

use stash_page::PageError;

/// Errors that can occur when working with secure buffers.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum BufferError {
    /// An error occurred during a page operation.
    #[error("PageError: {0}")]
    Page(#[from] PageError),

    /// The buffer has already been released.
    #[error("buffer has been released")]
    BufferClosed,

    /// Another access scope is open on this buffer.
    #[error("an access scope is already open on this buffer")]
    ReentrantAccess,
}
