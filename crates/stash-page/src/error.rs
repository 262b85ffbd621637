// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Error types for stash-page.
use thiserror::Error;

/// Errors from platform memory operations.
///
/// The discriminant doubles as the process exit code on abort paths under test.
///
/// Lock failures are not errors: they surface as
/// [`Region::is_locked`](crate::Region::is_locked) returning false.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum PageError {
    /// The operating system refused to map the region.
    #[error("allocation refused by the operating system")]
    AllocationFailed = 1,

    /// Changing page protection failed.
    #[error("failed to change page protection")]
    ProtectFailed = 3,

    /// The provider cannot perform this operation on this platform.
    #[error("operation not supported by this memory provider")]
    UnsupportedOperation = 4,

    /// Returning the region to the operating system failed.
    #[error("failed to release region")]
    ReleaseFailed = 5,
}
