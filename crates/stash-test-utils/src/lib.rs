// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for Stash crates.
//!
//! ## License
//!
//! GPL-3.0-only

mod providers;
#[cfg(target_os = "linux")]
mod seccomp;
mod subprocess;

pub use providers::{FailingProvider, InspectingProvider, leak};
#[cfg(target_os = "linux")]
pub use seccomp::{block_mlock, block_mprotect};
pub use subprocess::run_test_as_subprocess;
