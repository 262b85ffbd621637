// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Seccomp filters that make memory syscalls fail with `EPERM`.
//!
//! A loaded filter cannot be removed: only call these from a test that runs
//! in its own subprocess.

use libseccomp::{ScmpAction, ScmpFilterContext, ScmpSyscall};

fn block_syscall(name: &str) {
    let mut filter = ScmpFilterContext::new(ScmpAction::Allow).expect("Failed to create filter");
    filter
        .add_rule(
            ScmpAction::Errno(libc::EPERM),
            ScmpSyscall::from_name(name).expect("Failed to from_name(..)"),
        )
        .expect("Failed to add rule");
    filter.load().expect("Failed to load seccomp filter");
}

/// Blocks `mlock` for the rest of the process.
pub fn block_mlock() {
    block_syscall("mlock");
}

/// Blocks `mprotect` for the rest of the process.
pub fn block_mprotect() {
    block_syscall("mprotect");
}
