// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Test utilities for stash-page.

use crate::{MemoryProvider, NullProvider, PageError, Protection, Region};

/// Runs an ignored test as a subprocess and returns its exit code.
pub fn run_test_as_subprocess(test_name: &str) -> Option<i32> {
    let exe = std::env::current_exe().expect("Failed to current_exe()");
    let status = std::process::Command::new(exe)
        .args([
            "--exact",
            test_name,
            "--ignored",
            "--test-threads=1",
            "--nocapture",
        ])
        .status()
        .expect("Failed to run subprocess");

    status.code()
}

/// Heap-backed provider whose protection changes always fail outright.
#[derive(Debug)]
pub struct BrokenProtectProvider(pub NullProvider);

impl MemoryProvider for BrokenProtectProvider {
    fn name(&self) -> &'static str {
        "broken-protect"
    }

    fn page_size(&self) -> usize {
        self.0.page_size()
    }

    fn allocate(&self, len: usize) -> Result<Region, PageError> {
        self.0.allocate(len)
    }

    fn protect(&self, _region: &Region, _protection: Protection) -> Result<(), PageError> {
        Err(PageError::ProtectFailed)
    }

    fn release(&self, region: Region) -> Result<(), PageError> {
        self.0.release(region)
    }
}

#[cfg(target_os = "linux")]
fn block_syscall(name: &str) {
    use libseccomp::{ScmpAction, ScmpFilterContext, ScmpSyscall};

    let mut filter = ScmpFilterContext::new(ScmpAction::Allow).expect("Failed to create filter");
    filter
        .add_rule(
            ScmpAction::Errno(libc::EPERM),
            ScmpSyscall::from_name(name).expect("Failed to from_name(..)"),
        )
        .expect("Failed to add rule");
    filter.load().expect("Failed to load seccomp filter");
}

/// Makes every later `mlock` in this process fail with `EPERM`.
#[cfg(target_os = "linux")]
pub fn block_mlock() {
    block_syscall("mlock");
}

/// Makes every later `mprotect` in this process fail with `EPERM`.
#[cfg(target_os = "linux")]
pub fn block_mprotect() {
    block_syscall("mprotect");
}
