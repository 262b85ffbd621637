// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

/// Access mode enforced by the operating system on a region's pages.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Protection {
    /// Any access faults.
    NoAccess = 0,
    /// Reads allowed, writes fault.
    ReadOnly = 1,
    /// Reads and writes allowed.
    ReadWrite = 2,
}

impl Protection {
    /// Inverse of `protection as u8`. Unknown values map to `ReadWrite`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NoAccess,
            1 => Self::ReadOnly,
            _ => Self::ReadWrite,
        }
    }

    /// Returns true if reads are allowed.
    pub const fn is_readable(self) -> bool {
        !matches!(self, Self::NoAccess)
    }

    /// Returns true if writes are allowed.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}
