// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! SecureBuffer over a provider without protection support.

use proptest::prelude::*;

use stash_page::{NullProvider, Protection};

use crate::error::BufferError;
use crate::secure_buffer::SecureBuffer;

static NULL: NullProvider = NullProvider::new();

fn null_buffer(len: usize) -> SecureBuffer {
    SecureBuffer::allocate(&NULL, len).expect("Failed to allocate()")
}

#[test]
fn test_degraded_buffer_stays_read_write() {
    let buffer = null_buffer(32);

    assert!(!buffer.toggles_protection());
    assert!(!buffer.is_locked());
    assert_eq!(buffer.protection(), Protection::ReadWrite);
    assert_eq!(buffer.provider_name(), "null");

    buffer
        .with_read_access(|_| assert_eq!(buffer.protection(), Protection::ReadWrite))
        .expect("Failed to with_read_access()");

    assert_eq!(buffer.protection(), Protection::ReadWrite);
}

#[test]
fn test_degraded_buffer_still_rejects_nested_scopes() {
    let buffer = null_buffer(8);

    let inner = buffer
        .with_write_access(|_| buffer.with_read_access(|_| ()))
        .expect("Failed to with_write_access()");

    assert_eq!(inner, Err(BufferError::ReentrantAccess));
}

#[test]
fn test_degraded_buffer_release_closes() {
    let mut buffer = null_buffer(8);

    buffer.release();

    assert!(buffer.is_released());
    assert_eq!(buffer.with_read_access(|_| ()), Err(BufferError::BufferClosed));
}

proptest! {
    #[test]
    fn prop_written_bytes_read_back(data in proptest::collection::vec(any::<u8>(), 1..2048)) {
        let buffer = null_buffer(data.len());

        buffer
            .with_write_access(|bytes| bytes.copy_from_slice(&data))
            .expect("Failed to with_write_access()");

        let read = buffer
            .with_read_access(|bytes| bytes.to_vec())
            .expect("Failed to with_read_access()");

        prop_assert_eq!(read, data);
    }

    #[test]
    fn prop_view_never_exceeds_len(len in 1usize..20_000) {
        let buffer = null_buffer(len);

        let view_len = buffer
            .with_read_access(|bytes| bytes.len())
            .expect("Failed to with_read_access()");

        prop_assert_eq!(view_len, len);
        prop_assert!(buffer.allocated_len() >= len);
    }
}
