// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Typed secrets: how a value is laid out inside a guarded buffer.

use zeroize::Zeroize;

/// Encodes a value straight into secret memory and decodes it back.
///
/// `serialize` writes into the guarded buffer itself, so no unguarded copy
/// of the encoded form is ever made. Decoded values are wiped as soon as
/// the caller's closure returns, hence the `Zeroize` bound.
pub trait Serializer {
    /// The value type stored in the secret.
    type Value: Zeroize;

    /// Exact number of bytes `serialize` writes for `value`.
    fn encoded_len(value: &Self::Value) -> usize;

    /// Writes `value` into `out`, which is exactly `encoded_len(value)` bytes.
    fn serialize(value: &Self::Value, out: &mut [u8]);

    /// Rebuilds a value, or `None` if `bytes` is not a valid encoding.
    fn deserialize(bytes: &[u8]) -> Option<Self::Value>;
}

/// Stores a `String` as its UTF-8 bytes.
#[derive(Debug, Clone, Copy)]
pub struct Utf8;

impl Serializer for Utf8 {
    type Value = String;

    fn encoded_len(value: &String) -> usize {
        value.len()
    }

    fn serialize(value: &String, out: &mut [u8]) {
        out.copy_from_slice(value.as_bytes());
    }

    fn deserialize(bytes: &[u8]) -> Option<String> {
        core::str::from_utf8(bytes).ok().map(str::to_owned)
    }
}

/// Stores a `Vec<u8>` as is.
#[derive(Debug, Clone, Copy)]
pub struct RawBytes;

impl Serializer for RawBytes {
    type Value = Vec<u8>;

    fn encoded_len(value: &Vec<u8>) -> usize {
        value.len()
    }

    fn serialize(value: &Vec<u8>, out: &mut [u8]) {
        out.copy_from_slice(value);
    }

    fn deserialize(bytes: &[u8]) -> Option<Vec<u8>> {
        Some(bytes.to_vec())
    }
}
