// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Secret handles: the only object an application holds.
//!
//! A [`SecretHandle`] is the sole owner of one
//! [`SecureBuffer`](stash_buffer::SecureBuffer). It is created by
//! [`create_secret`], read through [`expose`](SecretHandle::expose),
//! written through [`update`](SecretHandle::update), and closed exactly
//! once, explicitly or on drop. Closing wipes the memory before it is
//! unlocked and unmapped.
//!
//! [`Stash`] groups several handles so they can be closed together.
//! Typed values go through a [`Serializer`], which encodes straight into
//! the guarded buffer.
//!
//! ## License
//!
//! GPL-3.0-only

#![warn(missing_docs)]

#[cfg(test)]
mod tests;

mod error;
mod handle;
mod serializer;
mod stash;

pub use error::SecretError;
pub use handle::{HandleState, SecretHandle, create_secret};
pub use serializer::{RawBytes, Serializer, Utf8};
pub use stash::{SecretId, Stash};
