// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! SecretHandle - the exclusive owner of one guarded buffer.

use core::fmt;

use zeroize::{Zeroize, Zeroizing};

use stash_buffer::SecureBuffer;
use stash_caps::max_secret_len;
use stash_page::{MemoryProvider, Protection};

use crate::error::SecretError;
use crate::serializer::Serializer;

/// Lifecycle state of a [`SecretHandle`].
///
/// `Open --close()--> Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The handle owns a live buffer.
    Open,
    /// The buffer has been wiped and released.
    Closed,
}

/// Allocates a secret of `len` bytes through the system provider.
///
/// Runs the capability probe on first use, then validates `len` against
/// the platform maximum. Page locking is best effort: check
/// [`SecretHandle::is_locked`] (or [`stash_caps::capabilities`]) to find
/// out whether this secret may be swapped.
///
/// # Errors
/// - [`SecretError::InvalidSize`] if `len` is zero or above the maximum
/// - [`SecretError::Buffer`] if the provider refused the allocation
///
/// # Example
///
/// ```
/// use stash_secret::{SecretError, create_secret};
///
/// let mut secret = create_secret(32)?;
/// secret.update(|bytes| bytes.fill(7))?;
/// assert_eq!(secret.expose(|bytes| bytes[31])?, 7);
///
/// secret.close();
/// assert_eq!(secret.expose(|_| ()), Err(SecretError::HandleClosed));
/// # Ok::<(), SecretError>(())
/// ```
pub fn create_secret(len: usize) -> Result<SecretHandle, SecretError> {
    let caps = stash_caps::capabilities();
    validate_len(len, caps.max_secret_len)?;

    SecretHandle::allocate(stash_page::system(), len)
}

pub(crate) fn validate_len(len: usize, max: usize) -> Result<(), SecretError> {
    if len == 0 || len > max {
        return Err(SecretError::InvalidSize { len, max });
    }

    Ok(())
}

/// Exclusive owner of one guarded buffer holding a secret.
///
/// # Design Principles
///
/// - **No `Clone`**: duplication is explicit through
///   [`try_clone`](SecretHandle::try_clone), always into fresh memory
/// - **No `Deref`**: bytes are only reachable inside
///   [`expose`](SecretHandle::expose) and [`update`](SecretHandle::update)
/// - **Redacted `Debug`**: prints `[REDACTED SecretHandle]`
/// - **Close on drop**: the buffer is wiped and released on every exit path
pub struct SecretHandle {
    provider: &'static dyn MemoryProvider,
    buffer: Option<SecureBuffer>,
    len: usize,
}

impl SecretHandle {
    /// Same as [`create_secret`].
    pub fn open(len: usize) -> Result<Self, SecretError> {
        create_secret(len)
    }

    /// Allocates a secret through an explicit provider.
    ///
    /// The maximum is derived from the provider's own page size. The
    /// process-wide capability probe is not involved.
    pub fn open_in(provider: &'static dyn MemoryProvider, len: usize) -> Result<Self, SecretError> {
        validate_len(len, max_secret_len(provider.page_size()))?;

        Self::allocate(provider, len)
    }

    /// Copies `bytes` into a new secret and zeroizes `bytes`.
    ///
    /// If allocation fails, `bytes` is left untouched so the caller can
    /// retry or wipe it.
    ///
    /// # Example
    ///
    /// ```
    /// use stash_secret::SecretHandle;
    ///
    /// let mut password = *b"hunter2";
    /// let secret = SecretHandle::from_bytes(&mut password)?;
    ///
    /// assert_eq!(password, [0u8; 7]);
    /// assert!(secret.expose(|bytes| bytes == b"hunter2")?);
    /// # Ok::<(), stash_secret::SecretError>(())
    /// ```
    pub fn from_bytes(bytes: &mut [u8]) -> Result<Self, SecretError> {
        let handle = create_secret(bytes.len())?;
        handle.fill_from(bytes)
    }

    /// [`from_bytes`](Self::from_bytes) through an explicit provider.
    pub fn from_bytes_in(
        provider: &'static dyn MemoryProvider,
        bytes: &mut [u8],
    ) -> Result<Self, SecretError> {
        let handle = Self::open_in(provider, bytes.len())?;
        handle.fill_from(bytes)
    }

    /// Encodes `value` into a new secret with `S`, then zeroizes `value`.
    ///
    /// As with [`from_bytes`](Self::from_bytes), `value` is left untouched
    /// on failure.
    ///
    /// # Example
    ///
    /// ```
    /// use stash_secret::{SecretHandle, Utf8};
    ///
    /// let mut password = String::from("hunter2");
    /// let secret = SecretHandle::from_value::<Utf8>(&mut password)?;
    ///
    /// assert!(password.is_empty());
    /// assert_eq!(secret.expose_with::<Utf8, _, _>(|s| s.len())?, 7);
    /// # Ok::<(), stash_secret::SecretError>(())
    /// ```
    pub fn from_value<S: Serializer>(value: &mut S::Value) -> Result<Self, SecretError> {
        let handle = create_secret(S::encoded_len(value))?;
        handle.fill_with::<S>(value)
    }

    /// [`from_value`](Self::from_value) through an explicit provider.
    pub fn from_value_in<S: Serializer>(
        provider: &'static dyn MemoryProvider,
        value: &mut S::Value,
    ) -> Result<Self, SecretError> {
        let handle = Self::open_in(provider, S::encoded_len(value))?;
        handle.fill_with::<S>(value)
    }

    fn allocate(provider: &'static dyn MemoryProvider, len: usize) -> Result<Self, SecretError> {
        let buffer = SecureBuffer::allocate(provider, len)?;

        if !buffer.is_locked() {
            log::debug!("secret of {len} bytes is not locked against swap");
        }

        Ok(Self {
            provider,
            buffer: Some(buffer),
            len,
        })
    }

    fn fill_from(self, bytes: &mut [u8]) -> Result<Self, SecretError> {
        self.update(|dst| dst.copy_from_slice(bytes))?;
        bytes.zeroize();

        Ok(self)
    }

    fn fill_with<S: Serializer>(self, value: &mut S::Value) -> Result<Self, SecretError> {
        self.update(|dst| S::serialize(value, dst))?;
        value.zeroize();

        Ok(self)
    }

    fn buffer(&self) -> Result<&SecureBuffer, SecretError> {
        self.buffer.as_ref().ok_or(SecretError::HandleClosed)
    }

    /// Runs `f` with read-only access to the secret bytes.
    ///
    /// The slice must not escape `f`; copying bytes out of it is the
    /// caller's responsibility.
    ///
    /// # Errors
    /// - [`SecretError::HandleClosed`] after [`close`](Self::close)
    /// - [`SecretError::Buffer`] with `ReentrantAccess` if another scope on
    ///   this handle is open
    pub fn expose<F, R>(&self, f: F) -> Result<R, SecretError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        Ok(self.buffer()?.with_read_access(f)?)
    }

    /// Decodes the secret with `S` and runs `f` on the value.
    ///
    /// The decoded value is zeroized when `f` returns. It lives on the
    /// ordinary heap meanwhile, so keep `f` short.
    ///
    /// # Errors
    /// - [`SecretError::Malformed`] if `S` rejects the stored bytes
    /// - anything [`expose`](Self::expose) returns
    pub fn expose_with<S, F, R>(&self, f: F) -> Result<R, SecretError>
    where
        S: Serializer,
        F: FnOnce(&S::Value) -> R,
    {
        self.expose(|bytes| {
            let value = Zeroizing::new(S::deserialize(bytes)?);
            Some(f(&value))
        })?
        .ok_or(SecretError::Malformed)
    }

    /// Runs `f` with write access to the secret bytes.
    ///
    /// # Errors
    /// Same as [`expose`](Self::expose).
    pub fn update<F, R>(&self, f: F) -> Result<R, SecretError>
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        Ok(self.buffer()?.with_write_access(f)?)
    }

    /// Wipes and releases the buffer. Idempotent, never fails.
    pub fn close(&mut self) {
        if let Some(mut buffer) = self.buffer.take() {
            buffer.release();
            log::debug!("secret of {} bytes closed", self.len);
        }
    }

    /// Copies the secret into a freshly allocated handle.
    ///
    /// The two handles never share memory.
    pub fn try_clone(&self) -> Result<Self, SecretError> {
        let buffer = self.buffer()?;
        let copy = Self::allocate(self.provider, self.len)?;

        buffer.copy_into(copy.buffer()?)?;

        Ok(copy)
    }

    /// Moves the secret into a freshly allocated handle and closes `self`.
    ///
    /// On failure `self` stays open and unchanged.
    pub fn transfer(&mut self) -> Result<Self, SecretError> {
        let copy = self.try_clone()?;
        self.close();

        Ok(copy)
    }

    /// Changes the secret length.
    ///
    /// The common prefix is copied into a new buffer, new bytes are zero,
    /// and the old buffer is wiped and released. On failure `self` stays
    /// unchanged.
    pub fn resize(&mut self, new_len: usize) -> Result<(), SecretError> {
        let buffer = self.buffer()?;
        validate_len(new_len, max_secret_len(self.provider.page_size()))?;

        let resized = SecureBuffer::allocate(self.provider, new_len)?;
        buffer.copy_into(&resized)?;

        if let Some(mut old) = self.buffer.replace(resized) {
            old.release();
        }
        self.len = new_len;

        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState {
        match self.buffer {
            Some(_) => HandleState::Open,
            None => HandleState::Closed,
        }
    }

    /// Returns true while the handle owns a buffer.
    pub fn is_open(&self) -> bool {
        self.buffer.is_some()
    }

    /// Returns true once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.buffer.is_none()
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: secrets hold at least one byte.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the secret's pages are locked against swap.
    ///
    /// `false` once closed.
    pub fn is_locked(&self) -> bool {
        self.buffer.as_ref().is_some_and(SecureBuffer::is_locked)
    }

    /// Current page protection, `None` once closed.
    pub fn protection(&self) -> Option<Protection> {
        self.buffer.as_ref().map(SecureBuffer::protection)
    }

    /// Name of the provider that owns the memory.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl Drop for SecretHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED SecretHandle]")
    }
}
