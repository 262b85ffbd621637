// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! Stash - a keyed collection of secrets that can be disposed at once.

use std::collections::BTreeMap;

use stash_page::MemoryProvider;

use crate::error::SecretError;
use crate::handle::SecretHandle;
use crate::serializer::Serializer;

/// Identifier of a secret inside a [`Stash`].
///
/// Identifiers are never reused within one stash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretId(u64);

impl SecretId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Owns a group of secrets. Clearing or dropping the stash closes all of them.
///
/// Secrets created by the stash come from the system provider, or from the
/// provider passed to [`with_provider`](Stash::with_provider).
///
/// # Example
///
/// ```
/// use stash_secret::Stash;
///
/// let mut stash = Stash::new();
///
/// let mut token = *b"tok-1234";
/// let id = stash.put(&mut token)?;
/// assert_eq!(token, [0u8; 8]);
///
/// let first = stash.get(id).map(|s| s.expose(|b| b[0]));
/// assert_eq!(first, Some(Ok(b't')));
///
/// stash.clear();
/// assert!(stash.is_empty());
/// # Ok::<(), stash_secret::SecretError>(())
/// ```
#[derive(Default)]
pub struct Stash {
    provider: Option<&'static dyn MemoryProvider>,
    secrets: BTreeMap<SecretId, SecretHandle>,
    next_id: u64,
}

impl Stash {
    /// Creates an empty stash backed by the system provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stash whose secrets are allocated through `provider`.
    pub fn with_provider(provider: &'static dyn MemoryProvider) -> Self {
        Self {
            provider: Some(provider),
            secrets: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Name of the provider new secrets are allocated through.
    pub fn provider_name(&self) -> &'static str {
        match self.provider {
            Some(provider) => provider.name(),
            None => stash_page::system().name(),
        }
    }

    /// Copies `bytes` into a new secret, zeroizes `bytes`, and stores it.
    ///
    /// On failure `bytes` is left untouched.
    pub fn put(&mut self, bytes: &mut [u8]) -> Result<SecretId, SecretError> {
        let handle = match self.provider {
            Some(provider) => SecretHandle::from_bytes_in(provider, bytes)?,
            None => SecretHandle::from_bytes(bytes)?,
        };

        Ok(self.insert(handle))
    }

    /// Encodes `value` into a new secret with `S`, zeroizes `value`, and
    /// stores it.
    ///
    /// Read it back with [`SecretHandle::expose_with`].
    pub fn put_with<S: Serializer>(&mut self, value: &mut S::Value) -> Result<SecretId, SecretError> {
        let handle = match self.provider {
            Some(provider) => SecretHandle::from_value_in::<S>(provider, value)?,
            None => SecretHandle::from_value::<S>(value)?,
        };

        Ok(self.insert(handle))
    }

    /// Takes ownership of an existing handle.
    pub fn insert(&mut self, handle: SecretHandle) -> SecretId {
        let id = SecretId(self.next_id);
        self.next_id += 1;
        self.secrets.insert(id, handle);

        id
    }

    /// Returns the secret stored under `id`.
    pub fn get(&self, id: SecretId) -> Option<&SecretHandle> {
        self.secrets.get(&id)
    }

    /// Returns the secret stored under `id` for lifecycle operations
    /// (close, resize, transfer).
    pub fn get_mut(&mut self, id: SecretId) -> Option<&mut SecretHandle> {
        self.secrets.get_mut(&id)
    }

    /// Removes a secret and hands it back to the caller, still open.
    pub fn remove(&mut self, id: SecretId) -> Option<SecretHandle> {
        self.secrets.remove(&id)
    }

    /// Closes the secret stored under `id` and forgets it.
    ///
    /// Returns false if no secret is stored under `id`.
    pub fn close(&mut self, id: SecretId) -> bool {
        match self.secrets.remove(&id) {
            Some(mut handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    /// Returns true if a secret is stored under `id`.
    pub fn contains(&self, id: SecretId) -> bool {
        self.secrets.contains_key(&id)
    }

    /// Identifiers of all stored secrets, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = SecretId> + '_ {
        self.secrets.keys().copied()
    }

    /// Closes every secret and empties the stash.
    pub fn clear(&mut self) {
        let count = self.secrets.len();

        for (_, mut handle) in core::mem::take(&mut self.secrets) {
            handle.close();
        }

        if count > 0 {
            log::debug!("stash cleared, {count} secrets closed");
        }
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Returns true if the stash holds no secrets.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl Drop for Stash {
    fn drop(&mut self) {
        self.clear();
    }
}

impl core::fmt::Debug for Stash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stash")
            .field("len", &self.secrets.len())
            .finish_non_exhaustive()
    }
}
