// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! <p align="center"><em>Guarded in-memory secrets for Rust.</em></p>
//!
//! ---
//!
//! Stash keeps passwords, keys and tokens in memory that is locked against
//! swap, hidden from stray reads while idle, and wiped before it is ever
//! handed back to the operating system.
//!
//! # Features
//!
//! - 🔒 **Locked pages** — `mlock` / `VirtualLock`, best effort and reported
//! - 🛡️ **Hidden while idle** — pages are `NoAccess` outside an access scope
//! - 🧹 **Wiped exactly once** — on `close()` or drop, on every exit path
//! - 🎯 **Scoped access** — bytes exist as a slice only inside a closure
//! - 🚫 **Loud misuse** — nested scopes and closed handles are typed errors
//!
//! # Quick Start
//!
//! ```rust
//! use stash::{SecretError, create_secret};
//!
//! fn main() -> Result<(), SecretError> {
//!     let caps = stash::capabilities();
//!     if !caps.can_lock_pages {
//!         eprintln!("warning: secrets may be swapped to disk");
//!     }
//!
//!     let mut secret = create_secret(32)?;
//!
//!     // Pages are writable only inside the closure
//!     secret.update(|bytes| bytes.copy_from_slice(&[0x11; 32]))?;
//!
//!     let checksum = secret.expose(|bytes| bytes.iter().map(|&b| b as u32).sum::<u32>())?;
//!     assert_eq!(checksum, 0x11 * 32);
//!
//!     // Wiped, unlocked and unmapped. Drop would do the same.
//!     secret.close();
//!     assert_eq!(secret.expose(|_| ()), Err(SecretError::HandleClosed));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! create_secret(len) ──▶ Open ──close() / drop──▶ Closed
//!                         │
//!                         ├─ expose(|&[u8]| ..)      ReadOnly for the scope
//!                         └─ update(|&mut [u8]| ..)  ReadWrite for the scope
//! ```
//!
//! `Closed` is terminal. Copies are always explicit
//! ([`SecretHandle::try_clone`], [`SecretHandle::transfer`]) and land in
//! freshly allocated memory.
//!
//! # Grouping secrets
//!
//! ```rust
//! let mut stash = stash::Stash::new();
//!
//! let mut password = *b"hunter2";
//! let id = stash.put(&mut password)?;
//! assert_eq!(password, [0u8; 7]);
//!
//! assert_eq!(stash.get(id).map(|s| s.len()), Some(7));
//!
//! // Typed values are encoded straight into guarded memory
//! let mut token = String::from("tok-1234");
//! let typed = stash.put_with::<stash::Utf8>(&mut token)?;
//! assert!(token.is_empty());
//!
//! let prefix = stash
//!     .get(typed)
//!     .map(|s| s.expose_with::<stash::Utf8, _, _>(|t| t.starts_with("tok-")));
//! assert_eq!(prefix, Some(Ok(true)));
//!
//! // Closes one secret, then every other one
//! assert!(stash.close(id));
//! stash.clear();
//! # Ok::<(), stash::SecretError>(())
//! ```
//!
//! [`Stash::with_provider`] allocates through a provider of your choice,
//! for example [`NullProvider`] on targets without page protection.
//!
//! # Platform support
//!
//! | Platform | Provider | Protection level |
//! |----------|----------|------------------|
//! | Linux, macOS, BSDs | `unix` | `mmap`, `mlock`, `mprotect`, dump exclusion |
//! | Windows | `windows` | `VirtualAlloc`, `VirtualLock`, `VirtualProtect` |
//! | Others | `null` | Wipe only |
//!
//! Locking can fail under a small `RLIMIT_MEMLOCK` or missing privileges.
//! That degrades silently per allocation; [`capabilities()`] tells you
//! whether it happened. The same holds for `mprotect` denied by a sandbox:
//! secrets then stay mapped read-write while idle.
//!
//! # Logging
//!
//! Every crate logs through the [`log`](https://docs.rs/log) facade. Install
//! any logger to see probe results, degradations, and the reason before an
//! abort.
//!
//! # License
//!
//! GPL-3.0-only

pub use stash_buffer as buffer;
pub use stash_caps as caps;
pub use stash_page as page;
pub use stash_secret as secret;

pub use stash_buffer::{BufferError, SecureBuffer};
pub use stash_caps::{MAX_SECRET_PAGES, MemoryCapabilities, capabilities};
pub use stash_page::{MemoryProvider, NullProvider, PageError, Protection};
pub use stash_secret::{
    HandleState, RawBytes, SecretError, SecretHandle, SecretId, Serializer, Stash, Utf8,
    create_secret,
};
