// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

//! stash_caps - Process-wide memory capability probe
//!
//! Probes the system [`MemoryProvider`] once to find out whether pages can
//! actually be locked and protected in this process (locking commonly fails
//! under restricted privileges or a tiny `RLIMIT_MEMLOCK`). Uses a spin lock
//! to ensure only one thread performs the probe.

#![warn(missing_docs)]


use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

use stash_page::{MemoryProvider, Protection};

/// Largest secret, in pages, a single allocation may request.
pub const MAX_SECRET_PAGES: usize = 256;

/// What the memory provider can actually do in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCapabilities {
    /// Whether pages can be locked against swap.
    ///
    /// When `false`, secrets still work but may be written to swap.
    pub can_lock_pages: bool,

    /// Whether page protection can be changed.
    ///
    /// When `false`, idle secrets stay readable/writable in the address space.
    pub can_protect_pages: bool,

    /// Page size used for rounding allocations.
    pub page_size: usize,

    /// Largest secret length accepted by `create_secret`.
    pub max_secret_len: usize,

    /// Name of the provider that was probed.
    pub provider: &'static str,
}

impl MemoryCapabilities {
    /// Returns true if both locking and protection are available.
    pub fn is_fully_protected(&self) -> bool {
        self.can_lock_pages && self.can_protect_pages
    }
}

/// Returns the platform maximum secret length for a given page size.
pub fn max_secret_len(page_size: usize) -> usize {
    page_size.saturating_mul(MAX_SECRET_PAGES)
}

/// Initialization state: not yet attempted
const STATE_UNINIT: u8 = 0;
/// Initialization state: in progress by another thread
const STATE_IN_PROGRESS: u8 = 1;
/// Initialization state: completed
const STATE_DONE: u8 = 2;

static INIT_STATE: AtomicU8 = AtomicU8::new(STATE_UNINIT);
static CAN_LOCK_PAGES: AtomicBool = AtomicBool::new(false);
static CAN_PROTECT_PAGES: AtomicBool = AtomicBool::new(false);
static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

/// Returns the capabilities of the system memory provider.
///
/// **Side effect on first call:** allocates a one-page probe region through
/// [`stash_page::system()`], attempts to lock and protect it, and releases
/// it. Subsequent calls return the cached result without side effects.
///
/// Thread-safe: if multiple threads call simultaneously, only one thread
/// runs the probe while others spin-wait. No caller ever observes a
/// partially initialized result.
///
/// # Example
///
/// ```
/// let caps = stash_caps::capabilities();
///
/// if !caps.can_lock_pages {
///     println!("secrets may be swapped to disk");
/// }
///
/// assert_eq!(caps, stash_caps::capabilities());
/// ```
#[inline]
pub fn capabilities() -> MemoryCapabilities {
    // Fast path: already initialized
    if INIT_STATE.load(Ordering::Acquire) == STATE_DONE {
        let page_size = PAGE_SIZE.load(Ordering::Relaxed);

        return MemoryCapabilities {
            can_lock_pages: CAN_LOCK_PAGES.load(Ordering::Relaxed),
            can_protect_pages: CAN_PROTECT_PAGES.load(Ordering::Relaxed),
            page_size,
            max_secret_len: max_secret_len(page_size),
            provider: stash_page::system().name(),
        };
    }

    init_slow();
    capabilities()
}

#[cold]
#[inline(never)]
fn init_slow() {
    // Try to become the initializer
    match INIT_STATE.compare_exchange(
        STATE_UNINIT,
        STATE_IN_PROGRESS,
        Ordering::Acquire,
        Ordering::Relaxed,
    ) {
        Ok(_) => {
            // We won, run the probe
            let caps = probe(stash_page::system());

            CAN_LOCK_PAGES.store(caps.can_lock_pages, Ordering::Relaxed);
            CAN_PROTECT_PAGES.store(caps.can_protect_pages, Ordering::Relaxed);
            PAGE_SIZE.store(caps.page_size, Ordering::Relaxed);

            // Delay STATE_DONE so concurrent callers in tests reach the spin loop.
            #[cfg(test)]
            std::thread::sleep(std::time::Duration::from_millis(100));
            INIT_STATE.store(STATE_DONE, Ordering::Release);
        }
        Err(_) => {
            // Another thread is probing or already done, spin until done
            while INIT_STATE.load(Ordering::Acquire) != STATE_DONE {
                core::hint::spin_loop();
            }
        }
    }
}

/// Probes `provider` and describes what it can do.
///
/// Never fails: an operation that does not work is recorded as unavailable.
/// Unlike [`capabilities()`], nothing is cached.
pub fn probe(provider: &dyn MemoryProvider) -> MemoryCapabilities {
    let page_size = provider.page_size();
    let mut caps = MemoryCapabilities {
        can_lock_pages: false,
        can_protect_pages: false,
        page_size,
        max_secret_len: max_secret_len(page_size),
        provider: provider.name(),
    };

    let region = match provider.allocate(1) {
        Ok(region) => region,
        Err(e) => {
            log::warn!("capability probe on {} could not allocate: {e}", provider.name());
            return caps;
        }
    };

    caps.can_lock_pages = region.is_locked();

    let hidden = provider.protect(&region, Protection::NoAccess);
    let restored = provider.protect(&region, Protection::ReadWrite);

    caps.can_protect_pages = hidden.is_ok() && restored.is_ok();

    if region.protection() == Protection::ReadWrite {
        if let Err(e) = provider.release(region) {
            log::warn!("capability probe could not release its region: {e}");
        }
    } else if let Err(e) = restored {
        // Holds no secret: leak it rather than abort inside wipe().
        log::warn!("capability probe could not restore its region ({e}), leaking it");
    }

    if !caps.can_lock_pages {
        log::info!("{}: page locking unavailable, secrets may be swapped", caps.provider);
    }
    if !caps.can_protect_pages {
        log::info!("{}: page protection unavailable, idle secrets stay mapped read-write", caps.provider);
    }

    caps
}
