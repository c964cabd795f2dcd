// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily recomputed size counter.

use core::sync::atomic::{AtomicUsize, Ordering};

const DIRTY: usize = usize::MAX;

/// Memoized occurrence count with a dirty marker.
///
/// Mutations call [`SizeCache::invalidate`]; the next [`SizeCache::get`]
/// recomputes. Atomic so a lookup shared read-only across threads stays `Sync`.
pub(crate) struct SizeCache {
    value: AtomicUsize,
}

impl SizeCache {
    pub(crate) const fn new() -> Self {
        Self {
            value: AtomicUsize::new(0),
        }
    }

    pub(crate) fn invalidate(&self) {
        self.value.store(DIRTY, Ordering::Relaxed);
    }

    pub(crate) fn get(&self, compute: impl FnOnce() -> usize) -> usize {
        match self.value.load(Ordering::Relaxed) {
            DIRTY => {
                let v = compute();
                self.value.store(v, Ordering::Relaxed);
                v
            }
            v => v,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_dirty(&self) -> bool {
        self.value.load(Ordering::Relaxed) == DIRTY
    }
}

impl Default for SizeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SizeCache {
    fn clone(&self) -> Self {
        Self {
            value: AtomicUsize::new(self.value.load(Ordering::Relaxed)),
        }
    }
}

impl core::fmt::Debug for SizeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.value.load(Ordering::Relaxed) {
            DIRTY => f.write_str("SizeCache(dirty)"),
            v => write!(f, "SizeCache({v})"),
        }
    }
}
