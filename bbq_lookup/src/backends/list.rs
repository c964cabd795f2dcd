// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Append-ordered list backend with linear scans. Small and simple; good for tiny sets.

use core::fmt::Debug;

use crate::error::LookupError;
use crate::lookup::{Entry, Lookup};
use crate::types::{Aabb3D, QueryItem};

/// List backend with linear scans.
///
/// Insert is O(1), remove and visit are O(n). Visits filter lazily, so a
/// visitor that stops early skips the rest of the scan.
#[derive(Clone)]
pub struct ListLookup<T> {
    entries: Vec<Entry<T>>,
}

impl<T> ListLookup<T> {
    /// Create an empty list.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create an empty list with room for `n` occurrences.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }
}

impl<T> Default for ListLookup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for ListLookup<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListLookup")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.capacity())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq> Lookup<T> for ListLookup<T> {
    fn insert(&mut self, value: T, aabb: Aabb3D) -> Result<(), LookupError> {
        aabb.validate()?;
        self.entries.push(Entry::new(value, aabb));
        Ok(())
    }

    fn remove(&mut self, value: &T, aabb: &Aabb3D) -> bool {
        match self
            .entries
            .iter()
            .position(|e| e.aabb == *aabb && e.value == *value)
        {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => {
                tracing::trace!(?aabb, "list remove: no matching occurrence");
                false
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn visit<'a>(&'a self, query: QueryItem) -> Box<dyn Iterator<Item = &'a Entry<T>> + 'a> {
        Box::new(
            self.entries
                .iter()
                .filter(move |e| e.aabb.intersects(&query)),
        )
    }
}
