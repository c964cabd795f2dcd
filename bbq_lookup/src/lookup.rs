// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The lookup contract shared by every backend.

use crate::error::LookupError;
use crate::types::{Aabb3D, QueryItem};

/// A stored value together with its bounding box.
///
/// Lookups hold a multiset of entries: inserting the same pair twice stores
/// two occurrences.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<T> {
    /// The caller's value.
    pub value: T,
    /// Box the value was inserted with.
    pub aabb: Aabb3D,
}

impl<T> Entry<T> {
    /// Pair a value with its box.
    pub const fn new(value: T, aabb: Aabb3D) -> Self {
        Self { value, aabb }
    }
}

/// Stop signal handed to [`Lookup::visit_with_early_stop`] visitors.
#[derive(Clone, Debug, Default)]
pub struct Stop(bool);

impl Stop {
    /// Request that no further entries be delivered.
    pub fn stop(&mut self) {
        self.0 = true;
    }

    /// Whether [`Stop::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.0
    }
}

/// Spatial lookup over `(value, box)` occurrences.
///
/// Lookups are single-writer: mutation takes `&mut self`, so a visit in
/// progress must finish before the next insert or remove.
pub trait Lookup<T> {
    /// Add one occurrence of `(value, aabb)`.
    ///
    /// Fails with an invalid-argument error if `aabb` is inverted or has a
    /// non-finite coordinate; the lookup is unchanged in that case.
    fn insert(&mut self, value: T, aabb: Aabb3D) -> Result<(), LookupError>;

    /// Remove one occurrence equal to `(value, aabb)`.
    ///
    /// Returns `false` and changes nothing if no such occurrence exists.
    fn remove(&mut self, value: &T, aabb: &Aabb3D) -> bool;

    /// Total number of occurrences, duplicates included.
    fn len(&self) -> usize;

    /// Remove everything.
    fn clear(&mut self);

    /// Every occurrence whose box intersects `query`.
    ///
    /// Order is backend-specific. Each call evaluates the query afresh.
    fn visit<'a>(&'a self, query: QueryItem) -> Box<dyn Iterator<Item = &'a Entry<T>> + 'a>;

    /// True if the lookup holds no occurrences.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored occurrence.
    fn visit_all<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Entry<T>> + 'a> {
        self.visit(QueryItem::All)
    }

    /// Values of every stored occurrence.
    fn values<'a>(&'a self) -> Box<dyn Iterator<Item = &'a T> + 'a>
    where
        T: 'a,
    {
        Box::new(self.visit_all().map(|e| &e.value))
    }

    /// Remove every occurrence whose value equals `value`, whatever its box.
    ///
    /// Returns the number of occurrences removed.
    fn remove_value(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        let boxes: Vec<Aabb3D> = self
            .visit_all()
            .filter(|e| e.value == *value)
            .map(|e| e.aabb)
            .collect();
        let mut removed = 0;
        for aabb in &boxes {
            if self.remove(value, aabb) {
                removed += 1;
            }
        }
        removed
    }

    /// Call `visitor` with each match until it calls [`Stop::stop`].
    ///
    /// The stop request is checked after every delivery.
    fn visit_with_early_stop<F>(&self, query: QueryItem, mut visitor: F)
    where
        F: FnMut(&Aabb3D, &T, &mut Stop),
    {
        let mut stop = Stop::default();
        for entry in self.visit(query) {
            visitor(&entry.aabb, &entry.value, &mut stop);
            if stop.is_stopped() {
                break;
            }
        }
    }
}
