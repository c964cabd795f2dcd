// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapting a host application's geometry types to a lookup.
//!
//! A host implements [`HostGeometry`] once for its own point, box, and query
//! types; [`HostLookup`] then accepts and returns those types while
//! forwarding every call unchanged to the wrapped [`Lookup`].

use core::fmt::Debug;
use core::marker::PhantomData;

use crate::error::LookupError;
use crate::lookup::{Lookup, Stop};
use crate::types::{Aabb3D, QueryItem, Vec3};

/// Pure conversions between a host's geometry and this crate's types.
pub trait HostGeometry {
    /// Host point type.
    type Point;
    /// Host box type.
    type Bounds;
    /// Host query type. Must be able to express every [`QueryItem`].
    type Query;

    /// Host point to [`Vec3`].
    fn to_vec3(point: &Self::Point) -> Vec3;
    /// [`Vec3`] to host point.
    fn from_vec3(v: Vec3) -> Self::Point;
    /// Host box to [`Aabb3D`].
    fn to_aabb(bounds: &Self::Bounds) -> Aabb3D;
    /// [`Aabb3D`] to host box.
    fn from_aabb(aabb: Aabb3D) -> Self::Bounds;
    /// Host query to [`QueryItem`].
    fn to_query(query: &Self::Query) -> QueryItem;
    /// [`QueryItem`] to host query.
    fn from_query(item: QueryItem) -> Self::Query;
}

/// A [`Lookup`] that speaks a host's geometry types.
pub struct HostLookup<H, T, L> {
    lookup: L,
    _marker: PhantomData<fn() -> (H, T)>,
}

impl<H, T, L> HostLookup<H, T, L>
where
    H: HostGeometry,
    L: Lookup<T>,
{
    /// Wrap `lookup`.
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            _marker: PhantomData,
        }
    }

    /// The wrapped lookup.
    pub fn inner(&self) -> &L {
        &self.lookup
    }

    /// Unwrap.
    pub fn into_inner(self) -> L {
        self.lookup
    }

    /// See [`Lookup::insert`].
    pub fn insert(&mut self, value: T, bounds: &H::Bounds) -> Result<(), LookupError> {
        self.lookup.insert(value, H::to_aabb(bounds))
    }

    /// See [`Lookup::remove`].
    pub fn remove(&mut self, value: &T, bounds: &H::Bounds) -> bool {
        self.lookup.remove(value, &H::to_aabb(bounds))
    }

    /// See [`Lookup::remove_value`].
    pub fn remove_value(&mut self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.lookup.remove_value(value)
    }

    /// See [`Lookup::len`].
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// See [`Lookup::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// See [`Lookup::clear`].
    pub fn clear(&mut self) {
        self.lookup.clear();
    }

    /// Matches as `(value, host box)` pairs. See [`Lookup::visit`].
    pub fn visit<'a>(
        &'a self,
        query: &H::Query,
    ) -> impl Iterator<Item = (&'a T, H::Bounds)> + use<'a, H, T, L>
    where
        T: 'a,
    {
        self.lookup
            .visit(H::to_query(query))
            .map(|e| (&e.value, H::from_aabb(e.aabb)))
    }

    /// See [`Lookup::values`].
    pub fn values<'a>(&'a self) -> impl Iterator<Item = &'a T> + 'a
    where
        T: 'a,
    {
        self.lookup.values()
    }

    /// See [`Lookup::visit_with_early_stop`].
    pub fn visit_with_early_stop<F>(&self, query: &H::Query, mut visitor: F)
    where
        F: FnMut(&H::Bounds, &T, &mut Stop),
    {
        self.lookup
            .visit_with_early_stop(H::to_query(query), |aabb, value, stop| {
                visitor(&H::from_aabb(*aabb), value, stop);
            });
    }
}

impl<H, T, L: Debug> Debug for HostLookup<H, T, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HostLookup")
            .field("lookup", &self.lookup)
            .finish_non_exhaustive()
    }
}
