// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=bbq_lookup --heading-base-level=0

//! Bbq Lookup: a generic 3D AABB spatial lookup.
//!
//! Bbq Lookup associates axis-aligned boxes with arbitrary values and answers
//! "which stored boxes intersect this query" quickly.
//!
//! - Insert and remove `(value, box)` occurrences. The store is a multiset:
//!   inserting the same pair twice keeps two occurrences.
//! - Query by box, point, line segment, or everything.
//! - Stop a visit early from inside the visitor.
//!
//! Backends implement one [`Lookup`] trait so you can swap the spatial
//! strategy without API churn, or pick one at runtime with [`create`].
//!
//! # Example
//!
//! ```rust
//! use bbq_lookup::{Aabb3D, Lookup, QueryItem, TreeLookup, Vec3};
//!
//! let mut lookup = TreeLookup::new();
//! let b = Aabb3D::try_new(Vec3::ZERO, Vec3::splat(1.0)).unwrap();
//! lookup.insert("crate", b).unwrap();
//! lookup.insert("barrel", Aabb3D::new(Vec3::splat(5.0), Vec3::splat(6.0))).unwrap();
//!
//! // Query a point inside the first box.
//! let hits: Vec<_> = lookup.visit(Vec3::splat(0.5).into()).map(|e| e.value).collect();
//! assert_eq!(hits, ["crate"]);
//!
//! // Stop after the first match.
//! let mut first = None;
//! lookup.visit_with_early_stop(QueryItem::All, |_, v, stop| {
//!     first = Some(*v);
//!     stop.stop();
//! });
//! assert!(first.is_some());
//! ```
//!
//! Choosing a backend at runtime:
//!
//! ```rust
//! use bbq_lookup::{create, Aabb3D, Line, Lookup, LookupKind, LookupOptions, Vec3};
//!
//! let options = LookupOptions::default().with_grid_resolution(8);
//! let mut lookup = create::<u32>(LookupKind::Grid, &options).unwrap();
//! lookup.insert(1, Aabb3D::new(Vec3::ZERO, Vec3::splat(10.0))).unwrap();
//!
//! let ray = Line::new(Vec3::new(-5.0, 5.0, 5.0), Vec3::new(15.0, 5.0, 5.0));
//! assert_eq!(lookup.visit(ray.into()).count(), 1);
//! ```
//!
//! ## Choosing a backend
//!
//! - [`ListLookup`]: append-ordered vector with linear scans. Smallest and
//!   simplest; visits are lazy so early stops are cheap.
//! - [`GridLookup`]: uniform `n³` grid over bounds that grow with the data.
//!   Good when boxes are similar in size and spread over a known region.
//!   Growing the bounds rebuilds every cell.
//! - [`TreeLookup`]: persistent BVH. Clones are O(1) snapshots and queries
//!   prune by subtree bounds. Visits materialize their results first.
//!
//! ### Float semantics
//!
//! Boxes with a NaN or infinite coordinate, or with `min > max` on any axis,
//! are rejected on insert. `-0.0` and `0.0` are treated as the same
//! coordinate.
//!
//! ### Threading
//!
//! Lookups are single-writer. Mutation takes `&mut self`, so a visit must end
//! before the next insert or remove. Every backend is `Send` and `Sync` when
//! its values are, so a lookup behind a shared reference may be read from
//! several threads.

pub mod adapter;
pub mod any;
pub mod backends;
mod cache;
pub mod config;
pub mod error;
pub mod lookup;
pub mod types;

pub use adapter::{HostGeometry, HostLookup};
pub use any::{AnyLookup, create};
pub use backends::{GridLookup, ListLookup, TreeLookup};
pub use config::{LookupKind, LookupOptions};
pub use error::LookupError;
pub use lookup::{Entry, Lookup, Stop};
pub use types::{Aabb3D, Axis, Line, QueryItem, Vec3};
