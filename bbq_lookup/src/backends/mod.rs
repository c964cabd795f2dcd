// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `list`: append-ordered vector with linear scans (small, simple).
//! - `grid`: uniform `n³` grid over bounds that grow to fit every inserted box.
//! - `tree`: persistent BVH grown by a greedy surface-area choice.
//!
//! Surface-area note
//! -----------------
//! The tree descends into the child `c` minimizing
//!
//! `surface_area(union(c.box, new_box))`
//!
//! with ties going left. The tree is never rebalanced, so its shape follows
//! insertion order. Removal prunes by box overlap rather than retracing that
//! choice, which can visit both children where insertion visited one.

pub mod grid;
pub mod list;
pub mod tree;

pub use grid::GridLookup;
pub use list::ListLookup;
pub use tree::TreeLookup;
