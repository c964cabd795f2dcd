// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime backend selection.

use core::hash::Hash;

use crate::backends::{GridLookup, ListLookup, TreeLookup};
use crate::config::{LookupKind, LookupOptions};
use crate::error::LookupError;
use crate::lookup::{Entry, Lookup};
use crate::types::{Aabb3D, QueryItem};

/// One of the built-in backends, chosen at runtime.
#[derive(Clone, Debug)]
pub enum AnyLookup<T> {
    /// Linear scan.
    List(ListLookup<T>),
    /// Uniform grid.
    Grid(GridLookup<T>),
    /// Persistent BVH.
    Tree(TreeLookup<T>),
}

/// Build an empty lookup of the requested kind.
///
/// `options` is validated even for backends that ignore it, so a bad
/// configuration is reported no matter which kind is picked.
pub fn create<T>(kind: LookupKind, options: &LookupOptions) -> Result<AnyLookup<T>, LookupError> {
    options.validate()?;
    let lookup = match kind {
        LookupKind::List => AnyLookup::List(ListLookup::new()),
        LookupKind::Grid => AnyLookup::Grid(GridLookup::with_grid_size(options.grid_resolution)?),
        LookupKind::Tree => AnyLookup::Tree(TreeLookup::new()),
    };
    tracing::debug!(%kind, grid_resolution = options.grid_resolution, "created lookup");
    Ok(lookup)
}

impl<T> AnyLookup<T> {
    /// Which backend this is.
    pub fn kind(&self) -> LookupKind {
        match self {
            Self::List(_) => LookupKind::List,
            Self::Grid(_) => LookupKind::Grid,
            Self::Tree(_) => LookupKind::Tree,
        }
    }
}

impl<T> From<ListLookup<T>> for AnyLookup<T> {
    fn from(l: ListLookup<T>) -> Self {
        Self::List(l)
    }
}

impl<T> From<GridLookup<T>> for AnyLookup<T> {
    fn from(l: GridLookup<T>) -> Self {
        Self::Grid(l)
    }
}

impl<T> From<TreeLookup<T>> for AnyLookup<T> {
    fn from(l: TreeLookup<T>) -> Self {
        Self::Tree(l)
    }
}

impl<T: Hash + PartialEq> Lookup<T> for AnyLookup<T> {
    fn insert(&mut self, value: T, aabb: Aabb3D) -> Result<(), LookupError> {
        match self {
            Self::List(l) => l.insert(value, aabb),
            Self::Grid(l) => l.insert(value, aabb),
            Self::Tree(l) => l.insert(value, aabb),
        }
    }

    fn remove(&mut self, value: &T, aabb: &Aabb3D) -> bool {
        match self {
            Self::List(l) => l.remove(value, aabb),
            Self::Grid(l) => l.remove(value, aabb),
            Self::Tree(l) => l.remove(value, aabb),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::List(l) => l.len(),
            Self::Grid(l) => l.len(),
            Self::Tree(l) => l.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::List(l) => l.clear(),
            Self::Grid(l) => l.clear(),
            Self::Tree(l) => l.clear(),
        }
    }

    fn visit<'a>(&'a self, query: QueryItem) -> Box<dyn Iterator<Item = &'a Entry<T>> + 'a> {
        match self {
            Self::List(l) => l.visit(query),
            Self::Grid(l) => l.visit(query),
            Self::Tree(l) => l.visit(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::conformance;
    use crate::types::Vec3;

    #[test]
    fn creates_each_kind() {
        for kind in LookupKind::ALL {
            let l: AnyLookup<u32> = create(kind, &LookupOptions::default()).unwrap();
            assert_eq!(l.kind(), kind);
            assert!(l.is_empty());
        }
    }

    #[test]
    fn grid_resolution_is_applied() {
        let opts = LookupOptions::default().with_grid_resolution(4);
        let AnyLookup::Grid(g) = create::<u32>(LookupKind::Grid, &opts).unwrap() else {
            panic!("asked for a grid");
        };
        assert_eq!(g.grid_size(), 4);
    }

    #[test]
    fn bad_options_are_rejected_for_every_kind() {
        let opts = LookupOptions::default().with_grid_resolution(0);
        for kind in LookupKind::ALL {
            assert_eq!(
                create::<u32>(kind, &opts).map(|l| l.kind()),
                Err(LookupError::ZeroGridResolution)
            );
        }
    }

    #[test]
    fn delegates_the_contract() {
        for kind in LookupKind::ALL {
            conformance::run_all(|| create(kind, &LookupOptions::default()).unwrap());
        }
    }

    #[test]
    fn from_backend() {
        let mut tree = TreeLookup::new();
        tree.insert(7_u32, Aabb3D::from_point(Vec3::ZERO)).unwrap();
        let any = AnyLookup::from(tree);
        assert_eq!(any.kind(), LookupKind::Tree);
        assert_eq!(any.len(), 1);
    }
}
