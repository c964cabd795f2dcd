// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persistent bounding volume hierarchy backend.

use core::fmt::Debug;
use std::sync::Arc;

use crate::cache::SizeCache;
use crate::error::LookupError;
use crate::lookup::{Entry, Lookup};
use crate::types::{Aabb3D, QueryItem};

/// Immutable BVH backend.
///
/// Nodes are shared and never modified. Every mutation rebuilds only the path
/// from the root to the touched leaf and reuses every other subtree, so
/// [`Clone`] is an O(1) snapshot.
///
/// Inserts descend into the child whose box grows least in surface area
/// (ties go left) and the tree is never rebalanced. Sorted input can
/// therefore produce a chain as deep as the number of keys; every traversal
/// here is iterative so such trees stay usable.
///
/// Visits collect all matches before returning the iterator, so stopping a
/// visit early still pays for the full traversal.
pub struct TreeLookup<T> {
    root: Option<Arc<Node<T>>>,
    size: SizeCache,
}

#[derive(Debug)]
enum Node<T> {
    Leaf {
        entry: Arc<Entry<T>>,
        count: usize,
    },
    Branch {
        aabb: Aabb3D,
        left: Arc<Node<T>>,
        right: Arc<Node<T>>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Which child a path step took and the sibling it left behind.
type Link<'a, T> = (Side, &'a Arc<Node<T>>);

impl<T> Node<T> {
    fn aabb(&self) -> &Aabb3D {
        match self {
            Self::Leaf { entry, .. } => &entry.aabb,
            Self::Branch { aabb, .. } => aabb,
        }
    }

    fn leaf(entry: Arc<Entry<T>>, count: usize) -> Arc<Self> {
        Arc::new(Self::Leaf { entry, count })
    }

    fn branch(left: Arc<Self>, right: Arc<Self>) -> Arc<Self> {
        Arc::new(Self::Branch {
            aabb: left.aabb().union(right.aabb()),
            left,
            right,
        })
    }

    /// Rebuild the ancestors recorded in `path` around `node`, deepest first.
    fn rejoin(mut node: Option<Arc<Self>>, path: &mut Vec<Link<'_, T>>) -> Option<Arc<Self>> {
        while let Some((side, sibling)) = path.pop() {
            let sibling = Arc::clone(sibling);
            node = Some(match (node, side) {
                (None, _) => sibling,
                (Some(n), Side::Left) => Self::branch(n, sibling),
                (Some(n), Side::Right) => Self::branch(sibling, n),
            });
        }
        node
    }
}

/// Drop a subtree without recursing once per level.
fn release<T>(root: Arc<Node<T>>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        // Shared nodes are still owned by another version.
        if let Ok(Node::Branch { left, right, .. }) = Arc::try_unwrap(node) {
            stack.push(left);
            stack.push(right);
        }
    }
}

impl<T> TreeLookup<T> {
    /// Create an empty tree.
    pub const fn new() -> Self {
        Self {
            root: None,
            size: SizeCache::new(),
        }
    }

    /// Levels from the root to the deepest leaf; 0 when empty.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Arc<Node<T>>, usize)> = self.root.iter().map(|r| (r, 1)).collect();
        while let Some((node, d)) = stack.pop() {
            deepest = deepest.max(d);
            if let Node::Branch { left, right, .. } = &**node {
                stack.push((left, d + 1));
                stack.push((right, d + 1));
            }
        }
        deepest
    }

    /// Leaves plus branches.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Box covering everything stored, if anything is.
    pub fn bounds(&self) -> Option<Aabb3D> {
        self.root.as_ref().map(|r| *r.aabb())
    }

    fn nodes(&self) -> impl Iterator<Item = &Node<T>> + '_ {
        let mut stack: Vec<&Arc<Node<T>>> = self.root.iter().collect();
        core::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Node::Branch { left, right, .. } = &**node {
                stack.push(right);
                stack.push(left);
            }
            Some(&**node)
        })
    }

    fn replace_root(&mut self, root: Option<Arc<Node<T>>>) {
        self.size.invalidate();
        if let Some(old) = core::mem::replace(&mut self.root, root) {
            release(old);
        }
    }
}

impl<T: PartialEq> TreeLookup<T> {
    fn insert_into(root: &Arc<Node<T>>, entry: Arc<Entry<T>>) -> Arc<Node<T>> {
        let mut path: Vec<Link<'_, T>> = Vec::new();
        let mut cur = root;
        while let Node::Branch { left, right, .. } = &**cur {
            let grow_left = left.aabb().union(&entry.aabb).surface_area();
            let grow_right = right.aabb().union(&entry.aabb).surface_area();
            if grow_left <= grow_right {
                path.push((Side::Left, right));
                cur = left;
            } else {
                path.push((Side::Right, left));
                cur = right;
            }
        }
        let mut node = match &**cur {
            Node::Leaf {
                entry: existing,
                count,
            } if **existing == *entry => Node::leaf(Arc::clone(existing), count + 1),
            _ => Node::branch(Arc::clone(cur), Node::leaf(entry, 1)),
        };
        while let Some((side, sibling)) = path.pop() {
            let sibling = Arc::clone(sibling);
            node = match side {
                Side::Left => Node::branch(node, sibling),
                Side::Right => Node::branch(sibling, node),
            };
        }
        node
    }

    /// Depth-first search for the first leaf equal to `(value, aabb)`, pruned
    /// by box overlap. Returns the new root (possibly empty) if one was found.
    fn remove_from(
        root: &Arc<Node<T>>,
        value: &T,
        aabb: &Aabb3D,
    ) -> Option<Option<Arc<Node<T>>>> {
        let mut stack: Vec<(&Arc<Node<T>>, usize, Option<Link<'_, T>>)> = vec![(root, 0, None)];
        let mut path: Vec<Link<'_, T>> = Vec::new();
        while let Some((node, depth, link)) = stack.pop() {
            path.truncate(depth.saturating_sub(1));
            if let Some(link) = link {
                path.push(link);
            }
            if !node.aabb().intersects_box(aabb) {
                continue;
            }
            match &**node {
                Node::Leaf { entry, count } => {
                    if entry.aabb == *aabb && entry.value == *value {
                        let rest = (*count > 1).then(|| Node::leaf(Arc::clone(entry), count - 1));
                        return Some(Node::rejoin(rest, &mut path));
                    }
                }
                Node::Branch { left, right, .. } => {
                    stack.push((right, depth + 1, Some((Side::Right, left))));
                    stack.push((left, depth + 1, Some((Side::Left, right))));
                }
            }
        }
        None
    }
}

impl<T> Default for TreeLookup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TreeLookup<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size.clone(),
        }
    }
}

impl<T> Drop for TreeLookup<T> {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            release(root);
        }
    }
}

impl<T: PartialEq> Lookup<T> for TreeLookup<T> {
    fn insert(&mut self, value: T, aabb: Aabb3D) -> Result<(), LookupError> {
        aabb.validate()?;
        let entry = Arc::new(Entry::new(value, aabb));
        let root = match &self.root {
            None => Node::leaf(entry, 1),
            Some(root) => Self::insert_into(root, entry),
        };
        self.replace_root(Some(root));
        Ok(())
    }

    fn remove(&mut self, value: &T, aabb: &Aabb3D) -> bool {
        let Some(root) = &self.root else {
            return false;
        };
        match Self::remove_from(root, value, aabb) {
            Some(root) => {
                self.replace_root(root);
                true
            }
            None => {
                tracing::trace!(?aabb, "tree remove: no matching occurrence");
                false
            }
        }
    }

    fn len(&self) -> usize {
        self.size.get(|| {
            self.nodes()
                .map(|n| match n {
                    Node::Leaf { count, .. } => *count,
                    Node::Branch { .. } => 0,
                })
                .sum()
        })
    }

    fn clear(&mut self) {
        self.replace_root(None);
    }

    fn visit<'a>(&'a self, query: QueryItem) -> Box<dyn Iterator<Item = &'a Entry<T>> + 'a> {
        let mut out = Vec::new();
        let mut stack: Vec<&Arc<Node<T>>> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            if !node.aabb().intersects(&query) {
                continue;
            }
            match &**node {
                Node::Leaf { entry, count } => out.extend(core::iter::repeat_n(&**entry, *count)),
                Node::Branch { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        Box::new(out.into_iter())
    }
}

impl<T> Debug for TreeLookup<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeLookup")
            .field("bounds", &self.bounds())
            .field("nodes", &self.node_count())
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}
