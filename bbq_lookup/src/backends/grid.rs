// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend over bounds that grow to fit every inserted box.

use core::fmt::Debug;
use core::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use crate::cache::SizeCache;
use crate::error::LookupError;
use crate::lookup::{Entry, Lookup};
use crate::types::{Aabb3D, Axis, QueryItem, Vec3};

/// Cells per axis when none is configured.
pub const DEFAULT_GRID_SIZE: usize = 16;

/// Largest accepted cells per axis.
///
/// Every cell is allocated up front and rehashes build a second array, so
/// this keeps the cell array at 262,144 buckets.
pub const MAX_GRID_SIZE: usize = 64;

/// A unique `(value, box)` key and the number of occurrences stored for it.
#[derive(Clone, Debug)]
struct Member<T> {
    entry: Entry<T>,
    count: usize,
}

/// Uniform grid backend.
///
/// The grid splits its current `bounds` into `grid_size³` cells. Each unique
/// `(value, box)` pair is registered once in every cell its box overlaps and
/// carries an occurrence count; queries report it `count` times.
///
/// When an inserted box is not contained in the bounds, the bounds grow to
/// the union and every cell is rebuilt. The rebuild is O(unique keys × cells
/// per key), and boxes that keep creeping past the bounds pay it on every
/// insert.
#[derive(Clone)]
pub struct GridLookup<T> {
    grid_size: usize,
    bounds: Option<Aabb3D>,
    cells: Vec<Vec<usize>>,
    members: Vec<Option<Member<T>>>,
    free_list: Vec<usize>,
    // Hash of (value, box) -> member ids sharing that hash.
    index: FxHashMap<u64, Vec<usize>>,
    size: SizeCache,
}

impl<T> GridLookup<T> {
    /// Create a grid with [`DEFAULT_GRID_SIZE`] cells per axis.
    pub fn new() -> Self {
        Self::with_cells(DEFAULT_GRID_SIZE)
    }

    /// Create a grid with `grid_size` cells per axis.
    pub fn with_grid_size(grid_size: usize) -> Result<Self, LookupError> {
        if grid_size == 0 {
            return Err(LookupError::ZeroGridResolution);
        }
        if grid_size > MAX_GRID_SIZE {
            return Err(LookupError::GridResolutionTooLarge {
                requested: grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        Ok(Self::with_cells(grid_size))
    }

    fn with_cells(grid_size: usize) -> Self {
        Self {
            grid_size,
            bounds: None,
            cells: vec![Vec::new(); grid_size * grid_size * grid_size],
            members: Vec::new(),
            free_list: Vec::new(),
            index: FxHashMap::default(),
            size: SizeCache::new(),
        }
    }

    /// Cells per axis.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Volume currently covered by the cells; `None` until the first insert.
    pub fn bounds(&self) -> Option<Aabb3D> {
        self.bounds
    }

    fn live_members(&self) -> impl Iterator<Item = (usize, &Member<T>)> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(id, m)| m.as_ref().map(|m| (id, m)))
    }

    /// Grow the bounds to cover `aabb`, rebuilding every cell if they change.
    fn expand_to(&mut self, aabb: &Aabb3D) {
        let bounds = match self.bounds {
            Some(b) if b.contains_box(aabb) => return,
            Some(b) => b.union(aabb),
            None => *aabb,
        };
        let mut cells = vec![Vec::new(); self.cells.len()];
        let mut registered = 0_usize;
        for (id, m) in self.live_members() {
            for cell in CellIter::for_box(&bounds, self.grid_size, &m.entry.aabb) {
                cells[cell].push(id);
            }
            registered += 1;
        }
        tracing::debug!(
            old = ?self.bounds,
            new = ?bounds,
            keys = registered,
            "grid bounds expanded; cells rebuilt"
        );
        self.bounds = Some(bounds);
        self.cells = cells;
    }

    fn cells_for(&self, query: &QueryItem) -> CellIter {
        let Some(bounds) = self.bounds else {
            return CellIter::empty(self.grid_size);
        };
        match query {
            QueryItem::All => CellIter::all(self.grid_size),
            QueryItem::Aabb(aabb) => CellIter::for_box(&bounds, self.grid_size, aabb),
            QueryItem::Point(p) => CellIter::for_point(&bounds, self.grid_size, *p),
            QueryItem::Line(line) => {
                CellIter::for_box(&bounds, self.grid_size, &line.bounding_box())
            }
        }
    }

    fn alloc_member(&mut self, member: Member<T>) -> usize {
        if let Some(id) = self.free_list.pop() {
            self.members[id] = Some(member);
            id
        } else {
            self.members.push(Some(member));
            self.members.len() - 1
        }
    }
}

impl<T: Hash + PartialEq> GridLookup<T> {
    fn key_hash(value: &T, aabb: &Aabb3D) -> u64 {
        let mut h = FxHasher::default();
        value.hash(&mut h);
        aabb.key_bits().hash(&mut h);
        h.finish()
    }

    fn find(&self, hash: u64, value: &T, aabb: &Aabb3D) -> Option<usize> {
        self.index.get(&hash)?.iter().copied().find(|&id| {
            self.members[id]
                .as_ref()
                .is_some_and(|m| m.entry.aabb == *aabb && m.entry.value == *value)
        })
    }
}

impl<T> Default for GridLookup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + PartialEq> Lookup<T> for GridLookup<T> {
    fn insert(&mut self, value: T, aabb: Aabb3D) -> Result<(), LookupError> {
        aabb.validate()?;
        self.size.invalidate();
        self.expand_to(&aabb);

        let hash = Self::key_hash(&value, &aabb);
        if let Some(id) = self.find(hash, &value, &aabb) {
            if let Some(m) = self.members[id].as_mut() {
                m.count += 1;
            }
            return Ok(());
        }

        let id = self.alloc_member(Member {
            entry: Entry::new(value, aabb),
            count: 1,
        });
        self.index.entry(hash).or_default().push(id);
        if let Some(bounds) = self.bounds {
            for cell in CellIter::for_box(&bounds, self.grid_size, &aabb) {
                self.cells[cell].push(id);
            }
        }
        Ok(())
    }

    fn remove(&mut self, value: &T, aabb: &Aabb3D) -> bool {
        let hash = Self::key_hash(value, aabb);
        let Some(id) = self.find(hash, value, aabb) else {
            tracing::trace!(?aabb, "grid remove: no matching occurrence");
            return false;
        };
        self.size.invalidate();
        let Some(member) = self.members[id].as_mut() else {
            return false;
        };
        member.count -= 1;
        if member.count > 0 {
            return true;
        }

        if let Some(bounds) = self.bounds {
            for cell in CellIter::for_box(&bounds, self.grid_size, aabb) {
                let slots = &mut self.cells[cell];
                if let Some(pos) = slots.iter().position(|&s| s == id) {
                    slots.swap_remove(pos);
                }
            }
        }
        if let Some(ids) = self.index.get_mut(&hash) {
            ids.retain(|&s| s != id);
            if ids.is_empty() {
                self.index.remove(&hash);
            }
        }
        self.members[id] = None;
        self.free_list.push(id);
        true
    }

    fn len(&self) -> usize {
        self.size
            .get(|| self.live_members().map(|(_, m)| m.count).sum())
    }

    fn clear(&mut self) {
        self.size.invalidate();
        self.bounds = None;
        self.cells.iter_mut().for_each(Vec::clear);
        self.members.clear();
        self.free_list.clear();
        self.index.clear();
    }

    fn visit<'a>(&'a self, query: QueryItem) -> Box<dyn Iterator<Item = &'a Entry<T>> + 'a> {
        let no_bucket: &[usize] = &[];
        Box::new(GridVisit {
            grid: self,
            cells: self.cells_for(&query),
            query,
            bucket: no_bucket.iter(),
            seen: FxHashSet::default(),
            pending: None,
        })
    }
}

impl<T> Debug for GridLookup<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let keys = self.members.iter().filter(|m| m.is_some()).count();
        let occupied = self.cells.iter().filter(|c| !c.is_empty()).count();
        f.debug_struct("GridLookup")
            .field("grid_size", &self.grid_size)
            .field("bounds", &self.bounds)
            .field("keys", &keys)
            .field("occupied_cells", &occupied)
            .finish_non_exhaustive()
    }
}

/// Lazy query over the candidate cells, one cell at a time.
struct GridVisit<'a, T> {
    grid: &'a GridLookup<T>,
    query: QueryItem,
    cells: CellIter,
    bucket: core::slice::Iter<'a, usize>,
    // Members already considered by this query; a key spanning several cells
    // is reported once per occurrence.
    seen: FxHashSet<usize>,
    pending: Option<(&'a Entry<T>, usize)>,
}

impl<'a, T> Iterator for GridVisit<'a, T> {
    type Item = &'a Entry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((entry, left)) = self.pending.take() {
                if left > 1 {
                    self.pending = Some((entry, left - 1));
                }
                return Some(entry);
            }
            match self.bucket.next() {
                Some(&id) => {
                    if !self.seen.insert(id) {
                        continue;
                    }
                    if let Some(Some(m)) = self.grid.members.get(id)
                        && m.entry.aabb.intersects(&self.query)
                    {
                        self.pending = Some((&m.entry, m.count));
                    }
                }
                None => {
                    let cell = self.cells.next()?;
                    let Some(bucket) = self.grid.cells.get(cell) else {
                        continue;
                    };
                    self.bucket = bucket.iter();
                }
            }
        }
    }
}

/// Flat indices of an inclusive block of cells, x fastest.
#[derive(Clone, Debug)]
struct CellIter {
    n: usize,
    lo: [usize; 3],
    hi: [usize; 3],
    next: Option<[usize; 3]>,
}

impl CellIter {
    fn empty(n: usize) -> Self {
        Self {
            n,
            lo: [0; 3],
            hi: [0; 3],
            next: None,
        }
    }

    fn all(n: usize) -> Self {
        Self {
            n,
            lo: [0; 3],
            hi: [n - 1; 3],
            next: Some([0; 3]),
        }
    }

    /// Cells overlapped by `aabb` when `bounds` is split into `n` cells per
    /// axis. The minimum corner is floored and the maximum ceiled, then the
    /// range is clipped to the grid per axis.
    fn for_box(bounds: &Aabb3D, n: usize, aabb: &Aabb3D) -> Self {
        let mut lo = [0; 3];
        let mut hi = [0; 3];
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let a = to_cell_space(bounds, n, axis, aabb.min.get(axis)).floor();
            let b = to_cell_space(bounds, n, axis, aabb.max.get(axis)).ceil();
            match clip_range(a, b, n) {
                Some((l, h)) => {
                    lo[i] = l;
                    hi[i] = h;
                }
                None => return Self::empty(n),
            }
        }
        Self {
            n,
            lo,
            hi,
            next: Some(lo),
        }
    }

    /// The single cell holding `p`, if `p` falls inside `bounds`.
    fn for_point(bounds: &Aabb3D, n: usize, p: Vec3) -> Self {
        let mut at = [0; 3];
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let c = to_cell_space(bounds, n, axis, p.get(axis)).floor();
            match clip_range(c, c, n) {
                Some((l, _)) => at[i] = l,
                None => return Self::empty(n),
            }
        }
        Self {
            n,
            lo: at,
            hi: at,
            next: Some(at),
        }
    }
}

impl Iterator for CellIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let [x, y, z] = self.next?;
        self.next = if x < self.hi[0] {
            Some([x + 1, y, z])
        } else if y < self.hi[1] {
            Some([self.lo[0], y + 1, z])
        } else if z < self.hi[2] {
            Some([self.lo[0], self.lo[1], z + 1])
        } else {
            None
        };
        Some(x + y * self.n + z * self.n * self.n)
    }
}

/// `(v - min) / (max - min) * n` along `axis`; axes of zero extent map to 0.
///
/// Works on halved coordinates so that bounds spanning more than `f64::MAX`
/// still have a finite extent.
fn to_cell_space(bounds: &Aabb3D, n: usize, axis: Axis, v: f64) -> f64 {
    let lo = bounds.min.get(axis) * 0.5;
    let extent = bounds.max.get(axis) * 0.5 - lo;
    if extent > 0.0 {
        #[allow(
            clippy::cast_precision_loss,
            reason = "grid sizes are bounded by MAX_GRID_SIZE."
        )]
        let n = n as f64;
        (v * 0.5 - lo) / extent * n
    } else {
        0.0
    }
}

/// Clip the float cell range `[a, b]` to `0..n`. A range starting at exactly
/// `n` touches the last cell's outer face and keeps it.
fn clip_range(a: f64, b: f64, n: usize) -> Option<(usize, usize)> {
    #[allow(
        clippy::cast_precision_loss,
        reason = "grid sizes are bounded by MAX_GRID_SIZE."
    )]
    let nf = n as f64;
    let last = nf - 1.0;
    // NaN fails both comparisons and is rejected here.
    if !(b >= 0.0 && a <= nf) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "both values are clamped to 0..n before the cast."
    )]
    let (l, h) = (a.clamp(0.0, last) as usize, b.clamp(0.0, last) as usize);
    Some((l, h))
}
