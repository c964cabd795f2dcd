// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::LookupError;

/// One of the three coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in `x, y, z` order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        })
    }
}

/// Immutable three-component coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    /// x component
    pub x: f64,
    /// y component
    pub y: f64,
    /// z component
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A vector with all three components set to `v`.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// The component along `axis`.
    #[inline]
    pub const fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// A copy with the component along `axis` replaced by `v`.
    #[inline]
    pub const fn with(self, axis: Axis, v: f64) -> Self {
        match axis {
            Axis::X => Self::new(v, self.y, self.z),
            Axis::Y => Self::new(self.x, v, self.z),
            Axis::Z => Self::new(self.x, self.y, v),
        }
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Component-wise floor.
    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor(), self.z.floor())
    }

    /// Component-wise ceiling.
    pub fn ceil(self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil(), self.z.ceil())
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// True if no component is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Div for Vec3 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

/// A line segment between two points.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// First endpoint.
    pub start: Vec3,
    /// Second endpoint.
    pub end: Vec3,
}

impl Line {
    /// Create a segment from `start` to `end`.
    pub const fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// `end - start`.
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// The smallest box containing both endpoints.
    pub fn bounding_box(&self) -> Aabb3D {
        Aabb3D::new(self.start.min(self.end), self.start.max(self.end))
    }
}

/// Axis-aligned bounding box in 3D, covering the closed region `[min, max]`.
///
/// [`Aabb3D::new`] does not check its input; use [`Aabb3D::try_new`] (or
/// [`Aabb3D::validate`]) to reject inverted or non-finite boxes. Every lookup
/// validates boxes on insert.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3D {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3D {
    /// Create a new AABB from min/max corners without validation.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a new AABB, rejecting non-finite coordinates and inverted axes.
    pub fn try_new(min: Vec3, max: Vec3) -> Result<Self, LookupError> {
        let aabb = Self::new(min, max);
        aabb.validate()?;
        Ok(aabb)
    }

    /// A zero-sized box at `p`.
    pub const fn from_point(p: Vec3) -> Self {
        Self::new(p, p)
    }

    /// A box centered on `center` reaching `half` along each axis.
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Check that every coordinate is finite and `min <= max` on each axis.
    pub fn validate(&self) -> Result<(), LookupError> {
        for axis in Axis::ALL {
            let (lo, hi) = (self.min.get(axis), self.max.get(axis));
            if !lo.is_finite() || !hi.is_finite() {
                return Err(LookupError::NonFinite { axis });
            }
            if lo > hi {
                return Err(LookupError::Inverted {
                    axis,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(())
    }

    /// `max - min`.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Return true if the box is inverted on some axis. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Component-wise overlap of two boxes.
    ///
    /// Disjoint inputs produce an inverted box; check [`Aabb3D::is_empty`].
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// `2 * (sx*sy + sx*sz + sy*sz)`.
    pub fn surface_area(&self) -> f64 {
        let s = self.size();
        2.0 * (s.x * s.y + s.x * s.z + s.y * s.z)
    }

    /// `sx * sy * sz`.
    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Whether this box shares at least one point with `item`.
    pub fn intersects(&self, item: &QueryItem) -> bool {
        match item {
            QueryItem::All => true,
            QueryItem::Aabb(other) => self.intersects_box(other),
            QueryItem::Point(p) => self.contains_point(*p),
            QueryItem::Line(line) => self.intersects_line(line),
        }
    }

    /// Whether `item` lies entirely within this box.
    ///
    /// A finite box never contains [`QueryItem::All`].
    pub fn contains(&self, item: &QueryItem) -> bool {
        match item {
            QueryItem::All => false,
            QueryItem::Aabb(other) => self.contains_box(other),
            QueryItem::Point(p) => self.contains_point(*p),
            QueryItem::Line(line) => self.contains_point(line.start) && self.contains_point(line.end),
        }
    }

    /// Per-axis closed interval overlap.
    #[inline]
    pub fn intersects_box(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Whether this box contains the point, boundaries included.
    #[inline]
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Whether `other` lies within this box, boundaries included.
    pub fn contains_box(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.max.x >= other.max.x
            && self.min.y <= other.min.y
            && self.max.y >= other.max.y
            && self.min.z <= other.min.z
            && self.max.z >= other.max.z
    }

    /// Segment/box test using the slab planes of the six faces.
    ///
    /// The segment is rejected when both endpoints lie beyond the same face,
    /// accepted when an endpoint lies inside, and otherwise accepted if its
    /// crossing with any face plane lands on the box.
    pub fn intersects_line(&self, line: &Line) -> bool {
        let (s, e) = (line.start, line.end);
        for axis in Axis::ALL {
            let (lo, hi) = (self.min.get(axis), self.max.get(axis));
            if (s.get(axis) < lo && e.get(axis) < lo) || (s.get(axis) > hi && e.get(axis) > hi) {
                return false;
            }
        }
        if self.contains_point(s) || self.contains_point(e) {
            return true;
        }
        let dir = line.direction();
        for axis in Axis::ALL {
            for plane in [self.min.get(axis), self.max.get(axis)] {
                let d0 = s.get(axis) - plane;
                let d1 = e.get(axis) - plane;
                // Parallel to this face.
                if d0 == d1 {
                    continue;
                }
                let t = d0 / (d0 - d1);
                if !(0.0..=1.0).contains(&t) {
                    continue;
                }
                let hit = (s + dir * t).with(axis, plane);
                if self.contains_point(hit) {
                    return true;
                }
            }
        }
        false
    }

    /// Bit pattern identifying this box for hashing. `-0.0` and `0.0` map
    /// to the same key, matching `==`.
    pub(crate) fn key_bits(&self) -> [u64; 6] {
        let bits = |v: f64| (v + 0.0).to_bits();
        [
            bits(self.min.x),
            bits(self.min.y),
            bits(self.min.z),
            bits(self.max.x),
            bits(self.max.y),
            bits(self.max.z),
        ]
    }
}

/// Geometry accepted by [`Lookup::visit`](crate::Lookup::visit).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryItem {
    /// Matches every stored box.
    All,
    /// Boxes overlapping this box.
    Aabb(Aabb3D),
    /// Boxes containing this point.
    Point(Vec3),
    /// Boxes crossed by this segment.
    Line(Line),
}

impl From<Aabb3D> for QueryItem {
    fn from(aabb: Aabb3D) -> Self {
        Self::Aabb(aabb)
    }
}

impl From<Vec3> for QueryItem {
    fn from(p: Vec3) -> Self {
        Self::Point(p)
    }
}

impl From<Line> for QueryItem {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}
