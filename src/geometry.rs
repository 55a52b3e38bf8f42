//! Core geometry types: Offset, Size, Region, Spacing, Axis.
//!
//! All coordinates are in terminal cells. Layout code works in terms of a
//! *main* and *cross* axis, so [`Size`] and [`Offset`] expose accessors keyed
//! by [`Axis`] in addition to their named fields.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// A layout axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    #[default]
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    #[inline]
    pub const fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D position or displacement in cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The origin.
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Build an offset from main/cross components.
    #[inline]
    pub const fn from_axes(axis: Axis, main: i32, cross: i32) -> Self {
        match axis {
            Axis::Horizontal => Self { x: main, y: cross },
            Axis::Vertical => Self { x: cross, y: main },
        }
    }

    /// The component along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset { x: -self.x, y: -self.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in cells (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Build a size from main/cross extents.
    #[inline]
    pub const fn from_axes(axis: Axis, main: i32, cross: i32) -> Self {
        match axis {
            Axis::Horizontal => Self { width: main, height: cross },
            Axis::Vertical => Self { width: cross, height: main },
        }
    }

    /// The extent along `axis`.
    #[inline]
    pub const fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Whether either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size { width: self.width.max(other.width), height: self.height.max(other.height) }
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0, y: 0, width: self.width, height: self.height }
    }
}

impl Add for Size {
    type Output = Size;
    #[inline]
    fn add(self, rhs: Size) -> Size {
        Size { width: self.width + rhs.width, height: self.height + rhs.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangle in cells defined by position and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a region from a position and a size.
    #[inline]
    pub const fn from_parts(origin: Offset, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    /// The right edge (exclusive).
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive).
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The top-left corner.
    #[inline]
    pub const fn origin(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    /// The dimensions.
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the region has no area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point lies inside this region.
    #[inline]
    pub const fn contains(self, point: Offset) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Intersection of two regions, [`Region::EMPTY`] when they do not overlap.
    #[inline]
    pub fn intersection(self, other: Region) -> Region {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            Region::EMPTY
        } else {
            Region { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
        }
    }

    /// Translate the region by an [`Offset`].
    #[inline]
    pub const fn translate(self, offset: Offset) -> Region {
        Region { x: self.x + offset.x, y: self.y + offset.y, width: self.width, height: self.height }
    }

    /// Contract the region inward, clamping dimensions at zero.
    #[inline]
    pub const fn shrink(self, spacing: Spacing) -> Region {
        let w = self.width - spacing.left - spacing.right;
        let h = self.height - spacing.top - spacing.bottom;
        Region {
            x: self.x + spacing.left,
            y: self.y + spacing.top,
            width: if w > 0 { w } else { 0 },
            height: if h > 0 { h } else { 0 },
        }
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    /// Zero spacing on all sides.
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// `vertical` for top/bottom, `horizontal` for left/right.
    #[inline]
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self { top: vertical, right: horizontal, bottom: vertical, left: horizontal }
    }

    /// Total extent of the spacing as a size.
    #[inline]
    pub const fn total(self) -> Size {
        Size { width: self.left + self.right, height: self.top + self.bottom }
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_cross() {
        assert_eq!(Axis::Horizontal.cross(), Axis::Vertical);
        assert_eq!(Axis::Vertical.cross(), Axis::Horizontal);
    }

    #[test]
    fn size_axes_round_trip() {
        let s = Size::from_axes(Axis::Horizontal, 10, 3);
        assert_eq!(s, Size::new(10, 3));
        assert_eq!(s.along(Axis::Horizontal), 10);
        assert_eq!(s.along(Axis::Vertical), 3);

        let v = Size::from_axes(Axis::Vertical, 10, 3);
        assert_eq!(v, Size::new(3, 10));
    }

    #[test]
    fn offset_ops() {
        let a = Offset::new(1, 2);
        let b = Offset::new(3, 4);
        assert_eq!(a + b, Offset::new(4, 6));
        assert_eq!(b - a, Offset::new(2, 2));
        assert_eq!(-a, Offset::new(-1, -2));
        assert_eq!(Offset::from_axes(Axis::Vertical, 5, 1), Offset::new(1, 5));
    }

    #[test]
    fn region_contains_edges() {
        let r = Region::new(2, 3, 4, 2);
        assert!(r.contains(Offset::new(2, 3)));
        assert!(r.contains(Offset::new(5, 4)));
        assert!(!r.contains(Offset::new(6, 3)));
        assert!(!r.contains(Offset::new(2, 5)));
    }

    #[test]
    fn region_intersection() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert_eq!(a.intersection(b), Region::new(5, 5, 5, 5));
        assert_eq!(a.intersection(Region::new(20, 20, 1, 1)), Region::EMPTY);
    }

    #[test]
    fn region_shrink_clamps() {
        let r = Region::new(0, 0, 4, 2);
        assert_eq!(r.shrink(Spacing::all(1)), Region::new(1, 1, 2, 0));
        assert_eq!(r.shrink(Spacing::all(3)), Region::new(3, 3, 0, 0));
    }

    #[test]
    fn spacing_total() {
        assert_eq!(Spacing::symmetric(1, 2).total(), Size::new(4, 2));
        assert_eq!((Spacing::all(1) + Spacing::all(2)).total(), Size::new(6, 6));
    }
}
