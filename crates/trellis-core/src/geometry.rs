#![forbid(unsafe_code)]

//! Pixel geometry primitives.
//!
//! All values are signed pixels so that out-of-contract input (a negative
//! margin, a negative spacing) can be represented and rejected by the caller
//! instead of silently wrapping. Layout results themselves are never negative.

/// Layout axis of a linear arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
}

impl Orientation {
    /// The perpendicular orientation.
    #[inline]
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// A position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
///
/// For maximum sizes, `0` on an axis means "unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Zero size.
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Build a size from primary/secondary extents along `orientation`.
    #[inline]
    pub const fn from_axes(orientation: Orientation, primary: i32, secondary: i32) -> Self {
        match orientation {
            Orientation::Horizontal => Self::new(primary, secondary),
            Orientation::Vertical => Self::new(secondary, primary),
        }
    }

    /// Extent along `orientation`.
    #[inline]
    pub const fn along(self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.width,
            Orientation::Vertical => self.height,
        }
    }

    /// Extent across `orientation`.
    #[inline]
    pub const fn across(self, orientation: Orientation) -> i32 {
        self.along(orientation.cross())
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Clamp each axis to `max`, treating a zero axis in `max` as unbounded.
    #[inline]
    #[must_use]
    pub fn clamp_to_max(self, max: Size) -> Size {
        let width = if max.width > 0 {
            self.width.min(max.width)
        } else {
            self.width
        };
        let height = if max.height > 0 {
            self.height.min(max.height)
        } else {
            self.height
        };
        Size::new(width, height)
    }
}

/// A rectangle in container client coordinates (origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Build a rectangle from primary/secondary coordinates along `orientation`.
    #[inline]
    pub const fn from_axes(
        orientation: Orientation,
        primary_pos: i32,
        secondary_pos: i32,
        primary_len: i32,
        secondary_len: i32,
    ) -> Self {
        match orientation {
            Orientation::Horizontal => {
                Self::new(primary_pos, secondary_pos, primary_len, secondary_len)
            }
            Orientation::Vertical => {
                Self::new(secondary_pos, primary_pos, secondary_len, primary_len)
            }
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Check if the rectangle has no area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Start coordinate along `orientation`.
    #[inline]
    pub const fn start(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Shrink by `margins`. Extents never go below zero.
    pub fn inner(&self, margins: Margins) -> Rect {
        Rect {
            x: self.x.saturating_add(margins.h_near),
            y: self.y.saturating_add(margins.v_near),
            width: (self.width - margins.horizontal_sum()).max(0),
            height: (self.height - margins.vertical_sum()).max(0),
        }
    }
}

/// Container margins, expressed per axis as near (left/top) and far
/// (right/bottom) edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Margins {
    pub h_near: i32,
    pub v_near: i32,
    pub h_far: i32,
    pub v_far: i32,
}

impl Margins {
    /// No margins.
    pub const ZERO: Self = Self::all(0);

    /// Same margin on every edge.
    pub const fn all(value: i32) -> Self {
        Self {
            h_near: value,
            v_near: value,
            h_far: value,
            v_far: value,
        }
    }

    pub const fn new(h_near: i32, v_near: i32, h_far: i32, v_far: i32) -> Self {
        Self {
            h_near,
            v_near,
            h_far,
            v_far,
        }
    }

    /// True if any edge is negative.
    #[inline]
    pub const fn has_negative(&self) -> bool {
        self.h_near < 0 || self.v_near < 0 || self.h_far < 0 || self.v_far < 0
    }

    #[inline]
    pub const fn horizontal_sum(&self) -> i32 {
        self.h_near.saturating_add(self.h_far)
    }

    #[inline]
    pub const fn vertical_sum(&self) -> i32 {
        self.v_near.saturating_add(self.v_far)
    }

    /// Near edge along `orientation`.
    #[inline]
    pub const fn near(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.h_near,
            Orientation::Vertical => self.v_near,
        }
    }

    /// Far edge along `orientation`.
    #[inline]
    pub const fn far(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.h_far,
            Orientation::Vertical => self.v_far,
        }
    }

    /// Near plus far along `orientation`.
    #[inline]
    pub const fn sum(&self, orientation: Orientation) -> i32 {
        match orientation {
            Orientation::Horizontal => self.horizontal_sum(),
            Orientation::Vertical => self.vertical_sum(),
        }
    }
}

impl From<i32> for Margins {
    fn from(value: i32) -> Self {
        Self::all(value)
    }
}
