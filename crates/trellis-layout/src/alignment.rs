//! Near/center/far alignment on one and two axes.

use trellis_core::Orientation;

/// Alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    /// Left or top.
    Near,
    #[default]
    Center,
    /// Right or bottom.
    Far,
}

impl Align {
    /// Offset of an extent of `size` placed inside `space`.
    ///
    /// Oversized content is anchored the same way, so the offset can be
    /// negative for `Center` and `Far`.
    #[inline]
    pub const fn offset(self, space: i32, size: i32) -> i32 {
        match self {
            Align::Near => 0,
            Align::Center => (space - size) / 2,
            Align::Far => space - size,
        }
    }
}

/// Two-dimensional alignment.
///
/// [`Alignment2D::Default`] means "inherit": an item with the default
/// alignment uses its layout's alignment, and a layout with the default
/// alignment centers on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment2D {
    #[default]
    Default,
    HNearVNear,
    HCenterVNear,
    HFarVNear,
    HNearVCenter,
    HCenterVCenter,
    HFarVCenter,
    HNearVFar,
    HCenterVFar,
    HFarVFar,
}

impl Alignment2D {
    /// Compose from per-axis alignments.
    pub const fn from_axes(horizontal: Align, vertical: Align) -> Self {
        match (horizontal, vertical) {
            (Align::Near, Align::Near) => Self::HNearVNear,
            (Align::Center, Align::Near) => Self::HCenterVNear,
            (Align::Far, Align::Near) => Self::HFarVNear,
            (Align::Near, Align::Center) => Self::HNearVCenter,
            (Align::Center, Align::Center) => Self::HCenterVCenter,
            (Align::Far, Align::Center) => Self::HFarVCenter,
            (Align::Near, Align::Far) => Self::HNearVFar,
            (Align::Center, Align::Far) => Self::HCenterVFar,
            (Align::Far, Align::Far) => Self::HFarVFar,
        }
    }

    /// `self`, or `fallback` when `self` is [`Alignment2D::Default`].
    #[inline]
    #[must_use]
    pub const fn or(self, fallback: Alignment2D) -> Self {
        match self {
            Self::Default => fallback,
            other => other,
        }
    }

    pub const fn horizontal(self) -> Align {
        match self {
            Self::HNearVNear | Self::HNearVCenter | Self::HNearVFar => Align::Near,
            Self::HFarVNear | Self::HFarVCenter | Self::HFarVFar => Align::Far,
            _ => Align::Center,
        }
    }

    pub const fn vertical(self) -> Align {
        match self {
            Self::HNearVNear | Self::HCenterVNear | Self::HFarVNear => Align::Near,
            Self::HNearVFar | Self::HCenterVFar | Self::HFarVFar => Align::Far,
            _ => Align::Center,
        }
    }

    /// Alignment along `orientation`.
    #[inline]
    pub const fn along(self, orientation: Orientation) -> Align {
        match orientation {
            Orientation::Horizontal => self.horizontal(),
            Orientation::Vertical => self.vertical(),
        }
    }
}
