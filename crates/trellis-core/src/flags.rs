#![forbid(unsafe_code)]

//! Layout capability flags reported by items and containers.

use bitflags::bitflags;

use crate::geometry::Orientation;

bitflags! {
    /// How an item may be resized along each axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutFlags: u8 {
        /// May be made narrower than its preferred width.
        const SHRINKABLE_HORZ = 0b00_0001;
        /// May be made shorter than its preferred height.
        const SHRINKABLE_VERT = 0b00_0010;
        /// May be made wider than its preferred width.
        const GROWABLE_HORZ   = 0b00_0100;
        /// May be made taller than its preferred height.
        const GROWABLE_VERT   = 0b00_1000;
        /// Wants extra width before non-greedy siblings.
        const GREEDY_HORZ     = 0b01_0000;
        /// Wants extra height before non-greedy siblings.
        const GREEDY_VERT     = 0b10_0000;
    }
}

impl LayoutFlags {
    /// Shrinkable and growable on both axes, not greedy.
    pub const RESIZABLE: Self = Self::SHRINKABLE_HORZ
        .union(Self::SHRINKABLE_VERT)
        .union(Self::GROWABLE_HORZ)
        .union(Self::GROWABLE_VERT);

    #[inline]
    pub const fn shrinkable(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::SHRINKABLE_HORZ,
            Orientation::Vertical => Self::SHRINKABLE_VERT,
        }
    }

    #[inline]
    pub const fn growable(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::GROWABLE_HORZ,
            Orientation::Vertical => Self::GROWABLE_VERT,
        }
    }

    #[inline]
    pub const fn greedy(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::GREEDY_HORZ,
            Orientation::Vertical => Self::GREEDY_VERT,
        }
    }

    /// Growable along `orientation`.
    #[inline]
    pub const fn can_grow(self, orientation: Orientation) -> bool {
        self.contains(Self::growable(orientation))
    }

    /// Shrinkable along `orientation`.
    #[inline]
    pub const fn can_shrink(self, orientation: Orientation) -> bool {
        self.contains(Self::shrinkable(orientation))
    }

    /// Greedy along `orientation`.
    #[inline]
    pub const fn is_greedy(self, orientation: Orientation) -> bool {
        self.contains(Self::greedy(orientation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_axis_queries() {
        let flags = LayoutFlags::GROWABLE_HORZ | LayoutFlags::GREEDY_VERT;
        assert!(flags.can_grow(Orientation::Horizontal));
        assert!(!flags.can_grow(Orientation::Vertical));
        assert!(flags.is_greedy(Orientation::Vertical));
        assert!(!flags.can_shrink(Orientation::Horizontal));
    }

    #[test]
    fn resizable_preset_is_not_greedy() {
        assert!(LayoutFlags::RESIZABLE.can_shrink(Orientation::Vertical));
        assert!(!LayoutFlags::RESIZABLE.is_greedy(Orientation::Horizontal));
        assert_eq!(LayoutFlags::default(), LayoutFlags::empty());
    }
}
