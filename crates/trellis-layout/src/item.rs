//! The capability surface a layout consumes from its children.
//!
//! Layouts never own items. They see them through [`LayoutItem`] for the
//! duration of one pass and remember them only by [`ItemId`].

use trellis_core::{LayoutFlags, Orientation, Size};

use crate::Alignment2D;
use crate::allocator::GreedyClass;

/// Stable identity of a layout item.
///
/// Per-item layout state (stretch factors, grid ranges, splitter sizes) is
/// keyed by this id, so it must stay the same for the lifetime of the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ItemId(u64);

impl ItemId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Optional capability: items whose height depends on the width they get
/// (wrapping labels, aspect-locked images).
pub trait HeightForWidth {
    fn height_for_width(&self, width: i32) -> i32;
}

/// One child of a container as seen by a layout.
///
/// Sizes are a per-pass snapshot. For maxima, `0` on an axis means unbounded.
pub trait LayoutItem {
    fn id(&self) -> ItemId;

    /// Explicit minimum size set on the item.
    fn min_size(&self) -> Size;

    /// Content-derived minimum. The effective minimum is the larger of this and
    /// [`min_size`](Self::min_size).
    fn min_size_hint(&self) -> Size {
        Size::ZERO
    }

    fn max_size(&self) -> Size;

    fn preferred_size(&self) -> Size;

    fn layout_flags(&self) -> LayoutFlags;

    /// Spacers are zero-content items that only absorb slack.
    fn is_spacer(&self) -> bool {
        false
    }

    fn is_visible(&self) -> bool {
        true
    }

    /// Hidden items that still reserve their slot.
    fn always_consume_space(&self) -> bool {
        false
    }

    /// Per-item alignment; [`Alignment2D::Default`] inherits the layout's.
    fn alignment(&self) -> Alignment2D {
        Alignment2D::Default
    }

    /// Height-for-width capability, if the item has one.
    fn height_for_width(&self) -> Option<&dyn HeightForWidth> {
        None
    }
}

/// Effective minimum: `max(min_size, min_size_hint)` clamped to any set maximum.
pub fn min_size_effective(item: &dyn LayoutItem) -> Size {
    item.min_size()
        .max(item.min_size_hint())
        .clamp_to_max(item.max_size())
}

/// Whether the item takes part in layout at all.
pub fn should_layout(item: &dyn LayoutItem) -> bool {
    item.is_spacer() || item.is_visible() || item.always_consume_space()
}

/// Items a linear layout arranges: laid out, and not an empty placeholder
/// (zero preferred size with no flags).
pub(crate) fn layoutable<'a>(items: &[&'a dyn LayoutItem]) -> Vec<&'a dyn LayoutItem> {
    items
        .iter()
        .copied()
        .filter(|item| should_layout(*item))
        .filter(|item| item.preferred_size() != Size::ZERO || !item.layout_flags().is_empty())
        .collect()
}

/// Priority tier of an item along `orientation`.
pub(crate) fn greedy_class(item: &dyn LayoutItem, orientation: Orientation) -> GreedyClass {
    GreedyClass::classify(
        item.layout_flags().is_greedy(orientation),
        item.is_spacer(),
    )
}

/// Upper bound along `orientation` as the allocator sees it: the explicit
/// maximum if set, else the preferred extent for items that cannot grow, else
/// unbounded.
pub(crate) fn axis_max(item: &dyn LayoutItem, orientation: Orientation) -> Option<i32> {
    let max = item.max_size().along(orientation);
    let preferred = item.preferred_size().along(orientation);
    if max > 0 {
        Some(max)
    } else if preferred > 0 && !item.layout_flags().can_grow(orientation) {
        Some(preferred)
    } else {
        None
    }
}
