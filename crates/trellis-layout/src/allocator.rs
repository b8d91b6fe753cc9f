//! One-dimensional space allocation shared by every layout mode.
//!
//! # Algorithm
//!
//! Items are sorted (stably) by priority tier, then by descending minimum,
//! then by ascending `max / stretch` (an unbounded max counts as
//! `i32::MAX`). Tiers are visited in order:
//!
//! 1. greedy items that are not spacers,
//! 2. greedy spacers,
//! 3. everything else.
//!
//! Every item starts from its minimum. Walking the sorted order, an item that
//! can grow receives `excess * stretch / stretch_remaining` on top of its
//! minimum, where `excess` is the space not yet spoken for by the remaining
//! minimums and spacing, and `stretch_remaining` counts the stretch of the
//! items of the current tier not yet visited. The share is truncated and then
//! clamped to `[min, max]`. Because the last item of a tier divides by its own
//! stretch it takes whatever the tier has left, so a tier with an unbounded
//! item consumes all excess and lower tiers stay at their minimum.
//!
//! # Invariants
//!
//! - Every result lies in `[min, max]` (`[min, ∞)` when unbounded).
//! - If `available < Σmin + spacing·(n-1)`, every result equals its minimum.
//! - Identical input yields identical output; insertion order is the final
//!   tie-break.
//! - When the visited items can absorb it, `Σresult + spacing·(n-1) ==
//!   available`. Space the caps refuse is left over as slack for the caller.

use std::cmp::Ordering;

/// Allocation priority of an item along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GreedyClass {
    /// Greedy on this axis and not a spacer. Served first.
    GreedyNonSpacer,
    /// Greedy spacer. Served after greedy non-spacers.
    GreedySpacer,
    /// Everything else.
    #[default]
    Regular,
}

impl GreedyClass {
    #[inline]
    pub const fn classify(greedy: bool, spacer: bool) -> Self {
        match (greedy, spacer) {
            (true, false) => GreedyClass::GreedyNonSpacer,
            (true, true) => GreedyClass::GreedySpacer,
            (false, _) => GreedyClass::Regular,
        }
    }

    #[inline]
    const fn rank(self) -> usize {
        match self {
            GreedyClass::GreedyNonSpacer => 0,
            GreedyClass::GreedySpacer => 1,
            GreedyClass::Regular => 2,
        }
    }
}

/// Allocation input for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisItem {
    pub min: i32,
    /// Upper bound (`None` = unbounded).
    pub max: Option<i32>,
    /// Relative share of excess within the item's tier (>= 1).
    pub stretch: u32,
    pub class: GreedyClass,
}

impl AxisItem {
    #[inline]
    pub const fn new(min: i32, max: Option<i32>, stretch: u32, class: GreedyClass) -> Self {
        Self {
            min,
            max,
            stretch,
            class,
        }
    }

    /// A regular-tier item with stretch 1.
    #[inline]
    pub const fn regular(min: i32, max: Option<i32>) -> Self {
        Self::new(min, max, 1, GreedyClass::Regular)
    }

    #[inline]
    fn stretch(&self) -> i64 {
        i64::from(self.stretch.max(1))
    }

    #[inline]
    fn can_grow(&self) -> bool {
        self.max.is_none_or(|max| self.min < max)
    }

    /// Unbounded items count as `i32::MAX`, so among them the larger
    /// stretch sorts first.
    #[inline]
    fn max_per_stretch(&self) -> i64 {
        i64::from(self.max.unwrap_or(i32::MAX)) / self.stretch()
    }

    #[inline]
    fn clamp(&self, size: i64) -> i64 {
        let min = i64::from(self.min);
        if size < min {
            min
        } else if let Some(max) = self.max
            && size > i64::from(max)
        {
            i64::from(max)
        } else {
            size
        }
    }
}

/// Sort key: tier, then larger minimum first, then tighter `max/stretch` first.
fn allocation_order(a: &AxisItem, b: &AxisItem) -> Ordering {
    a.class
        .rank()
        .cmp(&b.class.rank())
        .then_with(|| b.min.cmp(&a.min))
        .then_with(|| a.max_per_stretch().cmp(&b.max_per_stretch()))
}

/// Distribute `available` pixels among `items` separated by `spacing`.
///
/// Results are aligned with the input order.
pub fn allocate(items: &[AxisItem], available: i32, spacing: i32) -> Vec<i32> {
    let mut sizes: Vec<i32> = items.iter().map(|item| item.min).collect();
    if items.is_empty() {
        return sizes;
    }

    debug_assert!(spacing >= 0, "spacing must be non-negative");
    debug_assert!(
        items
            .iter()
            .all(|item| item.min >= 0 && item.max.is_none_or(|max| max >= item.min)),
        "allocator items must satisfy 0 <= min <= max"
    );

    let spacing = i64::from(spacing);
    let min_total: i64 = items.iter().map(|item| i64::from(item.min)).sum();
    let spacing_total = spacing * (items.len() as i64 - 1);

    crate::trace!(
        items = items.len(),
        available,
        spacing,
        min_total,
        "axis allocation"
    );

    if i64::from(available) < min_total + spacing_total {
        return sizes;
    }

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| allocation_order(&items[a], &items[b]));

    let mut stretch_totals = [0i64; 3];
    for item in items {
        stretch_totals[item.class.rank()] += item.stretch();
    }

    let mut space = i64::from(available);
    let mut min_remaining = min_total;
    let mut spacing_remaining = spacing_total;

    for tier in order.chunk_by(|&a, &b| items[a].class == items[b].class) {
        let mut stretch_remaining = stretch_totals[items[tier[0]].class.rank()];

        for &index in tier {
            let item = &items[index];
            let stretch = item.stretch();
            let mut size = i64::from(item.min);

            if item.can_grow() {
                let excess = space - min_remaining - spacing_remaining;
                size = item.clamp(size + excess * stretch / stretch_remaining);
            }

            sizes[index] = size as i32;

            min_remaining -= i64::from(item.min);
            stretch_remaining -= stretch;
            space -= size + spacing;
            spacing_remaining -= spacing;
        }
    }

    sizes
}

/// Space left over after `sizes` and the spacing between them.
pub fn slack(sizes: &[i32], available: i32, spacing: i32) -> i32 {
    if sizes.is_empty() {
        return available;
    }
    let used: i64 = sizes.iter().map(|&s| i64::from(s)).sum::<i64>()
        + i64::from(spacing) * (sizes.len() as i64 - 1);
    (i64::from(available) - used).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
