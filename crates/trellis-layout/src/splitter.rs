//! Panes separated by draggable handles.
//!
//! Children alternate between regular items (even indices) and handles (odd
//! indices). A handle takes `handle_width` pixels when it sits right before
//! a visible item that has a visible item somewhere in front of it; any other
//! handle is committed with an empty rectangle.
//!
//! Each regular item keeps an explicit size. On reset the sizes come from
//! pinned fractions or stretch weights. After that, a change in available
//! space is handed out one pixel at a time to the item that has grown least
//! relative to its weight (or taken from the one that has grown most), so
//! equal weights take turns instead of one item absorbing every resize.
//! Once a share is pinned, the pinned fraction is the weight, so a plain
//! resize keeps the proportions a reset would produce.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use trellis_core::{LayoutFlags, Margins, Orientation, Rect, Size};

use crate::container::{Arrange, GeometryBatch, LayoutBase, SharedContainer, UpdateHandle};
use crate::error::{LayoutError, ParameterError};
use crate::item::{self, ItemId, LayoutItem};
use crate::{Layout, LayoutConfig};

/// How far a fraction list may drift from summing to one.
pub const FRACTION_TOLERANCE: f64 = 1e-3;

/// Integer weight of a pinned share of 1.0.
pub const FRACTION_WEIGHT_SCALE: f64 = 1_000_000.0;

fn fraction_weight(fraction: f64) -> u32 {
    ((fraction * FRACTION_WEIGHT_SCALE).round() as u32).max(1)
}

/// Splitter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitterConfig {
    /// Extent of an active handle along the splitter's axis.
    pub handle_width: i32,
}

impl SplitterConfig {
    pub const DEFAULT_HANDLE_WIDTH: i32 = 4;

    pub const fn new(handle_width: i32) -> Self {
        Self { handle_width }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.handle_width < 0 {
            return Err(ParameterError::NegativeHandleWidth {
                width: self.handle_width,
            });
        }
        Ok(())
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HANDLE_WIDTH)
    }
}

/// Snapshot of one regular item's splitter state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitterItemState {
    /// Current extent along the splitter's axis.
    pub size: i32,
    pub stretch: u32,
    /// Excluded from redistribution when the space changes.
    pub fixed: bool,
    /// Pixels gained (negative: lost) since the last reset or drag.
    pub growth: i64,
    /// Redistribution weight: the stretch factor, or the pinned share
    /// scaled by [`FRACTION_WEIGHT_SCALE`].
    pub weight: u32,
    /// The item cannot grow along the axis and stays at its minimum.
    pub keep_size: bool,
    /// Share of the regular space pinned by a drag or by `set_fractions`.
    pub fraction: Option<f64>,
}

impl Default for SplitterItemState {
    fn default() -> Self {
        Self {
            size: 0,
            stretch: 1,
            fixed: false,
            growth: 0,
            weight: 1,
            keep_size: false,
            fraction: None,
        }
    }
}

/// Per-item shares of a splitter's regular space, in child order.
///
/// The text form is the fractions separated by single spaces, e.g.
/// `"0.25 0.75"`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>", into = "Vec<f64>")
)]
pub struct SplitterFractions(Vec<f64>);

impl SplitterFractions {
    /// Validate `values`: finite, non-negative, and summing to one within
    /// [`FRACTION_TOLERANCE`]. An empty list is valid.
    pub fn new(values: Vec<f64>) -> Result<Self, ParameterError> {
        if values.is_empty() {
            return Ok(Self(values));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ParameterError::InvalidFractions {
                reason: "fractions must be finite",
            });
        }
        if values.iter().any(|v| *v < 0.0) {
            return Err(ParameterError::InvalidFractions {
                reason: "fractions must not be negative",
            });
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(ParameterError::InvalidFractions {
                reason: "fractions must sum to 1",
            });
        }
        Ok(Self(values))
    }

    /// Shares proportional to `weights`; equal shares when they are all zero.
    fn proportional(weights: &[i64]) -> Self {
        let total: i64 = weights.iter().sum();
        if total <= 0 {
            let n = weights.len() as f64;
            return Self(weights.iter().map(|_| 1.0 / n).collect());
        }
        Self(weights.iter().map(|&w| w as f64 / total as f64).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for SplitterFractions {
    type Error = ParameterError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<SplitterFractions> for Vec<f64> {
    fn from(fractions: SplitterFractions) -> Self {
        fractions.0
    }
}

impl fmt::Display for SplitterFractions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl FromStr for SplitterFractions {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| ParameterError::InvalidFractions {
                    reason: "fraction is not a number",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(values)
    }
}

/// Position limits for dragging one handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragBounds {
    prev: ItemId,
    prev_start: i32,
    next: ItemId,
    next_end: i32,
    lo: i32,
    hi: i32,
}

impl DragBounds {
    fn clamp(&self, position: i32) -> i32 {
        if position < self.lo {
            self.lo
        } else if position > self.hi {
            self.hi
        } else {
            position
        }
    }
}

/// Regular items split by handles along one axis.
#[derive(Debug)]
pub struct SplitterLayout {
    base: LayoutBase,
    orientation: Orientation,
    config: SplitterConfig,
    states: HashMap<ItemId, SplitterItemState>,
    /// Visible regular items as of the last pass.
    visible: Vec<ItemId>,
}

impl SplitterLayout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            base: LayoutBase::new(LayoutConfig::ZERO),
            orientation,
            config: SplitterConfig::default(),
            states: HashMap::new(),
            visible: Vec::new(),
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn with_config(orientation: Orientation, config: SplitterConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(orientation)
        })
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), LayoutError> {
        if orientation == self.orientation {
            return Ok(());
        }
        self.orientation = orientation;
        self.base.request_reset();
        self.changed()
    }

    pub fn handle_width(&self) -> i32 {
        self.config.handle_width
    }

    pub fn set_handle_width(&mut self, width: i32) -> Result<(), LayoutError> {
        if width == self.config.handle_width {
            return Ok(());
        }
        let config = SplitterConfig::new(width);
        config.validate()?;
        self.config = config;
        self.changed()
    }

    /// Stretch weight of `item` (1 unless set).
    pub fn stretch_factor(&self, item: ItemId) -> u32 {
        self.states.get(&item).map_or(1, |s| s.stretch)
    }

    /// Set the stretch weight of a regular child. Sizes are re-derived from
    /// the weights, dropping any pinned fractions.
    pub fn set_stretch_factor(&mut self, item: ItemId, factor: u32) -> Result<(), LayoutError> {
        if factor < 1 {
            return Err(ParameterError::StretchBelowOne { stretch: factor }.into());
        }
        self.require_regular(item)?;
        if factor == self.stretch_factor(item) {
            return Ok(());
        }
        self.states.entry(item).or_default().stretch = factor;
        for state in self.states.values_mut() {
            state.fraction = None;
            state.weight = state.stretch;
        }
        self.base.request_reset();
        self.changed()
    }

    pub fn is_fixed(&self, item: ItemId) -> bool {
        self.states.get(&item).is_some_and(|s| s.fixed)
    }

    /// Keep `item` at its current size when the available space changes.
    pub fn set_fixed(&mut self, item: ItemId, fixed: bool) -> Result<(), LayoutError> {
        if fixed == self.is_fixed(item) {
            return Ok(());
        }
        self.require_regular(item)?;
        self.states.entry(item).or_default().fixed = fixed;
        self.changed()
    }

    pub fn item_state(&self, item: ItemId) -> Option<SplitterItemState> {
        self.states.get(&item).copied()
    }

    /// Current share of each regular item, in child order. Empty when
    /// detached.
    pub fn fractions(&self) -> SplitterFractions {
        self.base
            .with_children(|children, _| {
                let regular: Vec<ItemId> = children.iter().step_by(2).map(|c| c.id()).collect();
                let sizes: Vec<i64> = regular
                    .iter()
                    .map(|id| self.states.get(id).map_or(0, |s| i64::from(s.size.max(0))))
                    .collect();
                if sizes.iter().sum::<i64>() > 0 {
                    SplitterFractions::proportional(&sizes)
                } else {
                    let weights: Vec<i64> = regular
                        .iter()
                        .map(|id| i64::from(self.stretch_factor(*id)))
                        .collect();
                    SplitterFractions::proportional(&weights)
                }
            })
            .unwrap_or_default()
    }

    /// Pin the share of every regular item, in child order, and re-layout.
    pub fn set_fractions(&mut self, values: &[f64]) -> Result<(), LayoutError> {
        let fractions = SplitterFractions::new(values.to_vec())?;
        let regular = self
            .base
            .with_children(|children, _| children.iter().step_by(2).map(|c| c.id()).collect::<Vec<_>>())
            .ok_or(ParameterError::ContainerRequired)?;
        if regular.len() != fractions.len() {
            return Err(ParameterError::InvalidFractions {
                reason: "one fraction per regular item is required",
            }
            .into());
        }

        for (id, &fraction) in regular.iter().zip(fractions.as_slice()) {
            let state = self.states.entry(*id).or_default();
            state.fraction = Some(fraction);
            state.weight = fraction_weight(fraction);
            state.growth = 0;
        }
        self.base.request_reset();
        self.changed()
    }

    /// Where the handle at child index `handle_index` would land if dragged
    /// to `position`: the previous visible item keeps at least its minimum,
    /// and so does the next one. `None` when detached or when the index is
    /// not an active handle.
    pub fn clamp_handle_position(&self, handle_index: usize, position: i32) -> Option<i32> {
        self.base
            .with_children(|children, bounds| self.drag_bounds(children, bounds, handle_index))
            .flatten()
            .map(|drag| drag.clamp(position))
    }

    /// Finish a drag: resize the two items around the handle so it sits at
    /// the clamped `position`, pin every item's current share, and re-layout.
    /// Returns the position actually applied.
    pub fn release_handle(&mut self, handle_index: usize, position: i32) -> Result<i32, LayoutError> {
        let drag = self
            .base
            .with_children(|children, bounds| self.drag_bounds(children, bounds, handle_index))
            .ok_or(ParameterError::ContainerRequired)?
            .ok_or(ParameterError::InvalidHandle { index: handle_index })?;

        let position = drag.clamp(position);
        let handle_width = self.config.handle_width;
        self.states.entry(drag.prev).or_default().size = position - drag.prev_start;
        self.states.entry(drag.next).or_default().size = drag.next_end - position - handle_width;

        let total: i64 = self.states.values().map(|s| i64::from(s.size.max(0))).sum();
        for state in self.states.values_mut() {
            state.growth = 0;
            state.fraction = (total > 0).then(|| f64::from(state.size.max(0)) / total as f64);
            state.weight = state.fraction.map_or(state.stretch, fraction_weight);
        }
        crate::debug!(handle = handle_index, position, "splitter handle released");

        self.changed()?;
        Ok(position)
    }

    fn require_regular(&self, item: ItemId) -> Result<(), ParameterError> {
        match self
            .base
            .with_children(|children, _| children.iter().position(|c| c.id() == item))
        {
            None => Err(ParameterError::ContainerRequired),
            Some(Some(index)) if index % 2 == 0 => Ok(()),
            Some(_) => Err(ParameterError::UnknownItem { item }),
        }
    }

    fn changed(&mut self) -> Result<(), LayoutError> {
        self.base.invalidate();
        if self.base.is_attached() {
            self.update(false)
        } else {
            Ok(())
        }
    }

    fn regular_space(&self, children: &[&dyn LayoutItem], bounds: Rect) -> i32 {
        let handles = (1..children.len())
            .step_by(2)
            .filter(|&i| handle_is_active(children, i))
            .count() as i32;
        (bounds.size().along(self.orientation) - handles * self.config.handle_width).max(0)
    }

    /// Rebuild state for the current regular items and size the visible
    /// ones from their pinned fraction or stretch share.
    fn reset(&mut self, children: &[&dyn LayoutItem], space: i32) {
        let orientation = self.orientation;
        self.states
            .retain(|id, _| children.iter().step_by(2).any(|c| c.id() == *id));

        let visible: Vec<&dyn LayoutItem> = children
            .iter()
            .step_by(2)
            .copied()
            .filter(|c| item::should_layout(*c))
            .collect();
        let total_stretch: i64 = visible
            .iter()
            .map(|c| i64::from(self.stretch_factor(c.id())))
            .sum();

        for child in &visible {
            let (min, max) = axis_bounds(*child, orientation);
            let state = self.states.entry(child.id()).or_default();
            state.growth = 0;
            state.weight = state.fraction.map_or(state.stretch, fraction_weight);
            state.keep_size = !child.layout_flags().can_grow(orientation);
            let size = if state.keep_size {
                min
            } else if let Some(fraction) = state.fraction {
                (f64::from(space) * fraction).round() as i32
            } else {
                (i64::from(space) * i64::from(state.stretch) / total_stretch.max(1)) as i32
            };
            state.size = max.map_or(size, |max| size.min(max)).max(min);
        }
        crate::trace!(items = visible.len(), space, "splitter state reset");
    }

    /// Hand out `diff` pixels one at a time among the visible items, by
    /// growth relative to weight.
    fn distribute(&mut self, visible: &[&dyn LayoutItem], mut diff: i64) {
        let orientation = self.orientation;
        let bounds: Vec<(ItemId, i32, Option<i32>)> = visible
            .iter()
            .map(|c| {
                let (min, max) = axis_bounds(*c, orientation);
                (c.id(), min, max)
            })
            .collect();

        while diff != 0 {
            let growing = diff > 0;
            let mut best: Option<(ItemId, i64, i64)> = None;
            for &(id, min, max) in &bounds {
                let Some(state) = self.states.get(&id) else {
                    continue;
                };
                if state.fixed || state.keep_size {
                    continue;
                }
                let room = if growing {
                    max.is_none_or(|max| state.size < max)
                } else {
                    state.size > min
                };
                if !room {
                    continue;
                }
                let own = i64::from(state.weight.max(1));
                let better = best.is_none_or(|(_, growth, weight)| {
                    // growth / weight, compared without division
                    let lhs = state.growth * weight;
                    let rhs = growth * own;
                    if growing { lhs < rhs } else { lhs > rhs }
                });
                if better {
                    best = Some((id, state.growth, own));
                }
            }

            let Some((id, ..)) = best else {
                crate::debug!(leftover = diff, "splitter space left unassigned");
                break;
            };
            let step: i32 = if growing { 1 } else { -1 };
            if let Some(state) = self.states.get_mut(&id) {
                state.size += step;
                state.growth += i64::from(step);
            }
            diff -= i64::from(step);
        }
    }

    /// Rectangles for every child, aligned with `children`. Hidden regular
    /// items get `None`.
    fn place(&self, children: &[&dyn LayoutItem], bounds: Rect) -> Vec<Option<Rect>> {
        let orientation = self.orientation;
        let cross = orientation.cross();
        let p2 = bounds.start(cross);
        let s2 = bounds.size().along(cross);
        let mut p1 = bounds.start(orientation);

        children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                if index % 2 == 1 {
                    if handle_is_active(children, index) {
                        let rect = Rect::from_axes(orientation, p1, p2, self.config.handle_width, s2);
                        p1 += self.config.handle_width;
                        Some(rect)
                    } else {
                        Some(Rect::from_axes(orientation, p1, p2, 0, 0))
                    }
                } else if item::should_layout(*child) {
                    let size = self.states.get(&child.id()).map_or(0, |s| s.size);
                    let rect = Rect::from_axes(orientation, p1, p2, size, s2);
                    p1 += size;
                    Some(rect)
                } else {
                    None
                }
            })
            .collect()
    }

    fn drag_bounds(
        &self,
        children: &[&dyn LayoutItem],
        bounds: Rect,
        handle_index: usize,
    ) -> Option<DragBounds> {
        if !handle_is_active(children, handle_index) {
            return None;
        }
        let orientation = self.orientation;
        let rects = self.place(children, bounds);

        // handle_index is odd, so this walks the regular items before it.
        let prev_index = (0..handle_index)
            .rev()
            .step_by(2)
            .find(|&i| rects[i].is_some())?;
        let next_index = handle_index + 1;
        let prev_rect = rects[prev_index]?;
        let next_rect = rects[next_index]?;

        let prev_start = prev_rect.start(orientation);
        let next_end = next_rect.start(orientation) + next_rect.size().along(orientation);
        let (prev_min, _) = axis_bounds(children[prev_index], orientation);
        let (next_min, _) = axis_bounds(children[next_index], orientation);

        Some(DragBounds {
            prev: children[prev_index].id(),
            prev_start,
            next: children[next_index].id(),
            next_end,
            lo: prev_start + prev_min,
            hi: next_end - next_min - self.config.handle_width,
        })
    }
}

impl Arrange for SplitterLayout {
    const MODE: &'static str = "splitter";

    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn arrange(&mut self, children: &[&dyn LayoutItem], bounds: Rect, reset: bool) -> GeometryBatch {
        let visible: Vec<&dyn LayoutItem> = children
            .iter()
            .step_by(2)
            .copied()
            .filter(|c| item::should_layout(*c))
            .collect();
        let visible_ids: Vec<ItemId> = visible.iter().map(|c| c.id()).collect();
        let space = self.regular_space(children, bounds);

        if reset || visible_ids != self.visible {
            self.reset(children, space);
            self.visible = visible_ids;
        }

        let used: i64 = visible
            .iter()
            .map(|c| self.states.get(&c.id()).map_or(0, |s| i64::from(s.size)))
            .sum();
        self.distribute(&visible, i64::from(space) - used);

        children
            .iter()
            .zip(self.place(children, bounds))
            .filter_map(|(child, rect)| rect.map(|rect| (child.id(), rect)))
            .collect()
    }
}

impl Layout for SplitterLayout {
    fn attach(&mut self, container: &SharedContainer) {
        self.base.attach(container);
    }

    fn detach(&mut self) {
        self.base.detach();
    }

    fn is_attached(&self) -> bool {
        self.base.is_attached()
    }

    fn margins(&self) -> Margins {
        Margins::ZERO
    }

    /// Only zero margins are accepted.
    fn set_margins(&mut self, margins: Margins) -> Result<(), LayoutError> {
        if margins == Margins::ZERO {
            return Ok(());
        }
        Err(ParameterError::Unsupported { setting: "margins" }.into())
    }

    fn spacing(&self) -> i32 {
        0
    }

    /// Only zero spacing is accepted; handles separate the items.
    fn set_spacing(&mut self, spacing: i32) -> Result<(), LayoutError> {
        if spacing == 0 {
            return Ok(());
        }
        Err(ParameterError::Unsupported { setting: "spacing" }.into())
    }

    fn layout_flags(&self) -> LayoutFlags {
        LayoutFlags::all()
    }

    fn min_size(&self) -> Size {
        self.base
            .client_size()
            .map_or(Size::ZERO, |size| self.min_size_for_size(size))
    }

    fn min_size_for_size(&self, size: Size) -> Size {
        self.base.cached_min_size(size, || {
            self.base
                .with_children(|children, _| {
                    splitter_min_size(children, self.orientation, self.config.handle_width)
                })
                .unwrap_or(Size::ZERO)
        })
    }

    fn update(&mut self, force_reset: bool) -> Result<(), LayoutError> {
        LayoutBase::run_update(self, force_reset)
    }

    fn update_handle(&self) -> UpdateHandle {
        self.base.update_handle()
    }
}

/// Whether the handle at child index `index` takes space.
fn handle_is_active(children: &[&dyn LayoutItem], index: usize) -> bool {
    index % 2 == 1
        && children
            .get(index + 1)
            .is_some_and(|next| item::should_layout(*next))
        && children[..index]
            .iter()
            .step_by(2)
            .any(|c| item::should_layout(*c))
}

/// Minimum and optional maximum of `item` along `orientation`.
fn axis_bounds(item: &dyn LayoutItem, orientation: Orientation) -> (i32, Option<i32>) {
    let min = item::min_size_effective(item).along(orientation).max(0);
    let max = item.max_size().along(orientation);
    (min, (max > 0).then_some(max.max(min)))
}

/// Sum of visible minimums and active handles along the axis, largest
/// visible minimum across it.
fn splitter_min_size(children: &[&dyn LayoutItem], orientation: Orientation, handle_width: i32) -> Size {
    let mut primary = 0;
    let mut secondary = 0;
    for (index, child) in children.iter().enumerate() {
        if index % 2 == 1 {
            if handle_is_active(children, index) {
                primary += handle_width;
            }
        } else if item::should_layout(*child) {
            let min = item::min_size_effective(*child);
            primary += min.along(orientation);
            secondary = secondary.max(min.across(orientation));
        }
    }
    Size::from_axes(orientation, primary, secondary)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::headless::{HeadlessContainer, HeadlessItem};

    fn pane(id: u64, min_width: i32) -> HeadlessItem {
        HeadlessItem::new(id)
            .min(Size::new(min_width, 10))
            .flags(LayoutFlags::RESIZABLE)
    }

    fn handle(id: u64) -> HeadlessItem {
        HeadlessItem::new(id)
    }

    /// Two panes (1, 3) around one handle (2).
    fn two_panes(width: i32) -> HeadlessContainer {
        HeadlessContainer::new(Rect::new(0, 0, width, 30))
            .with_child(pane(1, 0))
            .with_child(handle(2))
            .with_child(pane(3, 0))
    }

    fn attach(layout: &mut SplitterLayout, container: HeadlessContainer) -> Rc<RefCell<HeadlessContainer>> {
        let container = Rc::new(RefCell::new(container));
        layout.attach_to(&container);
        container
    }

    #[test]
    fn equal_weights_split_the_space_around_the_handle() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");

        let c = container.borrow();
        assert_eq!(c.geometry_of(1), Some(Rect::new(0, 0, 50, 30)));
        assert_eq!(c.geometry_of(2), Some(Rect::new(50, 0, 4, 30)));
        assert_eq!(c.geometry_of(3), Some(Rect::new(54, 0, 50, 30)));
    }

    #[test]
    fn vertical_splitter_stacks_panes() {
        let mut layout = SplitterLayout::vertical();
        let container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 30, 64))
                .with_child(pane(1, 0))
                .with_child(handle(2))
                .with_child(pane(3, 0)),
        );
        layout.update(false).expect("update");

        let c = container.borrow();
        assert_eq!(c.geometry_of(1), Some(Rect::new(0, 0, 30, 30)));
        assert_eq!(c.geometry_of(2), Some(Rect::new(0, 30, 30, 4)));
        assert_eq!(c.geometry_of(3), Some(Rect::new(0, 34, 30, 30)));
    }

    #[test]
    fn growth_alternates_between_equal_weights() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");

        container.borrow_mut().set_bounds(Rect::new(0, 0, 109, 30));
        layout.update(false).expect("update");
        assert_eq!(layout.item_state(ItemId::new(1)).map(|s| s.size), Some(53));
        assert_eq!(layout.item_state(ItemId::new(3)).map(|s| s.size), Some(52));

        container.borrow_mut().set_bounds(Rect::new(0, 0, 114, 30));
        layout.update(false).expect("update");
        assert_eq!(layout.item_state(ItemId::new(1)).map(|s| s.size), Some(55));
        assert_eq!(layout.item_state(ItemId::new(3)).map(|s| s.size), Some(55));
    }

    #[test]
    fn shrinking_takes_from_the_most_grown_first() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");

        container.borrow_mut().set_bounds(Rect::new(0, 0, 105, 30));
        layout.update(false).expect("update");
        assert_eq!(layout.item_state(ItemId::new(1)).map(|s| s.growth), Some(1));

        container.borrow_mut().set_bounds(Rect::new(0, 0, 104, 30));
        layout.update(false).expect("update");
        let first = layout.item_state(ItemId::new(1)).expect("state");
        assert_eq!((first.size, first.growth), (50, 0));
    }

    #[test]
    fn shrinking_respects_minimums() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 104, 30))
                .with_child(pane(1, 45))
                .with_child(handle(2))
                .with_child(pane(3, 0)),
        );
        layout.update(false).expect("update");

        container.borrow_mut().set_bounds(Rect::new(0, 0, 64, 30));
        layout.update(false).expect("update");
        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(45));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(15));
    }

    #[test]
    fn rigid_pane_keeps_its_minimum() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 104, 30))
                .with_child(HeadlessItem::new(1).min(Size::new(20, 10)))
                .with_child(handle(2))
                .with_child(pane(3, 0)),
        );
        layout.update(false).expect("update");

        assert!(layout.item_state(ItemId::new(1)).is_some_and(|s| s.keep_size));
        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(20));
        assert_eq!(c.geometry_of(3), Some(Rect::new(24, 0, 80, 30)));
    }

    #[test]
    fn fixed_pane_sits_out_resizes() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        layout.set_fixed(ItemId::new(1), true).expect("fixed");
        assert!(layout.is_fixed(ItemId::new(1)));

        container.borrow_mut().set_bounds(Rect::new(0, 0, 124, 30));
        layout.update(false).expect("update");
        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(50));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(70));
    }

    #[test]
    fn stretch_weights_set_initial_shares() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        layout.set_stretch_factor(ItemId::new(3), 3).expect("stretch");

        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(25));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(75));
    }

    #[test]
    fn stretch_factor_rejects_handles_and_zero() {
        let mut layout = SplitterLayout::horizontal();
        assert_eq!(
            layout.set_stretch_factor(ItemId::new(1), 2),
            Err(ParameterError::ContainerRequired.into())
        );
        let _container = attach(&mut layout, two_panes(104));
        assert_eq!(
            layout.set_stretch_factor(ItemId::new(1), 0),
            Err(ParameterError::StretchBelowOne { stretch: 0 }.into())
        );
        assert_eq!(
            layout.set_stretch_factor(ItemId::new(2), 2),
            Err(ParameterError::UnknownItem { item: ItemId::new(2) }.into())
        );
    }

    #[test]
    fn default_stretch_factor_is_still_validated() {
        let mut layout = SplitterLayout::horizontal();
        assert_eq!(
            layout.set_stretch_factor(ItemId::new(1), 1),
            Err(ParameterError::ContainerRequired.into())
        );
        let _container = attach(&mut layout, two_panes(104));
        assert_eq!(
            layout.set_stretch_factor(ItemId::new(2), 1),
            Err(ParameterError::UnknownItem { item: ItemId::new(2) }.into())
        );
        assert_eq!(
            layout.set_stretch_factor(ItemId::new(9), 1),
            Err(ParameterError::UnknownItem { item: ItemId::new(9) }.into())
        );
        assert_eq!(layout.set_stretch_factor(ItemId::new(1), 1), Ok(()));
    }

    #[test]
    fn hidden_pane_deactivates_its_handle() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 104, 30))
                .with_child(pane(1, 0))
                .with_child(handle(2))
                .with_child(pane(3, 0))
                .with_child(handle(4))
                .with_child(pane(5, 0)),
        );
        layout.update(false).expect("update");
        // 104 - 8 handles = 96 -> 32 each.
        assert_eq!(container.borrow().geometry_of(3).map(|r| r.width), Some(32));

        container
            .borrow_mut()
            .child_mut(3)
            .expect("child")
            .set_visible(false);
        layout.update(false).expect("update");

        let c = container.borrow();
        assert_eq!(c.last_batch().get(ItemId::new(3)), None);
        assert_eq!(c.geometry_of(1), Some(Rect::new(0, 0, 50, 30)));
        assert_eq!(c.geometry_of(2), Some(Rect::new(50, 0, 0, 0)));
        assert_eq!(c.geometry_of(4), Some(Rect::new(50, 0, 4, 30)));
        assert_eq!(c.geometry_of(5), Some(Rect::new(54, 0, 50, 30)));
    }

    #[test]
    fn leading_hidden_pane_deactivates_following_handle() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 100, 30))
                .with_child(pane(1, 0).hidden())
                .with_child(handle(2))
                .with_child(pane(3, 0)),
        );
        layout.update(false).expect("update");

        let c = container.borrow();
        assert_eq!(c.geometry_of(2), Some(Rect::new(0, 0, 0, 0)));
        assert_eq!(c.geometry_of(3), Some(Rect::new(0, 0, 100, 30)));
    }

    #[test]
    fn drag_is_clamped_to_neighbour_minimums() {
        let mut layout = SplitterLayout::horizontal();
        let _container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 104, 30))
                .with_child(pane(1, 20))
                .with_child(handle(2))
                .with_child(pane(3, 30)),
        );
        layout.update(false).expect("update");

        assert_eq!(layout.clamp_handle_position(1, 5), Some(20));
        assert_eq!(layout.clamp_handle_position(1, 100), Some(70));
        assert_eq!(layout.clamp_handle_position(1, 40), Some(40));
        assert_eq!(layout.clamp_handle_position(0, 40), None);
        assert_eq!(layout.clamp_handle_position(3, 40), None);
    }

    #[test]
    fn release_pins_sizes_and_fractions() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");

        assert_eq!(layout.release_handle(1, 30), Ok(30));
        {
            let c = container.borrow();
            assert_eq!(c.geometry_of(1).map(|r| r.width), Some(30));
            assert_eq!(c.geometry_of(2), Some(Rect::new(30, 0, 4, 30)));
            assert_eq!(c.geometry_of(3), Some(Rect::new(34, 0, 70, 30)));
        }
        assert_eq!(layout.fractions().as_slice(), &[0.3, 0.7]);

        container.borrow_mut().set_bounds(Rect::new(0, 0, 204, 30));
        layout.update(true).expect("update");
        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(60));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(140));
    }

    #[test]
    fn plain_resize_after_release_keeps_the_dragged_proportions() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        assert_eq!(layout.release_handle(1, 30), Ok(30));

        container.borrow_mut().set_bounds(Rect::new(0, 0, 204, 30));
        layout.update(false).expect("update");
        let plain = container.borrow().last_batch().clone();
        assert_eq!(plain.get(ItemId::new(1)).map(|r| r.width), Some(60));
        assert_eq!(plain.get(ItemId::new(3)), Some(Rect::new(64, 0, 140, 30)));
        assert_eq!(layout.fractions().as_slice(), &[0.3, 0.7]);

        layout.update(true).expect("update");
        assert_eq!(container.borrow().last_batch(), &plain);

        container.borrow_mut().set_bounds(Rect::new(0, 0, 104, 30));
        layout.update(false).expect("update");
        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(30));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(70));
    }

    #[test]
    fn plain_resize_after_set_fractions_keeps_the_shares() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        layout.set_fractions(&[0.25, 0.75]).expect("fractions");

        container.borrow_mut().set_bounds(Rect::new(0, 0, 204, 30));
        layout.update(false).expect("update");
        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(50));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(150));
    }

    #[test]
    fn release_rejects_non_handles() {
        let mut layout = SplitterLayout::horizontal();
        assert_eq!(
            layout.release_handle(1, 10),
            Err(ParameterError::ContainerRequired.into())
        );
        let _container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        assert_eq!(
            layout.release_handle(2, 10),
            Err(ParameterError::InvalidHandle { index: 2 }.into())
        );
    }

    #[test]
    fn set_fractions_resizes_panes() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        layout.set_fractions(&[0.25, 0.75]).expect("fractions");

        let c = container.borrow();
        assert_eq!(c.geometry_of(1).map(|r| r.width), Some(25));
        assert_eq!(c.geometry_of(3).map(|r| r.width), Some(75));
    }

    #[test]
    fn set_fractions_validates() {
        let mut layout = SplitterLayout::horizontal();
        let _container = attach(&mut layout, two_panes(104));
        for bad in [&[0.5, 0.6][..], &[1.5, -0.5], &[f64::NAN, 1.0], &[1.0]] {
            let err = layout.set_fractions(bad).expect_err("invalid");
            assert!(matches!(
                err,
                LayoutError::InvalidLayoutParameter(ParameterError::InvalidFractions { .. })
            ));
        }
    }

    #[test]
    fn fractions_text_form() {
        let fractions: SplitterFractions = "0.25 0.75".parse().expect("parses");
        assert_eq!(fractions.as_slice(), &[0.25, 0.75]);
        assert_eq!(fractions.to_string(), "0.25 0.75");
        assert!("0.5 x".parse::<SplitterFractions>().is_err());
        assert!("0.5 0.4".parse::<SplitterFractions>().is_err());
        assert!("".parse::<SplitterFractions>().expect("empty").is_empty());
        assert!(SplitterFractions::new(vec![0.3333, 0.3333, 0.3334]).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn fractions_serialize_as_a_validated_list() {
        let fractions = SplitterFractions::new(vec![0.4, 0.6]).expect("valid");
        let json = serde_json::to_string(&fractions).expect("serialize");
        assert_eq!(json, "[0.4,0.6]");
        let back: SplitterFractions = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, fractions);
        assert!(serde_json::from_str::<SplitterFractions>("[0.4,0.4]").is_err());

        let config: SplitterConfig = serde_json::from_str(r#"{"handle_width":6}"#).expect("config");
        assert_eq!(config.handle_width, 6);
    }

    #[test]
    fn detached_fractions_are_empty() {
        assert!(SplitterLayout::horizontal().fractions().is_empty());
    }

    #[test]
    fn margins_and_spacing_must_stay_zero() {
        let mut layout = SplitterLayout::horizontal();
        assert_eq!(layout.set_margins(Margins::ZERO), Ok(()));
        assert_eq!(layout.set_spacing(0), Ok(()));
        assert_eq!(
            layout.set_margins(Margins::all(2)),
            Err(ParameterError::Unsupported { setting: "margins" }.into())
        );
        assert_eq!(
            layout.set_spacing(3),
            Err(ParameterError::Unsupported { setting: "spacing" }.into())
        );
        assert_eq!(layout.margins(), Margins::ZERO);
        assert_eq!(layout.spacing(), 0);
    }

    #[test]
    fn handle_width_is_validated() {
        assert!(matches!(
            SplitterLayout::with_config(Orientation::Horizontal, SplitterConfig::new(-1)),
            Err(LayoutError::InvalidLayoutParameter(
                ParameterError::NegativeHandleWidth { width: -1 }
            ))
        ));
        let mut layout = SplitterLayout::horizontal();
        assert_eq!(layout.handle_width(), 4);
        let container = attach(&mut layout, two_panes(100));
        layout.set_handle_width(10).expect("width");
        let c = container.borrow();
        assert_eq!(c.geometry_of(2), Some(Rect::new(45, 0, 10, 30)));
        assert_eq!(c.geometry_of(3), Some(Rect::new(55, 0, 45, 30)));
    }

    #[test]
    fn min_size_sums_panes_and_handles() {
        let mut layout = SplitterLayout::horizontal();
        let _container = attach(
            &mut layout,
            HeadlessContainer::new(Rect::new(0, 0, 104, 30))
                .with_child(pane(1, 20))
                .with_child(handle(2))
                .with_child(HeadlessItem::new(3).min(Size::new(30, 15))),
        );
        assert_eq!(layout.min_size(), Size::new(54, 15));
        assert_eq!(layout.layout_flags(), LayoutFlags::all());
    }

    #[test]
    fn removed_panes_lose_their_state() {
        let mut layout = SplitterLayout::horizontal();
        let container = attach(&mut layout, two_panes(104));
        layout.update(false).expect("update");
        assert!(layout.item_state(ItemId::new(3)).is_some());

        container.borrow_mut().remove(3);
        container.borrow_mut().remove(2);
        layout.update(false).expect("update");
        assert!(layout.item_state(ItemId::new(3)).is_none());
        assert_eq!(container.borrow().geometry_of(1).map(|r| r.width), Some(104));
    }
}
