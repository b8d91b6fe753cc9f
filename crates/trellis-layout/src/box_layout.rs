//! Single row or column layout.
//!
//! Children are sized along the primary axis by one allocator pass. Leftover
//! space is placed according to the layout's primary alignment: `Near` packs
//! children at the start, `Far` at the end, and `Center` spreads it evenly in
//! front of, between and after the children. On the secondary axis a child
//! fills the span if it can grow there and otherwise keeps its preferred
//! extent, aligned by its own alignment (falling back to the layout's).

use trellis_core::{LayoutFlags, Margins, Orientation, Rect, Size};

use crate::alignment::{Align, Alignment2D};
use crate::allocator::{self, AxisItem};
use crate::container::{Arrange, GeometryBatch, LayoutBase, SharedContainer, StretchFactors, UpdateHandle};
use crate::error::{LayoutError, ParameterError};
use crate::item::{self, ItemId, LayoutItem};
use crate::{Layout, LayoutConfig};

/// Row (`Horizontal`) or column (`Vertical`) layout.
#[derive(Debug)]
pub struct BoxLayout {
    base: LayoutBase,
    orientation: Orientation,
    stretch: StretchFactors,
}

impl BoxLayout {
    /// A layout with the default margins (9) and spacing (6).
    pub fn new(orientation: Orientation) -> Self {
        Self {
            base: LayoutBase::new(LayoutConfig::default()),
            orientation,
            stretch: StretchFactors::default(),
        }
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn with_config(orientation: Orientation, config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            base: LayoutBase::new(config),
            orientation,
            stretch: StretchFactors::default(),
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
        self.changed()
    }

    pub fn alignment(&self) -> Alignment2D {
        self.base.config().alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment2D) -> Result<(), LayoutError> {
        if alignment == self.alignment() {
            return Ok(());
        }
        self.base.set_alignment(alignment);
        self.changed()
    }

    /// Stretch weight of `item` (1 unless set).
    pub fn stretch_factor(&self, item: ItemId) -> u32 {
        self.stretch.get(item)
    }

    /// Set the stretch weight of a child. Fails for weights below 1, when
    /// detached, or when `item` is not a child.
    pub fn set_stretch_factor(&mut self, item: ItemId, factor: u32) -> Result<(), LayoutError> {
        if factor < 1 {
            return Err(ParameterError::StretchBelowOne { stretch: factor }.into());
        }
        self.base.require_child(item)?;
        if factor == self.stretch.get(item) {
            return Ok(());
        }
        self.stretch.set(item, factor);
        self.changed()
    }

    fn changed(&mut self) -> Result<(), LayoutError> {
        self.base.invalidate();
        if self.base.is_attached() {
            self.update(false)
        } else {
            Ok(())
        }
    }
}

impl Arrange for BoxLayout {
    const MODE: &'static str = "box";

    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn arrange(&mut self, children: &[&dyn LayoutItem], bounds: Rect, reset: bool) -> GeometryBatch {
        if reset {
            self.stretch.retain_children(children);
        }
        let items = item::layoutable(children);
        let config = self.base.config();
        let rects = arrange_line(
            &items,
            self.orientation,
            config.alignment,
            bounds,
            config.margins,
            config.spacing,
            &self.stretch,
        );
        items.iter().map(|i| i.id()).zip(rects).collect()
    }
}

impl Layout for BoxLayout {
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
        self.base.config().margins
    }

    fn set_margins(&mut self, margins: Margins) -> Result<(), LayoutError> {
        if margins == self.margins() {
            return Ok(());
        }
        self.base.set_margins(margins)?;
        self.changed()
    }

    fn spacing(&self) -> i32 {
        self.base.config().spacing
    }

    fn set_spacing(&mut self, spacing: i32) -> Result<(), LayoutError> {
        if spacing == self.spacing() {
            return Ok(());
        }
        self.base.set_spacing(spacing)?;
        self.changed()
    }

    fn layout_flags(&self) -> LayoutFlags {
        self.base
            .with_children(|children, _| box_flags(self.orientation, children))
            .unwrap_or_else(LayoutFlags::empty)
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
                    let config = self.base.config();
                    line_min_size(
                        &item::layoutable(children),
                        self.orientation,
                        config,
                        Rect::from_size(size),
                        &self.stretch,
                    )
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

/// Flags a row or column reports to its parent.
///
/// The union of the laid-out children's flags, always growable along the
/// primary axis, and not shrinkable across it if any child is not.
pub(crate) fn box_flags(orientation: Orientation, children: &[&dyn LayoutItem]) -> LayoutFlags {
    if children.is_empty() {
        return LayoutFlags::RESIZABLE;
    }

    let cross = orientation.cross();
    let mut flags = LayoutFlags::empty();
    let mut rigid_across = false;
    for child in children.iter().filter(|c| item::should_layout(**c)) {
        let child_flags = child.layout_flags();
        flags |= child_flags;
        rigid_across |= !child_flags.can_shrink(cross);
    }

    flags |= LayoutFlags::growable(orientation);
    if rigid_across {
        flags.remove(LayoutFlags::shrinkable(cross));
    }
    flags
}

/// Primary-axis minimum of `item`. Columns ask height-for-width items for
/// their height at `inner_width`.
fn primary_min(item: &dyn LayoutItem, orientation: Orientation, inner_width: i32) -> i32 {
    let min = match (orientation, item.height_for_width()) {
        (Orientation::Vertical, Some(hfw)) => hfw.height_for_width(inner_width),
        _ => item::min_size_effective(item).along(orientation),
    };
    min.max(0)
}

/// Rectangles for `items` laid out as one line inside `bounds`.
///
/// The result is aligned with `items`.
pub(crate) fn arrange_line(
    items: &[&dyn LayoutItem],
    orientation: Orientation,
    alignment: Alignment2D,
    bounds: Rect,
    margins: Margins,
    spacing: i32,
    stretch: &StretchFactors,
) -> Vec<Rect> {
    if items.is_empty() {
        return Vec::new();
    }

    let cross = orientation.cross();
    let start1 = bounds.start(orientation) + margins.near(orientation);
    let start2 = bounds.start(cross) + margins.near(cross);
    let space1 = bounds.size().along(orientation) - margins.sum(orientation);
    let space2 = bounds.size().along(cross) - margins.sum(cross);
    let inner_width = bounds.width - margins.horizontal_sum();

    let axis: Vec<AxisItem> = items
        .iter()
        .map(|&item| {
            let min = primary_min(item, orientation, inner_width);
            AxisItem::new(
                min,
                item::axis_max(item, orientation).map(|max| max.max(min)),
                stretch.get(item.id()),
                item::greedy_class(item, orientation),
            )
        })
        .collect();

    let sizes = allocator::allocate(&axis, space1.max(0), spacing);
    let slack = allocator::slack(&sizes, space1, spacing).max(0);

    let n = items.len() as i32;
    let (lead, gap) = match alignment.along(orientation) {
        Align::Near => (0, 0),
        Align::Far => (slack, 0),
        Align::Center => (slack / (n + 1), slack / (n + 1)),
    };

    let mut p1 = start1 + lead;
    items
        .iter()
        .zip(&sizes)
        .map(|(&item, &s1)| {
            let s2 = if item.layout_flags().can_grow(cross) {
                space2
            } else {
                item.preferred_size()
                    .along(cross)
                    .max(item::min_size_effective(item).along(cross))
            };
            let align2 = item.alignment().or(alignment).along(cross);
            let p2 = start2 + align2.offset(space2, s2);

            let rect = Rect::from_axes(orientation, p1, p2, s1, s2);
            p1 += s1 + spacing + gap;
            rect
        })
        .collect()
}

/// Minimum size of a line laid out inside `bounds`: primary minimums plus
/// spacing, and the largest secondary minimum (height-for-width items are
/// measured at the width they would receive).
pub(crate) fn line_min_size(
    items: &[&dyn LayoutItem],
    orientation: Orientation,
    config: &LayoutConfig,
    bounds: Rect,
    stretch: &StretchFactors,
) -> Size {
    let margins = config.margins;
    let rects = arrange_line(
        items,
        orientation,
        config.alignment,
        bounds,
        margins,
        config.spacing,
        stretch,
    );

    let mut width = margins.horizontal_sum();
    let mut height = margins.vertical_sum();
    let mut max_secondary = 0;

    for (&item, rect) in items.iter().zip(&rects) {
        let min = item::min_size_effective(item);
        let item_height = item
            .height_for_width()
            .map_or(min.height, |hfw| hfw.height_for_width(rect.width));
        match orientation {
            Orientation::Horizontal => {
                width += min.width;
                max_secondary = max_secondary.max(item_height);
            }
            Orientation::Vertical => {
                height += item_height;
                max_secondary = max_secondary.max(min.width);
            }
        }
    }

    let gaps = config.spacing * (items.len() as i32 - 1).max(0);
    match orientation {
        Orientation::Horizontal => Size::new(width + gaps, height + max_secondary),
        Orientation::Vertical => Size::new(width + max_secondary, height + gaps),
    }
}
