//! Left-to-right layout that wraps into new rows.
//!
//! Children are assigned to sections (rows) first-fit by their minimum
//! width, in order. Each section is then laid out like a horizontal
//! [`BoxLayout`](crate::BoxLayout) whose height is the tallest minimum (or
//! height-for-width) of its items. Sections stack downwards with `spacing`
//! between them; the top margin applies only to the first section and the
//! bottom margin only to the last.

use trellis_core::{LayoutFlags, Margins, Orientation, Rect, Size};

use crate::alignment::Alignment2D;
use crate::box_layout::arrange_line;
use crate::container::{Arrange, GeometryBatch, LayoutBase, SharedContainer, StretchFactors, UpdateHandle};
use crate::error::{LayoutError, ParameterError};
use crate::item::{self, ItemId, LayoutItem};
use crate::{Layout, LayoutConfig};

/// One wrapped row.
#[derive(Clone)]
struct FlowSection<'a> {
    items: Vec<&'a dyn LayoutItem>,
    space_left: i32,
    /// Tallest minimum height in the row, plus the outer margin for the
    /// first and last row.
    secondary_min: i32,
}

impl<'a> FlowSection<'a> {
    fn empty(space: i32) -> Self {
        Self {
            items: Vec::new(),
            space_left: space,
            secondary_min: 0,
        }
    }

    fn push(&mut self, item: &'a dyn LayoutItem, min: Size, spacing: i32) {
        self.items.push(item);
        if self.items.len() > 1 {
            self.space_left -= spacing;
        }
        self.space_left -= min.width;
        self.secondary_min = self.secondary_min.max(min.height);
    }
}

/// Wrapping row layout.
#[derive(Debug)]
pub struct FlowLayout {
    base: LayoutBase,
    stretch: StretchFactors,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowLayout {
    /// A layout with the default margins (9) and spacing (6).
    pub fn new() -> Self {
        Self {
            base: LayoutBase::new(LayoutConfig::default()),
            stretch: StretchFactors::default(),
        }
    }

    pub fn with_config(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            base: LayoutBase::new(config),
            stretch: StretchFactors::default(),
        })
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

    pub fn stretch_factor(&self, item: ItemId) -> u32 {
        self.stretch.get(item)
    }

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

    /// How the current children would wrap in a container `width` wide.
    pub fn sections_for_width(&self, width: i32) -> Vec<Vec<ItemId>> {
        self.base
            .with_children(|children, _| {
                self.sections(&item::layoutable(children), width)
                    .iter()
                    .map(|s| s.items.iter().map(|i| i.id()).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn changed(&mut self) -> Result<(), LayoutError> {
        self.base.invalidate();
        if self.base.is_attached() {
            self.update(false)
        } else {
            Ok(())
        }
    }

    /// First-fit partition of `items` into rows of a container `width` wide.
    fn sections<'a>(&self, items: &[&'a dyn LayoutItem], width: i32) -> Vec<FlowSection<'a>> {
        let margins = self.base.config().margins;
        let spacing = self.base.config().spacing;
        let space = width - margins.horizontal_sum();

        let mut sections = Vec::new();
        let mut section = FlowSection::empty(space);

        for &item in items {
            let min = item::min_size_effective(item);
            if section.items.is_empty() {
                section.push(item, min, spacing);
                if section.space_left < 0 {
                    // Wider than the container on its own: it gets a row to itself.
                    sections.push(std::mem::replace(&mut section, FlowSection::empty(space)));
                }
            } else if section.space_left < spacing + min.width {
                sections.push(std::mem::replace(&mut section, FlowSection::empty(space)));
                section.push(item, min, spacing);
            } else {
                section.push(item, min, spacing);
            }
        }
        if !section.items.is_empty() {
            sections.push(section);
        }

        if let Some(first) = sections.first_mut() {
            first.secondary_min += margins.v_near;
        }
        if let Some(last) = sections.last_mut() {
            last.secondary_min += margins.v_far;
        }

        crate::trace!(
            items = items.len(),
            width,
            sections = sections.len(),
            "flow partition"
        );
        sections
    }

    /// Margins for section `index` of `count`.
    fn section_margins(&self, index: usize, count: usize) -> Margins {
        let mut margins = self.base.config().margins;
        if index > 0 {
            margins.v_near = 0;
        }
        if index + 1 < count {
            margins.v_far = 0;
        }
        margins
    }

    /// Rectangles for one section starting at `y`, and the section height.
    fn arrange_section(&self, section: &FlowSection<'_>, margins: Margins, x: i32, y: i32, width: i32) -> (Vec<Rect>, i32) {
        let config = self.base.config();
        let trial = arrange_line(
            &section.items,
            Orientation::Horizontal,
            config.alignment,
            Rect::new(x, y, width, section.secondary_min),
            margins,
            config.spacing,
            &self.stretch,
        );
        let row = section
            .items
            .iter()
            .zip(&trial)
            .map(|(&item, rect)| item_height(item, rect.width))
            .max()
            .unwrap_or(0);
        let height = row + margins.vertical_sum();

        let rects = arrange_line(
            &section.items,
            Orientation::Horizontal,
            config.alignment,
            Rect::new(x, y, width, height),
            margins,
            config.spacing,
            &self.stretch,
        );
        (rects, height)
    }
}

/// Height an item needs at `width`.
fn item_height(item: &dyn LayoutItem, width: i32) -> i32 {
    item.height_for_width()
        .map_or(item::min_size_effective(item).height, |hfw| hfw.height_for_width(width))
}

impl Arrange for FlowLayout {
    const MODE: &'static str = "flow";

    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn arrange(&mut self, children: &[&dyn LayoutItem], bounds: Rect, reset: bool) -> GeometryBatch {
        if reset {
            self.stretch.retain_children(children);
        }
        let spacing = self.base.config().spacing;
        let items = item::layoutable(children);
        let sections = self.sections(&items, bounds.width);

        let mut batch = GeometryBatch::with_capacity(items.len());
        let mut y = bounds.y;
        for (index, section) in sections.iter().enumerate() {
            let margins = self.section_margins(index, sections.len());
            let (rects, height) = self.arrange_section(section, margins, bounds.x, y, bounds.width);
            batch.extend(section.items.iter().map(|i| i.id()).zip(rects));
            y += height + spacing;
        }
        batch
    }
}

impl Layout for FlowLayout {
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
        LayoutFlags::all()
    }

    fn min_size(&self) -> Size {
        self.base
            .client_size()
            .map_or(Size::ZERO, |size| self.min_size_for_size(size))
    }

    /// Widest row minimum, and the stacked height of the rows the children
    /// wrap into at `size.width`.
    fn min_size_for_size(&self, size: Size) -> Size {
        self.base.cached_min_size(size, || {
            self.base
                .with_children(|children, _| {
                    let margins = self.base.config().margins;
                    let spacing = self.base.config().spacing;
                    let items = item::layoutable(children);
                    let sections = self.sections(&items, size.width);

                    let mut widest = 0;
                    let mut height = 0;
                    let mut y = 0;
                    for (index, section) in sections.iter().enumerate() {
                        let row_min: i32 = section
                            .items
                            .iter()
                            .map(|&i| item::min_size_effective(i).width)
                            .sum::<i32>()
                            + spacing * (section.items.len() as i32 - 1);
                        widest = widest.max(row_min);

                        let section_margins = self.section_margins(index, sections.len());
                        let (rects, _) =
                            self.arrange_section(section, section_margins, 0, y, size.width);
                        let row = section
                            .items
                            .iter()
                            .zip(&rects)
                            .map(|(&item, rect)| item_height(item, rect.width))
                            .max()
                            .unwrap_or(0);
                        height += row;
                        y += row + spacing;
                    }

                    let gaps = spacing * (sections.len() as i32 - 1).max(0);
                    Size::new(
                        widest + margins.horizontal_sum(),
                        height + margins.vertical_sum() + gaps,
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
