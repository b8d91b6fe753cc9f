//! Sparse cell-matrix layout with row and column spanning.
//!
//! # Algorithm
//!
//! Columns are sized first: each column gets the largest effective minimum
//! width of the single-column items in it, a cap from the items' maxima
//! (unbounded if any item in it is unbounded), and the greedy tier of its
//! single-column items. A spanning item whose minimum exceeds what its
//! columns already provide pushes the difference onto those columns in
//! proportion to their stretch. One allocator pass then sizes the occupied
//! columns. Rows follow the same steps, except that height-for-width items
//! report the height they need at the width of their spanned columns.
//!
//! Tracks with no item take no space and no spacing.

use std::collections::HashMap;

use trellis_core::{LayoutFlags, Margins, Orientation, Rect, Size};

use crate::alignment::Alignment2D;
use crate::allocator::{self, AxisItem, GreedyClass};
use crate::container::{Arrange, GeometryBatch, LayoutBase, SharedContainer, UpdateHandle};
use crate::error::{LayoutError, ParameterError};
use crate::item::{self, ItemId, LayoutItem};
use crate::{Layout, LayoutConfig};

/// Cells covered by an item: anchor cell plus spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRange {
    pub row: i32,
    pub column: i32,
    pub row_span: i32,
    pub column_span: i32,
}

impl GridRange {
    pub const fn new(row: i32, column: i32, row_span: i32, column_span: i32) -> Self {
        Self {
            row,
            column,
            row_span,
            column_span,
        }
    }

    /// A single cell.
    pub const fn cell(row: i32, column: i32) -> Self {
        Self::new(row, column, 1, 1)
    }

    /// Read a cell rectangle: `x` is the column, `width` the column span.
    pub const fn from_rect(rect: Rect) -> Self {
        Self::new(rect.y, rect.x, rect.height, rect.width)
    }

    fn validate(&self) -> Result<(), ParameterError> {
        if self.row < 0 || self.column < 0 {
            return Err(ParameterError::NegativeGridOrigin {
                row: self.row,
                column: self.column,
            });
        }
        if self.row_span < 1 || self.column_span < 1 {
            return Err(ParameterError::NonPositiveGridSpan {
                row_span: self.row_span,
                column_span: self.column_span,
            });
        }
        Ok(())
    }

    /// First track and span along `orientation` (columns for horizontal).
    fn along(&self, orientation: Orientation) -> (usize, usize) {
        match orientation {
            Orientation::Horizontal => (self.column as usize, self.column_span as usize),
            Orientation::Vertical => (self.row as usize, self.row_span as usize),
        }
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (row, rows) = self.along(Orientation::Vertical);
        let (column, columns) = self.along(Orientation::Horizontal);
        (row..row + rows).flat_map(move |r| (column..column + columns).map(move |c| (r, c)))
    }
}

/// Grid layout.
#[derive(Debug)]
pub struct GridLayout {
    base: LayoutBase,
    ranges: HashMap<ItemId, GridRange>,
    /// `cells[row][column]`
    cells: Vec<Vec<Option<ItemId>>>,
    row_stretch: Vec<u32>,
    column_stretch: Vec<u32>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GridLayout {
    /// A grid with no margins and no spacing.
    pub fn new() -> Self {
        Self {
            base: LayoutBase::new(LayoutConfig::ZERO),
            ranges: HashMap::new(),
            cells: Vec::new(),
            row_stretch: Vec::new(),
            column_stretch: Vec::new(),
        }
    }

    pub fn with_config(config: LayoutConfig) -> Result<Self, LayoutError> {
        config.validate()?;
        Ok(Self {
            base: LayoutBase::new(config),
            ..Self::new()
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_stretch.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_stretch.len()
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

    /// Item anchored or spanning over `(row, column)`.
    pub fn item_at(&self, row: usize, column: usize) -> Option<ItemId> {
        self.cells.get(row)?.get(column).copied().flatten()
    }

    /// Cells assigned to `item`.
    pub fn range(&self, item: ItemId) -> Option<GridRange> {
        self.ranges.get(&item).copied()
    }

    /// Assign `item` to `range`.
    ///
    /// Any other item occupying one of the target cells loses its whole
    /// assignment. Re-assigning an item moves it.
    pub fn set_range(&mut self, item: ItemId, range: GridRange) -> Result<(), LayoutError> {
        range.validate()?;
        self.base.require_child(item)?;

        if let Some(old) = self.ranges.remove(&item) {
            self.clear_cells(old);
        }

        let (row, rows) = range.along(Orientation::Vertical);
        let (column, columns) = range.along(Orientation::Horizontal);
        self.ensure_size(row + rows, column + columns);

        let displaced: Vec<ItemId> = range
            .cells()
            .filter_map(|(r, c)| self.cells[r][c])
            .collect();
        for other in displaced {
            if let Some(old) = self.ranges.remove(&other) {
                self.clear_cells(old);
            }
        }

        for (r, c) in range.cells() {
            self.cells[r][c] = Some(item);
        }
        self.ranges.insert(item, range);
        self.changed()
    }

    /// Stretch of `row` (1 for rows beyond the matrix).
    pub fn row_stretch_factor(&self, row: usize) -> u32 {
        stretch_at(&self.row_stretch, row)
    }

    pub fn column_stretch_factor(&self, column: usize) -> u32 {
        stretch_at(&self.column_stretch, column)
    }

    /// Set the stretch of `row`, growing the matrix if needed.
    pub fn set_row_stretch_factor(&mut self, row: i32, factor: u32) -> Result<(), LayoutError> {
        let row = self.check_track("row", row, factor)?;
        if factor == self.row_stretch_factor(row) {
            return Ok(());
        }
        self.ensure_size(row + 1, self.column_count());
        self.row_stretch[row] = factor;
        self.changed()
    }

    pub fn set_column_stretch_factor(&mut self, column: i32, factor: u32) -> Result<(), LayoutError> {
        let column = self.check_track("column", column, factor)?;
        if factor == self.column_stretch_factor(column) {
            return Ok(());
        }
        self.ensure_size(self.row_count(), column + 1);
        self.column_stretch[column] = factor;
        self.changed()
    }

    fn check_track(&self, axis: &'static str, index: i32, factor: u32) -> Result<usize, ParameterError> {
        if index < 0 {
            return Err(ParameterError::NegativeGridTrack { axis, index });
        }
        if factor < 1 {
            return Err(ParameterError::StretchBelowOne { stretch: factor });
        }
        if !self.base.is_attached() {
            return Err(ParameterError::ContainerRequired);
        }
        Ok(index as usize)
    }

    /// Grow (never shrink) the matrix to at least `rows x columns`.
    fn ensure_size(&mut self, rows: usize, columns: usize) {
        if self.row_stretch.len() < rows {
            self.row_stretch.resize(rows, 1);
        }
        if self.column_stretch.len() < columns {
            self.column_stretch.resize(columns, 1);
        }
        let columns = self.column_stretch.len();
        self.cells.resize_with(self.row_stretch.len(), Vec::new);
        for row in &mut self.cells {
            row.resize(columns, None);
        }
    }

    fn clear_cells(&mut self, range: GridRange) {
        for (r, c) in range.cells() {
            if let Some(cell) = self.cells.get_mut(r).and_then(|row| row.get_mut(c)) {
                *cell = None;
            }
        }
    }

    /// Forget items that are no longer children.
    fn cleanup(&mut self, children: &[&dyn LayoutItem]) {
        let stale: Vec<ItemId> = self
            .ranges
            .keys()
            .filter(|id| !children.iter().any(|c| c.id() == **id))
            .copied()
            .collect();
        for id in stale {
            if let Some(range) = self.ranges.remove(&id) {
                self.clear_cells(range);
            }
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

    /// Laid-out children with a range, in container order.
    fn placements<'a>(&self, children: &[&'a dyn LayoutItem]) -> Vec<Placement<'a>> {
        children
            .iter()
            .filter(|c| item::should_layout(**c))
            .filter_map(|&item| {
                self.ranges
                    .get(&item.id())
                    .map(|&range| Placement { item, range })
            })
            .collect()
    }

    fn column_tracks(&self, placements: &[Placement<'_>]) -> Vec<Track> {
        build_tracks(
            placements,
            Orientation::Horizontal,
            self.column_count(),
            self.base.config().spacing,
            &self.column_stretch,
            |p| item::min_size_effective(p.item).width,
        )
    }

    fn row_tracks(&self, placements: &[Placement<'_>], columns: &[Track], widths: &[i32]) -> Vec<Track> {
        let spacing = self.base.config().spacing;
        build_tracks(
            placements,
            Orientation::Vertical,
            self.row_count(),
            spacing,
            &self.row_stretch,
            |p| match p.item.height_for_width() {
                Some(hfw) => {
                    let (column, span) = p.range.along(Orientation::Horizontal);
                    hfw.height_for_width(span_extent(columns, widths, column, span, spacing))
                }
                None => item::min_size_effective(p.item).height,
            },
        )
    }
}

impl Arrange for GridLayout {
    const MODE: &'static str = "grid";

    fn base(&self) -> &LayoutBase {
        &self.base
    }

    fn arrange(&mut self, children: &[&dyn LayoutItem], bounds: Rect, reset: bool) -> GeometryBatch {
        if reset {
            self.cleanup(children);
        }

        let config = *self.base.config();
        let margins = config.margins;
        let spacing = config.spacing;
        let placements = self.placements(children);

        let columns = self.column_tracks(&placements);
        let widths = resolve_tracks(
            &columns,
            &self.column_stretch,
            bounds.width - margins.horizontal_sum(),
            spacing,
        );
        let rows = self.row_tracks(&placements, &columns, &widths);
        let heights = resolve_tracks(
            &rows,
            &self.row_stretch,
            bounds.height - margins.vertical_sum(),
            spacing,
        );

        let xs = track_starts(&columns, &widths, bounds.x + margins.h_near, spacing);
        let ys = track_starts(&rows, &heights, bounds.y + margins.v_near, spacing);

        placements
            .iter()
            .map(|p| {
                let alignment = p.item.alignment().or(config.alignment);
                let (x, width) = place(p, Orientation::Horizontal, &xs, &widths, alignment);
                let (y, height) = place(p, Orientation::Vertical, &ys, &heights, alignment);
                (p.item.id(), Rect::new(x, y, width, height))
            })
            .collect()
    }
}

impl Layout for GridLayout {
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
            .with_children(|children, _| {
                if children.is_empty() {
                    return LayoutFlags::RESIZABLE;
                }
                children
                    .iter()
                    .filter(|c| item::should_layout(**c))
                    .fold(LayoutFlags::empty(), |flags, c| flags | c.layout_flags())
            })
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
                    let margins = self.base.config().margins;
                    let spacing = self.base.config().spacing;
                    let placements = self.placements(children);

                    let columns = self.column_tracks(&placements);
                    let widths = resolve_tracks(
                        &columns,
                        &self.column_stretch,
                        size.width - margins.horizontal_sum(),
                        spacing,
                    );
                    let rows = self.row_tracks(&placements, &columns, &widths);

                    Size::new(
                        margins.horizontal_sum() + min_extent(&columns, spacing),
                        margins.vertical_sum() + min_extent(&rows, spacing),
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

#[derive(Clone, Copy)]
struct Placement<'a> {
    item: &'a dyn LayoutItem,
    range: GridRange,
}

/// Allocation input for one row or column.
#[derive(Debug, Clone, Copy, Default)]
struct Track {
    occupied: bool,
    min: i32,
    cap: i32,
    unbounded: bool,
    greedy: bool,
    greedy_spacer: bool,
}

impl Track {
    fn class(&self) -> GreedyClass {
        if self.greedy {
            GreedyClass::GreedyNonSpacer
        } else if self.greedy_spacer {
            GreedyClass::GreedySpacer
        } else {
            GreedyClass::Regular
        }
    }

    fn max(&self) -> Option<i32> {
        (!self.unbounded).then_some(self.cap.max(self.min))
    }
}

fn stretch_at(factors: &[u32], index: usize) -> u32 {
    factors.get(index).copied().unwrap_or(1).max(1)
}

fn build_tracks(
    placements: &[Placement<'_>],
    orientation: Orientation,
    count: usize,
    spacing: i32,
    stretch: &[u32],
    min_of: impl Fn(&Placement<'_>) -> i32,
) -> Vec<Track> {
    let mut tracks = vec![Track::default(); count];

    for p in placements {
        let (start, span) = p.range.along(orientation);
        let max = item::axis_max(p.item, orientation);
        for track in &mut tracks[start..start + span] {
            track.occupied = true;
            match max {
                Some(max) => track.cap = track.cap.max(max),
                None => track.unbounded = true,
            }
        }

        if span == 1 {
            let track = &mut tracks[start];
            track.min = track.min.max(min_of(p).max(0));
            if p.item.layout_flags().is_greedy(orientation) {
                if p.item.is_spacer() {
                    track.greedy_spacer = true;
                } else {
                    track.greedy = true;
                }
            }
        }
    }

    // Spanning items push their unmet minimum onto the tracks they cover.
    for p in placements {
        let (start, span) = p.range.along(orientation);
        if span < 2 {
            continue;
        }
        let covered: i32 = tracks[start..start + span].iter().map(|t| t.min).sum::<i32>()
            + spacing * (span as i32 - 1);
        let mut deficit = i64::from(min_of(p) - covered);
        if deficit <= 0 {
            continue;
        }
        let mut stretch_remaining: i64 = (start..start + span)
            .map(|i| i64::from(stretch_at(stretch, i)))
            .sum();
        for (i, track) in tracks[start..start + span].iter_mut().enumerate() {
            let weight = i64::from(stretch_at(stretch, start + i));
            let share = deficit * weight / stretch_remaining;
            track.min += share as i32;
            deficit -= share;
            stretch_remaining -= weight;
        }
    }

    tracks
}

/// Sizes for every track; unoccupied tracks get 0.
fn resolve_tracks(tracks: &[Track], stretch: &[u32], available: i32, spacing: i32) -> Vec<i32> {
    let used: Vec<usize> = (0..tracks.len()).filter(|&i| tracks[i].occupied).collect();
    let axis: Vec<AxisItem> = used
        .iter()
        .map(|&i| {
            let track = &tracks[i];
            AxisItem::new(track.min, track.max(), stretch_at(stretch, i), track.class())
        })
        .collect();

    let mut sizes = vec![0; tracks.len()];
    for (&i, size) in used
        .iter()
        .zip(allocator::allocate(&axis, available.max(0), spacing))
    {
        sizes[i] = size;
    }
    sizes
}

fn min_extent(tracks: &[Track], spacing: i32) -> i32 {
    let used: Vec<&Track> = tracks.iter().filter(|t| t.occupied).collect();
    let gaps = spacing * (used.len() as i32 - 1).max(0);
    used.iter().map(|t| t.min).sum::<i32>() + gaps
}

/// Leading edge of every track; occupied tracks are followed by `spacing`.
fn track_starts(tracks: &[Track], sizes: &[i32], origin: i32, spacing: i32) -> Vec<i32> {
    let mut position = origin;
    tracks
        .iter()
        .zip(sizes)
        .map(|(track, &size)| {
            let start = position;
            if track.occupied {
                position += size + spacing;
            }
            start
        })
        .collect()
}

/// Extent of `span` tracks from `start`, including the spacing between them.
fn span_extent(tracks: &[Track], sizes: &[i32], start: usize, span: usize, spacing: i32) -> i32 {
    let end = (start + span).min(sizes.len());
    let used = tracks[start..end].iter().filter(|t| t.occupied).count() as i32;
    sizes[start..end].iter().sum::<i32>() + spacing * (used - 1).max(0)
}

/// Position and length of `p` along `orientation`.
fn place(
    p: &Placement<'_>,
    orientation: Orientation,
    starts: &[i32],
    sizes: &[i32],
    alignment: Alignment2D,
) -> (i32, i32) {
    let (start, span) = p.range.along(orientation);
    let last = start + span - 1;
    let cell_start = starts[start];
    let cell_len = starts[last] + sizes[last] - cell_start;

    if p.item.layout_flags().can_grow(orientation) {
        return (cell_start, cell_len);
    }

    let len = p
        .item
        .preferred_size()
        .along(orientation)
        .max(item::min_size_effective(p.item).along(orientation))
        .min(cell_len);
    (cell_start + alignment.along(orientation).offset(cell_len, len), len)
}
