//! In-memory collaborators for offscreen layout and tests.
//!
//! [`HeadlessItem`] is a static [`LayoutItem`] built with chained setters.
//! [`HeadlessContainer`] owns a list of them, records every committed
//! rectangle, and can be told to suspend, fail part way through a commit, or
//! request a re-layout from inside a commit.

use std::collections::HashMap;

use trellis_core::{LayoutFlags, Rect, Size};

use crate::Alignment2D;
use crate::container::{Container, GeometryBatch, UpdateHandle};
use crate::error::CommitError;
use crate::item::{HeightForWidth, ItemId, LayoutItem};

/// Height-for-width that keeps a constant area, like wrapped text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaHeightForWidth {
    pub area: i32,
}

impl HeightForWidth for AreaHeightForWidth {
    fn height_for_width(&self, width: i32) -> i32 {
        if width <= 0 {
            return self.area;
        }
        (self.area + width - 1) / width
    }
}

/// A layout item with fixed constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessItem {
    id: ItemId,
    min: Size,
    min_hint: Size,
    max: Size,
    preferred: Size,
    flags: LayoutFlags,
    spacer: bool,
    visible: bool,
    always_consume_space: bool,
    alignment: Alignment2D,
    hfw: Option<AreaHeightForWidth>,
}

impl HeadlessItem {
    /// A visible item with no constraints and no flags.
    pub fn new(id: u64) -> Self {
        Self {
            id: ItemId::new(id),
            min: Size::ZERO,
            min_hint: Size::ZERO,
            max: Size::ZERO,
            preferred: Size::ZERO,
            flags: LayoutFlags::empty(),
            spacer: false,
            visible: true,
            always_consume_space: false,
            alignment: Alignment2D::Default,
            hfw: None,
        }
    }

    /// A spacer with the given flags.
    pub fn spacer(id: u64, flags: LayoutFlags) -> Self {
        Self {
            spacer: true,
            flags,
            ..Self::new(id)
        }
    }

    #[must_use]
    pub fn min(mut self, size: Size) -> Self {
        self.min = size;
        self
    }

    #[must_use]
    pub fn min_hint(mut self, size: Size) -> Self {
        self.min_hint = size;
        self
    }

    #[must_use]
    pub fn max(mut self, size: Size) -> Self {
        self.max = size;
        self
    }

    #[must_use]
    pub fn preferred(mut self, size: Size) -> Self {
        self.preferred = size;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: LayoutFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn always_consume_space(mut self) -> Self {
        self.always_consume_space = true;
        self
    }

    #[must_use]
    pub fn alignment(mut self, alignment: Alignment2D) -> Self {
        self.alignment = alignment;
        self
    }

    /// Give the item a constant-area height-for-width.
    #[must_use]
    pub fn wrapping(mut self, area: i32) -> Self {
        self.hfw = Some(AreaHeightForWidth { area });
        self
    }

    pub fn set_min(&mut self, size: Size) {
        self.min = size;
    }

    pub fn set_preferred(&mut self, size: Size) {
        self.preferred = size;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl LayoutItem for HeadlessItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn min_size(&self) -> Size {
        self.min
    }

    fn min_size_hint(&self) -> Size {
        self.min_hint
    }

    fn max_size(&self) -> Size {
        self.max
    }

    fn preferred_size(&self) -> Size {
        self.preferred
    }

    fn layout_flags(&self) -> LayoutFlags {
        self.flags
    }

    fn is_spacer(&self) -> bool {
        self.spacer
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn always_consume_space(&self) -> bool {
        self.always_consume_space
    }

    fn alignment(&self) -> Alignment2D {
        self.alignment
    }

    fn height_for_width(&self) -> Option<&dyn HeightForWidth> {
        self.hfw.as_ref().map(|hfw| hfw as &dyn HeightForWidth)
    }
}

/// A container that keeps committed geometry in memory.
#[derive(Debug)]
pub struct HeadlessContainer {
    bounds: Rect,
    children: Vec<HeadlessItem>,
    suspended: bool,
    geometry: HashMap<ItemId, Rect>,
    last_batch: GeometryBatch,
    commit_count: usize,
    fail_after: Option<usize>,
    relayout: Option<(UpdateHandle, usize)>,
}

impl HeadlessContainer {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            children: Vec::new(),
            suspended: false,
            geometry: HashMap::new(),
            last_batch: GeometryBatch::new(),
            commit_count: 0,
            fail_after: None,
            relayout: None,
        }
    }

    #[must_use]
    pub fn with_child(mut self, item: HeadlessItem) -> Self {
        self.children.push(item);
        self
    }

    #[must_use]
    pub fn with_children(mut self, items: impl IntoIterator<Item = HeadlessItem>) -> Self {
        self.children.extend(items);
        self
    }

    /// Make every later commit fail after applying `committed` entries.
    #[must_use]
    pub fn fail_after(mut self, committed: usize) -> Self {
        self.fail_after = Some(committed);
        self
    }

    pub fn clear_failure(&mut self) {
        self.fail_after = None;
    }

    /// On each of the next `times` commits, ask the layout behind `handle`
    /// for another pass.
    pub fn request_relayout_on_commit(&mut self, handle: UpdateHandle, times: usize) {
        self.relayout = Some((handle, times));
    }

    pub fn push(&mut self, item: HeadlessItem) {
        self.children.push(item);
    }

    pub fn remove(&mut self, id: u64) -> Option<HeadlessItem> {
        let index = self.children.iter().position(|c| c.id == ItemId::new(id))?;
        self.geometry.remove(&ItemId::new(id));
        Some(self.children.remove(index))
    }

    pub fn child_mut(&mut self, id: u64) -> Option<&mut HeadlessItem> {
        self.children.iter_mut().find(|c| c.id == ItemId::new(id))
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Last rectangle committed for `id`.
    pub fn geometry_of(&self, id: u64) -> Option<Rect> {
        self.geometry.get(&ItemId::new(id)).copied()
    }

    pub fn geometry(&self) -> &HashMap<ItemId, Rect> {
        &self.geometry
    }

    /// The most recent batch that committed in full.
    pub fn last_batch(&self) -> &GeometryBatch {
        &self.last_batch
    }

    /// Number of batches that committed in full.
    pub fn commit_count(&self) -> usize {
        self.commit_count
    }
}

impl Container for HeadlessContainer {
    fn children(&self) -> Vec<&dyn LayoutItem> {
        self.children.iter().map(|c| c as &dyn LayoutItem).collect()
    }

    fn client_bounds(&self) -> Rect {
        self.bounds
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn commit_geometry(&mut self, batch: &GeometryBatch) -> Result<(), CommitError> {
        for (committed, (id, rect)) in batch.iter().enumerate() {
            if self.fail_after == Some(committed) {
                return Err(CommitError::new(committed, "injected commit failure"));
            }
            self.geometry.insert(id, rect);
        }
        self.last_batch = batch.clone();
        self.commit_count += 1;

        if let Some((handle, remaining)) = &mut self.relayout
            && *remaining > 0
        {
            *remaining -= 1;
            handle.request_update(false);
        }
        Ok(())
    }
}
