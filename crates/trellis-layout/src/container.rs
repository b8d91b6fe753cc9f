//! The container collaborator and the machinery every layout shares:
//! geometry batches, the weak container link, the re-entrancy guard, and the
//! per-item stretch table.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use trellis_core::{Margins, Rect, Size};

use crate::LayoutConfig;
use crate::error::{CommitError, LayoutError, ParameterError};
use crate::item::{ItemId, LayoutItem};

/// Upper bound on back-to-back passes run by one `update` call when
/// collaborators keep requesting re-layouts from inside a commit.
pub const MAX_COALESCED_PASSES: usize = 8;

/// What a layout needs from the widget that owns it.
pub trait Container {
    /// Children in insertion order.
    fn children(&self) -> Vec<&dyn LayoutItem>;

    /// Client area the layout arranges into.
    fn client_bounds(&self) -> Rect;

    /// Batch-update mode: layouts skip their passes while this is true.
    fn is_suspended(&self) -> bool {
        false
    }

    /// Apply every entry of `batch` as one deferred operation.
    ///
    /// On failure, report how many entries were applied before it.
    fn commit_geometry(&mut self, batch: &GeometryBatch) -> Result<(), CommitError>;
}

/// How layouts hold their container.
pub type SharedContainer = Rc<RefCell<dyn Container>>;

/// All rectangles computed by one pass, committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryBatch {
    entries: Vec<(ItemId, Rect)>,
}

impl GeometryBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: ItemId, rect: Rect) {
        self.entries.push((item, rect));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in commit order.
    pub fn entries(&self) -> &[(ItemId, Rect)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, Rect)> + '_ {
        self.entries.iter().copied()
    }

    /// Rectangle computed for `item`, if it was laid out.
    pub fn get(&self, item: ItemId) -> Option<Rect> {
        self.entries
            .iter()
            .find_map(|&(id, rect)| (id == item).then_some(rect))
    }
}

impl Extend<(ItemId, Rect)> for GeometryBatch {
    fn extend<T: IntoIterator<Item = (ItemId, Rect)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl FromIterator<(ItemId, Rect)> for GeometryBatch {
    fn from_iter<T: IntoIterator<Item = (ItemId, Rect)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Flags shared between a layout and its [`UpdateHandle`]s.
#[derive(Debug, Default)]
struct PassState {
    performing: Cell<bool>,
    pending: Cell<bool>,
    reset_needed: Cell<bool>,
}

/// Marks a pass as running; clears the mark on drop, including early returns.
struct PassGuard<'a> {
    state: &'a PassState,
}

impl<'a> PassGuard<'a> {
    fn enter(state: &'a PassState) -> Self {
        state.performing.set(true);
        Self { state }
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.state.performing.set(false);
    }
}

/// Cloneable request channel into a layout's pass state.
///
/// A collaborator that changes a child's constraints while geometry is being
/// committed calls [`request_update`](Self::request_update); the layout runs
/// one more pass after the current one instead of recursing.
#[derive(Debug, Clone)]
pub struct UpdateHandle {
    state: Rc<PassState>,
}

impl UpdateHandle {
    pub fn request_update(&self, reset: bool) {
        if reset {
            self.state.reset_needed.set(true);
        }
        self.state.pending.set(true);
    }

    /// A pass is currently running.
    pub fn is_performing(&self) -> bool {
        self.state.performing.get()
    }

    /// A requested pass has not run yet.
    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }
}

/// Per-item stretch weights (default 1), keyed by item id.
#[derive(Debug, Clone, Default)]
pub(crate) struct StretchFactors {
    factors: HashMap<ItemId, u32>,
}

impl StretchFactors {
    pub(crate) fn get(&self, item: ItemId) -> u32 {
        self.factors.get(&item).copied().unwrap_or(1)
    }

    pub(crate) fn set(&mut self, item: ItemId, factor: u32) {
        if factor == 1 {
            self.factors.remove(&item);
        } else {
            self.factors.insert(item, factor);
        }
    }

    /// Drop entries for items no longer among `children`.
    pub(crate) fn retain_children(&mut self, children: &[&dyn LayoutItem]) {
        self.factors
            .retain(|id, _| children.iter().any(|child| child.id() == *id));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.factors.len()
    }
}

/// A layout pass as seen by [`LayoutBase::run_update`].
pub(crate) trait Arrange {
    /// Mode name recorded on the `layout_update` span.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    const MODE: &'static str;

    fn base(&self) -> &LayoutBase;

    /// Compute the batch for `children` inside `bounds`. `reset` is set when
    /// the item set changed (or a reset was requested) and per-item state
    /// should be rebuilt.
    fn arrange(&mut self, children: &[&dyn LayoutItem], bounds: Rect, reset: bool) -> GeometryBatch;
}

/// State every layout mode carries: the container link, the config, the
/// pass flags, the min-size memo and the children seen by the last pass.
#[derive(Debug)]
pub(crate) struct LayoutBase {
    container: Option<Weak<RefCell<dyn Container>>>,
    config: LayoutConfig,
    state: Rc<PassState>,
    min_sizes: RefCell<HashMap<Size, Size>>,
    children_seen: RefCell<Vec<ItemId>>,
}

impl LayoutBase {
    pub(crate) fn new(config: LayoutConfig) -> Self {
        Self {
            container: None,
            config,
            state: Rc::new(PassState::default()),
            min_sizes: RefCell::new(HashMap::new()),
            children_seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub(crate) fn attach(&mut self, container: &SharedContainer) {
        self.container = Some(Rc::downgrade(container));
        self.state.reset_needed.set(true);
        self.invalidate();
    }

    pub(crate) fn detach(&mut self) {
        self.container = None;
        self.invalidate();
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.upgrade().is_some()
    }

    fn upgrade(&self) -> Option<SharedContainer> {
        self.container.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn update_handle(&self) -> UpdateHandle {
        UpdateHandle {
            state: Rc::clone(&self.state),
        }
    }

    pub(crate) fn set_margins(&mut self, margins: Margins) -> Result<(), ParameterError> {
        if margins.has_negative() {
            return Err(ParameterError::NegativeMargin { margins });
        }
        self.config.margins = margins;
        self.invalidate();
        Ok(())
    }

    pub(crate) fn set_spacing(&mut self, spacing: i32) -> Result<(), ParameterError> {
        if spacing < 0 {
            return Err(ParameterError::NegativeSpacing { spacing });
        }
        self.config.spacing = spacing;
        self.invalidate();
        Ok(())
    }

    pub(crate) fn set_alignment(&mut self, alignment: crate::Alignment2D) {
        self.config.alignment = alignment;
        self.invalidate();
    }

    /// Rebuild per-item state on the next pass.
    pub(crate) fn request_reset(&self) {
        self.state.reset_needed.set(true);
    }

    /// Forget memoized minimum sizes.
    pub(crate) fn invalidate(&self) {
        self.min_sizes.borrow_mut().clear();
    }

    /// Run `f` over the container's children and client bounds. `None` when
    /// detached or when the container is mutably borrowed elsewhere.
    pub(crate) fn with_children<R>(
        &self,
        f: impl FnOnce(&[&dyn LayoutItem], Rect) -> R,
    ) -> Option<R> {
        let container = self.upgrade()?;
        let container = container.try_borrow().ok()?;
        let children = container.children();
        Some(f(&children, container.client_bounds()))
    }

    /// Check that `item` is a child of the attached container.
    pub(crate) fn require_child(&self, item: ItemId) -> Result<(), ParameterError> {
        match self.with_children(|children, _| children.iter().any(|c| c.id() == item)) {
            None => Err(ParameterError::ContainerRequired),
            Some(false) => Err(ParameterError::UnknownItem { item }),
            Some(true) => Ok(()),
        }
    }

    /// Remember the ids of `children`. True when they differ from the ones
    /// seen by the previous pass.
    pub(crate) fn note_children(&self, children: &[&dyn LayoutItem]) -> bool {
        let mut seen = self.children_seen.borrow_mut();
        let unchanged = seen.len() == children.len()
            && seen.iter().zip(children).all(|(id, child)| *id == child.id());
        if !unchanged {
            *seen = children.iter().map(|child| child.id()).collect();
        }
        !unchanged
    }

    /// Memoized minimum size for a container of `size`.
    pub(crate) fn cached_min_size(&self, size: Size, compute: impl FnOnce() -> Size) -> Size {
        if let Some(&min) = self.min_sizes.borrow().get(&size) {
            return min;
        }
        let min = compute();
        self.min_sizes.borrow_mut().insert(size, min);
        min
    }

    /// Current client size of the container, if attached.
    pub(crate) fn client_size(&self) -> Option<Size> {
        self.with_children(|_, bounds| bounds.size())
    }

    /// Run one `update` for `layout`, including coalesced follow-up passes.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub(crate) fn run_update<L: Arrange>(layout: &mut L, force_reset: bool) -> Result<(), LayoutError> {
        let base = layout.base();
        base.invalidate();
        let state = Rc::clone(&base.state);
        if force_reset {
            state.reset_needed.set(true);
        }

        let Some(container) = base.upgrade() else {
            crate::debug!(mode = L::MODE, "update skipped: no container");
            return Ok(());
        };

        if state.performing.get() {
            state.pending.set(true);
            crate::debug!(mode = L::MODE, "update coalesced into running pass");
            return Ok(());
        }

        let _guard = PassGuard::enter(&state);

        for pass in 0..MAX_COALESCED_PASSES {
            state.pending.set(false);

            let batch = {
                let Ok(view) = container.try_borrow() else {
                    state.pending.set(true);
                    crate::debug!(mode = L::MODE, "update coalesced: container busy");
                    return Ok(());
                };
                if view.is_suspended() {
                    state.pending.set(true);
                    crate::debug!(mode = L::MODE, "update skipped: container suspended");
                    return Ok(());
                }

                let children = view.children();
                let reset =
                    state.reset_needed.replace(false) | layout.base().note_children(&children);
                let bounds = view.client_bounds();
                let _span = crate::debug_span!(
                    "layout_update",
                    mode = L::MODE,
                    pass,
                    reset,
                    width = bounds.width,
                    height = bounds.height
                )
                .entered();

                layout.arrange(&children, bounds, reset)
            };

            let result = match container.try_borrow_mut() {
                Ok(mut view) => view.commit_geometry(&batch),
                Err(_) => {
                    state.pending.set(true);
                    crate::debug!(mode = L::MODE, "commit deferred: container busy");
                    return Ok(());
                }
            };
            if let Err(err) = result {
                crate::warn!(
                    mode = L::MODE,
                    committed = err.committed,
                    reason = %err.reason,
                    "geometry commit failed"
                );
                return Err(err.into());
            }

            if !state.pending.get() {
                return Ok(());
            }
        }

        state.pending.set(false);
        crate::warn!(
            mode = L::MODE,
            passes = MAX_COALESCED_PASSES,
            "relayout requests did not settle; giving up until the next update"
        );
        Ok(())
    }
}
