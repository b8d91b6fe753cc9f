#![forbid(unsafe_code)]

//! Pixel layout engine.
//!
//! A layout computes the geometry of a container's children from their size
//! constraints and commits the result to the container in one batch:
//!
//! - [`BoxLayout`] - one row or column
//! - [`GridLayout`] - a sparse cell matrix with row/column spanning
//! - [`FlowLayout`] - rows that wrap when the width runs out
//! - [`SplitterLayout`] - panes separated by user-draggable handles
//!
//! Every mode distributes space along an axis with the same
//! [`allocator::allocate`] routine.
//!
//! # Collaborators
//!
//! Layouts never own widgets. They see children through the [`LayoutItem`]
//! capability surface and apply results through [`Container::commit_geometry`].
//! The [`headless`] module has in-memory implementations of both.
//!
//! ```ignore
//! use std::{cell::RefCell, rc::Rc};
//! use trellis_layout::{BoxLayout, Layout, headless::{HeadlessContainer, HeadlessItem}};
//! use trellis_core::{LayoutFlags, Rect, Size};
//!
//! let container = Rc::new(RefCell::new(
//!     HeadlessContainer::new(Rect::new(0, 0, 300, 40))
//!         .with_child(HeadlessItem::new(1).min(Size::new(50, 20)).flags(LayoutFlags::RESIZABLE))
//!         .with_child(HeadlessItem::new(2).min(Size::new(80, 20)).flags(LayoutFlags::RESIZABLE)),
//! ));
//!
//! let mut layout = BoxLayout::horizontal();
//! layout.attach_to(&container);
//! layout.update(false)?;
//! ```

pub mod alignment;
pub mod allocator;
pub mod box_layout;
pub mod container;
pub mod error;
pub mod flow;
pub mod grid;
pub mod headless;
pub mod item;
pub mod splitter;

use std::cell::RefCell;
use std::rc::Rc;

pub use alignment::{Align, Alignment2D};
pub use box_layout::BoxLayout;
pub use container::{Container, GeometryBatch, SharedContainer, UpdateHandle};
pub use error::{CommitError, LayoutError, ParameterError};
pub use flow::FlowLayout;
pub use grid::{GridLayout, GridRange};
pub use item::{HeightForWidth, ItemId, LayoutItem};
pub use splitter::{SplitterConfig, SplitterFractions, SplitterItemState, SplitterLayout};
pub use trellis_core::{LayoutFlags, Margins, Orientation, Point, Rect, Size};

#[allow(unused_imports)]
pub(crate) use trellis_core::{debug, debug_span, trace, warn};

/// Margins, spacing and alignment shared by every layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Space between the container's client edges and the children.
    pub margins: Margins,
    /// Space between adjacent children.
    pub spacing: i32,
    pub alignment: Alignment2D,
}

impl LayoutConfig {
    /// No margins and no spacing.
    pub const ZERO: Self = Self {
        margins: Margins::ZERO,
        spacing: 0,
        alignment: Alignment2D::Default,
    };

    /// Margins of 9 on every side and spacing of 6.
    pub const SPACIOUS: Self = Self {
        margins: Margins::all(9),
        spacing: 6,
        alignment: Alignment2D::Default,
    };

    #[must_use]
    pub const fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub const fn with_spacing(mut self, spacing: i32) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub const fn with_alignment(mut self, alignment: Alignment2D) -> Self {
        self.alignment = alignment;
        self
    }

    /// Reject negative margins or spacing.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.margins.has_negative() {
            return Err(ParameterError::NegativeMargin {
                margins: self.margins,
            });
        }
        if self.spacing < 0 {
            return Err(ParameterError::NegativeSpacing {
                spacing: self.spacing,
            });
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::SPACIOUS
    }
}

/// Operations shared by every layout mode.
///
/// A layout is attached to at most one container and holds it weakly: when
/// the container is dropped the layout behaves as detached.
pub trait Layout {
    fn attach(&mut self, container: &SharedContainer);

    /// Attach to a concretely typed container.
    fn attach_to<C: Container + 'static>(&mut self, container: &Rc<RefCell<C>>)
    where
        Self: Sized,
    {
        let shared: SharedContainer = container.clone();
        self.attach(&shared);
    }

    fn detach(&mut self);

    /// Whether the layout has a live container.
    fn is_attached(&self) -> bool;

    fn margins(&self) -> Margins;

    /// Fails with [`ParameterError::NegativeMargin`] and keeps the old value.
    fn set_margins(&mut self, margins: Margins) -> Result<(), LayoutError>;

    fn spacing(&self) -> i32;

    /// Fails with [`ParameterError::NegativeSpacing`] and keeps the old value.
    fn set_spacing(&mut self, spacing: i32) -> Result<(), LayoutError>;

    /// Flags the container should report to its own parent.
    fn layout_flags(&self) -> LayoutFlags;

    /// Smallest container size that respects every child's minimum, at the
    /// container's current client size.
    fn min_size(&self) -> Size;

    /// Smallest container size for a container of `size` (relevant when
    /// children trade height for width).
    fn min_size_for_size(&self, size: Size) -> Size;

    /// Recompute and commit geometry.
    ///
    /// A no-op when detached, while the container is suspended, or while a
    /// pass is already running (the request is coalesced into that pass).
    fn update(&mut self, force_reset: bool) -> Result<(), LayoutError>;

    /// Handle a collaborator can use to request a re-layout.
    fn update_handle(&self) -> UpdateHandle;
}
