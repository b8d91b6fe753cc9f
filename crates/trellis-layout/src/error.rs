//! Layout error taxonomy.
//!
//! Two categories exist: a caller passed an out-of-contract value to a
//! mutator ([`LayoutError::InvalidLayoutParameter`]), or the container failed
//! to apply a geometry batch ([`LayoutError::GeometryCommitFailed`]).
//! Undersized containers, empty containers and hidden children are not errors.

use std::fmt;

use trellis_core::Margins;

use crate::item::ItemId;

/// Errors reported by layout mutators and by `update`.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A mutator rejected its input. The layout state is unchanged.
    InvalidLayoutParameter(ParameterError),
    /// The container rejected a geometry batch part way through.
    GeometryCommitFailed(CommitError),
}

impl LayoutError {
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidLayoutParameter(_))
    }

    #[must_use]
    pub const fn is_commit_failure(&self) -> bool {
        matches!(self, Self::GeometryCommitFailed(_))
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLayoutParameter(err) => write!(f, "invalid layout parameter: {err}"),
            Self::GeometryCommitFailed(err) => write!(f, "geometry commit failed: {err}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidLayoutParameter(err) => Some(err),
            Self::GeometryCommitFailed(err) => Some(err),
        }
    }
}

impl From<ParameterError> for LayoutError {
    fn from(err: ParameterError) -> Self {
        Self::InvalidLayoutParameter(err)
    }
}

impl From<CommitError> for LayoutError {
    fn from(err: CommitError) -> Self {
        Self::GeometryCommitFailed(err)
    }
}

/// Out-of-contract values rejected by layout mutators.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    NegativeMargin {
        margins: Margins,
    },
    NegativeSpacing {
        spacing: i32,
    },
    StretchBelowOne {
        stretch: u32,
    },
    NegativeGridOrigin {
        row: i32,
        column: i32,
    },
    NonPositiveGridSpan {
        row_span: i32,
        column_span: i32,
    },
    NegativeGridTrack {
        axis: &'static str,
        index: i32,
    },
    NegativeHandleWidth {
        width: i32,
    },
    InvalidFractions {
        reason: &'static str,
    },
    /// No draggable splitter handle at this child index.
    InvalidHandle {
        index: usize,
    },
    /// The item is not a child of the attached container.
    UnknownItem {
        item: ItemId,
    },
    /// The mutator needs an attached container.
    ContainerRequired,
    /// The layout mode does not support this setting.
    Unsupported {
        setting: &'static str,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeMargin { margins } => write!(
                f,
                "margins must not be negative (h_near={}, v_near={}, h_far={}, v_far={})",
                margins.h_near, margins.v_near, margins.h_far, margins.v_far
            ),
            Self::NegativeSpacing { spacing } => {
                write!(f, "spacing must not be negative, got {spacing}")
            }
            Self::StretchBelowOne { stretch } => {
                write!(f, "stretch factor must be >= 1, got {stretch}")
            }
            Self::NegativeGridOrigin { row, column } => write!(
                f,
                "grid origin must be >= 0, got row {row} column {column}"
            ),
            Self::NonPositiveGridSpan {
                row_span,
                column_span,
            } => write!(
                f,
                "grid span must be >= 1, got {row_span} rows x {column_span} columns"
            ),
            Self::NegativeGridTrack { axis, index } => {
                write!(f, "grid {axis} index must be >= 0, got {index}")
            }
            Self::NegativeHandleWidth { width } => {
                write!(f, "splitter handle width must not be negative, got {width}")
            }
            Self::InvalidFractions { reason } => write!(f, "invalid splitter fractions: {reason}"),
            Self::InvalidHandle { index } => {
                write!(f, "child {index} is not an active splitter handle")
            }
            Self::UnknownItem { item } => {
                write!(f, "item {} is not a child of the container", item.get())
            }
            Self::ContainerRequired => write!(f, "layout is not attached to a container"),
            Self::Unsupported { setting } => write!(f, "{setting} is not supported by this layout"),
        }
    }
}

impl std::error::Error for ParameterError {}

/// Failure reported by [`Container::commit_geometry`](crate::Container::commit_geometry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitError {
    /// Batch entries applied before the failure.
    pub committed: usize,
    pub reason: String,
}

impl CommitError {
    pub fn new(committed: usize, reason: impl Into<String>) -> Self {
        Self {
            committed,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (after {} item(s) were committed)",
            self.reason, self.committed
        )
    }
}

impl std::error::Error for CommitError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn categories_are_distinguishable() {
        let invalid = LayoutError::from(ParameterError::NegativeSpacing { spacing: -2 });
        assert!(invalid.is_invalid_parameter());
        assert!(!invalid.is_commit_failure());

        let commit = LayoutError::from(CommitError::new(3, "batch rejected"));
        assert!(commit.is_commit_failure());
        assert_eq!(
            commit.to_string(),
            "geometry commit failed: batch rejected (after 3 item(s) were committed)"
        );
    }

    #[test]
    fn source_exposes_inner_error() {
        let err = LayoutError::from(ParameterError::StretchBelowOne { stretch: 0 });
        let source = err.source().expect("inner error");
        assert_eq!(source.to_string(), "stretch factor must be >= 1, got 0");
    }
}
