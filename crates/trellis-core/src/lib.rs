#![forbid(unsafe_code)]

//! Core: pixel geometry, layout capability flags, and the logging facade
//! shared by the trellis layout crates.

pub mod flags;
pub mod geometry;
pub mod logging;

pub use flags::LayoutFlags;
pub use geometry::{Margins, Orientation, Point, Rect, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, trace_span, warn};
