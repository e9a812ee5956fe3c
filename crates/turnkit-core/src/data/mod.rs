//! Toolpath data model.
//!
//! A [`ToolpathTrace`] is the ordered list of [`Segment`] points produced by
//! interpreting one program. Every point is an endpoint: the move that
//! reaches it is described by its [`SegmentKind`].

mod segment;
mod trace;

pub use segment::{AuxCode, Segment, SegmentKind, StopCode};
pub use trace::{Bounds, ToolpathTrace, TraceSummary};
