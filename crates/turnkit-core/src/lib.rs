//! # TurnKit Core
//!
//! Core types shared by the TurnKit crates.
//! Provides the toolpath point model, the machine-function (M code)
//! vocabulary used by playback, shared constants and the error taxonomy.

pub mod constants;
pub mod data;
pub mod error;

pub use data::{AuxCode, Bounds, Segment, SegmentKind, StopCode, ToolpathTrace, TraceSummary};

pub use error::{Error, GcodeError, PlaybackError, Result, TemplateError};
