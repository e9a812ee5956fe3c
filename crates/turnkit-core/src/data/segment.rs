//! Toolpath point records.

use crate::constants::DIAMETER_TO_RADIUS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the tool reached a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Initial tool position, no motion
    Start,
    /// Positioning move (G0), also used for zero-length M-code markers
    Rapid,
    /// Linear cutting move (G1)
    Feed,
    /// Clockwise arc point (G2)
    ArcCw,
    /// Counter-clockwise arc point (G3)
    ArcCcw,
    /// Roughing pass synthesized by G71
    RoughCut,
    /// Straight finishing move synthesized by G70
    FinishFeed,
    /// Outline of the material G71 leaves for finishing
    StockAllowance,
}

impl SegmentKind {
    /// Returns the name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            SegmentKind::Start => "start",
            SegmentKind::Rapid => "rapid",
            SegmentKind::Feed => "feed",
            SegmentKind::ArcCw => "arc_cw",
            SegmentKind::ArcCcw => "arc_ccw",
            SegmentKind::RoughCut => "rough_cut",
            SegmentKind::FinishFeed => "finish_feed",
            SegmentKind::StockAllowance => "stock_allowance",
        }
    }

    /// True for both arc directions.
    pub fn is_arc(&self) -> bool {
        matches!(self, SegmentKind::ArcCw | SegmentKind::ArcCcw)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Program-flow meaning of an M code, as far as playback is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopCode {
    /// M0: unconditional stop
    ProgramStop,
    /// M1: stop only when optional stop is enabled
    OptionalStop,
    /// M2 / M30: end of program
    ProgramEnd,
}

/// A machine-function (M) code carried by a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuxCode(pub u16);

impl AuxCode {
    pub const PROGRAM_STOP: AuxCode = AuxCode(0);
    pub const OPTIONAL_STOP: AuxCode = AuxCode(1);
    pub const PROGRAM_END: AuxCode = AuxCode(30);

    /// Classify the code for the playback scheduler.
    pub fn stop_code(&self) -> Option<StopCode> {
        match self.0 {
            0 => Some(StopCode::ProgramStop),
            1 => Some(StopCode::OptionalStop),
            2 | 30 => Some(StopCode::ProgramEnd),
            _ => None,
        }
    }
}

impl fmt::Display for AuxCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

/// One point of a toolpath trace.
///
/// `x` is a diameter, `z` is the axial coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x: f64,
    pub z: f64,
    pub kind: SegmentKind,
    /// Program line that produced the point
    pub source_line: Option<usize>,
    /// Execution-block counter
    pub block: u32,
    pub feed_rate: f64,
    pub aux_code: Option<AuxCode>,
}

impl Segment {
    /// Creates a new segment without source line or aux code.
    pub fn new(x: f64, z: f64, kind: SegmentKind, block: u32, feed_rate: f64) -> Self {
        Self {
            x,
            z,
            kind,
            source_line: None,
            block,
            feed_rate: feed_rate.max(0.0),
            aux_code: None,
        }
    }

    /// Set the program line that produced this point
    pub fn with_source_line(mut self, line: usize) -> Self {
        self.source_line = Some(line);
        self
    }

    /// Attach an M code
    pub fn with_aux_code(mut self, code: Option<AuxCode>) -> Self {
        self.aux_code = code;
        self
    }

    /// Distance to another point, with X halved so both axes are radial.
    pub fn distance_to(&self, other: &Segment) -> f64 {
        let dx = (other.x - self.x) * DIAMETER_TO_RADIUS;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Stop meaning of the attached M code, if any.
    pub fn stop_code(&self) -> Option<StopCode> {
        self.aux_code.and_then(|code| code.stop_code())
    }
}
