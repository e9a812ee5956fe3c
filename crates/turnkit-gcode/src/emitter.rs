//! Motion Emitter
//!
//! Walks the tokenized program line by line, tracks the modal state and
//! turns every block into trace points. G71/G70 lines are handed to the
//! cycle expander.

use crate::arc::{ArcDirection, ArcSolver};
use crate::block_index::ParsedProgram;
use crate::config::InterpreterConfig;
use crate::cycles::{FinishingCycle, RoughingCycle, RoughingParameters};
use crate::profile::{label_from_value, ProfileExtractor, ProfilePoint, ReferenceError};
use crate::tokenizer::{Address, TokenizedLine};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use turnkit_core::constants::COORD_EPSILON;
use turnkit_core::{AuxCode, Segment, SegmentKind};

/// Modal motion group (G0, G1, G2, G3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    #[default]
    Rapid,
    Linear,
    ArcCw,
    ArcCcw,
}

impl MotionMode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(MotionMode::Rapid),
            1 => Some(MotionMode::Linear),
            2 => Some(MotionMode::ArcCw),
            3 => Some(MotionMode::ArcCcw),
            _ => None,
        }
    }

    pub fn segment_kind(&self) -> SegmentKind {
        match self {
            MotionMode::Rapid => SegmentKind::Rapid,
            MotionMode::Linear => SegmentKind::Feed,
            MotionMode::ArcCw => SegmentKind::ArcCw,
            MotionMode::ArcCcw => SegmentKind::ArcCcw,
        }
    }

    pub fn arc_direction(&self) -> Option<ArcDirection> {
        match self {
            MotionMode::ArcCw => Some(ArcDirection::Clockwise),
            MotionMode::ArcCcw => Some(ArcDirection::CounterClockwise),
            MotionMode::Rapid | MotionMode::Linear => None,
        }
    }
}

/// Interpreter modal state
///
/// Owned by the emitter for the duration of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModalState {
    /// Current X (diameter)
    pub x: f64,
    pub z: f64,
    pub motion_mode: MotionMode,
    /// Current feed rate (F value)
    pub feed_rate: f64,
    /// Set by a parameter-only G71 line, consumed by the next G71 body
    pub pending_roughing: Option<RoughingParameters>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set feed rate value
    pub fn set_feed_rate(&mut self, rate: f64) -> Result<(), String> {
        if rate < 0.0 {
            return Err("Feed rate cannot be negative".to_string());
        }
        self.feed_rate = rate;
        Ok(())
    }

    pub fn set_position(&mut self, x: f64, z: f64) {
        self.x = x;
        self.z = z;
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.z)
    }
}

/// Walks a program and produces the undensified point list
pub struct MotionEmitter<'a> {
    program: &'a ParsedProgram,
    config: &'a InterpreterConfig,
    arc_solver: ArcSolver,
    state: ModalState,
    block: u32,
    started: bool,
    points: Vec<Segment>,
}

impl<'a> MotionEmitter<'a> {
    pub fn new(program: &'a ParsedProgram, config: &'a InterpreterConfig) -> Self {
        Self {
            program,
            config,
            arc_solver: ArcSolver::new(config.arc.clone()),
            state: ModalState::new(),
            block: 0,
            started: false,
            points: Vec::new(),
        }
    }

    /// Walk the whole program and return the emitted points
    pub fn run(mut self) -> Vec<Segment> {
        let program = self.program;
        let mut index = 0;
        while index < program.lines.len() {
            let line = &program.lines[index];
            index = match self.emit_line(line) {
                Some(resume_after) => resume_after.max(index) + 1,
                None => index + 1,
            };
        }
        self.points
    }

    /// Process one line. Returns the line to resume after when a cycle
    /// asks to skip its body.
    fn emit_line(&mut self, line: &TokenizedLine) -> Option<usize> {
        if line.is_empty() {
            return None;
        }
        self.block += 1;

        let aux = line.aux_code();
        if let Some(feed) = line.value(Address::F) {
            if let Err(e) = self.state.set_feed_rate(feed) {
                trace!(line = line.line_index + 1, "Ignoring feed: {}", e);
            }
        }
        let motion = line.motion_code().and_then(MotionMode::from_code);
        if let Some(mode) = motion {
            self.state.motion_mode = mode;
        }
        let is_cycle = line.has_g(70) || line.has_g(71);

        let nx = line.value(Address::X).unwrap_or(self.state.x);
        let nz = line.value(Address::Z).unwrap_or(self.state.z);

        if !self.started {
            if line.has_axis() {
                self.state.set_position(nx, nz);
                let start = Segment::new(nx, nz, SegmentKind::Start, self.block, self.state.feed_rate);
                self.push(start, line, aux);
                self.started = true;
            }
            return None;
        }

        if let Some(code) = aux {
            if !line.has_axis() && motion.is_none() && !is_cycle {
                let (x, z) = self.state.position();
                let marker = Segment::new(x, z, SegmentKind::Rapid, self.block, self.state.feed_rate);
                self.push(marker, line, Some(code));
                return None;
            }
        }

        if line.has_g(71) {
            if !line.has(Address::P) {
                if let Some(depth) = line.value(Address::U) {
                    let retract = line
                        .value(Address::R)
                        .map(f64::abs)
                        .unwrap_or(self.config.cycle.default_retract);
                    self.state.pending_roughing = Some(RoughingParameters {
                        depth_of_cut: depth.abs(),
                        retract,
                    });
                    trace!(line = line.line_index + 1, depth, retract, "G71 parameters");
                    return None;
                }
            } else if line.has(Address::Q) {
                return self.emit_roughing(line, aux);
            }
        }

        if line.has_g(70) && line.has(Address::P) && line.has(Address::Q) {
            self.emit_finishing(line, aux);
            return None;
        }

        if motion.is_none() && !line.has_axis() {
            return None;
        }
        self.emit_move(line, nx, nz, aux);
        None
    }

    fn emit_move(&mut self, line: &TokenizedLine, nx: f64, nz: f64, aux: Option<AuxCode>) {
        let (x, z) = self.state.position();
        if (nx - x).abs() <= COORD_EPSILON && (nz - z).abs() <= COORD_EPSILON {
            return;
        }

        let mode = self.state.motion_mode;
        let feed = self.state.feed_rate;
        match mode.arc_direction() {
            Some(direction) => {
                let radius = line.value(Address::R).unwrap_or(0.0);
                let arc = self.arc_solver.solve((x, z), (nx, nz), radius, direction);
                for (px, pz) in arc.into_iter().skip(1) {
                    let point = Segment::new(px, pz, mode.segment_kind(), self.block, feed);
                    self.push(point, line, aux);
                }
            }
            None => {
                let point = Segment::new(nx, nz, mode.segment_kind(), self.block, feed);
                self.push(point, line, aux);
            }
        }
        self.state.set_position(nx, nz);
    }

    fn emit_roughing(&mut self, line: &TokenizedLine, aux: Option<AuxCode>) -> Option<usize> {
        let config = self.config;
        let cycle_config = &config.cycle;
        let parameters = self.state.pending_roughing.take().unwrap_or(RoughingParameters {
            depth_of_cut: cycle_config.default_depth_of_cut,
            retract: cycle_config.default_retract,
        });
        let feed = if self.state.feed_rate > 0.0 {
            self.state.feed_rate
        } else {
            cycle_config.default_rough_feed
        };

        let labels = self.cycle_labels(line);
        // execution resumes after the Q block
        let resume = labels
            .as_ref()
            .ok()
            .and_then(|&(_, q)| self.program.index.resolve(q));
        if let Some(profile) = self.resolve_profile(line, labels) {
            if profile.len() >= 2 {
                let cycle = RoughingCycle {
                    start_x: self.state.x,
                    start_z: self.state.z,
                    parameters,
                    allowance_x: line.value(Address::U).unwrap_or(0.0),
                    allowance_z: line.value(Address::W).unwrap_or(0.0),
                    feed,
                };
                let output =
                    cycle.expand(&profile, self.block, line.line_index, aux, cycle_config);
                trace!(
                    line = line.line_index + 1,
                    passes = cycle.pass_count(&profile),
                    points = output.segments.len(),
                    "G71 expanded"
                );
                if let Some(last) = output.segments.last() {
                    self.state.set_position(last.x, last.z);
                    self.block = output.last_block;
                }
                self.points.extend(output.segments);
            }
        }

        resume
    }

    fn emit_finishing(&mut self, line: &TokenizedLine, aux: Option<AuxCode>) {
        let labels = self.cycle_labels(line);
        let Some(profile) = self.resolve_profile(line, labels) else {
            return;
        };
        let cycle = FinishingCycle {
            start_x: self.state.x,
            start_z: self.state.z,
            feed: self.state.feed_rate,
        };
        let output = cycle.expand(&profile, self.block, line.line_index, aux);
        if output.segments.is_empty() {
            return;
        }
        trace!(line = line.line_index + 1, points = output.segments.len(), "G70 expanded");
        self.block = output.last_block;
        self.points.extend(output.segments);
    }

    fn cycle_labels(&self, line: &TokenizedLine) -> Result<(u32, u32), ReferenceError> {
        let p = label_from_value(line.value(Address::P).unwrap_or(-1.0))?;
        let q = label_from_value(line.value(Address::Q).unwrap_or(-1.0))?;
        Ok((p, q))
    }

    fn resolve_profile(
        &self,
        line: &TokenizedLine,
        labels: Result<(u32, u32), ReferenceError>,
    ) -> Option<Vec<ProfilePoint>> {
        let result = labels.and_then(|(p, q)| {
            ProfileExtractor::new(self.program, &self.arc_solver).extract(p, q)
        });
        match result {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(line = line.line_index + 1, "Cycle skipped: {}", e);
                None
            }
        }
    }

    fn push(&mut self, segment: Segment, line: &TokenizedLine, aux: Option<AuxCode>) {
        self.points
            .push(segment.with_source_line(line.line_index).with_aux_code(aux));
    }
}
