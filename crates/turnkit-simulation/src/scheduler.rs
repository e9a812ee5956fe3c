//! Playback scheduler
//!
//! Advances a playback cursor along a [`ToolpathTrace`] by distance, one
//! tick at a time, honouring program stops, optional stops, program end and
//! single-block execution.

use crate::timer::{TickHandle, TickTimer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace};
use turnkit_core::constants::MIN_STEP_DISTANCE;
use turnkit_core::{PlaybackError, Segment, StopCode, ToolpathTrace};
use turnkit_settings::PlaybackConfig;

/// Playback phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Paused,
    Finished,
}

impl PlaybackPhase {
    /// Returns the name of the phase.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackPhase::Idle => "Idle",
            PlaybackPhase::Playing => "Playing",
            PlaybackPhase::Paused => "Paused",
            PlaybackPhase::Finished => "Finished",
        }
    }
}

/// Mode shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeLabel {
    Loaded,
    Running,
    Paused,
    SingleBlockPaused,
    Finished,
}

impl ModeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeLabel::Loaded => "loaded",
            ModeLabel::Running => "running",
            ModeLabel::Paused => "paused",
            ModeLabel::SingleBlockPaused => "single-block-paused",
            ModeLabel::Finished => "finished",
        }
    }
}

impl fmt::Display for ModeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a tick stopped advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// Distance budget used up; playback continues next tick
    Budget,
    /// M0 reached
    ProgramStop,
    /// M1 reached with optional stop enabled
    OptionalStop,
    /// M2/M30 reached
    ProgramEnd,
    /// Last point of a block reached in single-block mode
    SingleBlock,
    /// Last point of the trace reached
    EndOfTrace,
}

impl HaltReason {
    pub fn name(&self) -> &'static str {
        match self {
            HaltReason::Budget => "budget",
            HaltReason::ProgramStop => "program-stop",
            HaltReason::OptionalStop => "optional-stop",
            HaltReason::ProgramEnd => "program-end",
            HaltReason::SingleBlock => "single-block",
            HaltReason::EndOfTrace => "end-of-trace",
        }
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub steps: usize,
    pub distance: f64,
    pub halt: HaltReason,
}

/// Scheduler state snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub trace_index: usize,
    pub phase: PlaybackPhase,
    pub speed_multiplier: f64,
    pub single_block: bool,
    pub optional_stop: bool,
    /// Block of the last point reached
    pub last_block: u32,
    pub mode_label: ModeLabel,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }
}

/// Owns the trace being played and the cursor into it
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    trace: ToolpathTrace,
    state: PlaybackState,
    base_step_distance: f64,
    timer: TickTimer,
    last_tick: Option<TickReport>,
}

impl PlaybackScheduler {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            trace: ToolpathTrace::new(),
            state: PlaybackState {
                trace_index: 0,
                phase: PlaybackPhase::Idle,
                speed_multiplier: config.speed_curve.default_multiplier(),
                single_block: config.single_block,
                optional_stop: config.optional_stop,
                last_block: 0,
                mode_label: ModeLabel::Loaded,
            },
            base_step_distance: config.base_step_distance,
            timer: TickTimer::new(config.tick_interval()),
            last_tick: None,
        }
    }

    /// Replace the trace wholesale and rewind.
    pub fn load(&mut self, trace: ToolpathTrace) {
        self.trace = trace;
        self.reset();
    }

    pub fn trace(&self) -> &ToolpathTrace {
        &self.trace
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    pub fn mode_label(&self) -> ModeLabel {
        self.state.mode_label
    }

    pub fn trace_index(&self) -> usize {
        self.state.trace_index
    }

    /// Point under the cursor
    pub fn current(&self) -> Option<&Segment> {
        self.trace.get(self.state.trace_index)
    }

    /// Report of the most recent tick; cleared on load and reset
    pub fn last_tick(&self) -> Option<&TickReport> {
        self.last_tick.as_ref()
    }

    /// The tick the host should fire next, if any
    pub fn armed_tick(&self) -> Option<TickHandle> {
        self.timer.armed()
    }

    pub fn set_speed_multiplier(&mut self, speed: f64) -> Result<(), PlaybackError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(PlaybackError::InvalidSpeed { value: speed });
        }
        self.state.speed_multiplier = speed;
        Ok(())
    }

    pub fn set_single_block(&mut self, enabled: bool) {
        self.state.single_block = enabled;
    }

    pub fn set_optional_stop(&mut self, enabled: bool) {
        self.state.optional_stop = enabled;
    }

    /// Start or resume playback.
    ///
    /// Runs one tick straight away and returns the handle of the next one
    /// when playback is still running afterwards.
    pub fn play(&mut self, now: Instant) -> Option<TickHandle> {
        if self.state.phase == PlaybackPhase::Playing {
            return self.timer.armed();
        }
        let len = self.trace.len();
        if len < 2 {
            debug!(len, "Play ignored, trace too short");
            return None;
        }

        if self.state.phase == PlaybackPhase::Finished || self.state.trace_index >= len - 1 {
            self.state.trace_index = 0;
        }
        // step off the stop we are parked on
        let index = self.state.trace_index;
        let parked = self
            .current()
            .filter(|_| self.ends_block(index))
            .and_then(Segment::stop_code);
        let skip = match parked {
            Some(StopCode::ProgramStop) => true,
            Some(StopCode::OptionalStop) => self.state.optional_stop,
            Some(StopCode::ProgramEnd) | None => false,
        };
        if skip {
            self.state.trace_index += 1;
        }

        self.state.phase = PlaybackPhase::Playing;
        self.state.mode_label = ModeLabel::Running;
        debug!(index = self.state.trace_index, "Playback started");

        self.tick();
        self.arm_if_playing(now)
    }

    /// Run the tick named by `handle`. Stale handles are ignored.
    pub fn fire(&mut self, handle: TickHandle, now: Instant) -> Option<TickHandle> {
        if !self.timer.accept(handle) {
            trace!(id = handle.id(), "Ignoring stale tick");
            return None;
        }
        if self.state.phase != PlaybackPhase::Playing {
            return None;
        }
        self.tick();
        self.arm_if_playing(now)
    }

    /// Pause playback and cancel the pending tick. Idempotent.
    pub fn pause(&mut self) {
        self.timer.cancel();
        if self.state.phase == PlaybackPhase::Playing {
            self.state.phase = PlaybackPhase::Paused;
            self.state.mode_label = ModeLabel::Paused;
            debug!(index = self.state.trace_index, "Playback paused");
        }
    }

    /// Cancel, rewind to the first point and go idle. The trace is kept.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.state.trace_index = 0;
        self.state.phase = PlaybackPhase::Idle;
        self.state.mode_label = ModeLabel::Loaded;
        self.state.last_block = self.trace.get(0).map(|s| s.block).unwrap_or(0);
        self.last_tick = None;
    }

    /// True when the point at `index` is the last one of its block
    fn ends_block(&self, index: usize) -> bool {
        let segments = self.trace.segments();
        match (segments.get(index), segments.get(index + 1)) {
            (Some(point), Some(next)) => point.block != next.block,
            _ => true,
        }
    }

    fn arm_if_playing(&mut self, now: Instant) -> Option<TickHandle> {
        if self.state.phase == PlaybackPhase::Playing {
            Some(self.timer.arm(now))
        } else {
            None
        }
    }

    fn halt_at(&self, index: usize) -> Option<HaltReason> {
        let segments = self.trace.segments();
        let reached = &segments[index];
        if index + 1 >= segments.len() {
            return Some(HaltReason::EndOfTrace);
        }
        // M codes act once the block's motion is complete
        if !self.ends_block(index) {
            return None;
        }
        match reached.stop_code() {
            Some(StopCode::ProgramStop) => return Some(HaltReason::ProgramStop),
            Some(StopCode::OptionalStop) if self.state.optional_stop => {
                return Some(HaltReason::OptionalStop)
            }
            Some(StopCode::ProgramEnd) => return Some(HaltReason::ProgramEnd),
            _ => {}
        }
        if self.state.single_block {
            return Some(HaltReason::SingleBlock);
        }
        None
    }

    /// Advance by one distance budget.
    fn tick(&mut self) {
        let len = self.trace.len();
        let mut report = TickReport {
            steps: 0,
            distance: 0.0,
            halt: HaltReason::Budget,
        };

        if len == 0 || self.state.trace_index >= len - 1 {
            report.halt = HaltReason::EndOfTrace;
        } else {
            let budget = self.base_step_distance * self.state.speed_multiplier;
            while report.distance < budget && self.state.trace_index < len - 1 {
                let idx = self.state.trace_index;
                let segments = self.trace.segments();
                let step = segments[idx].distance_to(&segments[idx + 1]);
                report.distance += step.max(MIN_STEP_DISTANCE);
                report.steps += 1;
                self.state.trace_index = idx + 1;
                self.state.last_block = segments[idx + 1].block;

                if let Some(reason) = self.halt_at(idx + 1) {
                    report.halt = reason;
                    break;
                }
            }
        }

        match report.halt {
            HaltReason::Budget => {}
            HaltReason::ProgramStop | HaltReason::OptionalStop => {
                self.timer.cancel();
                self.state.phase = PlaybackPhase::Paused;
                self.state.mode_label = ModeLabel::Paused;
            }
            HaltReason::SingleBlock => {
                self.timer.cancel();
                self.state.phase = PlaybackPhase::Paused;
                self.state.mode_label = ModeLabel::SingleBlockPaused;
            }
            HaltReason::ProgramEnd | HaltReason::EndOfTrace => {
                self.timer.cancel();
                self.state.phase = PlaybackPhase::Finished;
                self.state.mode_label = ModeLabel::Finished;
            }
        }

        trace!(
            index = self.state.trace_index,
            steps = report.steps,
            distance = report.distance,
            halt = ?report.halt,
            "Tick"
        );
        self.last_tick = Some(report);
        if report.halt != HaltReason::Budget {
            debug!(
                index = self.state.trace_index,
                block = self.state.last_block,
                phase = self.state.phase.name(),
                "Playback halted: {}",
                report.halt
            );
        }
    }
}
