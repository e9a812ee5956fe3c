//! Turning engine
//!
//! Ties a program buffer, the interpreter and the playback scheduler
//! together. Loading a program always pauses playback first; a program that
//! fails to interpret leaves the current trace in place.

use crate::scheduler::{ModeLabel, PlaybackPhase, PlaybackScheduler, PlaybackState, TickReport};
use crate::status::StatusRecord;
use crate::timer::TickHandle;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use turnkit_core::{GcodeError, PlaybackError, ToolpathTrace};
use turnkit_gcode::{Interpreter, Program};
use turnkit_settings::{Config, SpeedCurve, TemplateLibrary};

/// Interpreter plus playback for one program at a time
#[derive(Debug, Clone)]
pub struct TurningEngine {
    interpreter: Interpreter,
    templates: TemplateLibrary,
    speed_curve: SpeedCurve,
    program: Program,
    scheduler: PlaybackScheduler,
}

impl TurningEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            interpreter: Interpreter::new(config.interpreter.clone()),
            templates: config.templates.clone(),
            speed_curve: config.playback.speed_curve.clone(),
            program: Program::default(),
            scheduler: PlaybackScheduler::new(&config.playback),
        }
    }

    /// Interpret `text` and make it the playing program.
    ///
    /// On error the previous program and trace stay loaded (paused).
    pub fn load_program(&mut self, text: &str) -> Result<&ToolpathTrace, GcodeError> {
        self.scheduler.pause();
        let program = Program::from_text(text);
        match self.interpreter.parse_program(&program) {
            Ok(trace) => {
                let summary = trace.summary();
                debug!(
                    points = summary.points,
                    blocks = summary.blocks,
                    per_kind = ?summary.per_kind,
                    "Trace loaded"
                );
                self.program = program;
                self.scheduler.load(trace);
                Ok(self.scheduler.trace())
            }
            Err(e) => {
                warn!("Program rejected, keeping previous trace: {}", e);
                Err(e)
            }
        }
    }

    /// Read and load a program file
    pub fn load_file(&mut self, path: &Path) -> turnkit_core::Result<&ToolpathTrace> {
        let text = std::fs::read_to_string(path)?;
        info!(path = %path.display(), "Loading program file");
        Ok(self.load_program(&text)?)
    }

    /// Load a program from the template library
    pub fn load_template(&mut self, id: &str) -> turnkit_core::Result<&ToolpathTrace> {
        let text = self.templates.get(id)?.to_string();
        info!(template = id, "Loading template");
        Ok(self.load_program(&text)?)
    }

    pub fn play(&mut self, now: Instant) -> Option<TickHandle> {
        self.scheduler.play(now)
    }

    pub fn fire(&mut self, handle: TickHandle, now: Instant) -> Option<TickHandle> {
        self.scheduler.fire(handle, now)
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    /// Set the speed from a slider position; returns the new multiplier
    pub fn set_speed_from_slider(&mut self, raw: u32) -> Result<f64, PlaybackError> {
        let speed = self.speed_curve.multiplier(raw);
        self.scheduler.set_speed_multiplier(speed)?;
        Ok(speed)
    }

    pub fn set_speed_multiplier(&mut self, speed: f64) -> Result<(), PlaybackError> {
        self.scheduler.set_speed_multiplier(speed)
    }

    pub fn set_single_block(&mut self, enabled: bool) {
        self.scheduler.set_single_block(enabled);
    }

    pub fn set_optional_stop(&mut self, enabled: bool) {
        self.scheduler.set_optional_stop(enabled);
    }

    /// Status for the point under the cursor; `None` without a trace
    pub fn status(&self) -> Option<StatusRecord> {
        self.scheduler
            .current()
            .map(|segment| StatusRecord::project(segment, &self.program, self.mode_label()))
    }

    /// Why the last tick stopped
    pub fn last_tick(&self) -> Option<&TickReport> {
        self.scheduler.last_tick()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.scheduler.phase()
    }

    pub fn mode_label(&self) -> ModeLabel {
        self.scheduler.mode_label()
    }

    pub fn state(&self) -> &PlaybackState {
        self.scheduler.state()
    }

    pub fn trace(&self) -> &ToolpathTrace {
        self.scheduler.trace()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }
}

impl Default for TurningEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_cursor() {
        let mut engine = TurningEngine::default();
        assert!(engine.status().is_none());

        engine.load_program("G0 X20 Z5\nG1 Z4.8 F0.2").unwrap();
        let status = engine.status().unwrap();
        assert_eq!(status.mode_label, ModeLabel::Loaded);
        assert_eq!(status.current_source_text.as_deref(), Some("G0 X20 Z5"));
        assert_eq!(status.next_source_text.as_deref(), Some("G1 Z4.8 F0.2"));
    }

    #[test]
    fn test_slider_sets_speed() {
        let mut engine = TurningEngine::default();
        let speed = engine.set_speed_from_slider(100).unwrap();
        assert!((speed - 50.0).abs() < 1e-9);
        assert_eq!(engine.state().speed_multiplier, speed);
    }

    #[test]
    fn test_load_file() {
        let mut engine = TurningEngine::default();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("part.nc");
        std::fs::write(&path, "G0 X20 Z5\nG1 Z0 F0.2\n").unwrap();

        assert!(engine.load_file(&path).unwrap().len() > 2);
        assert_eq!(engine.program().source_text(1), Some("G1 Z0 F0.2"));

        std::fs::write(&path, "G0 X20 Z5\nG1 X1.2.3\n").unwrap();
        assert!(engine.load_file(&path).unwrap_err().is_gcode_error());

        let missing = engine.load_file(&dir.path().join("missing.nc")).unwrap_err();
        assert!(matches!(missing, turnkit_core::Error::Io(_)));
    }

    #[test]
    fn test_unknown_template() {
        let mut engine = TurningEngine::default();
        let err = engine.load_template("missing").unwrap_err();
        assert!(err.is_template_error());
    }
}
