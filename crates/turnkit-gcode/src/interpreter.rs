//! Top-level interpreter: program text in, densified trace out.

use crate::block_index::{ParsedProgram, Program};
use crate::config::InterpreterConfig;
use crate::densify::Densifier;
use crate::emitter::MotionEmitter;
use tracing::debug;
use turnkit_core::{GcodeError, ToolpathTrace};

/// Lathe program interpreter
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Interpret program text
    pub fn parse(&self, text: &str) -> Result<ToolpathTrace, GcodeError> {
        self.parse_program(&Program::from_text(text))
    }

    /// Interpret an already split program.
    ///
    /// Fails only on malformed literals; everything else degrades to fewer
    /// points.
    pub fn parse_program(&self, program: &Program) -> Result<ToolpathTrace, GcodeError> {
        let parsed = ParsedProgram::parse(program)?;
        let points = MotionEmitter::new(&parsed, &self.config).run();
        let trace = Densifier::new(self.config.max_segment_length).densify_trace(&points);
        debug!(
            lines = program.len(),
            emitted = points.len(),
            densified = trace.len(),
            "Program interpreted"
        );
        Ok(trace)
    }
}
