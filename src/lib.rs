//! # TurnKit
//!
//! A lathe G-code interpreter and toolpath playback engine.
//!
//! ## Architecture
//!
//! TurnKit is organized as a workspace with multiple crates:
//!
//! 1. **turnkit-core** - Toolpath point model, stop codes, errors
//! 2. **turnkit-gcode** - Tokenizer, modal interpreter, G71/G70 expansion, densification
//! 3. **turnkit-settings** - Config file, program templates, speed curve
//! 4. **turnkit-simulation** - Playback scheduler, status projection, `TurningEngine`
//! 5. **turnkit** - Headless runner that drives playback from the command line

pub mod cli;

pub use turnkit_core::{
    AuxCode, Bounds, Error, GcodeError, PlaybackError, Result, Segment, SegmentKind, StopCode,
    TemplateError, ToolpathTrace, TraceSummary,
};
pub use turnkit_gcode::{Interpreter, InterpreterConfig, Program};
pub use turnkit_settings::{Config, PlaybackConfig, SettingsError, SpeedCurve, TemplateLibrary};
pub use turnkit_simulation::{
    HaltReason, ModeLabel, PlaybackPhase, PlaybackScheduler, StatusRecord, TickHandle, TickReport,
    TurningEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log lines go to stderr so that status output on stdout stays clean.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
