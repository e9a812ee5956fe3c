//! # TurnKit Simulation
//!
//! Deterministic playback of a [`turnkit_core::ToolpathTrace`].
//!
//! The scheduler advances a cursor by distance on every tick and stops on
//! program stops, optional stops, program end and block boundaries in
//! single-block mode. It never sleeps: the host waits for each
//! [`TickHandle`]'s deadline and hands it back.

pub mod engine;
pub mod scheduler;
pub mod status;
pub mod timer;

pub use engine::TurningEngine;
pub use scheduler::{
    HaltReason, ModeLabel, PlaybackPhase, PlaybackScheduler, PlaybackState, TickReport,
};
pub use status::StatusRecord;
pub use timer::{TickHandle, TickTimer};
