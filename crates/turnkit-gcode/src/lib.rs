//! # TurnKit G-Code
//!
//! Lathe G-code interpretation for TurnKit.
//!
//! Supports a restricted turning dialect (G0-G3, G70, G71, radius-notation
//! arcs, M codes carried opaquely) and produces a densified
//! [`turnkit_core::ToolpathTrace`].
//!
//! Pipeline: tokenizer and block index, modal motion emitter, profile
//! extraction and canned-cycle expansion, then densification.

pub mod arc;
pub mod block_index;
pub mod config;
pub mod cycles;
pub mod densify;
pub mod emitter;
pub mod interpreter;
pub mod profile;
pub mod tokenizer;

pub use arc::{ArcDirection, ArcGeometry, ArcSolver, ArcSolverConfig};
pub use block_index::{BlockIndex, ParsedProgram, Program};
pub use config::{CycleConfig, InterpreterConfig};
pub use cycles::{rough_pass_count, FinishingCycle, RoughingCycle, RoughingParameters};
pub use densify::Densifier;
pub use emitter::{ModalState, MotionEmitter, MotionMode};
pub use interpreter::Interpreter;
pub use profile::{ProfileExtractor, ProfilePoint, ReferenceError};
pub use tokenizer::{tokenize_line, Address, TokenizedLine, Word};
