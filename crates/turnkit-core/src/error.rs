//! Error handling for TurnKit
//!
//! Provides error types for each layer of the engine:
//! - G-Code errors (program loading)
//! - Playback errors (scheduler misuse)
//! - Template errors (program library lookups)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Raised when a program cannot be turned into a trace at all. Geometric
/// degeneracy and unresolved cycle labels are not errors; they degrade
/// silently inside the interpreter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// Address letter followed by something that is not a number
    #[error("Malformed number for '{letter}' at line {line_number}: '{text}'")]
    InvalidNumber {
        /// 1-based line number.
        line_number: usize,
        /// The address letter.
        letter: char,
        /// The offending literal.
        text: String,
    },

    /// `N` label that is not a non-negative integer
    #[error("Invalid block label at line {line_number}: '{text}'")]
    InvalidLabel {
        /// 1-based line number.
        line_number: usize,
        /// The offending literal.
        text: String,
    },

    /// G or M code outside the representable range
    #[error("Invalid {letter} code at line {line_number}: {value}")]
    InvalidCode {
        /// 1-based line number.
        line_number: usize,
        /// `G` or `M`.
        letter: char,
        /// The parsed value.
        value: f64,
    },
}

impl GcodeError {
    /// Line the error was raised on (1-based).
    pub fn line_number(&self) -> usize {
        match self {
            GcodeError::InvalidNumber { line_number, .. }
            | GcodeError::InvalidLabel { line_number, .. }
            | GcodeError::InvalidCode { line_number, .. } => *line_number,
        }
    }
}

/// Playback error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Speed multiplier must be strictly positive
    #[error("Invalid speed multiplier: {value}")]
    InvalidSpeed {
        /// The rejected value.
        value: f64,
    },
}

/// Template error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// No template with the given id
    #[error("Template not found: {id}")]
    NotFound {
        /// The requested id.
        id: String,
    },

    /// Template ids must be non-empty
    #[error("Template id must not be empty")]
    EmptyId,
}

/// Main error type for TurnKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Playback error
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Template error
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a template error
    pub fn is_template_error(&self) -> bool {
        matches!(self, Error::Template(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcode_error_display() {
        let err = GcodeError::InvalidNumber {
            line_number: 3,
            letter: 'X',
            text: "1.2.3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed number for 'X' at line 3: '1.2.3'"
        );
        assert_eq!(err.line_number(), 3);
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = TemplateError::NotFound {
            id: "missing".to_string(),
        }
        .into();
        assert!(err.is_template_error());
        assert_eq!(err.to_string(), "Template not found: missing");

        let err: Error = GcodeError::InvalidLabel {
            line_number: 2,
            text: "1.5".to_string(),
        }
        .into();
        assert!(err.is_gcode_error());
        assert!(!err.is_template_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(err.to_string().starts_with("I/O error"));
        assert!(!err.is_gcode_error());
    }
}
