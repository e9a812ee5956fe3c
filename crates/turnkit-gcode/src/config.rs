//! Interpreter configuration

use crate::arc::ArcSolverConfig;
use serde::{Deserialize, Serialize};
use turnkit_core::constants::DEFAULT_MAX_SEGMENT_LENGTH;

/// Defaults and tolerances for the G71/G70 cycle expander
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Radial depth of cut when no parameter G71 line preceded the body
    pub default_depth_of_cut: f64,
    /// Retract used when the parameter line omits R
    pub default_retract: f64,
    /// Roughing feed when neither F nor a modal feed is available
    pub default_rough_feed: f64,
    /// Passes whose stop Z is within this distance of the face are skipped
    pub face_tolerance: f64,
    /// Profile segments flatter than this in X are not used for interpolation
    pub interpolation_tolerance: f64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            default_depth_of_cut: 2.0,
            default_retract: 0.5,
            default_rough_feed: 0.3,
            face_tolerance: 0.001,
            interpolation_tolerance: 0.001,
        }
    }
}

/// Everything the interpreter can be tuned with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Upper bound on the distance between consecutive trace points (mm)
    pub max_segment_length: f64,
    pub arc: ArcSolverConfig,
    pub cycle: CycleConfig,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
            arc: ArcSolverConfig::default(),
            cycle: CycleConfig::default(),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl InterpreterConfig {
    /// Check that every tolerance and default is usable
    pub fn validate(&self) -> Result<(), String> {
        if !is_positive(self.max_segment_length) {
            return Err(format!(
                "max_segment_length must be positive, got {}",
                self.max_segment_length
            ));
        }
        if self.arc.min_points == 0 {
            return Err("arc.min_points must be at least 1".to_string());
        }
        if !is_positive(self.arc.max_angle_step) {
            return Err("arc.max_angle_step must be positive".to_string());
        }
        if !is_positive(self.cycle.default_depth_of_cut) {
            return Err("cycle.default_depth_of_cut must be positive".to_string());
        }
        if self.cycle.default_retract < 0.0 || self.cycle.default_rough_feed < 0.0 {
            return Err("cycle defaults must not be negative".to_string());
        }
        Ok(())
    }
}
