//! Playback tuning: step distance, tick cadence and the speed slider curve.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use turnkit_core::constants::{DEFAULT_BASE_STEP_DISTANCE, DEFAULT_TICK_INTERVAL_MS};

/// Exponential mapping from a slider position to a speed multiplier.
///
/// `speed = base^((raw - 1) / (raw_max - 1)) / normalization`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedCurve {
    pub base: f64,
    /// Largest slider position; the smallest is 1
    pub raw_max: u32,
    pub normalization: f64,
    /// Slider position used at startup
    pub default_raw: u32,
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            base: 5000.0,
            raw_max: 100,
            normalization: 100.0,
            default_raw: 30,
        }
    }
}

impl SpeedCurve {
    /// Speed multiplier for a slider position, clamped to `1..=raw_max`.
    pub fn multiplier(&self, raw: u32) -> f64 {
        let raw_max = self.raw_max.max(2);
        let raw = raw.clamp(1, raw_max);
        let exponent = f64::from(raw - 1) / f64::from(raw_max - 1);
        self.base.powf(exponent) / self.normalization
    }

    /// Multiplier at the default slider position
    pub fn default_multiplier(&self) -> f64 {
        self.multiplier(self.default_raw)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.base.is_finite() && self.base >= 1.0) {
            return Err(SettingsError::invalid("speed_curve.base", "must be at least 1"));
        }
        if self.raw_max < 2 {
            return Err(SettingsError::invalid("speed_curve.raw_max", "must be at least 2"));
        }
        if !(self.normalization.is_finite() && self.normalization > 0.0) {
            return Err(SettingsError::invalid(
                "speed_curve.normalization",
                "must be positive",
            ));
        }
        if self.default_raw == 0 || self.default_raw > self.raw_max {
            return Err(SettingsError::invalid(
                "speed_curve.default_raw",
                format!("must be within 1..={}", self.raw_max),
            ));
        }
        Ok(())
    }
}

/// Playback scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Distance covered per tick at speed 1.0 (mm)
    pub base_step_distance: f64,
    /// Delay between ticks (ms)
    pub tick_interval_ms: u64,
    /// Stop at every block boundary
    pub single_block: bool,
    /// Honour M1
    pub optional_stop: bool,
    pub speed_curve: SpeedCurve,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_step_distance: DEFAULT_BASE_STEP_DISTANCE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            single_block: false,
            optional_stop: false,
            speed_curve: SpeedCurve::default(),
        }
    }
}

impl PlaybackConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.base_step_distance.is_finite() && self.base_step_distance > 0.0) {
            return Err(SettingsError::invalid(
                "playback.base_step_distance",
                "must be positive",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "playback.tick_interval_ms",
                "must be > 0",
            ));
        }
        self.speed_curve.validate()
    }
}
