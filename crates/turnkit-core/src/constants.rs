//! Shared numeric constants.
//!
//! Values that more than one crate needs to agree on live here so the
//! interpreter, the densifier and the scheduler measure distance the same way.

/// Tolerance used when comparing coordinates for equality (mm).
pub const COORD_EPSILON: f64 = 1e-9;

/// Scale applied to the X (diameter) axis when measuring distance, so both
/// axes are expressed as radial millimetres.
pub const DIAMETER_TO_RADIUS: f64 = 0.5;

/// Default upper bound for a single densified step (mm).
pub const DEFAULT_MAX_SEGMENT_LENGTH: f64 = 0.4;

/// Default distance covered per playback tick at speed 1.0 (mm).
pub const DEFAULT_BASE_STEP_DISTANCE: f64 = 0.4;

/// Smallest distance a single playback sub-step is credited with, so runs of
/// zero-length markers still consume budget.
pub const MIN_STEP_DISTANCE: f64 = 0.001;

/// Default cadence of the playback tick (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
