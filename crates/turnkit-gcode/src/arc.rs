//! Arc Solver
//!
//! Converts radius-notation G2/G3 moves into polylines. The solve runs in
//! radial coordinates: X words are diameters, so they are halved on the way
//! in and doubled on the way out.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;
use turnkit_core::SegmentKind;

/// Direction of travel around the arc center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcDirection {
    /// G2
    Clockwise,
    /// G3
    CounterClockwise,
}

impl ArcDirection {
    pub fn from_motion_code(code: u32) -> Option<Self> {
        match code {
            2 => Some(ArcDirection::Clockwise),
            3 => Some(ArcDirection::CounterClockwise),
            _ => None,
        }
    }

    /// Segment kind used for points on this arc
    pub fn segment_kind(&self) -> SegmentKind {
        match self {
            ArcDirection::Clockwise => SegmentKind::ArcCw,
            ArcDirection::CounterClockwise => SegmentKind::ArcCcw,
        }
    }

    fn normalize(&self, mut sweep: f64) -> f64 {
        match self {
            ArcDirection::Clockwise => {
                if sweep > 0.0 {
                    sweep -= 2.0 * PI;
                }
            }
            ArcDirection::CounterClockwise => {
                if sweep < 0.0 {
                    sweep += 2.0 * PI;
                }
            }
        }
        sweep
    }
}

/// Arc discretization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSolverConfig {
    /// Minimum number of steps per arc
    pub min_points: usize,
    /// Largest angular step (radians)
    pub max_angle_step: f64,
    /// Chords shorter than this degrade to a straight move
    pub min_chord: f64,
    /// Radii smaller than this degrade to a straight move
    pub min_radius: f64,
    /// How far below the half chord a radius may be before it is rejected
    pub radius_tolerance: f64,
}

impl Default for ArcSolverConfig {
    fn default() -> Self {
        Self {
            min_points: 24,
            max_angle_step: PI / 32.0,
            min_chord: 1e-4,
            min_radius: 1e-4,
            radius_tolerance: 1e-3,
        }
    }
}

/// Center and angular extent of a solved arc, in radial coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    /// Center on the radial (X/2) axis
    pub center_r: f64,
    pub center_z: f64,
    pub radius: f64,
    /// `atan2(radial, axial)` of the start point
    pub start_angle: f64,
    /// Signed sweep, ≤ 0 for clockwise and ≥ 0 for counter-clockwise
    pub sweep: f64,
}

impl ArcGeometry {
    /// Point at `angle`, with X back on the diameter scale
    pub fn point_at(&self, angle: f64) -> (f64, f64) {
        (
            (self.center_r + self.radius * angle.sin()) * 2.0,
            self.center_z + self.radius * angle.cos(),
        )
    }
}

/// Solves radius-notation arcs
#[derive(Debug, Clone, Default)]
pub struct ArcSolver {
    config: ArcSolverConfig,
}

impl ArcSolver {
    pub fn new(config: ArcSolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArcSolverConfig {
        &self.config
    }

    /// Solve the arc geometry. `None` for degenerate input.
    ///
    /// Of the two centers that fit the endpoints and radius, the one giving
    /// the shorter sweep in the requested direction is used.
    pub fn geometry(
        &self,
        start: (f64, f64),
        end: (f64, f64),
        radius: f64,
        direction: ArcDirection,
    ) -> Option<ArcGeometry> {
        let (r1, z1) = (start.0 / 2.0, start.1);
        let (r2, z2) = (end.0 / 2.0, end.1);
        let dr = r2 - r1;
        let dz = z2 - z1;
        let chord = (dr * dr + dz * dz).sqrt();
        let radius = radius.abs();

        if chord < self.config.min_chord
            || radius < self.config.min_radius
            || radius < chord / 2.0 - self.config.radius_tolerance
        {
            return None;
        }

        let (mid_r, mid_z) = ((r1 + r2) / 2.0, (z1 + z2) / 2.0);
        let (perp_r, perp_z) = (-dz / chord, dr / chord);
        let h = (radius * radius - (chord / 2.0) * (chord / 2.0))
            .max(0.0)
            .sqrt();

        let sweep_about = |cr: f64, cz: f64| {
            let sa = (r1 - cr).atan2(z1 - cz);
            let ea = (r2 - cr).atan2(z2 - cz);
            (sa, direction.normalize(ea - sa))
        };

        let c1 = (mid_r + perp_r * h, mid_z + perp_z * h);
        let c2 = (mid_r - perp_r * h, mid_z - perp_z * h);
        let (sa1, sw1) = sweep_about(c1.0, c1.1);
        let (sa2, sw2) = sweep_about(c2.0, c2.1);

        let (center, start_angle, sweep) = if sw1.abs() <= sw2.abs() {
            (c1, sa1, sw1)
        } else {
            (c2, sa2, sw2)
        };

        Some(ArcGeometry {
            center_r: center.0,
            center_z: center.1,
            radius,
            start_angle,
            sweep,
        })
    }

    /// Number of steps used for a sweep
    pub fn step_count(&self, sweep: f64) -> usize {
        let by_angle = (sweep.abs() / self.config.max_angle_step).ceil() as usize;
        by_angle.max(self.config.min_points).max(1)
    }

    /// Discretize an arc into a polyline that starts exactly at `start` and
    /// ends exactly at `end`.
    ///
    /// Degenerate arcs come back as the two-point straight move.
    pub fn solve(
        &self,
        start: (f64, f64),
        end: (f64, f64),
        radius: f64,
        direction: ArcDirection,
    ) -> Vec<(f64, f64)> {
        let Some(geom) = self.geometry(start, end, radius, direction) else {
            debug!(
                ?start,
                ?end,
                radius,
                "Degenerate arc, falling back to a straight move"
            );
            return vec![start, end];
        };

        let n = self.step_count(geom.sweep);
        let mut points = Vec::with_capacity(n + 1);
        points.push(start);
        for i in 1..n {
            let angle = geom.start_angle + geom.sweep * (i as f64 / n as f64);
            points.push(geom.point_at(angle));
        }
        points.push(end);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_arc_endpoints_exact() {
        let solver = ArcSolver::default();
        let pts = solver.solve((20.0, -10.0), (30.0, -15.0), 5.0, ArcDirection::Clockwise);
        assert_eq!(pts.first(), Some(&(20.0, -10.0)));
        assert_eq!(pts.last(), Some(&(30.0, -15.0)));
        assert_eq!(pts.len(), 25);
    }

    #[test]
    fn test_points_lie_on_circle() {
        let solver = ArcSolver::default();
        let geom = solver
            .geometry((20.0, -10.0), (30.0, -15.0), 5.0, ArcDirection::Clockwise)
            .unwrap();
        assert!((geom.center_r - 15.0).abs() < 1e-9);
        assert!((geom.center_z - -10.0).abs() < 1e-9);
        assert!((geom.sweep + PI / 2.0).abs() < 1e-9);
        for (x, z) in solver.solve((20.0, -10.0), (30.0, -15.0), 5.0, ArcDirection::Clockwise) {
            let dr = x / 2.0 - geom.center_r;
            let dz = z - geom.center_z;
            assert!(((dr * dr + dz * dz).sqrt() - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sweep_sign_follows_direction() {
        let solver = ArcSolver::default();
        let cw = solver
            .geometry((24.0, -15.0), (30.0, -18.0), 3.0, ArcDirection::Clockwise)
            .unwrap();
        let ccw = solver
            .geometry((24.0, -15.0), (30.0, -18.0), 3.0, ArcDirection::CounterClockwise)
            .unwrap();
        assert!(cw.sweep <= 0.0);
        assert!(ccw.sweep >= 0.0);
        assert!(cw.sweep.abs() <= PI + 1e-9);
        assert!(ccw.sweep.abs() <= PI + 1e-9);
    }

    #[test]
    fn test_degenerate_falls_back_to_line() {
        let solver = ArcSolver::default();
        assert_eq!(
            solver.solve((0.0, 0.0), (20.0, 0.0), 1.0, ArcDirection::Clockwise),
            vec![(0.0, 0.0), (20.0, 0.0)]
        );
        assert_eq!(
            solver.solve((0.0, 0.0), (20.0, 0.0), 0.0, ArcDirection::Clockwise),
            vec![(0.0, 0.0), (20.0, 0.0)]
        );
        assert!(solver
            .geometry((10.0, 0.0), (10.0, 0.00001), 5.0, ArcDirection::Clockwise)
            .is_none());
    }

    #[test]
    fn test_half_circle_uses_midpoint() {
        let solver = ArcSolver::default();
        // radius slightly below half chord but within tolerance
        let geom = solver
            .geometry((0.0, 0.0), (0.0, -10.0), 4.9995, ArcDirection::CounterClockwise)
            .unwrap();
        assert!((geom.center_z - -5.0).abs() < 1e-9);
        assert!(geom.center_r.abs() < 1e-9);
        assert!((geom.sweep.abs() - PI).abs() < 1e-9);
        let n = solver.step_count(geom.sweep);
        assert_eq!(n, 32);
    }
}
