//! Profile Extractor
//!
//! Re-walks the lines between two block labels to recover the finished
//! contour a G71/G70 cycle refers to. The walk keeps its own modal state,
//! seeded at X0 Z0 in rapid mode, and never touches the main interpreter's.

use crate::arc::{ArcDirection, ArcSolver};
use crate::block_index::ParsedProgram;
use crate::tokenizer::Address;
use thiserror::Error;
use turnkit_core::constants::COORD_EPSILON;
use turnkit_core::SegmentKind;

/// A cycle referred to a label no line declares
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("Unresolved block label N{label}")]
    UnresolvedLabel { label: u32 },

    #[error("Label value {value} is not a block number")]
    InvalidLabel { value: f64 },
}

/// One point of an extracted contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub x: f64,
    pub z: f64,
    /// Feed for the first (reference) point, otherwise the kind of the move
    /// that reaches it
    pub kind: SegmentKind,
    pub source_line: usize,
}

/// Convert a P/Q word value to a label
pub fn label_from_value(value: f64) -> Result<u32, ReferenceError> {
    if value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(ReferenceError::InvalidLabel { value });
    }
    Ok(value as u32)
}

/// Extracts cycle contours from a tokenized program
pub struct ProfileExtractor<'a> {
    program: &'a ParsedProgram,
    arc_solver: &'a ArcSolver,
}

impl<'a> ProfileExtractor<'a> {
    pub fn new(program: &'a ParsedProgram, arc_solver: &'a ArcSolver) -> Self {
        Self {
            program,
            arc_solver,
        }
    }

    /// Extract the contour declared between labels `first` and `last`, inclusive.
    pub fn extract(&self, first: u32, last: u32) -> Result<Vec<ProfilePoint>, ReferenceError> {
        let start_line = self
            .program
            .index
            .resolve(first)
            .ok_or(ReferenceError::UnresolvedLabel { label: first })?;
        let end_line = self
            .program
            .index
            .resolve(last)
            .ok_or(ReferenceError::UnresolvedLabel { label: last })?;

        let mut points: Vec<ProfilePoint> = Vec::new();
        let (mut x, mut z) = (0.0_f64, 0.0_f64);
        let mut motion = 0u32;

        for line in self
            .program
            .lines
            .iter()
            .skip(start_line)
            .take((end_line + 1).saturating_sub(start_line))
        {
            if !line.has_axis() {
                continue;
            }
            if let Some(code) = line.motion_code() {
                motion = code;
            }
            let nx = line.value(Address::X).unwrap_or(x);
            let nz = line.value(Address::Z).unwrap_or(z);

            if points.is_empty() {
                points.push(ProfilePoint {
                    x: nx,
                    z: nz,
                    kind: SegmentKind::Feed,
                    source_line: line.line_index,
                });
                x = nx;
                z = nz;
                continue;
            }

            if (nx - x).abs() <= COORD_EPSILON && (nz - z).abs() <= COORD_EPSILON {
                continue;
            }

            match ArcDirection::from_motion_code(motion) {
                Some(direction) => {
                    let radius = line.value(Address::R).unwrap_or(0.0);
                    let kind = direction.segment_kind();
                    let arc = self.arc_solver.solve((x, z), (nx, nz), radius, direction);
                    points.extend(arc.into_iter().skip(1).map(|(px, pz)| ProfilePoint {
                        x: px,
                        z: pz,
                        kind,
                        source_line: line.line_index,
                    }));
                }
                None => {
                    let kind = if motion == 0 {
                        SegmentKind::Rapid
                    } else {
                        SegmentKind::Feed
                    };
                    points.push(ProfilePoint {
                        x: nx,
                        z: nz,
                        kind,
                        source_line: line.line_index,
                    });
                }
            }
            x = nx;
            z = nz;
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_index::Program;

    fn parsed(text: &str) -> ParsedProgram {
        ParsedProgram::parse(&Program::from_text(text)).unwrap()
    }

    #[test]
    fn test_extract_linear_profile() {
        let program = parsed("G0 X60 Z2\nN1 G0 X20\nG1 Z0\nG1 X24 Z-2\nN2 G1 Z-15\nG0 X60");
        let solver = ArcSolver::default();
        let points = ProfileExtractor::new(&program, &solver).extract(1, 2).unwrap();
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.z)).collect();
        // local state starts at Z0, so the first point is (20, 0)
        assert_eq!(coords, vec![(20.0, 0.0), (24.0, -2.0), (24.0, -15.0)]);
        assert_eq!(points[0].kind, SegmentKind::Feed);
        assert_eq!(points[0].source_line, 1);
        assert_eq!(points[2].source_line, 4);
    }

    #[test]
    fn test_extract_arc_points_carry_direction() {
        let program = parsed("N1 G1 X24 Z-15\nN2 G3 X30 Z-18 R3");
        let solver = ArcSolver::default();
        let points = ProfileExtractor::new(&program, &solver).extract(1, 2).unwrap();
        assert_eq!(points.len(), 1 + 24);
        assert!(points[1..].iter().all(|p| p.kind == SegmentKind::ArcCcw));
        let last = points.last().unwrap();
        assert_eq!((last.x, last.z), (30.0, -18.0));
    }

    #[test]
    fn test_unresolved_label() {
        let program = parsed("N1 G1 X24 Z-15");
        let solver = ArcSolver::default();
        let err = ProfileExtractor::new(&program, &solver)
            .extract(1, 7)
            .unwrap_err();
        assert_eq!(err, ReferenceError::UnresolvedLabel { label: 7 });
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let program = parsed("N1 G1 X24 Z-15\nN2 G1 X30");
        let solver = ArcSolver::default();
        let points = ProfileExtractor::new(&program, &solver).extract(2, 1).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_label_from_value() {
        assert_eq!(label_from_value(12.0), Ok(12));
        assert!(label_from_value(1.5).is_err());
        assert!(label_from_value(-1.0).is_err());
    }
}
