//! Path Densifier
//!
//! Splits long moves so that playback can advance by distance with a fine
//! enough granularity. Inserted points copy the destination's metadata.

use turnkit_core::{Segment, ToolpathTrace};

/// Bounds the distance between consecutive trace points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Densifier {
    max_segment_length: f64,
}

impl Densifier {
    pub fn new(max_segment_length: f64) -> Self {
        Self { max_segment_length }
    }

    pub fn max_segment_length(&self) -> f64 {
        self.max_segment_length
    }

    /// Densify a point list. The last inserted point of every split move is
    /// exactly the original destination.
    pub fn densify(&self, points: &[Segment]) -> Vec<Segment> {
        let Some(first) = points.first() else {
            return Vec::new();
        };
        if !(self.max_segment_length.is_finite() && self.max_segment_length > 0.0) {
            return points.to_vec();
        }

        let mut out = Vec::with_capacity(points.len());
        out.push(*first);
        for pair in points.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let dist = a.distance_to(b);
            if dist > self.max_segment_length {
                let n = (dist / self.max_segment_length).ceil() as usize;
                for k in 1..n {
                    let t = k as f64 / n as f64;
                    out.push(Segment {
                        x: a.x + (b.x - a.x) * t,
                        z: a.z + (b.z - a.z) * t,
                        ..*b
                    });
                }
            }
            out.push(*b);
        }
        out
    }

    /// Densify straight into a trace
    pub fn densify_trace(&self, points: &[Segment]) -> ToolpathTrace {
        ToolpathTrace::from_segments(self.densify(points))
    }
}
