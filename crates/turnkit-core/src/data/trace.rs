//! Ordered toolpath traces.

use super::segment::{Segment, SegmentKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Axis-aligned extent of a trace (X as diameter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    /// Grow the bounds to include a point
    pub fn include(&mut self, x: f64, z: f64) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_z = self.min_z.min(z);
        self.max_z = self.max_z.max(z);
    }
}

/// Counts of points per kind plus the block span of a trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub points: usize,
    pub blocks: u32,
    pub per_kind: BTreeMap<String, usize>,
}

/// The fully expanded, densified list of points derived from one program.
///
/// A trace is built once and never edited; re-interpreting a program
/// produces a new trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolpathTrace {
    segments: Vec<Segment>,
}

impl ToolpathTrace {
    /// Creates an empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already ordered point list
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Bounding box over all points, `None` for an empty trace.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.segments.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_z: first.z,
            max_z: first.z,
        };
        for seg in &self.segments[1..] {
            bounds.include(seg.x, seg.z);
        }
        Some(bounds)
    }

    /// True when block numbers never decrease along the trace.
    pub fn is_block_monotonic(&self) -> bool {
        self.segments.windows(2).all(|w| w[0].block <= w[1].block)
    }

    /// Number of points of the given kind.
    pub fn count_kind(&self, kind: SegmentKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }

    /// Total travelled length (X measured as radius).
    pub fn total_length(&self) -> f64 {
        self.segments
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }

    pub fn summary(&self) -> TraceSummary {
        let mut per_kind = BTreeMap::new();
        for seg in &self.segments {
            *per_kind.entry(seg.kind.name().to_string()).or_insert(0) += 1;
        }
        let blocks = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => last.block - first.block + 1,
            _ => 0,
        };
        TraceSummary {
            points: self.segments.len(),
            blocks,
            per_kind,
        }
    }
}

impl<'a> IntoIterator for &'a ToolpathTrace {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
