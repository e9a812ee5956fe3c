//! Canned cycle expansion (G71 roughing, G70 finishing)
//!
//! Both cycles are expanded into explicit points at interpretation time.
//! Every point carries the cycle line as its source line.

use crate::config::CycleConfig;
use crate::profile::ProfilePoint;
use serde::{Deserialize, Serialize};
use turnkit_core::{AuxCode, Segment, SegmentKind};

/// Depth of cut and retract declared by a parameter-only G71 line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoughingParameters {
    /// Radial depth per pass
    pub depth_of_cut: f64,
    pub retract: f64,
}

/// Points produced by a cycle and the last block number they used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleOutput {
    pub segments: Vec<Segment>,
    pub last_block: u32,
}

/// Number of roughing passes between the stock and finish diameters.
pub fn rough_pass_count(stock_diameter: f64, finish_diameter: f64, depth_of_cut: f64) -> u32 {
    let passes = ((stock_diameter - finish_diameter) / (2.0 * depth_of_cut)).ceil();
    if passes.is_finite() && passes > 1.0 {
        passes as u32
    } else {
        1
    }
}

/// G71 outer-diameter roughing
#[derive(Debug, Clone, PartialEq)]
pub struct RoughingCycle {
    /// Tool position when the cycle starts; X is the stock diameter
    pub start_x: f64,
    pub start_z: f64,
    pub parameters: RoughingParameters,
    /// Finishing allowance on X (U)
    pub allowance_x: f64,
    /// Finishing allowance on Z (W)
    pub allowance_z: f64,
    pub feed: f64,
}

impl RoughingCycle {
    /// Smallest profile diameter plus the X allowance
    pub fn finish_diameter(&self, profile: &[ProfilePoint]) -> f64 {
        let min_x = profile.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        min_x + self.allowance_x.abs()
    }

    pub fn pass_count(&self, profile: &[ProfilePoint]) -> u32 {
        rough_pass_count(
            self.start_x,
            self.finish_diameter(profile),
            self.parameters.depth_of_cut,
        )
    }

    /// Axial position where a pass at `cut_diameter` has to stop.
    ///
    /// Interpolates the first profile segment whose X span brackets the
    /// target. Targets outside the profile stop at the deepest Z when below
    /// the smallest diameter, otherwise at the face.
    pub fn stop_z(&self, profile: &[ProfilePoint], cut_diameter: f64, config: &CycleConfig) -> f64 {
        let Some(first) = profile.first() else {
            return self.start_z;
        };
        let target = cut_diameter - self.allowance_x.abs();
        let min_x = profile.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let deepest_z = profile.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);

        let found = profile.windows(2).find_map(|w| {
            let (p1, p2) = (&w[0], &w[1]);
            let brackets = (p1.x - target) * (p2.x - target) <= 0.0;
            if brackets && (p2.x - p1.x).abs() > config.interpolation_tolerance {
                let t = (target - p1.x) / (p2.x - p1.x);
                Some(p1.z + t * (p2.z - p1.z))
            } else {
                None
            }
        });

        let z = match found {
            Some(z) => z,
            None if target <= min_x => deepest_z,
            None => first.z,
        };
        z + self.allowance_z.abs()
    }

    /// Expand the cycle. `block_start` is the block number of the G71 line.
    pub fn expand(
        &self,
        profile: &[ProfilePoint],
        block_start: u32,
        source_line: usize,
        aux_code: Option<AuxCode>,
        config: &CycleConfig,
    ) -> CycleOutput {
        let mut out = CycleOutput {
            segments: Vec::new(),
            last_block: block_start,
        };
        let Some(first) = profile.first() else {
            return out;
        };

        let face_z = first.z;
        let z0 = self.start_z;
        let stock = self.start_x;
        let finish = self.finish_diameter(profile);
        let step = 2.0 * self.parameters.depth_of_cut;
        let clear = 2.0 * self.parameters.retract;
        let retract = self.parameters.retract;

        let point = |x: f64, z: f64, kind: SegmentKind, block: u32, feed: f64| {
            Segment::new(x, z, kind, block, feed)
                .with_source_line(source_line)
                .with_aux_code(aux_code)
        };

        let mut block = block_start;
        for pass in 1..=self.pass_count(profile) {
            block += 1;
            let cut = (stock - f64::from(pass) * step).max(finish);
            let stop = self.stop_z(profile, cut, config);
            if stop >= face_z - config.face_tolerance {
                continue;
            }
            out.segments.extend([
                point(stock + clear, z0, SegmentKind::Rapid, block, 0.0),
                point(cut + clear, z0, SegmentKind::Rapid, block, 0.0),
                point(cut, z0, SegmentKind::Rapid, block, 0.0),
                point(cut, stop, SegmentKind::RoughCut, block, self.feed),
                point(cut + clear, stop + retract, SegmentKind::Rapid, block, 0.0),
                point(cut + clear, z0, SegmentKind::Rapid, block, 0.0),
            ]);
        }

        block += 1;
        out.segments
            .push(point(finish, z0, SegmentKind::Rapid, block, 0.0));
        let (ux, uz) = (self.allowance_x.abs(), self.allowance_z.abs());
        out.segments.extend(
            profile
                .iter()
                .map(|p| point(p.x + ux, p.z + uz, SegmentKind::StockAllowance, block, 0.0)),
        );

        block += 1;
        out.segments
            .push(point(stock, z0, SegmentKind::Rapid, block, 0.0));
        out.last_block = block;
        out
    }
}

/// G70 finishing pass along the profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishingCycle {
    /// Tool position before the cycle, returned to afterwards
    pub start_x: f64,
    pub start_z: f64,
    pub feed: f64,
}

impl FinishingCycle {
    /// Expand the cycle. Each profile source line gets its own block.
    ///
    /// The closing return rapid does not carry the line's M code.
    pub fn expand(
        &self,
        profile: &[ProfilePoint],
        block_start: u32,
        source_line: usize,
        aux_code: Option<AuxCode>,
    ) -> CycleOutput {
        let mut out = CycleOutput {
            segments: Vec::new(),
            last_block: block_start,
        };
        let Some(first) = profile.first() else {
            return out;
        };

        let mut block = block_start + 1;
        out.segments.push(
            Segment::new(first.x, first.z, SegmentKind::Rapid, block, 0.0)
                .with_source_line(source_line)
                .with_aux_code(aux_code),
        );

        let mut current_line = first.source_line;
        for p in &profile[1..] {
            if p.source_line != current_line {
                block += 1;
                current_line = p.source_line;
            }
            let kind = if p.kind.is_arc() {
                p.kind
            } else {
                SegmentKind::FinishFeed
            };
            out.segments.push(
                Segment::new(p.x, p.z, kind, block, self.feed)
                    .with_source_line(source_line)
                    .with_aux_code(aux_code),
            );
        }

        block += 1;
        out.segments.push(
            Segment::new(self.start_x, self.start_z, SegmentKind::Rapid, block, 0.0)
                .with_source_line(source_line),
        );
        out.last_block = block;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(points: &[(f64, f64)]) -> Vec<ProfilePoint> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, z))| ProfilePoint {
                x,
                z,
                kind: SegmentKind::Feed,
                source_line: 10 + i,
            })
            .collect()
    }

    fn cycle(depth: f64) -> RoughingCycle {
        RoughingCycle {
            start_x: 65.0,
            start_z: 3.0,
            parameters: RoughingParameters {
                depth_of_cut: depth,
                retract: 0.5,
            },
            allowance_x: 0.0,
            allowance_z: 0.0,
            feed: 0.25,
        }
    }

    #[test]
    fn test_pass_count() {
        assert_eq!(rough_pass_count(65.0, 24.0, 1.0), 21);
        assert_eq!(rough_pass_count(65.0, 65.0, 1.0), 1);
        assert_eq!(rough_pass_count(20.0, 30.0, 1.0), 1);
    }

    #[test]
    fn test_stop_z_interpolates_profile() {
        let prof = profile(&[(20.0, 0.0), (20.0, -10.0), (40.0, -20.0), (40.0, -30.0)]);
        let config = CycleConfig::default();
        let c = cycle(1.0);
        assert!((c.stop_z(&prof, 30.0, &config) - -15.0).abs() < 1e-9);
        // above the largest diameter: face
        assert_eq!(c.stop_z(&prof, 50.0, &config), 0.0);
        // below the smallest diameter: deepest
        assert_eq!(c.stop_z(&prof, 10.0, &config), -30.0);
    }

    #[test]
    fn test_roughing_pass_layout() {
        let prof = profile(&[(20.0, 0.0), (20.0, -10.0), (60.0, -10.0), (60.0, -20.0)]);
        let config = CycleConfig::default();
        let out = cycle(10.0).expand(&prof, 5, 7, None, &config);

        // (65 - 20) / 20 -> 3 passes, closing rapid, allowance block, return block
        let passes: Vec<&Segment> = out
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::RoughCut)
            .collect();
        assert_eq!(passes.len(), 3);
        assert_eq!(passes[0].x, 45.0);
        assert_eq!(passes[0].z, -10.0);
        assert_eq!(passes[0].feed_rate, 0.25);
        assert_eq!(passes[2].x, 20.0);
        assert_eq!(passes[2].block, 8);

        let first_pass = &out.segments[..6];
        assert_eq!((first_pass[0].x, first_pass[0].z), (66.0, 3.0));
        assert_eq!((first_pass[4].x, first_pass[4].z), (46.0, -9.5));
        assert_eq!((first_pass[5].x, first_pass[5].z), (46.0, 3.0));

        assert_eq!(out.last_block, 10);
        let last = out.segments.last().unwrap();
        assert_eq!((last.x, last.z, last.block), (65.0, 3.0, 10));
        assert_eq!(out.segments.iter().filter(|s| s.kind == SegmentKind::StockAllowance).count(), 4);
        assert!(out.segments.iter().all(|s| s.source_line == Some(7)));
    }

    #[test]
    fn test_skipped_pass_consumes_block() {
        // stock below the finish diameter: the only pass stops at the face
        let prof = profile(&[(70.0, 0.0), (80.0, -10.0)]);
        let config = CycleConfig::default();
        let out = cycle(1.0).expand(&prof, 0, 0, None, &config);
        assert_eq!(out.segments.iter().filter(|s| s.kind == SegmentKind::RoughCut).count(), 0);
        assert_eq!(out.segments[0].block, 2);
        assert_eq!(out.last_block, 3);
    }

    #[test]
    fn test_allowance_offsets_profile() {
        let prof = profile(&[(20.0, 0.0), (20.0, -10.0)]);
        let mut c = cycle(5.0);
        c.allowance_x = -1.0;
        c.allowance_z = 0.2;
        let out = c.expand(&prof, 0, 0, None, &CycleConfig::default());
        let allowance: Vec<&Segment> = out
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::StockAllowance)
            .collect();
        assert_eq!(allowance.len(), 2);
        assert_eq!(allowance[0].x, 21.0);
        assert!((allowance[0].z - 0.2).abs() < 1e-12);
        assert!((allowance[1].z - -9.8).abs() < 1e-12);
    }

    #[test]
    fn test_finishing_blocks_follow_source_lines() {
        let mut prof = profile(&[(20.0, 0.0), (24.0, -2.0)]);
        prof.push(ProfilePoint {
            x: 26.0,
            z: -3.0,
            kind: SegmentKind::ArcCw,
            source_line: 12,
        });
        prof.push(ProfilePoint {
            x: 28.0,
            z: -5.0,
            kind: SegmentKind::ArcCw,
            source_line: 12,
        });
        let finishing = FinishingCycle {
            start_x: 65.0,
            start_z: 3.0,
            feed: 0.15,
        };
        let out = finishing.expand(&prof, 4, 30, Some(AuxCode(8)));
        let blocks: Vec<u32> = out.segments.iter().map(|s| s.block).collect();
        assert_eq!(blocks, vec![5, 6, 7, 7, 8]);
        assert_eq!(out.segments[1].kind, SegmentKind::FinishFeed);
        assert_eq!(out.segments[2].kind, SegmentKind::ArcCw);
        assert_eq!(out.segments[1].feed_rate, 0.15);
        let back = out.segments.last().unwrap();
        assert_eq!((back.x, back.z), (65.0, 3.0));
        assert_eq!(back.aux_code, None);
        assert_eq!(out.last_block, 8);
    }
}
