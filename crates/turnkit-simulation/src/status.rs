//! Status projection of the playback cursor

use crate::scheduler::ModeLabel;
use serde::Serialize;
use std::fmt;
use turnkit_core::Segment;
use turnkit_gcode::Program;

/// What the operator sees for the point under the cursor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    /// Diameter
    pub x: f64,
    pub z: f64,
    pub feed: f64,
    pub block: u32,
    /// Trimmed text of the line that produced the point
    pub current_source_text: Option<String>,
    /// Next non-blank line after it
    pub next_source_text: Option<String>,
    pub mode_label: ModeLabel,
}

impl StatusRecord {
    pub fn project(segment: &Segment, program: &Program, mode_label: ModeLabel) -> Self {
        let current_source_text = segment
            .source_line
            .and_then(|line| program.source_text(line))
            .map(str::to_string);
        let next_source_text = segment
            .source_line
            .and_then(|line| program.next_non_blank_after(line))
            .map(str::to_string);
        Self {
            x: segment.x,
            z: segment.z,
            feed: segment.feed_rate,
            block: segment.block,
            current_source_text,
            next_source_text,
            mode_label,
        }
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X{:.3} Z{:.3} F{:.3} [{}]",
            self.x, self.z, self.feed, self.mode_label
        )?;
        if let Some(current) = &self.current_source_text {
            write!(f, " {}", current)?;
        }
        if let Some(next) = &self.next_source_text {
            write!(f, " -> {}", next)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnkit_core::SegmentKind;

    #[test]
    fn test_project_reads_source_lines() {
        let program = Program::from_text("G0 X10 Z2\n\n   G1 Z-5 F0.2  \nM30");
        let segment = Segment::new(10.0, -5.0, SegmentKind::Feed, 2, 0.2).with_source_line(2);
        let status = StatusRecord::project(&segment, &program, ModeLabel::Running);

        assert_eq!(status.current_source_text.as_deref(), Some("G1 Z-5 F0.2"));
        assert_eq!(status.next_source_text.as_deref(), Some("M30"));
        assert_eq!(status.to_string(), "X10.000 Z-5.000 F0.200 [running] G1 Z-5 F0.2 -> M30");
    }

    #[test]
    fn test_project_without_source_line() {
        let program = Program::from_text("G0 X10 Z2");
        let segment = Segment::new(0.0, 0.0, SegmentKind::Start, 0, 0.0);
        let status = StatusRecord::project(&segment, &program, ModeLabel::Loaded);
        assert!(status.current_source_text.is_none());
        assert!(status.next_source_text.is_none());

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["mode_label"], "loaded");
    }
}
