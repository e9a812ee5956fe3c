//! Property-based tests for trace generation.
//!
//! Run with: cargo test -p turnkit-gcode -- proptest

use proptest::prelude::*;
use turnkit_gcode::{ArcDirection, ArcSolver, Interpreter};

/// One motion line: rapid, feed or arc with a radius.
fn arb_line() -> impl Strategy<Value = String> {
    (0u32..4, 0.0..80.0f64, -60.0..10.0f64, 0.5..40.0f64).prop_map(|(g, x, z, r)| {
        if g >= 2 {
            format!("G{} X{:.3} Z{:.3} R{:.3}", g, x, z, r)
        } else {
            format!("G{} X{:.3} Z{:.3} F0.2", g, x, z)
        }
    })
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_line(), 1..20).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn proptest_reparse_is_idempotent(program in arb_program()) {
        let interpreter = Interpreter::default();
        let first = interpreter.parse(&program).unwrap();
        let second = interpreter.parse(&program).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn proptest_densified_steps_are_bounded(program in arb_program()) {
        let interpreter = Interpreter::default();
        let max = interpreter.config().max_segment_length;
        let trace = interpreter.parse(&program).unwrap();
        for pair in trace.segments().windows(2) {
            prop_assert!(pair[0].distance_to(&pair[1]) <= max + 1e-9);
        }
        prop_assert!(trace.is_block_monotonic());
    }

    #[test]
    fn proptest_arc_endpoints_exact(
        x1 in 0.0..80.0f64,
        z1 in -60.0..10.0f64,
        x2 in 0.0..80.0f64,
        z2 in -60.0..10.0f64,
        r in 0.1..50.0f64,
        cw in any::<bool>(),
    ) {
        let direction = if cw { ArcDirection::Clockwise } else { ArcDirection::CounterClockwise };
        let solver = ArcSolver::default();
        let points = solver.solve((x1, z1), (x2, z2), r, direction);
        prop_assert_eq!(points.first().copied(), Some((x1, z1)));
        prop_assert_eq!(points.last().copied(), Some((x2, z2)));
        if let Some(geom) = solver.geometry((x1, z1), (x2, z2), r, direction) {
            if cw {
                prop_assert!(geom.sweep <= 0.0);
            } else {
                prop_assert!(geom.sweep >= 0.0);
            }
            prop_assert!(points.len() > solver.config().min_points);
        }
    }
}
