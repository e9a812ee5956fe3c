use std::collections::BTreeSet;
use std::time::Instant;
use turnkit_core::{SegmentKind, StopCode};
use turnkit_settings::{Config, G71_OUTER};
use turnkit_simulation::{HaltReason, ModeLabel, PlaybackPhase, TurningEngine};

const TURN_AND_ARC: &str = "G0 X20 Z5\nG1 Z-10 F0.2\nG2 X30 Z-15 R5\nM30";

const WITH_OPTIONAL_STOP: &str = "G0 X20 Z5\nG1 Z0 F0.2\nM1\nG1 Z-5\nM30";

/// Play, then fire every armed tick until playback halts. Returns the number
/// of ticks run.
fn run_until_halt(engine: &mut TurningEngine) -> usize {
    let mut ticks = 1;
    let mut next = engine.play(Instant::now());
    while let Some(handle) = next {
        ticks += 1;
        assert!(ticks < 100_000, "playback never halted");
        next = engine.fire(handle, handle.due());
    }
    ticks
}

#[test]
fn test_turn_and_arc_plays_to_program_end() {
    let mut engine = TurningEngine::default();
    engine.load_program(TURN_AND_ARC).unwrap();
    assert_eq!(engine.mode_label(), ModeLabel::Loaded);

    let ticks = run_until_halt(&mut engine);
    assert!(ticks > 1);
    assert_eq!(engine.phase(), PlaybackPhase::Finished);
    assert_eq!(engine.state().trace_index, engine.trace().len() - 1);

    let status = engine.status().unwrap();
    assert_eq!(status.mode_label, ModeLabel::Finished);
    assert_eq!((status.x, status.z), (30.0, -15.0));
    assert_eq!(status.current_source_text.as_deref(), Some("M30"));
    assert!(status.next_source_text.is_none());
    assert_eq!(
        engine.trace().last().and_then(|s| s.stop_code()),
        Some(StopCode::ProgramEnd)
    );
}

#[test]
fn test_optional_stop_is_gated() {
    let mut engine = TurningEngine::default();
    engine.load_program(WITH_OPTIONAL_STOP).unwrap();

    run_until_halt(&mut engine);
    assert_eq!(engine.phase(), PlaybackPhase::Finished);

    engine.reset();
    engine.set_optional_stop(true);
    run_until_halt(&mut engine);
    assert_eq!(engine.phase(), PlaybackPhase::Paused);
    assert_eq!(engine.mode_label(), ModeLabel::Paused);
    let status = engine.status().unwrap();
    assert_eq!(status.current_source_text.as_deref(), Some("M1"));
    assert_eq!(status.next_source_text.as_deref(), Some("G1 Z-5"));

    run_until_halt(&mut engine);
    assert_eq!(engine.phase(), PlaybackPhase::Finished);
}

#[test]
fn test_single_block_on_g71_template() {
    let mut config = Config::default();
    config.playback.single_block = true;
    let mut engine = TurningEngine::new(&config);
    engine.load_template(G71_OUTER).unwrap();

    let blocks: BTreeSet<u32> = engine.trace().iter().map(|s| s.block).collect();
    let mut halts = 0;
    loop {
        run_until_halt(&mut engine);
        if engine.phase() == PlaybackPhase::Finished {
            break;
        }
        halts += 1;
        assert_eq!(engine.mode_label(), ModeLabel::SingleBlockPaused);
        let index = engine.state().trace_index;
        let segments = engine.trace().segments();
        assert_ne!(segments[index].block, segments[index + 1].block);
    }
    // the start block is never executed and the last one ends in Finished
    assert_eq!(halts, blocks.len() - 2);
}

#[test]
fn test_failed_load_keeps_previous_trace() {
    let mut engine = TurningEngine::default();
    engine.set_speed_multiplier(0.5).unwrap();
    engine.load_program(TURN_AND_ARC).unwrap();
    let before = engine.trace().clone();

    assert!(engine.play(Instant::now()).is_some());
    let index = engine.state().trace_index;
    assert!(index > 0);

    let err = engine.load_program("G0 X20 Z5\nN1.5 G1 Z-10").unwrap_err();
    assert_eq!(err.line_number(), 2);
    assert_eq!(engine.trace(), &before);
    assert_eq!(engine.phase(), PlaybackPhase::Paused);
    assert_eq!(engine.state().trace_index, index);
    assert_eq!(engine.program().source_text(3), Some("M30"));
}

#[test]
fn test_reload_resets_playback() {
    let mut engine = TurningEngine::default();
    engine.set_speed_multiplier(0.5).unwrap();
    engine.load_program(TURN_AND_ARC).unwrap();
    engine.play(Instant::now());

    engine.load_program(WITH_OPTIONAL_STOP).unwrap();
    assert_eq!(engine.phase(), PlaybackPhase::Idle);
    assert_eq!(engine.mode_label(), ModeLabel::Loaded);
    assert_eq!(engine.state().trace_index, 0);
    assert_eq!(engine.trace().segments()[0].kind, SegmentKind::Start);
}

#[test]
fn test_stale_handle_is_ignored() {
    let mut engine = TurningEngine::default();
    engine.set_speed_multiplier(0.5).unwrap();
    engine.load_program(TURN_AND_ARC).unwrap();

    let now = Instant::now();
    let first = engine.play(now).unwrap();
    engine.pause();
    assert_eq!(engine.phase(), PlaybackPhase::Paused);
    engine.pause();
    assert_eq!(engine.phase(), PlaybackPhase::Paused);

    let second = engine.play(now).unwrap();
    let index = engine.state().trace_index;
    assert!(engine.fire(first, first.due()).is_none());
    assert_eq!(engine.state().trace_index, index);

    assert!(engine.fire(second, second.due()).is_some());
    assert!(engine.state().trace_index > index);
}

#[test]
fn test_play_from_finished_restarts() {
    let mut engine = TurningEngine::default();
    engine.set_speed_multiplier(1000.0).unwrap();
    engine.load_program(TURN_AND_ARC).unwrap();

    assert!(engine.play(Instant::now()).is_none());
    assert_eq!(engine.phase(), PlaybackPhase::Finished);

    engine.set_speed_multiplier(0.5).unwrap();
    assert!(engine.play(Instant::now()).is_some());
    assert_eq!(engine.phase(), PlaybackPhase::Playing);
    assert!(engine.state().trace_index < engine.trace().len() - 1);
}

#[test]
fn test_program_end_on_a_move_finishes_after_the_move() {
    let mut engine = TurningEngine::default();
    engine.set_speed_multiplier(0.5).unwrap();
    engine
        .load_program("G0 X20 Z5\nG1 Z-10 F0.2 M30\nG0 X40")
        .unwrap();
    let marked = engine
        .trace()
        .iter()
        .filter(|s| s.stop_code() == Some(StopCode::ProgramEnd))
        .count();
    assert!(marked > 1);

    run_until_halt(&mut engine);
    assert_eq!(engine.phase(), PlaybackPhase::Finished);
    assert_eq!(engine.last_tick().map(|t| t.halt), Some(HaltReason::ProgramEnd));
    let status = engine.status().unwrap();
    assert_eq!((status.x, status.z), (20.0, -10.0));
    assert_eq!(status.current_source_text.as_deref(), Some("G1 Z-10 F0.2 M30"));
}
