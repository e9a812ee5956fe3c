//! Headless playback runner
//!
//! Loads a program file or a named template, plays it to the end on the
//! async runtime and prints a status line every time playback halts.
//! Program stops and single-block halts are resumed automatically.

use anyhow::{bail, Context};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};
use turnkit_settings::Config;
use turnkit_simulation::{HaltReason, PlaybackPhase, TurningEngine};

/// Play a lathe G-code program and print where playback halts
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "turnkit", version, about, long_about = None)]
pub struct Cli {
    /// Program file to play
    #[arg(
        value_name = "PROGRAM",
        conflicts_with = "template",
        required_unless_present_any = ["template", "list_templates"]
    )]
    pub program: Option<PathBuf>,

    /// Play a program from the template library
    #[arg(short, long, value_name = "ID")]
    pub template: Option<String>,

    /// Config file (.toml or .json)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Speed slider position, clamped to the configured curve
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub speed: Option<u32>,

    /// Halt at the end of every block
    #[arg(long)]
    pub single_block: bool,

    /// Honour M1
    #[arg(long)]
    pub optional_stop: bool,

    /// Print template ids and exit
    #[arg(long)]
    pub list_templates: bool,
}

/// Config from `--config`, else the default location, else built-in defaults
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    match Config::default_path() {
        Ok(path) => Config::load_or_default(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        Err(e) => {
            debug!("No config directory ({}), using defaults", e);
            Ok(Config::default())
        }
    }
}

/// Build an engine with the program loaded and the flags applied
pub fn build_engine(cli: &Cli, config: &Config) -> anyhow::Result<TurningEngine> {
    let mut engine = TurningEngine::new(config);
    match (&cli.program, &cli.template) {
        (Some(path), _) => {
            engine
                .load_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        (None, Some(id)) => {
            engine.load_template(id)?;
        }
        (None, None) => bail!("no program given"),
    }

    if let Some(raw) = cli.speed {
        let speed = engine.set_speed_from_slider(raw)?;
        debug!(raw, speed, "Speed set from slider");
    }
    if cli.single_block {
        engine.set_single_block(true);
    }
    if cli.optional_stop {
        engine.set_optional_stop(true);
    }
    Ok(engine)
}

/// What a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: usize,
    /// Halts before the end, resumed automatically
    pub halts: usize,
    pub finished: bool,
    /// Why the final tick stopped
    pub last_halt: Option<HaltReason>,
}

/// Play the loaded program to the end, writing a status line at each halt
pub async fn run<W: Write>(engine: &mut TurningEngine, out: &mut W) -> anyhow::Result<RunSummary> {
    let mut summary = RunSummary::default();
    loop {
        let mut next = engine.play(Instant::now());
        summary.ticks += 1;
        while let Some(handle) = next {
            tokio::time::sleep_until(tokio::time::Instant::from_std(handle.due())).await;
            next = engine.fire(handle, Instant::now());
            summary.ticks += 1;
        }

        summary.last_halt = engine.last_tick().map(|tick| tick.halt);
        if let Some(status) = engine.status() {
            match summary.last_halt {
                Some(halt) => writeln!(out, "{} <{}>", status, halt)?,
                None => writeln!(out, "{}", status)?,
            }
        }
        match engine.phase() {
            PlaybackPhase::Finished => {
                summary.finished = true;
                break;
            }
            PlaybackPhase::Paused => summary.halts += 1,
            // too short to play
            PlaybackPhase::Idle | PlaybackPhase::Playing => break,
        }
    }
    info!(
        ticks = summary.ticks,
        halts = summary.halts,
        finished = summary.finished,
        "Playback done"
    );
    Ok(summary)
}
