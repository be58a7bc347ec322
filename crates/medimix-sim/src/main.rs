//! # MediMix Sim
//!
//! Headless runner for MediMix Dash. Builds a session from a seed and an
//! optional JSON config, lets the autoplayer run it, and reports the result.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod autoplay;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use medimix_core::{SimConfig, Simulation};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use autoplay::{AutoPlayer, AutoplayOptions, RunTally};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    /// One line per figure
    Console,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "medimix-sim", version)]
#[command(about = "Run a MediMix Dash session headless with the autoplayer")]
struct Args {
    /// RNG seed
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Simulation ticks to run (one game minute each)
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// JSON config; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Real milliseconds of assist time per tick
    #[arg(long, default_value_t = 2000)]
    assist_ms: u64,

    /// Ticks between calls for help
    #[arg(long, default_value_t = 45)]
    help_every: u64,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Dump the final snapshot as JSON to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    seed: u64,
    ticks: u64,
    clock: String,
    game_over: bool,
    dash_points: i64,
    currency: u64,
    morale: u8,
    completed: u64,
    failed: u64,
    complaints: u64,
    average_served_wait: f64,
    state_hash: u64,
    tally: RunTally,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let mut sim = Simulation::new(args.seed, config).context("invalid configuration")?;
    let mut player = AutoPlayer::new(AutoplayOptions {
        assist_step: Duration::from_millis(args.assist_ms),
        help_every: args.help_every.max(1),
    });

    for _ in 0..args.ticks {
        if sim.is_game_over() {
            break;
        }
        player
            .play_tick(&mut sim)
            .with_context(|| format!("autoplay refused at tick {}", sim.tick()))?;
    }
    info!(tick = sim.tick(), game_over = sim.is_game_over(), "run finished");

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&sim.snapshot())?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let ledger = sim.ledger();
    let report = Report {
        seed: sim.seed(),
        ticks: sim.tick(),
        clock: sim.clock().to_string(),
        game_over: sim.is_game_over(),
        dash_points: ledger.dash_points,
        currency: ledger.currency,
        morale: ledger.morale,
        completed: ledger.stats.completed,
        failed: ledger.stats.failed,
        complaints: ledger.complaints,
        average_served_wait: ledger.stats.average_served_wait(),
        state_hash: sim.state_hash(),
        tally: player.tally().clone(),
    };
    print_report(&report, args.report)
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: SimConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn print_report(report: &Report, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Console => {
            println!("seed          {}", report.seed);
            println!("ticks         {} ({})", report.ticks, report.clock);
            println!("game over     {}", report.game_over);
            println!("dash points   {}", report.dash_points);
            println!("currency      {}", report.currency);
            println!("morale        {}", report.morale);
            println!(
                "patients      {} completed, {} failed, {} complaints",
                report.completed, report.failed, report.complaints
            );
            println!("served wait   {:.1} ticks avg", report.average_served_wait);
            println!(
                "play          {} swaps, {} assignments, {} calls for help, {} rearrangements, {} abilities",
                report.tally.swaps,
                report.tally.assignments,
                report.tally.calls_for_help,
                report.tally.rearrangements,
                report.tally.abilities
            );
            println!("wasted units  {}", report.tally.wasted_units);
            println!("state hash    {:016x}", report.state_hash);
        }
    }
    Ok(())
}
