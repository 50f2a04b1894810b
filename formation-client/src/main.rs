use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use formation_client::{load_formation, FormationRunner, RunOptions};
use formation_core::{FormationConfig, SpawnBounds, UpdateMode};
use std::io::{self, BufWriter};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// In-place update in agent order
    Sequential,
    /// Every agent reads the pre-tick state
    DoubleBuffered,
}

impl From<Mode> for UpdateMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Sequential => UpdateMode::Sequential,
            Mode::DoubleBuffered => UpdateMode::DoubleBuffered,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless formation-control swarm driver", long_about = None)]
struct Args {
    /// Formation description (JSON). The seven-agent hexagon is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the initial spawn; drawn from OS entropy when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate; 0 runs until stdout closes or the process is interrupted
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Within-tick update order
    #[arg(short, long, value_enum, default_value_t = Mode::Sequential)]
    mode: Mode,

    /// Write a snapshot every N ticks
    #[arg(short, long, default_value_t = 1)]
    report_every: u64,

    /// Pace each tick to one time step of wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Only log the final summary, no snapshots on stdout
    #[arg(short, long)]
    quiet: bool,

    /// Width of the spawn area
    #[arg(long, default_value_t = 640.0)]
    width: f64,

    /// Height of the spawn area
    #[arg(long, default_value_t = 480.0)]
    height: f64,

    /// Upper bound for each initial velocity component
    #[arg(long, default_value_t = 100.0)]
    max_initial_speed: f64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Formation client starting...");

    let config = match &args.config {
        Some(path) => {
            log::info!("Formation: {}", path.display());
            load_formation(path)?
        }
        None => {
            log::info!("Formation: built-in hexagon");
            FormationConfig::hexagon()
        }
    };

    let options = RunOptions {
        ticks: args.ticks,
        report_every: args.report_every,
        emit_snapshots: !args.quiet,
        mode: args.mode.into(),
        bounds: SpawnBounds {
            width: args.width,
            height: args.height,
            max_initial_speed: args.max_initial_speed,
        },
        seed: args.seed,
        realtime: args.realtime,
    };

    let mut runner =
        FormationRunner::new(&config, options).context("Failed to initialize simulation")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    runner.run(&mut out).context("Simulation run failed")?;

    Ok(())
}
