use anyhow::{Context, Result};
use formation_core::{os_seed, FormationConfig, Simulation, SpawnBounds, UpdateMode};
use formation_shared::{Position, RunSummary, SwarmSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

/// How often convergence is logged, in ticks (ten seconds at 60 Hz)
const PROGRESS_INTERVAL: u64 = 600;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Ticks to simulate; zero runs until the output is closed
    pub ticks: u64,
    /// Emit a snapshot every this many ticks
    pub report_every: u64,
    pub emit_snapshots: bool,
    pub mode: UpdateMode,
    pub bounds: SpawnBounds,
    /// Spawn seed; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Pace each tick to one time step of wall-clock time
    pub realtime: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 600,
            report_every: 1,
            emit_snapshots: true,
            mode: UpdateMode::Sequential,
            bounds: SpawnBounds::default(),
            seed: None,
            realtime: false,
        }
    }
}

pub struct FormationRunner {
    simulation: Simulation,
    options: RunOptions,
    seed: u64,
}

impl FormationRunner {
    pub fn new(config: &FormationConfig, options: RunOptions) -> Result<Self> {
        if options.report_every == 0 {
            anyhow::bail!("Snapshot interval must be at least one tick");
        }

        let seed = match options.seed {
            Some(seed) => seed,
            None => os_seed().context("Failed to draw a seed from OS entropy")?,
        };
        log::info!("Spawn seed: {}", seed);

        let mut rng = StdRng::seed_from_u64(seed);
        let simulation = Simulation::from_config(config, &options.bounds, &mut rng)
            .context("Invalid formation configuration")?
            .with_update_mode(options.mode);

        Ok(Self {
            simulation,
            options,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Ticks the configured number of times, writing snapshots to `out`.
    ///
    /// With `ticks == 0` the loop only ends when `out` reports a broken pipe,
    /// which is a normal shutdown rather than an error.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<RunSummary> {
        let frame = if self.options.realtime {
            Some(
                Duration::try_from_secs_f64(self.simulation.time_step())
                    .context("Time step cannot be paced in real time")?,
            )
        } else {
            None
        };

        log::info!(
            "Starting tick loop: {} agents, {} ticks, {:?} update{}",
            self.simulation.agents().len(),
            if self.options.ticks == 0 {
                "unbounded".to_string()
            } else {
                self.options.ticks.to_string()
            },
            self.options.mode,
            if frame.is_some() { ", real time" } else { "" }
        );

        let mut output_open = true;
        while self.options.ticks == 0 || self.simulation.tick_count() < self.options.ticks {
            let started = Instant::now();
            self.simulation.tick();
            let tick = self.simulation.tick_count();

            if self.options.emit_snapshots && tick % self.options.report_every == 0 {
                let line = snapshot(&self.simulation)
                    .to_json_line()
                    .context("Failed to encode snapshot")?;
                let written = writeln!(out, "{}", line).and_then(|()| match frame {
                    Some(_) => out.flush(),
                    None => Ok(()),
                });
                if let Err(err) = written {
                    if err.kind() == io::ErrorKind::BrokenPipe {
                        log::info!("Snapshot output closed at tick {}", tick);
                        output_open = false;
                        break;
                    }
                    return Err(err).context("Failed to write snapshot");
                }
            }

            if tick % PROGRESS_INTERVAL == 0 {
                log::debug!(
                    "tick {}: formation error {:.3}, velocity spread {:.4}",
                    tick,
                    self.simulation.formation_error(),
                    self.simulation.velocity_spread()
                );
            }

            if let Some(rest) = frame.and_then(|frame| frame.checked_sub(started.elapsed())) {
                thread::sleep(rest);
            }
        }

        if output_open {
            match out.flush() {
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    log::info!("Snapshot output closed before final flush");
                }
                flushed => flushed.context("Failed to flush snapshot output")?,
            }
        }

        let summary = self.summary();
        log::info!(
            "Finished after {} ticks: formation error {:.3}, velocity spread {:.4}",
            summary.ticks,
            summary.formation_error,
            summary.velocity_spread
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        let centroid = self.simulation.centroid();
        RunSummary {
            ticks: self.simulation.tick_count(),
            agent_count: self.simulation.agents().len(),
            formation_error: self.simulation.formation_error(),
            velocity_spread: self.simulation.velocity_spread(),
            centroid: Position::new(centroid.x, centroid.y),
        }
    }
}

/// Positions and camera focus of the current tick
pub fn snapshot(simulation: &Simulation) -> SwarmSnapshot {
    let centroid = simulation.centroid();
    SwarmSnapshot {
        tick: simulation.tick_count(),
        time: simulation.elapsed(),
        positions: simulation.positions().map(Position::from).collect(),
        centroid: Position::new(centroid.x, centroid.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(ticks: u64) -> RunOptions {
        RunOptions {
            ticks,
            seed: Some(17),
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_zero_report_interval_rejected() {
        let options = RunOptions {
            report_every: 0,
            ..options(10)
        };
        assert!(FormationRunner::new(&FormationConfig::hexagon(), options).is_err());
    }

    #[test]
    fn test_snapshot_matches_simulation() {
        let runner = FormationRunner::new(&FormationConfig::hexagon(), options(0)).unwrap();
        let sim = runner.simulation();
        let snap = snapshot(sim);

        assert_eq!(snap.tick, 0);
        assert_eq!(snap.positions.len(), 7);
        assert_eq!(snap.positions[2].x, sim.agents()[2].position.x);
        assert_eq!(snap.centroid.x, sim.centroid().x);
    }

    #[test]
    fn test_run_writes_one_line_per_report() {
        let mut runner = FormationRunner::new(
            &FormationConfig::hexagon(),
            RunOptions {
                report_every: 4,
                ..options(20)
            },
        )
        .unwrap();
        let mut out = Vec::new();

        let summary = runner.run(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert_eq!(summary.ticks, 20);
        assert_eq!(summary.agent_count, 7);
    }

    #[test]
    fn test_seed_is_reported() {
        let runner = FormationRunner::new(&FormationConfig::hexagon(), options(1)).unwrap();
        assert_eq!(runner.seed(), 17);

        let entropy = FormationRunner::new(
            &FormationConfig::hexagon(),
            RunOptions {
                seed: None,
                ..options(1)
            },
        );
        assert!(entropy.is_ok());
    }

    /// Accepts `lines` newline-terminated writes, then reports a closed pipe
    struct ClosingPipe {
        lines: usize,
        kind: io::ErrorKind,
    }

    impl Write for ClosingPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.lines == 0 {
                return Err(io::Error::from(self.kind));
            }
            let newlines = buf.iter().filter(|&&b| b == b'\n').count();
            self.lines = self.lines.saturating_sub(newlines);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_realtime_paces_ticks() {
        let mut runner = FormationRunner::new(
            &FormationConfig::hexagon(),
            RunOptions {
                realtime: true,
                ..options(3)
            },
        )
        .unwrap();
        let ts = runner.simulation().time_step();
        let mut out = Vec::new();

        let started = Instant::now();
        let summary = runner.run(&mut out).unwrap();

        assert_eq!(summary.ticks, 3);
        assert!(started.elapsed() >= Duration::from_secs_f64(2.0 * ts));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_unbounded_run_stops_when_output_closes() {
        let mut runner = FormationRunner::new(&FormationConfig::hexagon(), options(0)).unwrap();
        let mut out = ClosingPipe {
            lines: 5,
            kind: io::ErrorKind::BrokenPipe,
        };

        let summary = runner.run(&mut out).unwrap();

        // the sixth snapshot hits the closed pipe
        assert_eq!(summary.ticks, 6);
    }

    #[test]
    fn test_other_write_errors_fail_the_run() {
        let mut runner = FormationRunner::new(&FormationConfig::hexagon(), options(0)).unwrap();
        let mut out = ClosingPipe {
            lines: 2,
            kind: io::ErrorKind::PermissionDenied,
        };

        let err = runner.run(&mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to write snapshot"));
        assert_eq!(runner.simulation().tick_count(), 3);
    }
}
