//! Plinko Sim entry point
//!
//! Runs the simulation thread with a headless presentation loop: balls are
//! dropped at seeded-random positions, progress is logged, and a JSON run
//! summary is printed at the end.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use plinko_sim::runtime::RateGovernor;
    use plinko_sim::sim::SimEvent;
    use plinko_sim::{BallCollisionMode, Board, BoardConfig, SimulationHandle};

    #[derive(Debug, Parser)]
    #[command(name = "plinko-sim", about = "Headless Plinko board simulation")]
    pub struct Args {
        /// Board config (JSON); defaults are used for missing fields
        #[arg(long)]
        config: Option<PathBuf>,
        /// How long to run, in seconds of wall time
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        /// Balls to drop over the run
        #[arg(long, default_value_t = 32)]
        drops: u32,
        /// Seed for drop positions
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Presentation loop rate (Hz)
        #[arg(long, default_value_t = 60)]
        frame_rate: u32,
        /// Override the simulation rate (Hz)
        #[arg(long)]
        tick_rate: Option<u32>,
        /// Override ball-ball collision mode (reflect | elastic)
        #[arg(long)]
        ball_collisions: Option<BallCollisionMode>,
        /// Start with the debug overlay on
        #[arg(long)]
        debug: bool,
        /// Dump the pin layout as JSON and exit
        #[arg(long)]
        dump_layout: bool,
    }

    /// Printed to stdout when the run ends
    #[derive(Debug, Serialize)]
    struct RunSummary {
        ticks: u64,
        score: u64,
        dropped: u32,
        rejected: u32,
        landed: u32,
        timed_out: u32,
        still_active: usize,
    }

    /// Wall-clock run length; negative and NaN mean zero
    fn run_duration(seconds: f64) -> Result<Duration> {
        Duration::try_from_secs_f64(seconds.max(0.0))
            .with_context(|| format!("--seconds {seconds} is not a usable duration"))
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();

        let mut config = match &args.config {
            Some(path) => BoardConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BoardConfig::default(),
        };
        if let Some(rate) = args.tick_rate {
            config.tick_rate_hz = rate;
        }
        if let Some(mode) = args.ball_collisions {
            config.ball_collisions = mode;
        }
        let board = Board::from_config(&config).context("invalid board config")?;

        if args.dump_layout {
            println!("{}", serde_json::to_string_pretty(board.layout())?);
            return Ok(());
        }

        let sim_width = board.params().sim_width;
        let ball_radius = board.params().ball_radius;
        let sim = SimulationHandle::start(board).context("starting simulation thread")?;
        if args.debug {
            sim.toggle_debug();
        }
        log::info!("{} pins on the board", sim.pins().len());

        let mut rng = Pcg32::seed_from_u64(args.seed);
        let run_for = run_duration(args.seconds)?;
        let drop_every = run_for.div_f64(args.drops.max(1) as f64);
        let started = Instant::now();
        let mut next_drop = started;
        let mut next_report = started;

        let mut summary = RunSummary {
            ticks: 0,
            score: 0,
            dropped: 0,
            rejected: 0,
            landed: 0,
            timed_out: 0,
            still_active: 0,
        };

        let running = sim.running_flag();
        let mut frame = RateGovernor::new(args.frame_rate);
        while running.load(std::sync::atomic::Ordering::Acquire) && started.elapsed() < run_for {
            frame.begin();
            let now = Instant::now();

            if summary.dropped + summary.rejected < args.drops && now >= next_drop {
                let x = if sim_width > 2.0 * ball_radius {
                    rng.random_range(ball_radius..sim_width - ball_radius)
                } else {
                    sim_width / 2.0
                };
                match sim.spawn_ball(x) {
                    Ok(_) => summary.dropped += 1,
                    Err(e) => {
                        log::debug!("Drop rejected: {}", e);
                        summary.rejected += 1;
                    }
                }
                next_drop += drop_every;
            }

            for event in sim.drain_events() {
                match event {
                    SimEvent::Scored { goal, points, .. } => {
                        summary.landed += 1;
                        log::info!("Goal {} +{}", goal, points);
                    }
                    SimEvent::TimedOut { slot } => {
                        summary.timed_out += 1;
                        log::warn!("Ball {} timed out", slot);
                    }
                }
            }

            if now >= next_report {
                let snap = sim.snapshot();
                log::info!(
                    "tick {} | score {} | {} balls in play",
                    snap.tick,
                    snap.score,
                    snap.balls.len()
                );
                for line in &snap.debug_lines {
                    log::info!("  {}", line);
                }
                next_report += Duration::from_secs(1);
            }

            frame.finish();
        }

        let snap = sim.snapshot();
        summary.score = snap.score;
        summary.still_active = snap.balls.len();
        summary.ticks = sim.stop();

        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Plinko Sim (headless) starting...");
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is driven by the embedding page
}
