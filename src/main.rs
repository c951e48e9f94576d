use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use intersection_sim::simulation::{
    ArrivalGenerator, CountFeed, SimConfig, SimWorld, TrendPredictor,
};

/// How often the count-feed file is re-read
const FEED_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Adaptive four-way intersection signal simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "1000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f32,

    /// Seed for reproducible arrivals and forecasts
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON snapshot of the simulation state to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// JSON file holding the external vehicle-count feed
    #[arg(long)]
    feed: Option<PathBuf>,

    /// Only log the final statistics
    #[arg(long)]
    quiet: bool,

    /// Milliseconds to pause between printed summaries
    #[arg(long, default_value = "0")]
    pause_ms: u64,

    #[arg(long)]
    min_green: Option<f32>,

    #[arg(long)]
    max_green: Option<f32>,

    #[arg(long)]
    base_green: Option<f32>,

    #[arg(long)]
    divisor: Option<u32>,

    /// Yellow phase length in seconds
    #[arg(long)]
    yellow: Option<f32>,

    #[arg(long)]
    stop_line_offset: Option<f32>,

    #[arg(long)]
    deceleration_factor: Option<f32>,

    #[arg(long)]
    congestion_threshold: Option<u32>,
}

impl Cli {
    /// Layer the config file and then the command-line overrides onto the defaults
    fn resolve_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SimConfig::default(),
        };

        if let Some(value) = self.min_green {
            config.min_green = value;
        }
        if let Some(value) = self.max_green {
            config.max_green = value;
        }
        if let Some(value) = self.base_green {
            config.base_green = value;
        }
        if let Some(value) = self.divisor {
            config.divisor = value;
        }
        if let Some(value) = self.yellow {
            config.yellow_duration = value;
        }
        if let Some(value) = self.stop_line_offset {
            config.stop_line_offset = value;
        }
        if let Some(value) = self.deceleration_factor {
            config.deceleration_factor = value;
        }
        if let Some(value) = self.congestion_threshold {
            config.congestion_threshold = value;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    run_headless(&cli, config)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli, config: SimConfig) -> Result<()> {
    if !(cli.delta.is_finite() && cli.delta > 0.0) {
        anyhow::bail!("--delta must be a positive number of seconds");
    }

    let predictor_seed = cli.seed.unwrap_or_else(rand::random);
    let mut world = SimWorld::new(config.clone())
        .context("Failed to build simulation")?
        .with_predictor(TrendPredictor::new(predictor_seed));

    if let Some(path) = &cli.feed {
        let feed = CountFeed::new();
        // The poller runs detached until the process exits
        let _poller = feed.spawn_file_poller(path.clone(), FEED_POLL_INTERVAL);
        world = world.with_feed(feed);
    }

    let mut arrivals = match cli.seed {
        Some(seed) => ArrivalGenerator::new_with_seed(&config, seed),
        None => ArrivalGenerator::new(&config),
    };

    info!("Running intersection simulation in headless mode...");
    info!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);

    // Calculate how many ticks equal 1 second of simulation time
    let ticks_per_second = (1.0 / cli.delta).ceil() as u32;

    if !cli.quiet {
        println!("Initial state:");
        world.print_summary();
        world.draw_map();
        println!();
    }

    let mut tick = 0;
    while tick < cli.ticks {
        let ticks_to_run = ticks_per_second.min(cli.ticks - tick);

        for _ in 0..ticks_to_run {
            tick += 1;
            arrivals.update(cli.delta, &mut world);
            world
                .tick(cli.delta)
                .with_context(|| format!("Simulation failed at tick {}", tick))?;
        }

        if let Some(path) = &cli.export {
            export_snapshot(&world, path)?;
        }

        if !cli.quiet {
            println!(
                "--- After tick {} ({:.1}s simulated time) ---",
                tick,
                tick as f32 * cli.delta
            );
            world.print_summary();
            world.draw_map();
            println!();
        }

        if cli.pause_ms > 0 && tick < cli.ticks {
            std::thread::sleep(Duration::from_millis(cli.pause_ms));
        }
    }

    world.stats().log_report();
    Ok(())
}

fn export_snapshot(world: &SimWorld, path: &Path) -> Result<()> {
    let json = world
        .snapshot()
        .to_json()
        .context("Failed to serialize snapshot")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    Ok(())
}
