//! leap_tinsel: interactive entry point.

use std::path::PathBuf;

use clap::Parser;

use leap_tinsel::app::{run, FeedSource};
use leap_tinsel::config::AppConfig;
use leap_tinsel::error::AppError;
use tinsel_field::Mode;

#[derive(Parser, Debug)]
#[command(name = "leap_tinsel", about = "Gesture-driven particle Christmas tree")]
struct Cli {
    /// JSON config file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the config file and start with defaults
    #[arg(long)]
    quick: bool,

    /// Seed for particle generation
    #[arg(long)]
    seed: Option<u64>,

    /// Number of particles
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// Photo identifier for the gallery (repeatable)
    #[arg(long = "photo")]
    photos: Vec<String>,

    /// Start scattered as snow
    #[arg(long)]
    snow: bool,

    /// Start with the gesture feed off
    #[arg(long)]
    no_gestures: bool,

    /// Use the keyboard even when built with LeapMotion support
    #[arg(long)]
    keyboard: bool,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let cfg = match build_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.dump_config {
        match cfg.to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         Leap Tinsel: Gesture-Driven Particle Tree            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let source = if cli.keyboard { FeedSource::Keyboard } else { FeedSource::default() };
    match source {
        FeedSource::Keyboard => {
            println!("  Mode: Keyboard simulation  (hold O/F/P/X for palm/fist/pinch/other)")
        }
        #[cfg(feature = "leap")]
        FeedSource::Leap => println!("  Mode: LeapMotion hardware"),
    }
    println!(
        "  {} particles, seed {}, {} photo(s)",
        cfg.field.particle_count,
        cfg.seed,
        cfg.photos.len()
    );
    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg, source) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_config(cli: &Cli) -> Result<AppConfig, AppError> {
    let mut cfg = match (&cli.config, cli.quick) {
        (Some(path), false) => AppConfig::load_json(path)?,
        _ => AppConfig::default(),
    };

    if let Some(seed) = cli.seed {
        cfg.seed = seed;
    }
    if let Some(n) = cli.particles {
        cfg.field.particle_count = n;
    }
    if !cli.photos.is_empty() {
        cfg.photos = cli.photos.clone();
    }
    if cli.snow {
        cfg.mode = Mode::Snow;
    }
    if cli.no_gestures {
        cfg.gesture_feed = false;
    }
    // Reject a bad colour before the window opens.
    cfg.color()?;
    Ok(cfg)
}
