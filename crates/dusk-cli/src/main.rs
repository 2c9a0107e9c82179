//! Command-line frontend for the Dusk simulation core.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    name = "dusk",
    about = "Dusk: headless tools for a sector-based first-person engine",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a map: counts, sectors and spawn list
    Inspect {
        /// Map JSON file (default: built-in demo level)
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Also list the things placed on the map
        #[arg(short, long)]
        things: bool,
    },

    /// Find the subsector and sector containing a point
    Locate {
        /// X coordinate
        #[arg(allow_negative_numbers = true)]
        x: f32,

        /// Y coordinate
        #[arg(allow_negative_numbers = true)]
        y: f32,

        /// Map JSON file (default: built-in demo level)
        #[arg(short, long)]
        map: Option<PathBuf>,
    },

    /// Run a headless simulation with a scripted intent
    Run {
        /// Map JSON file (default: built-in demo level)
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Simulation config JSON file (partial documents allowed)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of ticks to simulate (35 per second)
        #[arg(long, default_value = "70")]
        ticks: u64,

        /// RNG seed, overriding the config file
        #[arg(short, long)]
        seed: Option<u64>,

        #[command(flatten)]
        script: commands::run::Script,

        /// Print every event, not just the notable ones
        #[arg(short, long)]
        events: bool,
    },

    /// Export a map, save data or frame snapshot as JSON
    Export {
        /// What to export: map, save, snapshot
        what: String,

        /// Map JSON file (default: built-in demo level)
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Simulation config JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ticks to simulate before a save or snapshot
        #[arg(long, default_value = "0")]
        ticks: u64,

        #[command(flatten)]
        script: commands::run::Script,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Inspect { map, things } => commands::inspect::run(map.as_deref(), things),
        Commands::Locate { x, y, map } => commands::locate::run(map.as_deref(), x, y),
        Commands::Run {
            map,
            config,
            ticks,
            seed,
            script,
            events,
        } => commands::run::run(
            map.as_deref(),
            config.as_deref(),
            ticks,
            seed,
            &script,
            events,
        ),
        Commands::Export {
            what,
            map,
            config,
            ticks,
            script,
            output,
        } => commands::export::run(
            &what,
            map.as_deref(),
            config.as_deref(),
            ticks,
            &script,
            output.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
