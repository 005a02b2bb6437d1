//! trackmap - create, edit and replay indoor tracking maps
//!
//! Usage:
//!   trackmap new [-o FILE]                 Write an empty map
//!   trackmap migrate <map> [-o FILE]       Upgrade a map to the current version
//!   trackmap apply <map> <script> [...]    Apply an edit script
//!   trackmap replay <map> <feed> [...]     Replay a recorded live feed
//!   trackmap zone <map> <x> <y>            Print the zone containing a point
//!
//! Logs go to stderr, filtered by `RUST_LOG` (e.g. `RUST_LOG=trackmap=debug`).

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cli::{cmd_apply, cmd_migrate, cmd_new, cmd_replay, cmd_zone, ApplyArgs, ReplayArgs};

#[derive(Parser)]
#[command(name = "trackmap", version, about = "Indoor tracking map tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an empty map.
    New {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upgrade a map file to the current version.
    Migrate {
        map: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply a YAML or JSON edit script to a map.
    Apply(ApplyArgs),
    /// Replay a recorded live feed against a map, one JSON line per frame.
    Replay(ReplayArgs),
    /// Print the ID of the zone containing a map point.
    Zone { map: PathBuf, x: f64, y: f64 },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::New { output } => cmd_new(output.as_deref()),
        Commands::Migrate { map, output } => cmd_migrate(&map, output.as_deref()),
        Commands::Apply(args) => cmd_apply(&args),
        Commands::Replay(args) => cmd_replay(&args),
        Commands::Zone { map, x, y } => cmd_zone(&map, x, y),
    }
}
