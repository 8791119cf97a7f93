//! CLI entry point for atomseq.
//!
//! Compiles shot timelines ahead of time and writes them out for the
//! external player; nothing here touches hardware.
//!
//! # Usage
//!
//! Compile the demonstration shot against a timing config:
//! ```bash
//! atomseq compile --config timing.toml --output timeline.json
//! ```
//!
//! Validate a config file, or print the default template:
//! ```bash
//! atomseq check-config timing.toml
//! atomseq print-config
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use seq_bin::compile_demo_shot;
use seq_core::{SequencerConfig, ShutterSet};

#[derive(Parser)]
#[command(name = "atomseq")]
#[command(about = "Compile cold-atom shot timelines ahead of time", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the demonstration shot and emit the event timeline as JSON
    Compile {
        /// Timing configuration file (defaults plus ATOMSEQ_* overrides)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the timeline here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Imaging shutter paths, e.g. "ta,repump,img_xy"
        #[arg(long, default_value = "ta,repump,img_xy,img_z")]
        imaging: String,
    },

    /// Load and validate a timing configuration file
    CheckConfig {
        /// Path to the TOML configuration
        config: PathBuf,
    },

    /// Print the default configuration as a TOML template
    PrintConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compile {
            config,
            output,
            imaging,
        } => compile(config, output, &imaging),
        Commands::CheckConfig { config } => check_config(config),
        Commands::PrintConfig => {
            print!("{}", SequencerConfig::default_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SequencerConfig> {
    match path {
        Some(path) => SequencerConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(SequencerConfig::default()),
    }
}

fn compile(config: Option<PathBuf>, output: Option<PathBuf>, imaging: &str) -> Result<()> {
    let config = load_config(config.as_ref())?;
    let imaging = ShutterSet::parse_list(imaging).context("invalid --imaging shutter list")?;
    let timeline = compile_demo_shot(&config, imaging)?;
    info!(events = timeline.len(), "Timeline compiled");

    let json = serde_json::to_string_pretty(&timeline)?;
    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("failed to write timeline to {}", path.display()))?;
            println!("Wrote {} events to {}", timeline.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn check_config(path: PathBuf) -> Result<()> {
    let config = SequencerConfig::load(&path)
        .with_context(|| format!("config {} failed validation", path.display()))?;
    println!(
        "OK: min_dwell_open={} s, min_dwell_closed={} s, coil_flip_duration={} s",
        config.timing.min_dwell_open, config.timing.min_dwell_closed, config.timing.coil_flip_duration
    );
    Ok(())
}
