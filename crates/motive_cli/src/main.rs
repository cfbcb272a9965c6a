//! Motive CLI
//!
//! Inspect what the animation engine produces without a host:
//! - `motive sequence <file.json>`: resolved per-property keyframes
//! - `motive spring`: spring easing duration, samples and native form
//! - `motive scroll`: scroll progress across a container

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ScrollArgs, SpringArgs};
use config::MotiveToml;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Inspect Motive animation sequences, springs and scroll timelines
#[derive(Parser, Debug)]
#[command(name = "motive")]
#[command(about = "Inspect Motive animation sequences, springs and scroll timelines")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./motive.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a sequence and print its definitions as JSON
    Sequence {
        /// JSON file holding a segment list, or `{ segments, options }`
        file: PathBuf,
    },

    /// Flatten a spring into an easing curve
    Spring {
        #[arg(long)]
        stiffness: Option<f64>,
        #[arg(long)]
        damping: Option<f64>,
        #[arg(long)]
        mass: Option<f64>,
        /// Target duration in seconds
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        bounce: Option<f64>,
        /// Initial velocity in units per second
        #[arg(long)]
        velocity: Option<f64>,
        /// Distance the spring travels
        #[arg(long, default_value = "100")]
        distance: f64,
    },

    /// Print scroll progress for evenly spaced scroll positions
    Scroll {
        /// Content length (scrollHeight)
        #[arg(long)]
        scroll_length: f64,
        /// Visible length (clientHeight)
        #[arg(long)]
        client_length: f64,
        /// Target offset inside the content
        #[arg(long)]
        target_offset: Option<f64>,
        /// Target length, the whole content by default
        #[arg(long)]
        target_length: Option<f64>,
        /// Breakpoints such as "start end", or one preset (enter, exit, any, all)
        #[arg(long, num_args = 1..)]
        offset: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let config = MotiveToml::load(cli.config.as_deref())?;

    let output = match cli.command {
        Command::Sequence { file } => commands::sequence(&config, &file)?,
        Command::Spring {
            stiffness,
            damping,
            mass,
            duration,
            bounce,
            velocity,
            distance,
        } => commands::spring(
            &config,
            &SpringArgs {
                stiffness,
                damping,
                mass,
                duration,
                bounce,
                velocity,
                distance,
            },
        )?,
        Command::Scroll {
            scroll_length,
            client_length,
            target_offset,
            target_length,
            offset,
        } => commands::scroll(
            &config,
            &ScrollArgs {
                scroll_length,
                client_length,
                target_offset,
                target_length,
                offset,
            },
        )?,
    };

    let text = if config.output.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
