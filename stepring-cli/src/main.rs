// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Stepring CLI - daily step tracking from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Show today's steps and goal progress
//! stepring
//!
//! # JSON output
//! stepring --format json --pretty
//!
//! # Replay a sensor script against the live tracker
//! stepring track --script walk.txt
//!
//! # Change the daily goal
//! stepring config set-goal 8000
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use stepring_store::{LogLevel, SettingsStore, default_settings_path};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, today, track};

// ============================================================================
// CLI Definition
// ============================================================================

/// Stepring CLI - daily step tracking.
#[derive(Parser)]
#[command(name = "stepring")]
#[command(about = "Daily step tracking CLI")]
#[command(long_about = r#"
Stepring keeps a running count of today's steps and reconciles it with a
motion sensor across app restarts, backgrounding and midnight.

Examples:
  stepring                        # Today's steps
  stepring --format json          # JSON output
  stepring track --script walk.txt
  stepring config set-goal 8000
"#)]
#[command(version)]
#[command(author = "Stepring Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'today' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Directory holding the step record (overrides settings).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Settings file to use instead of the default.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Settings file in effect.
    pub fn settings_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_settings_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show today's steps (default if no command specified).
    #[command(visible_alias = "t")]
    Today,

    /// Run the live tracker against a scripted sensor.
    Track(track::TrackArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("stepring=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("stepring={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = SettingsStore::load(cli.settings_path()).await;
    let level = match &settings {
        Ok(store) => store.get().await.log_level,
        Err(_) => LogLevel::default(),
    };
    setup_logging(cli.verbose, cli.quiet, level);

    let result = match settings {
        Ok(settings) => match &cli.command {
            Some(Commands::Today) | None => today::run(&settings, &cli).await,
            Some(Commands::Track(args)) => track::run(args, &settings, &cli).await,
            Some(Commands::Config(args)) => config::run(args, &settings, &cli).await,
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
