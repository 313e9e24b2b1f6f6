//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use stepring_core::StepGoal;
use stepring_store::{SettingsStore, default_config_dir};
use tracing::info;

use crate::commands::data_dir;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration and data paths.
    Path,

    /// Set the daily step goal.
    SetGoal {
        /// Steps per day.
        steps: u64,
    },

    /// Persist live counts whenever the sensor count is a multiple of N.
    ///
    /// 0 saves only when the app is backgrounded.
    SetPersistEvery {
        /// Modulus for throttled saves.
        every: u64,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(settings, cli).await,
        ConfigAction::Path => show_paths(settings, cli).await,
        ConfigAction::SetGoal { steps } => set_goal(*steps, settings).await,
        ConfigAction::SetPersistEvery { every } => set_persist_every(*every, settings).await,
        ConfigAction::Reset => reset_config(settings).await,
    }
}

async fn show_config(store: &SettingsStore, cli: &Cli) -> Result<()> {
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!(
                "{}",
                formatter.format_settings(&settings, store.path(), &data_dir(&settings, cli))
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

async fn show_paths(store: &SettingsStore, cli: &Cli) -> Result<()> {
    let settings = store.get().await;
    let config_dir = default_config_dir();
    let data_dir = data_dir(&settings, cli);

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", store.path().display());
            println!("Data dir:      {}", data_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": store.path().display().to_string(),
                "data_dir": data_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_goal(steps: u64, store: &SettingsStore) -> Result<()> {
    if steps == 0 {
        anyhow::bail!("Daily goal must be at least 1 step");
    }

    store.set_step_goal(StepGoal(steps)).await;
    store.save().await?;

    info!(goal = steps, "Daily goal updated");
    println!("Daily goal set to: {steps}");

    Ok(())
}

async fn set_persist_every(every: u64, store: &SettingsStore) -> Result<()> {
    store.set_persist_every(every).await;
    store.save().await?;

    info!(every, "Persist interval updated");
    if every == 0 {
        println!("Live counts will only be saved when backgrounded");
    } else {
        println!("Live counts will be saved every {every} sensor steps");
    }

    Ok(())
}

async fn reset_config(store: &SettingsStore) -> Result<()> {
    let path = store.path();

    if tokio::fs::try_exists(path).await? {
        tokio::fs::remove_file(path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
