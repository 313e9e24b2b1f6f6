//! Today command - show the persisted step count.

use std::sync::Arc;

use anyhow::Result;
use stepring_core::SystemClock;
use stepring_store::SettingsStore;
use tracing::debug;

use crate::commands::open_daily_store;
use crate::output::{JsonFormatter, TextFormatter, TodayOutput};
use crate::{Cli, OutputFormat};

/// Runs the today command.
pub async fn run(settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let settings = settings.get().await;
    let store = open_daily_store(&settings, cli, Arc::new(SystemClock));
    debug!(key = store.key(), "Reading today's record");

    let record = store.get_or_init_today().await;
    let progress = settings.step_goal.progress(record.steps);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_today(&record, &progress));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&TodayOutput::new(&record, &progress))?);
        }
    }

    Ok(())
}
