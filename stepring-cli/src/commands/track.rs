//! Track command - replay a sensor script against the live tracker.
//!
//! A script is one command per line; `#` starts a comment.
//!
//! ```text
//! steps 120        # walk 120 steps
//! background       # app leaves the foreground (flushes)
//! advance 14       # 14 hours pass
//! foreground       # app returns (resets after midnight, resyncs)
//! deny | allow     # permission answer for the next sync
//! unavailable | available
//! history 4200     # sensor reports 4200 steps so far today
//! wait 250         # sleep 250ms
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use stepring_core::{ManualClock, PermissionStatus, StepGoal, StepSnapshot};
use stepring_store::{DailyCounterStore, MemoryKeyValueStore, SettingsStore};
use stepring_tracker::{AppLifecycle, ChannelSensor, StepTracker, TrackerConfig};
use tokio::io::AsyncReadExt;
use tokio::sync::watch;
use tokio::time::{Duration, timeout};
use tracing::{info, warn};

use crate::commands::open_daily_store;
use crate::output::{JsonFormatter, TextFormatter, TrackOutput};
use crate::{Cli, OutputFormat};

/// How long to wait for the tracker to publish a delivered event.
const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Arguments for the track command.
#[derive(Args)]
pub struct TrackArgs {
    /// Script file, or `-` for stdin.
    #[arg(long, short, default_value = "-")]
    pub script: PathBuf,

    /// Keep the record in memory instead of the data directory.
    #[arg(long)]
    pub memory: bool,
}

// ============================================================================
// Script
// ============================================================================

/// One script instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Walk this many steps.
    Steps(u64),
    /// Lifecycle transition.
    Lifecycle(AppLifecycle),
    /// Move the clock forward by this many hours.
    Advance(i64),
    /// Answer future permission requests.
    Permission(PermissionStatus),
    /// Report the sensor as present or absent.
    Available(bool),
    /// Enable same-day history with this total.
    History(u64),
    /// Sleep this many milliseconds.
    Wait(u64),
}

impl FromStr for ScriptCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().ok_or("empty command")?;
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected argument: {extra}"));
        }

        let number = |name: &str| -> Result<u64, String> {
            let raw = arg.ok_or_else(|| format!("{name} needs a number"))?;
            raw.parse()
                .map_err(|_| format!("{name}: not a whole number: {raw}"))
        };
        let no_arg = |command: ScriptCommand| match arg {
            Some(extra) => Err(format!("unexpected argument: {extra}")),
            None => Ok(command),
        };

        match verb.to_lowercase().as_str() {
            "steps" | "walk" => number("steps").map(ScriptCommand::Steps),
            "advance" => {
                let hours = number("advance")?;
                i64::try_from(hours)
                    .map(ScriptCommand::Advance)
                    .map_err(|_| format!("advance: too large: {hours}"))
            }
            "deny" => no_arg(ScriptCommand::Permission(PermissionStatus::Denied)),
            "allow" => no_arg(ScriptCommand::Permission(PermissionStatus::Granted)),
            "unavailable" => no_arg(ScriptCommand::Available(false)),
            "available" => no_arg(ScriptCommand::Available(true)),
            "history" => number("history").map(ScriptCommand::History),
            "wait" => number("wait").map(ScriptCommand::Wait),
            other => match other.parse::<AppLifecycle>() {
                Ok(state) => no_arg(ScriptCommand::Lifecycle(state)),
                Err(_) => Err(format!("unknown command: {verb}")),
            },
        }
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCommand::Steps(n) => write!(f, "steps {n}"),
            ScriptCommand::Lifecycle(state) => write!(f, "{state}"),
            ScriptCommand::Advance(hours) => write!(f, "advance {hours}"),
            ScriptCommand::Permission(PermissionStatus::Granted) => write!(f, "allow"),
            ScriptCommand::Permission(_) => write!(f, "deny"),
            ScriptCommand::Available(true) => write!(f, "available"),
            ScriptCommand::Available(false) => write!(f, "unavailable"),
            ScriptCommand::History(n) => write!(f, "history {n}"),
            ScriptCommand::Wait(ms) => write!(f, "wait {ms}"),
        }
    }
}

/// Parses a script into `(line number, command)` pairs.
pub fn parse_script(source: &str) -> Result<Vec<(usize, ScriptCommand)>> {
    let mut commands = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let command = line
            .parse()
            .map_err(|e: String| anyhow::anyhow!("line {}: {e}", index + 1))?;
        commands.push((index + 1, command));
    }
    Ok(commands)
}

async fn read_script(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        tokio::io::stdin()
            .read_to_string(&mut source)
            .await
            .context("Failed to read script from stdin")?;
        Ok(source)
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display()))
    }
}

// ============================================================================
// Replay
// ============================================================================

struct Printer {
    format: OutputFormat,
    text: TextFormatter,
    json: JsonFormatter,
    goal: StepGoal,
}

impl Printer {
    fn print(&self, line: Option<usize>, label: &str, snapshot: &StepSnapshot) -> Result<()> {
        let progress = self.goal.progress(snapshot.steps);
        match self.format {
            OutputFormat::Text => {
                let label = match line {
                    Some(line) => format!("{line:>3}: {label}"),
                    None => format!("   {label}"),
                };
                println!("{}", self.text.format_snapshot(&label, snapshot, &progress));
            }
            OutputFormat::Json => {
                let output = TrackOutput::new(line, label, snapshot, &progress);
                println!("{}", self.json.format(&output)?);
            }
        }
        Ok(())
    }
}

/// Runs the track command.
pub async fn run(args: &TrackArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let script = parse_script(&read_script(&args.script).await?)?;
    let settings = settings.get().await;

    let clock = Arc::new(ManualClock::starting_now());
    let store = if args.memory {
        DailyCounterStore::with_key(
            Arc::new(MemoryKeyValueStore::new()),
            clock.clone(),
            settings.storage_key.clone(),
        )
    } else {
        open_daily_store(&settings, cli, clock.clone())
    };
    let sensor = Arc::new(ChannelSensor::new());
    let tracker = StepTracker::new(sensor.clone(), store, TrackerConfig::from(&settings));

    let printer = Printer {
        format: cli.format,
        text: TextFormatter::new(!cli.no_color),
        // One object per line
        json: JsonFormatter::new(false),
        goal: settings.step_goal,
    };

    info!(commands = script.len(), "Replaying sensor script");
    tracker.activate().await;
    printer.print(None, "activate", &tracker.snapshot())?;

    let mut rx = tracker.subscribe();
    for (line, command) in script {
        apply(command, &tracker, &sensor, &clock, &mut rx).await;
        printer.print(Some(line), &command.to_string(), &tracker.snapshot())?;
    }

    // The session ends the way the app would leave it.
    tracker.handle_lifecycle(AppLifecycle::Background).await;
    tracker.shutdown().await;
    Ok(())
}

async fn apply(
    command: ScriptCommand,
    tracker: &Arc<StepTracker>,
    sensor: &ChannelSensor,
    clock: &ManualClock,
    rx: &mut watch::Receiver<StepSnapshot>,
) {
    match command {
        ScriptCommand::Steps(steps) => {
            rx.borrow_and_update();
            if sensor.walk(steps) > 0 && timeout(EVENT_TIMEOUT, rx.changed()).await.is_err() {
                warn!(steps, "Tracker did not publish the step event in time");
            }
        }
        ScriptCommand::Lifecycle(state) => tracker.handle_lifecycle(state).await,
        ScriptCommand::Advance(hours) => clock.advance(chrono::Duration::hours(hours)),
        ScriptCommand::Permission(status) => sensor.set_permission(status),
        ScriptCommand::Available(available) => sensor.set_available(available),
        ScriptCommand::History(total) => sensor.set_history(total),
        ScriptCommand::Wait(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
    }
}
