//! Vigil CLI - replays a recorded editing session against the validation
//! scheduler and prints the resulting diagnostics.
//!
//! ```text
//! vigil replay <scenario.json> [--config <path>]
//! ```
//!
//! The scenario drives a scripted analysis server and a timed sequence of
//! editor and server events. Once every step has run, the command waits
//! out both debounce windows, then prints one line per diagnostic and a
//! final `E:n W:n` status line.

mod scenario;

use std::{
    env,
    fs::{self, OpenOptions},
    io,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vigil_config::{SettingsHandle, ValidationSettings};
use vigil_diagnostics::{DiagnosticCollection, DiagnosticsProvider, EventSource};
use vigil_types::{DiagnosticsSnapshot, EditorEvent, ServerEvent};

use scenario::{Scenario, ScriptedServer, Step};

const USAGE: &str = "usage: vigil replay <scenario.json> [--config <path>]";

/// Slack after the longest debounce window so in-flight checks can land.
const DRAIN_SLACK: Duration = Duration::from_millis(250);

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Replay {
        scenario: PathBuf,
        config: Option<PathBuf>,
    },
    Help,
}

impl Command {
    fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        match args.next().as_deref() {
            Some("replay") => {}
            Some("-h" | "--help" | "help") | None => return Ok(Self::Help),
            Some(other) => bail!("unknown command `{other}`\n{USAGE}"),
        }

        let mut scenario = None;
        let mut config = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let Some(path) = args.next() else {
                        bail!("--config needs a path\n{USAGE}");
                    };
                    config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => bail!("unknown flag `{flag}`\n{USAGE}"),
                _ if scenario.is_some() => bail!("unexpected argument `{arg}`\n{USAGE}"),
                _ => scenario = Some(PathBuf::from(arg)),
            }
        }

        let Some(scenario) = scenario else {
            bail!("missing scenario path\n{USAGE}");
        };
        Ok(Self::Replay { scenario, config })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_vigil_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Stdout carries the report, so logs fall back to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_vigil_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in vigil_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn vigil_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: <data_local_dir>/vigil/vigil.log
    if let Some(data_dir) = dirs::data_local_dir() {
        candidates.push(data_dir.join("vigil").join("vigil.log"));
    }

    // Fallback: ./.vigil/vigil.log
    candidates.push(PathBuf::from(".vigil").join("vigil.log"));

    candidates
}

fn load_settings(path: Option<PathBuf>) -> Result<ValidationSettings> {
    match path.or_else(vigil_config::default_config_path) {
        Some(path) => Ok(vigil_config::load(&path)?),
        None => {
            tracing::debug!("No config directory, using default settings");
            Ok(ValidationSettings::default())
        }
    }
}

async fn replay(scenario: Scenario, settings: ValidationSettings) -> DiagnosticsSnapshot {
    let drain = settings.document_delay().max(settings.project_delay())
        + Duration::from_millis(scenario.server.latency_ms)
        + DRAIN_SLACK;

    let server = Arc::new(ScriptedServer::new(scenario.server));
    let surface = Arc::new(DiagnosticCollection::new());
    let server_events = EventSource::<ServerEvent>::new("server");
    let editor_events = EventSource::<EditorEvent>::new("editor");

    let provider = DiagnosticsProvider::start(
        server.clone(),
        surface.clone(),
        SettingsHandle::new(settings),
        &server_events,
        &editor_events,
    );

    for (index, step) in scenario.steps.into_iter().enumerate() {
        tracing::debug!(index, ?step, "Replaying step");
        match step {
            Step::Editor(event) => {
                editor_events.emit(event);
            }
            Step::Server(event) => {
                server_events.emit(event);
            }
            Step::WaitMs(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Step::SetRunning(running) => server.set_running(running),
        }
        // Let the handlers observe the event before the next step.
        tokio::task::yield_now().await;
    }

    tokio::time::sleep(drain).await;
    provider.dispose();
    surface.snapshot()
}

fn print_report(snapshot: &DiagnosticsSnapshot) {
    for (id, diagnostics) in snapshot.files() {
        for diagnostic in diagnostics {
            println!("{}", diagnostic.display_with_id(id));
        }
    }
    println!("{}", snapshot.status_string());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (scenario_path, config_path) = match Command::parse(env::args().skip(1))? {
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
        Command::Replay { scenario, config } => (scenario, config),
    };

    init_tracing();

    let settings = load_settings(config_path).context("failed to load settings")?;
    let scenario = Scenario::load(&scenario_path)?;
    tracing::info!(
        path = %scenario_path.display(),
        steps = scenario.steps.len(),
        "Replaying scenario"
    );

    let snapshot = replay(scenario, settings).await;
    print_report(&snapshot);
    Ok(())
}
