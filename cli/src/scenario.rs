//! Replay scenarios: a scripted analysis server plus a timed list of
//! editor and server events.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use vigil_diagnostics::{AnalysisServer, CheckFuture, CheckScope};
use vigil_types::{CheckError, DocumentId, EditorEvent, Finding, ServerEvent};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub server: ServerScript,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

/// What the scripted server answers for each check scope.
#[derive(Debug, Deserialize)]
pub struct ServerScript {
    #[serde(default = "default_running")]
    pub running: bool,
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default)]
    pub project: Vec<Finding>,
    #[serde(default)]
    pub documents: HashMap<DocumentId, Vec<Finding>>,
}

impl Default for ServerScript {
    fn default() -> Self {
        Self {
            running: default_running(),
            latency_ms: 0,
            project: Vec::new(),
            documents: HashMap::new(),
        }
    }
}

fn default_running() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Editor(EditorEvent),
    Server(ServerEvent),
    WaitMs(u64),
    SetRunning(bool),
}

pub struct ScriptedServer {
    running: AtomicBool,
    latency: Duration,
    project: Vec<Finding>,
    documents: HashMap<DocumentId, Vec<Finding>>,
}

impl ScriptedServer {
    pub fn new(script: ServerScript) -> Self {
        Self {
            running: AtomicBool::new(script.running),
            latency: Duration::from_millis(script.latency_ms),
            project: script.project,
            documents: script.documents,
        }
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }
}

impl AnalysisServer for ScriptedServer {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn check(&self, scope: CheckScope, token: CancellationToken) -> CheckFuture<'_> {
        Box::pin(async move {
            tracing::info!(?scope, "Scripted check");
            tokio::select! {
                () = token.cancelled() => return Err(CheckError::Cancelled),
                () = tokio::time::sleep(self.latency) => {}
            }
            if !self.is_running() {
                return Err(CheckError::NotRunning);
            }
            Ok(match scope {
                CheckScope::Project => self.project.clone(),
                CheckScope::Document(id) => self.documents.get(&id).cloned().unwrap_or_default(),
            })
        })
    }
}
