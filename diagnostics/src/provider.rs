//! DiagnosticsProvider facade: the public entry point of the scheduler.
//!
//! Construction wires the gating policy and both debouncers to the server and
//! editor event sources. Exactly one handler is registered per source, so the
//! advisor has absorbed a server event before project validation reacts to it.

use std::sync::Arc;

use vigil_config::SettingsHandle;
use vigil_types::{AnalysisStatus, Document, EditorEvent, ServerEvent};

use crate::advisor::Advisor;
use crate::document::DocumentValidator;
use crate::events::{EventSource, Subscriptions};
use crate::project::ProjectValidator;
use crate::surface::{AnalysisServer, DiagnosticSurface, DocumentSelector};

pub struct DiagnosticsProvider {
    advisor: Arc<Advisor>,
    documents: DocumentValidator,
    projects: ProjectValidator,
    subscriptions: Subscriptions,
}

impl DiagnosticsProvider {
    /// Wire the scheduler and start listening.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        server: Arc<dyn AnalysisServer>,
        surface: Arc<dyn DiagnosticSurface>,
        settings: SettingsHandle,
        server_events: &EventSource<ServerEvent>,
        editor_events: &EventSource<EditorEvent>,
    ) -> Self {
        let advisor = Arc::new(Advisor::new(Arc::clone(&server), settings.clone()));
        let documents = DocumentValidator::new(
            Arc::clone(&server),
            Arc::clone(&surface),
            settings.clone(),
            Arc::clone(&advisor),
        );
        let projects = ProjectValidator::new(server, surface, settings.clone(), Arc::clone(&advisor));

        let mut subscriptions = Subscriptions::new();
        subscriptions.push(server_events.subscribe({
            let advisor = Arc::clone(&advisor);
            let projects = projects.clone();
            move |event| on_server_event(&advisor, &projects, &event)
        }));
        subscriptions.push(editor_events.subscribe({
            let documents = documents.clone();
            let projects = projects.clone();
            move |event| on_editor_event(&settings, &documents, &projects, event)
        }));

        tracing::info!(
            server_source = server_events.name(),
            editor_source = editor_events.name(),
            "Diagnostics provider started"
        );

        Self {
            advisor,
            documents,
            projects,
            subscriptions,
        }
    }

    #[must_use]
    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentValidator {
        &self.documents
    }

    #[must_use]
    pub fn projects(&self) -> &ProjectValidator {
        &self.projects
    }

    /// Release every subscription and cancel all pending validations.
    pub fn dispose(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        self.subscriptions.dispose();
        self.documents.cancel_all();
        self.projects.cancel();
        tracing::info!("Diagnostics provider disposed");
    }
}

impl Drop for DiagnosticsProvider {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn on_server_event(advisor: &Advisor, projects: &ProjectValidator, event: &ServerEvent) {
    advisor.handle_server_event(event);
    match event {
        ServerEvent::RestoreCompleted
        | ServerEvent::ProjectChanged(_)
        | ServerEvent::AnalysisStatus(AnalysisStatus::Finished) => projects.schedule(),
        ServerEvent::ProjectAdded(_)
        | ServerEvent::ProjectRemoved(_)
        | ServerEvent::RestoreStarted
        | ServerEvent::AnalysisStatus(AnalysisStatus::Started | AnalysisStatus::Progress) => {}
    }
}

fn on_editor_event(
    settings: &SettingsHandle,
    documents: &DocumentValidator,
    projects: &ProjectValidator,
    event: EditorEvent,
) {
    let selector = settings.read(DocumentSelector::from_settings);
    let eligible = |document: &Document| selector.matches(document);

    match event {
        EditorEvent::Opened(document) | EditorEvent::Changed(document)
            if eligible(&document) =>
        {
            documents.schedule(document.uri);
        }
        EditorEvent::WindowFocused {
            active: Some(document),
        } if eligible(&document) => documents.schedule(document.uri),
        EditorEvent::Closed(document) if eligible(&document) => {
            if documents.close(&document.uri) {
                projects.schedule();
            }
        }
        _ => {}
    }
}
