//! Per-document debouncer.
//!
//! Every edit restarts the delay for its document: the previous pending
//! validation is cancelled before the gating policy is even consulted, so
//! a denied trigger also drops stale work.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vigil_config::{SettingsHandle, ValidationSettings};
use vigil_types::DocumentId;

use crate::advisor::Advisor;
use crate::classify::{DisplayOptions, to_displayed};
use crate::pending::{PendingValidation, ValidationPhase, ValidationTicket};
use crate::surface::{AnalysisServer, CheckScope, DiagnosticSurface};

#[derive(Clone)]
pub struct DocumentValidator {
    inner: Arc<Inner>,
}

struct Inner {
    server: Arc<dyn AnalysisServer>,
    surface: Arc<dyn DiagnosticSurface>,
    settings: SettingsHandle,
    advisor: Arc<Advisor>,
    pending: Mutex<HashMap<DocumentId, PendingValidation>>,
    next_generation: AtomicU64,
}

impl DocumentValidator {
    #[must_use]
    pub fn new(
        server: Arc<dyn AnalysisServer>,
        surface: Arc<dyn DiagnosticSurface>,
        settings: SettingsHandle,
        advisor: Arc<Advisor>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                server,
                surface,
                settings,
                advisor,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// (Re)start the debounced validation of `id`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, id: DocumentId) {
        let mut pending = self.inner.lock_pending();
        if let Some(previous) = pending.remove(&id) {
            tracing::trace!(document = %id, "Superseding pending validation");
            previous.cancel();
        }

        if !self.inner.advisor.should_validate_files() {
            tracing::trace!(document = %id, "File validation gated off");
            return;
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (validation, ticket) = PendingValidation::new(generation);
        pending.insert(id.clone(), validation);
        drop(pending);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.validate(id, ticket).await });
    }

    /// Drop pending work and displayed diagnostics for a closed document.
    ///
    /// Returns whether anything changed, in which case the caller should
    /// revalidate the project.
    pub fn close(&self, id: &DocumentId) -> bool {
        let cancelled = {
            let mut pending = self.inner.lock_pending();
            pending.remove(id).map(|validation| validation.cancel()).is_some()
        };
        let cleared = self.inner.surface.delete(id);
        tracing::debug!(document = %id, cancelled, cleared, "Document closed");
        cancelled || cleared
    }

    pub fn cancel_all(&self) {
        let mut pending = self.inner.lock_pending();
        for (_, validation) in pending.drain() {
            validation.cancel();
        }
    }

    /// Phase of the live validation for `id`; `None` when idle.
    #[must_use]
    pub fn phase(&self, id: &DocumentId) -> Option<ValidationPhase> {
        self.inner.lock_pending().get(id).map(PendingValidation::phase)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock_pending().len()
    }
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, HashMap<DocumentId, PendingValidation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn validate(self: Arc<Self>, id: DocumentId, ticket: ValidationTicket) {
        let delay = self.settings.read(ValidationSettings::document_delay);
        let findings = ticket
            .fetch(delay, self.server.as_ref(), CheckScope::Document(id.clone()))
            .await;
        let options = self.settings.read(DisplayOptions::from_settings);

        // Hold the pending lock across the write: a concurrent supersede or
        // close cannot slip between the cancellation check and the write.
        let mut pending = self.lock_pending();
        if ticket.is_cancelled() {
            tracing::trace!(document = %id, "Discarding superseded validation");
            return;
        }
        if let Some(findings) = findings {
            if findings.is_empty() {
                self.surface.delete(&id);
            } else {
                let diagnostics: Vec<_> = findings
                    .iter()
                    .filter_map(|finding| to_displayed(finding, &options))
                    .collect();
                tracing::debug!(document = %id, count = diagnostics.len(), "Diagnostics updated");
                self.surface.set(id.clone(), diagnostics);
            }
            ticket.complete();
        }
        if pending
            .get(&id)
            .is_some_and(|validation| validation.generation() == ticket.generation())
        {
            pending.remove(&id);
        }
    }
}
