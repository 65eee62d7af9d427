//! Per-project debouncer.
//!
//! Unlike documents, a project validation is not restarted by later
//! triggers: while one is pending, new triggers are ignored. Bursty project
//! events (restore, reloads, analysis progress) would otherwise keep pushing
//! the check out indefinitely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vigil_config::{SettingsHandle, ValidationSettings};

use crate::advisor::Advisor;
use crate::classify::DisplayOptions;
use crate::merge::MergePlan;
use crate::pending::{PendingValidation, ValidationPhase, ValidationTicket};
use crate::surface::{AnalysisServer, CheckScope, DiagnosticSurface};

#[derive(Clone)]
pub struct ProjectValidator {
    inner: Arc<Inner>,
}

struct Inner {
    server: Arc<dyn AnalysisServer>,
    surface: Arc<dyn DiagnosticSurface>,
    settings: SettingsHandle,
    advisor: Arc<Advisor>,
    pending: Mutex<Option<PendingValidation>>,
    next_generation: AtomicU64,
}

impl ProjectValidator {
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
                pending: Mutex::new(None),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Schedule a whole-project validation unless one is already pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) {
        if !self.inner.advisor.should_validate_project() {
            tracing::trace!("Project validation gated off");
            return;
        }

        let mut pending = self.inner.lock_pending();
        if let Some(current) = pending.as_ref() {
            tracing::trace!(phase = ?current.phase(), "Project validation already pending");
            return;
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (validation, ticket) = PendingValidation::new(generation);
        *pending = Some(validation);
        drop(pending);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.validate(ticket).await });
    }

    pub fn cancel(&self) {
        if let Some(validation) = self.inner.lock_pending().take() {
            tracing::trace!("Cancelling project validation");
            validation.cancel();
        }
    }

    /// Phase of the live project validation; `None` when idle.
    #[must_use]
    pub fn phase(&self) -> Option<ValidationPhase> {
        self.inner.lock_pending().as_ref().map(PendingValidation::phase)
    }
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingValidation>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn validate(self: Arc<Self>, ticket: ValidationTicket) {
        let delay = self.settings.read(ValidationSettings::project_delay);
        let findings = ticket
            .fetch(delay, self.server.as_ref(), CheckScope::Project)
            .await;
        let plan = findings.map(|findings| {
            let options = self.settings.read(DisplayOptions::from_settings);
            MergePlan::build(findings, &options)
        });

        let mut pending = self.lock_pending();
        if ticket.is_cancelled() {
            tracing::trace!("Discarding cancelled project validation");
            return;
        }
        if let Some(plan) = plan {
            let batch = plan.into_batch(&self.surface.identities());
            tracing::debug!(entries = batch.len(), "Applying project diagnostics");
            self.surface.apply_batch(batch);
            ticket.complete();
        }
        if pending
            .as_ref()
            .is_some_and(|validation| validation.generation() == ticket.generation())
        {
            *pending = None;
        }
    }
}
