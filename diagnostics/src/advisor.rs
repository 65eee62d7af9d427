//! Gating policy: decides whether validation work may be scheduled at all.
//!
//! State is owned here and mutated only by server notifications routed
//! through [`Advisor::handle_server_event`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use vigil_config::{SettingsHandle, ValidationSettings};
use vigil_types::{ProjectDescriptor, ServerEvent};

use crate::surface::AnalysisServer;

pub struct Advisor {
    server: Arc<dyn AnalysisServer>,
    settings: SettingsHandle,
    /// Outstanding package restores. Unmatched completions may drive this
    /// below zero; only a positive value means "restoring".
    restore_count: AtomicI64,
    /// Source file count per project path.
    project_file_counts: Mutex<HashMap<String, usize>>,
}

impl Advisor {
    #[must_use]
    pub fn new(server: Arc<dyn AnalysisServer>, settings: SettingsHandle) -> Self {
        Self {
            server,
            settings,
            restore_count: AtomicI64::new(0),
            project_file_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Server running and no package restore in progress.
    #[must_use]
    pub fn should_validate_files(&self) -> bool {
        self.server.is_running() && !self.is_restoring_packages()
    }

    /// As [`Self::should_validate_files`], and the tracked projects stay
    /// within the configured source file limit.
    #[must_use]
    pub fn should_validate_project(&self) -> bool {
        self.should_validate_files() && !self.is_over_file_limit()
    }

    pub(crate) fn handle_server_event(&self, event: &ServerEvent) {
        match event {
            ServerEvent::ProjectAdded(project) | ServerEvent::ProjectChanged(project) => {
                self.record_project(project);
            }
            ServerEvent::ProjectRemoved(project) => self.forget_project(project),
            ServerEvent::RestoreStarted => {
                let count = self.restore_count.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(outstanding = count, "Package restore started");
            }
            ServerEvent::RestoreCompleted => {
                let count = self.restore_count.fetch_sub(1, Ordering::SeqCst) - 1;
                tracing::debug!(outstanding = count, "Package restore completed");
            }
            ServerEvent::AnalysisStatus(_) => {}
        }
    }

    fn is_restoring_packages(&self) -> bool {
        self.restore_count.load(Ordering::SeqCst) > 0
    }

    fn is_over_file_limit(&self) -> bool {
        let limit = self.settings.read(ValidationSettings::max_project_file_count);
        if limit <= 0 {
            return false;
        }
        let limit = limit.unsigned_abs();
        let counts = self
            .project_file_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut total: u64 = 0;
        for &count in counts.values() {
            total = total.saturating_add(count as u64);
            if total > limit {
                return true;
            }
        }
        false
    }

    fn record_project(&self, project: &ProjectDescriptor) {
        let Some(info) = project.primary() else {
            return;
        };
        let count = info.source_file_count();
        tracing::trace!(project = %info.path, files = count, "Tracking project source files");
        self.project_file_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(info.path.clone(), count);
    }

    fn forget_project(&self, project: &ProjectDescriptor) {
        let Some(info) = project.primary() else {
            return;
        };
        self.project_file_counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&info.path);
    }
}
