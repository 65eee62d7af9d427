//! Per-scope validation state machine.
//!
//! A scope with no [`PendingValidation`] entry is idle. Otherwise the entry
//! moves `Scheduled -> Fetching -> Completed`, or to `Cancelled` from either
//! live phase. Terminal phases never change again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vigil_types::Finding;

use crate::surface::{AnalysisServer, CheckScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPhase {
    /// Waiting for the debounce delay to elapse.
    Scheduled,
    /// Check request in flight.
    Fetching,
    Completed,
    Cancelled,
}

impl ValidationPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Scheduled,
            1 => Self::Fetching,
            2 => Self::Completed,
            _ => Self::Cancelled,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Scheduled => 0,
            Self::Fetching => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Debug, Clone)]
struct PhaseCell(Arc<AtomicU8>);

impl PhaseCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(ValidationPhase::Scheduled.as_u8())))
    }

    fn get(&self) -> ValidationPhase {
        ValidationPhase::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Move `from -> to`; fails if the phase has moved on in between.
    fn advance(&self, from: ValidationPhase, to: ValidationPhase) -> bool {
        self.0
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn cancel(&self) {
        let _ = self.0.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |value| {
            (!ValidationPhase::from_u8(value).is_terminal())
                .then_some(ValidationPhase::Cancelled.as_u8())
        });
    }
}

/// The owner's side of a live validation, stored per scope.
#[derive(Debug)]
pub(crate) struct PendingValidation {
    generation: u64,
    token: CancellationToken,
    phase: PhaseCell,
}

/// The spawned task's side of the same validation.
#[derive(Debug)]
pub(crate) struct ValidationTicket {
    generation: u64,
    token: CancellationToken,
    phase: PhaseCell,
}

impl PendingValidation {
    pub(crate) fn new(generation: u64) -> (Self, ValidationTicket) {
        let token = CancellationToken::new();
        let phase = PhaseCell::new();
        let ticket = ValidationTicket {
            generation,
            token: token.clone(),
            phase: phase.clone(),
        };
        (
            Self {
                generation,
                token,
                phase,
            },
            ticket,
        )
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn phase(&self) -> ValidationPhase {
        self.phase.get()
    }

    pub(crate) fn cancel(&self) {
        self.phase.cancel();
        self.token.cancel();
    }
}

impl ValidationTicket {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Checked by the owner, under its lock, right before writing results.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn complete(&self) {
        self.phase
            .advance(ValidationPhase::Fetching, ValidationPhase::Completed);
    }

    /// Wait out `delay`, then ask the server for findings in `scope`.
    ///
    /// `None` when cancelled or when the check failed; failures are
    /// swallowed here and leave the displayed diagnostics untouched.
    pub(crate) async fn fetch(
        &self,
        delay: Duration,
        server: &dyn AnalysisServer,
        scope: CheckScope,
    ) -> Option<Vec<Finding>> {
        tokio::select! {
            () = self.token.cancelled() => return None,
            () = tokio::time::sleep(delay) => {}
        }

        if !self
            .phase
            .advance(ValidationPhase::Scheduled, ValidationPhase::Fetching)
        {
            return None;
        }

        match server.check(scope.clone(), self.token.clone()).await {
            Ok(findings) => Some(findings),
            Err(e) if e.is_cancelled() => {
                tracing::trace!(?scope, "Check cancelled");
                None
            }
            Err(e) => {
                tracing::debug!(?scope, error = %e, "Check failed; keeping previous diagnostics");
                None
            }
        }
    }
}
