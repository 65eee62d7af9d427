//! Debounced, gated validation of a project under active editing.
//!
//! Raw findings from an external analysis server are classified, merged and
//! written to a per-file display surface. Work is throttled by a gating
//! policy ([`Advisor`]) and coalesced per document and per project.

pub mod classify;
pub mod events;
pub mod merge;
pub mod surface;

mod advisor;
mod document;
mod pending;
mod project;
mod provider;
mod store;

pub use advisor::Advisor;
pub use classify::{Classification, DisplayOptions, Severity, classify};
pub use document::DocumentValidator;
pub use events::{EventSource, Subscription, Subscriptions};
pub use merge::MergePlan;
pub use pending::ValidationPhase;
pub use project::ProjectValidator;
pub use provider::DiagnosticsProvider;
pub use store::DiagnosticCollection;
pub use surface::{
    AnalysisServer, BatchEntry, CheckFuture, CheckScope, DiagnosticSurface, DocumentSelector,
};
