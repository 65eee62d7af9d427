//! Core domain types for Vigil.
//!
//! Pure data shared by every layer: analyzer findings as received from the
//! analysis server, the events that drive validation, and the diagnostics
//! handed to the display surface. No IO, no async.

#![allow(clippy::missing_errors_doc)]

mod diagnostic;
mod document;
mod error;
mod event;
mod finding;

pub use diagnostic::{DiagnosticSeverity, DiagnosticsSnapshot, DisplayedDiagnostic};
pub use document::{Document, DocumentId, PathToUriError};
pub use error::CheckError;
pub use event::{AnalysisStatus, EditorEvent, ProjectDescriptor, ProjectInfo, ServerEvent};
pub use finding::{Finding, Position, TextRange};
