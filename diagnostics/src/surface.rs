//! Boundaries to the external collaborators: the analysis server and the
//! editor's diagnostic display surface.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use vigil_config::ValidationSettings;
use vigil_types::{CheckError, DisplayedDiagnostic, Document, DocumentId, Finding};

/// Check request future type alias.
pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Finding>, CheckError>> + Send + 'a>>;

/// What a check request covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckScope {
    Document(DocumentId),
    Project,
}

/// The external language-analysis server.
pub trait AnalysisServer: Send + Sync {
    fn is_running(&self) -> bool;

    /// Run analyzers over `scope`. Implementations should stop early and
    /// return [`CheckError::Cancelled`] once `token` is cancelled.
    fn check(&self, scope: CheckScope, token: CancellationToken) -> CheckFuture<'_>;
}

/// One entry of an atomic bulk update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEntry {
    Clear(DocumentId),
    Replace(DocumentId, Vec<DisplayedDiagnostic>),
}

/// Per-file diagnostic store rendered by the editor.
///
/// Only completed, non-superseded validations write here.
pub trait DiagnosticSurface: Send + Sync {
    fn get(&self, id: &DocumentId) -> Option<Vec<DisplayedDiagnostic>>;

    /// Replace the whole list held for `id`.
    fn set(&self, id: DocumentId, diagnostics: Vec<DisplayedDiagnostic>);

    /// Returns whether an entry was present.
    fn delete(&self, id: &DocumentId) -> bool;

    /// Apply all entries, in order, as one update.
    fn apply_batch(&self, batch: Vec<BatchEntry>);

    fn identities(&self) -> Vec<DocumentId>;
}

/// Which editor documents are eligible for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSelector {
    language_id: String,
    /// Lowercased; URI schemes are case-insensitive.
    virtual_scheme_prefix: Option<String>,
}

impl DocumentSelector {
    const FILE_SCHEME: &'static str = "file";

    #[must_use]
    pub fn new(language_id: impl Into<String>, virtual_scheme_prefix: Option<&str>) -> Self {
        Self {
            language_id: language_id.into(),
            virtual_scheme_prefix: virtual_scheme_prefix.map(str::to_ascii_lowercase),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &ValidationSettings) -> Self {
        Self::new(settings.language_id(), settings.virtual_scheme_prefix())
    }

    /// Target language, stored as a real file or an accepted virtual document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        if document.language_id != self.language_id {
            return false;
        }
        let scheme = document.uri.scheme();
        scheme == Self::FILE_SCHEME
            || self
                .virtual_scheme_prefix
                .as_deref()
                .is_some_and(|prefix| scheme.to_ascii_lowercase().starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(uri: &str, language_id: &str) -> Document {
        Document::new(DocumentId::parse(uri).unwrap(), language_id)
    }

    #[test]
    fn test_selector_accepts_files_of_target_language() {
        let selector = DocumentSelector::new("csharp", None);
        assert!(selector.matches(&doc("file:///src/a.cs", "csharp")));
        assert!(!selector.matches(&doc("file:///src/a.fs", "fsharp")));
    }

    #[test]
    fn test_selector_rejects_other_schemes() {
        let selector = DocumentSelector::new("csharp", None);
        assert!(!selector.matches(&doc("untitled:Untitled-1", "csharp")));
        assert!(!selector.matches(&doc("git:/src/a.cs", "csharp")));
    }

    #[test]
    fn test_selector_accepts_virtual_documents() {
        let selector = DocumentSelector::new("csharp", Some("virtualCSharp-"));
        assert!(selector.matches(&doc(
            "virtualCSharp-razor:///Pages/Index.cshtml",
            "csharp"
        )));
        assert!(!selector.matches(&doc("virtualHtml-razor:///Pages/Index.cshtml", "csharp")));
    }

    #[test]
    fn test_selector_from_default_settings() {
        let selector = DocumentSelector::from_settings(&ValidationSettings::default());
        assert!(selector.matches(&doc("file:///a.cs", "csharp")));
        assert!(selector.matches(&doc("virtualcsharp-x:///a.cs", "csharp")));
    }
}
