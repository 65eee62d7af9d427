//! Diagnostics as handed to the display surface.

use crate::document::DocumentId;
use crate::finding::TextRange;

/// Display severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl DiagnosticSeverity {
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "info",
            Self::Hint => "hint",
        }
    }
}

/// A classified finding, ready for display.
///
/// Fields are private; external consumers read via accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedDiagnostic {
    severity: DiagnosticSeverity,
    /// Finding text with the contributing project labels appended.
    message: String,
    range: TextRange,
    /// Analyzer identifier of the originating finding.
    code: String,
    /// Label of the diagnostic producer (e.g. "csharp").
    source: String,
    /// Rendered faded as unnecessary code.
    fade_out: bool,
}

impl DisplayedDiagnostic {
    #[must_use]
    pub fn new(
        severity: DiagnosticSeverity,
        message: String,
        range: TextRange,
        code: String,
        source: String,
        fade_out: bool,
    ) -> Self {
        Self {
            severity,
            message,
            range,
            code,
            source,
            fade_out,
        }
    }

    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn fade_out(&self) -> bool {
        self.fade_out
    }

    /// Format as `file:line:col: severity: [code] message` (1-indexed for display).
    #[must_use]
    pub fn display_with_id(&self, id: &DocumentId) -> String {
        format!(
            "{}:{}:{}: {}: [{}] {}",
            id.display_name(),
            self.range.start.line + 1,
            self.range.start.column + 1,
            self.severity.label(),
            self.code,
            self.message,
        )
    }
}

/// Immutable snapshot of all displayed diagnostics.
///
/// Counts are computed from `files` rather than cached alongside it.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSnapshot {
    /// Per-file diagnostics, error-containing files first, then by identity.
    files: Vec<(DocumentId, Vec<DisplayedDiagnostic>)>,
}

impl DiagnosticsSnapshot {
    /// Build a snapshot, ordering error-containing files first.
    #[must_use]
    pub fn new(mut files: Vec<(DocumentId, Vec<DisplayedDiagnostic>)>) -> Self {
        files.sort_by(|a, b| {
            let a_has_errors = a.1.iter().any(|d| d.severity().is_error());
            let b_has_errors = b.1.iter().any(|d| d.severity().is_error());
            b_has_errors.cmp(&a_has_errors).then_with(|| a.0.cmp(&b.0))
        });
        Self { files }
    }

    #[must_use]
    pub fn files(&self) -> &[(DocumentId, Vec<DisplayedDiagnostic>)] {
        &self.files
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn count_by_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.files
            .iter()
            .flat_map(|(_, items)| items)
            .filter(|d| d.severity() == severity)
            .count()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Error)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Warning)
    }

    #[must_use]
    pub fn info_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Information)
    }

    #[must_use]
    pub fn hint_count(&self) -> usize {
        self.count_by_severity(DiagnosticSeverity::Hint)
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.files.iter().map(|(_, items)| items.len()).sum()
    }

    /// Compact status string like "E:3 W:5".
    #[must_use]
    pub fn status_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!("E:{} W:{}", self.error_count(), self.warning_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Position;

    fn make_diag(severity: DiagnosticSeverity, msg: &str) -> DisplayedDiagnostic {
        DisplayedDiagnostic::new(
            severity,
            msg.to_string(),
            TextRange::new(Position::new(10, 5), Position::new(10, 8)),
            "CS0000".to_string(),
            "csharp".to_string(),
            false,
        )
    }

    fn id(uri: &str) -> DocumentId {
        DocumentId::parse(uri).unwrap()
    }

    #[test]
    fn test_severity_label() {
        assert_eq!(DiagnosticSeverity::Error.label(), "error");
        assert_eq!(DiagnosticSeverity::Warning.label(), "warning");
        assert_eq!(DiagnosticSeverity::Information.label(), "info");
        assert_eq!(DiagnosticSeverity::Hint.label(), "hint");
    }

    #[test]
    fn test_display_with_id() {
        let diag = make_diag(DiagnosticSeverity::Error, "; expected");
        assert_eq!(
            diag.display_with_id(&id("file:///src/Program.cs")),
            "/src/Program.cs:11:6: error: [CS0000] ; expected"
        );
    }

    #[test]
    fn test_snapshot_default_is_empty() {
        let snap = DiagnosticsSnapshot::default();
        assert!(snap.is_empty());
        assert_eq!(snap.total_count(), 0);
        assert_eq!(snap.status_string(), "");
    }

    #[test]
    fn test_snapshot_counts() {
        let snap = DiagnosticsSnapshot::new(vec![(
            id("file:///a.cs"),
            vec![
                make_diag(DiagnosticSeverity::Error, "e1"),
                make_diag(DiagnosticSeverity::Warning, "w1"),
                make_diag(DiagnosticSeverity::Warning, "w2"),
                make_diag(DiagnosticSeverity::Information, "i1"),
                make_diag(DiagnosticSeverity::Hint, "h1"),
            ],
        )]);
        assert_eq!(snap.total_count(), 5);
        assert_eq!(snap.error_count(), 1);
        assert_eq!(snap.warning_count(), 2);
        assert_eq!(snap.info_count(), 1);
        assert_eq!(snap.hint_count(), 1);
        assert_eq!(snap.status_string(), "E:1 W:2");
    }

    #[test]
    fn test_snapshot_errors_first() {
        let snap = DiagnosticsSnapshot::new(vec![
            (
                id("file:///a.cs"),
                vec![make_diag(DiagnosticSeverity::Warning, "w")],
            ),
            (
                id("file:///b.cs"),
                vec![make_diag(DiagnosticSeverity::Error, "e")],
            ),
        ]);
        assert_eq!(snap.files()[0].0, id("file:///b.cs"));
        assert_eq!(snap.files()[1].0, id("file:///a.cs"));
    }
}
