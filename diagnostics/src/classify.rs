//! Severity classification of raw analyzer findings.

use vigil_config::ValidationSettings;
use vigil_types::{DiagnosticSeverity, DisplayedDiagnostic, Finding};

/// Compiler codes that always fade: unnecessary using directive and
/// unreachable code. Fading works for these even when the server reports no
/// analyzer tags.
const FADE_OUT_CODES: [&str; 2] = ["CS8019", "CS0162"];

const UNNECESSARY_TAG: &str = "unnecessary";

/// Outcome severity of classification. `Suppressed` findings are never displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
    Suppressed,
}

impl Severity {
    #[must_use]
    pub fn visible(self) -> Option<DiagnosticSeverity> {
        match self {
            Self::Error => Some(DiagnosticSeverity::Error),
            Self::Warning => Some(DiagnosticSeverity::Warning),
            Self::Information => Some(DiagnosticSeverity::Information),
            Self::Hint => Some(DiagnosticSeverity::Hint),
            Self::Suppressed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    pub fade_out: bool,
}

/// Map one finding to a display severity and fade-out flag.
#[must_use]
pub fn classify(finding: &Finding, suppress_hidden: bool) -> Classification {
    let fade_out = finding
        .tags()
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(UNNECESSARY_TAG))
        || FADE_OUT_CODES.contains(&finding.id());

    let level = finding.log_level().to_ascii_lowercase();
    let severity = match level.as_str() {
        // Faded code must stay visible even where its level would hide it.
        "hidden" | "none" if fade_out => Severity::Hint,
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        "info" => Severity::Information,
        "hidden" if !suppress_hidden => Severity::Hint,
        _ => Severity::Suppressed,
    };

    Classification { severity, fade_out }
}

/// Options applied when turning findings into displayed diagnostics.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub suppress_hidden: bool,
    pub source: String,
}

impl DisplayOptions {
    #[must_use]
    pub fn from_settings(settings: &ValidationSettings) -> Self {
        Self {
            suppress_hidden: settings.suppress_hidden_diagnostics(),
            source: settings.source().to_string(),
        }
    }
}

/// Classify and convert a finding; `None` when it is suppressed.
#[must_use]
pub fn to_displayed(finding: &Finding, options: &DisplayOptions) -> Option<DisplayedDiagnostic> {
    let Classification { severity, fade_out } = classify(finding, options.suppress_hidden);
    let severity = severity.visible()?;
    Some(DisplayedDiagnostic::new(
        severity,
        compose_message(finding),
        finding.range(),
        finding.id().to_string(),
        options.source.clone(),
        fade_out,
    ))
}

/// `"{text} [{labels}]"`, or just the text when no project is named.
fn compose_message(finding: &Finding) -> String {
    if finding.projects().is_empty() {
        return finding.text().to_string();
    }
    let labels: Vec<&str> = finding
        .projects()
        .iter()
        .map(String::as_str)
        .map(project_label)
        .collect();
    format!("{} [{}]", finding.text(), labels.join(", "))
}

/// Drop the target-framework qualifier: `net8.0+App` displays as `App`.
fn project_label(name: &str) -> &str {
    name.split_once('+').map_or(name, |(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_types::TextRange;

    fn finding(id: &str, level: &str) -> Finding {
        Finding::new("/src/a.cs", TextRange::default(), "text", id, level)
    }

    fn options(suppress_hidden: bool) -> DisplayOptions {
        DisplayOptions {
            suppress_hidden,
            source: "csharp".to_string(),
        }
    }

    #[test]
    fn test_level_mapping_is_case_insensitive() {
        assert_eq!(classify(&finding("X1", "ERROR"), false).severity, Severity::Error);
        assert_eq!(classify(&finding("X1", "Warning"), false).severity, Severity::Warning);
        assert_eq!(classify(&finding("X1", "info"), false).severity, Severity::Information);
        assert_eq!(classify(&finding("X1", "Hidden"), false).severity, Severity::Hint);
    }

    #[test]
    fn test_plain_warning() {
        let c = classify(&finding("CS0168", "warning"), true);
        assert_eq!(c.severity, Severity::Warning);
        assert!(!c.fade_out);
    }

    #[test]
    fn test_hidden_suppressed_when_requested() {
        assert_eq!(
            classify(&finding("IDE0001", "hidden"), true).severity,
            Severity::Suppressed
        );
    }

    #[test]
    fn test_none_and_unknown_levels_suppressed() {
        assert_eq!(classify(&finding("X1", "none"), false).severity, Severity::Suppressed);
        assert_eq!(classify(&finding("X1", "verbose"), false).severity, Severity::Suppressed);
    }

    #[test]
    fn test_unnecessary_tag_overrides_hidden_suppression() {
        let f = finding("IDE0005", "hidden").with_tags(["Unnecessary"]);
        let c = classify(&f, true);
        assert_eq!(c.severity, Severity::Hint);
        assert!(c.fade_out);
    }

    #[test]
    fn test_fade_out_codes_make_none_visible() {
        for code in FADE_OUT_CODES {
            let c = classify(&finding(code, "none"), false);
            assert_eq!(c.severity, Severity::Hint, "{code}");
            assert!(c.fade_out, "{code}");
        }
    }

    #[test]
    fn test_fade_out_keeps_higher_severity() {
        let f = finding("CS0162", "warning");
        let c = classify(&f, true);
        assert_eq!(c.severity, Severity::Warning);
        assert!(c.fade_out);
    }

    #[test]
    fn test_suppressed_finding_not_displayed() {
        assert!(to_displayed(&finding("X1", "none"), &options(false)).is_none());
    }

    #[test]
    fn test_displayed_message_carries_project_labels() {
        let f = finding("CS0103", "error").with_projects(["net8.0+App", "Tests"]);
        let diag = to_displayed(&f, &options(false)).unwrap();
        assert_eq!(diag.message(), "text [App, Tests]");
        assert_eq!(diag.code(), "CS0103");
        assert_eq!(diag.source(), "csharp");
        assert_eq!(diag.severity(), DiagnosticSeverity::Error);
        assert!(!diag.fade_out());
    }

    #[test]
    fn test_displayed_message_without_projects() {
        let diag = to_displayed(&finding("CS0103", "error"), &options(false)).unwrap();
        assert_eq!(diag.message(), "text");
    }
}
