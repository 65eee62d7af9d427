use std::time::Duration;

use serde::Deserialize;

const DEFAULT_MAX_PROJECT_FILE_COUNT: i64 = 1000;
const DEFAULT_DOCUMENT_DELAY_MS: u64 = 750;
const DEFAULT_PROJECT_DELAY_MS: u64 = 3000;
const DEFAULT_LANGUAGE_ID: &str = "csharp";
const DEFAULT_VIRTUAL_SCHEME_PREFIX: &str = "virtualCSharp-";
const DEFAULT_SOURCE: &str = "csharp";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("language_id must not be empty")]
    EmptyLanguageId,
    #[error("{0} must be greater than zero")]
    ZeroDelay(&'static str),
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawValidationSettings {
    suppress_hidden: Option<bool>,
    max_project_file_count: Option<i64>,
    document_delay_ms: Option<u64>,
    project_delay_ms: Option<u64>,
    language_id: Option<String>,
    virtual_scheme_prefix: Option<String>,
    source: Option<String>,
}

/// Validated settings for the validation scheduler.
///
/// Invariant: both delays are non-zero and `language_id` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawValidationSettings")]
pub struct ValidationSettings {
    suppress_hidden_diagnostics: bool,
    /// `<= 0` means unlimited.
    max_project_file_count: i64,
    document_delay: Duration,
    project_delay: Duration,
    language_id: String,
    /// Accepted virtual-document scheme prefix; an empty value disables it.
    virtual_scheme_prefix: Option<String>,
    source: String,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            suppress_hidden_diagnostics: false,
            max_project_file_count: DEFAULT_MAX_PROJECT_FILE_COUNT,
            document_delay: Duration::from_millis(DEFAULT_DOCUMENT_DELAY_MS),
            project_delay: Duration::from_millis(DEFAULT_PROJECT_DELAY_MS),
            language_id: DEFAULT_LANGUAGE_ID.to_string(),
            virtual_scheme_prefix: Some(DEFAULT_VIRTUAL_SCHEME_PREFIX.to_string()),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl TryFrom<RawValidationSettings> for ValidationSettings {
    type Error = SettingsError;

    fn try_from(raw: RawValidationSettings) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let language_id = raw.language_id.unwrap_or(defaults.language_id);
        if language_id.trim().is_empty() {
            return Err(SettingsError::EmptyLanguageId);
        }

        let document_delay = match raw.document_delay_ms {
            Some(0) => return Err(SettingsError::ZeroDelay("document_delay_ms")),
            Some(ms) => Duration::from_millis(ms),
            None => defaults.document_delay,
        };
        let project_delay = match raw.project_delay_ms {
            Some(0) => return Err(SettingsError::ZeroDelay("project_delay_ms")),
            Some(ms) => Duration::from_millis(ms),
            None => defaults.project_delay,
        };

        let virtual_scheme_prefix = match raw.virtual_scheme_prefix {
            Some(prefix) if prefix.is_empty() => None,
            Some(prefix) => Some(prefix),
            None => defaults.virtual_scheme_prefix,
        };

        Ok(Self {
            suppress_hidden_diagnostics: raw
                .suppress_hidden
                .unwrap_or(defaults.suppress_hidden_diagnostics),
            max_project_file_count: raw
                .max_project_file_count
                .unwrap_or(defaults.max_project_file_count),
            document_delay,
            project_delay,
            language_id,
            virtual_scheme_prefix,
            source: raw.source.unwrap_or(defaults.source),
        })
    }
}

impl ValidationSettings {
    #[must_use]
    pub fn suppress_hidden_diagnostics(&self) -> bool {
        self.suppress_hidden_diagnostics
    }

    #[must_use]
    pub fn max_project_file_count(&self) -> i64 {
        self.max_project_file_count
    }

    #[must_use]
    pub fn document_delay(&self) -> Duration {
        self.document_delay
    }

    #[must_use]
    pub fn project_delay(&self) -> Duration {
        self.project_delay
    }

    #[must_use]
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    #[must_use]
    pub fn virtual_scheme_prefix(&self) -> Option<&str> {
        self.virtual_scheme_prefix.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn with_suppress_hidden_diagnostics(mut self, suppress: bool) -> Self {
        self.suppress_hidden_diagnostics = suppress;
        self
    }

    #[must_use]
    pub fn with_max_project_file_count(mut self, limit: i64) -> Self {
        self.max_project_file_count = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawValidationSettings {
        RawValidationSettings::default()
    }

    #[test]
    fn test_defaults() {
        let settings = ValidationSettings::try_from(raw()).unwrap();
        assert!(!settings.suppress_hidden_diagnostics());
        assert_eq!(settings.max_project_file_count(), 1000);
        assert_eq!(settings.document_delay(), Duration::from_millis(750));
        assert_eq!(settings.project_delay(), Duration::from_millis(3000));
        assert_eq!(settings.language_id(), "csharp");
        assert_eq!(settings.virtual_scheme_prefix(), Some("virtualCSharp-"));
        assert_eq!(settings.source(), "csharp");
    }

    #[test]
    fn test_empty_language_id_rejected() {
        let result = ValidationSettings::try_from(RawValidationSettings {
            language_id: Some("  ".to_string()),
            ..raw()
        });
        assert_eq!(result.unwrap_err(), SettingsError::EmptyLanguageId);
    }

    #[test]
    fn test_zero_project_delay_rejected() {
        let result = ValidationSettings::try_from(RawValidationSettings {
            project_delay_ms: Some(0),
            ..raw()
        });
        assert_eq!(
            result.unwrap_err(),
            SettingsError::ZeroDelay("project_delay_ms")
        );
    }

    #[test]
    fn test_zero_document_delay_rejected() {
        let result = ValidationSettings::try_from(RawValidationSettings {
            document_delay_ms: Some(0),
            ..raw()
        });
        assert_eq!(
            result.unwrap_err(),
            SettingsError::ZeroDelay("document_delay_ms")
        );
    }

    #[test]
    fn test_empty_virtual_prefix_disables_virtual_documents() {
        let settings = ValidationSettings::try_from(RawValidationSettings {
            virtual_scheme_prefix: Some(String::new()),
            ..raw()
        })
        .unwrap();
        assert_eq!(settings.virtual_scheme_prefix(), None);
    }

    #[test]
    fn test_negative_file_limit_is_kept() {
        let settings = ValidationSettings::try_from(RawValidationSettings {
            max_project_file_count: Some(-1),
            ..raw()
        })
        .unwrap();
        assert_eq!(settings.max_project_file_count(), -1);
    }
}
