//! Configuration for the validation scheduler.
//!
//! Raw TOML structs (all `Option` fields) stay private here and are resolved
//! into [`ValidationSettings`] at the parse boundary. Consumers read the
//! current settings on demand through a [`SettingsHandle`].

mod handle;
mod settings;

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use handle::SettingsHandle;
pub use settings::{SettingsError, ValidationSettings};

use settings::RawValidationSettings;

const CONFIG_DIR_NAME: &str = "vigil";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid settings in {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: SettingsError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Invalid { path, .. } => {
                path
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfigFile {
    diagnostics: Option<RawValidationSettings>,
}

/// `<config_dir>/vigil/config.toml`, when the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load settings from `path`. A missing file yields defaults.
pub fn load(path: &Path) -> Result<ValidationSettings, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(ValidationSettings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse(&text).map_err(|e| e.at(path))
}

/// Load from the default location, or defaults when there is none.
pub fn load_default() -> Result<ValidationSettings, ConfigError> {
    match default_config_path() {
        Some(path) => load(&path),
        None => Ok(ValidationSettings::default()),
    }
}

enum ParseFailure {
    Toml(toml::de::Error),
    Settings(SettingsError),
}

impl ParseFailure {
    fn at(self, path: &Path) -> ConfigError {
        let path = path.to_path_buf();
        match self {
            Self::Toml(source) => ConfigError::Parse { path, source },
            Self::Settings(source) => ConfigError::Invalid { path, source },
        }
    }
}

fn parse(text: &str) -> Result<ValidationSettings, ParseFailure> {
    let raw: RawConfigFile = toml::from_str(text).map_err(ParseFailure::Toml)?;
    let raw = raw.diagnostics.unwrap_or_default();
    ValidationSettings::try_from(raw).map_err(ParseFailure::Settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, ValidationSettings::default());
    }

    #[test]
    fn test_load_diagnostics_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[diagnostics]
suppress_hidden = true
max_project_file_count = 250
document_delay_ms = 500
project_delay_ms = 2000
"#,
        )
        .unwrap();

        let settings = load(&path).unwrap();
        assert!(settings.suppress_hidden_diagnostics());
        assert_eq!(settings.max_project_file_count(), 250);
        assert_eq!(settings.document_delay(), Duration::from_millis(500));
        assert_eq!(settings.project_delay(), Duration::from_millis(2000));
        assert_eq!(settings.language_id(), "csharp");
    }

    #[test]
    fn test_file_without_diagnostics_table_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[other]\nkey = 1\n").unwrap();
        assert_eq!(load(&path).unwrap(), ValidationSettings::default());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[diagnostics\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[diagnostics]\ndocument_delay_ms = 0\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                source: SettingsError::ZeroDelay("document_delay_ms"),
                ..
            }
        ));
    }
}
