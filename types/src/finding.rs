use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// 0-indexed line/column position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// One analyzer result, as reported by the analysis server.
///
/// Fields are private: a finding is immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    file_name: PathBuf,
    range: TextRange,
    text: String,
    /// Analyzer identifier (e.g. "CS0168").
    id: String,
    /// Raw log level string ("error", "warning", "info", "hidden", "none", ...).
    log_level: String,
    #[serde(default)]
    tags: Vec<String>,
    /// Names of the projects this finding applies to.
    #[serde(default)]
    projects: Vec<String>,
}

impl Finding {
    #[must_use]
    pub fn new(
        file_name: impl Into<PathBuf>,
        range: TextRange,
        text: impl Into<String>,
        id: impl Into<String>,
        log_level: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            range,
            text: text.into(),
            id: id.into(),
            log_level: log_level.into(),
            tags: Vec::new(),
            projects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_projects<I, S>(mut self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects = projects.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    #[must_use]
    pub fn range(&self) -> TextRange {
        self.range
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn projects(&self) -> &[String] {
        &self.projects
    }
}
