use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("cannot convert path to file URI: {}", path.display())]
pub struct PathToUriError {
    path: PathBuf,
}

/// Identity of a file on the display surface.
///
/// Ordering is lexicographic on the serialized URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Url);

impl DocumentId {
    /// Build a `file://` identity from an absolute path.
    pub fn from_path(path: &Path) -> Result<Self, PathToUriError> {
        Url::from_file_path(path)
            .map(Self)
            .map_err(|()| PathToUriError {
                path: path.to_path_buf(),
            })
    }

    pub fn parse(uri: &str) -> Result<Self, url::ParseError> {
        Url::parse(uri).map(Self)
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Local path for `file` identities, the raw URI otherwise.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.0.to_file_path() {
            Ok(path) if self.scheme() == "file" => path.display().to_string(),
            _ => self.0.to_string(),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// An open editor document, as seen at the event boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub uri: DocumentId,
    pub language_id: String,
}

impl Document {
    #[must_use]
    pub fn new(uri: DocumentId, language_id: impl Into<String>) -> Self {
        Self {
            uri,
            language_id: language_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_builds_file_uri() {
        let id = DocumentId::from_path(Path::new("/work/src/Program.cs")).unwrap();
        assert_eq!(id.scheme(), "file");
        assert_eq!(id.as_str(), "file:///work/src/Program.cs");
        assert_eq!(id.display_name(), "/work/src/Program.cs");
    }

    #[test]
    fn test_from_relative_path_fails() {
        let err = DocumentId::from_path(Path::new("src/Program.cs")).unwrap_err();
        assert!(err.to_string().contains("src/Program.cs"));
    }

    #[test]
    fn test_virtual_document_displays_raw_uri() {
        let id = DocumentId::parse("virtualCSharp-razor:///Pages/Index.cshtml").unwrap();
        assert_eq!(id.scheme(), "virtualcsharp-razor");
        assert_eq!(id.display_name(), id.as_str());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = DocumentId::parse("file:///a/z.cs").unwrap();
        let b = DocumentId::parse("file:///b/a.cs").unwrap();
        assert!(a < b);
    }
}
