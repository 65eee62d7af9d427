//! Events delivered by the two external collaborators: the analysis server
//! and the editor surface.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// One project as described by the analysis server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub path: String,
    /// Absent when the server did not enumerate the project's sources.
    #[serde(default)]
    pub source_files: Option<Vec<String>>,
}

impl ProjectInfo {
    #[must_use]
    pub fn new(path: impl Into<String>, source_files: Option<Vec<String>>) -> Self {
        Self {
            path: path.into(),
            source_files,
        }
    }

    #[must_use]
    pub fn source_file_count(&self) -> usize {
        self.source_files.as_ref().map_or(0, Vec::len)
    }
}

/// Project payload of project-added/changed/removed notifications.
///
/// A project is reported either in its framework-style form, its generic
/// build-system form, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub framework_project: Option<ProjectInfo>,
    #[serde(default)]
    pub build_project: Option<ProjectInfo>,
}

impl ProjectDescriptor {
    #[must_use]
    pub fn framework(info: ProjectInfo) -> Self {
        Self {
            framework_project: Some(info),
            build_project: None,
        }
    }

    #[must_use]
    pub fn build(info: ProjectInfo) -> Self {
        Self {
            framework_project: None,
            build_project: Some(info),
        }
    }

    /// The project form used for tracking: framework-style when present.
    #[must_use]
    pub fn primary(&self) -> Option<&ProjectInfo> {
        self.framework_project
            .as_ref()
            .or(self.build_project.as_ref())
    }
}

/// Background analysis progress reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Started,
    Progress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
    ProjectAdded(ProjectDescriptor),
    ProjectChanged(ProjectDescriptor),
    ProjectRemoved(ProjectDescriptor),
    /// Package restore is starting.
    RestoreStarted,
    RestoreCompleted,
    AnalysisStatus(AnalysisStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorEvent {
    Opened(Document),
    Changed(Document),
    /// The editor window regained focus; `active` is the focused document.
    WindowFocused { active: Option<Document> },
    Closed(Document),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_prefers_framework_project() {
        let descriptor = ProjectDescriptor {
            framework_project: Some(ProjectInfo::new("/app/App.csproj", None)),
            build_project: Some(ProjectInfo::new("/app/build/App.csproj", None)),
        };
        assert_eq!(descriptor.primary().unwrap().path, "/app/App.csproj");
    }

    #[test]
    fn test_primary_falls_back_to_build_project() {
        let descriptor = ProjectDescriptor::build(ProjectInfo::new(
            "/lib/Lib.csproj",
            Some(vec!["/lib/A.cs".to_string()]),
        ));
        let primary = descriptor.primary().unwrap();
        assert_eq!(primary.path, "/lib/Lib.csproj");
        assert_eq!(primary.source_file_count(), 1);
    }

    #[test]
    fn test_source_file_count_absent_is_zero() {
        assert_eq!(ProjectInfo::new("/p.csproj", None).source_file_count(), 0);
    }

    #[test]
    fn test_server_event_deserialize() {
        let event: ServerEvent = serde_json::from_value(serde_json::json!({
            "analysis_status": "finished"
        }))
        .unwrap();
        assert_eq!(event, ServerEvent::AnalysisStatus(AnalysisStatus::Finished));

        let event: ServerEvent = serde_json::from_value(serde_json::json!("restore_started")).unwrap();
        assert_eq!(event, ServerEvent::RestoreStarted);
    }

    #[test]
    fn test_editor_event_deserialize() {
        let event: EditorEvent = serde_json::from_value(serde_json::json!({
            "changed": { "uri": "file:///a.cs", "language_id": "csharp" }
        }))
        .unwrap();
        match event {
            EditorEvent::Changed(doc) => {
                assert_eq!(doc.uri.as_str(), "file:///a.cs");
                assert_eq!(doc.language_id, "csharp");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
