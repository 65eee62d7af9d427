//! In-memory display surface holding the per-file diagnostics currently shown.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use vigil_types::{DiagnosticsSnapshot, DisplayedDiagnostic, DocumentId};

use crate::surface::{BatchEntry, DiagnosticSurface};

/// Per-file diagnostic collection.
///
/// Setting an empty list removes the file's entry, so `identities()` only
/// reports files that actually display something.
#[derive(Debug, Default)]
pub struct DiagnosticCollection {
    data: Mutex<HashMap<DocumentId, Vec<DisplayedDiagnostic>>>,
}

impl DiagnosticCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update(
        data: &mut HashMap<DocumentId, Vec<DisplayedDiagnostic>>,
        id: DocumentId,
        items: Vec<DisplayedDiagnostic>,
    ) {
        if items.is_empty() {
            data.remove(&id);
        } else {
            data.insert(id, items);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let files = data
            .iter()
            .map(|(id, items)| (id.clone(), items.clone()))
            .collect();
        DiagnosticsSnapshot::new(files)
    }
}

impl DiagnosticSurface for DiagnosticCollection {
    fn get(&self, id: &DocumentId) -> Option<Vec<DisplayedDiagnostic>> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.get(id).cloned()
    }

    fn set(&self, id: DocumentId, diagnostics: Vec<DisplayedDiagnostic>) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Self::update(&mut data, id, diagnostics);
    }

    fn delete(&self, id: &DocumentId) -> bool {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.remove(id).is_some()
    }

    fn apply_batch(&self, batch: Vec<BatchEntry>) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        for entry in batch {
            match entry {
                BatchEntry::Clear(id) => {
                    data.remove(&id);
                }
                BatchEntry::Replace(id, items) => Self::update(&mut data, id, items),
            }
        }
    }

    fn identities(&self) -> Vec<DocumentId> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_types::{DiagnosticSeverity, TextRange};

    fn make_diag(severity: DiagnosticSeverity, msg: &str) -> DisplayedDiagnostic {
        DisplayedDiagnostic::new(
            severity,
            msg.to_string(),
            TextRange::default(),
            "CS0000".to_string(),
            "csharp".to_string(),
            false,
        )
    }

    fn id(uri: &str) -> DocumentId {
        DocumentId::parse(uri).unwrap()
    }

    #[test]
    fn test_empty_snapshot() {
        let store = DiagnosticCollection::new();
        let snap = store.snapshot();
        assert!(snap.is_empty());
        assert!(store.identities().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let store = DiagnosticCollection::new();
        let a = id("file:///a.cs");
        store.set(
            a.clone(),
            vec![
                make_diag(DiagnosticSeverity::Error, "err"),
                make_diag(DiagnosticSeverity::Warning, "warn"),
            ],
        );
        assert_eq!(store.get(&a).unwrap().len(), 2);
        assert_eq!(store.snapshot().error_count(), 1);
        assert_eq!(store.identities(), vec![a]);
    }

    #[test]
    fn test_set_replaces_previous() {
        let store = DiagnosticCollection::new();
        let a = id("file:///a.cs");
        store.set(
            a.clone(),
            vec![
                make_diag(DiagnosticSeverity::Error, "e1"),
                make_diag(DiagnosticSeverity::Error, "e2"),
            ],
        );
        store.set(a.clone(), vec![make_diag(DiagnosticSeverity::Error, "e1")]);
        assert_eq!(store.get(&a).unwrap().len(), 1);
    }

    #[test]
    fn test_set_empty_removes_entry() {
        let store = DiagnosticCollection::new();
        let a = id("file:///a.cs");
        store.set(a.clone(), vec![make_diag(DiagnosticSeverity::Error, "e")]);
        store.set(a.clone(), vec![]);
        assert!(store.get(&a).is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_delete_reports_presence() {
        let store = DiagnosticCollection::new();
        let a = id("file:///a.cs");
        assert!(!store.delete(&a));
        store.set(a.clone(), vec![make_diag(DiagnosticSeverity::Hint, "h")]);
        assert!(store.delete(&a));
        assert!(!store.delete(&a));
    }

    #[test]
    fn test_apply_batch_in_order() {
        let store = DiagnosticCollection::new();
        let a = id("file:///a.cs");
        let b = id("file:///b.cs");
        store.set(b.clone(), vec![make_diag(DiagnosticSeverity::Warning, "old")]);

        store.apply_batch(vec![
            BatchEntry::Clear(a.clone()),
            BatchEntry::Replace(a.clone(), vec![make_diag(DiagnosticSeverity::Error, "new")]),
            BatchEntry::Clear(b.clone()),
        ]);

        assert_eq!(store.get(&a).unwrap()[0].message(), "new");
        assert!(store.get(&b).is_none());
        assert_eq!(store.snapshot().status_string(), "E:1 W:0");
    }
}
