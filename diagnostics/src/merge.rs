//! Merge engine. Reconciles a whole-project finding list with the
//! diagnostics currently on display.

use std::collections::HashSet;

use vigil_types::{DisplayedDiagnostic, DocumentId, Finding};

use crate::classify::{DisplayOptions, to_displayed};
use crate::surface::BatchEntry;

/// Clear-then-replace entries for every file present in a fresh batch.
#[derive(Debug, Default)]
pub struct MergePlan {
    entries: Vec<BatchEntry>,
    touched: HashSet<DocumentId>,
}

impl MergePlan {
    /// Build the plan from one completed project-wide fetch.
    ///
    /// Findings are grouped by file identity via a stable sort; each file
    /// gets a `Clear` immediately followed by the `Replace` holding all of
    /// its visible diagnostics, so surfaces that union on update never keep
    /// old entries next to new ones.
    #[must_use]
    pub fn build(findings: Vec<Finding>, options: &DisplayOptions) -> Self {
        let mut located: Vec<(DocumentId, Finding)> = findings
            .into_iter()
            .filter_map(|finding| match DocumentId::from_path(finding.file_name()) {
                Ok(id) => Some((id, finding)),
                Err(e) => {
                    tracing::warn!("Skipping finding {}: {e}", finding.id());
                    None
                }
            })
            .collect();
        located.sort_by(|a, b| a.0.cmp(&b.0));

        let mut plan = Self::default();
        let mut current: Option<(DocumentId, Vec<DisplayedDiagnostic>)> = None;

        for (id, finding) in located {
            let Some(diagnostic) = to_displayed(&finding, options) else {
                continue;
            };
            match &mut current {
                Some((current_id, items)) if *current_id == id => items.push(diagnostic),
                _ => {
                    if let Some((previous, items)) = current.take() {
                        plan.entries.push(BatchEntry::Replace(previous, items));
                    }
                    plan.entries.push(BatchEntry::Clear(id.clone()));
                    plan.touched.insert(id.clone());
                    current = Some((id, vec![diagnostic]));
                }
            }
        }
        if let Some((last, items)) = current {
            plan.entries.push(BatchEntry::Replace(last, items));
        }
        plan
    }

    /// Final batch: the plan's entries plus a `Clear` for every displayed
    /// file the fresh findings no longer mention.
    #[must_use]
    pub fn into_batch(self, displayed: &[DocumentId]) -> Vec<BatchEntry> {
        let mut stale: Vec<&DocumentId> = displayed
            .iter()
            .filter(|id| !self.touched.contains(*id))
            .collect();
        stale.sort();

        let mut batch = self.entries;
        batch.extend(stale.into_iter().cloned().map(BatchEntry::Clear));
        batch
    }
}
