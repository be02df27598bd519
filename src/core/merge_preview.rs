//! Side-effect-free merge preview.

use crate::core::{backend::VcsBackend, error::Result};
use serde::Serialize;
use std::collections::BTreeSet;

/// What merging a source ref into the current head would do.
///
/// `affected_files` is always the disjoint union of `conflicting_files` and
/// `non_conflicting_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergePreview {
    pub source_commit_count: usize,
    pub affected_files: BTreeSet<String>,
    pub conflicting_files: BTreeSet<String>,
    pub non_conflicting_files: BTreeSet<String>,
}

impl MergePreview {
    /// Nothing would be merged
    pub fn is_noop(&self) -> bool {
        self.source_commit_count == 0 && self.affected_files.is_empty()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicting_files.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} commit(s), {} file(s) affected ({} with conflicts, {} without conflicts)",
            self.source_commit_count,
            self.affected_files.len(),
            self.conflicting_files.len(),
            self.non_conflicting_files.len()
        )
    }

    /// Summary followed by the per-file sections
    pub fn detailed(&self) -> String {
        let mut out = self.summary();
        if !self.conflicting_files.is_empty() {
            out.push_str("\n-- Files with Conflicts:");
            for path in &self.conflicting_files {
                out.push_str("\n   ");
                out.push_str(path);
            }
        }
        if !self.non_conflicting_files.is_empty() {
            out.push_str("\n-- Files without Conflicts:");
            for path in &self.non_conflicting_files {
                out.push_str("\n   ");
                out.push_str(path);
            }
        }
        out
    }
}

/// Preview merging `source_ref` into `head_ref`.
///
/// Unresolvable refs give a zeroed preview. Only the object database is
/// read; HEAD, the index and the working tree are left as they were.
pub fn preview(backend: &impl VcsBackend, head_ref: &str, source_ref: &str) -> Result<MergePreview> {
    let head = backend.resolve_ref(head_ref)?;
    let source = backend.resolve_ref(source_ref)?;

    let (head, source) = match (head, source) {
        (Some(head), Some(source)) => (head, source),
        _ => {
            log::debug!("Cannot preview {source_ref} into {head_ref}: unresolved ref");
            return Ok(MergePreview::default());
        }
    };
    if head == source {
        return Ok(MergePreview::default());
    }

    let source_commit_count = backend.commits_reachable_from(source, head)?;
    let conflicting_files = backend.trial_merge(head, source)?.unmerged_paths;

    let mut affected_files: BTreeSet<String> = backend
        .diff_trees(Some(head), Some(source), true)?
        .iter()
        .map(|change| change.affected_path().to_string())
        .collect();
    affected_files.extend(conflicting_files.iter().cloned());

    let non_conflicting_files = affected_files
        .difference(&conflicting_files)
        .cloned()
        .collect();

    Ok(MergePreview {
        source_commit_count,
        affected_files,
        conflicting_files,
        non_conflicting_files,
    })
}
