//! Version control backend capability.
//!
//! The engine never talks to git2 directly: resolution, classification and
//! merge preview consume the [`VcsBackend`] trait, which [`crate::core::GitRepo`]
//! implements. Every method exists on every backend; optional capabilities
//! such as rename detection have a default that reports nothing.

use crate::core::error::Result;
use git2::Oid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Kind of a single change between two states of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Renamed,
}

/// One entry of a diff, with repo-relative `/`-separated paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub path: String,
    pub old_path: Option<String>,
    pub kind: ChangeKind,
}

impl ChangeEntry {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            kind,
        }
    }

    pub fn renamed(old_path: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            old_path: Some(old_path.into()),
            kind: ChangeKind::Renamed,
        }
    }

    /// Path this change is reported under: deletions keep their old name
    pub fn affected_path(&self) -> &str {
        match (self.kind, &self.old_path) {
            (ChangeKind::Removed, Some(old)) => old,
            _ => &self.path,
        }
    }
}

/// What the working tree is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffBase {
    Index,
    Head,
}

/// Outcome of an in-memory merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialMerge {
    pub success: bool,
    pub unmerged_paths: BTreeSet<String>,
}

pub trait VcsBackend {
    /// Working tree root of the repository
    fn root(&self) -> &Path;

    /// Resolve a ref name or revspec to a commit; `None` if it does not exist
    /// or points at an unborn branch.
    fn resolve_ref(&self, name: &str) -> Result<Option<Oid>>;

    /// Branch HEAD points at, even when the branch has no commits yet
    fn current_branch(&self) -> Result<Option<String>>;

    /// Diff two commits' trees; `None` stands for the empty tree
    fn diff_trees(
        &self,
        from: Option<Oid>,
        to: Option<Oid>,
        detect_renames: bool,
    ) -> Result<Vec<ChangeEntry>>;

    /// Changes to already-tracked content between `base` and the working tree
    fn diff_workdir(&self, base: DiffBase) -> Result<Vec<ChangeEntry>>;

    /// Renames between `base` and the working tree, including renames whose
    /// target is not yet indexed. Backends without rename detection keep the
    /// default and report none.
    fn workdir_renames(&self, _base: DiffBase) -> Result<Vec<ChangeEntry>> {
        Ok(Vec::new())
    }

    /// Every file path in the HEAD tree; empty for an unborn HEAD
    fn head_paths(&self) -> Result<BTreeSet<String>>;

    /// Every file path in the index
    fn index_paths(&self) -> Result<BTreeSet<String>>;

    /// Files present on disk that are neither indexed nor ignored.
    /// Directories git refuses to descend into are reported with a trailing `/`.
    fn untracked_paths(&self) -> Result<BTreeSet<String>>;

    /// Paths matched by the ignore rules; ignored directories end in `/`
    fn list_ignored(&self) -> Result<BTreeSet<String>>;

    /// Merge `source` into `base` without touching the working tree, the
    /// index or any ref.
    fn trial_merge(&self, base: Oid, source: Oid) -> Result<TrialMerge>;

    /// Number of commits reachable from `tip` but not from `excluding`
    fn commits_reachable_from(&self, tip: Oid, excluding: Oid) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affected_path_uses_old_name_for_removals() {
        let mut entry = ChangeEntry::new("gone.txt", ChangeKind::Removed);
        entry.old_path = Some("gone.txt".to_string());
        assert_eq!(entry.affected_path(), "gone.txt");

        let renamed = ChangeEntry::renamed("old.txt", "new.txt");
        assert_eq!(renamed.affected_path(), "new.txt");
        assert_eq!(renamed.old_path.as_deref(), Some("old.txt"));
    }

    #[test]
    fn test_trial_merge_default_is_empty() {
        let merge = TrialMerge::default();
        assert!(!merge.success);
        assert!(merge.unmerged_paths.is_empty());
    }
}
