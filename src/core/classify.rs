//! File classification.
//!
//! [`classify`] labels every path of the working tree with one decision
//! category and any pending-change categories for the selected
//! [`ComparisonMode`]. It is a pure read: neither the config nor the
//! repository index is touched.

use crate::core::{
    backend::{ChangeEntry, ChangeKind, DiffBase, VcsBackend},
    category::Category,
    config::WorkspaceConfig,
    discovery::{find_nested_repositories, is_within, SIDECAR_FILE_NAME, VCS_MARKER},
    error::Result,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Which two states feed the pending-change axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    #[default]
    WorkingVsIndex,
    WorkingVsHead,
    LocalVsRemote,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::WorkingVsIndex => "working tree vs index",
            ComparisonMode::WorkingVsHead => "working tree vs HEAD",
            ComparisonMode::LocalVsRemote => "local vs remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileClassification {
    pub path: String,
    pub categories: BTreeSet<Category>,
    pub renamed_from: Option<String>,
    pub nested_repo: bool,
}

impl FileClassification {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            categories: BTreeSet::new(),
            renamed_from: None,
            nested_repo: false,
        }
    }

    pub fn has(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// The single Tracked / Untracked / Undecided / Ignored label
    pub fn decision(&self) -> Option<Category> {
        self.categories.iter().copied().find(Category::is_decision)
    }

    pub fn changes(&self) -> impl Iterator<Item = Category> + '_ {
        self.categories.iter().copied().filter(Category::is_change)
    }
}

impl fmt::Display for FileClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nested_repo {
            return write!(f, "{}/ (repo)", self.path);
        }
        match &self.renamed_from {
            Some(old) => write!(f, "{old} -> {}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationSummary {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub renamed: usize,
    /// Tracked paths that are not freshly added
    pub tracked: usize,
    pub untracked: usize,
    pub undecided: usize,
    pub ignored: usize,
    pub nested: usize,
}

impl fmt::Display for ClassificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tracked, {} untracked, {} undecided, {} ignored",
            self.tracked, self.untracked, self.undecided, self.ignored
        )?;
        if self.nested > 0 {
            write!(f, ", {} nested repo(s)", self.nested)?;
        }
        write!(
            f,
            " | {} added, {} modified, {} removed, {} renamed",
            self.added, self.modified, self.removed, self.renamed
        )
    }
}

/// Per-path classification, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    entries: BTreeMap<String, FileClassification>,
}

impl Classification {
    pub fn get(&self, path: &str) -> Option<&FileClassification> {
        self.entries.get(path)
    }

    pub fn paths_with(&self, category: Category) -> Vec<&str> {
        self.entries
            .values()
            .filter(|entry| entry.has(category))
            .map(|entry| entry.path.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileClassification> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> ClassificationSummary {
        let mut summary = ClassificationSummary::default();

        for entry in self.entries.values() {
            if entry.nested_repo {
                summary.nested += 1;
                continue;
            }
            for category in &entry.categories {
                match category {
                    Category::Added => summary.added += 1,
                    Category::Modified => summary.modified += 1,
                    Category::Removed => summary.removed += 1,
                    Category::Renamed => summary.renamed += 1,
                    Category::Tracked if !entry.has(Category::Added) => summary.tracked += 1,
                    Category::Tracked => {}
                    Category::Untracked => summary.untracked += 1,
                    Category::Undecided => summary.undecided += 1,
                    Category::Ignored => summary.ignored += 1,
                }
            }
        }

        summary
    }

    fn entry(&mut self, path: &str) -> &mut FileClassification {
        self.entries
            .entry(path.to_string())
            .or_insert_with(|| FileClassification::new(path))
    }
}

impl<'a> IntoIterator for &'a Classification {
    type Item = &'a FileClassification;
    type IntoIter = std::collections::btree_map::Values<'a, String, FileClassification>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Classify every path of the working tree behind `backend`.
///
/// Decision order per path:
/// 1. Ignored: the `.git` directory, ignore-matched paths, nested repositories
/// 2. Listed in `tracked.files`: Tracked
/// 3. Listed in `untracked.files`: Untracked, even when still in history
/// 4. In HEAD, the index, or the change set: Tracked
/// 5. Anything else: Undecided
pub fn classify(
    backend: &impl VcsBackend,
    config: &WorkspaceConfig,
    mode: ComparisonMode,
) -> Result<Classification> {
    let root = backend.root();

    let ignored: BTreeSet<String> = backend
        .list_ignored()?
        .into_iter()
        .map(|path| path.trim_end_matches('/').to_string())
        .filter(|path| !path.is_empty())
        .collect();
    let nested = find_nested_repositories(root, &ignored);
    let ignored: BTreeSet<String> = ignored
        .into_iter()
        .filter(|path| !is_within(path, &nested))
        .collect();

    let head = backend.head_paths()?;
    let index = backend.index_paths()?;
    let changes = change_set(backend, config, mode)?;
    let renames = rename_set(backend, mode, &changes);

    let on_disk: BTreeSet<String> = backend
        .untracked_paths()?
        .into_iter()
        .map(|path| path.trim_end_matches('/').to_string())
        .filter(|path| !path.is_empty() && !is_within(path, &nested))
        .collect();

    // Rename sources gone from disk are reported under their target
    let mut renamed_from: BTreeMap<String, String> = BTreeMap::new();
    let mut folded: BTreeSet<String> = BTreeSet::new();
    for rename in &renames {
        if let Some(old) = &rename.old_path {
            renamed_from.insert(rename.path.clone(), old.clone());
            if !root.join(old).exists() {
                folded.insert(old.clone());
            }
        }
    }

    let mut history: BTreeSet<String> = head.union(&index).cloned().collect();
    history.extend(changes.iter().map(|change| change.affected_path().to_string()));
    history.extend(renamed_from.keys().cloned());

    let mut classification = Classification::default();

    let entry = classification.entry(VCS_MARKER);
    entry.categories.insert(Category::Ignored);
    for repo in &nested {
        let entry = classification.entry(repo);
        entry.categories.insert(Category::Ignored);
        entry.nested_repo = true;
    }
    for path in &ignored {
        classification.entry(path).categories.insert(Category::Ignored);
    }

    let candidates = history
        .iter()
        .chain(on_disk.iter())
        .filter(|path| !folded.contains(*path))
        .filter(|path| !is_within(path, &nested));

    for path in candidates {
        if classification.get(path).is_some_and(|e| e.has(Category::Ignored)) {
            continue;
        }
        let decision = if config.tracked_paths.contains(path) {
            Category::Tracked
        } else if config.untracked_paths.contains(path) {
            Category::Untracked
        } else if history.contains(path) {
            Category::Tracked
        } else {
            Category::Undecided
        };
        classification.entry(path).categories.insert(decision);
    }

    for change in &changes {
        let path = change.affected_path();
        if folded.contains(path) || is_within(path, &nested) {
            continue;
        }
        if let Some(entry) = classification.entries.get_mut(path) {
            entry.categories.insert(Category::from(change.kind));
        }
    }

    for (target, old) in renamed_from {
        if let Some(entry) = classification.entries.get_mut(&target) {
            entry.categories.remove(&Category::Added);
            entry.categories.insert(Category::Renamed);
            entry.renamed_from = Some(old);
        }
    }

    classification.entries.remove(SIDECAR_FILE_NAME);

    log::debug!(
        "Classified {} paths ({})",
        classification.len(),
        mode.as_str()
    );
    Ok(classification)
}

fn change_set(
    backend: &impl VcsBackend,
    config: &WorkspaceConfig,
    mode: ComparisonMode,
) -> Result<Vec<ChangeEntry>> {
    match mode {
        ComparisonMode::WorkingVsIndex => backend.diff_workdir(DiffBase::Index),
        ComparisonMode::WorkingVsHead => backend.diff_workdir(DiffBase::Head),
        ComparisonMode::LocalVsRemote => {
            let remote_ref = config.remote_tracking_ref();
            let head = backend.resolve_ref("HEAD")?;
            let remote = backend.resolve_ref(&remote_ref)?;
            match (head, remote) {
                (Some(head), Some(remote)) => backend.diff_trees(Some(head), Some(remote), true),
                _ => {
                    log::debug!("No {remote_ref} to compare against");
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Renames never abort classification; a failing lookup reports none
fn rename_set(
    backend: &impl VcsBackend,
    mode: ComparisonMode,
    changes: &[ChangeEntry],
) -> Vec<ChangeEntry> {
    let base = match mode {
        ComparisonMode::WorkingVsIndex => DiffBase::Index,
        ComparisonMode::WorkingVsHead => DiffBase::Head,
        ComparisonMode::LocalVsRemote => {
            return changes
                .iter()
                .filter(|change| change.kind == ChangeKind::Renamed)
                .cloned()
                .collect();
        }
    };

    match backend.workdir_renames(base) {
        Ok(renames) => renames,
        Err(e) => {
            log::debug!("Rename detection unavailable: {e}");
            Vec::new()
        }
    }
}
