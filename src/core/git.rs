//! Git repository operations backing the workspace engine.
//!
//! This module provides [`GitRepo`], the repository handle used throughout vgl.
//! It wraps the `git2` library and implements [`VcsBackend`] so that resolution,
//! classification and merge preview never depend on git2 directly.
//!
//! # Public API
//! - [`GitRepo`]: Opened repository bound to one working tree
//!
//! # Key Features
//! - **Ref resolution**: Missing refs and unborn branches resolve to `None`
//! - **Diffs**: Tree/tree and tree/working-tree diffs as typed [`ChangeEntry`] lists
//! - **Rename detection**: Includes renames onto not-yet-indexed files
//! - **Trial merge**: In-memory merge via `merge_commits`, nothing is written
//! - **Index mirroring**: Stage and unstage paths for explicit track decisions

use crate::core::{
    backend::{ChangeEntry, ChangeKind, DiffBase, TrialMerge, VcsBackend},
    error::{Result, VglError},
};
use git2::{
    Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, MergeOptions, ObjectType, Oid,
    Repository, Status, StatusOptions, Tree, TreeWalkMode, TreeWalkResult,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo").field("root", &self.root).finish()
    }
}

impl GitRepo {
    /// Open the repository whose working tree is exactly `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path)?;
        Self::from_repository(repo)
    }

    /// Initialize a new repository with a working tree at `path`
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::init(path)?;
        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or(VglError::NoWorkingDirectory)?
            .to_path_buf();
        Ok(GitRepo { repo, root })
    }

    /// Execute a git command in the repository's working directory
    fn execute_git_command(&self, mut cmd: std::process::Command) -> Result<()> {
        cmd.current_dir(&self.root);

        let output = cmd.output().map_err(VglError::Io)?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(VglError::git_command_failed(error_msg.trim()));
        }

        Ok(())
    }

    /// Add paths to the index
    pub fn stage_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut cmd = std::process::Command::new("git");
        cmd.arg("add").arg("--");

        for path in paths {
            cmd.arg(path);
        }

        self.execute_git_command(cmd)
    }

    /// Drop paths from the index while leaving the files on disk
    pub fn unstage_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut cmd = std::process::Command::new("git");
        cmd.args(["rm", "--cached", "--ignore-unmatch", "-r", "-q", "--"]);

        for path in paths {
            cmd.arg(path);
        }

        self.execute_git_command(cmd)
    }

    fn commit_tree(&self, oid: Option<Oid>) -> Result<Option<Tree<'_>>> {
        match oid {
            Some(oid) => Ok(Some(self.repo.find_commit(oid)?.tree()?)),
            None => Ok(None),
        }
    }

    fn head_tree(&self) -> Result<Option<Tree<'_>>> {
        let head = self.resolve_ref("HEAD")?;
        self.commit_tree(head)
    }

    fn workdir_diff(&self, base: DiffBase, opts: &mut DiffOptions) -> Result<Diff<'_>> {
        let diff = match base {
            DiffBase::Index => self.repo.diff_index_to_workdir(None, Some(opts))?,
            DiffBase::Head => {
                let tree = self.head_tree()?;
                self.repo
                    .diff_tree_to_workdir_with_index(tree.as_ref(), Some(opts))?
            }
        };
        Ok(diff)
    }

    fn status_paths(&self, opts: &mut StatusOptions, wanted: Status) -> Result<BTreeSet<String>> {
        let statuses = self.repo.statuses(Some(opts))?;
        let mut paths = BTreeSet::new();

        for entry in statuses.iter() {
            if !entry.status().intersects(wanted) {
                continue;
            }
            let path = entry.path().ok_or(VglError::InvalidUtf8Path)?;
            paths.insert(path.replace('\\', "/"));
        }

        Ok(paths)
    }
}

impl VcsBackend for GitRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn resolve_ref(&self, name: &str) -> Result<Option<Oid>> {
        let object = match self.repo.revparse_single(name) {
            Ok(object) => object,
            Err(e) if is_unresolvable(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match object.peel_to_commit() {
            Ok(commit) => Ok(Some(commit.id())),
            Err(e) if is_unresolvable(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.find_reference("HEAD")?;

        // Detached HEAD has no symbolic target
        Ok(head.symbolic_target().map(|target| {
            target
                .strip_prefix("refs/heads/")
                .unwrap_or(target)
                .to_string()
        }))
    }

    fn diff_trees(
        &self,
        from: Option<Oid>,
        to: Option<Oid>,
        detect_renames: bool,
    ) -> Result<Vec<ChangeEntry>> {
        let from_tree = self.commit_tree(from)?;
        let to_tree = self.commit_tree(to)?;

        let mut opts = DiffOptions::new();
        let mut diff =
            self.repo
                .diff_tree_to_tree(from_tree.as_ref(), to_tree.as_ref(), Some(&mut opts))?;

        if detect_renames {
            let mut find = DiffFindOptions::new();
            find.renames(true);
            diff.find_similar(Some(&mut find))?;
        }

        collect_changes(&diff)
    }

    fn diff_workdir(&self, base: DiffBase) -> Result<Vec<ChangeEntry>> {
        let mut opts = DiffOptions::new();
        opts.include_untracked(false);
        let diff = self.workdir_diff(base, &mut opts)?;
        collect_changes(&diff)
    }

    fn workdir_renames(&self, base: DiffBase) -> Result<Vec<ChangeEntry>> {
        let mut opts = DiffOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let mut diff = self.workdir_diff(base, &mut opts)?;

        let mut find = DiffFindOptions::new();
        find.renames(true).for_untracked(true);
        diff.find_similar(Some(&mut find))?;

        Ok(collect_changes(&diff)?
            .into_iter()
            .filter(|change| change.kind == ChangeKind::Renamed)
            .collect())
    }

    fn head_paths(&self) -> Result<BTreeSet<String>> {
        let mut paths = BTreeSet::new();
        let tree = match self.head_tree()? {
            Some(tree) => tree,
            None => return Ok(paths),
        };

        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    paths.insert(format!("{dir}{name}"));
                }
            }
            TreeWalkResult::Ok
        })?;

        Ok(paths)
    }

    fn index_paths(&self) -> Result<BTreeSet<String>> {
        let mut index = self.repo.index()?;
        // Pick up changes made by external git commands
        index.read(true)?;
        let mut paths = BTreeSet::new();

        for entry in index.iter() {
            let path = String::from_utf8(entry.path).map_err(|_| VglError::InvalidUtf8Path)?;
            paths.insert(path);
        }

        Ok(paths)
    }

    fn untracked_paths(&self) -> Result<BTreeSet<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);
        self.status_paths(&mut opts, Status::WT_NEW)
    }

    fn list_ignored(&self) -> Result<BTreeSet<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .include_ignored(true)
            .recurse_ignored_dirs(false)
            .exclude_submodules(true);
        self.status_paths(&mut opts, Status::IGNORED)
    }

    fn trial_merge(&self, base: Oid, source: Oid) -> Result<TrialMerge> {
        let ours = self.repo.find_commit(base)?;
        let theirs = self.repo.find_commit(source)?;

        // merge_commits builds an in-memory index; nothing is written back
        let index = self
            .repo
            .merge_commits(&ours, &theirs, Some(&MergeOptions::new()))?;

        let mut unmerged_paths = BTreeSet::new();
        if index.has_conflicts() {
            for conflict in index.conflicts()? {
                let conflict = conflict?;
                let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
                if let Some(entry) = entry {
                    let path =
                        String::from_utf8(entry.path).map_err(|_| VglError::InvalidUtf8Path)?;
                    unmerged_paths.insert(path);
                }
            }
        }

        Ok(TrialMerge {
            success: unmerged_paths.is_empty(),
            unmerged_paths,
        })
    }

    fn commits_reachable_from(&self, tip: Oid, excluding: Oid) -> Result<usize> {
        let mut walk = self.repo.revwalk()?;
        walk.push(tip)?;
        walk.hide(excluding)?;

        let mut count = 0;
        for oid in walk {
            oid?;
            count += 1;
        }
        Ok(count)
    }
}

fn is_unresolvable(err: &git2::Error) -> bool {
    matches!(
        err.code(),
        ErrorCode::NotFound | ErrorCode::UnbornBranch | ErrorCode::InvalidSpec | ErrorCode::Peel
    )
}

fn delta_path(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(p) => {
            let s = p.to_str().ok_or(VglError::InvalidUtf8Path)?;
            Ok(Some(s.replace('\\', "/")))
        }
        None => Ok(None),
    }
}

fn collect_changes(diff: &Diff<'_>) -> Result<Vec<ChangeEntry>> {
    let mut changes = Vec::new();

    for delta in diff.deltas() {
        let old_path = delta_path(delta.old_file().path())?;
        let new_path = delta_path(delta.new_file().path())?;

        let change = match delta.status() {
            Delta::Added | Delta::Copied => new_path.map(|p| ChangeEntry::new(p, ChangeKind::Added)),
            Delta::Modified | Delta::Typechange => {
                new_path.map(|p| ChangeEntry::new(p, ChangeKind::Modified))
            }
            Delta::Deleted => old_path.map(|p| ChangeEntry {
                path: p.clone(),
                old_path: Some(p),
                kind: ChangeKind::Removed,
            }),
            Delta::Renamed => match (old_path, new_path) {
                (Some(old), Some(new)) => Some(ChangeEntry::renamed(old, new)),
                _ => None,
            },
            _ => None,
        };

        if let Some(change) = change {
            changes.push(change);
        }
    }

    Ok(changes)
}
