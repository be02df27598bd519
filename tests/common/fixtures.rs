//! Predefined repository scenarios

#![allow(dead_code)]

use super::repository::*;
use vgl::core::error::Result;

/// `main` and `feature` each change the only line of `file.txt` differently.
/// HEAD is left on `main`.
pub fn create_conflicting_branches() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    commit_file(&repo.path, "file.txt", "base line\n", "Base")?;

    git_checkout_new_branch(&repo.path, "feature")?;
    commit_file(&repo.path, "file.txt", "feature line\n", "Feature change")?;

    git_checkout(&repo.path, "main")?;
    commit_file(&repo.path, "file.txt", "main line\n", "Main change")?;

    Ok(repo)
}

/// `feature` adds two commits touching files `main` never changes
pub fn create_clean_merge_branches() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    commit_file(&repo.path, "shared.txt", "shared\n", "Base")?;
    commit_file(&repo.path, "obsolete.txt", "old\n", "Add obsolete")?;

    git_checkout_new_branch(&repo.path, "feature")?;
    commit_file(&repo.path, "added.txt", "new\n", "Add file")?;
    git(&repo.path, &["rm", "-q", "obsolete.txt"])?;
    git_commit(&repo.path, "Remove obsolete")?;

    git_checkout(&repo.path, "main")?;
    commit_file(&repo.path, "main-only.txt", "main\n", "Main work")?;

    Ok(repo)
}

/// Committed `a.txt` and an untouched new `b.txt`
pub fn create_committed_and_new() -> Result<TestRepo> {
    let repo = setup_test_repo()?;
    commit_file(&repo.path, "a.txt", "alpha\n", "Add a")?;
    create_file(&repo.path, "b.txt", "beta\n")?;
    Ok(repo)
}
