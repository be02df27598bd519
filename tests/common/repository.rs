//! Git repository management and setup utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vgl::core::error::{Result, VglError};

/// Temporary repository. The TempDir must be kept alive for the duration of
/// the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Run git in `repo_path`, failing the helper when git fails
pub fn git(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .map_err(VglError::Io)?;

    if !output.status.success() {
        return Err(VglError::git_command_failed(format!(
            "git {}: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Fresh repository on branch `main` with a local identity and no signing.
/// The path is canonicalized so it compares equal to resolved roots.
pub fn setup_test_repo() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = fs::canonicalize(temp_dir.path())?;

    git(&repo_path, &["init", "-q"])?;
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;
    git(&repo_path, &["config", "commit.gpgsign", "false"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Repository with "initial.txt" committed on `main`
pub fn setup_test_repo_with_initial_commit() -> Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git_add(&repo.path, "initial.txt")?;
    git_commit(&repo.path, "Initial commit")?;

    Ok(repo)
}

/// Empty canonicalized temporary directory with no markers
pub fn setup_plain_dir() -> Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let path = fs::canonicalize(temp_dir.path())?;
    Ok(TestRepo { temp_dir, path })
}

/// Creates a file, and any missing parent directories
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn remove_file(repo_path: &Path, filename: &str) -> Result<()> {
    fs::remove_file(repo_path.join(filename))?;
    Ok(())
}

pub fn git_add(repo_path: &Path, filename: &str) -> Result<()> {
    git(repo_path, &["add", filename])?;
    Ok(())
}

pub fn git_commit(repo_path: &Path, message: &str) -> Result<()> {
    git(repo_path, &["commit", "-q", "-m", message])?;
    Ok(())
}

/// Commit `content` as `filename` in one step
pub fn commit_file(repo_path: &Path, filename: &str, content: &str, message: &str) -> Result<()> {
    create_file(repo_path, filename, content)?;
    git_add(repo_path, filename)?;
    git_commit(repo_path, message)
}

pub fn git_checkout(repo_path: &Path, branch: &str) -> Result<()> {
    git(repo_path, &["checkout", "-q", branch])?;
    Ok(())
}

pub fn git_checkout_new_branch(repo_path: &Path, branch: &str) -> Result<()> {
    git(repo_path, &["checkout", "-q", "-b", branch])?;
    Ok(())
}

pub fn rev_parse(repo_path: &Path, rev: &str) -> Result<String> {
    git(repo_path, &["rev-parse", rev])
}

/// Paths currently in the index, as `git ls-files` prints them
pub fn ls_files(repo_path: &Path) -> Result<Vec<String>> {
    Ok(git(repo_path, &["ls-files"])?
        .lines()
        .map(str::to_string)
        .collect())
}

pub fn open_repo(test_repo: &TestRepo) -> Result<vgl::core::git::GitRepo> {
    vgl::core::git::GitRepo::open(&test_repo.path)
}
