use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

mod common;
use common::{assertions, fixtures::*, repository::*};

/// `vgl` with colors off and the user state redirected into `state_dir`
fn vgl(cwd: &Path, state_dir: &Path) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("vgl")?;
    cmd.current_dir(cwd)
        .env("VGL_STATE", state_dir.join("state.json"))
        .env("NO_COLOR", "1")
        .arg("--non-interactive");
    Ok(cmd)
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_status_lists_undecided_files() -> anyhow::Result<()> {
        let repo = create_committed_and_new()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .arg("status")
            .assert()
            .success()
            .stdout(assertions::has_workspace_header())
            .stdout(predicate::str::contains("Undecided files"))
            .stdout(predicate::str::contains("b.txt"))
            .stdout(predicate::str::contains("1 tracked"))
            .stdout(predicate::str::contains("1 undecided"));

        Ok(())
    }

    #[test]
    fn test_status_against_head_shows_staged_addition() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let state = setup_plain_dir()?;
        create_file(&repo.path, "staged.txt", "new\n")?;
        git_add(&repo.path, "staged.txt")?;

        vgl(&repo.path, &state.path)?
            .args(["status", "--against", "head"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Changes to tracked files"))
            .stdout(predicate::str::contains("staged.txt"))
            .stdout(predicate::str::contains("1 added"));

        Ok(())
    }

    #[test]
    fn test_status_reports_commit_sync() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("(remote branch not found)"));

        git(&repo.path, &["update-ref", "refs/remotes/origin/main", "HEAD"])?;
        commit_file(&repo.path, "ahead.txt", "ahead\n", "Ahead")?;

        vgl(&repo.path, &state.path)?
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Commits:"))
            .stdout(predicate::str::contains("1 commit(s) to push"));

        Ok(())
    }

    #[test]
    fn test_status_outside_repository_fails() -> anyhow::Result<()> {
        let dir = setup_plain_dir()?;
        let state = setup_plain_dir()?;

        vgl(&dir.path, &state.path)?
            .arg("status")
            .assert()
            .failure()
            .stdout(assertions::is_error())
            .stdout(predicate::str::contains("No repository found"))
            .stdout(predicate::str::contains("vgl create"));

        Ok(())
    }

    #[test]
    fn test_resolve_reports_kind() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .arg("resolve")
            .assert()
            .success()
            .stdout(assertions::has_resolution("vcs-only"))
            .stdout(predicate::str::contains("local.branch:"));

        Ok(())
    }

    #[test]
    fn test_resolve_remember_enables_fast_path() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let elsewhere = setup_plain_dir()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .args(["resolve", "--remember"])
            .assert()
            .success();
        assert!(state.path.join("state.json").is_file());

        vgl(&elsewhere.path, &state.path)?
            .arg("resolve")
            .assert()
            .success()
            .stdout(assertions::has_resolution("both"))
            .stdout(predicate::str::contains(repo.path.display().to_string()));

        vgl(&elsewhere.path, &state.path)?
            .args(["resolve", "--forget"])
            .assert()
            .failure()
            .stdout(assertions::has_resolution("none"));
        assert!(!state.path.join("state.json").exists());

        Ok(())
    }

    #[test]
    fn test_resolve_reports_stale_state() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let state = setup_plain_dir()?;
        std::fs::write(
            state.path.join("state.json"),
            format!(
                "{{\"local_dir\":\"{}\",\"local_branch\":null,\"remote_url\":null,\"remote_branch\":null,\"updated_at\":\"2024-01-01T00:00:00Z\"}}",
                state.path.join("gone").display()
            ),
        )?;

        vgl(&repo.path, &state.path)?
            .arg("resolve")
            .assert()
            .failure()
            .stdout(assertions::has_resolution("corrupted"))
            .stdout(predicate::str::contains("gone"));

        Ok(())
    }

    #[test]
    fn test_preview_conflicting_branch() -> anyhow::Result<()> {
        let repo = create_conflicting_branches()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .args(["preview", "feature", "--verbose"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "1 commit(s), 1 file(s) affected (1 with conflicts, 0 without conflicts)",
            ))
            .stdout(predicate::str::contains("-- Files with Conflicts:"))
            .stdout(predicate::str::contains("file.txt"));

        Ok(())
    }

    #[test]
    fn test_preview_unknown_branch_is_noop() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .args(["preview", "nowhere"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to merge"));

        Ok(())
    }

    #[test]
    fn test_track_records_and_stages() -> anyhow::Result<()> {
        let repo = create_committed_and_new()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .args(["track", "b.txt"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Marked 1 path(s) as tracked"));

        let sidecar = std::fs::read_to_string(repo.path.join(".vgl"))?;
        assert!(sidecar.contains("tracked.files=b.txt"));
        assert!(ls_files(&repo.path)?.contains(&"b.txt".to_string()));

        let gitignore = std::fs::read_to_string(repo.path.join(".gitignore"))?;
        assert!(gitignore.lines().any(|line| line == ".vgl"));

        Ok(())
    }

    #[test]
    fn test_untrack_keeps_file_on_disk() -> anyhow::Result<()> {
        let repo = create_committed_and_new()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .args(["untrack", "a.txt"])
            .assert()
            .success();

        let sidecar = std::fs::read_to_string(repo.path.join(".vgl"))?;
        assert!(sidecar.contains("untracked.files=a.txt"));
        assert!(!ls_files(&repo.path)?.contains(&"a.txt".to_string()));
        assert!(repo.path.join("a.txt").is_file());

        vgl(&repo.path, &state.path)?
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Untracked files"))
            .stdout(predicate::str::contains("1 untracked"));

        Ok(())
    }

    #[test]
    fn test_untrack_directory_records_each_file() -> anyhow::Result<()> {
        let repo = setup_test_repo_with_initial_commit()?;
        let state = setup_plain_dir()?;
        create_file(&repo.path, "build/out.txt", "out\n")?;
        create_file(&repo.path, "build/sub/deep.txt", "deep\n")?;

        vgl(&repo.path, &state.path)?
            .args(["untrack", "build"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Marked 2 path(s) as untracked"));

        let sidecar = std::fs::read_to_string(repo.path.join(".vgl"))?;
        assert!(sidecar.contains("untracked.files=build/out.txt,build/sub/deep.txt"));

        vgl(&repo.path, &state.path)?
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 untracked"));

        Ok(())
    }

    #[test]
    fn test_track_glob_expands_to_matching_files() -> anyhow::Result<()> {
        let repo = create_committed_and_new()?;
        let state = setup_plain_dir()?;
        create_file(&repo.path, "notes.md", "notes\n")?;

        vgl(&repo.path, &state.path)?
            .args(["track", "*.txt"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Marked 2 path(s) as tracked"));

        let sidecar = std::fs::read_to_string(repo.path.join(".vgl"))?;
        assert!(sidecar.contains("tracked.files=a.txt,b.txt"));
        assert!(!sidecar.contains("*.txt"));
        assert!(ls_files(&repo.path)?.contains(&"b.txt".to_string()));
        assert!(!ls_files(&repo.path)?.contains(&"notes.md".to_string()));

        Ok(())
    }

    #[test]
    fn test_track_without_paths_shows_usage() -> anyhow::Result<()> {
        let repo = setup_test_repo()?;
        let state = setup_plain_dir()?;

        vgl(&repo.path, &state.path)?
            .arg("track")
            .assert()
            .failure()
            .stdout(assertions::is_error())
            .stdout(predicate::str::contains("Usage:"));

        Ok(())
    }

    #[test]
    fn test_create_sets_up_workspace() -> anyhow::Result<()> {
        let dir = setup_plain_dir()?;
        let state = setup_plain_dir()?;

        vgl(&dir.path, &state.path)?
            .args(["create", "project"])
            .assert()
            .success();

        let project = dir.path.join("project");
        assert!(project.join(".git").exists());
        assert!(project.join(".vgl").is_file());

        vgl(&project, &state.path)?
            .arg("resolve")
            .assert()
            .success()
            .stdout(assertions::has_resolution("both"));

        Ok(())
    }
}
