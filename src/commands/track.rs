use crate::core::{
    backend::VcsBackend,
    config::{ensure_gitignore_has_sidecar, normalize_repo_relative_path},
    discovery::{expand_to_files, normalize_path},
    error::{Result, VglError},
    git::GitRepo,
    output::{print_error_with_structured_usage, print_info, print_success},
    resolver::{resolve, ResolveContext},
};
use std::collections::BTreeSet;
use std::path::Path;

/// Record paths as tracked and stage them
pub fn execute_track(ctx: &ResolveContext, paths: Vec<String>) -> Result<()> {
    if paths.is_empty() {
        print_usage("track");
        return Err(VglError::no_paths_provided("track"));
    }

    let (repo, mut config) = resolve(ctx)?.into_workspace()?;
    let root = repo.root().to_path_buf();
    let files = expand_arguments(&repo, &ctx.current_dir, &paths)?;

    let changed = config.track(&files);
    let on_disk: Vec<String> = changed
        .iter()
        .filter(|path| root.join(path).exists())
        .cloned()
        .collect();
    repo.stage_paths(&on_disk)?;

    config.save(&root)?;
    ensure_gitignore_has_sidecar(&root)?;

    report("tracked", &changed);
    Ok(())
}

/// Record paths as untracked and drop them from the index, keeping the files
pub fn execute_untrack(ctx: &ResolveContext, paths: Vec<String>) -> Result<()> {
    if paths.is_empty() {
        print_usage("untrack");
        return Err(VglError::no_paths_provided("untrack"));
    }

    let (repo, mut config) = resolve(ctx)?.into_workspace()?;
    let root = repo.root().to_path_buf();
    let files = expand_arguments(&repo, &ctx.current_dir, &paths)?;

    let changed = config.untrack(&files);
    repo.unstage_paths(&changed)?;

    config.save(&root)?;
    ensure_gitignore_has_sidecar(&root)?;

    report("untracked", &changed);
    Ok(())
}

/// Files named by the arguments: directories and globs become the files below
/// them, skipping ignored paths and nested repositories
fn expand_arguments(
    repo: &GitRepo,
    current_dir: &Path,
    paths: &[String],
) -> Result<BTreeSet<String>> {
    let ignored: BTreeSet<String> = repo
        .list_ignored()?
        .into_iter()
        .map(|path| path.trim_end_matches('/').to_string())
        .filter(|path| !path.is_empty())
        .collect();
    let relative = to_repo_relative(repo.root(), current_dir, paths);
    let files = expand_to_files(repo.root(), &relative, &ignored);
    log::debug!("Expanded {} argument(s) to {} file(s)", paths.len(), files.len());
    Ok(files)
}

fn print_usage(command: &str) {
    print_error_with_structured_usage(
        "No paths provided",
        &[&format!("vgl {command} <path>...")],
        &[("-h, --help", "Show this help message")],
    );
}

fn report(decision: &str, changed: &[String]) {
    if changed.is_empty() {
        print_info(&format!("Nothing changed: all paths were already {decision}."));
        return;
    }
    print_success(&format!("Marked {} path(s) as {decision}:", changed.len()));
    for path in changed {
        println!("  {path}");
    }
    println!();
}

/// Arguments are relative to the current directory; the config stores them
/// relative to the repository root. The root itself becomes `.`, paths
/// outside the repository are dropped.
pub fn to_repo_relative(root: &Path, current_dir: &Path, paths: &[String]) -> Vec<String> {
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let current_dir =
        std::fs::canonicalize(current_dir).unwrap_or_else(|_| current_dir.to_path_buf());

    let mut relative = Vec::new();
    for path in paths {
        let absolute = normalize_path(&current_dir, Path::new(path));
        match absolute.strip_prefix(&root) {
            Ok(rel) => {
                let rel = normalize_repo_relative_path(&rel.to_string_lossy());
                if rel.is_empty() {
                    relative.push(".".to_string());
                } else {
                    relative.push(rel);
                }
            }
            Err(_) => log::warn!("Skipping {path}: outside {}", root.display()),
        }
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_repo_relative_from_subdirectory() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        std::fs::create_dir_all(root.join("src/core"))?;

        let relative = to_repo_relative(
            root,
            &root.join("src"),
            &["core/mod.rs".to_string(), "../README.md".to_string()],
        );
        assert_eq!(relative, vec!["src/core/mod.rs", "README.md"]);
        Ok(())
    }

    #[test]
    fn test_to_repo_relative_maps_root_and_drops_outside_paths() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("repo");
        std::fs::create_dir_all(&root)?;

        let relative = to_repo_relative(&root, &root, &["../elsewhere.txt".to_string(), ".".to_string()]);
        assert_eq!(relative, vec!["."]);
        Ok(())
    }

    #[test]
    fn test_track_without_paths() {
        let ctx = ResolveContext::new("/");
        let err = execute_track(&ctx, Vec::new()).unwrap_err();
        assert!(matches!(err, VglError::NoPathsProvided { .. }));
    }
}
