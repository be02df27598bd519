use crate::core::{
    backend::VcsBackend,
    config::WorkspaceConfig,
    discovery::{has_vcs_marker, normalize_path},
    error::Result,
    git::GitRepo,
    output::{print_info, print_success},
    resolver::{materialize_config, ResolveContext},
};
use std::path::Path;

/// Make `path` (default: the current directory) a vgl workspace, initializing
/// a git repository there first if it has none.
pub fn execute_create(ctx: &ResolveContext, path: Option<String>) -> Result<()> {
    let target = normalize_path(&ctx.current_dir, Path::new(path.as_deref().unwrap_or(".")));
    std::fs::create_dir_all(&target)?;

    let repo = if has_vcs_marker(&target) {
        GitRepo::open(&target)?
    } else {
        log::debug!("Initializing git repository in {}", target.display());
        GitRepo::init(&target)?
    };

    if WorkspaceConfig::sidecar_path(&target).is_file() {
        print_info(&format!("{} is already a vgl workspace.", target.display()));
        return Ok(());
    }

    let branch = repo.current_branch()?;
    let sidecar = materialize_config(&target, branch.as_deref())?;
    print_success(&format!("Created {}", sidecar.display()));
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolver::{resolve, ResolutionKind};
    use tempfile::TempDir;

    #[test]
    fn test_create_initializes_repository_and_sidecar() -> Result<()> {
        let temp = TempDir::new()?;
        let ctx = ResolveContext::new(temp.path());
        execute_create(&ctx, Some("project".to_string()))?;

        let root = temp.path().join("project");
        assert!(root.join(".git").exists());
        assert!(root.join(".vgl").is_file());

        let gitignore = std::fs::read_to_string(root.join(".gitignore"))?;
        assert!(gitignore.lines().any(|line| line == ".vgl"));

        let result = resolve(&ResolveContext::new(&root))?;
        assert_eq!(result.kind, ResolutionKind::Both);
        Ok(())
    }

    #[test]
    fn test_create_is_idempotent() -> Result<()> {
        let temp = TempDir::new()?;
        let ctx = ResolveContext::new(temp.path());
        execute_create(&ctx, None)?;
        let before = std::fs::read_to_string(temp.path().join(".vgl"))?;
        execute_create(&ctx, None)?;
        assert_eq!(std::fs::read_to_string(temp.path().join(".vgl"))?, before);
        Ok(())
    }
}
