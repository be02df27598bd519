//! Filesystem discovery of repository markers and sidecar files.
//!
//! These helpers work on bare paths, before any repository handle exists,
//! so they only ever look for marker entries on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Entry identifying a directory as a repository root
pub const VCS_MARKER: &str = ".git";

/// Workspace sidecar file kept beside the repository root
pub const SIDECAR_FILE_NAME: &str = ".vgl";

pub fn has_vcs_marker(dir: &Path) -> bool {
    dir.join(VCS_MARKER).exists()
}

/// Make `path` absolute against `base` and drop `.` components.
/// `..` is resolved lexically so missing directories can still be reported.
pub fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Nearest directory at or above `start` that carries a repository marker
pub fn find_enclosing_repository(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| has_vcs_marker(dir))
        .map(Path::to_path_buf)
}

/// Nearest sidecar file at or above `start`.
///
/// The search stops at the first directory carrying a repository marker,
/// after checking that directory itself.
pub fn find_sidecar(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(SIDECAR_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if has_vcs_marker(dir) {
            break;
        }
    }
    None
}

/// Repo-relative paths (no trailing slash) of directories below `root` that
/// are repositories of their own. Traversal does not descend into them, nor
/// into anything listed in `skip` (typically the ignored trees).
pub fn find_nested_repositories(root: &Path, skip: &BTreeSet<String>) -> BTreeSet<String> {
    let mut nested = BTreeSet::new();

    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry during nested repo scan: {e}");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() == VCS_MARKER {
            walker.skip_current_dir();
            continue;
        }
        let rel = match relative_to(root, entry.path()) {
            Some(rel) => rel,
            None => continue,
        };
        if is_within(&rel, skip) {
            walker.skip_current_dir();
            continue;
        }
        if has_vcs_marker(entry.path()) {
            nested.insert(rel);
            walker.skip_current_dir();
        }
    }

    nested
}

/// True when `path` is one of `roots` or lies inside one
pub fn is_within(path: &str, roots: &BTreeSet<String>) -> bool {
    let path = path.trim_end_matches('/');
    roots
        .iter()
        .any(|root| path == root || path.starts_with(&format!("{root}/")))
}

/// Expand repo-relative arguments into the repo-relative files they name.
///
/// `.`, `*` and the empty string stand for the whole tree, a directory for
/// every file below it, and an argument containing glob metacharacters is
/// matched against every file and directory path. Any other argument is kept
/// as a literal path so decisions can be recorded for files that are gone.
/// The `.git` directory, nested repositories, the sidecar and everything
/// under `ignored` never appear in the result.
pub fn expand_to_files(root: &Path, args: &[String], ignored: &BTreeSet<String>) -> BTreeSet<String> {
    let nested = find_nested_repositories(root, ignored);
    let excluded = |rel: &str| {
        rel == VCS_MARKER
            || rel.starts_with(".git/")
            || rel == SIDECAR_FILE_NAME
            || is_within(rel, &nested)
            || is_within(rel, ignored)
    };

    let mut files = BTreeSet::new();
    for arg in args {
        let arg = arg.trim_end_matches('/');
        if arg.is_empty() || arg == "." || arg == "*" {
            files.extend(files_below(root, root, &excluded));
        } else if has_glob_meta(arg) {
            for (rel, is_dir) in entries_below(root, root, &excluded) {
                if !glob_match::glob_match(arg, &rel) {
                    continue;
                }
                if is_dir {
                    files.extend(files_below(root, &root.join(&rel), &excluded));
                } else {
                    files.insert(rel);
                }
            }
        } else if root.join(arg).is_dir() {
            if !excluded(arg) {
                files.extend(files_below(root, &root.join(arg), &excluded));
            }
        } else if !excluded(arg) {
            files.insert(arg.to_string());
        }
    }
    files
}

fn has_glob_meta(arg: &str) -> bool {
    arg.contains(['*', '?', '[', '{'])
}

fn relative_to(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// Every file and directory below `start`, pruning excluded directories
fn entries_below(
    root: &Path,
    start: &Path,
    excluded: &dyn Fn(&str) -> bool,
) -> Vec<(String, bool)> {
    WalkDir::new(start)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| relative_to(root, entry.path()).is_some_and(|rel| !excluded(&rel)))
        .filter_map(|entry| match entry {
            Ok(entry) => {
                let rel = relative_to(root, entry.path())?;
                Some((rel, entry.file_type().is_dir()))
            }
            Err(e) => {
                log::debug!("Skipping unreadable entry during expansion: {e}");
                None
            }
        })
        .collect()
}

fn files_below(root: &Path, start: &Path, excluded: &dyn Fn(&str) -> bool) -> Vec<String> {
    entries_below(root, start, excluded)
        .into_iter()
        .filter(|(_, is_dir)| !is_dir)
        .map(|(rel, _)| rel)
        .collect()
}
