//! Workspace sidecar configuration (`.vgl`).
//!
//! The sidecar is a properties-style text file at the repository root holding
//! branch and remote pointers, the jump snapshot, and the explicit track /
//! untrack decisions. Unknown keys survive a load/save round trip.
//!
//! # Public API
//! - [`WorkspaceConfig`]: Parsed sidecar with typed accessors and mutations
//! - [`normalize_repo_relative_path`]: Canonical form used for every stored path
//! - [`ensure_gitignore_has_sidecar`]: Keep `.vgl` out of the repository

use crate::core::discovery::SIDECAR_FILE_NAME;
use crate::core::error::{Result, VglError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const KEY_LOCAL_DIR: &str = "local.dir";
pub const KEY_LOCAL_BRANCH: &str = "local.branch";
pub const KEY_REMOTE_URL: &str = "remote.url";
pub const KEY_REMOTE_BRANCH: &str = "remote.branch";
pub const KEY_JUMP_LOCAL_DIR: &str = "jump.local.dir";
pub const KEY_JUMP_LOCAL_BRANCH: &str = "jump.local.branch";
pub const KEY_JUMP_REMOTE_URL: &str = "jump.remote.url";
pub const KEY_JUMP_REMOTE_BRANCH: &str = "jump.remote.branch";
pub const KEY_TRACKED_FILES: &str = "tracked.files";
pub const KEY_UNTRACKED_FILES: &str = "untracked.files";

pub const DEFAULT_BRANCH: &str = "main";

/// Separator of the display decoration some writers append to directory values
const DISPLAY_SUFFIX_SEPARATOR: &str = " :: ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub local_dir: Option<String>,
    pub local_branch: Option<String>,
    pub remote_url: Option<String>,
    pub remote_branch: Option<String>,
    pub jump_local_dir: Option<String>,
    pub jump_local_branch: Option<String>,
    pub jump_remote_url: Option<String>,
    pub jump_remote_branch: Option<String>,
    pub tracked_paths: BTreeSet<String>,
    pub untracked_paths: BTreeSet<String>,
    extra: BTreeMap<String, String>,
}

impl WorkspaceConfig {
    /// Minimal config for a freshly materialized sidecar
    pub fn new(root: &Path, branch: Option<&str>) -> Self {
        Self {
            local_dir: Some(root.to_string_lossy().into_owned()),
            local_branch: Some(branch.unwrap_or(DEFAULT_BRANCH).to_string()),
            ..Default::default()
        }
    }

    pub fn sidecar_path(root: &Path) -> PathBuf {
        root.join(SIDECAR_FILE_NAME)
    }

    /// Load the sidecar at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| VglError::config_read_failed(path, e))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for (key, value) in parse_properties(content) {
            match key.as_str() {
                KEY_LOCAL_DIR => config.local_dir = non_blank(value),
                KEY_LOCAL_BRANCH => config.local_branch = non_blank(value),
                KEY_REMOTE_URL => config.remote_url = non_blank(value),
                KEY_REMOTE_BRANCH => config.remote_branch = non_blank(value),
                KEY_JUMP_LOCAL_DIR => config.jump_local_dir = non_blank(value),
                KEY_JUMP_LOCAL_BRANCH => config.jump_local_branch = non_blank(value),
                KEY_JUMP_REMOTE_URL => config.jump_remote_url = non_blank(value),
                KEY_JUMP_REMOTE_BRANCH => config.jump_remote_branch = non_blank(value),
                KEY_TRACKED_FILES => config.tracked_paths = parse_path_set(&value),
                KEY_UNTRACKED_FILES => config.untracked_paths = parse_path_set(&value),
                _ => {
                    config.extra.insert(key, value);
                }
            }
        }

        let overlap: Vec<String> = config
            .tracked_paths
            .intersection(&config.untracked_paths)
            .cloned()
            .collect();
        if !overlap.is_empty() {
            log::warn!(
                "Paths listed as both tracked and untracked, keeping them tracked: {}",
                overlap.join(", ")
            );
            for path in &overlap {
                config.untracked_paths.remove(path);
            }
        }

        config
    }

    pub fn to_properties(&self) -> String {
        let mut out = String::from("# VGL Configuration\n");
        let mut put = |key: &str, value: &str| {
            out.push_str(key);
            out.push('=');
            out.push_str(&escape_value(value));
            out.push('\n');
        };

        let optional = [
            (KEY_LOCAL_DIR, &self.local_dir),
            (KEY_LOCAL_BRANCH, &self.local_branch),
            (KEY_REMOTE_URL, &self.remote_url),
            (KEY_REMOTE_BRANCH, &self.remote_branch),
            (KEY_JUMP_LOCAL_DIR, &self.jump_local_dir),
            (KEY_JUMP_LOCAL_BRANCH, &self.jump_local_branch),
            (KEY_JUMP_REMOTE_URL, &self.jump_remote_url),
            (KEY_JUMP_REMOTE_BRANCH, &self.jump_remote_branch),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                put(key, value);
            }
        }

        if !self.tracked_paths.is_empty() {
            put(KEY_TRACKED_FILES, &join_path_set(&self.tracked_paths));
        }
        if !self.untracked_paths.is_empty() {
            put(KEY_UNTRACKED_FILES, &join_path_set(&self.untracked_paths));
        }
        for (key, value) in &self.extra {
            put(key, value);
        }

        out
    }

    /// Write the sidecar into `root`
    pub fn save(&self, root: &Path) -> Result<PathBuf> {
        let path = Self::sidecar_path(root);
        std::fs::write(&path, self.to_properties())
            .map_err(|e| VglError::config_write_failed(&path, e))?;
        log::debug!("Saved workspace config to {}", path.display());
        Ok(path)
    }

    /// `local.dir` with any display decoration removed
    pub fn local_dir_raw(&self) -> Option<&str> {
        self.local_dir.as_deref().map(strip_display_suffix)
    }

    pub fn remote_branch_or_default(&self) -> &str {
        self.remote_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    /// Remote-tracking ref the local branch is compared against
    pub fn remote_tracking_ref(&self) -> String {
        format!("refs/remotes/origin/{}", self.remote_branch_or_default())
    }

    /// Every path that has been the subject of an explicit decision
    pub fn decided_paths(&self) -> BTreeSet<String> {
        self.tracked_paths
            .union(&self.untracked_paths)
            .cloned()
            .collect()
    }

    /// Record paths as tracked; returns the normalized paths that changed state
    pub fn track<I, S>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = Vec::new();
        for path in paths {
            let path = normalize_repo_relative_path(path.as_ref());
            if path.is_empty() || path == SIDECAR_FILE_NAME {
                continue;
            }
            self.untracked_paths.remove(&path);
            if self.tracked_paths.insert(path.clone()) {
                changed.push(path);
            }
        }
        changed
    }

    /// Record paths as untracked; returns the normalized paths that changed state
    pub fn untrack<I, S>(&mut self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = Vec::new();
        for path in paths {
            let path = normalize_repo_relative_path(path.as_ref());
            if path.is_empty() || path == SIDECAR_FILE_NAME {
                continue;
            }
            self.tracked_paths.remove(&path);
            if self.untracked_paths.insert(path.clone()) {
                changed.push(path);
            }
        }
        changed
    }
}

/// Remove a trailing ` :: branch` style decoration from a stored directory value
pub fn strip_display_suffix(value: &str) -> &str {
    match value.find(DISPLAY_SUFFIX_SEPARATOR) {
        Some(idx) => value[..idx].trim(),
        None => value.trim(),
    }
}

/// Canonical repo-relative form: `/` separators, no leading `./` or `/`
pub fn normalize_repo_relative_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    if normalized == "." {
        return String::new();
    }
    normalized.trim_start_matches('/').to_string()
}

/// Append the sidecar name to `.gitignore` unless it is already listed
pub fn ensure_gitignore_has_sidecar(root: &Path) -> Result<()> {
    let gitignore = root.join(".gitignore");
    let content = if gitignore.is_file() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };

    if content.lines().any(|line| line.trim() == SIDECAR_FILE_NAME) {
        return Ok(());
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(SIDECAR_FILE_NAME);
    updated.push('\n');
    std::fs::write(&gitignore, updated)?;
    Ok(())
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_path_set(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(normalize_repo_relative_path)
        .filter(|p| !p.is_empty())
        .collect()
}

fn join_path_set(paths: &BTreeSet<String>) -> String {
    paths.iter().cloned().collect::<Vec<_>>().join(",")
}

/// Parse properties-style lines, honoring `\` continuations and escapes
fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let mut logical = line.trim_start().to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        entries.push((unescape(key), unescape(value)));
    }

    entries
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (line[..idx].trim_end(), line[idx + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (&line[..idx], rest.trim_start());
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (idx, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            ':' | '=' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            ' ' if idx == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
