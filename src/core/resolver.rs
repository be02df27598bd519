//! Repository resolution.
//!
//! [`resolve`] reconciles three sources of truth into one [`ResolutionResult`]:
//! the user-level fast-path pointer, the workspace sidecar, and the nearest
//! git repository. "Nothing found" and "something is corrupted" are ordinary
//! results carrying a [`ResolutionIssue`]; only genuine I/O or backend failures
//! are returned as errors.
//!
//! # Resolution order
//! 1. **Fast path**: a valid user-level pointer short-circuits to `Both`; a
//!    stale one yields `Corrupted` without any directory walk
//! 2. **Sidecar**: nearest `.vgl`, bounded by the nearest repository marker,
//!    whose referenced directory must hold a repository
//! 3. **Repository**: nearest directory carrying `.git`
//! 4. **Materialization**: with `auto_create_config` in an interactive context a
//!    missing sidecar is created and resolution runs once more

use crate::core::{
    backend::VcsBackend,
    config::{ensure_gitignore_has_sidecar, strip_display_suffix, WorkspaceConfig},
    discovery::{
        find_enclosing_repository, find_sidecar, has_vcs_marker, normalize_path, VCS_MARKER,
    },
    error::{ResolutionIssue, Result, VglError},
    git::GitRepo,
    state::UserState,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const META_LOCAL_BRANCH: &str = "local.branch";
pub const META_REMOTE_URL: &str = "remote.url";
pub const META_REMOTE_BRANCH: &str = "remote.branch";
pub const META_STATE_PATH: &str = "state.path";
pub const META_STATE_REFERENCED: &str = "state.referenced";
pub const META_SIDECAR_PATH: &str = "sidecar.path";
pub const META_SIDECAR_REFERENCED: &str = "sidecar.referenced";

/// Explicit inputs to resolution; nothing is read from ambient process state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    pub current_dir: PathBuf,
    pub interactive: bool,
    pub auto_create_config: bool,
    /// User-level pointer file; `None` disables the fast path
    pub state_file: Option<PathBuf>,
}

impl ResolveContext {
    pub fn new(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: current_dir.into(),
            interactive: false,
            auto_create_config: false,
            state_file: None,
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn auto_create_config(mut self, auto_create: bool) -> Self {
        self.auto_create_config = auto_create;
        self
    }

    pub fn state_file(mut self, state_file: Option<PathBuf>) -> Self {
        self.state_file = state_file;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKind {
    None,
    VcsOnly,
    ConfigOnly,
    Both,
    CreatedConfig,
    Corrupted,
}

impl ResolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionKind::None => "none",
            ResolutionKind::VcsOnly => "vcs-only",
            ResolutionKind::ConfigOnly => "config-only",
            ResolutionKind::Both => "both",
            ResolutionKind::CreatedConfig => "created-config",
            ResolutionKind::Corrupted => "corrupted",
        }
    }
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ResolutionResult {
    pub kind: ResolutionKind,
    pub repo_root: Option<PathBuf>,
    pub handle: Option<GitRepo>,
    pub config: Option<WorkspaceConfig>,
    pub message: Option<String>,
    pub issue: Option<ResolutionIssue>,
    pub metadata: BTreeMap<String, String>,
}

impl ResolutionResult {
    fn negative(kind: ResolutionKind, issue: ResolutionIssue) -> Self {
        Self {
            kind,
            repo_root: None,
            handle: None,
            config: None,
            message: Some(issue.to_string()),
            issue: Some(issue),
            metadata: BTreeMap::new(),
        }
    }

    /// True when a repository handle is available
    pub fn is_usable(&self) -> bool {
        self.handle.is_some()
    }

    /// Handle plus config, falling back to an in-memory default config when
    /// no sidecar exists. Negative results become [`VglError::Unresolvable`].
    pub fn into_workspace(self) -> Result<(GitRepo, WorkspaceConfig)> {
        let message = self.describe();
        let handle = self.handle.ok_or_else(|| VglError::unresolvable(message))?;
        let config = match self.config {
            Some(config) => config,
            None => {
                let branch = handle.current_branch()?;
                WorkspaceConfig::new(handle.root(), branch.as_deref())
            }
        };
        Ok((handle, config))
    }

    /// Message plus recovery hint, for printing
    pub fn describe(&self) -> String {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("Resolution result: {}", self.kind));
        match &self.issue {
            Some(issue) => format!("{message}\n{}", issue.hint()),
            None => message,
        }
    }
}

/// Resolve the workspace for `ctx`.
pub fn resolve(ctx: &ResolveContext) -> Result<ResolutionResult> {
    let first = resolve_once(ctx)?;

    if first.kind != ResolutionKind::VcsOnly || !(ctx.auto_create_config && ctx.interactive) {
        return Ok(first);
    }

    let (root, branch) = match (&first.repo_root, &first.handle) {
        (Some(root), Some(handle)) => (root.clone(), handle.current_branch()?),
        _ => return Ok(first),
    };
    drop(first);

    materialize_config(&root, branch.as_deref())?;

    let mut second = resolve_once(ctx)?;
    if second.kind == ResolutionKind::Both {
        second.kind = ResolutionKind::CreatedConfig;
    }
    Ok(second)
}

/// Write a minimal sidecar for the repository at `root` and make sure git
/// ignores it. Returns the sidecar path.
pub fn materialize_config(root: &Path, branch: Option<&str>) -> Result<PathBuf> {
    let config = WorkspaceConfig::new(root, branch);
    let path = config.save(root)?;
    ensure_gitignore_has_sidecar(root)?;
    log::debug!("Created workspace config {}", path.display());
    Ok(path)
}

fn resolve_once(ctx: &ResolveContext) -> Result<ResolutionResult> {
    let start = canonical_or_normalized(&ctx.current_dir);

    if let Some(state_file) = &ctx.state_file {
        if let Some(result) = resolve_from_pointer(state_file)? {
            return Ok(result);
        }
    }

    let sidecar = match find_sidecar(&start) {
        Some(file) => Some(validate_sidecar(file)?),
        None => None,
    };
    let vcs_root = find_enclosing_repository(&start);

    match sidecar {
        Some(SidecarLookup::Invalid { file, issue }) => {
            log::debug!("Treating sidecar {} as corrupted", file.display());
            let mut result = ResolutionResult::negative(ResolutionKind::Corrupted, issue.clone());
            result
                .metadata
                .insert(META_SIDECAR_PATH.to_string(), file.display().to_string());
            match &issue {
                ResolutionIssue::CorruptedPointer { reference, .. } => {
                    result.metadata.insert(
                        META_SIDECAR_REFERENCED.to_string(),
                        reference.display().to_string(),
                    );
                }
                ResolutionIssue::AmbiguousParse { raw, .. } => {
                    result
                        .metadata
                        .insert(META_SIDECAR_REFERENCED.to_string(), raw.clone());
                }
                ResolutionIssue::UnopenableRepository { marker, .. } => {
                    result.metadata.insert(
                        META_SIDECAR_REFERENCED.to_string(),
                        marker.display().to_string(),
                    );
                }
                ResolutionIssue::NoRepositoryFound { .. } => {}
            }
            if let Some(root) = vcs_root {
                if let Ok(handle) = GitRepo::open(&root) {
                    insert_branch_hints(&mut result.metadata, None, Some(&handle));
                }
                result.repo_root = Some(root);
            }
            Ok(result)
        }
        Some(SidecarLookup::Valid { file, target, config }) => {
            let kind = match &vcs_root {
                Some(root) => {
                    if !same_dir(root, &target) {
                        log::warn!(
                            "Sidecar points at {} while the enclosing repository is {}",
                            target.display(),
                            root.display()
                        );
                    }
                    ResolutionKind::Both
                }
                None => ResolutionKind::ConfigOnly,
            };
            match open_marked(&target) {
                Ok(handle) => Ok(positive(kind, target, handle, Some(config), None)),
                Err(issue) => {
                    let mut result = ResolutionResult::negative(ResolutionKind::Corrupted, issue);
                    result
                        .metadata
                        .insert(META_SIDECAR_PATH.to_string(), file.display().to_string());
                    result.repo_root = Some(target);
                    Ok(result)
                }
            }
        }
        None => match vcs_root {
            Some(root) => {
                let handle = match open_marked(&root) {
                    Ok(handle) => handle,
                    Err(issue) => {
                        let mut result =
                            ResolutionResult::negative(ResolutionKind::Corrupted, issue);
                        result.repo_root = Some(root);
                        return Ok(result);
                    }
                };
                let message = if ctx.interactive {
                    None
                } else {
                    Some("Found git repository but no .vgl (non-interactive)".to_string())
                };
                Ok(positive(ResolutionKind::VcsOnly, root, handle, None, message))
            }
            None => Ok(ResolutionResult::negative(
                ResolutionKind::None,
                ResolutionIssue::NoRepositoryFound { start },
            )),
        },
    }
}

/// `None` means the pointer is absent or could not be used and resolution
/// should continue with the filesystem walk.
fn resolve_from_pointer(state_file: &Path) -> Result<Option<ResolutionResult>> {
    let state = match UserState::read(state_file) {
        Some(state) => state,
        None => return Ok(None),
    };
    let raw = match state.local_dir() {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let referenced = match parse_path_value(strip_display_suffix(raw)) {
        Some(path) => {
            let base = state_file.parent().unwrap_or_else(|| Path::new(""));
            canonical_or_normalized(&normalize_path(base, &path))
        }
        None => {
            let issue = ResolutionIssue::AmbiguousParse {
                location: state_file.to_path_buf(),
                raw: raw.to_string(),
            };
            let mut result = ResolutionResult::negative(ResolutionKind::Corrupted, issue);
            result
                .metadata
                .insert(META_STATE_PATH.to_string(), state_file.display().to_string());
            return Ok(Some(result));
        }
    };

    if !(referenced.is_dir() && has_vcs_marker(&referenced)) {
        let issue = ResolutionIssue::CorruptedPointer {
            location: state_file.to_path_buf(),
            reference: referenced.clone(),
        };
        let mut result = ResolutionResult::negative(ResolutionKind::Corrupted, issue);
        result
            .metadata
            .insert(META_STATE_PATH.to_string(), state_file.display().to_string());
        result.metadata.insert(
            META_STATE_REFERENCED.to_string(),
            referenced.display().to_string(),
        );
        return Ok(Some(result));
    }

    let handle = match GitRepo::open(&referenced) {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!(
                "User state points at {} but it could not be opened: {e}",
                referenced.display()
            );
            return Ok(None);
        }
    };
    let sidecar = WorkspaceConfig::sidecar_path(&referenced);
    let config = if sidecar.is_file() {
        match read_sidecar(&sidecar)? {
            Ok(config) => Some(config),
            Err(issue) => {
                let mut result = ResolutionResult::negative(ResolutionKind::Corrupted, issue);
                result
                    .metadata
                    .insert(META_SIDECAR_PATH.to_string(), sidecar.display().to_string());
                result.repo_root = Some(referenced);
                return Ok(Some(result));
            }
        }
    } else {
        None
    };

    Ok(Some(positive(
        ResolutionKind::Both,
        referenced,
        handle,
        config,
        None,
    )))
}

enum SidecarLookup {
    Valid {
        file: PathBuf,
        target: PathBuf,
        config: WorkspaceConfig,
    },
    Invalid {
        file: PathBuf,
        issue: ResolutionIssue,
    },
}

fn validate_sidecar(file: PathBuf) -> Result<SidecarLookup> {
    let config = match read_sidecar(&file)? {
        Ok(config) => config,
        Err(issue) => return Ok(SidecarLookup::Invalid { file, issue }),
    };
    let sidecar_dir = file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let target = match config.local_dir_raw() {
        None => sidecar_dir,
        Some(raw) => match parse_path_value(raw) {
            Some(path) => canonical_or_normalized(&normalize_path(&sidecar_dir, &path)),
            None => {
                let issue = ResolutionIssue::AmbiguousParse {
                    location: file.clone(),
                    raw: config.local_dir.clone().unwrap_or_default(),
                };
                return Ok(SidecarLookup::Invalid { file, issue });
            }
        },
    };

    if target.is_dir() && has_vcs_marker(&target) {
        Ok(SidecarLookup::Valid {
            file,
            target,
            config,
        })
    } else {
        let issue = ResolutionIssue::CorruptedPointer {
            location: file.clone(),
            reference: target,
        };
        Ok(SidecarLookup::Invalid { file, issue })
    }
}

/// Load a sidecar; content that is not text becomes an `AmbiguousParse` issue
fn read_sidecar(file: &Path) -> Result<std::result::Result<WorkspaceConfig, ResolutionIssue>> {
    match WorkspaceConfig::load(file) {
        Ok(config) => Ok(Ok(config)),
        Err(VglError::ConfigReadFailed { source, .. })
            if source.kind() == std::io::ErrorKind::InvalidData =>
        {
            let bytes = std::fs::read(file)?;
            let lossy = String::from_utf8_lossy(&bytes);
            let raw = WorkspaceConfig::parse(&lossy)
                .local_dir
                .unwrap_or_else(|| lossy.trim().to_string());
            Ok(Err(ResolutionIssue::AmbiguousParse {
                location: file.to_path_buf(),
                raw,
            }))
        }
        Err(e) => Err(e),
    }
}

/// Open a directory already known to carry a `.git` marker
fn open_marked(root: &Path) -> std::result::Result<GitRepo, ResolutionIssue> {
    GitRepo::open(root).map_err(|e| {
        log::warn!("Could not open repository at {}: {e}", root.display());
        ResolutionIssue::UnopenableRepository {
            marker: root.join(VCS_MARKER),
            reason: e.to_string(),
        }
    })
}

fn positive(
    kind: ResolutionKind,
    root: PathBuf,
    handle: GitRepo,
    config: Option<WorkspaceConfig>,
    message: Option<String>,
) -> ResolutionResult {
    let mut metadata = BTreeMap::new();
    insert_branch_hints(&mut metadata, config.as_ref(), Some(&handle));

    ResolutionResult {
        kind,
        repo_root: Some(root),
        handle: Some(handle),
        config,
        message,
        issue: None,
        metadata,
    }
}

/// Sidecar values win over the backend's branch pointer
fn insert_branch_hints(
    metadata: &mut BTreeMap<String, String>,
    config: Option<&WorkspaceConfig>,
    handle: Option<&GitRepo>,
) {
    if let Some(config) = config {
        let hints = [
            (META_LOCAL_BRANCH, &config.local_branch),
            (META_REMOTE_URL, &config.remote_url),
            (META_REMOTE_BRANCH, &config.remote_branch),
        ];
        for (key, value) in hints {
            if let Some(value) = value {
                metadata.insert(key.to_string(), value.clone());
            }
        }
    }

    if metadata.contains_key(META_LOCAL_BRANCH) {
        return;
    }
    if let Some(handle) = handle {
        match handle.current_branch() {
            Ok(Some(branch)) => {
                metadata.insert(META_LOCAL_BRANCH.to_string(), branch);
            }
            Ok(None) => {}
            Err(e) => log::debug!("No branch hint available: {e}"),
        }
    }
}

/// A persisted path value, or `None` when it cannot name a filesystem path
fn parse_path_value(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains('\0') {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn canonical_or_normalized(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize_path(Path::new(""), path))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    canonical_or_normalized(a) == canonical_or_normalized(b)
}
