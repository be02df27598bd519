//! User-level fast-path state.
//!
//! A single record, stored outside any repository, pointing at "the current
//! repository". Resolution consults it before walking the filesystem. The
//! record is advisory: a missing or unreadable file reads as `None` and never
//! blocks normal resolution.
//!
//! # Public API
//! - [`UserState`]: The persisted record with JSON load/save
//!
//! # Storage
//! - **JSON serialization**: Human-readable file for debugging
//! - **Timestamping**: `updated_at` records when the pointer last moved

use crate::core::config::WorkspaceConfig;
use crate::core::error::{Result, VglError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub local_dir: Option<String>,
    pub local_branch: Option<String>,
    pub remote_url: Option<String>,
    pub remote_branch: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UserState {
    /// Snapshot pointing at `root` with the branch/remote pointers of `config`
    pub fn from_config(root: &Path, config: &WorkspaceConfig) -> Self {
        Self {
            local_dir: Some(root.to_string_lossy().into_owned()),
            local_branch: config.local_branch.clone(),
            remote_url: config.remote_url.clone(),
            remote_branch: config.remote_branch.clone(),
            updated_at: Utc::now(),
        }
    }

    /// Read the record at `path`; any failure reads as no record
    pub fn read(path: &Path) -> Option<Self> {
        if !path.is_file() {
            return None;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Ignoring unreadable user state '{}': {e}", path.display());
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Ignoring malformed user state '{}': {e}", path.display());
                None
            }
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| VglError::state_write_failed(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| VglError::state_write_failed(path, e))?;
        Ok(())
    }

    /// Referenced directory, `None` when blank
    pub fn local_dir(&self) -> Option<&str> {
        self.local_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
    }
}
