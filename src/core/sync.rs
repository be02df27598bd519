//! Commit sync state of the local branch against its remote-tracking ref.

use crate::core::{backend::VcsBackend, config::WorkspaceConfig, error::Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// HEAD is unborn
    NoCommits,
    /// `refs/remotes/origin/<remote.branch>` does not exist
    RemoteBranchMissing,
    InSync,
    /// Commits only on HEAD (`ahead`) and only on the remote ref (`behind`)
    Diverged { ahead: usize, behind: usize },
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::NoCommits => f.write_str("(no commits yet)"),
            SyncState::RemoteBranchMissing => f.write_str("(remote branch not found)"),
            SyncState::InSync => f.write_str("in sync"),
            SyncState::Diverged { ahead, behind } => {
                let mut parts = Vec::new();
                if *ahead > 0 {
                    parts.push(format!("{ahead} commit(s) to push"));
                }
                if *behind > 0 {
                    parts.push(format!("{behind} commit(s) to pull"));
                }
                f.write_str(&parts.join(", "))
            }
        }
    }
}

/// Compare HEAD with the configured remote-tracking ref. Read-only.
pub fn sync_state(backend: &impl VcsBackend, config: &WorkspaceConfig) -> Result<SyncState> {
    let head = match backend.resolve_ref("HEAD")? {
        Some(head) => head,
        None => return Ok(SyncState::NoCommits),
    };
    let remote = match backend.resolve_ref(&config.remote_tracking_ref())? {
        Some(remote) => remote,
        None => return Ok(SyncState::RemoteBranchMissing),
    };
    if head == remote {
        return Ok(SyncState::InSync);
    }

    let ahead = backend.commits_reachable_from(head, remote)?;
    let behind = backend.commits_reachable_from(remote, head)?;
    log::debug!("Sync against {}: ahead {ahead}, behind {behind}", config.remote_tracking_ref());

    if ahead == 0 && behind == 0 {
        Ok(SyncState::InSync)
    } else {
        Ok(SyncState::Diverged { ahead, behind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_state_display() {
        assert_eq!(SyncState::NoCommits.to_string(), "(no commits yet)");
        assert_eq!(SyncState::InSync.to_string(), "in sync");
        assert_eq!(
            SyncState::Diverged { ahead: 2, behind: 0 }.to_string(),
            "2 commit(s) to push"
        );
        assert_eq!(
            SyncState::Diverged { ahead: 1, behind: 3 }.to_string(),
            "1 commit(s) to push, 3 commit(s) to pull"
        );
    }
}
