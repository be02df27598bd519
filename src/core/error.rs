//! Domain-specific error types and resolution diagnostics.
//!
//! This module defines [`VglError`], the error type returned by every fallible
//! operation in the crate, and [`ResolutionIssue`], the descriptive negative
//! outcome attached to a resolution result. Issues are values, not errors:
//! resolution reports them instead of failing.
//!
//! # Public API
//! - [`VglError`]: Main error enum covering backend, I/O and command failures
//! - [`ResolutionIssue`]: Why a resolution came back empty or corrupted
//! - [`Result<T>`]: Type alias for `std::result::Result<T, VglError>`
//!
//! # Error Categories
//! - **Backend**: git2 errors propagate unchanged
//! - **Sidecar / state files**: read and write failures with the file path
//! - **Commands**: missing arguments, negative resolutions surfaced to the user

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for vgl
#[derive(Error, Debug)]
pub enum VglError {
    // Repository errors
    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid UTF-8 path in repository")]
    InvalidUtf8Path,

    #[error("Repository has no working directory")]
    NoWorkingDirectory,

    // File operation errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workspace config '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write workspace config '{path}': {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write user state '{path}': {source}")]
    StateWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not find a configuration directory")]
    ConfigDirectoryNotFound,

    // Command errors
    #[error("No paths provided. Usage: vgl {command} <paths>")]
    NoPathsProvided { command: String },

    #[error("git command failed: {message}")]
    GitCommandFailed { message: String },

    #[error("{message}")]
    Unresolvable { message: String },

    // JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using VglError
pub type Result<T> = std::result::Result<T, VglError>;

impl VglError {
    /// Create a config read failed error
    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a config write failed error
    pub fn config_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a state write failed error
    pub fn state_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StateWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn no_paths_provided(command: impl Into<String>) -> Self {
        Self::NoPathsProvided {
            command: command.into(),
        }
    }

    pub fn git_command_failed(message: impl Into<String>) -> Self {
        Self::GitCommandFailed {
            message: message.into(),
        }
    }

    pub fn unresolvable(message: impl Into<String>) -> Self {
        Self::Unresolvable {
            message: message.into(),
        }
    }
}

/// Why a resolution produced no usable repository.
///
/// The rendered message always names every path involved so callers can print
/// an actionable hint without re-deriving anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionIssue {
    #[error("No repository found in: {}", start.display())]
    NoRepositoryFound { start: PathBuf },

    #[error(
        "'{}' references '{}' but no git repository was found there",
        location.display(),
        reference.display()
    )]
    CorruptedPointer {
        location: PathBuf,
        reference: PathBuf,
    },

    #[error("'{}' contains an unparsable path value: '{raw}'", location.display())]
    AmbiguousParse { location: PathBuf, raw: String },

    #[error("'{}' marks a git repository that could not be opened: {reason}", marker.display())]
    UnopenableRepository { marker: PathBuf, reason: String },
}

impl ResolutionIssue {
    /// Recovery hint suitable for printing after the message
    pub fn hint(&self) -> &'static str {
        match self {
            ResolutionIssue::NoRepositoryFound { .. } => "Run 'vgl create <path>' to make one.",
            ResolutionIssue::CorruptedPointer { .. } | ResolutionIssue::AmbiguousParse { .. } => {
                "Delete or fix the file and run 'vgl create <path>' to recreate."
            }
            ResolutionIssue::UnopenableRepository { .. } => {
                "Repair or remove the .git marker, then run 'vgl create <path>'."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VglError::unresolvable("No repository found in: /work/here");
        assert_eq!(err.to_string(), "No repository found in: /work/here");
    }

    #[test]
    fn test_config_write_failed() {
        let path = PathBuf::from("/repo/.vgl");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err = VglError::config_write_failed(&path, io_err);
        assert!(err.to_string().contains("/repo/.vgl"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_no_paths_provided() {
        let err = VglError::no_paths_provided("track");
        assert_eq!(err.to_string(), "No paths provided. Usage: vgl track <paths>");
    }

    #[test]
    fn test_corrupted_pointer_names_both_paths() {
        let issue = ResolutionIssue::CorruptedPointer {
            location: PathBuf::from("/home/u/.config/vgl/state.json"),
            reference: PathBuf::from("/gone/repo"),
        };
        let msg = issue.to_string();
        assert!(msg.contains("/home/u/.config/vgl/state.json"));
        assert!(msg.contains("/gone/repo"));
        assert!(issue.hint().contains("vgl create"));
    }

    #[test]
    fn test_ambiguous_parse_keeps_raw_value() {
        let issue = ResolutionIssue::AmbiguousParse {
            location: PathBuf::from("/repo/.vgl"),
            raw: "bad\0path".to_string(),
        };
        assert!(issue.to_string().contains("/repo/.vgl"));
        assert!(issue.to_string().contains("bad\0path"));
    }

    #[test]
    fn test_unopenable_repository_names_marker() {
        let issue = ResolutionIssue::UnopenableRepository {
            marker: PathBuf::from("/work/broken/.git"),
            reason: "could not find repository".to_string(),
        };
        assert!(issue.to_string().contains("/work/broken/.git"));
        assert!(issue.hint().contains(".git marker"));
    }
}
