//! Core functionality for vgl.
//!
//! Resolution, classification and merge preview live here, together with the
//! sidecar and user-state stores they read and the git backend they consume.

pub mod backend;
pub mod category;
pub mod classify;
pub mod colors;
pub mod config;
pub mod dirs;
pub mod discovery;
pub mod error;
pub mod git;
pub mod merge_preview;
pub mod output;
pub mod resolver;
pub mod state;
pub mod sync;

// === Error handling ===
pub use error::{ResolutionIssue, Result, VglError};

// === Backend capability ===
// Everything the engine needs from version control, and its git2 implementation
pub use backend::{ChangeEntry, ChangeKind, DiffBase, TrialMerge, VcsBackend};
pub use git::GitRepo;

// === Workspace state ===
pub use config::WorkspaceConfig;
pub use state::UserState;

// === Engine ===
pub use category::Category;
pub use classify::{
    classify, Classification, ClassificationSummary, ComparisonMode, FileClassification,
};
pub use merge_preview::{preview, MergePreview};
pub use sync::{sync_state, SyncState};
pub use resolver::{resolve, ResolutionKind, ResolutionResult, ResolveContext};

// === Output formatting ===
pub use colors::{format_classification_line, get_aligned_symbol, get_category_color_style};
pub use output::{
    print_error, print_error_with_structured_usage, print_hint, print_info, print_section_header,
    print_success,
};
