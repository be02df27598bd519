//! vgl - explicit track / untrack / undecided workspaces on top of git.
//!
//! The library resolves which repository and sidecar config a command works
//! on, classifies every path of the working tree, and previews merges without
//! touching the repository.
//!
//! # Public API
//! The main interface is re-exported from the [`core`] module:
//! - [`resolve`] with an explicit [`ResolveContext`]
//! - [`classify`] against a [`ComparisonMode`]
//! - [`preview`] of merging one ref into another
//! - [`VcsBackend`], implemented by [`GitRepo`]

pub mod commands;
pub mod core;

pub use core::{
    classify, preview, resolve, Category, Classification, ClassificationSummary,
    ComparisonMode, FileClassification, GitRepo, MergePreview, ResolutionIssue, ResolutionKind,
    ResolutionResult, ResolveContext, Result, UserState, VcsBackend, VglError, WorkspaceConfig,
};
