//! Shared utilities for vgl integration tests
//!
//! Every test builds real repositories with the `git` binary inside a
//! temporary directory.

pub mod assertions;
pub mod fixtures;
pub mod repository;
