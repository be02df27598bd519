//! Predicates for command output and helpers for classification results

#![allow(dead_code)]

use predicates::prelude::*;
use vgl::core::category::Category;
use vgl::core::classify::Classification;

pub fn is_error() -> impl Predicate<str> {
    predicates::str::contains("✕ Error:")
}

pub fn has_resolution(kind: &str) -> impl Predicate<str> {
    predicates::str::contains("Resolution:").and(predicates::str::contains(kind.to_string()))
}

pub fn has_workspace_header() -> impl Predicate<str> {
    predicates::str::contains("Workspace:").and(predicates::str::contains("Branch:"))
}

/// Paths carrying `category`, owned for easy comparison
pub fn paths(classification: &Classification, category: Category) -> Vec<String> {
    classification
        .paths_with(category)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Every non-ignored entry has exactly one of Tracked / Untracked / Undecided
pub fn assert_partition(classification: &Classification) {
    for entry in classification {
        if entry.has(Category::Ignored) {
            assert!(
                !entry.has(Category::Tracked)
                    && !entry.has(Category::Untracked)
                    && !entry.has(Category::Undecided),
                "ignored entry {} also carries a decision",
                entry.path
            );
            continue;
        }
        let count = [Category::Tracked, Category::Untracked, Category::Undecided]
            .iter()
            .filter(|c| entry.has(**c))
            .count();
        assert_eq!(count, 1, "{} carries {count} decisions", entry.path);
    }
}
