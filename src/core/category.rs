//! Classification categories.
//!
//! A path carries at most one decision category (Tracked, Untracked,
//! Undecided, Ignored) and any number of change categories (Added, Modified,
//! Removed, Renamed). The two axes are independent.

use crate::core::backend::ChangeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordering follows display order: change axis first, then decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// New file in the compared state (A)
    Added,
    /// Content changed (M)
    Modified,
    /// File removed (D)
    Removed,
    /// File moved from another path (R)
    Renamed,
    Tracked,
    Untracked,
    Undecided,
    Ignored,
}

impl Category {
    pub const DECISIONS: [Category; 4] = [
        Category::Tracked,
        Category::Untracked,
        Category::Undecided,
        Category::Ignored,
    ];

    pub const CHANGES: [Category; 4] = [
        Category::Added,
        Category::Modified,
        Category::Removed,
        Category::Renamed,
    ];

    /// Short symbol for list output
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Added => "A",
            Category::Modified => "M",
            Category::Removed => "D",
            Category::Renamed => "R",
            Category::Tracked => "T",
            Category::Untracked => "U",
            Category::Undecided => "??",
            Category::Ignored => "!!",
        }
    }

    /// True for the pending-change axis
    pub fn is_change(&self) -> bool {
        Self::CHANGES.contains(self)
    }

    /// True for the Tracked / Untracked / Undecided / Ignored axis
    pub fn is_decision(&self) -> bool {
        Self::DECISIONS.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ChangeKind> for Category {
    fn from(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Added => Category::Added,
            ChangeKind::Modified => Category::Modified,
            ChangeKind::Removed => Category::Removed,
            ChangeKind::Renamed => Category::Renamed,
        }
    }
}
