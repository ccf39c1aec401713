//! Strategy Selector
//!
//! Full regeneration when there is no wiki yet or the change volume is above
//! the threshold; otherwise an incremental update with section hints.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    FullRegeneration,
    Incremental,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullRegeneration => write!(f, "full"),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

/// Decide between full and incremental generation.
///
/// A count equal to `threshold` is still incremental.
pub fn select_strategy(wiki_exists: bool, change_count: usize, threshold: usize) -> StrategyKind {
    if !wiki_exists || change_count > threshold {
        StrategyKind::FullRegeneration
    } else {
        StrategyKind::Incremental
    }
}

/// Selected strategy with the inputs the engine prompt needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    FullRegeneration,
    Incremental {
        changed_files: Vec<String>,
        affected_sections: Vec<String>,
    },
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::FullRegeneration => StrategyKind::FullRegeneration,
            Self::Incremental { .. } => StrategyKind::Incremental,
        }
    }

    /// Commit message body describing the work
    pub fn describe(&self) -> String {
        match self {
            Self::FullRegeneration => "full wiki generation".to_string(),
            Self::Incremental { changed_files, .. } => {
                format!("update wiki for {} changed files", changed_files.len())
            }
        }
    }
}
