//! Change Detector
//!
//! Picks the commit range to diff and filters the result through the
//! configured exclusion prefixes.
//!
//! Exclusion is a plain string prefix test, not a path-segment match: an
//! excluded `docs` also drops `docsite/index.md`.

use tracing::debug;

use crate::git::Vcs;
use crate::types::Result;

/// Which diff to take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitRange {
    /// Files touched by one commit against its parent
    Single { commit: String },
    /// Files changed between a baseline commit and HEAD
    SinceBaseline { baseline: String },
}

impl CommitRange {
    /// Diff from the baseline when one is known and differs from `target`,
    /// otherwise just the target commit.
    pub fn select(baseline: Option<&str>, target: &str) -> Self {
        match baseline {
            Some(base) if base != target => Self::SinceBaseline {
                baseline: base.to_string(),
            },
            _ => Self::Single {
                commit: target.to_string(),
            },
        }
    }
}

/// Filtered set of changed paths, in the order git reported them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub range: CommitRange,
    pub files: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Drop every path starting with any excluded prefix, preserving order
pub fn filter_excluded(files: Vec<String>, excluded: &[String]) -> Vec<String> {
    files
        .into_iter()
        .filter(|f| !excluded.iter().any(|prefix| f.starts_with(prefix.as_str())))
        .collect()
}

pub struct ChangeDetector<'a> {
    vcs: &'a dyn Vcs,
    excluded: &'a [String],
}

impl<'a> ChangeDetector<'a> {
    pub fn new(vcs: &'a dyn Vcs, excluded: &'a [String]) -> Self {
        Self { vcs, excluded }
    }

    pub fn detect(&self, baseline: Option<&str>, target: &str) -> Result<ChangeSet> {
        let range = CommitRange::select(baseline, target);
        let raw = match &range {
            CommitRange::Single { commit } => self.vcs.changed_files_in_commit(commit)?,
            CommitRange::SinceBaseline { baseline } => self.vcs.changed_files_since(baseline)?,
        };

        let total = raw.len();
        let files = filter_excluded(raw, self.excluded);
        debug!(
            ?range,
            total,
            kept = files.len(),
            "Detected changes"
        );

        Ok(ChangeSet { range, files })
    }
}
