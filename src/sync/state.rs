//! Run state
//!
//! Baseline commit bookkeeping kept in `.repowiki/state.toml`. The file is
//! tool-owned and git-ignored, separate from the user-edited configuration.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::layout;
use crate::types::Result;

/// Persisted state of the last successful update cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Commit the wiki was last brought up to date with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_hash: Option<String>,

    /// When that happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

impl RunState {
    /// Baseline commit, treating an empty string as absent
    pub fn baseline(&self) -> Option<&str> {
        self.last_commit_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn for_repo(repo_root: &Path) -> Self {
        Self {
            path: repo_root.join(layout::TOOL_DIR).join(layout::STATE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state; a missing file is the empty state
    pub fn load(&self) -> Result<RunState> {
        if !self.path.exists() {
            return Ok(RunState::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Record `commit` as the new baseline, stamped now
    pub fn record_run(&self, commit: &str) -> Result<RunState> {
        let state = RunState {
            last_commit_hash: Some(commit.to_string()),
            last_run: Some(Utc::now()),
        };
        self.save(&state)?;
        debug!(commit = %commit, "Baseline recorded");
        Ok(state)
    }

    pub fn save(&self, state: &RunState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, toml::to_string_pretty(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
