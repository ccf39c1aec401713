//! Commit sentinel
//!
//! Marker file present only while this tool performs its own wiki commit.
//! The post-commit hook fired by that commit sees it and stands down.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::constants::layout;
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct Sentinel {
    path: PathBuf,
}

impl Sentinel {
    pub fn for_repo(repo_root: &Path) -> Self {
        Self {
            path: repo_root.join(layout::TOOL_DIR).join(layout::SENTINEL_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_present(&self) -> bool {
        self.path.exists()
    }

    /// Create the sentinel, removed again when the guard drops
    pub fn hold(&self) -> Result<SentinelGuard> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, std::process::id().to_string())?;
        Ok(SentinelGuard {
            path: self.path.clone(),
        })
    }
}

#[derive(Debug)]
pub struct SentinelGuard {
    path: PathBuf,
}

impl Drop for SentinelGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove sentinel: {}", e),
        }
    }
}
