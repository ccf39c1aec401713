//! CLI Common Utilities
//!
//! Shared repository discovery and configuration access for command handlers.

use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::runtime::Runtime;

use crate::config::{Config, ConfigLoader};
use crate::constants::hooks;
use crate::git::{GitCli, Vcs};
use crate::hooks::PostCommitHook;
use crate::types::{RepoWikiError, Result};

/// Command execution context
///
/// Resolved from the current directory; every command operates on the
/// repository containing it.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub git: GitCli,
    pub repo_root: PathBuf,
}

impl CommandContext {
    /// Discover the repository containing the current directory
    pub fn discover() -> Result<Self> {
        let git = GitCli::discover_cwd()?;
        let repo_root = git.root().to_path_buf();
        Ok(Self { git, repo_root })
    }

    pub fn root(&self) -> &Path {
        &self.repo_root
    }

    /// Fully resolved configuration; `NotConfigured` before `enable`
    pub fn load_config(&self) -> Result<Config> {
        ConfigLoader::load(&self.repo_root)
    }

    /// Configuration of a repository that has been enabled
    pub fn require_enabled(&self) -> Result<Config> {
        let config = self.load_config()?;
        if !config.enabled {
            return Err(RepoWikiError::Disabled);
        }
        Ok(config)
    }

    pub fn post_commit_hook(&self) -> Result<PostCommitHook> {
        Ok(PostCommitHook::new(&self.git.hooks_dir()?))
    }
}

/// Binary the installed hook should invoke
pub fn hook_binary() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| hooks::FALLBACK_BINARY.to_string())
}

/// Drive an async command to completion on a fresh runtime
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = Runtime::new()?;
    Ok(rt.block_on(future))
}
