//! Wiki self-commit
//!
//! Stages and commits the wiki directory under the commit sentinel so the
//! post-commit hook fired by this commit recognizes it as self-authored.

use tracing::{debug, info};

use crate::config::Config;
use crate::git::Vcs;
use crate::sync::Sentinel;
use crate::types::Result;

pub struct WikiCommitter<'a> {
    vcs: &'a dyn Vcs,
    config: &'a Config,
}

impl<'a> WikiCommitter<'a> {
    pub fn new(vcs: &'a dyn Vcs, config: &'a Config) -> Self {
        Self { vcs, config }
    }

    /// Commit pending wiki changes as `"<prefix> <description>"`.
    ///
    /// Returns `false` without touching git history when the wiki is clean.
    pub fn commit_changes(&self, description: &str) -> Result<bool> {
        let wiki_root = self.config.wiki.root(self.vcs.root());

        if !self.vcs.has_changes(&wiki_root)? {
            debug!(path = %wiki_root.display(), "Wiki unchanged, nothing to commit");
            return Ok(false);
        }

        let _sentinel = Sentinel::for_repo(self.vcs.root()).hold()?;

        self.vcs.stage(&[wiki_root])?;
        let message = format!("{} {}", self.config.commit_prefix, description);
        self.vcs.commit(&message)?;

        info!(message = %message, "Committed wiki changes");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitCli;
    use crate::git::test_support::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_commit_changes() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        let before = commit_files(dir.path(), &[("src/lib.rs", "fn a() {}")], "initial");

        let git = GitCli::discover(dir.path()).unwrap();
        let config = Config::default();
        let committer = WikiCommitter::new(&git, &config);

        // Clean wiki: no commit
        assert!(!committer.commit_changes("full wiki generation").unwrap());
        assert_eq!(git.head_commit().unwrap(), before);

        let content = config.wiki.content_dir(git.root());
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("System Overview.md"), "# Overview").unwrap();

        assert!(committer.commit_changes("full wiki generation").unwrap());
        let head = git.head_commit().unwrap();
        assert_ne!(head, before);
        assert_eq!(
            git.commit_message(&head).unwrap(),
            "[repowiki] full wiki generation"
        );
        assert!(!Sentinel::for_repo(git.root()).is_present());
    }
}
