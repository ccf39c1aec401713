//! Version Control Collaborator
//!
//! Single doorway to git. The orchestrator only talks to the [`Vcs`] trait;
//! [`GitCli`] implements it by shelling out to the `git` binary.
//!
//! All calls are synchronous and scoped to one repository root.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::types::{RepoWikiError, Result};

/// Version-control operations consumed by the orchestrator
pub trait Vcs: Send + Sync {
    /// Repository root every call is scoped to
    fn root(&self) -> &Path;

    /// Current HEAD commit identifier
    fn head_commit(&self) -> Result<String>;

    /// Full message of a commit
    fn commit_message(&self, commit: &str) -> Result<String>;

    /// Files touched by a single commit (against its parent)
    fn changed_files_in_commit(&self, commit: &str) -> Result<Vec<String>>;

    /// Files changed between a historical commit and HEAD
    fn changed_files_since(&self, commit: &str) -> Result<Vec<String>>;

    /// Whether the working tree has uncommitted changes under `path`
    fn has_changes(&self, path: &Path) -> Result<bool>;

    /// Stage a set of paths
    fn stage(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit staged paths; a no-op when nothing is staged
    fn commit(&self, message: &str) -> Result<()>;
}

/// `git` command-line implementation of [`Vcs`]
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Resolve the repository containing `dir`
    pub fn discover(dir: &Path) -> Result<Self> {
        let root = run_git(Some(dir), &["rev-parse", "--show-toplevel"])
            .map_err(|_| RepoWikiError::NotARepository)?;
        if root.is_empty() {
            return Err(RepoWikiError::NotARepository);
        }
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Resolve the repository containing the current directory
    pub fn discover_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::discover(&cwd)
    }

    /// Hooks directory, honouring worktrees and `core.hooksPath`
    pub fn hooks_dir(&self) -> Result<PathBuf> {
        let path = PathBuf::from(self.run(&["rev-parse", "--git-path", "hooks"])?);
        Ok(if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        run_git(Some(&self.root), args)
    }
}

impl Vcs for GitCli {
    fn root(&self) -> &Path {
        &self.root
    }

    fn head_commit(&self) -> Result<String> {
        self.run(&["rev-parse", "HEAD"])
    }

    fn commit_message(&self, commit: &str) -> Result<String> {
        self.run(&["log", "-1", "--pretty=%B", commit])
    }

    fn changed_files_in_commit(&self, commit: &str) -> Result<Vec<String>> {
        // --root lists the files of a parentless first commit as additions
        let out = self.run(&[
            "diff-tree",
            "--no-commit-id",
            "--name-only",
            "-r",
            "--root",
            commit,
        ])?;
        Ok(split_lines(&out))
    }

    fn changed_files_since(&self, commit: &str) -> Result<Vec<String>> {
        let out = self.run(&["diff", "--name-only", commit, "HEAD"])?;
        Ok(split_lines(&out))
    }

    fn has_changes(&self, path: &Path) -> Result<bool> {
        let path = path.to_string_lossy();
        let out = self.run(&["status", "--porcelain", "--", path.as_ref()])?;
        Ok(!out.is_empty())
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add".to_string(), "--".to_string()];
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&args).map(|_| ())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let staged = Command::new("git")
            .args(["diff", "--cached", "--quiet"])
            .current_dir(&self.root)
            .status()?;
        if staged.success() {
            debug!("Nothing staged, skipping commit");
            return Ok(());
        }
        self.run(&["commit", "-m", message]).map(|_| ())
    }
}

/// Run git and return trimmed stdout, mapping failures to `RepoWikiError::Git`
fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let output = cmd
        .output()
        .map_err(|e| RepoWikiError::git(args.join(" "), e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RepoWikiError::git(args.join(" "), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn split_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
