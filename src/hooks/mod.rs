//! Git hook installation and management.
//!
//! The post-commit hook carries a marked block owned by this tool. Existing
//! user hooks are kept: the block is appended on install and cut out again
//! on uninstall.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::constants::hooks;
use crate::types::Result;

/// What `install` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookInstall {
    Created,
    Appended,
    AlreadyInstalled,
}

#[derive(Debug, Clone)]
pub struct PostCommitHook {
    path: PathBuf,
}

impl PostCommitHook {
    pub fn new(hooks_dir: &Path) -> Self {
        Self {
            path: hooks_dir.join(hooks::POST_COMMIT),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_installed(&self) -> bool {
        fs::read_to_string(&self.path)
            .map(|content| content.contains(hooks::MARKER))
            .unwrap_or(false)
    }

    /// Install the hook block invoking `binary hooks post-commit`
    pub fn install(&self, binary: &str) -> Result<HookInstall> {
        let block = hook_block(binary);

        let (content, outcome) = match fs::read_to_string(&self.path) {
            Ok(existing) if existing.contains(hooks::MARKER) => {
                return Ok(HookInstall::AlreadyInstalled);
            }
            Ok(existing) => (
                format!("{}\n\n{}", existing.trim_end(), block),
                HookInstall::Appended,
            ),
            Err(_) => (format!("#!/bin/sh\n{}", block), HookInstall::Created),
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, content)?;
        make_executable(&self.path)?;

        info!(path = %self.path.display(), ?outcome, "Installed post-commit hook");
        Ok(outcome)
    }

    /// Remove the owned block; deletes the file when nothing else remains.
    ///
    /// Returns whether a block was removed.
    pub fn uninstall(&self) -> Result<bool> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Ok(false);
        };
        if !content.contains(hooks::MARKER) {
            return Ok(false);
        }

        let cleaned = remove_block(&content);
        let rest = cleaned.trim();
        if rest.is_empty() || rest == "#!/bin/sh" {
            fs::remove_file(&self.path)?;
        } else {
            fs::write(&self.path, format!("{}\n", cleaned.trim_end()))?;
        }

        info!(path = %self.path.display(), "Removed post-commit hook");
        Ok(true)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

fn hook_block(binary: &str) -> String {
    format!(
        "{}\n{} hooks post-commit 2>/dev/null || true\n{}\n",
        hooks::MARKER,
        shell_quote(binary),
        hooks::END_MARKER
    )
}

fn remove_block(content: &str) -> String {
    let mut kept = Vec::new();
    let mut inside = false;
    for line in content.lines() {
        if line.trim() == hooks::MARKER {
            inside = true;
        } else if inside && line.trim() == hooks::END_MARKER {
            inside = false;
        } else if !inside {
            kept.push(line);
        }
    }
    kept.join("\n")
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
