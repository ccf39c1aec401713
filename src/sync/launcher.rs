//! Background Launcher
//!
//! Re-invokes this executable as `update --from-hook --commit <hash>` in a
//! new session with output appended to the hook log, then returns without
//! waiting. The post-commit hook must never block or fail a commit, so
//! [`BackgroundLauncher::launch_detached`] swallows every failure.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::constants::layout;
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct BackgroundLauncher {
    program: PathBuf,
    repo_root: PathBuf,
    log_path: PathBuf,
}

impl BackgroundLauncher {
    /// Launcher re-running the current executable
    pub fn for_current_exe(repo_root: &Path) -> Result<Self> {
        let exe = std::env::current_exe()?;
        Ok(Self::new(exe, repo_root))
    }

    pub fn new(program: PathBuf, repo_root: &Path) -> Self {
        Self {
            program,
            repo_root: repo_root.to_path_buf(),
            log_path: repo_root
                .join(layout::TOOL_DIR)
                .join(layout::LOG_DIR)
                .join(layout::HOOK_LOG_FILE),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Worker arguments for a hook-triggered update of `commit`
    pub fn worker_args(commit: &str) -> [&str; 4] {
        ["update", "--from-hook", "--commit", commit]
    }

    /// Spawn the detached worker and return its pid
    pub fn launch(&self, commit: &str) -> Result<u32> {
        if let Some(dir) = self.log_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        let log_err = log.try_clone()?;

        debug!(
            "Spawning worker: {} {}",
            self.program.display(),
            Self::worker_args(commit).join(" ")
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(Self::worker_args(commit))
            .current_dir(&self.repo_root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: setsid is async-signal-safe and touches no parent state.
            unsafe {
                cmd.pre_exec(|| {
                    if libc::setsid() == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let child = cmd.spawn()?;
        let pid = child.id();
        info!(pid, commit = %commit, log = %self.log_path.display(), "Launched background update");
        Ok(pid)
    }

    /// [`launch`](Self::launch) with failures logged and dropped
    pub fn launch_detached(&self, commit: &str) -> Option<u32> {
        match self.launch(commit) {
            Ok(pid) => Some(pid),
            Err(e) => {
                debug!("Background launch failed, commit left undocumented: {}", e);
                None
            }
        }
    }
}
