//! Qoder CLI Engine
//!
//! Runs `qodercli` non-interactively against the repository. The binary is
//! resolved on every call so a missing engine only matters when there is
//! actually documentation work to do.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

use super::{EngineOutput, EngineRequest, GenerationEngine};
use crate::config::EngineConfig;
use crate::constants::engine;
use crate::types::{RepoWikiError, Result};

/// Subprocess engine backed by `qodercli`
#[derive(Debug, Clone)]
pub struct CliEngine {
    config: EngineConfig,
}

impl CliEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve the engine binary.
    ///
    /// Order: configured path (if it exists), `PATH`, then the platform's
    /// known install locations.
    pub fn locate(config: &EngineConfig) -> Result<PathBuf> {
        let mut searched = Vec::new();

        if let Some(path) = config.path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            if path.is_file() {
                return Ok(path.clone());
            }
            searched.push(path.display().to_string());
        }

        if let Ok(path) = which::which(engine::BINARY_NAME) {
            return Ok(path);
        }
        searched.push(format!("$PATH/{}", engine::BINARY_NAME));

        for candidate in known_paths() {
            let path = Path::new(candidate);
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            searched.push((*candidate).to_string());
        }

        Err(RepoWikiError::EngineNotFound { searched })
    }

    fn args(request: &EngineRequest) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            request.prompt.clone(),
            "-q".to_string(),
            "-w".to_string(),
            request.working_dir.to_string_lossy().into_owned(),
            "--max-turns".to_string(),
            request.max_turns.to_string(),
            "--dangerously-skip-permissions".to_string(),
            "--allowed-tools".to_string(),
            request.allowed_tools.clone(),
        ];
        if let Some(model) = &request.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args
    }
}

#[async_trait]
impl GenerationEngine for CliEngine {
    fn name(&self) -> &str {
        engine::BINARY_NAME
    }

    async fn run(&self, request: &EngineRequest) -> Result<EngineOutput> {
        let binary = Self::locate(&self.config)?;
        let start = Instant::now();

        info!(
            binary = %binary.display(),
            max_turns = request.max_turns,
            model = request.model.as_deref().unwrap_or(engine::AUTO_MODEL),
            "Running generation engine"
        );

        let output = Command::new(&binary)
            .args(Self::args(request))
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                RepoWikiError::engine(format!("failed to spawn {}: {}", binary.display(), e))
            })?;

        let elapsed = start.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() {
                "process exited with non-zero status"
            } else {
                stderr.trim()
            };
            return Err(RepoWikiError::engine(format!(
                "{} ({}): {}",
                engine::BINARY_NAME,
                output.status,
                detail
            )));
        }

        debug!(elapsed_ms = elapsed.as_millis() as u64, "Generation engine finished");

        Ok(EngineOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            elapsed,
        })
    }
}

fn known_paths() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        engine::MACOS_PATHS
    } else if cfg!(target_os = "linux") {
        engine::LINUX_PATHS
    } else {
        &[]
    }
}
