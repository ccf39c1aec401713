//! Generation Engine Abstraction
//!
//! The orchestrator never writes documentation itself. It hands a prompt to
//! a [`GenerationEngine`] that reads the repository and edits the wiki in
//! place, then inspects the result through git.
//!
//! ## Modules
//!
//! - `cli`: `qodercli` subprocess engine
//! - `prompt`: full-generation and incremental-update prompts

mod cli;
mod prompt;

pub use cli::CliEngine;
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::types::Result;

/// One invocation of the generation engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Instructions for the engine
    pub prompt: String,
    /// Repository root the engine works in
    pub working_dir: PathBuf,
    /// Maximum agent turns
    pub max_turns: u32,
    /// Comma-separated capability set
    pub allowed_tools: String,
    /// Explicit model, `None` to let the engine decide
    pub model: Option<String>,
}

impl EngineRequest {
    pub fn new(prompt: String, working_dir: PathBuf, config: &EngineConfig) -> Self {
        Self {
            prompt,
            working_dir,
            max_turns: config.max_turns,
            allowed_tools: config.allowed_tools.clone(),
            model: config.explicit_model().map(String::from),
        }
    }
}

/// What the engine reported back
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Captured standard output
    pub stdout: String,
    /// Wall-clock duration of the call
    pub elapsed: Duration,
}

/// Documentation generator driven by a prompt
#[async_trait]
pub trait GenerationEngine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Run one request to completion
    async fn run(&self, request: &EngineRequest) -> Result<EngineOutput>;
}
