//! repowiki - Commit-Triggered Wiki Maintenance
//!
//! Keeps an AI-generated repository wiki in step with the code. A git
//! post-commit hook runs a cheap loop-prevention gate and launches a
//! detached worker; the worker takes a per-repository lock, diffs against
//! the last documented commit, asks the generation engine for a full or
//! incremental update, commits the result, and catches up with any commits
//! that landed meanwhile.
//!
//! ## Modules
//!
//! - [`sync`]: gate, lock, sentinel, change detection, strategy, update cycle
//! - [`engine`]: generation engine trait, `qodercli` invoker, prompts
//! - [`git`]: version-control collaborator
//! - [`wiki`]: generated output inspection and self-commit
//! - [`hooks`]: post-commit hook installation
//! - [`config`]: layered configuration

pub mod cli;
pub mod config;
pub mod constants;
pub mod engine;
pub mod git;
pub mod hooks;
pub mod sync;
pub mod types;
pub mod wiki;

// Configuration
pub use config::{Config, ConfigLoader, EngineConfig, WikiConfig};

// Error Types
pub use types::error::{ErrorCategory, RepoWikiError, Result};

// Collaborators
pub use engine::{CliEngine, EngineOutput, EngineRequest, GenerationEngine};
pub use git::{GitCli, Vcs};

// Orchestration
pub use sync::{
    BackgroundLauncher, CycleOutcome, GateDecision, ProcessLock, Sentinel, SkipReason,
    StateStore, Strategy, SyncContext, SyncReport, UpdateCycle, evaluate_gate, run_generate,
    run_update,
};
