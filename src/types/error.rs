//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Categories
//!
//! - **Environment**: not inside a repository, generation engine missing
//! - **Contention**: another live process holds the repository lock
//! - **Collaborator**: a git or generation-engine call failed
//! - **Configuration**: tool not configured, disabled, or invalid settings
//! - **Internal**: local I/O and serialization failures
//!
//! In direct mode every category is fatal and reported. In hook-triggered
//! mode every category is logged and absorbed.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories used to decide how a failure is surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Environment,
    Contention,
    Collaborator,
    Configuration,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "ENVIRONMENT"),
            Self::Contention => write!(f, "CONTENTION"),
            Self::Collaborator => write!(f, "COLLABORATOR"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum RepoWikiError {
    // -------------------------------------------------------------------------
    // Environment
    // -------------------------------------------------------------------------
    #[error("not a git repository")]
    NotARepository,

    #[error(
        "generation engine not found (searched: {}); install Qoder or set engine.path in .repowiki/config.toml",
        searched.join(", ")
    )]
    EngineNotFound { searched: Vec<String> },

    // -------------------------------------------------------------------------
    // Contention
    // -------------------------------------------------------------------------
    #[error("another repowiki process is running (lock: {})", path.display())]
    LockBusy { path: PathBuf },

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    #[error("git {command}: {message}")]
    Git { command: String, message: String },

    #[error("generation engine error: {0}")]
    Engine(String),

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------
    #[error("repowiki not configured: run 'repowiki enable' first")]
    NotConfigured,

    #[error("repowiki is disabled for this repository")]
    Disabled,

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML decode error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, RepoWikiError>;

impl RepoWikiError {
    /// Create a git collaborator error
    pub fn git(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a generation engine error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotARepository | Self::EngineNotFound { .. } => ErrorCategory::Environment,
            Self::LockBusy { .. } => ErrorCategory::Contention,
            Self::Git { .. } | Self::Engine(_) => ErrorCategory::Collaborator,
            Self::NotConfigured | Self::Disabled | Self::Config(_) => ErrorCategory::Configuration,
            Self::Io(_) | Self::Json(_) | Self::TomlSer(_) | Self::TomlDe(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// Check if this error means another process already owns the work
    pub fn is_contention(&self) -> bool {
        self.category() == ErrorCategory::Contention
    }
}

// =============================================================================
// Tests
// =============================================================================
