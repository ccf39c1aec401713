//! Loop-Prevention Gate
//!
//! Cheap checks run inside the post-commit hook before any worker is spawned.
//! Evaluated in order, stopping at the first rejection:
//!
//! 1. commit sentinel present (this tool is committing the wiki)
//! 2. lock file present (another worker will catch up)
//! 3. tool configured and enabled
//! 4. HEAD message starts with the commit prefix (self-authored commit)
//!
//! Every rejection is silent; the caller only logs it.

use std::fmt;

use tracing::debug;

use super::{ProcessLock, Sentinel};
use crate::config::Config;
use crate::git::Vcs;
use crate::types::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    SentinelPresent,
    LockHeld,
    NotConfigured,
    Disabled,
    SelfAuthored,
    /// HEAD or its message could not be read
    HeadUnreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SentinelPresent => write!(f, "wiki commit in progress"),
            Self::LockHeld => write!(f, "another update is running"),
            Self::NotConfigured => write!(f, "not configured"),
            Self::Disabled => write!(f, "disabled"),
            Self::SelfAuthored => write!(f, "commit authored by repowiki"),
            Self::HeadUnreadable(e) => write!(f, "cannot read HEAD: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Launch a worker for this commit
    Proceed { commit: String },
    Skip(SkipReason),
}

/// Run the gate for the repository behind `vcs`.
///
/// `load_config` is only called once the filesystem checks have passed.
pub fn evaluate(vcs: &dyn Vcs, load_config: impl FnOnce() -> Result<Config>) -> GateDecision {
    let decision = evaluate_inner(vcs, load_config);
    if let GateDecision::Skip(reason) = &decision {
        debug!(%reason, "Post-commit hook skipped");
    }
    decision
}

fn evaluate_inner(vcs: &dyn Vcs, load_config: impl FnOnce() -> Result<Config>) -> GateDecision {
    let root = vcs.root();

    if Sentinel::for_repo(root).is_present() {
        return GateDecision::Skip(SkipReason::SentinelPresent);
    }

    if ProcessLock::for_repo(root).is_locked() {
        return GateDecision::Skip(SkipReason::LockHeld);
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(_) => return GateDecision::Skip(SkipReason::NotConfigured),
    };
    if !config.enabled {
        return GateDecision::Skip(SkipReason::Disabled);
    }

    let head = match vcs.head_commit() {
        Ok(head) => head,
        Err(e) => return GateDecision::Skip(SkipReason::HeadUnreadable(e.to_string())),
    };
    let message = match vcs.commit_message(&head) {
        Ok(message) => message,
        Err(e) => return GateDecision::Skip(SkipReason::HeadUnreadable(e.to_string())),
    };

    if is_self_authored(&message, &config.commit_prefix) {
        return GateDecision::Skip(SkipReason::SelfAuthored);
    }

    GateDecision::Proceed { commit: head }
}

/// Plain prefix test on the trimmed message
pub fn is_self_authored(message: &str, prefix: &str) -> bool {
    message.trim().starts_with(prefix)
}
