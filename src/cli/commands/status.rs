//! Status Command
//!
//! Display repowiki state for the current repository.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::ConfigLoader;
use crate::engine::CliEngine;
use crate::hooks::PostCommitHook;
use crate::sync::{ProcessLock, StateStore};
use crate::types::{RepoWikiError, Result};
use crate::wiki::WikiOutput;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub configured: bool,
    pub enabled: bool,
    pub hook_installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
}

#[derive(Debug, Serialize)]
pub struct StatusDetails {
    /// Resolved engine binary, `None` when not found
    pub engine: Option<String>,
    pub wiki_path: String,
    pub wiki_pages: usize,
    pub model: String,
    pub auto_commit: bool,
    pub max_turns: u32,
    pub lock: LockStatus,
    pub last_run: Option<DateTime<Utc>>,
    pub last_commit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LockStatus {
    pub held: bool,
    pub pid: Option<u32>,
    pub since: Option<DateTime<Utc>>,
}

impl StatusReport {
    /// Gather status for the repository at `repo_root`
    pub fn collect(repo_root: &Path, hook: &PostCommitHook) -> Result<Self> {
        let hook_installed = hook.is_installed();

        let config = match ConfigLoader::load(repo_root) {
            Ok(config) => config,
            Err(RepoWikiError::NotConfigured) => {
                return Ok(Self {
                    configured: false,
                    enabled: false,
                    hook_installed,
                    details: None,
                });
            }
            Err(e) => return Err(e),
        };

        let wiki = WikiOutput::new(repo_root, &config.wiki);
        let lock = ProcessLock::for_repo(repo_root);
        let record = lock.inspect();
        let state = StateStore::for_repo(repo_root).load()?;

        Ok(Self {
            configured: true,
            enabled: config.enabled,
            hook_installed,
            details: Some(StatusDetails {
                engine: CliEngine::locate(&config.engine)
                    .ok()
                    .map(|p| p.display().to_string()),
                wiki_path: config.wiki.display_path(),
                wiki_pages: wiki.page_count(),
                model: config.engine.model.clone(),
                auto_commit: config.auto_commit,
                max_turns: config.engine.max_turns,
                lock: LockStatus {
                    held: lock.is_locked(),
                    pid: record.as_ref().map(|r| r.pid),
                    since: record.map(|r| r.created_at),
                },
                last_run: state.last_run,
                last_commit: state.baseline().map(str::to_string),
            }),
        })
    }
}

pub fn run(format: &str) -> Result<()> {
    let ctx = CommandContext::discover()?;
    let report = StatusReport::collect(ctx.root(), &ctx.post_commit_hook()?)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn print_text(report: &StatusReport) {
    let output = Output::new();
    output.header(&format!("repowiki v{}", env!("CARGO_PKG_VERSION")));

    let Some(details) = &report.details else {
        output.field("Status", "not configured");
        output.info("Run 'repowiki enable' to get started.");
        return;
    };

    output.field(
        "Status",
        if report.enabled { "enabled" } else { "disabled" },
    );
    output.field(
        "Hook",
        if report.hook_installed {
            "installed"
        } else {
            "not installed"
        },
    );
    output.field("Engine", details.engine.as_deref().unwrap_or("not found"));
    if details.wiki_pages > 0 {
        output.field(
            "Wiki path",
            &format!("{}/ ({} pages)", details.wiki_path, details.wiki_pages),
        );
    } else {
        output.field(
            "Wiki path",
            &format!("{} (not generated yet)", details.wiki_path),
        );
    }
    output.field("Model", &details.model);
    output.field("Auto-commit", &details.auto_commit.to_string());
    output.field("Max turns", &details.max_turns.to_string());

    match (&details.lock.pid, &details.lock.since) {
        (Some(pid), Some(since)) => output.field(
            "Lock",
            &format!("held by pid {} since {}", pid, since.to_rfc3339()),
        ),
        _ if details.lock.held => output.field("Lock", "present (unreadable)"),
        _ => output.field("Lock", "free"),
    }

    if let Some(last_run) = &details.last_run {
        output.field("Last run", &last_run.to_rfc3339());
    }
    if let Some(commit) = &details.last_commit {
        output.field("Last commit", commit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_unconfigured_repository() {
        let dir = TempDir::new().unwrap();
        let hook = PostCommitHook::new(&dir.path().join(".git/hooks"));

        let report = StatusReport::collect(dir.path(), &hook).unwrap();
        assert!(!report.configured);
        assert!(report.details.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["configured"], false);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_configured_repository() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let mut config = ConfigLoader::init_project(root, false).unwrap();
        config.enabled = true;
        ConfigLoader::save(root, &config).unwrap();

        let hook = PostCommitHook::new(&root.join(".git/hooks"));
        hook.install("repowiki").unwrap();

        let content = config.wiki.content_dir(root);
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("overview.md"), "# Overview").unwrap();
        StateStore::for_repo(root).record_run("abc123").unwrap();

        let report = StatusReport::collect(root, &hook).unwrap();
        assert!(report.configured);
        assert!(report.enabled);
        assert!(report.hook_installed);

        let details = report.details.unwrap();
        assert_eq!(details.wiki_pages, 1);
        assert_eq!(details.last_commit.as_deref(), Some("abc123"));
        assert!(details.last_run.is_some());
        assert!(!details.lock.held);
    }

    #[test]
    fn test_reports_lock_holder() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        ConfigLoader::init_project(root, false).unwrap();
        let hook = PostCommitHook::new(&root.join(".git/hooks"));

        let guard = ProcessLock::for_repo(root).acquire().unwrap();
        let report = StatusReport::collect(root, &hook).unwrap();
        let lock = report.details.unwrap().lock;
        assert!(lock.held);
        assert_eq!(lock.pid, Some(std::process::id()));
        drop(guard);
    }
}
