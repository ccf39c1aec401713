//! Update Command
//!
//! Runs the update cycle plus catch-up under the repository lock. Launched
//! by the post-commit hook with `--from-hook`, in which case every failure
//! is logged and the process still exits successfully.

use tracing::{error, info, warn};

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, block_on};
use crate::engine::CliEngine;
use crate::sync::{CycleOutcome, SyncContext, SyncReport, run_update};
use crate::types::Result;

pub fn run(commit: Option<String>, from_hook: bool) -> Result<()> {
    match execute(commit.as_deref()) {
        Ok(report) => {
            if !from_hook {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) if from_hook => {
            if e.is_contention() {
                info!("{}", e);
            } else {
                error!(category = %e.category(), "Hook-triggered update failed: {}", e);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn execute(commit: Option<&str>) -> Result<SyncReport> {
    let ctx = CommandContext::discover()?;
    let config = ctx.require_enabled()?;
    let engine = CliEngine::new(config.engine.clone());

    let sync = SyncContext {
        vcs: &ctx.git,
        engine: &engine,
        config: &config,
    };
    let report = block_on(run_update(sync, commit))??;

    if report.catch_up_exhausted {
        warn!("Catch-up limit reached with HEAD still ahead; next commit will resume");
    }
    Ok(report)
}

fn print_report(report: &SyncReport) {
    let output = Output::new();

    for cycle in &report.cycles {
        match cycle {
            CycleOutcome::NoChanges { .. } => {
                output.info("No relevant file changes detected.");
            }
            CycleOutcome::Generated {
                target,
                strategy,
                files,
                committed,
            } => {
                let short = target.get(..7).unwrap_or(target.as_str());
                let suffix = if *committed { ", committed" } else { "" };
                output.success(&format!(
                    "{} ({} files) at {}{}",
                    strategy, files, short, suffix
                ));
            }
        }
    }

    if report.catch_up_exhausted {
        output.warning("Catch-up limit reached; HEAD is still ahead of the wiki");
    } else if report.generated_count() > 0 {
        output.success("Wiki update complete.");
    }
}
