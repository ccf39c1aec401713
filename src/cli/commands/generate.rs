//! Generate Command
//!
//! Direct full regeneration of the wiki for HEAD.

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, block_on};
use crate::engine::CliEngine;
use crate::sync::{CycleOutcome, SyncContext, run_generate};
use crate::types::Result;

pub fn run() -> Result<()> {
    let ctx = CommandContext::discover()?;
    let config = ctx.load_config()?;
    let engine = CliEngine::new(config.engine.clone());
    let output = Output::new();

    output.info("Starting full wiki generation... (this may take several minutes)");

    let sync = SyncContext {
        vcs: &ctx.git,
        engine: &engine,
        config: &config,
    };
    let outcome = block_on(run_generate(sync))??;

    if let CycleOutcome::Generated { committed: true, .. } = outcome {
        output.success("Wiki generation complete (committed)");
    } else {
        output.success("Wiki generation complete");
    }
    Ok(())
}
