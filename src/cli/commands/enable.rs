//! Enable Command
//!
//! Creates the tool directory, turns the tool on and installs the hook.

use tracing::debug;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, hook_binary};
use crate::config::ConfigLoader;
use crate::engine::CliEngine;
use crate::hooks::HookInstall;
use crate::types::Result;

pub fn run(force: bool) -> Result<()> {
    let ctx = CommandContext::discover()?;
    let output = Output::new();

    let mut config = ConfigLoader::init_project(ctx.root(), force)?;
    config.enabled = true;
    config.validate()?;
    ConfigLoader::save(ctx.root(), &config)?;

    let hook = ctx.post_commit_hook()?;
    let binary = hook_binary();
    debug!(binary = %binary, "Installing post-commit hook");
    match hook.install(&binary)? {
        HookInstall::Created => output.success(&format!(
            "Installed post-commit hook ({})",
            hook.path().display()
        )),
        HookInstall::Appended => output.success(&format!(
            "Added repowiki to existing post-commit hook ({})",
            hook.path().display()
        )),
        HookInstall::AlreadyInstalled => output.info("Post-commit hook already installed"),
    }

    match CliEngine::locate(&config.engine) {
        Ok(path) => output.info(&format!("Generation engine: {}", path.display())),
        Err(e) => output.warning(&e.to_string()),
    }

    output.success("repowiki enabled");
    output.info(&format!(
        "Wiki will be written to {}",
        config.wiki.display_path()
    ));
    output.info("Run 'repowiki generate' to build the initial wiki");
    Ok(())
}
