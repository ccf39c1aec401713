//! Disable Command
//!
//! Removes the hook block and turns the tool off. The wiki is left in place.

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::ConfigLoader;
use crate::types::Result;

pub fn run() -> Result<()> {
    let ctx = CommandContext::discover()?;
    let output = Output::new();

    if ctx.post_commit_hook()?.uninstall()? {
        output.success("Removed post-commit hook");
    } else {
        output.info("Post-commit hook was not installed");
    }

    if ConfigLoader::is_project_initialized(ctx.root()) {
        let mut config = ConfigLoader::load_from_file(&ConfigLoader::project_config_path(ctx.root()))?;
        config.enabled = false;
        ConfigLoader::save(ctx.root(), &config)?;
    }

    output.success("repowiki disabled (wiki files kept)");
    Ok(())
}
