//! Hook Command
//!
//! Entry point of the installed post-commit hook. Runs the loop-prevention
//! gate and, when it passes, launches a detached worker. Never fails.

use tracing::debug;

use crate::config::ConfigLoader;
use crate::git::{GitCli, Vcs};
use crate::sync::{BackgroundLauncher, GateDecision, evaluate_gate};

pub fn post_commit() {
    let git = match GitCli::discover_cwd() {
        Ok(git) => git,
        Err(e) => {
            debug!("Post-commit hook outside a repository: {}", e);
            return;
        }
    };
    let root = git.root().to_path_buf();

    let GateDecision::Proceed { commit } = evaluate_gate(&git, || ConfigLoader::load(&root)) else {
        return;
    };

    match BackgroundLauncher::for_current_exe(&root) {
        Ok(launcher) => {
            launcher.launch_detached(&commit);
        }
        Err(e) => debug!("Cannot resolve current executable: {}", e),
    }
}
