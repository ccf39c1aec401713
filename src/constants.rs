//! Global Constants
//!
//! Centralized constants for file layout and orchestration tuning.
//! All magic numbers should be defined here with documentation.

/// Tool directory layout (relative to the repository root)
pub mod layout {
    /// Hidden per-repository tool directory
    pub const TOOL_DIR: &str = ".repowiki";

    /// Project configuration file inside the tool directory
    pub const CONFIG_FILE: &str = "config.toml";

    /// Run state (baseline commit, last run) inside the tool directory
    pub const STATE_FILE: &str = "state.toml";

    /// Process lock file inside the tool directory
    pub const LOCK_FILE: &str = ".repowiki.lock";

    /// Sentinel marking an in-progress wiki commit
    pub const SENTINEL_FILE: &str = ".committing";

    /// Log directory inside the tool directory
    pub const LOG_DIR: &str = "logs";

    /// Append-only log receiving hook-triggered worker output
    pub const HOOK_LOG_FILE: &str = "hook.log";

    /// Metadata index written by the generation engine (under `<wiki>/<lang>/`)
    pub const METADATA_FILE: &str = "meta/repowiki-metadata.json";

    /// Content directory written by the generation engine (under `<wiki>/<lang>/`)
    pub const CONTENT_DIR: &str = "content";
}

/// Process lock constants
pub mod lock {
    /// Age after which a lock is reclaimable even if its owner is alive (30 minutes)
    pub const STALE_AFTER_SECS: i64 = 30 * 60;
}

/// Update cycle constants
pub mod cycle {
    /// Maximum catch-up passes after the initial update cycle
    pub const MAX_CATCH_UP_ITERATIONS: usize = 5;
}

/// Generation engine constants
pub mod engine {
    /// Binary name looked up on PATH
    pub const BINARY_NAME: &str = "qodercli";

    /// Default maximum agent turns per invocation
    pub const DEFAULT_MAX_TURNS: u32 = 50;

    /// Default capability set granted to the engine
    pub const DEFAULT_ALLOWED_TOOLS: &str = "Read,Write,Edit,Glob,Grep,Bash";

    /// Model selector meaning "let the engine decide"
    pub const AUTO_MODEL: &str = "auto";

    /// Known macOS install locations
    pub const MACOS_PATHS: &[&str] = &[
        "/Applications/Qoder.app/Contents/Resources/app/resources/bin/aarch64_darwin/qodercli",
        "/Applications/Qoder.app/Contents/Resources/app/resources/bin/x86_64_darwin/qodercli",
    ];

    /// Known Linux install locations
    pub const LINUX_PATHS: &[&str] = &["/usr/bin/qodercli", "/usr/local/bin/qodercli"];
}

/// Configuration defaults
pub mod defaults {
    /// Prefix marking commits authored by this tool
    pub const COMMIT_PREFIX: &str = "[repowiki]";

    /// Changed-file count above which a full regeneration is forced
    pub const FULL_GENERATE_THRESHOLD: usize = 20;

    /// Wiki output directory (relative to the repository root)
    pub const WIKI_PATH: &str = ".qoder/repowiki";

    /// Wiki language subdirectory
    pub const WIKI_LANGUAGE: &str = "en";
}

/// Git hook constants
pub mod hooks {
    /// Marker line identifying the block this tool owns inside a hook script
    pub const MARKER: &str = "# repowiki post-commit hook (auto-installed)";

    /// Line closing the owned block
    pub const END_MARKER: &str = "# end repowiki";

    /// Hook script file name inside the hooks directory
    pub const POST_COMMIT: &str = "post-commit";

    /// Binary invoked by the hook when the installing executable cannot be resolved
    pub const FALLBACK_BINARY: &str = "repowiki";
}
