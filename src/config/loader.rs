//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, e.g. ~/.config/repowiki/config.toml)
//! 3. Project config (<repo>/.repowiki/config.toml)
//! 4. Environment variables (REPOWIKI_* prefix)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::layout;
use crate::types::{RepoWikiError, Result};

/// Runtime files inside the tool directory kept out of version control
const TOOL_DIR_GITIGNORE: &str = "# repowiki runtime state\n.repowiki.lock\n.committing\nstate.toml\nlogs/\n";

const ENV_PREFIX: &str = "REPOWIKI_";

/// Environment overrides taken verbatim (variable suffix, config key)
const RAW_STRING_ENV: &[(&str, &str)] = &[
    ("COMMIT_PREFIX", "commit_prefix"),
    ("ENGINE__MODEL", "engine.model"),
    ("ENGINE__ALLOWED_TOOLS", "engine.allowed_tools"),
    ("WIKI__LANGUAGE", "wiki.language"),
];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a repository with full resolution chain:
    /// defaults → global → project → env vars
    ///
    /// Fails with `NotConfigured` when the project has never been enabled.
    pub fn load(repo_root: &Path) -> Result<Config> {
        let project_path = Self::project_config_path(repo_root);
        if !project_path.exists() {
            return Err(RepoWikiError::NotConfigured);
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        debug!("Loading project config from: {}", project_path.display());
        figment = figment.merge(Toml::file(&project_path));

        // e.g. REPOWIKI_ENGINE__MODEL -> engine.model, REPOWIKI_AUTO_COMMIT -> auto_commit
        let raw_keys: Vec<&str> = RAW_STRING_ENV.iter().map(|(var, _)| *var).collect();
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&raw_keys)
                .split("__")
                .lowercase(true),
        );

        // Free-form strings such as "[docs-bot]" must not be parsed as values
        for (var, key) in RAW_STRING_ENV {
            if let Ok(value) = std::env::var(format!("{}{}", ENV_PREFIX, var)) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        let config: Config = figment
            .extract()
            .map_err(|e| RepoWikiError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| RepoWikiError::Config(format!("Configuration error: {}", e)))
    }

    /// Persist the project configuration file
    pub fn save(repo_root: &Path, config: &Config) -> Result<()> {
        let project_dir = Self::project_dir(repo_root);
        fs::create_dir_all(&project_dir)?;

        let content = toml::to_string_pretty(config)?;
        let with_header = format!(
            "# repowiki project configuration\n# Edit directly or re-run 'repowiki enable'\n\n{}",
            content
        );

        fs::write(Self::project_config_path(repo_root), with_header)?;
        Ok(())
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory
    pub fn global_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "repowiki").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join(layout::CONFIG_FILE))
    }

    /// Get the per-repository tool directory
    pub fn project_dir(repo_root: &Path) -> PathBuf {
        repo_root.join(layout::TOOL_DIR)
    }

    /// Get path to project config file
    pub fn project_config_path(repo_root: &Path) -> PathBuf {
        Self::project_dir(repo_root).join(layout::CONFIG_FILE)
    }

    /// Get the hook log directory
    pub fn log_dir(repo_root: &Path) -> PathBuf {
        Self::project_dir(repo_root).join(layout::LOG_DIR)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize the project tool directory.
    ///
    /// Returns the existing configuration untouched unless `force` is set,
    /// in which case defaults are written over it.
    pub fn init_project(repo_root: &Path, force: bool) -> Result<Config> {
        let project_dir = Self::project_dir(repo_root);
        fs::create_dir_all(project_dir.join(layout::LOG_DIR))?;

        let gitignore = project_dir.join(".gitignore");
        if !gitignore.exists() {
            fs::write(&gitignore, TOOL_DIR_GITIGNORE)?;
        }

        let config_path = Self::project_config_path(repo_root);
        if config_path.exists() && !force {
            info!("Project config exists: {}", config_path.display());
            return Self::load_from_file(&config_path);
        }

        let config = Config::default();
        Self::save(repo_root, &config)?;
        info!("Created project config: {}", config_path.display());
        Ok(config)
    }

    /// Check if project is initialized
    pub fn is_project_initialized(repo_root: &Path) -> bool {
        Self::project_config_path(repo_root).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_unconfigured() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, RepoWikiError::NotConfigured));
    }

    #[test]
    fn test_init_project() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let config = ConfigLoader::init_project(root, false).unwrap();
        assert!(!config.enabled);

        assert!(root.join(".repowiki/config.toml").exists());
        assert!(root.join(".repowiki/logs").is_dir());
        let gitignore = fs::read_to_string(root.join(".repowiki/.gitignore")).unwrap();
        assert!(gitignore.contains(".repowiki.lock"));
        assert!(gitignore.contains("state.toml"));
        assert!(ConfigLoader::is_project_initialized(root));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut config = ConfigLoader::init_project(root, false).unwrap();
        config.enabled = true;
        config.full_generate_threshold = 7;
        ConfigLoader::save(root, &config).unwrap();

        let loaded = ConfigLoader::load_from_file(&ConfigLoader::project_config_path(root)).unwrap();
        assert!(loaded.enabled);
        assert_eq!(loaded.full_generate_threshold, 7);

        // Re-initializing without force keeps user edits
        let kept = ConfigLoader::init_project(root, false).unwrap();
        assert_eq!(kept.full_generate_threshold, 7);

        let reset = ConfigLoader::init_project(root, true).unwrap();
        assert_eq!(reset.full_generate_threshold, 20);
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        ConfigLoader::init_project(temp_dir.path(), false).unwrap();

        // SAFETY: no other test reads this variable
        unsafe {
            std::env::set_var("REPOWIKI_COMMIT_PREFIX", "[docs-bot]");
        }
        let config = ConfigLoader::load(temp_dir.path());
        unsafe {
            std::env::remove_var("REPOWIKI_COMMIT_PREFIX");
        }
        assert_eq!(config.unwrap().commit_prefix, "[docs-bot]");
    }

    #[test]
    fn test_env_nested_string_taken_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        ConfigLoader::init_project(temp_dir.path(), false).unwrap();

        // SAFETY: no other test reads these variables
        unsafe {
            std::env::set_var("REPOWIKI_ENGINE__ALLOWED_TOOLS", "[Read,Grep]");
            std::env::set_var("REPOWIKI_ENGINE__MAX_TURNS", "12");
        }
        let config = ConfigLoader::load(temp_dir.path());
        unsafe {
            std::env::remove_var("REPOWIKI_ENGINE__ALLOWED_TOOLS");
            std::env::remove_var("REPOWIKI_ENGINE__MAX_TURNS");
        }
        let config = config.unwrap();
        assert_eq!(config.engine.allowed_tools, "[Read,Grep]");
        assert_eq!(config.engine.max_turns, 12);
    }
}
