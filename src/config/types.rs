//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/repowiki/) and project (.repowiki/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{defaults, engine, layout};
use crate::types::{RepoWikiError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether commit hooks should trigger wiki updates
    pub enabled: bool,

    /// Prefix marking commits authored by this tool
    pub commit_prefix: String,

    /// Path prefixes whose changes never trigger documentation work
    pub excluded_paths: Vec<String>,

    /// Changed-file count above which a full regeneration is forced
    pub full_generate_threshold: usize,

    /// Commit wiki changes after a successful generation
    pub auto_commit: bool,

    /// Wiki output settings
    pub wiki: WikiConfig,

    /// Generation engine settings
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: false,
            commit_prefix: defaults::COMMIT_PREFIX.to_string(),
            excluded_paths: vec![
                format!("{}/", defaults::WIKI_PATH),
                format!("{}/", layout::TOOL_DIR),
            ],
            full_generate_threshold: defaults::FULL_GENERATE_THRESHOLD,
            auto_commit: true,
            wiki: WikiConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `RepoWikiError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.commit_prefix.trim().is_empty() {
            return Err(RepoWikiError::Config(
                "commit_prefix must not be empty".to_string(),
            ));
        }

        if self.excluded_paths.iter().any(|p| p.is_empty()) {
            return Err(RepoWikiError::Config(
                "excluded_paths entries must not be empty".to_string(),
            ));
        }

        if self.full_generate_threshold == 0 {
            return Err(RepoWikiError::Config(
                "full_generate_threshold must be greater than 0".to_string(),
            ));
        }

        if self.engine.max_turns == 0 {
            return Err(RepoWikiError::Config(
                "engine.max_turns must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Wiki Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Wiki root (relative to the repository root)
    pub path: PathBuf,

    /// Language subdirectory under the wiki root
    pub language: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(defaults::WIKI_PATH),
            language: defaults::WIKI_LANGUAGE.to_string(),
        }
    }
}

impl WikiConfig {
    /// Wiki root directory for a repository
    pub fn root(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.path)
    }

    /// Directory holding generated markdown pages
    pub fn content_dir(&self, repo_root: &Path) -> PathBuf {
        self.root(repo_root)
            .join(&self.language)
            .join(layout::CONTENT_DIR)
    }

    /// Metadata index written by the engine
    pub fn metadata_path(&self, repo_root: &Path) -> PathBuf {
        self.root(repo_root)
            .join(&self.language)
            .join(layout::METADATA_FILE)
    }

    /// Wiki path as shown in prompts (forward slashes, no trailing slash)
    pub fn display_path(&self) -> String {
        self.path
            .to_string_lossy()
            .replace('\\', "/")
            .trim_end_matches('/')
            .to_string()
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Explicit engine binary; empty means search PATH and known locations
    pub path: Option<PathBuf>,

    /// Model selector ("auto" lets the engine decide)
    pub model: String,

    /// Maximum agent turns per invocation
    pub max_turns: u32,

    /// Capability set granted to the engine (comma separated)
    pub allowed_tools: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: None,
            model: engine::AUTO_MODEL.to_string(),
            max_turns: engine::DEFAULT_MAX_TURNS,
            allowed_tools: engine::DEFAULT_ALLOWED_TOOLS.to_string(),
        }
    }
}

impl EngineConfig {
    /// Model to pass explicitly, if any
    pub fn explicit_model(&self) -> Option<&str> {
        let model = self.model.trim();
        if model.is_empty() || model == engine::AUTO_MODEL {
            None
        } else {
            Some(model)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.enabled);
        assert_eq!(config.commit_prefix, "[repowiki]");
        assert_eq!(config.full_generate_threshold, 20);
        assert!(config.auto_commit);
        assert_eq!(
            config.excluded_paths,
            vec![".qoder/repowiki/".to_string(), ".repowiki/".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.commit_prefix = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.full_generate_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.excluded_paths.push(String::new());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.max_turns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wiki_paths() {
        let wiki = WikiConfig::default();
        let root = Path::new("/repo");
        assert_eq!(
            wiki.content_dir(root),
            PathBuf::from("/repo/.qoder/repowiki/en/content")
        );
        assert_eq!(
            wiki.metadata_path(root),
            PathBuf::from("/repo/.qoder/repowiki/en/meta/repowiki-metadata.json")
        );
        assert_eq!(wiki.display_path(), ".qoder/repowiki");
    }

    #[test]
    fn test_explicit_model() {
        let mut engine = EngineConfig::default();
        assert_eq!(engine.explicit_model(), None);

        engine.model = String::new();
        assert_eq!(engine.explicit_model(), None);

        engine.model = "performance".to_string();
        assert_eq!(engine.explicit_model(), Some("performance"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
enabled = true
full_generate_threshold = 5

[engine]
model = "ultimate"
"#,
        )
        .unwrap();

        assert!(config.enabled);
        assert_eq!(config.full_generate_threshold, 5);
        assert_eq!(config.engine.model, "ultimate");
        assert_eq!(config.engine.max_turns, 50);
        assert_eq!(config.commit_prefix, "[repowiki]");
    }
}
