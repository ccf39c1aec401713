//! Affected-section hints
//!
//! Advisory list of wiki areas likely touched by a change set, built from
//! two sources:
//!
//! - a reverse index mapping documented source files to the pages citing them
//! - path-fragment heuristics mapping well-known directories to sections
//!
//! The engine is free to ignore the hints.

use std::collections::{BTreeSet, HashMap};
use std::fs;

use serde::Deserialize;
use tracing::debug;

use crate::wiki::WikiOutput;

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    code_snippets: Vec<CodeSnippet>,
}

#[derive(Debug, Deserialize)]
struct CodeSnippet {
    path: String,
}

/// Source path to citing wiki pages
#[derive(Debug, Default, Clone)]
pub struct SectionIndex {
    pages_by_source: HashMap<String, Vec<String>>,
}

impl SectionIndex {
    /// Build from the engine's metadata and pages.
    ///
    /// Missing or malformed metadata yields an empty index.
    pub fn build(wiki: &WikiOutput) -> Self {
        let sources = match read_metadata(wiki) {
            Some(meta) => meta
                .code_snippets
                .into_iter()
                .map(|s| s.path)
                .filter(|p| !p.is_empty())
                .collect::<BTreeSet<_>>(),
            None => return Self::default(),
        };

        let mut pages_by_source: HashMap<String, Vec<String>> = HashMap::new();
        for page in wiki.pages() {
            let Ok(content) = fs::read_to_string(wiki.content_dir().join(&page)) else {
                continue;
            };
            let page = page.to_string_lossy().replace('\\', "/");
            // A bare mention subsumes the file:// form
            for source in sources.iter().filter(|s| content.contains(s.as_str())) {
                pages_by_source
                    .entry(source.clone())
                    .or_default()
                    .push(page.clone());
            }
        }

        debug!(sources = pages_by_source.len(), "Built section index");
        Self { pages_by_source }
    }

    pub fn pages_for(&self, source: &str) -> &[String] {
        self.pages_by_source
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.pages_by_source.is_empty()
    }
}

fn read_metadata(wiki: &WikiOutput) -> Option<Metadata> {
    let data = fs::read_to_string(wiki.metadata_path()).ok()?;
    match serde_json::from_str(&data) {
        Ok(meta) => Some(meta),
        Err(e) => {
            debug!("Ignoring unreadable wiki metadata: {}", e);
            None
        }
    }
}

/// Sections suggested by path fragments of one file
pub fn heuristic_sections(path: &str) -> Vec<&'static str> {
    let lower = path.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
    let mut sections = Vec::new();

    if has(&["backend/", "server/", "src/api/"]) {
        sections.push("Backend Architecture");
    } else if has(&["frontend/", "src/components/", "src/app/"]) {
        sections.push("Frontend Architecture");
    }

    if has(&["api/", "routes/", "endpoints/"]) {
        sections.push("API Reference");
    }

    if has(&["config", ".env", "settings"]) {
        sections.push("Configuration Management");
    }

    if ["readme.md", "package.json", "pyproject.toml"]
        .iter()
        .any(|s| lower.ends_with(s))
    {
        sections.push("System Overview");
    }

    if has(&["auth", "security"]) {
        sections.push("Authentication and Security");
    }

    if has(&["database/", "models/", "migrations/"]) {
        sections.push("Backend Architecture");
    }

    sections
}

/// Deduplicated, sorted hints for a change set
pub fn affected_sections(index: &SectionIndex, changed_files: &[String]) -> Vec<String> {
    let mut affected = BTreeSet::new();

    for file in changed_files {
        affected.extend(index.pages_for(file).iter().cloned());
        affected.extend(heuristic_sections(file).into_iter().map(String::from));
    }

    affected.into_iter().collect()
}
