//! Wiki Output
//!
//! Read-only view of what the generation engine has produced, plus the
//! self-commit that publishes it.
//!
//! ## Layout
//!
//! ```text
//! <wiki.path>/<language>/
//!   content/**/*.md                  generated pages
//!   meta/repowiki-metadata.json      source references index
//! ```

mod commit;

pub use commit::WikiCommitter;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::WikiConfig;

/// Generated wiki for one repository
#[derive(Debug, Clone)]
pub struct WikiOutput {
    content_dir: PathBuf,
    metadata_path: PathBuf,
}

impl WikiOutput {
    pub fn new(repo_root: &Path, config: &WikiConfig) -> Self {
        Self {
            content_dir: config.content_dir(repo_root),
            metadata_path: config.metadata_path(repo_root),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// A wiki exists once at least one page has been written
    pub fn exists(&self) -> bool {
        !self.pages().is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pages().len()
    }

    /// Markdown pages relative to the content directory, sorted
    pub fn pages(&self) -> Vec<PathBuf> {
        let mut pages = Vec::new();
        collect_pages(&self.content_dir, Path::new(""), &mut pages);
        pages.sort();
        pages
    }
}

fn collect_pages(dir: &Path, rel: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        if path.is_dir() {
            collect_pages(&path, &rel.join(&name), out);
        } else if path.extension().is_some_and(|ext| ext == "md") {
            out.push(rel.join(&name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_wiki() {
        let dir = TempDir::new().unwrap();
        let wiki = WikiOutput::new(dir.path(), &WikiConfig::default());
        assert!(!wiki.exists());
        assert_eq!(wiki.page_count(), 0);
    }

    #[test]
    fn test_empty_content_dir_is_not_a_wiki() {
        let dir = TempDir::new().unwrap();
        let wiki = WikiOutput::new(dir.path(), &WikiConfig::default());
        fs::create_dir_all(wiki.content_dir()).unwrap();
        fs::write(wiki.content_dir().join("notes.txt"), "x").unwrap();
        assert!(!wiki.exists());
    }

    #[test]
    fn test_pages_are_found_recursively() {
        let dir = TempDir::new().unwrap();
        let wiki = WikiOutput::new(dir.path(), &WikiConfig::default());
        let content = wiki.content_dir().to_path_buf();
        fs::create_dir_all(content.join("Backend Architecture")).unwrap();
        fs::write(content.join("System Overview.md"), "# Overview").unwrap();
        fs::write(content.join("Backend Architecture/Database.md"), "# DB").unwrap();

        assert!(wiki.exists());
        assert_eq!(
            wiki.pages(),
            vec![
                PathBuf::from("Backend Architecture/Database.md"),
                PathBuf::from("System Overview.md"),
            ]
        );
    }
}
