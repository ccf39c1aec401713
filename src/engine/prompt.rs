//! Prompt Builder System
//!
//! Structured prompt construction for the generation engine.
//!
//! ## Layout
//!
//! 1. **Role**: who the engine acts as
//! 2. **Objectives**: numbered steps
//! 3. **Sections**: headed text, bullet lists and code blocks
//! 4. **Focus**: hard boundaries on what may be touched

use crate::config::Config;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Bulleted list under a header
    List { header: String, items: Vec<String> },
    /// Code block with language
    Code { language: String, content: String },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives<S: AsRef<str>>(mut self, objectives: &[S]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|o| o.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add a bullet list; skipped entirely when `items` is empty
    pub fn list<S: AsRef<str>>(mut self, header: &str, items: &[S]) -> Self {
        if items.is_empty() {
            return self;
        }
        self.sections.push(PromptSection::List {
            header: header.to_string(),
            items: items.iter().map(|i| i.as_ref().to_string()).collect(),
        });
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus<S: AsRef<str>>(mut self, target: &str, restrictions: &[S]) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.iter().map(|r| r.as_ref().to_string()).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!("You are a {}. {}\n\n", expertise, task));
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("INSTRUCTIONS:\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}:\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::List { header, items } => {
                    prompt.push_str(&format!("{}:\n", header));
                    for item in items {
                        prompt.push_str(&format!("  - {}\n", item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str(&format!("IMPORTANT: Only create or modify files within {}/\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

const METADATA_SCHEMA: &str = r#"{
  "code_snippets": [
    {
      "id": "<md5 hash>",
      "path": "relative/path/to/file",
      "line_range": "1-100",
      "gmt_create": "<ISO 8601 timestamp>",
      "gmt_modified": "<ISO 8601 timestamp>"
    }
  ]
}"#;

const WIKI_STRUCTURE: &[&str] = &[
    "System Overview.md: project purpose, high-level architecture",
    "Technology Stack.md: languages, frameworks, key dependencies",
    "Getting Started.md: setup, installation, running",
    "Backend Architecture/: server structure, API design, database",
    "Frontend Architecture/: UI components, state management",
    "Core Features/: each major feature documented individually",
    "API Reference/: endpoints, request/response formats",
    "Configuration Management.md: environment variables, config files",
];

const PAGE_FORMAT: &[&str] = &[
    "Title as H1 heading",
    "<cite> block listing referenced source files as [filename](file://path/to/file)",
    "Table of Contents with anchor links",
    "Detailed content with code examples from the actual source",
    "Mermaid diagrams for architecture where appropriate",
];

/// Preset prompts for the two generation strategies
pub struct PromptTemplates;

impl PromptTemplates {
    /// Prompt asking for a complete wiki from scratch
    pub fn full_generate(config: &Config) -> String {
        let wiki = config.wiki.display_path();
        let lang = &config.wiki.language;

        PromptBuilder::new()
            .role(
                "technical documentation specialist",
                "Generate a comprehensive repository wiki for this project.",
            )
            .list(
                "OUTPUT REQUIREMENTS",
                &[
                    format!("Create documentation files in {}/{}/content/", wiki, lang),
                    format!(
                        "Create a metadata file at {}/{}/meta/repowiki-metadata.json",
                        wiki, lang
                    ),
                ],
            )
            .list("Each markdown file must follow this structure", PAGE_FORMAT)
            .list("WIKI STRUCTURE", WIKI_STRUCTURE)
            .section(
                "METADATA FORMAT for repowiki-metadata.json",
                "Record every source file the pages reference:",
            )
            .code("json", METADATA_SCHEMA)
            .text("Analyze ALL source files. Be thorough. Include actual code references.")
            .focus(&wiki, &["Do NOT modify any source code"])
            .build()
    }

    /// Prompt asking for targeted updates after code changes
    pub fn incremental(config: &Config, changed_files: &[String], affected_sections: &[String]) -> String {
        let wiki = config.wiki.display_path();
        let lang = &config.wiki.language;

        PromptBuilder::new()
            .role(
                "technical documentation specialist",
                "Update the repository wiki to reflect recent code changes.",
            )
            .list("CHANGED SOURCE FILES", changed_files)
            .list(
                "POTENTIALLY AFFECTED WIKI SECTIONS (check and update these first)",
                affected_sections,
            )
            .objectives(&[
                "Read each changed source file to understand what was modified".to_string(),
                format!("Read the existing wiki pages in {}/{}/content/", wiki, lang),
                "Update ONLY the wiki sections affected by the code changes".to_string(),
                "If a changed file introduces functionality not covered by existing pages, create a new page".to_string(),
                format!(
                    "Update {}/{}/meta/repowiki-metadata.json with any new or modified code snippet references",
                    wiki, lang
                ),
                "Preserve existing formatting: <cite> blocks, Table of Contents, mermaid diagrams".to_string(),
            ])
            .text("Keep documentation accurate and synchronized with the current codebase.")
            .focus(&wiki, &["Do NOT modify any source code"])
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("code analyst", "Document the crate.")
            .objectives(&["Analyze code", "Generate docs"])
            .build();

        assert!(prompt.starts_with("You are a code analyst. Document the crate."));
        assert!(prompt.contains("1. Analyze code"));
        assert!(prompt.contains("2. Generate docs"));
    }

    #[test]
    fn test_empty_list_is_omitted() {
        let empty: &[String] = &[];
        let prompt = PromptBuilder::new().list("FILES", empty).text("done").build();
        assert!(!prompt.contains("FILES"));
        assert_eq!(prompt, "done");
    }

    #[test]
    fn test_full_generate_prompt() {
        let prompt = PromptTemplates::full_generate(&Config::default());
        assert!(prompt.contains(".qoder/repowiki/en/content/"));
        assert!(prompt.contains(".qoder/repowiki/en/meta/repowiki-metadata.json"));
        assert!(prompt.contains("System Overview.md"));
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("Only create or modify files within .qoder/repowiki/"));
    }

    #[test]
    fn test_incremental_prompt_lists_files_and_sections() {
        let files = vec!["src/auth.rs".to_string(), "README.md".to_string()];
        let sections = vec!["Authentication and Security".to_string()];
        let prompt = PromptTemplates::incremental(&Config::default(), &files, &sections);

        assert!(prompt.contains("CHANGED SOURCE FILES:\n  - src/auth.rs\n  - README.md"));
        assert!(prompt.contains("  - Authentication and Security"));
        assert!(prompt.contains("Update ONLY the wiki sections affected"));
    }

    #[test]
    fn test_incremental_prompt_without_sections() {
        let files = vec!["src/lib.rs".to_string()];
        let prompt = PromptTemplates::incremental(&Config::default(), &files, &[]);
        assert!(!prompt.contains("POTENTIALLY AFFECTED"));
    }
}
