//! Configuration handling for bindery
//!
//! Configuration is stored in `book.toml` at the project root. Every field
//! has a default, so a project without a `book.toml` builds with the
//! conventional layout (`text/` chapters, `src/` assets, `output/` tree).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "book.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Manuscript layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookSection {
    /// Stem for generated artifacts (`book` -> `book.html`, `book.pdf`, ...)
    pub title: String,

    /// Directory scanned recursively for chapter sources
    pub content_dir: String,

    /// Chapter file extension, without the leading dot
    pub extension: String,

    /// Directory holding the stylesheet, images, and preamble
    pub src_dir: String,

    /// Root of the generated output tree
    pub output_dir: String,
}

impl Default for BookSection {
    fn default() -> Self {
        Self {
            title: "book".to_string(),
            content_dir: "text".to_string(),
            extension: "mdown".to_string(),
            src_dir: "src".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

/// External converter commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// Markdown-family converter with HTML/PDF/LaTeX output modes
    pub markdown: String,

    /// HTML-to-PDF renderer
    pub html_pdf: String,

    /// Word-count utility used by the stats report
    pub word_count: String,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            markdown: "multimarkdown".to_string(),
            html_pdf: "prince".to_string(),
            word_count: "wc".to_string(),
        }
    }
}

/// Asset inputs staged into the output tree, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Stylesheet copied next to the HTML artifact
    pub stylesheet: String,

    /// Directory whose files are copied into the HTML image tree
    pub images: String,

    /// Typesetting preamble copied next to the LaTeX artifact
    pub preamble: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            stylesheet: "src/style.css".to_string(),
            images: "src/images".to_string(),
            preamble: "src/preamble.tex".to_string(),
        }
    }
}

/// Project configuration, loaded from `book.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub book: BookSection,
    pub tools: ToolsSection,
    pub assets: AssetsSection,
}

impl BookConfig {
    /// Loads the configuration for a project root; a missing `book.toml`
    /// yields the defaults.
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))
    }

    /// Finds the project root by looking for `book.toml`, starting at the
    /// current directory and walking up.
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Finds the project root by walking up from `start`
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(CONFIG_FILE).is_file() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = BookConfig::default();

        assert_eq!(config.book.title, "book");
        assert_eq!(config.book.content_dir, "text");
        assert_eq!(config.book.extension, "mdown");
        assert_eq!(config.tools.markdown, "multimarkdown");
        assert_eq!(config.tools.html_pdf, "prince");
        assert_eq!(config.assets.stylesheet, "src/style.css");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[book]
title = "rails3"
extension = "md"

[tools]
markdown = "mmd"
"#;

        let config: BookConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.book.title, "rails3");
        assert_eq!(config.book.extension, "md");
        // Unspecified fields keep their defaults.
        assert_eq!(config.book.content_dir, "text");
        assert_eq!(config.tools.markdown, "mmd");
        assert_eq!(config.tools.html_pdf, "prince");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = BookConfig::for_project(dir.path()).unwrap();
        assert_eq!(config.book.title, "book");
    }

    #[test]
    fn load_from_project_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[book]\ntitle = \"fieldguide\"\n").unwrap();

        let config = BookConfig::for_project(dir.path()).unwrap();
        assert_eq!(config.book.title, "fieldguide");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not [valid toml").unwrap();

        assert!(BookConfig::for_project(dir.path()).is_err());
    }

    #[test]
    fn find_root_walks_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "").unwrap();

        let sub = dir.path().join("text").join("part1");
        std::fs::create_dir_all(&sub).unwrap();

        let root = BookConfig::find_project_root_from(&sub);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn find_root_misses_without_marker() {
        let dir = TempDir::new().unwrap();
        // No book.toml anywhere under the temp root; the walk can still hit
        // one further up on the host, so only assert it is not the temp dir.
        let root = BookConfig::find_project_root_from(dir.path());
        assert_ne!(root.as_deref(), Some(dir.path()));
    }
}
