//! Project layout
//!
//! A project is a directory holding chapter sources, asset inputs, and the
//! generated output tree. `Project` resolves every path the pipeline
//! touches, so tasks never assemble paths by hand.

use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use super::config::BookConfig;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project directory does not exist: {}", .0.display())]
    NoSuchDirectory(PathBuf),
}

/// A book project: a root directory plus its configuration
pub struct Project {
    root: PathBuf,
    config: BookConfig,
}

impl Project {
    /// Opens the project at the given root, loading `book.toml` if present
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            return Err(ProjectError::NoSuchDirectory(root).into());
        }

        let config = BookConfig::for_project(&root)?;
        Ok(Self { root, config })
    }

    /// Opens the project containing the current directory: the nearest
    /// ancestor with a `book.toml`, or the current directory itself when no
    /// marker is found (the conventional layout needs no configuration).
    pub fn open_current() -> Result<Self> {
        let root = match BookConfig::find_project_root() {
            Some(root) => root,
            None => std::env::current_dir()?,
        };

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Directory scanned for chapter sources
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.config.book.content_dir)
    }

    /// Chapter file extension, without the leading dot
    pub fn chapter_extension(&self) -> &str {
        &self.config.book.extension
    }

    /// Root of the generated output tree
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.book.output_dir)
    }

    /// One subdirectory per output format, in creation order
    pub fn format_dirs(&self) -> [PathBuf; 4] {
        [
            self.html_dir(),
            self.pdf_dir(),
            self.tex_dir(),
            self.markdown_dir(),
        ]
    }

    pub fn html_dir(&self) -> PathBuf {
        self.output_dir().join("html")
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.output_dir().join("pdf")
    }

    pub fn tex_dir(&self) -> PathBuf {
        self.output_dir().join("tex")
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.output_dir().join("markdown")
    }

    /// The concatenated manuscript consumed by every converter
    pub fn merged_path(&self) -> PathBuf {
        self.markdown_dir().join("merged.mdown")
    }

    /// HTML artifact produced by `build:html`
    pub fn html_artifact(&self) -> PathBuf {
        self.html_dir()
            .join(format!("{}.html", self.config.book.title))
    }

    /// PDF artifact produced by `build:pdf`
    pub fn pdf_artifact(&self) -> PathBuf {
        self.pdf_dir().join(format!("{}.pdf", self.config.book.title))
    }

    /// LaTeX artifact produced by `build:latex`
    pub fn tex_artifact(&self) -> PathBuf {
        self.tex_dir().join(format!("{}.tex", self.config.book.title))
    }

    /// PDF rendered from the HTML artifact by `build:html_pdf`
    pub fn html_pdf_artifact(&self) -> PathBuf {
        self.pdf_dir()
            .join(format!("{}-print.pdf", self.config.book.title))
    }

    /// Stylesheet asset input
    pub fn stylesheet(&self) -> PathBuf {
        self.root.join(&self.config.assets.stylesheet)
    }

    /// Stylesheet staged next to the HTML artifact
    pub fn staged_stylesheet(&self) -> PathBuf {
        let name = Path::new(&self.config.assets.stylesheet)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("style.css"));
        self.html_dir().join(name)
    }

    /// Image directory asset input
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.config.assets.images)
    }

    /// Staging destination for image files
    pub fn staged_images_dir(&self) -> PathBuf {
        self.html_dir().join("images")
    }

    /// Typesetting preamble asset input
    pub fn preamble(&self) -> PathBuf {
        self.root.join(&self.config.assets.preamble)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_resolves_paths_from_defaults() {
        let dir = TempDir::new().unwrap();
        let project = Project::open(dir.path()).unwrap();

        assert_eq!(project.root(), dir.path());
        assert_eq!(project.content_dir(), dir.path().join("text"));
        assert_eq!(project.output_dir(), dir.path().join("output"));
        assert_eq!(
            project.merged_path(),
            dir.path().join("output/markdown/merged.mdown")
        );
        assert_eq!(
            project.html_artifact(),
            dir.path().join("output/html/book.html")
        );
        assert_eq!(
            project.html_pdf_artifact(),
            dir.path().join("output/pdf/book-print.pdf")
        );
    }

    #[test]
    fn open_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path().join("nope"));
        assert!(result.is_err());
    }

    #[test]
    fn config_overrides_layout() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("book.toml"),
            "[book]\ntitle = \"rails3\"\ncontent_dir = \"chapters\"\n",
        )
        .unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.content_dir(), dir.path().join("chapters"));
        assert_eq!(
            project.pdf_artifact(),
            dir.path().join("output/pdf/rails3.pdf")
        );
    }

    #[test]
    fn staged_stylesheet_keeps_file_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("book.toml"),
            "[assets]\nstylesheet = \"design/print.css\"\n",
        )
        .unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(
            project.staged_stylesheet(),
            dir.path().join("output/html/print.css")
        );
    }

    #[test]
    fn format_dirs_cover_every_format() {
        let dir = TempDir::new().unwrap();
        let project = Project::open(dir.path()).unwrap();

        let dirs = project.format_dirs();
        assert!(dirs.contains(&project.html_dir()));
        assert!(dirs.contains(&project.pdf_dir()));
        assert!(dirs.contains(&project.tex_dir()));
        assert!(dirs.contains(&project.markdown_dir()));
    }
}
