//! External document conversion
//!
//! The converters are opaque collaborators invoked as subprocesses. The
//! [`Converter`] trait gives the pipeline one method per conversion
//! direction, so tests can substitute a fake that records calls and returns
//! canned results instead of requiring the real binaries.

mod command;

use std::io;
use std::path::Path;
use std::process::ExitStatus;

use thiserror::Error;

pub use command::CommandConverter;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to run {tool}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// One method per conversion direction the pipeline needs
pub trait Converter {
    /// Merged manuscript -> HTML
    fn markdown_to_html(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Merged manuscript -> PDF, directly
    fn markdown_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Merged manuscript -> LaTeX source
    fn markdown_to_latex(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// HTML artifact -> PDF via the HTML renderer
    fn html_to_pdf(
        &self,
        input: &Path,
        stylesheet: &Path,
        output: &Path,
    ) -> Result<(), ConvertError>;
}
