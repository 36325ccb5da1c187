//! Report scraping
//!
//! The stats tasks shell out to text utilities and extract one value from
//! their output. Each extraction is a narrow parser with a documented
//! grammar and a dedicated failure kind, so a missing artifact or an
//! unexpected output format surfaces as a clear diagnostic instead of a
//! bogus count.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use regex::Regex;
use thiserror::Error;

use crate::book::{staging, Project, StagingError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Missing artifact: {} (run the build first)", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Could not parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    #[error("Failed to run {tool}")]
    Tool {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error(transparent)]
    Chapters(#[from] StagingError),
}

/// Counts the words across all chapter sources by running the configured
/// word-count utility with `-w` and scraping its summary.
pub fn word_count(project: &Project, tool: &str) -> Result<u64, ReportError> {
    let chapters = staging::chapter_files(project)?;

    let output = Command::new(tool)
        .arg("-w")
        .args(&chapters)
        .output()
        .map_err(|source| ReportError::Tool {
            tool: tool.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ReportError::ToolFailed {
            tool: tool.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_word_total(&String::from_utf8_lossy(&output.stdout))
}

/// Parses the aggregate count from `wc -w` output.
///
/// Expected grammar: one `<count> <path>` line per file, followed by a
/// final `<total> total` line when more than one file was counted. The last
/// non-empty line therefore always starts with the aggregate count.
fn parse_word_total(text: &str) -> Result<u64, ReportError> {
    let last_line = text
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ReportError::Parse {
            what: "word count",
            detail: "word-count tool produced no output".to_string(),
        })?;

    last_line
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| ReportError::Parse {
            what: "word count",
            detail: format!("expected '<count> ...' line, got '{}'", last_line.trim()),
        })
}

/// Counts the pages of the rendered PDF by scanning its raw bytes for
/// `/Count <n>` page-tree markers.
///
/// The page tree root's count covers every page and dominates any subtree
/// or outline count, so the largest marker wins.
pub fn page_count(pdf: &Path) -> Result<u64, ReportError> {
    let bytes = match fs::read(pdf) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ReportError::MissingArtifact(pdf.to_path_buf()))
        }
        Err(e) => {
            return Err(ReportError::Tool {
                tool: "read".to_string(),
                source: e,
            })
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let marker = Regex::new(r"/Count\s+(\d+)").expect("hard-coded pattern");

    marker
        .captures_iter(&text)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .max()
        .ok_or_else(|| ReportError::Parse {
            what: "page count",
            detail: format!("no /Count marker in {}", pdf.display()),
        })
}
