//! Subprocess-backed converter
//!
//! Shells out to the configured external tools synchronously, blocking the
//! calling task until the subprocess exits. Exit status is always checked:
//! a nonzero status aborts the pipeline rather than silently continuing
//! with a missing or corrupt artifact.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use crate::book::BookConfig;

use super::{ConvertError, Converter};

/// Converter that invokes the configured external programs
pub struct CommandConverter {
    markdown_tool: String,
    html_pdf_tool: String,
}

impl CommandConverter {
    pub fn new(markdown_tool: impl Into<String>, html_pdf_tool: impl Into<String>) -> Self {
        Self {
            markdown_tool: markdown_tool.into(),
            html_pdf_tool: html_pdf_tool.into(),
        }
    }

    /// Builds a converter from the project's `[tools]` section
    pub fn from_config(config: &BookConfig) -> Self {
        Self::new(&config.tools.markdown, &config.tools.html_pdf)
    }

    /// Runs `tool` with `args`, capturing output so failures can carry the
    /// tool's stderr. No timeout is imposed and no retry is attempted.
    fn run<I, S>(&self, tool: &str, args: I) -> Result<(), ConvertError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|source| ConvertError::Spawn {
                tool: tool.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConvertError::ToolFailed {
                tool: tool.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn markdown_convert(
        &self,
        mode: &str,
        input: &Path,
        output: &Path,
    ) -> Result<(), ConvertError> {
        self.run(
            &self.markdown_tool,
            [
                OsStr::new("-t"),
                OsStr::new(mode),
                OsStr::new("-o"),
                output.as_os_str(),
                input.as_os_str(),
            ],
        )
    }
}

impl Converter for CommandConverter {
    fn markdown_to_html(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.markdown_convert("html", input, output)
    }

    fn markdown_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.markdown_convert("pdf", input, output)
    }

    fn markdown_to_latex(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.markdown_convert("latex", input, output)
    }

    fn html_to_pdf(
        &self,
        input: &Path,
        stylesheet: &Path,
        output: &Path,
    ) -> Result<(), ConvertError> {
        self.run(
            &self.html_pdf_tool,
            [
                input.as_os_str(),
                OsStr::new("-s"),
                stylesheet.as_os_str(),
                OsStr::new("-o"),
                output.as_os_str(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_uses_tool_names() {
        let mut config = BookConfig::default();
        config.tools.markdown = "mmd".to_string();
        config.tools.html_pdf = "weasyprint".to_string();

        let converter = CommandConverter::from_config(&config);
        assert_eq!(converter.markdown_tool, "mmd");
        assert_eq!(converter.html_pdf_tool, "weasyprint");
    }

    #[test]
    fn missing_tool_is_a_spawn_error() {
        let converter = CommandConverter::new("bindery-no-such-tool", "also-missing");
        let result =
            converter.markdown_to_html(Path::new("in.mdown"), Path::new("out.html"));

        assert!(matches!(result, Err(ConvertError::Spawn { .. })));
    }

    // Subprocess behavior beyond spawn failures needs real executables;
    // the stub-script integration tests cover success and nonzero exits.
    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_tool_failure() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fail-tool");
        {
            let mut f = std::fs::File::create(&script).unwrap();
            writeln!(f, "#!/bin/sh\necho 'bad input' >&2\nexit 3").unwrap();
        }
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let converter = CommandConverter::new(script.display().to_string(), "unused");
        let result =
            converter.markdown_to_latex(Path::new("in.mdown"), Path::new("out.tex"));

        match result {
            Err(ConvertError::ToolFailed { stderr, status, .. }) => {
                assert_eq!(stderr, "bad input");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }
}
