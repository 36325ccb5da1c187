//! Pipeline wiring
//!
//! Registers the `build:` and `stats:` graphs over a project, a converter,
//! and the CLI output helper. Both graphs are declared once at startup and
//! invoked by name from the CLI.

mod build;
mod stats;

use crate::book::Project;
use crate::cli::Output;
use crate::convert::Converter;
use crate::graph::{GraphError, Registry};

/// Registers every task of both graphs
pub fn register<'a>(
    registry: &mut Registry<'a>,
    project: &'a Project,
    converter: &'a dyn Converter,
    output: &'a Output,
) -> Result<(), GraphError> {
    build::register(registry, project, converter, output)?;
    stats::register(registry, project, output)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::cli::OutputFormat;
    use crate::convert::ConvertError;
    use crate::graph::{Runner, TaskName};

    use super::*;

    /// Converter that records calls and writes placeholder artifacts
    struct FakeConverter {
        calls: RefCell<Vec<&'static str>>,
        fail_on: Option<&'static str>,
    }

    impl FakeConverter {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(call: &'static str) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on: Some(call),
            }
        }

        fn record(&self, call: &'static str, output: &Path) -> Result<(), ConvertError> {
            self.calls.borrow_mut().push(call);

            if self.fail_on == Some(call) {
                return Err(ConvertError::Spawn {
                    tool: call.to_string(),
                    source: io::Error::new(io::ErrorKind::Other, "canned failure"),
                });
            }

            fs::write(output, "fake artifact").map_err(|source| ConvertError::Spawn {
                tool: call.to_string(),
                source,
            })
        }

        fn count(&self, call: &str) -> usize {
            self.calls.borrow().iter().filter(|c| **c == call).count()
        }
    }

    impl Converter for FakeConverter {
        fn markdown_to_html(&self, _input: &Path, output: &Path) -> Result<(), ConvertError> {
            self.record("html", output)
        }

        fn markdown_to_pdf(&self, _input: &Path, output: &Path) -> Result<(), ConvertError> {
            self.record("pdf", output)
        }

        fn markdown_to_latex(&self, _input: &Path, output: &Path) -> Result<(), ConvertError> {
            self.record("latex", output)
        }

        fn html_to_pdf(
            &self,
            _input: &Path,
            _stylesheet: &Path,
            output: &Path,
        ) -> Result<(), ConvertError> {
            self.record("html_pdf", output)
        }
    }

    fn fixture_project() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();

        let text = dir.path().join("text/01-basics");
        fs::create_dir_all(&text).unwrap();
        fs::write(text.join("01-intro.mdown"), "# Intro\n\nHello world.\n").unwrap();
        fs::write(text.join("02-routes.mdown"), "# Routes\n\nMore prose.\n").unwrap();

        let src = dir.path().join("src");
        fs::create_dir_all(src.join("images")).unwrap();
        fs::write(src.join("style.css"), "body {}").unwrap();
        fs::write(src.join("images/cover.png"), [0u8; 4]).unwrap();
        fs::write(src.join("preamble.tex"), "%").unwrap();

        let project = Project::open(dir.path()).unwrap();
        (dir, project)
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Text, false)
    }

    #[test]
    fn build_all_converts_each_format_once() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        let mut runner = Runner::new(&registry);
        runner
            .invoke(&TaskName::new("build", "all"))
            .unwrap();

        for call in ["html", "latex", "pdf", "html_pdf"] {
            assert_eq!(converter.count(call), 1, "{call} should run exactly once");
        }

        // Setup ran once up front: every artifact from the run is still
        // present, so clobber cannot have run again in between.
        assert!(project.merged_path().is_file());
        assert!(project.html_artifact().is_file());
        assert!(project.tex_artifact().is_file());
        assert!(project.pdf_artifact().is_file());
        assert!(project.html_pdf_artifact().is_file());
        assert!(project.staged_stylesheet().is_file());
    }

    #[test]
    fn merged_manuscript_concatenates_in_path_order() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        Runner::new(&registry)
            .invoke(&TaskName::new("build", "merge"))
            .unwrap();

        let merged = fs::read_to_string(project.merged_path()).unwrap();
        let intro = merged.find("# Intro").unwrap();
        let routes = merged.find("# Routes").unwrap();
        assert!(intro < routes);
    }

    #[test]
    fn html_pdf_runs_after_html() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        Runner::new(&registry)
            .invoke(&TaskName::new("build", "html_pdf"))
            .unwrap();

        let calls = converter.calls.borrow();
        let html = calls.iter().position(|c| *c == "html").unwrap();
        let html_pdf = calls.iter().position(|c| *c == "html_pdf").unwrap();
        assert!(html < html_pdf);
    }

    #[test]
    fn conversion_failure_names_the_task() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::failing_on("pdf");
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        let err = Runner::new(&registry)
            .invoke(&TaskName::new("build", "all"))
            .unwrap_err();

        let message = format!("{:#}", anyhow::Error::from(err));
        assert!(message.contains("build:pdf"), "message was: {message}");
        assert!(message.contains("canned failure"), "message was: {message}");
    }

    #[test]
    fn clobber_without_output_tree_succeeds() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        Runner::new(&registry)
            .invoke(&TaskName::new("build", "clobber"))
            .unwrap();
        assert!(!project.output_dir().exists());
    }

    #[test]
    fn publish_is_a_registered_stub() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        // No prerequisites, no action; invoking it succeeds and converts
        // nothing.
        Runner::new(&registry)
            .invoke(&TaskName::new("build", "publish"))
            .unwrap();
        assert!(converter.calls.borrow().is_empty());
    }

    #[test]
    fn momentum_placeholder_is_registered_but_unreferenced() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        let momentum = TaskName::new("stats", "momentum");
        assert!(registry.contains(&momentum));

        // Nothing in the stats chain depends on it.
        let order = registry
            .execution_order(&TaskName::new("stats", "report"))
            .unwrap();
        assert!(!order.contains(&momentum));
    }

    #[cfg(unix)]
    #[test]
    fn stats_report_reads_build_artifacts() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        // Stage a PDF with a page-tree marker where stats:pages expects it.
        fs::create_dir_all(project.pdf_dir()).unwrap();
        fs::write(
            project.pdf_artifact(),
            b"%PDF-1.4\n<< /Type /Pages /Count 7 >>\n".as_slice(),
        )
        .unwrap();

        Runner::new(&registry)
            .invoke(&TaskName::new("stats", "report"))
            .unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn stats_pages_without_pdf_fails_with_diagnostic() {
        let (_dir, project) = fixture_project();
        let converter = FakeConverter::new();
        let output = quiet();

        let mut registry = Registry::new();
        register(&mut registry, &project, &converter, &output).unwrap();

        let err = Runner::new(&registry)
            .invoke(&TaskName::new("stats", "pages"))
            .unwrap_err();

        let message = format!("{:#}", anyhow::Error::from(err));
        assert!(message.contains("stats:pages"), "message was: {message}");
        assert!(message.contains("run the build"), "message was: {message}");
    }
}
