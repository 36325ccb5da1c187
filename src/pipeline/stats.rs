//! The stats graph
//!
//! A linear reporting sequence: `header` -> `wc` -> `pages` -> `footer`,
//! aggregated by `report`. `momentum` is an unused placeholder kept for a
//! future velocity report.

use crate::book::Project;
use crate::cli::Output;
use crate::graph::{GraphError, Registry, Task, TaskName};
use crate::report;

fn stats(name: &str) -> TaskName {
    TaskName::new("stats", name)
}

pub fn register<'a>(
    registry: &mut Registry<'a>,
    project: &'a Project,
    output: &'a Output,
) -> Result<(), GraphError> {
    registry.define(
        Task::new(stats("header"))
            .describe("Print the report banner")
            .action(move || {
                output.success("===== Manuscript report =====");
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(stats("wc"))
            .describe("Count words across all chapter sources")
            .needs(stats("header"))
            .action(move || {
                let tool = &project.config().tools.word_count;
                let words = report::word_count(project, tool)?;
                output.success(&format!("Words: {}", words));
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(stats("pages"))
            .describe("Count pages in the rendered PDF")
            .needs(stats("wc"))
            .action(move || {
                let pages = report::page_count(&project.pdf_artifact())?;
                output.success(&format!("Pages: {}", pages));
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(stats("footer"))
            .describe("Close the report banner")
            .needs(stats("pages"))
            .action(move || {
                output.success("=============================");
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(stats("report"))
            .describe("Print word count and page count")
            .needs(stats("footer")),
    )?;

    registry.define(Task::new(stats("momentum")).describe("Writing momentum (placeholder)"))?;

    Ok(())
}
