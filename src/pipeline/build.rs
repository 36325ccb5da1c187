//! The build graph
//!
//! `clobber` -> `make_directories` -> `merge` -> `copy_assets` form `setup`;
//! the four format targets each depend on `setup` (and `html_pdf` also on
//! `html`); `all` aggregates the format targets. `publish` is a stub.

use std::fs;
use std::io;

use crate::book::{staging, Project};
use crate::cli::Output;
use crate::convert::Converter;
use crate::graph::{GraphError, Registry, Task, TaskName};

fn build(name: &str) -> TaskName {
    TaskName::new("build", name)
}

pub fn register<'a>(
    registry: &mut Registry<'a>,
    project: &'a Project,
    converter: &'a dyn Converter,
    output: &'a Output,
) -> Result<(), GraphError> {
    registry.define(
        Task::new(build("clobber"))
            .describe("Remove the output tree")
            .action(move || {
                output.verbose_ctx("clobber", "removing output tree");
                staging::clobber(project)?;
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("make_directories"))
            .describe("Create the per-format output directories")
            .needs(build("clobber"))
            .action(move || {
                output.verbose_ctx("make_directories", "creating output tree");
                staging::make_directories(project)?;
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("merge"))
            .describe("Concatenate chapter sources into the merged manuscript")
            .needs(build("make_directories"))
            .action(move || {
                staging::merge(project)?;
                output.verbose_ctx(
                    "merge",
                    &format!("wrote {}", project.merged_path().display()),
                );
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("copy_assets"))
            .describe("Stage the stylesheet, images, and preamble")
            .needs(build("merge"))
            .action(move || {
                output.verbose_ctx("copy_assets", "staging assets");
                staging::copy_assets(project)?;
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("setup"))
            .describe("Prepare a clean output tree with all build inputs")
            .needs(build("clobber"))
            .needs(build("make_directories"))
            .needs(build("merge"))
            .needs(build("copy_assets")),
    )?;

    registry.define(
        Task::new(build("html"))
            .describe("Convert the merged manuscript to HTML")
            .needs(build("setup"))
            .action(move || {
                let artifact = project.html_artifact();
                converter.markdown_to_html(&project.merged_path(), &artifact)?;
                output.verbose_ctx("html", &format!("wrote {}", artifact.display()));
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("latex"))
            .describe("Convert the merged manuscript to LaTeX source")
            .needs(build("setup"))
            .action(move || {
                let artifact = project.tex_artifact();
                converter.markdown_to_latex(&project.merged_path(), &artifact)?;
                output.verbose_ctx("latex", &format!("wrote {}", artifact.display()));
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("pdf"))
            .describe("Convert the merged manuscript directly to PDF")
            .needs(build("setup"))
            .action(move || {
                let artifact = project.pdf_artifact();
                converter.markdown_to_pdf(&project.merged_path(), &artifact)?;
                remove_typesetting_byproducts(project)?;
                output.verbose_ctx("pdf", &format!("wrote {}", artifact.display()));
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("html_pdf"))
            .describe("Render the HTML output to PDF")
            .needs(build("setup"))
            .needs(build("html"))
            .action(move || {
                let artifact = project.html_pdf_artifact();
                converter.html_to_pdf(
                    &project.html_artifact(),
                    &project.staged_stylesheet(),
                    &artifact,
                )?;
                output.verbose_ctx("html_pdf", &format!("wrote {}", artifact.display()));
                Ok(())
            }),
    )?;

    registry.define(
        Task::new(build("all"))
            .describe("Build every output format")
            .needs(build("html"))
            .needs(build("latex"))
            .needs(build("pdf"))
            .needs(build("html_pdf")),
    )?;

    registry.define(Task::new(build("publish")).describe("Publish the built artifacts (stub)"))?;

    Ok(())
}

/// Removes intermediate typesetting byproducts left next to the PDF
/// artifact. Absent files are fine; the converter does not always leave
/// them behind.
fn remove_typesetting_byproducts(project: &Project) -> anyhow::Result<()> {
    let artifact = project.pdf_artifact();

    for extension in ["aux", "log", "out", "toc"] {
        let byproduct = artifact.with_extension(extension);
        match fs::remove_file(&byproduct) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
