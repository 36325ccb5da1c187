//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use super::output::{Output, OutputFormat};
use crate::book::Project;
use crate::convert::CommandConverter;
use crate::graph::{Registry, Runner, TaskName};
use crate::pipeline;

#[derive(Parser)]
#[command(name = "bindery")]
#[command(author, version, about = "Build pipeline for book manuscripts")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project directory (defaults to the nearest ancestor with a book.toml)
    #[arg(long, short = 'C', global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a build target
    Build {
        /// Target to invoke
        #[arg(value_enum)]
        target: BuildTarget,

        /// Print the execution order without running any actions
        #[arg(long)]
        dry_run: bool,
    },

    /// Run a reporting target
    Stats {
        /// Target to invoke
        #[arg(value_enum)]
        target: StatsTarget,
    },

    /// List every registered task
    Tasks,
}

/// Targets of the build graph
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BuildTarget {
    /// Build every output format
    All,
    /// Merged manuscript to HTML
    Html,
    /// Merged manuscript directly to PDF
    Pdf,
    /// Merged manuscript to LaTeX source
    Latex,
    /// HTML output to PDF via the HTML renderer
    HtmlPdf,
    /// Wipe the output tree
    Clobber,
    /// Publish the built artifacts (stub)
    Publish,
}

impl BuildTarget {
    fn task_name(self) -> TaskName {
        let name = match self {
            BuildTarget::All => "all",
            BuildTarget::Html => "html",
            BuildTarget::Pdf => "pdf",
            BuildTarget::Latex => "latex",
            BuildTarget::HtmlPdf => "html_pdf",
            BuildTarget::Clobber => "clobber",
            BuildTarget::Publish => "publish",
        };
        TaskName::new("build", name)
    }
}

/// Targets of the stats graph
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatsTarget {
    /// Print word count and page count
    Report,
    /// Word count only
    Wc,
    /// Page count only
    Pages,
}

impl StatsTarget {
    fn task_name(self) -> TaskName {
        let name = match self {
            StatsTarget::Report => "report",
            StatsTarget::Wc => "wc",
            StatsTarget::Pages => "pages",
        };
        TaskName::new("stats", name)
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("bindery starting");

    let project = match &cli.dir {
        Some(dir) => Project::open(dir)?,
        None => Project::open_current()?,
    };
    output.verbose_ctx("project", &format!("root: {}", project.root().display()));

    let converter = CommandConverter::from_config(project.config());
    let mut registry = Registry::new();
    pipeline::register(&mut registry, &project, &converter, &output)?;

    match cli.command {
        Commands::Build { target, dry_run } => {
            let task = target.task_name();

            if dry_run {
                print_order(&registry, &task, &output)?;
            } else {
                let mut runner = Runner::new(&registry);
                runner.invoke(&task)?;
                output.success(&format!("{} complete", task));
            }
        }

        Commands::Stats { target } => {
            let task = target.task_name();
            let mut runner = Runner::new(&registry);
            runner.invoke(&task)?;
        }

        Commands::Tasks => list_tasks(&registry, &output),
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Prints the resolved execution order for a target without running it
fn print_order(registry: &Registry, task: &TaskName, output: &Output) -> Result<()> {
    let order = registry.execution_order(task)?;

    if output.is_json() {
        let names: Vec<String> = order.iter().map(ToString::to_string).collect();
        output.data(&names);
    } else {
        for name in &order {
            println!("{}", name);
        }
    }

    Ok(())
}

/// Lists every registered task with its prerequisites and description
fn list_tasks(registry: &Registry, output: &Output) {
    if output.is_json() {
        let items: Vec<_> = registry
            .tasks()
            .map(|task| {
                serde_json::json!({
                    "name": task.name().to_string(),
                    "prerequisites": task
                        .prerequisites()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>(),
                    "description": task.description(),
                })
            })
            .collect();
        output.data(&items);
    } else {
        for task in registry.tasks() {
            println!(
                "{:<24} {}",
                task.name().to_string(),
                task.description().unwrap_or("")
            );
        }
    }
}
