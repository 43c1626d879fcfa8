//! Command-line interface for need
//!
//! `need` takes a bare level (`need 3`) as well as named subcommands, so
//! anything clap does not recognize is captured as an external subcommand
//! and dispatched here.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Paths;
use crate::error::{Error, Result};
use crate::output::OutputOptions;
use crate::priority::Priority;
use crate::tracker::TaskCli;

mod define;
mod report;
mod span;

/// need - priority-tier context for Taskwarrior
///
/// Shows which need level (1-6) has outstanding work and defines a `need`
/// context that surfaces only the relevant priority band plus anything due
/// or scheduled soon.
#[derive(Parser, Debug)]
#[command(name = "need")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to need.rc (defaults to $NEED_RC or ~/.task/config/need.rc)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Taskwarrior binary (defaults to $NEED_TASK_BIN or `task`)
    #[arg(long, global = true)]
    pub task_bin: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Define the context from the most urgent level with pending work
    Auto,

    /// Delete the need context
    Off,

    /// Set how many levels `need auto` shows (1-6)
    Span {
        /// Number of levels
        value: Option<String>,
    },

    /// `need <1-6>`: show priorities 1 through N
    #[command(external_subcommand)]
    Other(Vec<String>),
}

/// What an invocation resolved to after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Report,
    Auto,
    Manual(Priority),
    Off,
    Span(Option<String>),
}

impl Action {
    /// Resolve a parsed command, accepting bare levels and any-case names.
    pub fn from_command(command: Option<Commands>) -> Result<Self> {
        match command {
            None => Ok(Action::Report),
            Some(Commands::Auto) => Ok(Action::Auto),
            Some(Commands::Off) => Ok(Action::Off),
            Some(Commands::Span { value }) => Ok(Action::Span(value)),
            Some(Commands::Other(args)) => {
                let Some(first) = args.first() else {
                    return Ok(Action::Report);
                };
                let name = first.to_lowercase();
                match name.as_str() {
                    "auto" => Ok(Action::Auto),
                    "off" => Ok(Action::Off),
                    "span" => Ok(Action::Span(args.get(1).cloned())),
                    _ => name
                        .parse::<Priority>()
                        .map(Action::Manual)
                        .map_err(|_| Error::UnknownCommand(first.clone())),
                }
            }
        }
    }
}

impl Cli {
    fn paths(&self) -> Result<Paths> {
        let mut paths = Paths::resolve()?;
        if let Some(config) = &self.config {
            paths.config = config.clone();
        }
        if let Some(task_bin) = &self.task_bin {
            paths.task_bin = task_bin.clone();
        }
        Ok(paths)
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let paths = self.paths()?;
        let tracker = TaskCli::new(&paths.task_bin);

        match Action::from_command(self.command)? {
            Action::Report => report::run(&report::ReportOptions { paths, output }, &tracker),
            Action::Auto => define::run_auto(&define::DefineOptions { paths, output }, &tracker),
            Action::Manual(level) => {
                define::run_manual(&define::DefineOptions { paths, output }, &tracker, level)
            }
            Action::Off => define::run_off(output, &tracker),
            Action::Span(value) => span::run(span::SpanOptions {
                value,
                paths,
                output,
            }),
        }
    }
}
