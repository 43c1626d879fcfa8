//! need-migrate - convert H/M/L priorities to need levels
//!
//! Default mapping: H -> 2, M -> 4, L -> 5, none -> 4.

use clap::Parser;
use need::config::Paths;
use need::error::{exit_codes, Result};
use need::migrate::{self, Mapping, Outcome};
use need::output::{emit_error, emit_success, HumanOutput, OutputOptions};
use need::tracker::TaskCli;

/// Migrate Taskwarrior's H/M/L priorities to the numeric 1-6 scale
#[derive(Parser, Debug)]
#[command(name = "need-migrate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Show changes without modifying tasks
    #[arg(long)]
    dry_run: bool,

    /// Custom mapping (e.g. H:1,M:3,L:5)
    #[arg(long)]
    mapping: Option<String>,

    /// Taskwarrior binary (defaults to $NEED_TASK_BIN or `task`)
    #[arg(long)]
    task_bin: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

fn run(args: &Args) -> Result<bool> {
    let mapping = match &args.mapping {
        Some(raw) => Mapping::parse(raw)?,
        None => Mapping::default(),
    };
    let task_bin = match &args.task_bin {
        Some(bin) => bin.clone(),
        None => Paths::resolve()?.task_bin,
    };
    let tracker = TaskCli::new(task_bin);

    let summary = migrate::migrate_all(&tracker, &mapping, args.dry_run)?;

    let mode = if args.dry_run { "DRY RUN" } else { "LIVE MIGRATION" };
    let mut human = HumanOutput::new("Priority Migration");
    human.push_line("=".repeat(60));
    human.push_line(format!("Mapping: {mapping}"));
    human.push_line(format!("Mode: {mode}"));
    if summary.total == 0 {
        human.push_line("No pending tasks found");
    }
    for task in &summary.tasks {
        let from = task.from.as_deref().unwrap_or("(none)");
        let to = task.to.map(|level| level.to_string()).unwrap_or_default();
        let short = task.uuid.get(..8).unwrap_or(&task.uuid);
        match task.outcome {
            Outcome::Skipped => {}
            Outcome::WouldMigrate => {
                let desc: String = task.description.chars().take(50).collect();
                human.push_line(format!("Would migrate: {short} | {from} -> pri:{to} | {desc}"));
            }
            Outcome::Migrated => human.push_line(format!("Migrated: {short} | {from} -> pri:{to}")),
            Outcome::Failed => human.push_warning(format!(
                "Error migrating {short}: {}",
                task.error.as_deref().unwrap_or("unknown error")
            )),
        }
    }

    human.push_summary("total tasks", summary.total.to_string());
    if args.dry_run {
        human.push_summary("would migrate", summary.would_migrate.to_string());
        human.push_next_step("Run without --dry-run to perform migration");
    } else {
        human.push_summary("migrated", summary.migrated.to_string());
        human.push_summary("errors", summary.errors.to_string());
    }
    human.push_summary("skipped (already numeric)", summary.skipped.to_string());

    emit_success(
        OutputOptions {
            json: args.json,
            quiet: false,
        },
        "migrate",
        &summary,
        Some(&human),
    )?;

    Ok(summary.errors == 0)
}

fn main() {
    need::logging::init_cli();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(exit_codes::FAILURE);
        }
        Err(err) => err.exit(),
    };

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(exit_codes::FAILURE),
        Err(err) => {
            let _ = emit_error("migrate", &err, args.json);
            std::process::exit(err.exit_code());
        }
    }
}
