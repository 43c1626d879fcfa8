//! `need auto`, `need <N>` and `need off`.

use serde::Serialize;

use crate::config::{ConfigStore, Paths, Settings};
use crate::context::ContextManager;
use crate::error::Result;
use crate::filter::{FilterSpec, WindowStart};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::priority::Priority;
use crate::tracker::{self, Tracker};

pub struct DefineOptions {
    pub paths: Paths,
    pub output: OutputOptions,
}

#[derive(Debug, Serialize)]
struct DefineReport {
    context: String,
    mode: &'static str,
    min_priority: Option<u8>,
    max_priority: Option<u8>,
    filter: Option<String>,
}

pub fn run_auto(options: &DefineOptions, tracker: &dyn Tracker) -> Result<()> {
    let store = ConfigStore::load(&options.paths.config)?;
    let settings = Settings::from_store(&store);
    let manager = ContextManager::new(tracker);

    let Some(lowest) = tracker::lowest_pending(tracker, None) else {
        manager.delete()?;

        let report = DefineReport {
            context: manager.name().to_string(),
            mode: "auto",
            min_priority: None,
            max_priority: None,
            filter: None,
        };
        let mut human = HumanOutput::new("No pending tasks found");
        human.push_line(format!("Context '{}' deleted", manager.name()));
        human.push_next_step("If active, run: task context none");
        return emit_success(options.output, "auto", &report, Some(&human));
    };

    let spec = FilterSpec::new(WindowStart::Lowest(lowest), settings.span, &settings);
    define(options, &manager, "auto", &spec)
}

pub fn run_manual(options: &DefineOptions, tracker: &dyn Tracker, level: Priority) -> Result<()> {
    let store = ConfigStore::load(&options.paths.config)?;
    let settings = Settings::from_store(&store);
    let manager = ContextManager::new(tracker);

    let spec = FilterSpec::new(WindowStart::Manual, level.level(), &settings);
    define(options, &manager, "manual", &spec)
}

fn define(
    options: &DefineOptions,
    manager: &ContextManager<'_>,
    mode: &'static str,
    spec: &FilterSpec,
) -> Result<()> {
    let filter = spec.build();
    manager.define(&filter)?;

    let min = spec.min_priority;
    let max = spec.max_priority();
    let report = DefineReport {
        context: manager.name().to_string(),
        mode,
        min_priority: Some(min.level()),
        max_priority: Some(max.level()),
        filter: Some(filter.clone()),
    };

    let mut human = HumanOutput::new(format!(
        "Context defined: priority {min}-{max} + lookahead"
    ));
    human.push_summary("filter", filter);
    human.push_summary(
        "window",
        format!("today-{} .. today+{}", spec.lookback, spec.lookahead),
    );
    for hint in manager.activation_hints() {
        human.push_next_step(hint);
    }

    let command = if mode == "auto" { "auto" } else { "level" };
    emit_success(options.output, command, &report, Some(&human))
}

pub fn run_off(output: OutputOptions, tracker: &dyn Tracker) -> Result<()> {
    let manager = ContextManager::new(tracker);
    manager.delete()?;

    #[derive(Serialize)]
    struct OffReport<'a> {
        context: &'a str,
        deleted: bool,
    }

    let mut human = HumanOutput::new(format!("Context '{}' deleted", manager.name()));
    human.push_next_step("If active, run: task context none");
    emit_success(
        output,
        "off",
        &OffReport {
            context: manager.name(),
            deleted: true,
        },
        Some(&human),
    )
}
