//! `need` with no arguments: the priority pyramid.

use serde::Serialize;

use crate::config::Paths;
use crate::context::{ContextManager, ContextState};
use crate::error::Result;
use crate::filter;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::priority::{lowest_pending_level, PendingCounts, Priority};
use crate::tracker::{self, Tracker};

pub struct ReportOptions {
    pub paths: Paths,
    pub output: OutputOptions,
}

#[derive(Debug, Serialize)]
struct LevelReport {
    level: u8,
    label: &'static str,
    pending: u64,
    active: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    levels: Vec<LevelReport>,
    total_pending: u64,
    lowest_pending: Option<u8>,
    context: ContextState,
    filter: Option<String>,
    config: String,
}

/// Indent per level so the labels form a pyramid, widest at the top.
fn indent(level: Priority) -> usize {
    match level {
        Priority::Six => 50,
        Priority::Five => 45,
        Priority::Four => 38,
        Priority::Three => 32,
        Priority::Two => 20,
        Priority::One => 8,
    }
}

/// Levels inside the active band: from the most urgent pending level up to
/// the filter's upper bound.
fn active_levels(counts: &PendingCounts, filter: Option<&str>) -> Vec<Priority> {
    let Some(upper) = filter.and_then(filter::priority_upper_bound) else {
        return Vec::new();
    };
    let lower = lowest_pending_level(counts, None).unwrap_or(Priority::One);
    Priority::ALL
        .into_iter()
        .filter(|&level| level >= lower && level <= upper)
        .collect()
}

fn pyramid_line(level: Priority, pending: u64, active: bool) -> String {
    let prefix = if active { " -->" } else { "    " };
    let count = format!("({pending})");
    let padding = " ".repeat(indent(level));
    format!("{prefix}{level}  {padding}{:<45} {count:>5}", level.label())
}

pub fn run(options: &ReportOptions, tracker: &dyn Tracker) -> Result<()> {
    let counts = tracker::pending_counts(tracker);
    let manager = ContextManager::new(tracker);
    let current_filter = manager.active_filter();
    let state = if current_filter.is_some() {
        manager.state()
    } else {
        ContextState::Undefined
    };
    let active = active_levels(&counts, current_filter.as_deref());

    let mut human = HumanOutput::new("Priority Hierarchy Status");
    human.push_line("=".repeat(70));
    human.push_line("");
    for level in Priority::ALL.into_iter().rev() {
        human.push_line(pyramid_line(
            level,
            counts.get(level),
            active.contains(&level),
        ));
    }
    human.push_line("");
    match &current_filter {
        Some(filter) => {
            human.push_line(format!("Active context: {}", manager.name()));
            human.push_line(format!("Filter: {filter}"));
        }
        None => human.push_line("No priority context active"),
    }
    human.push_summary("context", state.as_str());
    human.push_summary("config", options.paths.config.display().to_string());

    match state {
        ContextState::Undefined => human.push_next_step("need auto"),
        ContextState::DefinedInactive => {
            human.push_warning(format!("context '{}' is defined but not selected", manager.name()));
            human.push_next_step(format!("task context {}", manager.name()));
        }
        ContextState::DefinedActive => {}
    }

    let report = Report {
        levels: Priority::ALL
            .into_iter()
            .map(|level| LevelReport {
                level: level.level(),
                label: level.label(),
                pending: counts.get(level),
                active: active.contains(&level),
            })
            .collect(),
        total_pending: counts.total(),
        lowest_pending: lowest_pending_level(&counts, None).map(Priority::level),
        context: state,
        filter: current_filter,
        config: options.paths.config.display().to_string(),
    };

    emit_success(options.output, "report", &report, Some(&human))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_spans_lowest_to_upper_bound() {
        let counts = PendingCounts::new([0, 1, 0, 3, 0, 0]);
        let filter = filter::build(Priority::Two, 2, "2d", "1w");
        assert_eq!(
            active_levels(&counts, Some(&filter)),
            vec![Priority::Two, Priority::Three]
        );
    }

    #[test]
    fn no_filter_no_band() {
        let counts = PendingCounts::new([1, 0, 0, 0, 0, 0]);
        assert!(active_levels(&counts, None).is_empty());
        assert!(active_levels(&counts, Some("due.before:today")).is_empty());
    }

    #[test]
    fn pyramid_line_layout() {
        let line = pyramid_line(Priority::One, 3, true);
        assert!(line.starts_with(" -->1  "));
        assert!(line.ends_with("  (3)"));
        assert!(line.contains("Physiological"));

        let line = pyramid_line(Priority::Six, 0, false);
        assert!(line.starts_with("    6  "));
        assert!(line.ends_with("(0)"));
    }
}
