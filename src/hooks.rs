//! Taskwarrior hook entry points.
//!
//! - on-add: reads one task JSON line, fills in `priority` if missing, writes
//!   exactly one task JSON line back. If anything goes wrong before the
//!   record is written, the input line is echoed untouched so the add is
//!   never blocked.
//! - on-exit: reads (and ignores) the session's tasks, emits nothing.
//!
//! Both then recompute `context.need.read` in `need.rc`. on-add counts the
//! task it is adding, which Taskwarrior has not committed yet. on-exit runs
//! after the session is committed and does not adjust counts at all.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::Context as _;

use crate::config::{keys, ConfigStore, Settings};
use crate::error::{exit_codes, Result};
use crate::filter::{FilterSpec, WindowStart};
use crate::priority::{Priority, TaskPriority};
use crate::rules::RuleSet;
use crate::task::Task;
use crate::tracker::{self, Tracker};

/// How an added task got its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// The user already set one.
    Kept(TaskPriority),
    /// An auto-assignment rule matched.
    Rule { level: Priority, predicate: String },
    /// Nothing matched; [`Priority::DEFAULT`] was used.
    Default,
}

/// Fill in a missing priority from the rules.
pub fn assign_priority(task: &mut Task, rules: &RuleSet) -> Assignment {
    if let Some(existing) = &task.priority {
        return Assignment::Kept(existing.clone());
    }

    let assignment = match rules.first_match(task) {
        Some(hit) => Assignment::Rule {
            level: hit.level,
            predicate: hit.predicate.to_string(),
        },
        None => Assignment::Default,
    };

    let level = match &assignment {
        Assignment::Rule { level, .. } => *level,
        _ => Priority::DEFAULT,
    };
    task.priority = Some(TaskPriority::Level(level));
    assignment
}

/// Recompute the context filter and store it as `context.need.read`.
///
/// `simulated_addition` counts one not-yet-committed task at that level.
/// With no pending work anywhere the stored filter is cleared. Returns the
/// filter written.
pub fn refresh_context_filter(
    store: &ConfigStore,
    tracker: &dyn Tracker,
    simulated_addition: Option<Priority>,
) -> Result<String> {
    let filter = match tracker::lowest_pending(tracker, simulated_addition) {
        None => {
            tracing::info!("No pending tasks, clearing context filter");
            String::new()
        }
        Some(lowest) => {
            let settings = Settings::from_store(store);
            let filter =
                FilterSpec::new(WindowStart::Lowest(lowest), settings.span, &settings).build();
            tracing::info!(lowest = lowest.level(), %filter, "Lowest priority");
            filter
        }
    };

    ConfigStore::set_locked(store.path(), keys::CONTEXT_READ, &filter)?;
    tracing::info!("Updated {}={filter}", keys::CONTEXT_READ);
    Ok(filter)
}

struct Added {
    line: String,
    level: Option<Priority>,
}

fn process_add(input: &str, store: &ConfigStore) -> anyhow::Result<Added> {
    let mut task = Task::from_json_line(input).context("parsing task JSON from stdin")?;
    tracing::info!("Processing task: {}", task.description);

    let rules = RuleSet::from_store(store);
    match assign_priority(&mut task, &rules) {
        Assignment::Kept(existing) => tracing::info!("Priority already set to {existing}"),
        Assignment::Rule { level, predicate } => {
            tracing::info!("Matched '{predicate}' -> pri:{level}");
            tracing::info!("Auto-assigned priority: {level}");
        }
        Assignment::Default => {
            tracing::info!("No rule matched, using default pri:{}", Priority::DEFAULT);
        }
    }

    let line = task.to_json_line().context("serializing task")?;
    Ok(Added {
        line,
        level: task.priority.as_ref().and_then(TaskPriority::level),
    })
}

/// Run the on-add hook for one input line. Returns the process exit code.
pub fn run_on_add(input: &str, config_path: &Path, tracker: &dyn Tracker, out: &mut dyn Write) -> i32 {
    let input = input.trim_end_matches(['\r', '\n']);

    let store = load_store(config_path);
    let processed = panic::catch_unwind(AssertUnwindSafe(|| process_add(input, &store)));
    let added = match processed {
        Ok(Ok(added)) => added,
        Ok(Err(err)) => {
            tracing::error!("FATAL ERROR: {err:?}");
            return echo_original(input, out);
        }
        Err(_) => {
            tracing::error!("FATAL ERROR: panic while assigning priority");
            return echo_original(input, out);
        }
    };

    if let Err(err) = writeln!(out, "{}", added.line).and_then(|()| out.flush()) {
        tracing::error!("failed to write task: {err}");
        return exit_codes::FAILURE;
    }

    // The record is out; nothing below may change the exit status.
    let refreshed = panic::catch_unwind(AssertUnwindSafe(|| {
        refresh_context_filter(&store, tracker, added.level)
    }));
    match refreshed {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => tracing::error!("Error updating context: {err}"),
        Err(_) => tracing::error!("Error updating context: panic"),
    }

    exit_codes::SUCCESS
}

/// Run the on-exit hook. Returns the process exit code.
pub fn run_on_exit(input: &str, config_path: &Path, tracker: &dyn Tracker) -> i32 {
    tracing::info!("=== ON-EXIT TRIGGERED ===");
    tracing::info!(
        bytes = input.len(),
        tasks = input.lines().filter(|l| !l.trim().is_empty()).count(),
        "Input received"
    );

    let refreshed = panic::catch_unwind(AssertUnwindSafe(|| {
        let store = ConfigStore::load(config_path)?;
        refresh_context_filter(&store, tracker, None)
    }));
    match refreshed {
        Ok(Ok(_)) => exit_codes::SUCCESS,
        Ok(Err(err)) => {
            tracing::error!("Error updating context: {err}");
            exit_codes::FAILURE
        }
        Err(_) => {
            tracing::error!("FATAL ERROR: panic while updating context");
            exit_codes::FAILURE
        }
    }
}

fn load_store(config_path: &Path) -> ConfigStore {
    ConfigStore::load(config_path).unwrap_or_else(|err| {
        tracing::error!("ERROR parsing config: {err}");
        ConfigStore::from_content(config_path, "")
    })
}

/// Pass the task through untouched. Exits 0: a non-zero on-add status makes
/// Taskwarrior reject the add.
fn echo_original(input: &str, out: &mut dyn Write) -> i32 {
    match writeln!(out, "{input}").and_then(|()| out.flush()) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            tracing::error!("failed to echo task: {err}");
            exit_codes::FAILURE
        }
    }
}

/// Route panic messages and backtraces into the hook log.
pub fn install_panic_logger() {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!("{info}\n{backtrace}");
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse_predicate_list;
    use crate::tracker::fake::FakeTracker;
    use serde_json::Value;
    use std::fs;

    fn rc(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("need.rc");
        fs::write(&path, content).unwrap();
        path
    }

    fn run_add(input: &str, config: &Path, tracker: &FakeTracker) -> (i32, String) {
        let mut out = Vec::new();
        let code = run_on_add(input, config, tracker, &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn assign_keeps_existing() {
        let mut task = Task::from_json_line(r#"{"description":"x","priority":"H"}"#).unwrap();
        let assignment = assign_priority(&mut task, &RuleSet::new());
        assert!(matches!(assignment, Assignment::Kept(_)));
        assert_eq!(task.priority.as_ref().map(TaskPriority::as_str), Some("H"));
    }

    #[test]
    fn assign_from_rule_or_default() {
        let mut rules = RuleSet::new();
        rules.insert(Priority::Two, parse_predicate_list("+bills"));

        let mut task = Task::from_json_line(r#"{"description":"rent","tags":["bills"]}"#).unwrap();
        assert_eq!(
            assign_priority(&mut task, &rules),
            Assignment::Rule {
                level: Priority::Two,
                predicate: "+bills".to_string()
            }
        );
        assert_eq!(task.priority, Some(TaskPriority::Level(Priority::Two)));

        let mut task = Task::from_json_line(r#"{"description":"read a book"}"#).unwrap();
        assert_eq!(assign_priority(&mut task, &rules), Assignment::Default);
        assert_eq!(task.priority, Some(TaskPriority::Level(Priority::Four)));
    }

    #[test]
    fn on_add_defaults_to_four_and_updates_context() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(&dir, "priority.span=2\n");
        let tracker = FakeTracker::default();

        let (code, out) = run_add(r#"{"uuid":"abc","description":"read a book","entry":"20240101T000000Z"}"#, &config, &tracker);
        assert_eq!(code, 0);
        assert_eq!(out.lines().count(), 1);
        let value: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["priority"], "4");
        assert_eq!(value["entry"], "20240101T000000Z");

        let written = fs::read_to_string(&config).unwrap();
        assert!(written.contains("context.need.read=( pri.after:6 ) or"), "{written}");
    }

    #[test]
    fn on_add_rule_match_simulates_addition() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(
            &dir,
            "priority.1.auto=+urgent\npriority.3.auto=proj:work\npriority.span=1\n",
        );
        let tracker = FakeTracker::with_counts([0, 0, 5, 0, 0, 0]);

        let (code, out) = run_add(
            r#"{"description":"fix prod","project":"work","tags":["urgent"]}"#,
            &config,
            &tracker,
        );
        assert_eq!(code, 0);
        let value: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["priority"], "1");

        let store = ConfigStore::load(&config).unwrap();
        assert!(store
            .get(keys::CONTEXT_READ)
            .unwrap()
            .starts_with("( pri.after:2 )"));
    }

    #[test]
    fn on_add_echoes_input_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(&dir, "");
        let tracker = FakeTracker::default();

        let (code, out) = run_add("{not json\n", &config, &tracker);
        assert_eq!(code, 0);
        assert_eq!(out, "{not json\n");
        assert_eq!(fs::read_to_string(&config).unwrap(), "");
    }

    #[test]
    fn on_add_keeps_unknown_priority() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(&dir, "priority.1.auto=+urgent\n");
        let tracker = FakeTracker::default();

        let (code, out) = run_add(
            r#"{"description":"x","tags":["urgent"],"priority":"someday"}"#,
            &config,
            &tracker,
        );
        assert_eq!(code, 0);
        let value: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["priority"], "someday");
        let store = ConfigStore::load(&config).unwrap();
        assert_eq!(store.get(keys::CONTEXT_READ), Some(""));
    }

    #[test]
    fn on_add_emits_even_when_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("missing.rc");
        let tracker = FakeTracker::default();

        let (code, out) = run_add(r#"{"description":"x"}"#, &config, &tracker);
        assert_eq!(code, 0);
        let value: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["priority"], "4");
        assert!(!config.exists());
    }

    #[test]
    fn on_add_legacy_priority_is_not_simulated() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(&dir, "");
        let tracker = FakeTracker::default();

        let (code, out) = run_add(r#"{"description":"x","priority":"M"}"#, &config, &tracker);
        assert_eq!(code, 0);
        assert!(out.contains(r#""priority":"M""#));
        let store = ConfigStore::load(&config).unwrap();
        assert_eq!(store.get(keys::CONTEXT_READ), Some(""));
    }

    #[test]
    fn on_exit_does_not_simulate() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(&dir, "context.need.read=stale\n");
        let tracker = FakeTracker::with_counts([0, 0, 0, 0, 2, 0]);

        assert_eq!(run_on_exit("{}\n{}\n", &config, &tracker), 0);
        let store = ConfigStore::load(&config).unwrap();
        assert_eq!(
            store.get(keys::CONTEXT_READ),
            Some("( pri.any: ) or ( scheduled.before:today+2d and scheduled.after:today-1w ) or ( due.before:today+2d and due.after:today-1w )")
        );
    }

    #[test]
    fn on_exit_clears_filter_without_pending_work() {
        let dir = tempfile::tempdir().unwrap();
        let config = rc(&dir, "context.need.read=stale\n");
        let tracker = FakeTracker::default();

        assert_eq!(run_on_exit("", &config, &tracker), 0);
        assert_eq!(fs::read_to_string(&config).unwrap(), "context.need.read=\n");
    }

    #[test]
    fn on_exit_fails_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = FakeTracker::default();
        assert_eq!(run_on_exit("", &dir.path().join("none.rc"), &tracker), 1);
    }
}
