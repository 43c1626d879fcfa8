//! Migration from Taskwarrior's built-in `H`/`M`/`L` priorities.
//!
//! Every pending task ends up with a numeric level: numeric tasks are left
//! alone, legacy values go through the mapping, and tasks with no priority
//! get [`Priority::DEFAULT`].

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::priority::{LegacyPriority, Priority, TaskPriority};
use crate::task::Task;
use crate::tracker::Tracker;

/// Legacy value → level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping(HashMap<LegacyPriority, Priority>);

impl Default for Mapping {
    fn default() -> Self {
        let all = [LegacyPriority::High, LegacyPriority::Medium, LegacyPriority::Low];
        Self(all.into_iter().map(|p| (p, p.default_level())).collect())
    }
}

impl Mapping {
    /// Parse `H:1,M:3,L:5`. Values not named keep their default.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut mapping = Mapping::default();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (old, new) = pair.split_once(':').ok_or_else(|| {
                Error::InvalidArgument(format!("Invalid mapping entry '{pair}' (expected X:N)"))
            })?;
            let old: LegacyPriority = old.parse().map_err(|_| {
                Error::InvalidArgument(format!("Unknown legacy priority '{}' in mapping", old.trim()))
            })?;
            let new: Priority = new.parse()?;
            mapping.0.insert(old, new);
        }
        Ok(mapping)
    }

    pub fn get(&self, legacy: LegacyPriority) -> Priority {
        self.0
            .get(&legacy)
            .copied()
            .unwrap_or_else(|| legacy.default_level())
    }
}

impl std::fmt::Display for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let all = [LegacyPriority::High, LegacyPriority::Medium, LegacyPriority::Low];
        let parts: Vec<String> = all
            .into_iter()
            .map(|p| format!("{}:{}", p.as_str(), self.get(p)))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Target level for a task, or `None` if it is already numeric.
///
/// Values that are neither numeric nor H/M/L get [`Priority::DEFAULT`], the
/// same as tasks with no priority at all.
pub fn target_level(priority: Option<&TaskPriority>, mapping: &Mapping) -> Option<Priority> {
    match priority {
        Some(TaskPriority::Level(_)) => None,
        Some(TaskPriority::Legacy(legacy)) => Some(mapping.get(*legacy)),
        Some(TaskPriority::Other(_)) | None => Some(Priority::DEFAULT),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Skipped,
    WouldMigrate,
    Migrated,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskMigration {
    pub uuid: String,
    pub description: String,
    pub from: Option<String>,
    pub to: Option<u8>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationSummary {
    pub total: usize,
    pub migrated: usize,
    pub would_migrate: usize,
    pub skipped: usize,
    pub errors: usize,
    pub tasks: Vec<TaskMigration>,
}

/// Migrate one task.
pub fn migrate_task(
    tracker: &dyn Tracker,
    task: &Task,
    mapping: &Mapping,
    dry_run: bool,
) -> TaskMigration {
    let from = task.priority.as_ref().map(|p| p.as_str().to_string());
    let mut record = TaskMigration {
        uuid: task.uuid.clone().unwrap_or_default(),
        description: task.description.clone(),
        from,
        to: None,
        outcome: Outcome::Skipped,
        error: None,
    };

    let Some(target) = target_level(task.priority.as_ref(), mapping) else {
        return record;
    };
    record.to = Some(target.level());

    if dry_run {
        record.outcome = Outcome::WouldMigrate;
        return record;
    }

    let Some(uuid) = task.uuid.as_deref() else {
        record.outcome = Outcome::Failed;
        record.error = Some("task has no uuid".to_string());
        return record;
    };

    match tracker.modify_priority(uuid, target) {
        Ok(()) => record.outcome = Outcome::Migrated,
        Err(err) => {
            tracing::warn!(uuid, %err, "migration failed");
            record.outcome = Outcome::Failed;
            record.error = Some(err.to_string());
        }
    }
    record
}

/// Migrate every pending task.
pub fn migrate_all(tracker: &dyn Tracker, mapping: &Mapping, dry_run: bool) -> Result<MigrationSummary> {
    let tasks = tracker.export_pending()?;
    let mut summary = MigrationSummary {
        total: tasks.len(),
        ..MigrationSummary::default()
    };

    for task in &tasks {
        let record = migrate_task(tracker, task, mapping, dry_run);
        match record.outcome {
            Outcome::Skipped => summary.skipped += 1,
            Outcome::WouldMigrate => summary.would_migrate += 1,
            Outcome::Migrated => summary.migrated += 1,
            Outcome::Failed => summary.errors += 1,
        }
        summary.tasks.push(record);
    }

    Ok(summary)
}
