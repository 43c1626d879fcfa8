//! Taskwarrior task records as exchanged over hook stdin/stdout and `export`.
//!
//! Only the attributes this crate reads are typed; everything else is kept in
//! `extra` so a record written back to the tracker is otherwise unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::priority::TaskPriority;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_priority"
    )]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Parse one task from a single JSON line.
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Serialize as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Short form of the uuid for display.
    pub fn short_id(&self) -> &str {
        match self.uuid.as_deref() {
            Some(uuid) => uuid.get(..8).unwrap_or(uuid),
            None => "(no uuid)",
        }
    }
}

/// Treat an empty `priority` string the same as an absent one.
fn deserialize_priority<'de, D>(deserializer: D) -> std::result::Result<Option<TaskPriority>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(TaskPriority::from_raw(value))),
    }
}

/// Parse the output of `task export`, a JSON array of tasks.
pub fn parse_export(raw: &str) -> Result<Vec<Task>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}
