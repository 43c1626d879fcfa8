//! Auto-assignment rules.
//!
//! Rules live in the config file as `priority.<level>.auto=<pred>,<pred>,...`.
//! Supported predicates:
//!
//! - `+tag`          task carries the tag
//! - `proj:name`     project equals `name`
//! - `proj.has:text` project contains `text`
//! - `desc.has:text` description contains `text`, ignoring case
//!
//! Anything else parses to [`Predicate::Unrecognized`] and never matches.

use std::collections::BTreeMap;

use crate::config::ConfigStore;
use crate::priority::Priority;
use crate::task::Task;

const RULE_KEY_PREFIX: &str = "priority.";
const RULE_KEY_SUFFIX: &str = ".auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Tag(String),
    ProjectEquals(String),
    ProjectContains(String),
    DescriptionContains(String),
    Unrecognized(String),
}

impl Predicate {
    /// Parse one predicate. Never fails; unknown syntax fails closed.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(tag) = raw.strip_prefix('+') {
            Predicate::Tag(tag.to_string())
        } else if let Some(text) = raw.strip_prefix("proj.has:") {
            Predicate::ProjectContains(text.to_string())
        } else if let Some(name) = raw.strip_prefix("proj:") {
            Predicate::ProjectEquals(name.to_string())
        } else if let Some(text) = raw.strip_prefix("desc.has:") {
            Predicate::DescriptionContains(text.to_lowercase())
        } else {
            Predicate::Unrecognized(raw.to_string())
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Predicate::Tag(tag) => task.has_tag(tag),
            Predicate::ProjectEquals(name) => task.project.as_deref() == Some(name.as_str()),
            Predicate::ProjectContains(text) => task
                .project
                .as_deref()
                .is_some_and(|project| project.contains(text.as_str())),
            Predicate::DescriptionContains(text) => {
                task.description.to_lowercase().contains(text.as_str())
            }
            Predicate::Unrecognized(_) => false,
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Tag(tag) => write!(f, "+{tag}"),
            Predicate::ProjectEquals(name) => write!(f, "proj:{name}"),
            Predicate::ProjectContains(text) => write!(f, "proj.has:{text}"),
            Predicate::DescriptionContains(text) => write!(f, "desc.has:{text}"),
            Predicate::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Predicates keyed by the level they assign.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<Priority, Vec<Predicate>>,
}

/// A successful rule match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub level: Priority,
    pub predicate: &'a Predicate,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `priority.<level>.auto` line from the store.
    ///
    /// A later line for the same level replaces an earlier one, so a rule
    /// appended to the file takes effect.
    pub fn from_store(store: &ConfigStore) -> Self {
        let mut set = RuleSet::new();
        for (key, value) in store.entries() {
            if let Some(level) = rule_level(key) {
                set.insert(level, parse_predicate_list(value));
            }
        }
        set
    }

    pub fn insert(&mut self, level: Priority, predicates: Vec<Predicate>) {
        self.rules.insert(level, predicates);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn predicates(&self, level: Priority) -> &[Predicate] {
        self.rules.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First matching rule, scanning levels ascending then predicates in
    /// declared order.
    pub fn first_match(&self, task: &Task) -> Option<RuleMatch<'_>> {
        self.rules.iter().find_map(|(&level, predicates)| {
            predicates
                .iter()
                .find(|predicate| predicate.matches(task))
                .map(|predicate| RuleMatch { level, predicate })
        })
    }

    pub fn determine_priority(&self, task: &Task) -> Option<Priority> {
        self.first_match(task).map(|m| m.level)
    }
}

/// Level of a `priority.<1-6>.auto` key. The level is exactly one digit.
fn rule_level(key: &str) -> Option<Priority> {
    let level = key
        .strip_prefix(RULE_KEY_PREFIX)?
        .strip_suffix(RULE_KEY_SUFFIX)?;
    match level.as_bytes() {
        [digit @ b'1'..=b'6'] => Priority::from_level(digit - b'0'),
        _ => None,
    }
}

/// Split a comma-separated predicate list, dropping empty entries.
pub fn parse_predicate_list(raw: &str) -> Vec<Predicate> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(Predicate::parse)
        .collect()
}
