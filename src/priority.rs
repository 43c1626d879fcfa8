//! Priority levels and the pending-work resolver.
//!
//! Levels run 1 (most urgent) to 6 (least). Older task lists may still carry
//! Taskwarrior's built-in `H`/`M`/`L` values; those are modeled explicitly as
//! [`LegacyPriority`] so migration is a total mapping over a closed set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A need level, 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
}

impl Priority {
    /// All levels in ascending (most urgent first) order.
    pub const ALL: [Priority; 6] = [
        Priority::One,
        Priority::Two,
        Priority::Three,
        Priority::Four,
        Priority::Five,
        Priority::Six,
    ];

    /// Level assigned to new tasks when no rule matches.
    pub const DEFAULT: Priority = Priority::Four;

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Priority::One),
            2 => Some(Priority::Two),
            3 => Some(Priority::Three),
            4 => Some(Priority::Four),
            5 => Some(Priority::Five),
            6 => Some(Priority::Six),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::One => "1",
            Priority::Two => "2",
            Priority::Three => "3",
            Priority::Four => "4",
            Priority::Five => "5",
            Priority::Six => "6",
        }
    }

    /// Human label used by the pyramid report.
    pub fn label(self) -> &'static str {
        match self {
            Priority::One => "Physiological; Air, Water, Food & Shelter",
            Priority::Two => "Personal safety, security, health, financial",
            Priority::Three => "Love & Belonging, Friends & Family",
            Priority::Four => "Esteem, Respect & Recognition",
            Priority::Five => "Self Actualization",
            Priority::Six => "Higher Goals",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Priority::from_level)
            .ok_or_else(|| Error::InvalidPriority(trimmed.to_string()))
    }
}

/// Taskwarrior's built-in priority values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyPriority {
    High,
    Medium,
    Low,
}

impl LegacyPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            LegacyPriority::High => "H",
            LegacyPriority::Medium => "M",
            LegacyPriority::Low => "L",
        }
    }

    /// Default migration target for this legacy value.
    pub fn default_level(self) -> Priority {
        match self {
            LegacyPriority::High => Priority::Two,
            LegacyPriority::Medium => Priority::Four,
            LegacyPriority::Low => Priority::Five,
        }
    }
}

impl FromStr for LegacyPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" => Ok(LegacyPriority::High),
            "M" => Ok(LegacyPriority::Medium),
            "L" => Ok(LegacyPriority::Low),
            other => Err(Error::InvalidPriority(other.to_string())),
        }
    }
}

/// The value of a task's `priority` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    Level(Priority),
    Legacy(LegacyPriority),
    /// Anything else a task list may carry (a UDA value, a typo), kept
    /// verbatim so the record round-trips.
    Other(String),
}

impl TaskPriority {
    /// Classify a raw attribute value. Never fails.
    pub fn from_raw(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| TaskPriority::Other(raw.trim().to_string()))
    }

    /// The numeric level, if this is one.
    pub fn level(&self) -> Option<Priority> {
        match self {
            TaskPriority::Level(level) => Some(*level),
            TaskPriority::Legacy(_) | TaskPriority::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskPriority::Level(level) => level.as_str(),
            TaskPriority::Legacy(legacy) => legacy.as_str(),
            TaskPriority::Other(raw) => raw,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(level) = s.parse::<Priority>() {
            return Ok(TaskPriority::Level(level));
        }
        s.parse::<LegacyPriority>()
            .map(TaskPriority::Legacy)
            .map_err(|_| Error::InvalidPriority(s.trim().to_string()))
    }
}

impl Serialize for TaskPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(TaskPriority::from_raw(&raw))
    }
}

/// Pending task count per level, index 0 = level 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingCounts([u64; 6]);

impl PendingCounts {
    pub fn new(counts: [u64; 6]) -> Self {
        Self(counts)
    }

    pub fn get(&self, level: Priority) -> u64 {
        self.0[usize::from(level.level() - 1)]
    }

    pub fn set(&mut self, level: Priority, count: u64) {
        self.0[usize::from(level.level() - 1)] = count;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Find the most urgent level with pending work.
///
/// `simulated_addition` counts one extra task at that level, for a task the
/// tracker is about to add but has not committed yet. Returns `None` when no
/// level has pending work.
pub fn lowest_pending_level(
    counts: &PendingCounts,
    simulated_addition: Option<Priority>,
) -> Option<Priority> {
    Priority::ALL.into_iter().find(|&level| {
        let mut count = counts.get(level);
        if simulated_addition == Some(level) {
            count += 1;
        }
        count > 0
    })
}
