//! Context filter construction.
//!
//! A filter shows one priority window plus anything due or scheduled near
//! today:
//!
//! ```text
//! ( pri.after:4 ) or ( scheduled.before:today+2d and scheduled.after:today-1w ) or ( due.before:today+2d and due.after:today-1w )
//! ```
//!
//! The priority clause is an upper bound (`pri.after:N` selects levels below
//! N). When the window reaches level 6 there is nothing to exclude and the
//! clause becomes `pri.any:`.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::priority::Priority;

const PRIORITY_BOUND_ATTR: &str = "pri.after:";
const PRIORITY_ANY: &str = "pri.any:";

/// Where a window starts.
///
/// `need N` always starts at level 1 and shows everything up to N. `need auto`
/// and the hooks start at the most urgent level with pending work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStart {
    Manual,
    Lowest(Priority),
}

impl WindowStart {
    pub fn level(self) -> Priority {
        match self {
            WindowStart::Manual => Priority::One,
            WindowStart::Lowest(level) => level,
        }
    }
}

/// Inputs of one filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub min_priority: Priority,
    pub span: u8,
    pub lookahead: String,
    pub lookback: String,
}

impl FilterSpec {
    pub fn new(start: WindowStart, span: u8, settings: &Settings) -> Self {
        Self {
            min_priority: start.level(),
            span,
            lookahead: settings.lookahead.clone(),
            lookback: settings.lookback.clone(),
        }
    }

    /// Highest level inside the window, capped at 6.
    pub fn max_priority(&self) -> Priority {
        let max = u16::from(self.min_priority.level()) + u16::from(self.span.max(1)) - 1;
        u8::try_from(max.min(6))
            .ok()
            .and_then(Priority::from_level)
            .unwrap_or(Priority::Six)
    }

    pub fn build(&self) -> String {
        build(
            self.min_priority,
            self.span,
            &self.lookahead,
            &self.lookback,
        )
    }
}

/// Build the filter expression for a priority window and date window.
///
/// `lookahead`/`lookback` are tracker durations such as `2d` or `1w`.
pub fn build(min_priority: Priority, span: u8, lookahead: &str, lookback: &str) -> String {
    let spec = FilterSpec {
        min_priority,
        span,
        lookahead: lookahead.to_string(),
        lookback: lookback.to_string(),
    };
    let max = spec.max_priority();

    let priority_clause = if max < Priority::Six {
        format!("{PRIORITY_BOUND_ATTR}{}", max.level() + 1)
    } else {
        PRIORITY_ANY.to_string()
    };
    let scheduled_clause = date_window("scheduled", lookahead, lookback);
    let due_clause = date_window("due", lookahead, lookback);

    format!("( {priority_clause} ) or {scheduled_clause} or {due_clause}")
}

fn date_window(attr: &str, lookahead: &str, lookback: &str) -> String {
    format!("( {attr}.before:today+{lookahead} and {attr}.after:today-{lookback} )")
}

/// Highest level an expression from [`build`] admits, if it has a priority
/// clause at all.
pub fn priority_upper_bound(filter: &str) -> Option<Priority> {
    filter.split_whitespace().find_map(|token| {
        if token == PRIORITY_ANY {
            return Some(Priority::Six);
        }
        let bound: u8 = token.strip_prefix(PRIORITY_BOUND_ATTR)?.parse().ok()?;
        Priority::from_level(bound.checked_sub(1)?)
    })
}

/// Duration units Taskwarrior accepts after a count (`2d`, `1mo`, `3wks`).
const DURATION_UNITS: &[&str] = &[
    "s", "sec", "secs", "second", "seconds",
    "min", "mins", "minute", "minutes",
    "h", "hr", "hrs", "hour", "hours",
    "d", "day", "days",
    "w", "wk", "wks", "week", "weeks",
    "m", "mo", "mos", "mth", "mths", "mnths", "month", "months",
    "q", "qtr", "qtrs", "qrtrs", "quarter", "quarters",
    "y", "yr", "yrs", "year", "years",
];

/// Normalize a lookahead/lookback value. A bare number means days; anything
/// else must be a count followed by a Taskwarrior duration unit and is kept
/// as written.
pub fn normalize_offset(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (count, unit) = raw.split_at(split);

    if count.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "Invalid duration '{raw}' (expected e.g. 2d, 1w, 1mo)"
        )));
    }
    if unit.is_empty() {
        return Ok(format!("{count}d"));
    }
    if !DURATION_UNITS.contains(&unit) {
        return Err(Error::InvalidArgument(format!(
            "Invalid duration unit '{unit}' in '{raw}'"
        )));
    }
    Ok(raw.to_string())
}
