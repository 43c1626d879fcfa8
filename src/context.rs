//! The `need` saved view (Taskwarrior context).
//!
//! This module defines and deletes the view and reports on it. It never
//! switches the user's active context; that is left to `task context need`.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::tracker::Tracker;

/// Name of the saved view managed here
pub const CONTEXT_NAME: &str = "need";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextState {
    Undefined,
    DefinedInactive,
    DefinedActive,
}

impl ContextState {
    pub fn as_str(self) -> &'static str {
        match self {
            ContextState::Undefined => "undefined",
            ContextState::DefinedInactive => "defined (inactive)",
            ContextState::DefinedActive => "defined (active)",
        }
    }
}

pub struct ContextManager<'a> {
    tracker: &'a dyn Tracker,
    name: &'a str,
}

impl<'a> ContextManager<'a> {
    pub fn new(tracker: &'a dyn Tracker) -> Self {
        Self {
            tracker,
            name: CONTEXT_NAME,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Create or overwrite the view's filter.
    pub fn define(&self, filter: &str) -> Result<()> {
        self.tracker
            .define_context(self.name, filter)
            .map_err(|err| Error::ContextDefinition(err.to_string()))?;
        tracing::info!(context = self.name, filter, "context defined");
        Ok(())
    }

    /// Remove the view. Removing a view that does not exist succeeds; a
    /// tracker that cannot be run at all is still an error.
    pub fn delete(&self) -> Result<()> {
        match self.tracker.delete_context(self.name) {
            Ok(()) => Ok(()),
            // `task` ran and exited non-zero: nothing to delete.
            Err(Error::TrackerFailed(msg)) => {
                tracing::debug!(context = self.name, %msg, "context delete failed; treating as absent");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// The view's filter as the tracker resolves it, if set.
    ///
    /// Reads resolved configuration (`rc.context.<name>`), so a view defined
    /// through an included rc file is seen as well.
    pub fn active_filter(&self) -> Option<String> {
        self.tracker
            .get(&format!("rc.context.{}", self.name))
            .unwrap_or_else(|err| {
                tracing::debug!(%err, "context filter lookup failed");
                None
            })
    }

    /// Where the view sits in the undefined → inactive → active machine.
    pub fn state(&self) -> ContextState {
        if self.active_filter().is_none() {
            return ContextState::Undefined;
        }

        let selected = self.tracker.get("rc.context").unwrap_or_else(|err| {
            tracing::debug!(%err, "active context lookup failed");
            None
        });
        if selected.as_deref() == Some(self.name) {
            ContextState::DefinedActive
        } else {
            ContextState::DefinedInactive
        }
    }

    /// Follow-up commands printed after defining or deleting the view.
    pub fn activation_hints(&self) -> Vec<String> {
        vec![
            format!("To activate: task context {}", self.name),
            "To deactivate: task context none".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::fake::FakeTracker;

    #[test]
    fn define_records_filter() {
        let tracker = FakeTracker::default();
        let manager = ContextManager::new(&tracker);
        manager.define("( pri.any: )").expect("define");
        assert_eq!(
            *tracker.defined.borrow(),
            vec![("need".to_string(), "( pri.any: )".to_string())]
        );
    }

    #[test]
    fn define_failure_is_reported() {
        let tracker = FakeTracker {
            fail_define: true,
            ..FakeTracker::default()
        };
        let err = ContextManager::new(&tracker).define("x").unwrap_err();
        assert!(matches!(err, Error::ContextDefinition(_)));
    }

    #[test]
    fn delete_of_missing_context_succeeds() {
        let tracker = FakeTracker::default();
        ContextManager::new(&tracker).delete().expect("delete");
        assert_eq!(*tracker.deleted.borrow(), vec!["need".to_string()]);
    }

    #[test]
    fn delete_without_tracker_fails() {
        let tracker = FakeTracker {
            unavailable: true,
            ..FakeTracker::default()
        };
        let err = ContextManager::new(&tracker).delete().unwrap_err();
        assert!(matches!(err, Error::TrackerUnavailable(_)));
    }

    #[test]
    fn state_transitions() {
        let mut tracker = FakeTracker::default();
        assert_eq!(ContextManager::new(&tracker).state(), ContextState::Undefined);
        assert_eq!(ContextManager::new(&tracker).active_filter(), None);

        tracker
            .values
            .insert("rc.context.need".to_string(), "( pri.after:3 )".to_string());
        assert_eq!(
            ContextManager::new(&tracker).state(),
            ContextState::DefinedInactive
        );

        tracker
            .values
            .insert("rc.context".to_string(), "need".to_string());
        let manager = ContextManager::new(&tracker);
        assert_eq!(manager.state(), ContextState::DefinedActive);
        assert_eq!(manager.active_filter().as_deref(), Some("( pri.after:3 )"));
    }
}
