//! Debug reports: a before/after view of the state tree per action.

use serde_json::Value;
use std::fmt;

use crate::state_tree::{SliceChange, StateTree};

/// Log target used for debug reports
pub const DEBUG_TARGET: &str = "flux::debug";

/// What one dispatched action did to the state tree
#[derive(Debug, Clone)]
pub struct DebugReport {
    pub action_type: String,
    /// The full action, `type` included
    pub action: Value,
    pub before: StateTree,
    pub after: StateTree,
    pub changes: Vec<SliceChange>,
}

impl DebugReport {
    pub fn new(action_type: &str, action: Value, before: StateTree, after: StateTree) -> Self {
        let changes = before.diff(&after);
        Self {
            action_type: action_type.to_string(),
            action,
            before,
            after,
            changes,
        }
    }

    pub fn has_changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.has_changed() {
            "Changed State"
        } else {
            "Unchanged State"
        };

        writeln!(f, "FLUX ACTION: {}", self.action_type)?;
        writeln!(f, "  Action: {}", self.action)?;
        writeln!(f, "  Last State: {}", self.before.to_value())?;
        write!(f, "  {}: {}", label, self.after.to_value())?;
        for change in &self.changes {
            write!(f, "\n    {}", change)?;
        }
        Ok(())
    }
}

/// Receives debug reports while debug mode is on
pub trait DebugSink: Send {
    fn report(&mut self, report: &DebugReport);
}

/// Writes reports to the `log` facade under [`DEBUG_TARGET`]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn report(&mut self, report: &DebugReport) {
        log::info!(target: DEBUG_TARGET, "{}", report);
    }
}

impl<F> DebugSink for F
where
    F: FnMut(&DebugReport) + Send,
{
    fn report(&mut self, report: &DebugReport) {
        self(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_report() {
        let before = StateTree::new().with_slice("cart", json!([]));
        let after = before.with_slice("cart", json!(["apple"]));
        let report = DebugReport::new(
            "ADD_ITEM",
            json!({"type": "ADD_ITEM", "item": "apple"}),
            before,
            after,
        );

        assert!(report.has_changed());
        let text = report.to_string();
        assert!(text.starts_with("FLUX ACTION: ADD_ITEM"));
        assert!(text.contains("Changed State: {\"cart\":[\"apple\"]}"));
        assert!(text.contains("~ cart"));
    }

    #[test]
    fn test_unchanged_report() {
        let state = StateTree::new().with_slice("cart", json!([]));
        let report = DebugReport::new("NOOP", json!({"type": "NOOP"}), state.clone(), state);

        assert!(!report.has_changed());
        assert!(report.to_string().contains("Unchanged State"));
    }
}
