//! State change history tracking.
//!
//! Every machine keeps a bounded log of the state changes it went through,
//! including resets back to the initial state. The log is meant for
//! diagnostics and snapshots, not for driving behavior.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What caused a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// An event accepted by an event-driven transition.
    Event,
    /// An expired timeout transition.
    Timeout,
    /// Completion of a nested machine.
    SubFsm,
    /// A cancellation raised by an action, a hook or a nested machine.
    Cancellation,
    /// An explicit or automatic reset.
    Reset,
}

/// Record of a single state change.
///
/// # Example
///
/// ```rust
/// use gesture_fsm::core::{StateChange, Trigger};
/// use chrono::Utc;
///
/// let change = StateChange {
///     from: "init".to_string(),
///     to: "pressed".to_string(),
///     trigger: Trigger::Event,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(change.to, "pressed");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// Name of the state being left
    pub from: String,
    /// Name of the state being entered
    pub to: String,
    /// What caused the change
    pub trigger: Trigger,
    /// When the change occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of state changes.
///
/// Once `limit` changes are stored, recording a new one drops the oldest.
/// A limit of zero disables recording.
///
/// # Example
///
/// ```rust
/// use gesture_fsm::core::{StateChange, StateHistory, Trigger};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_limit(8);
/// history.record(StateChange {
///     from: "init".to_string(),
///     to: "pressed".to_string(),
///     trigger: Trigger::Event,
///     timestamp: Utc::now(),
/// });
/// history.record(StateChange {
///     from: "pressed".to_string(),
///     to: "clicked".to_string(),
///     trigger: Trigger::Event,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec!["init", "pressed", "clicked"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    limit: usize,
    changes: VecDeque<StateChange>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_limit(64)
    }
}

impl StateHistory {
    /// Create an empty history keeping at most `limit` changes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            changes: VecDeque::with_capacity(limit.min(64)),
        }
    }

    /// Record a change, evicting the oldest one when full.
    pub fn record(&mut self, change: StateChange) {
        if self.limit == 0 {
            return;
        }
        while self.changes.len() >= self.limit {
            self.changes.pop_front();
        }
        self.changes.push_back(change);
    }

    /// Names of the states traversed: the source of the oldest recorded
    /// change, then the target of each change.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.changes.len() + 1);
        if let Some(first) = self.changes.front() {
            path.push(first.from.as_str());
        }
        for change in &self.changes {
            path.push(change.to.as_str());
        }
        path
    }

    /// Time elapsed between the oldest and the newest recorded change.
    ///
    /// Returns `None` if nothing was recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.changes.front(), self.changes.back()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// The most recent change, if any.
    pub fn last(&self) -> Option<&StateChange> {
        self.changes.back()
    }

    /// All recorded changes, oldest first.
    pub fn changes(&self) -> impl Iterator<Item = &StateChange> {
        self.changes.iter()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}
