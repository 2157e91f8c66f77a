//! Read-only snapshots of running machines.
//!
//! A snapshot captures where a machine is, whether it started, how it ended
//! and which nested machine it currently forwards events to, together with
//! its recent state history. Snapshots are meant for diagnostics and
//! logging. They do not include transition actions or guards, so a machine
//! cannot be restored from one.

use crate::core::{Outcome, StateHistory, StateKind};
use crate::engine::Fsm;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable view of a machine at one point in time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FsmSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Identifier of the captured machine
    pub id: Uuid,

    /// Name of the captured machine
    pub name: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    pub current_state: String,
    pub current_kind: StateKind,
    pub starting_state: String,
    pub started: bool,
    pub outcome: Option<Outcome>,

    /// Whether a timeout is armed or expired but not applied
    pub timeout_pending: bool,

    /// The nested machine events are currently forwarded to
    pub active_nested: Option<Box<FsmSnapshot>>,

    /// Recent state changes of this machine
    pub history: StateHistory,
}

impl FsmSnapshot {
    /// Capture the current situation of a machine and of its active
    /// nested machines.
    pub fn capture<E>(fsm: &Fsm<E>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: fsm.id(),
            name: fsm.name().to_string(),
            taken_at: Utc::now(),
            current_state: fsm.current_state_name().to_string(),
            current_kind: fsm.current_state_kind(),
            starting_state: fsm
                .state_name(fsm.starting_state())
                .unwrap_or_default()
                .to_string(),
            started: fsm.is_started(),
            outcome: fsm.outcome(),
            timeout_pending: fsm.has_pending_timeout(),
            active_nested: fsm.active_nested().map(|nested| Box::new(Self::capture(nested))),
            history: fsm.history().clone(),
        }
    }

    /// Machine names from this one down to the innermost active nested
    /// machine.
    pub fn active_path(&self) -> Vec<&str> {
        let mut path = vec![self.name.as_str()];
        let mut snapshot = self;
        while let Some(nested) = snapshot.active_nested.as_deref() {
            path.push(nested.name.as_str());
            snapshot = nested;
        }
        path
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Parse a snapshot, rejecting formats newer than this library.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

impl<E> Fsm<E> {
    /// Take a [`FsmSnapshot`] of this machine.
    pub fn snapshot(&self) -> FsmSnapshot {
        FsmSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{FsmBuilder, TransitionBuilder};
    use crate::core::INIT_STATE;

    fn tap() -> Fsm<char> {
        FsmBuilder::new("tap")
            .state("touched")
            .terminal("tapped")
            .transition(TransitionBuilder::new().from(INIT_STATE).to("touched").on("down", |e: &char| *e == 'd'))
            .unwrap()
            .transition(TransitionBuilder::new().from("touched").to("tapped").on("up", |e: &char| *e == 'u'))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn snapshot_reflects_machine() {
        let mut fsm = tap();
        fsm.process(&'d');

        let snapshot = fsm.snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.id, fsm.id());
        assert_eq!(snapshot.current_state, "touched");
        assert_eq!(snapshot.current_kind, StateKind::Standard);
        assert_eq!(snapshot.starting_state, INIT_STATE);
        assert!(snapshot.started);
        assert!(snapshot.outcome.is_none());
        assert!(snapshot.active_nested.is_none());
        assert_eq!(snapshot.history.get_path(), vec![INIT_STATE, "touched"]);
    }

    #[test]
    fn snapshot_survives_json() {
        let mut fsm = tap();
        fsm.process(&'d');
        fsm.process(&'u');

        let json = fsm.snapshot().to_json().unwrap();
        let restored = FsmSnapshot::from_json(&json).unwrap();

        assert_eq!(restored.current_state, "tapped");
        assert_eq!(restored.outcome, Some(Outcome::Completed));
        assert_eq!(restored.history.len(), 2);
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut snapshot = tap().snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;
        let json = snapshot.to_json_pretty().unwrap();

        let result = FsmSnapshot::from_json(&json);
        assert!(matches!(
            result,
            Err(SnapshotError::UnsupportedVersion { found, .. }) if found == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let result = FsmSnapshot::from_json("{ not json");
        assert!(matches!(result, Err(SnapshotError::DeserializationFailed(_))));
    }

    #[test]
    fn active_path_of_idle_machine_is_its_name() {
        assert_eq!(tap().snapshot().active_path(), vec!["tap"]);
    }
}
