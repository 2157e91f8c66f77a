//! State identity and behavioral variants.
//!
//! A state is a named node of one machine. The engine stores states in a
//! table and refers to them by [`StateId`], an index into that table, so a
//! state never holds a strong reference back to its machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the initial state every machine is created with.
pub const INIT_STATE: &str = "init";

/// Index of a state in its owning machine's state table.
///
/// Identifiers are only meaningful for the machine that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// The initial state. Always the first entry of the table.
    pub const INIT: StateId = StateId(0);

    /// Position of the state in the machine's table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavioral variant of a state.
///
/// # Example
///
/// ```rust
/// use gesture_fsm::core::StateKind;
///
/// assert!(StateKind::Initial.can_exit());
/// assert!(!StateKind::Initial.can_enter());
/// assert!(StateKind::Terminal.is_final());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    /// The unique starting point of a machine.
    Initial,
    /// An ordinary intermediate node.
    Standard,
    /// Entering it completes the machine successfully.
    Terminal,
    /// Entering it aborts the machine.
    Cancelling,
}

impl StateKind {
    /// Whether the state can be the source of transitions.
    pub fn can_exit(self) -> bool {
        matches!(self, Self::Initial | Self::Standard)
    }

    /// Whether the state can be the target of transitions.
    pub fn can_enter(self) -> bool {
        !matches!(self, Self::Initial)
    }

    /// Terminal and cancelling states end the run of a machine.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Terminal | Self::Cancelling)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Standard => "Standard",
            Self::Terminal => "Terminal",
            Self::Cancelling => "Cancelling",
        }
    }
}

/// How a finished machine ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// A terminal state was entered.
    Completed,
    /// A cancelling state was entered or a cancellation was raised.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_roles_follow_kind() {
        assert!(StateKind::Initial.can_exit());
        assert!(StateKind::Standard.can_exit());
        assert!(!StateKind::Terminal.can_exit());
        assert!(!StateKind::Cancelling.can_exit());

        assert!(!StateKind::Initial.can_enter());
        assert!(StateKind::Standard.can_enter());
        assert!(StateKind::Terminal.can_enter());
        assert!(StateKind::Cancelling.can_enter());
    }

    #[test]
    fn is_final_identifies_terminal_and_cancelling() {
        assert!(!StateKind::Initial.is_final());
        assert!(!StateKind::Standard.is_final());
        assert!(StateKind::Terminal.is_final());
        assert!(StateKind::Cancelling.is_final());
    }

    #[test]
    fn init_id_is_first_slot() {
        assert_eq!(StateId::INIT.index(), 0);
        assert_eq!(StateId::INIT.to_string(), "#0");
    }

    #[test]
    fn kind_serializes_correctly() {
        let json = serde_json::to_string(&StateKind::Cancelling).unwrap();
        let deserialized: StateKind = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, StateKind::Cancelling);
    }
}
