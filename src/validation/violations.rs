//! Violations found while checking a machine graph.

use thiserror::Error;

/// Structural problems of a machine graph, reported all at once by
/// [`validate_graph`](super::validate_graph).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphViolation {
    #[error("State '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("State names must not be empty")]
    EmptyStateName,

    #[error("Transition refers to undeclared state '{state}'")]
    UnknownState { state: String },

    #[error("State '{state}' is final and cannot be the source of a transition")]
    NotExitable { state: String },

    #[error("State '{state}' is the initial state and cannot be the target of a transition")]
    NotEnterable { state: String },

    #[error("State '{state}' has {count} timeout transitions (at most one allowed)")]
    MultipleTimeouts { state: String, count: usize },

    #[error("The initial state cannot have a timeout transition")]
    TimeoutFromInitial,

    #[error("Nested machine '{nested}' has no transitions")]
    EmptySubFsm { nested: String },

    #[error("Nested machine '{nested}' has no terminal state and can never complete")]
    SubFsmWithoutTerminal { nested: String },

    #[error("Starting state '{state}' is not declared")]
    UnknownStartingState { state: String },
}
