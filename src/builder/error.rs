//! Build errors for machine and transition builders.

use crate::validation::GraphViolation;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("Transition trigger not specified. Call .on(label, accept), .after(duration) or .delegate(fsm)")]
    MissingTrigger,

    #[error("Guards only apply to event transitions. Call .on(label, accept) before .when(guard)")]
    GuardWithoutEvent,

    #[error("Starting state '{state}' is not a state of machine '{machine}'")]
    UnknownStartingState { machine: String, state: String },

    #[error("Machine '{machine}' has {} graph violation(s): {}", .violations.len(), summarize(.violations))]
    InvalidGraph {
        machine: String,
        violations: Vec<GraphViolation>,
    },
}

fn summarize(violations: &[GraphViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_graph_lists_every_violation() {
        let err = BuildError::InvalidGraph {
            machine: "click".to_string(),
            violations: vec![
                GraphViolation::DuplicateState {
                    state: "pressed".to_string(),
                },
                GraphViolation::UnknownState {
                    state: "released".to_string(),
                },
            ],
        };

        let message = err.to_string();
        assert!(message.starts_with("Machine 'click' has 2 graph violation(s)"));
        assert!(message.contains("pressed"));
        assert!(message.contains("released"));
    }

    #[test]
    fn missing_fields_explain_the_fix() {
        assert!(BuildError::MissingFromState.to_string().contains(".from(state)"));
        assert!(BuildError::MissingTrigger.to_string().contains(".after(duration)"));
    }
}
