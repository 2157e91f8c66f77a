//! Graph rules checked with Validation.

use crate::core::StateKind;
use crate::validation::context::{GraphOutline, TriggerOutline};
use crate::validation::violations::GraphViolation;
use std::collections::{BTreeMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<GraphViolation>>;

fn require(ok: bool, violation: impl FnOnce() -> GraphViolation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Check a graph against every rule, accumulating ALL violations.
///
/// Returns `Validation::Success(())` for a well-formed graph and
/// `Validation::Failure` listing every violation otherwise.
pub fn validate_graph(outline: &GraphOutline<'_>) -> Validation<(), NonEmptyVec<GraphViolation>> {
    let mut checks: Vec<Check> = Vec::new();

    checks.extend(check_state_names(outline));
    checks.extend(check_endpoints(outline));
    checks.extend(check_timeouts(outline));
    checks.extend(check_nested(outline));
    checks.push(check_starting_state(outline));

    Validation::all_vec(checks).map(|_| ())
}

fn check_state_names(outline: &GraphOutline<'_>) -> Vec<Check> {
    let mut seen = HashSet::new();
    outline
        .states
        .iter()
        .map(|state| {
            if state.name.is_empty() {
                return Validation::fail(GraphViolation::EmptyStateName);
            }
            require(seen.insert(state.name), || GraphViolation::DuplicateState {
                state: state.name.to_string(),
            })
        })
        .collect()
}

fn check_endpoints(outline: &GraphOutline<'_>) -> Vec<Check> {
    let mut checks = Vec::new();
    for transition in &outline.transitions {
        checks.push(match outline.kind_of(transition.from) {
            None => Validation::fail(GraphViolation::UnknownState {
                state: transition.from.to_string(),
            }),
            Some(kind) => require(kind.can_exit(), || GraphViolation::NotExitable {
                state: transition.from.to_string(),
            }),
        });
        checks.push(match outline.kind_of(transition.to) {
            None => Validation::fail(GraphViolation::UnknownState {
                state: transition.to.to_string(),
            }),
            Some(kind) => require(kind.can_enter(), || GraphViolation::NotEnterable {
                state: transition.to.to_string(),
            }),
        });
    }
    checks
}

fn check_timeouts(outline: &GraphOutline<'_>) -> Vec<Check> {
    let mut per_state: BTreeMap<&str, usize> = BTreeMap::new();
    for transition in &outline.transitions {
        if matches!(transition.trigger, TriggerOutline::Timeout) {
            *per_state.entry(transition.from).or_default() += 1;
        }
    }

    per_state
        .into_iter()
        .flat_map(|(state, count)| {
            let initial = outline.kind_of(state) == Some(StateKind::Initial);
            [
                require(count <= 1, || GraphViolation::MultipleTimeouts {
                    state: state.to_string(),
                    count,
                }),
                require(!initial, || GraphViolation::TimeoutFromInitial),
            ]
        })
        .collect()
}

fn check_nested(outline: &GraphOutline<'_>) -> Vec<Check> {
    outline
        .transitions
        .iter()
        .filter_map(|transition| match transition.trigger {
            TriggerOutline::SubFsm {
                name,
                has_transitions,
                has_terminal,
            } => Some((name, has_transitions, has_terminal)),
            _ => None,
        })
        .map(|(name, has_transitions, has_terminal)| {
            if !has_transitions {
                Validation::fail(GraphViolation::EmptySubFsm {
                    nested: name.to_string(),
                })
            } else {
                require(has_terminal, || GraphViolation::SubFsmWithoutTerminal {
                    nested: name.to_string(),
                })
            }
        })
        .collect()
}

fn check_starting_state(outline: &GraphOutline<'_>) -> Check {
    match outline.starting_state {
        None => Validation::success(()),
        Some(state) => require(outline.kind_of(state).is_some(), || {
            GraphViolation::UnknownStartingState {
                state: state.to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::INIT_STATE;
    use crate::validation::context::{StateOutline, TransitionOutline};

    fn states() -> Vec<StateOutline<'static>> {
        vec![
            StateOutline {
                name: INIT_STATE,
                kind: StateKind::Initial,
            },
            StateOutline {
                name: "pressed",
                kind: StateKind::Standard,
            },
            StateOutline {
                name: "clicked",
                kind: StateKind::Terminal,
            },
        ]
    }

    fn edge(from: &'static str, to: &'static str) -> TransitionOutline<'static> {
        TransitionOutline {
            from,
            to,
            trigger: TriggerOutline::Event,
        }
    }

    #[test]
    fn well_formed_graph_passes() {
        let outline = GraphOutline {
            states: states(),
            transitions: vec![edge(INIT_STATE, "pressed"), edge("pressed", "clicked")],
            starting_state: None,
        };

        assert!(validate_graph(&outline).is_success());
    }

    #[test]
    fn validation_accumulates_all_violations() {
        let mut all_states = states();
        all_states.push(StateOutline {
            name: "pressed",
            kind: StateKind::Standard,
        });

        let outline = GraphOutline {
            states: all_states,
            transitions: vec![
                edge("clicked", "pressed"),
                edge("pressed", INIT_STATE),
                edge("pressed", "nowhere"),
            ],
            starting_state: Some("missing"),
        };

        match validate_graph(&outline) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 5);
                let has = |expected: GraphViolation| errors.iter().any(|e| *e == expected);

                assert!(has(GraphViolation::DuplicateState {
                    state: "pressed".to_string()
                }));
                assert!(has(GraphViolation::NotExitable {
                    state: "clicked".to_string()
                }));
                assert!(has(GraphViolation::NotEnterable {
                    state: INIT_STATE.to_string()
                }));
                assert!(has(GraphViolation::UnknownState {
                    state: "nowhere".to_string()
                }));
                assert!(has(GraphViolation::UnknownStartingState {
                    state: "missing".to_string()
                }));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn second_timeout_on_a_state_is_rejected() {
        let timeout = |from, to| TransitionOutline {
            from,
            to,
            trigger: TriggerOutline::Timeout,
        };
        let outline = GraphOutline {
            states: states(),
            transitions: vec![
                edge(INIT_STATE, "pressed"),
                timeout("pressed", "clicked"),
                timeout("pressed", "pressed"),
                timeout(INIT_STATE, "clicked"),
            ],
            starting_state: None,
        };

        match validate_graph(&outline) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, GraphViolation::MultipleTimeouts { count: 2, .. })));
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, GraphViolation::TimeoutFromInitial)));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn nested_machine_must_be_able_to_complete() {
        let outline = GraphOutline {
            states: states(),
            transitions: vec![
                TransitionOutline {
                    from: INIT_STATE,
                    to: "pressed",
                    trigger: TriggerOutline::SubFsm {
                        name: "empty",
                        has_transitions: false,
                        has_terminal: false,
                    },
                },
                TransitionOutline {
                    from: "pressed",
                    to: "clicked",
                    trigger: TriggerOutline::SubFsm {
                        name: "endless",
                        has_transitions: true,
                        has_terminal: false,
                    },
                },
            ],
            starting_state: None,
        };

        let result = validate_graph(&outline);
        assert!(result.is_failure());
        if let Validation::Failure(errors) = result {
            assert_eq!(errors.len(), 2);
            assert!(errors
                .iter()
                .any(|e| matches!(e, GraphViolation::EmptySubFsm { nested } if nested == "empty")));
            assert!(errors.iter().any(
                |e| matches!(e, GraphViolation::SubFsmWithoutTerminal { nested } if nested == "endless")
            ));
        }
    }
}
