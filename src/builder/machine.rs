//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::{TransitionBuilder, TransitionSpec};
use crate::config::FsmConfig;
use crate::core::{StateId, StateKind, INIT_STATE};
use crate::engine::{Fsm, FsmHandler, Graph, StateNode, Transition, TransitionKind};
use crate::validation::{
    validate_graph, GraphOutline, StateOutline, TransitionOutline, TriggerOutline,
};
use std::collections::HashMap;
use stillwater::validation::Validation;

/// Builder for constructing machines with a fluent API.
///
/// `"init"` is always present. States are declared with
/// [`state`](Self::state), [`terminal`](Self::terminal) and
/// [`cancelling`](Self::cancelling); transitions are evaluated in the order
/// they were added. The graph is validated as a whole by
/// [`build`](Self::build).
pub struct FsmBuilder<E> {
    name: String,
    config: FsmConfig,
    states: Vec<(String, StateKind)>,
    transitions: Vec<TransitionSpec<E>>,
    starting_state: Option<String>,
    handlers: Vec<Box<dyn FsmHandler<E>>>,
}

impl<E> FsmBuilder<E> {
    /// Create a new builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: FsmConfig::default(),
            states: Vec::new(),
            transitions: Vec::new(),
            starting_state: None,
            handlers: Vec::new(),
        }
    }

    pub fn config(mut self, config: FsmConfig) -> Self {
        self.config = config;
        self
    }

    /// Declare a standard state.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push((name.into(), StateKind::Standard));
        self
    }

    /// Declare a terminal state.
    pub fn terminal(mut self, name: impl Into<String>) -> Self {
        self.states.push((name.into(), StateKind::Terminal));
        self
    }

    /// Declare a cancelling state.
    pub fn cancelling(mut self, name: impl Into<String>) -> Self {
        self.states.push((name.into(), StateKind::Cancelling));
        self
    }

    /// Start the machine on entering this state instead of on leaving
    /// `"init"`.
    pub fn starting_state(mut self, name: impl Into<String>) -> Self {
        self.starting_state = Some(name.into());
        self
    }

    pub fn handler(mut self, handler: Box<dyn FsmHandler<E>>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<E>) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionSpec<E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<TransitionSpec<E>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the machine.
    /// Returns an error listing every graph violation found.
    pub fn build(self) -> Result<Fsm<E>, BuildError> {
        let name = self.name.clone();
        let (graph, config, handlers) = self.into_parts()?;

        let mut fsm = Fsm::with_config(name, config);
        fsm.install(graph);
        for handler in handlers {
            fsm.add_handler(handler);
        }
        Ok(fsm)
    }

    pub(crate) fn into_parts(
        self,
    ) -> Result<(Graph<E>, FsmConfig, Vec<Box<dyn FsmHandler<E>>>), BuildError> {
        self.validate()?;

        let mut states = vec![StateNode::new(INIT_STATE, StateKind::Initial)];
        states.extend(
            self.states
                .into_iter()
                .map(|(name, kind)| StateNode::new(name, kind)),
        );
        let ids: HashMap<String, StateId> = states
            .iter()
            .enumerate()
            .map(|(index, state)| (state.name.clone(), StateId(index)))
            .collect();

        for spec in self.transitions {
            let (Some(&source), Some(&target)) = (ids.get(&spec.from), ids.get(&spec.to)) else {
                continue;
            };
            states[source.0].transitions.push(Transition::new(
                spec.label,
                target,
                spec.kind,
                spec.action,
            ));
        }

        let starting_state = self
            .starting_state
            .and_then(|name| ids.get(&name).copied())
            .unwrap_or(StateId::INIT);

        Ok((
            Graph {
                states,
                starting_state,
            },
            self.config,
            self.handlers,
        ))
    }

    fn validate(&self) -> Result<(), BuildError> {
        let mut states = vec![StateOutline {
            name: INIT_STATE,
            kind: StateKind::Initial,
        }];
        states.extend(self.states.iter().map(|(name, kind)| StateOutline {
            name: name.as_str(),
            kind: *kind,
        }));

        let transitions = self
            .transitions
            .iter()
            .map(|spec| TransitionOutline {
                from: &spec.from,
                to: &spec.to,
                trigger: match &spec.kind {
                    TransitionKind::Event { .. } => TriggerOutline::Event,
                    TransitionKind::Timeout { .. } => TriggerOutline::Timeout,
                    TransitionKind::SubFsm(nested) => TriggerOutline::SubFsm {
                        name: nested.name(),
                        has_transitions: nested.is_built(),
                        has_terminal: nested.has_terminal_state(),
                    },
                },
            })
            .collect();

        let outline = GraphOutline {
            states,
            transitions,
            starting_state: self.starting_state.as_deref(),
        };

        match validate_graph(&outline) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(BuildError::InvalidGraph {
                machine: self.name.clone(),
                violations: errors.iter().cloned().collect(),
            }),
        }
    }
}
