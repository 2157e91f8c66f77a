//! Borrowed description of a graph under validation.

use crate::core::StateKind;

/// A declared state.
#[derive(Clone, Copy, Debug)]
pub struct StateOutline<'a> {
    pub name: &'a str,
    pub kind: StateKind,
}

/// What a declared transition is driven by.
#[derive(Clone, Copy, Debug)]
pub enum TriggerOutline<'a> {
    Event,
    Timeout,
    SubFsm {
        name: &'a str,
        has_transitions: bool,
        has_terminal: bool,
    },
}

/// A declared transition, endpoints by name.
#[derive(Clone, Copy, Debug)]
pub struct TransitionOutline<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub trigger: TriggerOutline<'a>,
}

/// Everything the graph rules look at. States include `"init"`.
#[derive(Clone, Debug)]
pub struct GraphOutline<'a> {
    pub states: Vec<StateOutline<'a>>,
    pub transitions: Vec<TransitionOutline<'a>>,
    pub starting_state: Option<&'a str>,
}

impl<'a> GraphOutline<'a> {
    pub fn kind_of(&self, name: &str) -> Option<StateKind> {
        self.states
            .iter()
            .find(|state| state.name == name)
            .map(|state| state.kind)
    }
}
