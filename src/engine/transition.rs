//! Transition values and their matching rules.
//!
//! A transition is a plain value: a target, a trigger kind and an optional
//! action. The three trigger kinds share one representation instead of a
//! type per kind:
//! - `Event`: fires when `accept` and `guard` hold for the incoming event
//! - `Timeout`: fires when its timer expired while the source was current
//! - `SubFsm`: fires when the nested machine it delegates to completes

use super::handler::ActionResult;
use super::machine::Fsm;
use super::timer::{TimeoutNotifier, TimeoutTimer};
use crate::core::{Guard, StateId};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Side effect run exactly once per firing. Receives the triggering event,
/// or `None` when a timeout fired the transition.
pub type Action<E> = Box<dyn FnMut(Option<&E>) -> ActionResult + Send>;

/// Timeout duration, evaluated each time the source state is entered.
pub type DurationFn = Box<dyn Fn() -> Duration + Send + Sync>;

/// What makes a transition fire.
pub enum TransitionKind<E> {
    /// Driven by incoming events.
    Event {
        accept: Guard<E>,
        guard: Option<Guard<E>>,
    },
    /// Driven by the absence of qualifying events for a duration.
    Timeout {
        duration: DurationFn,
        timer: TimeoutTimer,
    },
    /// Driven by the completion of a nested machine.
    SubFsm(Box<Fsm<E>>),
}

/// Result of offering an event to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Match {
    /// Not an event this transition cares about; try the next one.
    No,
    /// Right kind of event, guard failed; the event is consumed.
    Rejected,
    /// Fire now.
    Fire,
    /// Start forwarding events to the nested machine.
    Delegate,
}

/// A directed edge from the state that owns it to `target`.
pub struct Transition<E> {
    pub(crate) label: String,
    pub(crate) target: StateId,
    pub(crate) kind: TransitionKind<E>,
    pub(crate) action: Option<Action<E>>,
}

impl<E> Transition<E> {
    pub(crate) fn new(
        label: String,
        target: StateId,
        kind: TransitionKind<E>,
        action: Option<Action<E>>,
    ) -> Self {
        Self {
            label,
            target,
            kind,
            action,
        }
    }

    /// Event label for event transitions, `"timeout"` for timeouts and the
    /// nested machine's name for sub-machine transitions.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn kind(&self) -> &TransitionKind<E> {
        &self.kind
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, TransitionKind::Timeout { .. })
    }

    pub fn is_sub_fsm(&self) -> bool {
        matches!(self.kind, TransitionKind::SubFsm(_))
    }

    /// The nested machine of a sub-machine transition.
    pub fn nested(&self) -> Option<&Fsm<E>> {
        match &self.kind {
            TransitionKind::SubFsm(nested) => Some(nested),
            _ => None,
        }
    }

    pub(crate) fn nested_mut(&mut self) -> Option<&mut Fsm<E>> {
        match &mut self.kind {
            TransitionKind::SubFsm(nested) => Some(nested),
            _ => None,
        }
    }

    /// Whether the event is of a kind this transition cares about.
    ///
    /// Timeout transitions ignore the event and report whether their timer
    /// expired. Sub-machine transitions ask the nested machine's initial
    /// state.
    pub fn accept(&self, event: Option<&E>) -> bool {
        match (&self.kind, event) {
            (TransitionKind::Timeout { timer, .. }, _) => timer.is_fired(),
            (_, None) => false,
            (TransitionKind::Event { accept, .. }, Some(event)) => accept.check(event),
            (TransitionKind::SubFsm(nested), Some(event)) => {
                nested.initial_transition(event).is_some()
            }
        }
    }

    /// The semantic condition checked once `accept` holds.
    pub fn is_guard_ok(&self, event: Option<&E>) -> bool {
        match (&self.kind, event) {
            (TransitionKind::Timeout { timer, .. }, _) => timer.is_fired(),
            (_, None) => false,
            (TransitionKind::Event { guard, .. }, Some(event)) => {
                guard.as_ref().is_none_or(|guard| guard.check(event))
            }
            (TransitionKind::SubFsm(nested), Some(event)) => nested
                .initial_transition(event)
                .is_some_and(|first| first.is_guard_ok(Some(event))),
        }
    }

    /// Labels of the events this transition reacts to. Always empty for
    /// timeout transitions.
    pub fn accepted_events(&self) -> BTreeSet<&str> {
        match &self.kind {
            TransitionKind::Event { .. } => BTreeSet::from([self.label.as_str()]),
            TransitionKind::Timeout { .. } => BTreeSet::new(),
            TransitionKind::SubFsm(nested) => nested.initial_accepted_events(),
        }
    }

    pub(crate) fn evaluate(&self, event: &E) -> Match {
        if self.is_timeout() || !self.accept(Some(event)) {
            return Match::No;
        }
        if !self.is_guard_ok(Some(event)) {
            return Match::Rejected;
        }
        if self.is_sub_fsm() {
            Match::Delegate
        } else {
            Match::Fire
        }
    }

    pub(crate) fn run_action(&mut self, event: Option<&E>) -> ActionResult {
        match self.action.as_mut() {
            Some(action) => action(event),
            None => Ok(()),
        }
    }

    /// Start the timer of a timeout transition. Returns whether a timer is
    /// now running for it.
    pub(crate) fn arm(&mut self, notifier: Option<TimeoutNotifier>) -> bool {
        match &mut self.kind {
            TransitionKind::Timeout { duration, timer } => {
                timer.start(duration(), notifier) || timer.is_pending()
            }
            _ => false,
        }
    }

    pub(crate) fn disarm(&mut self) {
        if let TransitionKind::Timeout { timer, .. } = &mut self.kind {
            timer.cancel();
        }
    }

    /// Consume an expired timer. Returns `false` when nothing expired.
    pub(crate) fn take_fired(&mut self) -> bool {
        match &mut self.kind {
            TransitionKind::Timeout { timer, .. } => timer.consume(),
            _ => false,
        }
    }

    pub(crate) fn timer_active(&self) -> bool {
        match &self.kind {
            TransitionKind::Timeout { timer, .. } => timer.is_pending() || timer.is_fired(),
            _ => false,
        }
    }
}

impl<E> fmt::Debug for Transition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TransitionKind::Event { .. } => "event",
            TransitionKind::Timeout { .. } => "timeout",
            TransitionKind::SubFsm(_) => "sub-fsm",
        };
        f.debug_struct("Transition")
            .field("label", &self.label)
            .field("target", &self.target)
            .field("kind", &kind)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}
