//! Builder for declaring transitions.

use crate::builder::error::BuildError;
use crate::core::Guard;
use crate::engine::{Action, ActionResult, DurationFn, Fsm, TimeoutTimer, TransitionKind};
use std::time::Duration;

/// A transition declared by name, not yet attached to a machine.
///
/// Produced by [`TransitionBuilder::build`] and consumed by
/// [`FsmBuilder`](super::FsmBuilder), which resolves the state names.
pub struct TransitionSpec<E> {
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) label: String,
    pub(crate) kind: TransitionKind<E>,
    pub(crate) action: Option<Action<E>>,
}

impl<E> TransitionSpec<E> {
    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<E> std::fmt::Debug for TransitionSpec<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionSpec")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("label", &self.label)
            .finish()
    }
}

enum Trigger<E> {
    Event { label: String, accept: Guard<E> },
    Timeout(DurationFn),
    SubFsm(Fsm<E>),
}

/// Builder for constructing transitions with a fluent API.
///
/// Exactly one trigger is kept: the last of `.on`, `.after` and
/// `.delegate` called wins.
pub struct TransitionBuilder<E> {
    from: Option<String>,
    to: Option<String>,
    trigger: Option<Trigger<E>>,
    guard: Option<Guard<E>>,
    action: Option<Action<E>>,
}

impl<E> TransitionBuilder<E> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            trigger: None,
            guard: None,
            action: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Fire on events for which `accept` holds. `label` names the event
    /// kind in introspection.
    pub fn on<F>(mut self, label: impl Into<String>, accept: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.trigger = Some(Trigger::Event {
            label: label.into(),
            accept: Guard::new(accept),
        });
        self
    }

    /// Fire once the source state was current for the returned duration.
    /// The closure is evaluated at every entry of the source state.
    pub fn after<F>(mut self, duration: F) -> Self
    where
        F: Fn() -> Duration + Send + Sync + 'static,
    {
        self.trigger = Some(Trigger::Timeout(Box::new(duration)));
        self
    }

    /// Fire once the nested machine completes.
    pub fn delegate(mut self, nested: Fsm<E>) -> Self {
        self.trigger = Some(Trigger::SubFsm(nested));
        self
    }

    /// Add a guard predicate (optional, event transitions only).
    pub fn guard(mut self, guard: Guard<E>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional, event transitions only).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Set the action run when the transition fires (optional).
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: FnMut(Option<&E>) -> ActionResult + Send + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<TransitionSpec<E>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let to = self.to.ok_or(BuildError::MissingToState)?;
        let trigger = self.trigger.ok_or(BuildError::MissingTrigger)?;

        let (label, kind) = match trigger {
            Trigger::Event { label, accept } => (
                label,
                TransitionKind::Event {
                    accept,
                    guard: self.guard,
                },
            ),
            _ if self.guard.is_some() => return Err(BuildError::GuardWithoutEvent),
            Trigger::Timeout(duration) => (
                "timeout".to_string(),
                TransitionKind::Timeout {
                    duration,
                    timer: TimeoutTimer::default(),
                },
            ),
            Trigger::SubFsm(nested) => (
                nested.name().to_string(),
                TransitionKind::SubFsm(Box::new(nested)),
            ),
        };

        Ok(TransitionSpec {
            from,
            to,
            label,
            kind,
            action: self.action,
        })
    }
}

impl<E> Default for TransitionBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::INIT_STATE;

    #[derive(Debug, PartialEq)]
    enum TestEvent {
        Tap,
        Hold,
    }

    #[test]
    fn transition_builder_requires_from() {
        let result = TransitionBuilder::<TestEvent>::new()
            .to("tapped")
            .on("tap", |e| *e == TestEvent::Tap)
            .build();

        assert!(matches!(result, Err(BuildError::MissingFromState)));
    }

    #[test]
    fn transition_builder_requires_to() {
        let result = TransitionBuilder::<TestEvent>::new()
            .from(INIT_STATE)
            .on("tap", |e| *e == TestEvent::Tap)
            .build();

        assert!(matches!(result, Err(BuildError::MissingToState)));
    }

    #[test]
    fn transition_builder_requires_trigger() {
        let result = TransitionBuilder::<TestEvent>::new()
            .from(INIT_STATE)
            .to("tapped")
            .build();

        assert!(matches!(result, Err(BuildError::MissingTrigger)));
    }

    #[test]
    fn guard_on_timeout_is_rejected() {
        let result = TransitionBuilder::<TestEvent>::new()
            .from("pressed")
            .to("held")
            .after(|| Duration::from_millis(100))
            .when(|e| *e == TestEvent::Hold)
            .build();

        assert!(matches!(result, Err(BuildError::GuardWithoutEvent)));
    }

    #[test]
    fn labels_follow_trigger_kind() {
        let event = TransitionBuilder::<TestEvent>::new()
            .from(INIT_STATE)
            .to("tapped")
            .on("tap", |e| *e == TestEvent::Tap)
            .build()
            .unwrap();
        assert_eq!(event.label(), "tap");

        let timeout = TransitionBuilder::<TestEvent>::new()
            .from("pressed")
            .to("held")
            .after(|| Duration::from_millis(100))
            .build()
            .unwrap();
        assert_eq!(timeout.label(), "timeout");

        let nested = TransitionBuilder::<TestEvent>::new()
            .from(INIT_STATE)
            .to("held")
            .delegate(Fsm::new("inner"))
            .build()
            .unwrap();
        assert_eq!(nested.label(), "inner");
        assert_eq!(nested.from(), INIT_STATE);
        assert_eq!(nested.to(), "held");
    }
}
