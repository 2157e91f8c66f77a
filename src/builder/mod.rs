//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and a macro for declaring machines
//! with minimal boilerplate. Graphs are validated as a whole when built.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::FsmBuilder;
pub use transition::{TransitionBuilder, TransitionSpec};

use crate::engine::{TimeoutTimer, TransitionKind};
use crate::core::Guard;
use std::time::Duration;

/// Create an unconditional event transition.
///
/// # Example
///
/// ```
/// use gesture_fsm::builder::{event_transition, FsmBuilder};
/// use gesture_fsm::core::INIT_STATE;
///
/// let fsm = FsmBuilder::new("tap")
///     .terminal("tapped")
///     .add_transition(event_transition(INIT_STATE, "tapped", "tap", |e: &char| *e == 't'))
///     .build()
///     .unwrap();
///
/// assert_eq!(fsm.accepted_events().into_iter().collect::<Vec<_>>(), vec!["tap"]);
/// ```
pub fn event_transition<E, F>(
    from: impl Into<String>,
    to: impl Into<String>,
    label: impl Into<String>,
    accept: F,
) -> TransitionSpec<E>
where
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    TransitionSpec {
        from: from.into(),
        to: to.into(),
        label: label.into(),
        kind: TransitionKind::Event {
            accept: Guard::new(accept),
            guard: None,
        },
        action: None,
    }
}

/// Create a timeout transition with a fixed duration.
///
/// # Example
///
/// ```
/// use gesture_fsm::builder::{event_transition, timeout_transition, FsmBuilder};
/// use gesture_fsm::core::INIT_STATE;
/// use std::time::Duration;
///
/// let fsm = FsmBuilder::new("hold")
///     .state("pressed")
///     .terminal("held")
///     .add_transition(event_transition(INIT_STATE, "pressed", "press", |e: &u8| *e == 1))
///     .add_transition(timeout_transition("pressed", "held", Duration::from_millis(500)))
///     .build()
///     .unwrap();
///
/// assert!(fsm.transitions_from(fsm.state_id("pressed").unwrap())[0].is_timeout());
/// ```
pub fn timeout_transition<E>(
    from: impl Into<String>,
    to: impl Into<String>,
    duration: Duration,
) -> TransitionSpec<E> {
    TransitionSpec {
        from: from.into(),
        to: to.into(),
        label: "timeout".to_string(),
        kind: TransitionKind::Timeout {
            duration: Box::new(move || duration),
            timer: TimeoutTimer::default(),
        },
        action: None,
    }
}
