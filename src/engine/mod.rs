//! Runtime: machines, transitions, timers and lifecycle hooks.
//!
//! A [`Fsm`] owns its state table; each state owns its outgoing
//! [`Transition`]s, and a sub-machine transition owns its nested `Fsm`.
//! Events are dispatched synchronously by [`Fsm::process`]. Timeouts run on
//! background timer threads that only raise a flag; the expired transition
//! is applied on the caller's thread by [`Fsm::poll_timeouts`].

mod handler;
mod machine;
mod recycle;
mod timer;
mod transition;

pub use handler::{ActionResult, Cancellation, FsmHandler};
pub use machine::Fsm;
pub use recycle::EventRecycler;
pub use timer::{TimeoutNotifier, TimeoutTimer};
pub use transition::{Action, DurationFn, Transition, TransitionKind};

pub(crate) use machine::{Graph, StateNode};
