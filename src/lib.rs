//! Gesture FSM: composable finite state machines for user interactions
//!
//! Multi-step interactions such as double-clicks or drag-lock gestures are
//! recognized by feeding raw input events, one at a time, through a tree of
//! small state machines. A machine reacts to an event with at most one
//! transition; a transition can wait for a timeout or delegate to a nested
//! machine and fire once that machine completes.
//!
//! # Core Concepts
//!
//! - **States**: one initial state `"init"`, standard states, terminal states
//!   that complete the machine and cancelling states that abort it
//! - **Transitions**: event-driven (accept + guard), timeout-driven, or
//!   sub-machine-driven, each with an optional action
//! - **Handlers**: lifecycle hooks notified on start, update, termination,
//!   cancellation, timeout and reset
//! - **Validation**: every graph is checked as a whole when built
//!
//! # Example
//!
//! ```rust
//! use gesture_fsm::builder::{FsmBuilder, TransitionBuilder};
//! use gesture_fsm::core::{Outcome, INIT_STATE};
//! use gesture_fsm::event_matches;
//!
//! #[derive(Debug)]
//! enum Touch {
//!     Down,
//!     Up,
//! }
//!
//! let mut tap = FsmBuilder::new("tap")
//!     .state("touched")
//!     .terminal("tapped")
//!     .transition(
//!         TransitionBuilder::new()
//!             .from(INIT_STATE)
//!             .to("touched")
//!             .on("down", event_matches!(Touch::Down)),
//!     )?
//!     .transition(
//!         TransitionBuilder::new()
//!             .from("touched")
//!             .to("tapped")
//!             .on("up", event_matches!(Touch::Up)),
//!     )?
//!     .build()?;
//!
//! assert!(tap.process(&Touch::Down));
//! assert!(tap.process(&Touch::Up));
//! assert_eq!(tap.outcome(), Some(Outcome::Completed));
//! # Ok::<(), gesture_fsm::builder::BuildError>(())
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod engine;
pub mod gestures;
pub mod snapshot;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, FsmBuilder, TransitionBuilder};
pub use config::{FsmConfig, GestureConfig};
pub use core::{Guard, Outcome, StateId, StateKind, INIT_STATE};
pub use engine::{Cancellation, Fsm, FsmHandler};
pub use snapshot::FsmSnapshot;
