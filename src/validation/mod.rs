//! Validation of machine graphs before they run.
//!
//! Uses Stillwater's `Validation` type to accumulate ALL violations of a
//! graph instead of stopping at the first one, so a builder reports every
//! misdeclared state and transition in a single error.
//!
//! # Example
//!
//! ```rust
//! use gesture_fsm::core::{StateKind, INIT_STATE};
//! use gesture_fsm::validation::{
//!     validate_graph, GraphOutline, StateOutline, TransitionOutline, TriggerOutline,
//! };
//!
//! let outline = GraphOutline {
//!     states: vec![
//!         StateOutline { name: INIT_STATE, kind: StateKind::Initial },
//!         StateOutline { name: "tapped", kind: StateKind::Terminal },
//!     ],
//!     transitions: vec![TransitionOutline {
//!         from: INIT_STATE,
//!         to: "tapped",
//!         trigger: TriggerOutline::Event,
//!     }],
//!     starting_state: None,
//! };
//!
//! assert!(validate_graph(&outline).is_success());
//! ```

pub mod context;
pub mod rules;
pub mod violations;

pub use context::{GraphOutline, StateOutline, TransitionOutline, TriggerOutline};
pub use rules::validate_graph;
pub use violations::GraphViolation;
