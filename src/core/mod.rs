//! Core value types of the engine.
//!
//! This module contains the building blocks that carry no dispatch logic:
//! - State identity and variants (`StateId`, `StateKind`, `Outcome`)
//! - Event predicates (`Guard`)
//! - Bounded state change history (`StateHistory`)

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateChange, StateHistory, Trigger};
pub use state::{Outcome, StateId, StateKind, INIT_STATE};
