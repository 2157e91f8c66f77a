//! Gesture automata built on the engine.
//!
//! - [`DoubleClickFsm`]: two clicks of the same button within a delay
//! - [`DragLockFsm`]: three nested double-clicks around a locked drag
//! - [`KeyPressFsm`]: one key press
//!
//! Each wraps an [`Fsm`](crate::engine::Fsm) over [`InputEvent`] and keeps
//! its parameters in shared handles, so the data stays reachable after the
//! machine is nested inside another one.

mod double_click;
mod drag_lock;
mod event;
mod key_press;

pub use double_click::{DoubleClickData, DoubleClickFsm, DoubleClickParams};
pub use drag_lock::{DragLockData, DragLockFsm, DragLockParams};
pub use event::{labels, Button, InputEvent, Key};
pub use key_press::KeyPressFsm;
