//! Lifecycle hooks and the cancellation signal.

use std::borrow::Cow;
use thiserror::Error;

/// Signal meaning "abort this interaction now".
///
/// Returned by transition actions and by the vetoing lifecycle hooks. The
/// machine that receives it moves to its cancelled outcome; enclosing
/// machines observe that and cancel in turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("interaction cancelled: {reason}")]
pub struct Cancellation {
    reason: Cow<'static, str>,
}

impl Cancellation {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Result returned by transition actions and vetoing hooks.
pub type ActionResult = Result<(), Cancellation>;

/// Callback sink notified by a machine during its run.
///
/// All methods have no-op defaults. `on_starting`, `on_updating` and
/// `on_terminating` may veto by returning a [`Cancellation`], in which case
/// the machine is cancelled and `on_cancelling` follows.
///
/// Update, terminate, cancel and timeout notifications are only delivered
/// once the machine has started (see [`Fsm::starting_state`](crate::engine::Fsm::starting_state)).
///
/// # Example
///
/// ```rust
/// use gesture_fsm::engine::{ActionResult, FsmHandler};
///
/// struct CountStarts(usize);
///
/// impl FsmHandler<u8> for CountStarts {
///     fn on_starting(&mut self) -> ActionResult {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait FsmHandler<E>: Send {
    /// The machine leaves its starting point.
    fn on_starting(&mut self) -> ActionResult {
        Ok(())
    }

    /// A standard state was entered after the machine started, or the
    /// active nested machine changed state. `event` is `None` when the
    /// change was caused by a timeout.
    fn on_updating(&mut self, _event: Option<&E>) -> ActionResult {
        Ok(())
    }

    /// A terminal state was entered.
    fn on_terminating(&mut self) -> ActionResult {
        Ok(())
    }

    /// The machine was cancelled.
    fn on_cancelling(&mut self) {}

    /// An armed timeout expired and is about to fire its transition.
    fn on_timeout(&mut self) {}

    /// The machine was reset; transient per-run data should be cleared.
    fn on_reset(&mut self) {}
}
