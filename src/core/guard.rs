//! Event predicates for controlling transitions.
//!
//! Transitions carry two predicates: one deciding whether the event is of a
//! kind the transition cares about (`accept`), one adding a semantic
//! condition on that event (`guard`). Both are [`Guard`] values.

use std::fmt;

/// Pure predicate over an event.
///
/// # Example
///
/// ```rust
/// use gesture_fsm::core::Guard;
///
/// let left_button = Guard::new(|button: &u8| *button == 0);
///
/// assert!(left_button.check(&0));
/// assert!(!left_button.check(&2));
/// ```
pub struct Guard<E> {
    predicate: Box<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> Guard<E> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// A guard that holds for every event.
    pub fn always() -> Self {
        Guard::new(|_| true)
    }

    /// Evaluate the predicate against an event.
    pub fn check(&self, event: &E) -> bool {
        (self.predicate)(event)
    }
}

impl<E> fmt::Debug for Guard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
