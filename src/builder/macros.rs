//! Macros for ergonomic machine construction.

/// Build an event predicate from a pattern, with an optional guard.
///
/// Expands to a closure `|event: &E| -> bool` suitable for
/// [`TransitionBuilder::on`](crate::builder::TransitionBuilder::on) and
/// [`TransitionBuilder::when`](crate::builder::TransitionBuilder::when).
///
/// # Example
///
/// ```
/// use gesture_fsm::event_matches;
///
/// #[derive(Debug)]
/// enum Pointer {
///     Press { button: u8 },
///     Release { button: u8 },
/// }
///
/// let is_press = event_matches!(Pointer::Press { .. });
/// let is_primary_release = event_matches!(Pointer::Release { button } if *button == 1);
///
/// assert!(is_press(&Pointer::Press { button: 3 }));
/// assert!(!is_press(&Pointer::Release { button: 3 }));
/// assert!(is_primary_release(&Pointer::Release { button: 1 }));
/// assert!(!is_primary_release(&Pointer::Release { button: 2 }));
/// ```
#[macro_export]
macro_rules! event_matches {
    ($pattern:pat $(if $guard:expr)? $(,)?) => {
        |event: &_| ::core::matches!(event, $pattern $(if $guard)?)
    };
}
