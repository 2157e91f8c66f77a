//! Input events consumed by the bundled gestures.

use serde::{Deserialize, Serialize};

/// Pointer button identifier.
pub type Button = u8;

/// Event kind labels, as reported by [`Fsm::accepted_events`](crate::engine::Fsm::accepted_events).
pub mod labels {
    pub const PRESS: &str = "press";
    pub const RELEASE: &str = "release";
    pub const MOVE: &str = "move";
    pub const KEY_PRESS: &str = "key-press";
    pub const KEY_RELEASE: &str = "key-release";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Enter,
    Char(char),
    /// Platform key code without a dedicated variant.
    Code(u32),
}

/// A raw pointer or keyboard event.
///
/// # Example
///
/// ```rust
/// use gesture_fsm::gestures::{labels, InputEvent};
///
/// let press = InputEvent::press_at(1, 10.0, 20.0);
/// assert_eq!(press.button(), Some(1));
/// assert_eq!(press.position(), Some((10.0, 20.0)));
/// assert_eq!(press.kind_label(), labels::PRESS);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Press { button: Button, x: f64, y: f64 },
    Release { button: Button, x: f64, y: f64 },
    Move { button: Button, x: f64, y: f64 },
    KeyPress { key: Key },
    KeyRelease { key: Key },
}

impl InputEvent {
    pub fn press(button: Button) -> Self {
        Self::press_at(button, 0.0, 0.0)
    }

    pub fn press_at(button: Button, x: f64, y: f64) -> Self {
        Self::Press { button, x, y }
    }

    pub fn release(button: Button) -> Self {
        Self::release_at(button, 0.0, 0.0)
    }

    pub fn release_at(button: Button, x: f64, y: f64) -> Self {
        Self::Release { button, x, y }
    }

    pub fn move_to(button: Button, x: f64, y: f64) -> Self {
        Self::Move { button, x, y }
    }

    pub fn key_press(key: Key) -> Self {
        Self::KeyPress { key }
    }

    pub fn key_release(key: Key) -> Self {
        Self::KeyRelease { key }
    }

    /// Button of a pointer event.
    pub fn button(&self) -> Option<Button> {
        match *self {
            Self::Press { button, .. } | Self::Release { button, .. } | Self::Move { button, .. } => {
                Some(button)
            }
            Self::KeyPress { .. } | Self::KeyRelease { .. } => None,
        }
    }

    /// Position of a pointer event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Press { x, y, .. } | Self::Release { x, y, .. } | Self::Move { x, y, .. } => {
                Some((x, y))
            }
            Self::KeyPress { .. } | Self::KeyRelease { .. } => None,
        }
    }

    /// Key of a keyboard event.
    pub fn key(&self) -> Option<Key> {
        match *self {
            Self::KeyPress { key } | Self::KeyRelease { key } => Some(key),
            _ => None,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Press { .. } => labels::PRESS,
            Self::Release { .. } => labels::RELEASE,
            Self::Move { .. } => labels::MOVE,
            Self::KeyPress { .. } => labels::KEY_PRESS,
            Self::KeyRelease { .. } => labels::KEY_RELEASE,
        }
    }
}
