//! Runtime configuration for machines and the bundled gestures.
//!
//! Both structs deserialize from any serde format with every field optional.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavior switches of a single machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmConfig {
    /// Reset automatically once the machine completes or is cancelled and
    /// its handlers were notified. Ignored for nested machines, whose parent
    /// resets them.
    pub auto_reset: bool,

    /// Maximum number of state changes kept in the history.
    pub history_limit: usize,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            auto_reset: false,
            history_limit: 64,
        }
    }
}

/// Tunables of the bundled gesture automata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Maximum delay between the first click and the second press of a
    /// double-click, in milliseconds.
    pub double_click_timeout_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_click_timeout_ms: 300,
        }
    }
}

impl GestureConfig {
    pub fn double_click_timeout(&self) -> Duration {
        Duration::from_millis(self.double_click_timeout_ms)
    }
}
