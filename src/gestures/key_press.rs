//! Single key press.

use super::event::{labels, InputEvent, Key};
use crate::builder::{BuildError, TransitionBuilder};
use crate::core::INIT_STATE;
use crate::engine::{Fsm, FsmHandler};
use crate::event_matches;
use parking_lot::Mutex;
use std::sync::Arc;

struct ForgetKey(Arc<Mutex<Option<Key>>>);

impl FsmHandler<InputEvent> for ForgetKey {
    fn on_reset(&mut self) {
        *self.0.lock() = None;
    }
}

/// Completes on the first key press and remembers the key.
///
/// ```text
/// init -key press-> pressed
/// ```
pub struct KeyPressFsm {
    fsm: Fsm<InputEvent>,
    key: Arc<Mutex<Option<Key>>>,
}

impl KeyPressFsm {
    pub const PRESSED: &'static str = "pressed";

    pub fn new() -> Self {
        Self {
            fsm: Fsm::new("key-press"),
            key: Arc::default(),
        }
    }

    pub fn build_fsm(
        &mut self,
        handler: Option<Box<dyn FsmHandler<InputEvent>>>,
    ) -> Result<bool, BuildError> {
        let key = Arc::clone(&self.key);
        self.fsm.build_fsm(handler, move |builder| {
            let recorded = Arc::clone(&key);
            builder
                .terminal(Self::PRESSED)
                .handler(Box::new(ForgetKey(key)))
                .transition(
                    TransitionBuilder::new()
                        .from(INIT_STATE)
                        .to(Self::PRESSED)
                        .on(labels::KEY_PRESS, event_matches!(InputEvent::KeyPress { .. }))
                        .action(move |event| {
                            *recorded.lock() = event.and_then(InputEvent::key);
                            Ok(())
                        }),
                )
        })
    }

    /// Key of the completed press.
    pub fn key(&self) -> Option<Key> {
        *self.key.lock()
    }

    pub fn fsm(&self) -> &Fsm<InputEvent> {
        &self.fsm
    }

    pub fn into_fsm(self) -> Fsm<InputEvent> {
        self.fsm
    }

    pub fn process(&mut self, event: &InputEvent) -> bool {
        self.fsm.process(event)
    }

    pub fn reset(&mut self) {
        self.fsm.reset();
    }
}

impl Default for KeyPressFsm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Outcome;

    #[test]
    fn key_press_completes_and_records_key() {
        let mut fsm = KeyPressFsm::new();
        fsm.build_fsm(None).unwrap();

        assert!(!fsm.process(&InputEvent::press(1)));
        assert!(!fsm.process(&InputEvent::key_release(Key::Char('a'))));
        assert!(fsm.process(&InputEvent::key_press(Key::Char('a'))));

        assert_eq!(fsm.fsm().outcome(), Some(Outcome::Completed));
        assert_eq!(fsm.key(), Some(Key::Char('a')));
    }

    #[test]
    fn reset_forgets_key() {
        let mut fsm = KeyPressFsm::new();
        fsm.build_fsm(None).unwrap();
        fsm.process(&InputEvent::key_press(Key::Enter));

        fsm.reset();
        assert_eq!(fsm.key(), None);
        assert_eq!(fsm.fsm().current_state_name(), INIT_STATE);
    }
}
