//! Double-click recognition.

use super::event::{labels, Button, InputEvent};
use crate::builder::{BuildError, FsmBuilder, TransitionBuilder};
use crate::config::GestureConfig;
use crate::core::INIT_STATE;
use crate::engine::{Fsm, FsmHandler};
use crate::event_matches;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What a double-click run recorded so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DoubleClickData {
    /// Button of the first press.
    pub button: Option<Button>,
    pub first_position: Option<(f64, f64)>,
    /// Position of the final release.
    pub last_position: Option<(f64, f64)>,
}

#[derive(Debug, Default)]
struct ClickState {
    data: DoubleClickData,
    pinned: Option<Button>,
}

/// Shared handle on the parameters and data of one double-click machine.
///
/// Clones refer to the same cells, so a handle stays valid after the
/// machine itself was moved into a parent's sub-machine transition.
#[derive(Debug, Clone)]
pub struct DoubleClickParams {
    state: Arc<Mutex<ClickState>>,
    timeout_ms: Arc<AtomicU64>,
}

impl DoubleClickParams {
    pub fn new(timeout: Duration) -> Self {
        let params = Self {
            state: Arc::default(),
            timeout_ms: Arc::default(),
        };
        params.set_timeout(timeout);
        params
    }

    pub fn data(&self) -> DoubleClickData {
        self.state.lock().data
    }

    /// Button every press and release must use: the tracked button of the
    /// current run, or else the pinned one.
    pub fn check_button(&self) -> Option<Button> {
        let state = self.state.lock();
        state.data.button.or(state.pinned)
    }

    /// Restrict the first press to `button`. Survives resets; `None`
    /// lifts the restriction.
    pub fn set_check_button(&self, button: Option<Button>) {
        self.state.lock().pinned = button;
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.load(Ordering::Relaxed))
    }

    /// Change the delay allowed between the first click and the second
    /// press. Applies from the next arming.
    pub fn set_timeout(&self, timeout: Duration) {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.timeout_ms.store(millis, Ordering::Relaxed);
    }

    fn accepts(&self, event: &InputEvent) -> bool {
        event
            .button()
            .is_some_and(|button| self.check_button().is_none_or(|check| check == button))
    }

    fn record_first(&self, event: &InputEvent) {
        let mut state = self.state.lock();
        state.data.button = event.button();
        state.data.first_position = event.position();
    }

    fn record_last(&self, event: &InputEvent) {
        self.state.lock().data.last_position = event.position();
    }

    fn clear(&self) {
        self.state.lock().data = DoubleClickData::default();
    }
}

impl Default for DoubleClickParams {
    fn default() -> Self {
        Self::new(GestureConfig::default().double_click_timeout())
    }
}

struct ClearOnReset(DoubleClickParams);

impl FsmHandler<InputEvent> for ClearOnReset {
    fn on_reset(&mut self) {
        self.0.clear();
    }
}

/// Recognizes two press/release pairs of the same button, the second press
/// arriving before the double-click timeout.
///
/// The machine only starts once the double-click is recognized, so its
/// handlers hear nothing about a single click that times out.
///
/// ```text
/// init -press-> pressed -release-> clicked -press-> pressed_again -release-> dbleclicked
///                                  clicked -timeout-> cancelled
/// ```
///
/// # Example
///
/// ```rust
/// use gesture_fsm::core::Outcome;
/// use gesture_fsm::gestures::{DoubleClickFsm, InputEvent};
///
/// let mut dc = DoubleClickFsm::new();
/// dc.build_fsm(None).unwrap();
///
/// for event in [
///     InputEvent::press(1),
///     InputEvent::release(1),
///     InputEvent::press(1),
///     InputEvent::release(1),
/// ] {
///     assert!(dc.process(&event));
/// }
/// assert_eq!(dc.fsm().outcome(), Some(Outcome::Completed));
/// assert_eq!(dc.params().data().button, Some(1));
/// ```
pub struct DoubleClickFsm {
    fsm: Fsm<InputEvent>,
    params: DoubleClickParams,
}

impl DoubleClickFsm {
    pub const PRESSED: &'static str = "pressed";
    pub const CLICKED: &'static str = "clicked";
    pub const PRESSED_AGAIN: &'static str = "pressed_again";
    pub const DBLECLICKED: &'static str = "dbleclicked";
    pub const CANCELLED: &'static str = "cancelled";

    pub fn new() -> Self {
        Self::with_config(&GestureConfig::default())
    }

    pub fn with_config(config: &GestureConfig) -> Self {
        Self::with_params(
            "double-click",
            DoubleClickParams::new(config.double_click_timeout()),
        )
    }

    /// Create an unbuilt machine sharing an existing parameter handle.
    pub fn with_params(name: impl Into<String>, params: DoubleClickParams) -> Self {
        Self {
            fsm: Fsm::new(name),
            params,
        }
    }

    /// Declare the double-click graph. No-op returning `Ok(false)` once
    /// built.
    pub fn build_fsm(
        &mut self,
        handler: Option<Box<dyn FsmHandler<InputEvent>>>,
    ) -> Result<bool, BuildError> {
        let params = self.params.clone();
        self.fsm.build_fsm(handler, move |builder| define(builder, params))
    }

    pub fn params(&self) -> &DoubleClickParams {
        &self.params
    }

    pub fn set_check_button(&self, button: Option<Button>) {
        self.params.set_check_button(button);
    }

    pub fn fsm(&self) -> &Fsm<InputEvent> {
        &self.fsm
    }

    pub fn fsm_mut(&mut self) -> &mut Fsm<InputEvent> {
        &mut self.fsm
    }

    /// Give up the machine, e.g. to nest it. [`params`](Self::params)
    /// handles taken before stay connected to it.
    pub fn into_fsm(self) -> Fsm<InputEvent> {
        self.fsm
    }

    pub fn process(&mut self, event: &InputEvent) -> bool {
        self.fsm.process(event)
    }

    pub fn poll_timeouts(&mut self) -> bool {
        self.fsm.poll_timeouts()
    }

    pub fn reset(&mut self) {
        self.fsm.reset();
    }
}

impl Default for DoubleClickFsm {
    fn default() -> Self {
        Self::new()
    }
}

fn define(
    builder: FsmBuilder<InputEvent>,
    params: DoubleClickParams,
) -> Result<FsmBuilder<InputEvent>, BuildError> {
    let same_button = |params: &DoubleClickParams| {
        let params = params.clone();
        move |event: &InputEvent| params.accepts(event)
    };
    let first = params.clone();
    let last = params.clone();
    let timeout = params.clone();

    builder
        .state(DoubleClickFsm::PRESSED)
        .state(DoubleClickFsm::CLICKED)
        .state(DoubleClickFsm::PRESSED_AGAIN)
        .terminal(DoubleClickFsm::DBLECLICKED)
        .cancelling(DoubleClickFsm::CANCELLED)
        .starting_state(DoubleClickFsm::DBLECLICKED)
        .handler(Box::new(ClearOnReset(params.clone())))
        .transition(
            TransitionBuilder::new()
                .from(INIT_STATE)
                .to(DoubleClickFsm::PRESSED)
                .on(labels::PRESS, event_matches!(InputEvent::Press { .. }))
                .when(same_button(&params))
                .action(move |event| {
                    if let Some(event) = event {
                        first.record_first(event);
                    }
                    Ok(())
                }),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DoubleClickFsm::PRESSED)
                .to(DoubleClickFsm::CLICKED)
                .on(labels::RELEASE, event_matches!(InputEvent::Release { .. }))
                .when(same_button(&params)),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DoubleClickFsm::CLICKED)
                .to(DoubleClickFsm::PRESSED_AGAIN)
                .on(labels::PRESS, event_matches!(InputEvent::Press { .. }))
                .when(same_button(&params)),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DoubleClickFsm::CLICKED)
                .to(DoubleClickFsm::CANCELLED)
                .after(move || timeout.timeout()),
        )?
        .transition(
            TransitionBuilder::new()
                .from(DoubleClickFsm::PRESSED_AGAIN)
                .to(DoubleClickFsm::DBLECLICKED)
                .on(labels::RELEASE, event_matches!(InputEvent::Release { .. }))
                .when(same_button(&params))
                .action(move |event| {
                    if let Some(event) = event {
                        last.record_last(event);
                    }
                    Ok(())
                }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Outcome;

    fn built() -> DoubleClickFsm {
        let mut dc = DoubleClickFsm::new();
        assert!(dc.build_fsm(None).unwrap());
        dc
    }

    #[test]
    fn records_button_and_positions() {
        let mut dc = built();
        dc.process(&InputEvent::press_at(1, 1.0, 2.0));
        dc.process(&InputEvent::release_at(1, 1.0, 2.0));
        dc.process(&InputEvent::press_at(1, 3.0, 4.0));
        dc.process(&InputEvent::release_at(1, 5.0, 6.0));

        assert_eq!(dc.fsm().outcome(), Some(Outcome::Completed));
        assert_eq!(
            dc.params().data(),
            DoubleClickData {
                button: Some(1),
                first_position: Some((1.0, 2.0)),
                last_position: Some((5.0, 6.0)),
            }
        );
    }

    #[test]
    fn starts_only_once_recognized() {
        let mut dc = built();
        dc.process(&InputEvent::press(1));
        dc.process(&InputEvent::release(1));
        dc.process(&InputEvent::press(1));
        assert!(!dc.fsm().is_started());

        dc.process(&InputEvent::release(1));
        assert!(dc.fsm().is_started());
    }

    #[test]
    fn other_button_is_rejected_mid_gesture() {
        let mut dc = built();
        dc.process(&InputEvent::press(1));

        assert!(!dc.process(&InputEvent::release(2)));
        assert_eq!(dc.fsm().current_state_name(), DoubleClickFsm::PRESSED);
    }

    #[test]
    fn pinned_button_restricts_first_press() {
        let mut dc = built();
        dc.set_check_button(Some(3));

        assert!(!dc.process(&InputEvent::press(1)));
        assert!(dc.process(&InputEvent::press(3)));
    }

    #[test]
    fn reset_clears_run_data_but_keeps_pin() {
        let mut dc = built();
        dc.set_check_button(Some(2));
        dc.process(&InputEvent::press(2));
        dc.reset();

        assert_eq!(dc.params().data(), DoubleClickData::default());
        assert_eq!(dc.params().check_button(), Some(2));
    }

    #[test]
    fn timeout_is_adjustable_through_handle() {
        let dc = DoubleClickFsm::with_config(&GestureConfig {
            double_click_timeout_ms: 120,
        });
        assert_eq!(dc.params().timeout(), Duration::from_millis(120));

        dc.params().set_timeout(Duration::from_millis(40));
        assert_eq!(dc.params().timeout(), Duration::from_millis(40));
    }

    #[test]
    fn accepted_events_are_pointer_events() {
        let dc = built();
        let events: Vec<&str> = dc.fsm().accepted_events().into_iter().collect();
        assert_eq!(events, vec![labels::PRESS, labels::RELEASE]);
    }
}
