//! Drag-lock: double-click to grab, move freely, double-click again to drop.

use super::double_click::{DoubleClickData, DoubleClickFsm, DoubleClickParams};
use super::event::{labels, Button, InputEvent, Key};
use crate::builder::{BuildError, TransitionBuilder};
use crate::config::GestureConfig;
use crate::core::INIT_STATE;
use crate::engine::{Fsm, FsmHandler};
use crate::event_matches;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Progress of a drag-lock run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DragLockData {
    /// Button locked by the first double-click.
    pub lock_button: Option<Button>,
    /// Where the first double-click ended.
    pub lock_position: Option<(f64, f64)>,
    pub moves: usize,
    pub last_position: Option<(f64, f64)>,
    /// Where the second double-click ended.
    pub drop_position: Option<(f64, f64)>,
}

/// Shared handle on the data of one drag-lock machine.
#[derive(Debug, Clone, Default)]
pub struct DragLockParams {
    data: Arc<Mutex<DragLockData>>,
}

impl DragLockParams {
    pub fn data(&self) -> DragLockData {
        *self.data.lock()
    }

    pub fn lock_button(&self) -> Option<Button> {
        self.data.lock().lock_button
    }

    fn lock(&self, click: &DoubleClickData) {
        let mut data = self.data.lock();
        data.lock_button = click.button;
        data.lock_position = click.last_position;
    }

    fn drop_at(&self, click: &DoubleClickData) {
        self.data.lock().drop_position = click.last_position;
    }

    fn moves_with_lock(&self, event: &InputEvent) -> bool {
        let lock = self.lock_button();
        event
            .button()
            .is_some_and(|button| lock.is_none_or(|lock| lock == button))
    }

    fn record_move(&self, event: &InputEvent) {
        let mut data = self.data.lock();
        data.moves += 1;
        data.last_position = event.position();
    }

    fn clear(&self) {
        *self.data.lock() = DragLockData::default();
    }
}

/// Clears the lock and the buttons pinned into the nested double-clicks.
struct ReleaseLock {
    params: DragLockParams,
    pinned: [DoubleClickParams; 2],
}

impl FsmHandler<InputEvent> for ReleaseLock {
    fn on_reset(&mut self) {
        self.params.clear();
        for params in &self.pinned {
            params.set_check_button(None);
        }
    }
}

/// Drag-lock gesture built from three double-click machines.
///
/// ```text
/// init   -sub(first double-click)-> locked
/// locked -sub(cancel double-click)-> cancelled
/// locked -move(lock button)-> moved -move(lock button)-> moved
/// locked | moved -escape-> cancelled
/// moved  -sub(second double-click)-> dropped
/// ```
///
/// Completing the first double-click locks its button and pins it into the
/// second and the cancelling double-clicks.
pub struct DragLockFsm {
    fsm: Fsm<InputEvent>,
    params: DragLockParams,
    first: DoubleClickParams,
    second: DoubleClickParams,
    cancel: DoubleClickParams,
}

impl DragLockFsm {
    pub const LOCKED: &'static str = "locked";
    pub const MOVED: &'static str = "moved";
    pub const DROPPED: &'static str = "dropped";
    pub const CANCELLED: &'static str = "cancelled";

    pub fn new() -> Self {
        Self::with_config(&GestureConfig::default())
    }

    pub fn with_config(config: &GestureConfig) -> Self {
        let timeout = config.double_click_timeout();
        Self {
            fsm: Fsm::new("drag-lock"),
            params: DragLockParams::default(),
            first: DoubleClickParams::new(timeout),
            second: DoubleClickParams::new(timeout),
            cancel: DoubleClickParams::new(timeout),
        }
    }

    /// Declare the drag-lock graph and its three nested double-clicks. No-op
    /// returning `Ok(false)` once built.
    pub fn build_fsm(
        &mut self,
        handler: Option<Box<dyn FsmHandler<InputEvent>>>,
    ) -> Result<bool, BuildError> {
        if self.fsm.is_built() {
            return Ok(false);
        }

        let first_fsm = nested_double_click("first-double-click", &self.first)?;
        let second_fsm = nested_double_click("second-double-click", &self.second)?;
        let cancel_fsm = nested_double_click("cancel-double-click", &self.cancel)?;

        let params = self.params.clone();
        let (first, second, cancel) = (self.first.clone(), self.second.clone(), self.cancel.clone());

        self.fsm.build_fsm(handler, move |builder| {
            let lock = params.clone();
            let drop_params = params.clone();
            let guard_locked = params.clone();
            let guard_moved = params.clone();
            let record_locked = params.clone();
            let record_moved = params.clone();
            let dropped = second.clone();
            let release = ReleaseLock {
                params,
                pinned: [second.clone(), cancel.clone()],
            };

            builder
                .state(Self::LOCKED)
                .state(Self::MOVED)
                .terminal(Self::DROPPED)
                .cancelling(Self::CANCELLED)
                .handler(Box::new(release))
                .transition(
                    TransitionBuilder::new()
                        .from(INIT_STATE)
                        .to(Self::LOCKED)
                        .delegate(first_fsm)
                        .action(move |_| {
                            let click = first.data();
                            let button = click.button;
                            lock.lock(&click);
                            second.set_check_button(button);
                            cancel.set_check_button(button);
                            tracing::debug!(button = ?button, "drag lock engaged");
                            Ok(())
                        }),
                )?
                .transition(
                    TransitionBuilder::new()
                        .from(Self::LOCKED)
                        .to(Self::CANCELLED)
                        .delegate(cancel_fsm),
                )?
                .transition(
                    TransitionBuilder::new()
                        .from(Self::LOCKED)
                        .to(Self::MOVED)
                        .on(labels::MOVE, event_matches!(InputEvent::Move { .. }))
                        .when(move |event| guard_locked.moves_with_lock(event))
                        .action(move |event| {
                            if let Some(event) = event {
                                record_locked.record_move(event);
                            }
                            Ok(())
                        }),
                )?
                .transition(escape(Self::LOCKED))?
                .transition(
                    TransitionBuilder::new()
                        .from(Self::MOVED)
                        .to(Self::MOVED)
                        .on(labels::MOVE, event_matches!(InputEvent::Move { .. }))
                        .when(move |event| guard_moved.moves_with_lock(event))
                        .action(move |event| {
                            if let Some(event) = event {
                                record_moved.record_move(event);
                            }
                            Ok(())
                        }),
                )?
                .transition(escape(Self::MOVED))?
                .transition(
                    TransitionBuilder::new()
                        .from(Self::MOVED)
                        .to(Self::DROPPED)
                        .delegate(second_fsm)
                        .action(move |_| {
                            drop_params.drop_at(&dropped.data());
                            Ok(())
                        }),
                )
        })
    }

    pub fn params(&self) -> &DragLockParams {
        &self.params
    }

    pub fn first_double_click(&self) -> &DoubleClickParams {
        &self.first
    }

    pub fn second_double_click(&self) -> &DoubleClickParams {
        &self.second
    }

    pub fn cancel_double_click(&self) -> &DoubleClickParams {
        &self.cancel
    }

    pub fn fsm(&self) -> &Fsm<InputEvent> {
        &self.fsm
    }

    pub fn fsm_mut(&mut self) -> &mut Fsm<InputEvent> {
        &mut self.fsm
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

impl Default for DragLockFsm {
    fn default() -> Self {
        Self::new()
    }
}

fn nested_double_click(
    name: &str,
    params: &DoubleClickParams,
) -> Result<Fsm<InputEvent>, BuildError> {
    let mut double_click = DoubleClickFsm::with_params(name, params.clone());
    double_click.build_fsm(None)?;
    Ok(double_click.into_fsm())
}

fn escape(from: &str) -> TransitionBuilder<InputEvent> {
    TransitionBuilder::new()
        .from(from)
        .to(DragLockFsm::CANCELLED)
        .on(
            labels::KEY_PRESS,
            event_matches!(InputEvent::KeyPress { key: Key::Escape }),
        )
}
