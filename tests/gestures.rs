//! End-to-end scenarios for the bundled gestures.

use gesture_fsm::config::GestureConfig;
use gesture_fsm::core::{Outcome, INIT_STATE};
use gesture_fsm::engine::{ActionResult, FsmHandler};
use gesture_fsm::gestures::{DoubleClickFsm, DragLockFsm, InputEvent, Key};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SHORT: GestureConfig = GestureConfig {
    double_click_timeout_ms: 40,
};

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<&'static str>>>);

impl Recorder {
    fn entries(&self) -> Vec<&'static str> {
        self.0.lock().clone()
    }
}

impl FsmHandler<InputEvent> for Recorder {
    fn on_starting(&mut self) -> ActionResult {
        self.0.lock().push("start");
        Ok(())
    }

    fn on_terminating(&mut self) -> ActionResult {
        self.0.lock().push("terminate");
        Ok(())
    }

    fn on_cancelling(&mut self) {
        self.0.lock().push("cancel");
    }

    fn on_timeout(&mut self) {
        self.0.lock().push("timeout");
    }
}

fn click(button: u8) -> [InputEvent; 2] {
    [InputEvent::press(button), InputEvent::release(button)]
}

fn poll_until<F: FnMut() -> bool>(mut poll: F, limit: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if poll() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn two_quick_clicks_make_a_double_click() {
    let recorder = Recorder::default();
    let mut dc = DoubleClickFsm::with_config(&SHORT);
    dc.params().set_timeout(Duration::from_secs(5));
    dc.build_fsm(Some(Box::new(recorder.clone()))).unwrap();

    for event in click(1).into_iter().chain(click(1)) {
        assert!(dc.process(&event));
    }

    assert_eq!(dc.fsm().current_state_name(), DoubleClickFsm::DBLECLICKED);
    assert_eq!(dc.fsm().outcome(), Some(Outcome::Completed));
    assert_eq!(recorder.entries(), vec!["start", "terminate"]);
}

#[test]
fn silence_after_one_click_cancels() {
    let recorder = Recorder::default();
    let mut dc = DoubleClickFsm::with_config(&SHORT);
    dc.build_fsm(Some(Box::new(recorder.clone()))).unwrap();

    for event in click(1) {
        assert!(dc.process(&event));
    }
    assert_eq!(dc.fsm().current_state_name(), DoubleClickFsm::CLICKED);
    assert!(dc.fsm().has_pending_timeout());

    assert!(poll_until(|| dc.poll_timeouts(), Duration::from_secs(2)));
    assert_eq!(dc.fsm().current_state_name(), DoubleClickFsm::CANCELLED);
    assert_eq!(dc.fsm().outcome(), Some(Outcome::Cancelled));
    // A lone click never starts the gesture, so handlers hear nothing.
    assert!(recorder.entries().is_empty());
}

#[test]
fn timeout_never_fires_early() {
    let mut dc = DoubleClickFsm::with_config(&GestureConfig {
        double_click_timeout_ms: 10_000,
    });
    dc.build_fsm(None).unwrap();

    for event in click(1) {
        dc.process(&event);
    }
    thread::sleep(Duration::from_millis(30));

    assert!(!dc.poll_timeouts());
    assert_eq!(dc.fsm().current_state_name(), DoubleClickFsm::CLICKED);
}

#[test]
fn expired_timeout_is_applied_before_next_event() {
    let mut dc = DoubleClickFsm::with_config(&SHORT);
    dc.build_fsm(None).unwrap();

    for event in click(1) {
        dc.process(&event);
    }
    thread::sleep(Duration::from_millis(150));

    // The late press finds the machine already cancelled.
    assert!(!dc.process(&InputEvent::press(1)));
    assert_eq!(dc.fsm().outcome(), Some(Outcome::Cancelled));
}

#[test]
fn dynamic_timeout_applies_on_next_arming() {
    let mut dc = DoubleClickFsm::with_config(&GestureConfig {
        double_click_timeout_ms: 10_000,
    });
    dc.build_fsm(None).unwrap();
    dc.params().set_timeout(Duration::from_millis(20));

    for event in click(1) {
        dc.process(&event);
    }
    assert!(poll_until(|| dc.poll_timeouts(), Duration::from_secs(2)));
    assert_eq!(dc.fsm().outcome(), Some(Outcome::Cancelled));
}

#[test]
fn notifier_wakes_the_event_loop() {
    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&wakes);
    let mut dc = DoubleClickFsm::with_config(&SHORT);
    dc.build_fsm(None).unwrap();
    dc.fsm_mut().set_timeout_notifier(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    for event in click(1) {
        dc.process(&event);
    }
    assert!(poll_until(
        || wakes.load(Ordering::SeqCst) > 0,
        Duration::from_secs(2)
    ));
    assert!(dc.poll_timeouts());
}

fn locked_drag(button: u8) -> DragLockFsm {
    let mut drag = DragLockFsm::with_config(&GestureConfig {
        double_click_timeout_ms: 5_000,
    });
    drag.build_fsm(None).unwrap();
    for event in click(button).into_iter().chain(click(button)) {
        assert!(drag.process(&event));
    }
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::LOCKED);
    drag
}

#[test]
fn drag_lock_ignores_moves_of_other_buttons() {
    let mut drag = locked_drag(1);

    assert!(!drag.process(&InputEvent::move_to(2, 10.0, 10.0)));
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::LOCKED);

    assert!(drag.process(&InputEvent::move_to(1, 10.0, 10.0)));
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::MOVED);

    assert!(!drag.process(&InputEvent::move_to(3, 20.0, 20.0)));
    assert_eq!(drag.params().data().last_position, Some((10.0, 10.0)));
}

#[test]
fn escape_cancels_locked_drag() {
    let mut drag = locked_drag(1);

    assert!(drag.process(&InputEvent::key_press(Key::Escape)));
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::CANCELLED);
    assert_eq!(drag.fsm().outcome(), Some(Outcome::Cancelled));
}

#[test]
fn escape_cancels_moved_drag() {
    let mut drag = locked_drag(1);
    drag.process(&InputEvent::move_to(1, 3.0, 4.0));

    assert!(drag.process(&InputEvent::key_press(Key::Escape)));
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::CANCELLED);
}

#[test]
fn second_double_click_drops() {
    let mut drag = locked_drag(1);
    drag.process(&InputEvent::move_to(1, 3.0, 4.0));

    for event in [
        InputEvent::press_at(1, 7.0, 8.0),
        InputEvent::release_at(1, 7.0, 8.0),
        InputEvent::press_at(1, 7.0, 8.0),
        InputEvent::release_at(1, 9.0, 9.0),
    ] {
        assert!(drag.process(&event));
    }

    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::DROPPED);
    assert_eq!(drag.fsm().outcome(), Some(Outcome::Completed));
    assert_eq!(drag.params().data().drop_position, Some((9.0, 9.0)));
}

#[test]
fn moves_between_drop_clicks_do_not_break_the_drop() {
    let mut drag = locked_drag(1);
    drag.process(&InputEvent::move_to(1, 3.0, 4.0));

    assert!(drag.process(&InputEvent::press_at(1, 5.0, 5.0)));
    assert!(!drag.process(&InputEvent::move_to(1, 6.0, 5.0)));
    assert_eq!(
        drag.fsm().active_path(),
        vec!["drag-lock", "second-double-click"]
    );

    for event in [
        InputEvent::release_at(1, 6.0, 5.0),
        InputEvent::press_at(1, 6.0, 5.0),
        InputEvent::release_at(1, 6.0, 6.0),
    ] {
        assert!(drag.process(&event));
    }
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::DROPPED);
    assert_eq!(drag.params().data().moves, 1);
    assert_eq!(drag.params().data().drop_position, Some((6.0, 6.0)));
}

#[test]
fn second_double_click_requires_locked_button() {
    let mut drag = locked_drag(1);
    drag.process(&InputEvent::move_to(1, 3.0, 4.0));

    assert!(!drag.process(&InputEvent::press(2)));
    assert_eq!(drag.fsm().active_path(), vec!["drag-lock"]);
}

#[test]
fn double_click_while_locked_cancels() {
    let mut drag = locked_drag(1);

    for event in click(1).into_iter().chain(click(1)) {
        assert!(drag.process(&event));
    }
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::CANCELLED);
    assert_eq!(drag.fsm().outcome(), Some(Outcome::Cancelled));
}

#[test]
fn single_click_inside_drag_times_out_and_cancels() {
    let mut drag = DragLockFsm::with_config(&SHORT);
    drag.build_fsm(None).unwrap();

    for event in click(1) {
        assert!(drag.process(&event));
    }
    assert!(drag.fsm().has_pending_timeout());

    assert!(poll_until(|| drag.poll_timeouts(), Duration::from_secs(2)));
    assert_eq!(drag.fsm().outcome(), Some(Outcome::Cancelled));
    assert_eq!(drag.fsm().current_state_name(), DragLockFsm::CANCELLED);

    drag.reset();
    assert_eq!(drag.fsm().current_state_name(), INIT_STATE);
    assert_eq!(drag.fsm().active_path(), vec!["drag-lock"]);
}
