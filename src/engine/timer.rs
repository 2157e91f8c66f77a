//! Background timer backing timeout transitions.
//!
//! The timer thread never touches a machine. On expiry it only flips its
//! slot to `Fired` and calls the optional notifier; the dispatching thread
//! later observes the flag and applies the transition itself.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Waker invoked from the timer thread when a timeout expires.
///
/// Typically used to wake an event loop so it calls
/// [`Fsm::poll_timeouts`](crate::engine::Fsm::poll_timeouts).
pub type TimeoutNotifier = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Pending,
    Fired,
    Cancelled,
}

struct TimerSlot {
    state: Mutex<SlotState>,
    signal: Condvar,
}

impl TimerSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState::Pending),
            signal: Condvar::new(),
        }
    }

    fn run(&self, duration: Duration, notifier: Option<TimeoutNotifier>) {
        let deadline = Instant::now().checked_add(duration);
        let mut state = self.state.lock();
        while *state == SlotState::Pending {
            match deadline {
                Some(deadline) => {
                    if self.signal.wait_until(&mut state, deadline).timed_out() {
                        if *state == SlotState::Pending {
                            *state = SlotState::Fired;
                        }
                        break;
                    }
                }
                None => self.signal.wait(&mut state),
            }
        }
        let fired = *state == SlotState::Fired;
        drop(state);

        if fired {
            if let Some(notify) = notifier {
                notify();
            }
        }
    }

    fn cancel(&self) {
        let mut state = self.state.lock();
        if *state == SlotState::Pending {
            *state = SlotState::Cancelled;
        }
        self.signal.notify_all();
    }

    fn current(&self) -> SlotState {
        *self.state.lock()
    }
}

/// One-shot cancellable timer owned by a timeout transition. Opaque outside
/// the engine.
#[derive(Default)]
pub struct TimeoutTimer {
    slot: Option<Arc<TimerSlot>>,
}

impl TimeoutTimer {
    /// Arm the timer. No-op while a previous arming is pending or fired but
    /// not yet consumed, and for a zero duration.
    ///
    /// Returns whether a new timer thread was started.
    pub(crate) fn start(&mut self, duration: Duration, notifier: Option<TimeoutNotifier>) -> bool {
        if self.slot.is_some() || duration.is_zero() {
            return false;
        }

        let slot = Arc::new(TimerSlot::new());
        let worker = Arc::clone(&slot);
        let spawned = thread::Builder::new()
            .name("fsm-timeout".to_string())
            .spawn(move || worker.run(duration, notifier));

        match spawned {
            Ok(_) => {
                self.slot = Some(slot);
                true
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to spawn timeout thread");
                false
            }
        }
    }

    /// Cancel a pending timer and discard a fired but unconsumed one.
    pub(crate) fn cancel(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.cancel();
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| slot.current() == SlotState::Pending)
    }

    pub(crate) fn is_fired(&self) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| slot.current() == SlotState::Fired)
    }

    /// Take a fired timer, leaving the transition re-armable.
    ///
    /// Returns `false` if the timer had not fired.
    pub(crate) fn consume(&mut self) -> bool {
        if self.is_fired() {
            self.slot = None;
            true
        } else {
            false
        }
    }
}

impl Drop for TimeoutTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimeoutTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.slot.as_ref().map(|slot| slot.current());
        f.debug_struct("TimeoutTimer").field("state", &state).finish()
    }
}
