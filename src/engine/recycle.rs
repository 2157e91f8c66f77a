//! Events kept aside for the next run of a machine.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Shared queue of events a completed run hands over to the next one.
///
/// Clones refer to the same queue, so transition actions and handlers can
/// keep a handle and hold events the finishing run did not use up, such as
/// a key still pressed when a chord completes. A top-level machine that
/// completed replays the held events in order right after it is reset. A
/// cancelled machine discards them.
pub struct EventRecycler<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E> EventRecycler<E> {
    pub(crate) fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue an event for the next run.
    pub fn hold(&self, event: E) {
        self.events.lock().push(event);
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub(crate) fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.lock())
    }

    pub(crate) fn clear(&self) {
        self.events.lock().clear();
    }
}

impl<E> Clone for EventRecycler<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> fmt::Debug for EventRecycler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecycler")
            .field("held", &self.len())
            .finish()
    }
}
