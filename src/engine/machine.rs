//! The finite state machine and its dispatch loop.

use super::handler::{ActionResult, Cancellation, FsmHandler};
use super::recycle::EventRecycler;
use super::timer::TimeoutNotifier;
use super::transition::{Match, Transition, TransitionKind};
use crate::builder::{BuildError, FsmBuilder};
use crate::config::FsmConfig;
use crate::core::{Outcome, StateChange, StateHistory, StateId, StateKind, Trigger, INIT_STATE};
use chrono::Utc;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// One entry of a machine's state table. Owns its outgoing transitions in
/// declaration order.
pub(crate) struct StateNode<E> {
    pub(crate) name: String,
    pub(crate) kind: StateKind,
    pub(crate) transitions: Vec<Transition<E>>,
}

impl<E> StateNode<E> {
    pub(crate) fn new(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transitions: Vec::new(),
        }
    }
}

/// Validated state table produced by [`FsmBuilder`].
pub(crate) struct Graph<E> {
    pub(crate) states: Vec<StateNode<E>>,
    pub(crate) starting_state: StateId,
}

type StateObserver = Box<dyn FnMut(&StateChange) + Send>;

/// How a machine reacted to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// A transition fired, or a nested machine took the event.
    Consumed,
    /// A transition recognised the event but its guard refused it.
    Rejected,
    /// Nothing in the current state cares about the event.
    Ignored,
}

/// A composable finite state machine over events of type `E`.
///
/// A machine starts in its initial state `"init"`. Each call to
/// [`process`](Fsm::process) fires at most one transition of the current
/// state, chosen in declaration order. Timeout transitions are applied by
/// [`poll_timeouts`](Fsm::poll_timeouts) (and at the start of every
/// `process` call) on the caller's thread.
///
/// While a sub-machine transition is active, events go to the nested
/// machine only. The other transitions of the current state wait until the
/// nested machine completes or cancels.
///
/// # Example
///
/// ```rust
/// use gesture_fsm::builder::{FsmBuilder, TransitionBuilder};
/// use gesture_fsm::core::{Outcome, INIT_STATE};
///
/// let mut fsm = FsmBuilder::new("toggle")
///     .terminal("done")
///     .transition(
///         TransitionBuilder::new()
///             .from(INIT_STATE)
///             .to("done")
///             .on("go", |e: &&str| *e == "go"),
///     )
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert!(!fsm.process(&"stop"));
/// assert!(fsm.process(&"go"));
/// assert_eq!(fsm.outcome(), Some(Outcome::Completed));
/// ```
pub struct Fsm<E> {
    id: Uuid,
    name: String,
    config: FsmConfig,
    states: Vec<StateNode<E>>,
    current: StateId,
    starting_state: StateId,
    started: bool,
    outcome: Option<Outcome>,
    inner: bool,
    delegate: Option<usize>,
    armed_timeout: Option<usize>,
    handlers: Vec<Box<dyn FsmHandler<E>>>,
    observers: Vec<StateObserver>,
    history: StateHistory,
    notifier: Option<TimeoutNotifier>,
    changes: u64,
    recycler: EventRecycler<E>,
}

impl<E> Fsm<E> {
    /// Create a machine holding only its initial state.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, FsmConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: FsmConfig) -> Self {
        let history = StateHistory::with_limit(config.history_limit);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config,
            states: vec![StateNode::new(INIT_STATE, StateKind::Initial)],
            current: StateId::INIT,
            starting_state: StateId::INIT,
            started: false,
            outcome: None,
            inner: false,
            delegate: None,
            armed_timeout: None,
            handlers: Vec::new(),
            observers: Vec::new(),
            history,
            notifier: None,
            changes: 0,
            recycler: EventRecycler::new(),
        }
    }

    /// Populate the machine's graph once.
    ///
    /// `define` receives an empty builder named after the machine and
    /// declares states and transitions on it. The machine's own
    /// configuration is kept. Returns `Ok(false)` without calling `define`
    /// if the machine already has states besides `"init"`.
    pub fn build_fsm<F>(
        &mut self,
        handler: Option<Box<dyn FsmHandler<E>>>,
        define: F,
    ) -> Result<bool, BuildError>
    where
        F: FnOnce(FsmBuilder<E>) -> Result<FsmBuilder<E>, BuildError>,
    {
        if self.is_built() {
            return Ok(false);
        }

        let builder = define(FsmBuilder::new(self.name.clone()))?;
        let (graph, _, handlers) = builder.into_parts()?;
        self.install(graph);
        self.handlers.extend(handlers);
        self.handlers.extend(handler);

        debug!(fsm = %self.name, states = self.states.len(), "graph built");
        Ok(true)
    }

    pub(crate) fn install(&mut self, graph: Graph<E>) {
        self.states = graph.states;
        self.starting_state = graph.starting_state;
        self.current = StateId::INIT;

        let notifier = self.notifier.clone();
        for nested in self.nested_machines_mut() {
            nested.inner = true;
            if let Some(notifier) = &notifier {
                nested.set_timeout_notifier(Arc::clone(notifier));
            }
        }
    }

    pub fn add_handler(&mut self, handler: Box<dyn FsmHandler<E>>) {
        self.handlers.push(handler);
    }

    /// Observe every state change, including resets.
    pub fn on_state_change<F>(&mut self, observer: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Install a waker called from timer threads when a timeout of this
    /// machine, or of any nested machine, expires.
    pub fn set_timeout_notifier(&mut self, notifier: TimeoutNotifier) {
        for nested in self.nested_machines_mut() {
            nested.set_timeout_notifier(Arc::clone(&notifier));
        }
        self.notifier = Some(notifier);
    }

    /// Choose the state whose entry starts the machine.
    ///
    /// Must be `"init"` or a declared non-initial state.
    pub fn set_starting_state(&mut self, name: &str) -> Result<(), BuildError> {
        let id = self
            .state_id(name)
            .ok_or_else(|| BuildError::UnknownStartingState {
                machine: self.name.clone(),
                state: name.to_string(),
            })?;
        self.starting_state = id;
        Ok(())
    }

    /// Offer one event to the machine.
    ///
    /// Returns `true` if a transition fired or a nested machine consumed the
    /// event. A finished machine ignores every event until it is reset.
    pub fn process(&mut self, event: &E) -> bool {
        if self.apply_timeouts() {
            self.settle();
        }
        if self.outcome.is_some() {
            trace!(fsm = %self.name, "finished machine ignores event");
            return false;
        }

        let dispatch = self.dispatch(event);
        if dispatch == Dispatch::Rejected {
            trace!(fsm = %self.name, state = %self.current_state_name(), "guard refused event");
        }
        self.settle();
        dispatch == Dispatch::Consumed
    }

    /// Apply the timeout transition whose timer expired, if any.
    ///
    /// Returns `true` when a transition was applied.
    pub fn poll_timeouts(&mut self) -> bool {
        let fired = self.apply_timeouts();
        if fired {
            self.settle();
        }
        fired
    }

    /// Return to `"init"`: cancel timers, reset nested machines, clear the
    /// started flag and outcome, then call every handler's `on_reset`.
    ///
    /// A top-level machine that had completed then processes the events
    /// held in its [`recycler`](Fsm::recycler). Otherwise held events are
    /// dropped.
    pub fn reset(&mut self) {
        debug!(fsm = %self.name, "machine reset");
        let replay = if self.outcome == Some(Outcome::Completed) && !self.inner {
            self.recycler.take()
        } else {
            self.recycler.clear();
            Vec::new()
        };

        self.disarm_timeout();
        self.delegate = None;
        for nested in self.nested_machines_mut() {
            nested.reset();
        }
        if self.current != StateId::INIT {
            self.set_current(StateId::INIT, Trigger::Reset);
        }
        self.started = false;
        self.outcome = None;
        for handler in &mut self.handlers {
            handler.on_reset();
        }

        for event in replay {
            debug!(fsm = %self.name, "recycling held event");
            self.process(&event);
        }
    }

    /// Handle on the queue of events to replay once this run completes.
    pub fn recycler(&self) -> EventRecycler<E> {
        self.recycler.clone()
    }

    /// Keep an event for the next run. See [`EventRecycler`].
    pub fn hold_event(&self, event: E) {
        self.recycler.hold(event);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FsmConfig {
        &self.config
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn current_state_name(&self) -> &str {
        &self.states[self.current.0].name
    }

    pub fn current_state_kind(&self) -> StateKind {
        self.states[self.current.0].kind
    }

    pub fn starting_state(&self) -> StateId {
        self.starting_state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether this machine is nested inside another one.
    pub fn is_inner(&self) -> bool {
        self.inner
    }

    /// Whether states besides `"init"` were declared.
    pub fn is_built(&self) -> bool {
        self.states.len() > 1
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|state| state.name == name)
            .map(StateId)
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.0).map(|state| state.name.as_str())
    }

    pub fn state_kind(&self, id: StateId) -> Option<StateKind> {
        self.states.get(id.0).map(|state| state.kind)
    }

    /// All states in declaration order, `"init"` first.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &str, StateKind)> + '_ {
        self.states
            .iter()
            .enumerate()
            .map(|(index, state)| (StateId(index), state.name.as_str(), state.kind))
    }

    /// Outgoing transitions of a state, in evaluation order.
    pub fn transitions_from(&self, id: StateId) -> &[Transition<E>] {
        self.states
            .get(id.0)
            .map(|state| state.transitions.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn has_terminal_state(&self) -> bool {
        self.states
            .iter()
            .any(|state| state.kind == StateKind::Terminal)
    }

    /// The nested machine events are currently forwarded to.
    pub fn active_nested(&self) -> Option<&Fsm<E>> {
        let index = self.delegate?;
        self.states[self.current.0].transitions.get(index)?.nested()
    }

    /// Names of this machine and of each nested machine events are
    /// currently forwarded to, outermost first.
    pub fn active_path(&self) -> Vec<&str> {
        let mut path = vec![self.name.as_str()];
        let mut machine = self;
        while let Some(nested) = machine.active_nested() {
            path.push(nested.name());
            machine = nested;
        }
        path
    }

    /// Whether a timer is armed or expired but not applied yet, here or in
    /// the active nested machine.
    pub fn has_pending_timeout(&self) -> bool {
        let own = self
            .armed_timeout
            .and_then(|index| self.states[self.current.0].transitions.get(index))
            .is_some_and(Transition::timer_active);
        own || self
            .active_nested()
            .is_some_and(|nested| nested.has_pending_timeout())
    }

    /// Labels of every event some transition of this machine reacts to.
    pub fn accepted_events(&self) -> BTreeSet<&str> {
        self.states
            .iter()
            .flat_map(|state| state.transitions.iter())
            .flat_map(|transition| transition.accepted_events())
            .collect()
    }

    pub(crate) fn initial_accepted_events(&self) -> BTreeSet<&str> {
        self.states
            .first()
            .into_iter()
            .flat_map(|state| state.transitions.iter())
            .flat_map(|transition| transition.accepted_events())
            .collect()
    }

    /// First transition of `"init"` that accepts the event.
    pub(crate) fn initial_transition(&self, event: &E) -> Option<&Transition<E>> {
        self.states
            .first()?
            .transitions
            .iter()
            .find(|transition| transition.accept(Some(event)))
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    fn nested_machines_mut(&mut self) -> impl Iterator<Item = &mut Fsm<E>> + '_ {
        self.states
            .iter_mut()
            .flat_map(|state| state.transitions.iter_mut())
            .filter_map(Transition::nested_mut)
    }

    fn nested_at(&mut self, state: StateId, index: usize) -> Option<&mut Fsm<E>> {
        self.states
            .get_mut(state.0)?
            .transitions
            .get_mut(index)?
            .nested_mut()
    }

    fn dispatch(&mut self, event: &E) -> Dispatch {
        match self.delegate {
            Some(index) => self.forward(index, event),
            None => self.scan(event),
        }
    }

    fn scan(&mut self, event: &E) -> Dispatch {
        let source = self.current;
        let count = self.states[source.0].transitions.len();

        for index in 0..count {
            match self.states[source.0].transitions[index].evaluate(event) {
                Match::No => {}
                Match::Rejected => return Dispatch::Rejected,
                Match::Fire => {
                    self.fire(index, Some(event), Trigger::Event);
                    return Dispatch::Consumed;
                }
                Match::Delegate => return self.delegate_to(index, event),
            }
        }
        Dispatch::Ignored
    }

    fn delegate_to(&mut self, index: usize, event: &E) -> Dispatch {
        self.disarm_timeout();
        self.delegate = Some(index);
        if let Some(nested) = self.active_nested() {
            debug!(fsm = %self.name, nested = %nested.name(), "delegating to nested machine");
        }

        let dispatch = self.forward(index, event);
        let idle = self
            .active_nested()
            .is_some_and(|nested| nested.current == StateId::INIT && !nested.is_finished());
        if idle {
            self.delegate = None;
            self.arm_timeout();
        }
        dispatch
    }

    fn forward(&mut self, index: usize, event: &E) -> Dispatch {
        let state = self.current;
        let (dispatch, progressed) = match self.nested_at(state, index) {
            Some(nested) => {
                let before = nested.changes;
                let dispatch = nested.dispatch(event);
                (dispatch, nested.changes != before)
            }
            None => return Dispatch::Ignored,
        };

        if self.conclude_delegate(index, Some(event)) {
            return Dispatch::Consumed;
        }
        if progressed {
            self.nested_updated(Some(event));
        }
        dispatch
    }

    /// The active nested machine changed state without finishing.
    fn nested_updated(&mut self, event: Option<&E>) {
        if !self.started {
            return;
        }
        trace!(fsm = %self.name, "nested machine progressed");
        let result = self
            .handlers
            .iter_mut()
            .try_for_each(|handler| handler.on_updating(event));
        if let Err(cancellation) = result {
            warn!(fsm = %self.name, reason = %cancellation.reason(), "update vetoed");
            self.cancel(cancellation);
        }
    }

    /// React to a finished nested machine. Returns whether it had finished.
    fn conclude_delegate(&mut self, index: usize, event: Option<&E>) -> bool {
        let source = self.current;
        let Some((outcome, nested_name)) = self
            .nested_at(source, index)
            .map(|nested| (nested.outcome, nested.name.clone()))
        else {
            return false;
        };

        match outcome {
            None => false,
            Some(Outcome::Completed) => {
                debug!(fsm = %self.name, nested = %nested_name, "nested machine completed");
                self.delegate = None;
                self.fire(index, event, Trigger::SubFsm);
                if let Some(nested) = self.nested_at(source, index) {
                    nested.reset();
                }
                true
            }
            Some(Outcome::Cancelled) => {
                self.delegate = None;
                if let Some(nested) = self.nested_at(source, index) {
                    nested.reset();
                }
                self.cancel(Cancellation::new(format!(
                    "nested machine '{nested_name}' was cancelled"
                )));
                true
            }
        }
    }

    fn apply_timeouts(&mut self) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        match self.delegate {
            Some(index) => self.apply_nested_timeouts(index),
            None => self.apply_own_timeout(),
        }
    }

    fn apply_nested_timeouts(&mut self, index: usize) -> bool {
        let source = self.current;
        let fired = match self.nested_at(source, index) {
            Some(nested) => nested.apply_timeouts(),
            None => false,
        };
        if fired && !self.conclude_delegate(index, None) {
            self.nested_updated(None);
        }
        fired
    }

    fn apply_own_timeout(&mut self) -> bool {
        let Some(index) = self.armed_timeout else {
            return false;
        };
        let source = self.current;
        if !self.states[source.0].transitions[index].take_fired() {
            return false;
        }
        self.armed_timeout = None;

        debug!(fsm = %self.name, state = %self.states[source.0].name, "timeout fired");
        if self.started {
            for handler in &mut self.handlers {
                handler.on_timeout();
            }
        }
        self.fire(index, None, Trigger::Timeout);
        true
    }

    /// Exit the current state, run the action, enter the target. A
    /// cancellation at any step aborts the rest and cancels the machine.
    fn fire(&mut self, index: usize, event: Option<&E>, trigger: Trigger) {
        let source = self.current;
        let target = self.states[source.0].transitions[index].target;

        let result = self
            .exit_state(source)
            .and_then(|()| self.states[source.0].transitions[index].run_action(event))
            .and_then(|()| self.enter_state(target, event, trigger));

        if let Err(cancellation) = result {
            warn!(
                fsm = %self.name,
                from = %self.states[source.0].name,
                to = %self.states[target.0].name,
                reason = %cancellation.reason(),
                "transition cancelled"
            );
            self.cancel(cancellation);
        }
    }

    fn exit_state(&mut self, source: StateId) -> ActionResult {
        self.disarm_timeout();
        self.abandon_delegate();
        if source == StateId::INIT && self.starting_state == StateId::INIT && !self.started {
            self.start()?;
        }
        Ok(())
    }

    fn enter_state(&mut self, target: StateId, event: Option<&E>, trigger: Trigger) -> ActionResult {
        if target == self.starting_state && !self.started {
            self.start()?;
        }
        self.set_current(target, trigger);

        match self.states[target.0].kind {
            StateKind::Initial | StateKind::Standard => {
                self.arm_timeout();
                if self.started {
                    for handler in &mut self.handlers {
                        handler.on_updating(event)?;
                    }
                }
            }
            StateKind::Terminal => {
                self.outcome = Some(Outcome::Completed);
                debug!(fsm = %self.name, state = %self.states[target.0].name, "machine completed");
                if self.started {
                    for handler in &mut self.handlers {
                        handler.on_terminating()?;
                    }
                }
            }
            StateKind::Cancelling => {
                self.outcome = Some(Outcome::Cancelled);
                debug!(fsm = %self.name, state = %self.states[target.0].name, "machine cancelled");
                self.recycler.clear();
                self.notify_cancelling();
            }
        }
        Ok(())
    }

    fn start(&mut self) -> ActionResult {
        self.started = true;
        debug!(fsm = %self.name, "machine started");
        for handler in &mut self.handlers {
            handler.on_starting()?;
        }
        Ok(())
    }

    /// Move to the cancelled outcome, entering the first cancelling state
    /// when the machine declares one.
    fn cancel(&mut self, cancellation: Cancellation) {
        self.disarm_timeout();
        self.abandon_delegate();
        if self.outcome == Some(Outcome::Cancelled) {
            return;
        }

        debug!(fsm = %self.name, reason = %cancellation.reason(), "machine cancelled");
        let cancelling = self
            .states
            .iter()
            .position(|state| state.kind == StateKind::Cancelling)
            .map(StateId);
        if let Some(state) = cancelling {
            if state != self.current {
                self.set_current(state, Trigger::Cancellation);
            }
        }
        self.outcome = Some(Outcome::Cancelled);
        self.recycler.clear();
        self.notify_cancelling();
    }

    fn notify_cancelling(&mut self) {
        if self.started {
            for handler in &mut self.handlers {
                handler.on_cancelling();
            }
        }
    }

    fn set_current(&mut self, target: StateId, trigger: Trigger) {
        let change = StateChange {
            from: self.states[self.current.0].name.clone(),
            to: self.states[target.0].name.clone(),
            trigger,
            timestamp: Utc::now(),
        };
        self.current = target;
        self.changes += 1;

        trace!(fsm = %self.name, from = %change.from, to = %change.to, ?trigger, "state changed");
        for observer in &mut self.observers {
            observer(&change);
        }
        self.history.record(change);
    }

    fn arm_timeout(&mut self) {
        let state = self.current;
        let Some(index) = self.states[state.0]
            .transitions
            .iter()
            .position(Transition::is_timeout)
        else {
            return;
        };

        let notifier = self.notifier.clone();
        if self.states[state.0].transitions[index].arm(notifier) {
            trace!(fsm = %self.name, state = %self.states[state.0].name, "timeout armed");
            self.armed_timeout = Some(index);
        }
    }

    fn disarm_timeout(&mut self) {
        if let Some(index) = self.armed_timeout.take() {
            let state = self.current;
            self.states[state.0].transitions[index].disarm();
        }
    }

    fn abandon_delegate(&mut self) {
        if let Some(index) = self.delegate.take() {
            let state = self.current;
            if let Some(nested) = self.nested_at(state, index) {
                nested.reset();
            }
        }
    }

    /// Reset once finished when configured to, unless nested.
    fn settle(&mut self) {
        if self.outcome.is_some() && self.config.auto_reset && !self.inner {
            self.reset();
        }
    }
}

impl<E> fmt::Debug for Fsm<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("name", &self.name)
            .field("current", &self.current_state_name())
            .field("started", &self.started)
            .field("outcome", &self.outcome)
            .field("inner", &self.inner)
            .field("states", &self.states.len())
            .finish()
    }
}
