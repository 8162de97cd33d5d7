//! The gesture state machine.
//!
//! | Phase    | Event                                   | Next     | Notification        |
//! | -------- | --------------------------------------- | -------- | ------------------- |
//! | Idle     | down on attached surface                | Pending  | -                   |
//! | Idle     | anything else                           | Idle     | -                   |
//! | Pending  | timer fires                             | Dragging | drag                |
//! | Pending  | move reaching the threshold             | Dragging | drag                |
//! | Pending  | move below the threshold                | Pending  | -                   |
//! | Pending  | up / touch end                          | Idle     | -                   |
//! | Dragging | move                                    | Dragging | drag                |
//! | Dragging | up / touch end                          | Idle     | drop                |
//! | active   | context menu, touch cancel, second touch, new down | Idle | drop (canceled) |
//!
//! Every path back to Idle goes through the same reset, which restores the
//! document's selection styles and clears the pending timer.

use std::collections::BTreeMap;
use std::fmt;

use dragline_common::clock::{Clock, MonotonicClock, TimestampMs};
use dragline_common::config::{DragConfig, ThresholdMetric, DEFAULT_DETACH_THRESHOLD};
use dragline_gesture_model::event::{InputSource, Point, PointerAction, PointerEvent};
use dragline_gesture_model::notification::{Delta, GestureEvent, GesturePhase, GestureSnapshot};

use crate::observer::{Observer, Observers, SubscriptionId};
use crate::selection::{suppress_selection, Document, InMemoryDocument, SavedSelection};

/// An attached draggable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceHandle(u64);

/// Installed document-level listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalListeners(u64);

/// Identifies one armed delay timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Where the host delivered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// Document/window level.
    Document,
    /// An attached surface. The event also bubbles to the document.
    Surface(SurfaceHandle),
}

struct Surface<T> {
    subject: T,
    config: DragConfig,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    token: TimerToken,
    deadline_ms: TimestampMs,
}

/// Gesture state owned by one controller.
struct GestureState<T> {
    phase: GesturePhase,
    subject: Option<T>,
    delta: Delta,
    canceled: bool,
    initial: Option<Point>,
    current: Option<Point>,
    timer: Option<PendingTimer>,
    threshold: f64,
    metric: ThresholdMetric,
    saved_selection: Option<SavedSelection>,
}

impl<T> GestureState<T> {
    fn idle() -> Self {
        Self {
            phase: GesturePhase::Idle,
            subject: None,
            delta: Delta::ZERO,
            canceled: false,
            initial: None,
            current: None,
            timer: None,
            threshold: DEFAULT_DETACH_THRESHOLD,
            metric: ThresholdMetric::default(),
            saved_selection: None,
        }
    }

    fn reset(&mut self, document: &mut dyn Document) {
        if let Some(saved) = self.saved_selection.take() {
            saved.restore(document);
        }
        *self = Self::idle();
    }

    fn current_delta(&self) -> Delta {
        match (self.initial, self.current) {
            (Some(initial), Some(current)) => {
                let (dx, dy) = current.offset_from(initial);
                Delta::new(dx, dy)
            }
            _ => Delta::ZERO,
        }
    }
}

/// Resets the gesture when dropped, so cleanup also runs while a panicking
/// observer unwinds.
struct ResetOnDrop<'a, T> {
    state: &'a mut GestureState<T>,
    document: &'a mut Box<dyn Document>,
}

impl<T> Drop for ResetOnDrop<'_, T> {
    fn drop(&mut self) {
        self.state.reset(&mut **self.document);
    }
}

/// Recognizes drag gestures on attached surfaces and notifies observers.
///
/// One gesture at most is active per controller. Controllers share nothing,
/// so independent instances never interfere.
pub struct GestureController<T> {
    state: GestureState<T>,
    document: Box<dyn Document>,
    clock: Box<dyn Clock>,
    observers: Observers<T>,
    surfaces: BTreeMap<SurfaceHandle, Surface<T>>,
    global: Option<GlobalListeners>,
    next_id: u64,
}

impl<T: Clone + fmt::Debug> GestureController<T> {
    /// Create a controller over a host document and clock.
    pub fn new(document: Box<dyn Document>, clock: Box<dyn Clock>) -> Self {
        Self {
            state: GestureState::idle(),
            document,
            clock,
            observers: Observers::default(),
            surfaces: BTreeMap::new(),
            global: None,
            next_id: 0,
        }
    }

    /// Controller with an in-memory document and a monotonic clock.
    pub fn with_defaults() -> Self {
        Self::new(
            Box::new(InMemoryDocument::new()),
            Box::new(MonotonicClock::start()),
        )
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // ---- wiring ----

    /// Install the document-level listeners that observe moves, releases and
    /// interruptions. Calling it again returns the already installed set.
    pub fn init(&mut self) -> GlobalListeners {
        if let Some(listeners) = self.global {
            return listeners;
        }
        let listeners = GlobalListeners(self.next_id());
        self.global = Some(listeners);
        tracing::debug!("Global pointer listeners installed");
        listeners
    }

    /// Remove the document-level listeners. An active gesture could no
    /// longer finish, so it is canceled first. Returns false if `listeners`
    /// is not installed (e.g. already torn down).
    pub fn teardown(&mut self, listeners: GlobalListeners) -> bool {
        if self.global != Some(listeners) {
            return false;
        }
        self.cancel("teardown");
        self.global = None;
        tracing::debug!("Global pointer listeners removed");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.global.is_some()
    }

    /// Make a surface draggable. `config` is read once, here.
    pub fn attach(&mut self, subject: T, config: DragConfig) -> SurfaceHandle {
        let handle = SurfaceHandle(self.next_id());
        tracing::debug!(
            surface = handle.0,
            ?subject,
            delay_ms = config.delay_ms,
            threshold = config.detach_threshold,
            "Surface attached"
        );
        self.surfaces.insert(handle, Surface { subject, config });
        handle
    }

    /// Stop listening for pointer-down on a surface. A gesture already
    /// started from it continues. Returns false if it was already detached.
    pub fn detach(&mut self, handle: SurfaceHandle) -> bool {
        let removed = self.surfaces.remove(&handle).is_some();
        if removed {
            tracing::debug!(surface = handle.0, "Surface detached");
        }
        removed
    }

    pub fn surface_subject(&self, handle: SurfaceHandle) -> Option<&T> {
        self.surfaces.get(&handle).map(|s| &s.subject)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    // ---- observation ----

    /// Subscribe a closure to drag/drop notifications.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&GestureEvent<'_, T>) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    /// Subscribe an [`Observer`] implementation.
    pub fn subscribe_observer(&mut self, observer: impl Observer<T> + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Returns false if `id` was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // ---- introspection ----

    pub fn phase(&self) -> GesturePhase {
        self.state.phase
    }

    pub fn snapshot(&self) -> GestureSnapshot<'_, T> {
        GestureSnapshot {
            subject: self.state.subject.as_ref(),
            delta: self.state.delta,
            canceled: self.state.canceled,
        }
    }

    /// Clock time at which the pending timer is due.
    pub fn pending_deadline(&self) -> Option<TimestampMs> {
        self.state.timer.map(|t| t.deadline_ms)
    }

    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.state.timer.map(|t| t.token)
    }

    pub fn now_ms(&self) -> TimestampMs {
        self.clock.now_ms()
    }

    pub fn document(&self) -> &dyn Document {
        &*self.document
    }

    // ---- input ----

    /// Deliver a host event.
    ///
    /// Surface events run the surface's pointer-down listener and then bubble
    /// to the document-level listeners, if installed.
    pub fn dispatch(&mut self, target: EventTarget, event: &mut PointerEvent) {
        if let EventTarget::Surface(handle) = target {
            if event.action() == PointerAction::Down {
                self.on_surface_down(handle, event);
            }
        }
        if self.global.is_some() {
            self.on_document_event(event);
        }
    }

    /// Abort the active gesture on behalf of the host (focus loss, shutdown).
    /// Notifies a canceled drop; returns false when idle.
    pub fn interrupt(&mut self) -> bool {
        let active = self.state.phase.is_active();
        self.cancel("interrupted");
        active
    }

    /// Fire the pending timer if the clock has reached its deadline.
    pub fn tick(&mut self) -> bool {
        let Some(timer) = self.state.timer else {
            return false;
        };
        if self.clock.now_ms() < timer.deadline_ms {
            return false;
        }
        self.fire_timer(timer.token)
    }

    /// Fire a timer from the host's own scheduler. Stale tokens are ignored.
    pub fn fire_timer(&mut self, token: TimerToken) -> bool {
        let armed = matches!(self.state.timer, Some(t) if t.token == token);
        if !armed || self.state.phase != GesturePhase::Pending {
            return false;
        }
        self.begin_drag("delay");
        true
    }

    fn on_surface_down(&mut self, handle: SurfaceHandle, event: &PointerEvent) {
        let Some(surface) = self.surfaces.get(&handle) else {
            return;
        };
        let subject = surface.subject.clone();
        let config = surface.config;

        if self.state.phase.is_active() {
            self.cancel("pointer down during active gesture");
        }
        if event.active_touch_count() > 1 {
            tracing::debug!(surface = handle.0, "Multi-touch start ignored");
            return;
        }
        let Some(position) = event.position() else {
            tracing::debug!(surface = handle.0, "Pointer down without position ignored");
            return;
        };
        self.start(subject, config, position);
    }

    fn on_document_event(&mut self, event: &mut PointerEvent) {
        match event.action() {
            PointerAction::Move => self.on_move(event),
            PointerAction::Up => self.on_release(),
            PointerAction::Cancel => self.cancel("touch cancel"),
            PointerAction::ContextMenu => self.cancel("context menu"),
            PointerAction::Down => {
                if event.source() == InputSource::Touch && event.active_touch_count() > 1 {
                    self.cancel("second touch");
                }
            }
        }
    }

    fn start(&mut self, subject: T, config: DragConfig, position: Point) {
        let saved = suppress_selection(&mut *self.document);
        let token = TimerToken(self.next_id());
        let deadline_ms = self.clock.now_ms().saturating_add(config.delay_ms);

        tracing::debug!(
            ?subject,
            x = position.x,
            y = position.y,
            deadline_ms,
            "Gesture pending"
        );

        self.state = GestureState {
            phase: GesturePhase::Pending,
            subject: Some(subject),
            delta: Delta::ZERO,
            canceled: false,
            initial: Some(position),
            current: Some(position),
            timer: Some(PendingTimer { token, deadline_ms }),
            threshold: config.detach_threshold,
            metric: config.threshold_metric,
            saved_selection: Some(saved),
        };
    }

    fn on_move(&mut self, event: &mut PointerEvent) {
        if !self.state.phase.is_active() {
            return;
        }
        if event.source() == InputSource::Touch {
            event.prevent_default();
        }
        let Some(position) = event.position() else {
            return;
        };
        self.state.current = Some(position);

        match self.state.phase {
            GesturePhase::Pending => {
                let delta = self.state.current_delta();
                if self
                    .state
                    .metric
                    .reaches(delta.x, delta.y, self.state.threshold)
                {
                    self.begin_drag("threshold");
                }
            }
            GesturePhase::Dragging => {
                self.state.delta = self.state.current_delta();
                tracing::trace!(dx = self.state.delta.x, dy = self.state.delta.y, "Drag move");
                self.emit_drag();
            }
            GesturePhase::Idle => {}
        }
    }

    fn begin_drag(&mut self, trigger: &'static str) {
        self.state.timer = None;
        self.state.phase = GesturePhase::Dragging;
        self.state.delta = self.state.current_delta();
        tracing::debug!(
            trigger,
            dx = self.state.delta.x,
            dy = self.state.delta.y,
            "Drag started"
        );
        self.emit_drag();
    }

    fn emit_drag(&mut self) {
        if let Some(subject) = self.state.subject.as_ref() {
            self.observers.notify(&GestureEvent::Drag {
                subject,
                delta: self.state.delta,
            });
        }
    }

    fn on_release(&mut self) {
        match self.state.phase {
            GesturePhase::Idle => {}
            GesturePhase::Pending => {
                tracing::debug!("Released before drag start, discarding");
                self.state.reset(&mut *self.document);
            }
            GesturePhase::Dragging => self.finish(false),
        }
    }

    /// Abort the active gesture, if any. Always notifies a canceled drop.
    fn cancel(&mut self, reason: &'static str) {
        if !self.state.phase.is_active() {
            return;
        }
        tracing::debug!(reason, phase = ?self.state.phase, "Gesture canceled");
        self.finish(true);
    }

    /// Emit the terminal drop, then reset even if an observer panics.
    fn finish(&mut self, canceled: bool) {
        let mut guard = ResetOnDrop {
            state: &mut self.state,
            document: &mut self.document,
        };
        guard.state.canceled = canceled;

        let state: &GestureState<T> = &*guard.state;
        if let Some(subject) = state.subject.as_ref() {
            if !canceled {
                tracing::debug!(dx = state.delta.x, dy = state.delta.y, "Gesture dropped");
            }
            self.observers.notify(&GestureEvent::Drop {
                subject,
                delta: state.delta,
                canceled,
            });
        }
        drop(guard);
    }
}

impl<T> fmt::Debug for GestureController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureController")
            .field("phase", &self.state.phase)
            .field("surfaces", &self.surfaces.len())
            .field("observers", &self.observers.len())
            .field("initialized", &self.global.is_some())
            .finish()
    }
}
