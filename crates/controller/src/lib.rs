//! Dragline Gesture Controller
//!
//! Turns raw pointer input into drag gestures. A pointer-down on an attached
//! surface becomes a drag once it has been held for the surface's delay or
//! has moved past its detach threshold, whichever comes first. Observers
//! then receive a stream of deltas relative to the starting position, ended
//! by exactly one drop (released or canceled).
//!
//! Hosts feed events in one of three ways:
//!
//! - **Direct:** call [`GestureController::dispatch`] from the platform's
//!   handlers and [`GestureController::tick`] from its timer
//! - **Pump:** send events to an [`pump::EventPump`] that owns the controller
//!   and sleeps on the delay timer
//! - **Replay:** drive a controller from a recorded trace with [`TraceReplayer`]

pub mod controller;
pub mod observer;
pub mod pump;
pub mod selection;
pub mod source;
pub mod writer;

pub use controller::{EventTarget, GestureController, GlobalListeners, SurfaceHandle, TimerToken};
pub use observer::{Observer, SubscriptionId};
pub use selection::{Document, InMemoryDocument};

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use dragline_common::clock::{Clock, ManualClock};
use dragline_common::config::DragConfig;
use dragline_common::error::{DraglineError, DraglineResult};
use dragline_gesture_model::event::PointerAction;
use dragline_gesture_model::notification::{GesturePhase, RecordedNotification};
use dragline_gesture_model::trace::{TimedEvent, TraceHeader, TraceTarget};

/// Trait for sources of recorded or synthetic pointer events.
pub trait PointerSource {
    /// Poll for the next event. Returns `None` once the source is exhausted.
    fn poll(&mut self) -> DraglineResult<Option<TimedEvent>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Outcome of a replay run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Events delivered to the controller.
    pub events: u64,
    /// Touch moves whose default action was suppressed.
    pub prevented_defaults: u64,
    /// Phase after the last event and any trailing timer.
    pub final_phase: GesturePhase,
    /// Notifications in emission order.
    pub notifications: Vec<RecordedNotification>,
}

/// Replays a pointer source through a fresh controller on a manual clock.
///
/// A delay timer due before the next event fires first, stamped with its own
/// deadline, so a timer always precedes later input.
pub struct TraceReplayer {
    source: Box<dyn PointerSource>,
    controller: GestureController<String>,
    clock: ManualClock,
    surfaces: Vec<SurfaceHandle>,
    recorded: Rc<RefCell<Vec<RecordedNotification>>>,
}

impl TraceReplayer {
    /// Build a replayer for the surfaces declared in `header`, each resolved
    /// against `base`.
    pub fn new(header: &TraceHeader, base: DragConfig, source: Box<dyn PointerSource>) -> Self {
        let clock = ManualClock::new(0);
        let mut controller = GestureController::new(
            Box::new(InMemoryDocument::new()),
            Box::new(clock.clone()),
        );
        controller.init();

        let surfaces = header
            .surfaces
            .iter()
            .map(|surface| controller.attach(surface.subject.clone(), surface.resolve(base)))
            .collect();

        let recorded = Rc::new(RefCell::new(Vec::new()));
        {
            let recorded = recorded.clone();
            let clock = clock.clone();
            controller.subscribe(move |event| {
                recorded
                    .borrow_mut()
                    .push(RecordedNotification::capture(clock.now_ms(), event));
            });
        }

        Self {
            source,
            controller,
            clock,
            surfaces,
            recorded,
        }
    }

    /// Run until the source is exhausted, then let a pending timer expire.
    pub fn run(&mut self) -> DraglineResult<ReplaySummary> {
        tracing::info!(source = %self.source.name(), "Replay started");

        let mut events = 0u64;
        let mut prevented_defaults = 0u64;

        while let Some(timed) = self.source.poll()? {
            if let Some(deadline) = self.controller.pending_deadline() {
                if deadline <= timed.timestamp_ms {
                    self.clock.set(deadline);
                    self.controller.tick();
                }
            }
            self.clock.set(timed.timestamp_ms);

            let target = match timed.target {
                TraceTarget::Document => EventTarget::Document,
                TraceTarget::Surface(index) => {
                    let handle = self.surfaces.get(index).copied().ok_or_else(|| {
                        DraglineError::replay(format!(
                            "event at {}ms targets unknown surface {index}",
                            timed.timestamp_ms
                        ))
                    })?;
                    EventTarget::Surface(handle)
                }
            };

            let mut event = timed.to_event();
            self.controller.dispatch(target, &mut event);
            events += 1;
            if event.default_prevented() {
                prevented_defaults += 1;
            } else if event.action() == PointerAction::Move {
                tracing::trace!(t = timed.timestamp_ms, "Move left to host default");
            }
        }

        if let Some(deadline) = self.controller.pending_deadline() {
            self.clock.set(deadline);
            self.controller.tick();
        }

        let summary = ReplaySummary {
            events,
            prevented_defaults,
            final_phase: self.controller.phase(),
            notifications: self.recorded.borrow().clone(),
        };
        if summary.final_phase.is_active() {
            tracing::warn!(
                now_ms = self.clock.now_ms(),
                phase = ?summary.final_phase,
                "Trace ended with a gesture still in progress"
            );
        }
        tracing::info!(
            events = summary.events,
            notifications = summary.notifications.len(),
            "Replay finished"
        );
        Ok(summary)
    }

    pub fn controller(&self) -> &GestureController<String> {
        &self.controller
    }
}
