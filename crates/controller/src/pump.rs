//! Async event pump.
//!
//! Owns a controller and feeds it from a channel of targeted events while
//! sleeping on the pending delay timer. The timer is tracked against tokio's
//! clock, so paused-time tests behave the same as real time.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

use dragline_common::error::{DraglineError, DraglineResult};
use dragline_gesture_model::event::PointerEvent;

use crate::controller::{EventTarget, GestureController, TimerToken};

/// A pointer event addressed to a target.
#[derive(Debug, Clone)]
pub struct PumpEvent {
    pub target: EventTarget,
    pub event: PointerEvent,
}

/// Sending half handed to the host's input handlers.
#[derive(Debug, Clone)]
pub struct PumpSender {
    tx: mpsc::UnboundedSender<PumpEvent>,
}

impl PumpSender {
    pub fn send(&self, target: EventTarget, event: PointerEvent) -> DraglineResult<()> {
        self.tx
            .send(PumpEvent { target, event })
            .map_err(|_| DraglineError::pump("event pump has stopped"))
    }
}

/// Counters reported when the pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub events: u64,
    pub timers_fired: u64,
}

/// Drives a controller from a channel until every sender is dropped.
pub struct EventPump<T> {
    controller: GestureController<T>,
    rx: mpsc::UnboundedReceiver<PumpEvent>,
    armed: Option<(TimerToken, Instant)>,
    stats: PumpStats,
}

impl<T: Clone + std::fmt::Debug> EventPump<T> {
    /// Wrap `controller` and return the pump with its sender.
    pub fn new(controller: GestureController<T>) -> (Self, PumpSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pump = Self {
            controller,
            rx,
            armed: None,
            stats: PumpStats::default(),
        };
        (pump, PumpSender { tx })
    }

    /// Process events until the channel closes. A gesture still in progress
    /// at that point is canceled, since nothing can end it anymore.
    pub async fn run(&mut self) -> PumpStats {
        tracing::info!("Event pump started");

        loop {
            self.rearm();

            let deadline = self.armed.map(|(_, at)| at);
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(PumpEvent { target, mut event }) => {
                        self.controller.dispatch(target, &mut event);
                        self.stats.events += 1;
                    }
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((token, _)) = self.armed.take() {
                        if self.controller.fire_timer(token) {
                            self.stats.timers_fired += 1;
                        }
                    }
                }
            }
        }

        if self.controller.interrupt() {
            tracing::warn!("Event channel closed during a gesture, canceled it");
        }

        tracing::info!(
            events = self.stats.events,
            timers_fired = self.stats.timers_fired,
            "Event pump stopped"
        );
        self.stats
    }

    /// Track the controller's current timer on tokio's clock.
    fn rearm(&mut self) {
        let pending = self.controller.pending_timer();
        match (pending, self.armed) {
            (None, _) => self.armed = None,
            (Some(token), Some((armed, _))) if armed == token => {}
            (Some(token), _) => {
                let remaining = self
                    .controller
                    .pending_deadline()
                    .map(|deadline| deadline.saturating_sub(self.controller.now_ms()))
                    .unwrap_or(0);
                self.armed = Some((token, Instant::now() + Duration::from_millis(remaining)));
            }
        }
    }

    pub fn controller(&self) -> &GestureController<T> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GestureController<T> {
        &mut self.controller
    }

    pub fn into_controller(self) -> GestureController<T> {
        self.controller
    }
}
