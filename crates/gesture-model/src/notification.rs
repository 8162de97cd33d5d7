//! Gesture notifications delivered to observers.
//!
//! Observers receive a [`GestureEvent`] that borrows from the controller's
//! live state; it is only valid for the duration of the callback. Anything
//! that needs to outlive the call should be converted into a
//! [`RecordedNotification`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Signed displacement from the gesture's starting position, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub x: f64,
    pub y: f64,
}

impl Delta {
    pub const ZERO: Delta = Delta { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Lifecycle phase of the controller's gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Pointer is down but neither the delay nor the threshold has triggered.
    Pending,
    /// Drag confirmed; moves are reported.
    Dragging,
}

impl GesturePhase {
    /// Whether a gesture is in progress.
    pub fn is_active(self) -> bool {
        self != GesturePhase::Idle
    }
}

/// A notification emitted by the gesture controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent<'a, T> {
    /// The drag started or the pointer moved while dragging.
    Drag { subject: &'a T, delta: Delta },
    /// The gesture ended. `canceled` is set when it was interrupted rather
    /// than released.
    Drop {
        subject: &'a T,
        delta: Delta,
        canceled: bool,
    },
}

impl<'a, T> GestureEvent<'a, T> {
    pub fn kind(&self) -> NotificationKind {
        match self {
            GestureEvent::Drag { .. } => NotificationKind::Drag,
            GestureEvent::Drop { .. } => NotificationKind::Drop,
        }
    }

    pub fn subject(&self) -> &'a T {
        match self {
            GestureEvent::Drag { subject, .. } | GestureEvent::Drop { subject, .. } => *subject,
        }
    }

    pub fn delta(&self) -> Delta {
        match self {
            GestureEvent::Drag { delta, .. } | GestureEvent::Drop { delta, .. } => *delta,
        }
    }

    /// True only for a drop that was interrupted.
    pub fn is_canceled(&self) -> bool {
        matches!(self, GestureEvent::Drop { canceled: true, .. })
    }
}

/// Read-only view of the controller's gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSnapshot<'a, T> {
    /// Present iff a gesture is in progress.
    pub subject: Option<&'a T>,
    pub delta: Delta,
    pub canceled: bool,
}

/// Notification type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Drag,
    Drop,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Drag => f.write_str("drag"),
            NotificationKind::Drop => f.write_str("drop"),
        }
    }
}

/// An owned, timestamped copy of a notification, as written to logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedNotification {
    /// Clock milliseconds at emission.
    #[serde(rename = "t")]
    pub timestamp_ms: u64,

    #[serde(rename = "type")]
    pub kind: NotificationKind,

    /// Display form of the gesture subject.
    pub subject: String,

    pub dx: f64,
    pub dy: f64,

    #[serde(default, skip_serializing_if = "is_false")]
    pub canceled: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RecordedNotification {
    /// Capture a live notification.
    pub fn capture<T: fmt::Display>(timestamp_ms: u64, event: &GestureEvent<'_, T>) -> Self {
        let delta = event.delta();
        Self {
            timestamp_ms,
            kind: event.kind(),
            subject: event.subject().to_string(),
            dx: delta.x,
            dy: delta.y,
            canceled: event.is_canceled(),
        }
    }

    pub fn delta(&self) -> Delta {
        Delta::new(self.dx, self.dy)
    }
}

impl fmt::Display for RecordedNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}ms {} {} ({}, {})",
            self.timestamp_ms, self.kind, self.subject, self.dx, self.dy
        )?;
        if self.canceled {
            f.write_str(" canceled")?;
        }
        Ok(())
    }
}

/// Metadata written as the first line of a notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLogHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time the log was started (RFC 3339).
    pub started_at: String,

    /// Name of whatever produced the notifications (trace path, pump, ...).
    pub source: String,
}

impl NotificationLogHeader {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            source: source.into(),
        }
    }
}

/// Parse notifications from JSONL content, skipping `#` header lines.
pub fn parse_notifications(jsonl: &str) -> Result<Vec<RecordedNotification>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}
