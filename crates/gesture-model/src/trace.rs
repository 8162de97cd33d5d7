//! Recorded pointer traces.
//!
//! A trace is JSONL: an optional `# {header}` first line naming the surfaces,
//! then one timestamped, targeted event per line:
//!
//! ```text
//! # {"schema_version":"1.0","surfaces":[{"subject":"card-1","delay_ms":80}]}
//! {"t":0,"target":{"surface":0},"type":"mouse_down","x":0,"y":0}
//! {"t":120,"target":"document","type":"mouse_move","x":10,"y":4}
//! {"t":140,"target":"document","type":"mouse_up","x":10,"y":4}
//! ```

use serde::{Deserialize, Serialize};

use dragline_common::config::DragConfig;
use dragline_common::error::{DraglineError, DraglineResult};

use crate::event::{PointerEvent, PointerKind};

/// Where an event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceTarget {
    /// Document/window level; only seen by global listeners.
    Document,
    /// An attached surface, by index into the header's surface list.
    Surface(usize),
}

/// A single pointer event with its delivery time and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Clock milliseconds at delivery.
    #[serde(rename = "t")]
    pub timestamp_ms: u64,

    pub target: TraceTarget,

    #[serde(flatten)]
    pub kind: PointerKind,
}

impl TimedEvent {
    pub fn new(timestamp_ms: u64, target: TraceTarget, event: PointerEvent) -> Self {
        Self {
            timestamp_ms,
            target,
            kind: event.kind().clone(),
        }
    }

    /// A fresh handler-facing event.
    pub fn to_event(&self) -> PointerEvent {
        self.kind.clone().into()
    }
}

/// A draggable surface declared by a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSurface {
    /// Subject handed to observers when this surface is dragged.
    pub subject: String,

    /// Per-surface delay override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,

    /// Per-surface threshold override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detach_threshold: Option<f64>,
}

impl TraceSurface {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            delay_ms: None,
            detach_threshold: None,
        }
    }

    /// Apply this surface's overrides on top of `base`.
    pub fn resolve(&self, base: DragConfig) -> DragConfig {
        DragConfig {
            delay_ms: self.delay_ms.unwrap_or(base.delay_ms),
            detach_threshold: self.detach_threshold.unwrap_or(base.detach_threshold),
            ..base
        }
    }
}

/// Trace metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Surfaces that `TraceTarget::Surface` indices refer to.
    pub surfaces: Vec<TraceSurface>,
}

impl Default for TraceHeader {
    /// A single surface named `surface-0`, for hand-written traces.
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            surfaces: vec![TraceSurface::new("surface-0")],
        }
    }
}

/// A parsed trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub header: TraceHeader,
    pub events: Vec<TimedEvent>,
}

impl Trace {
    /// Time of the last event, or 0 for an empty trace.
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map(|e| e.timestamp_ms).unwrap_or(0)
    }
}

/// Parse a JSONL trace.
///
/// Rejects unknown surface indices and timestamps that go backwards.
pub fn parse_trace(jsonl: &str) -> DraglineResult<Trace> {
    let mut header = None;
    let mut events: Vec<TimedEvent> = Vec::new();

    for (idx, raw) in jsonl.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if header.is_none() && events.is_empty() {
                let parsed: TraceHeader = serde_json::from_str(comment.trim())
                    .map_err(|e| DraglineError::trace(line_no, format!("bad header: {e}")))?;
                header = Some(parsed);
            }
            continue;
        }

        let event: TimedEvent = serde_json::from_str(line)
            .map_err(|e| DraglineError::trace(line_no, e.to_string()))?;

        if let Some(prev) = events.last() {
            if event.timestamp_ms < prev.timestamp_ms {
                return Err(DraglineError::trace(
                    line_no,
                    format!(
                        "timestamp {} is earlier than previous {}",
                        event.timestamp_ms, prev.timestamp_ms
                    ),
                ));
            }
        }
        if let TraceTarget::Surface(index) = event.target {
            // Headerless traces get the single default surface.
            let known = header
                .as_ref()
                .map(|h: &TraceHeader| h.surfaces.len())
                .unwrap_or(1);
            if index >= known {
                return Err(DraglineError::trace(
                    line_no,
                    format!("unknown surface {index} ({known} declared)"),
                ));
            }
        }
        events.push(event);
    }

    Ok(Trace {
        header: header.unwrap_or_default(),
        events,
    })
}

/// Serialize a trace to JSONL, header first.
pub fn serialize_trace(trace: &Trace) -> Result<String, serde_json::Error> {
    let mut output = format!("# {}\n", serde_json::to_string(&trace.header)?);
    for event in &trace.events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
