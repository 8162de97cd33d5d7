//! Pointer source implementations.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use dragline_common::error::{DraglineError, DraglineResult};
use dragline_gesture_model::trace::{parse_trace, TimedEvent, Trace};

use crate::PointerSource;

/// Source backed by pre-loaded events, used for replay and tests.
pub struct ScriptedSource {
    name: String,
    events: VecDeque<TimedEvent>,
}

impl ScriptedSource {
    /// Create a source with pre-loaded events.
    pub fn new(name: impl Into<String>, events: Vec<TimedEvent>) -> Self {
        Self {
            name: name.into(),
            events: events.into(),
        }
    }

    /// Create an empty source that never produces events.
    pub fn empty() -> Self {
        Self::new("empty", vec![])
    }

    /// Source over a parsed trace's events.
    pub fn from_trace(name: impl Into<String>, trace: &Trace) -> Self {
        Self::new(name, trace.events.clone())
    }

    /// Events not yet polled.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl PointerSource for ScriptedSource {
    fn poll(&mut self) -> DraglineResult<Option<TimedEvent>> {
        Ok(self.events.pop_front())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Load and parse a trace file.
pub fn load_trace(path: &Path) -> DraglineResult<Trace> {
    if !path.exists() {
        return Err(DraglineError::FileNotFound {
            path: PathBuf::from(path),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let trace = parse_trace(&content)?;
    tracing::debug!(
        path = %path.display(),
        events = trace.events.len(),
        surfaces = trace.header.surfaces.len(),
        "Trace loaded"
    );
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragline_gesture_model::event::PointerEvent;
    use dragline_gesture_model::trace::TraceTarget;

    #[test]
    fn test_scripted_source_drains_in_order() {
        let mut source = ScriptedSource::new(
            "script",
            vec![
                TimedEvent::new(0, TraceTarget::Surface(0), PointerEvent::mouse_down(0.0, 0.0)),
                TimedEvent::new(5, TraceTarget::Document, PointerEvent::mouse_up(0.0, 0.0)),
            ],
        );
        assert_eq!(source.name(), "script");
        assert_eq!(source.poll().unwrap().unwrap().timestamp_ms, 0);
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.poll().unwrap().unwrap().timestamp_ms, 5);
        assert!(source.poll().unwrap().is_none());
    }

    #[test]
    fn test_empty_source() {
        let mut source = ScriptedSource::empty();
        assert!(source.poll().unwrap().is_none());
    }

    #[test]
    fn test_load_trace_missing_file() {
        let path = std::env::temp_dir().join("dragline_missing_trace.jsonl");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            load_trace(&path),
            Err(DraglineError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_trace_from_disk() {
        let dir = std::env::temp_dir().join("dragline_test_load_trace");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("trace.jsonl");
        std::fs::write(
            &path,
            "{\"t\":0,\"target\":{\"surface\":0},\"type\":\"mouse_down\",\"x\":0,\"y\":0}\n",
        )
        .unwrap();

        let trace = load_trace(&path).unwrap();
        assert_eq!(trace.events.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
