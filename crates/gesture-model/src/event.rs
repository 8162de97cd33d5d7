//! Pointer input events delivered by the host platform.
//!
//! The host is an opaque source of mouse and touch notifications. Each event
//! carries enough data to resolve a single device-pixel position and records
//! whether a handler asked the host to suppress its default action.

use serde::{Deserialize, Serialize};

/// A position in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to `self`.
    pub fn offset_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// A single contact point in a touch list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Platform identifier of the contact.
    #[serde(default)]
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Which kind of device produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Mouse,
    Touch,
}

/// What an event means to the gesture controller, independent of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    /// Mouse button pressed or touch started.
    Down,
    /// Pointer moved.
    Move,
    /// Mouse button released or touch ended.
    Up,
    /// The platform aborted the touch sequence.
    Cancel,
    /// A context menu was requested.
    ContextMenu,
}

/// Discriminated union of raw pointer events.
///
/// Touch events carry two lists: `touches` holds every contact still on the
/// surface, `changed_touches` holds the contacts this event is about (for
/// end/cancel these are the contacts that just left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerKind {
    MouseDown {
        x: f64,
        y: f64,
    },
    MouseMove {
        x: f64,
        y: f64,
    },
    MouseUp {
        x: f64,
        y: f64,
    },
    ContextMenu {
        x: f64,
        y: f64,
    },
    TouchStart {
        #[serde(default)]
        touches: Vec<TouchPoint>,
        #[serde(default)]
        changed_touches: Vec<TouchPoint>,
    },
    TouchMove {
        #[serde(default)]
        touches: Vec<TouchPoint>,
        #[serde(default)]
        changed_touches: Vec<TouchPoint>,
    },
    TouchEnd {
        #[serde(default)]
        touches: Vec<TouchPoint>,
        #[serde(default)]
        changed_touches: Vec<TouchPoint>,
    },
    TouchCancel {
        #[serde(default)]
        touches: Vec<TouchPoint>,
        #[serde(default)]
        changed_touches: Vec<TouchPoint>,
    },
}

impl PointerKind {
    /// Device that produced this event.
    pub fn source(&self) -> InputSource {
        match self {
            PointerKind::MouseDown { .. }
            | PointerKind::MouseMove { .. }
            | PointerKind::MouseUp { .. }
            | PointerKind::ContextMenu { .. } => InputSource::Mouse,
            _ => InputSource::Touch,
        }
    }

    /// Source-independent meaning of this event.
    pub fn action(&self) -> PointerAction {
        match self {
            PointerKind::MouseDown { .. } | PointerKind::TouchStart { .. } => PointerAction::Down,
            PointerKind::MouseMove { .. } | PointerKind::TouchMove { .. } => PointerAction::Move,
            PointerKind::MouseUp { .. } | PointerKind::TouchEnd { .. } => PointerAction::Up,
            PointerKind::TouchCancel { .. } => PointerAction::Cancel,
            PointerKind::ContextMenu { .. } => PointerAction::ContextMenu,
        }
    }

    fn touch_lists(&self) -> Option<(&[TouchPoint], &[TouchPoint])> {
        match self {
            PointerKind::TouchStart {
                touches,
                changed_touches,
            }
            | PointerKind::TouchMove {
                touches,
                changed_touches,
            }
            | PointerKind::TouchEnd {
                touches,
                changed_touches,
            }
            | PointerKind::TouchCancel {
                touches,
                changed_touches,
            } => Some((touches, changed_touches)),
            _ => None,
        }
    }

    /// Resolve the event position.
    ///
    /// Mouse events use their own coordinates. Touch events use the first
    /// active touch, falling back to the first changed touch; with both
    /// lists empty the position is undefined.
    pub fn position(&self) -> Option<Point> {
        match self {
            PointerKind::MouseDown { x, y }
            | PointerKind::MouseMove { x, y }
            | PointerKind::MouseUp { x, y }
            | PointerKind::ContextMenu { x, y } => Some(Point::new(*x, *y)),
            _ => {
                let (touches, changed) = self.touch_lists()?;
                touches
                    .first()
                    .or_else(|| changed.first())
                    .map(TouchPoint::position)
            }
        }
    }

    /// Number of contacts still on the surface (always 0 for mouse events).
    pub fn active_touch_count(&self) -> usize {
        self.touch_lists()
            .map(|(touches, _)| touches.len())
            .unwrap_or(0)
    }
}

/// A pointer event as seen by handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    kind: PointerKind,
    default_prevented: bool,
}

impl From<PointerKind> for PointerEvent {
    fn from(kind: PointerKind) -> Self {
        Self {
            kind,
            default_prevented: false,
        }
    }
}

impl PointerEvent {
    pub fn mouse_down(x: f64, y: f64) -> Self {
        PointerKind::MouseDown { x, y }.into()
    }

    pub fn mouse_move(x: f64, y: f64) -> Self {
        PointerKind::MouseMove { x, y }.into()
    }

    pub fn mouse_up(x: f64, y: f64) -> Self {
        PointerKind::MouseUp { x, y }.into()
    }

    pub fn context_menu(x: f64, y: f64) -> Self {
        PointerKind::ContextMenu { x, y }.into()
    }

    /// Touch start where `touches` are all contacts now on the surface and
    /// the last one is the new contact.
    pub fn touch_start(touches: Vec<TouchPoint>) -> Self {
        let changed_touches = touches.last().copied().into_iter().collect();
        PointerKind::TouchStart {
            touches,
            changed_touches,
        }
        .into()
    }

    pub fn touch_move(touches: Vec<TouchPoint>) -> Self {
        PointerKind::TouchMove {
            changed_touches: touches.clone(),
            touches,
        }
        .into()
    }

    /// Touch end where `ended` left the surface and nothing remains.
    pub fn touch_end(ended: Vec<TouchPoint>) -> Self {
        PointerKind::TouchEnd {
            touches: Vec::new(),
            changed_touches: ended,
        }
        .into()
    }

    /// Touch cancel where `canceled` were aborted by the platform.
    pub fn touch_cancel(canceled: Vec<TouchPoint>) -> Self {
        PointerKind::TouchCancel {
            touches: Vec::new(),
            changed_touches: canceled,
        }
        .into()
    }

    pub fn kind(&self) -> &PointerKind {
        &self.kind
    }

    pub fn source(&self) -> InputSource {
        self.kind.source()
    }

    pub fn action(&self) -> PointerAction {
        self.kind.action()
    }

    pub fn position(&self) -> Option<Point> {
        self.kind.position()
    }

    pub fn active_touch_count(&self) -> usize {
        self.kind.active_touch_count()
    }

    /// Ask the host to skip its default handling (e.g. native scrolling).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_position_uses_event_coordinates() {
        let event = PointerEvent::mouse_move(12.0, -3.5);
        assert_eq!(event.position(), Some(Point::new(12.0, -3.5)));
        assert_eq!(event.source(), InputSource::Mouse);
        assert_eq!(event.active_touch_count(), 0);
    }

    #[test]
    fn test_touch_position_prefers_active_touches() {
        let event: PointerEvent = PointerKind::TouchMove {
            touches: vec![TouchPoint::new(1, 5.0, 6.0), TouchPoint::new(2, 9.0, 9.0)],
            changed_touches: vec![TouchPoint::new(2, 9.0, 9.0)],
        }
        .into();
        assert_eq!(event.position(), Some(Point::new(5.0, 6.0)));
        assert_eq!(event.active_touch_count(), 2);
    }

    #[test]
    fn test_touch_end_falls_back_to_changed_touches() {
        let event = PointerEvent::touch_end(vec![TouchPoint::new(1, 7.0, 8.0)]);
        assert_eq!(event.position(), Some(Point::new(7.0, 8.0)));
        assert_eq!(event.action(), PointerAction::Up);
    }

    #[test]
    fn test_touch_without_points_has_no_position() {
        let event = PointerEvent::touch_cancel(vec![]);
        assert_eq!(event.position(), None);
        assert_eq!(event.action(), PointerAction::Cancel);
    }

    #[test]
    fn test_touch_start_marks_last_contact_as_changed() {
        let event =
            PointerEvent::touch_start(vec![TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 4.0, 4.0)]);
        match event.kind() {
            PointerKind::TouchStart {
                changed_touches, ..
            } => assert_eq!(changed_touches, &vec![TouchPoint::new(2, 4.0, 4.0)]),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_prevent_default_is_sticky() {
        let mut event = PointerEvent::touch_move(vec![TouchPoint::new(1, 0.0, 0.0)]);
        assert!(!event.default_prevented());
        event.prevent_default();
        assert!(event.default_prevented());
    }

    #[test]
    fn test_json_format() {
        let kind = PointerKind::MouseDown { x: 1.5, y: 2.0 };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"type\":\"mouse_down\""));

        let parsed: PointerKind =
            serde_json::from_str(r#"{"type":"touch_end","changed_touches":[{"x":1,"y":2}]}"#)
                .unwrap();
        assert_eq!(parsed.position(), Some(Point::new(1.0, 2.0)));
    }
}
