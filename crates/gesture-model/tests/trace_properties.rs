use proptest::prelude::*;

use dragline_common::error::DraglineError;
use dragline_gesture_model::event::{PointerEvent, TouchPoint};
use dragline_gesture_model::trace::{parse_trace, TimedEvent, TraceTarget};

fn move_line(t: u64) -> String {
    let event = TimedEvent::new(t, TraceTarget::Document, PointerEvent::mouse_move(1.0, 2.0));
    serde_json::to_string(&event).unwrap()
}

proptest! {
    #[test]
    fn non_decreasing_timestamps_parse(mut times in proptest::collection::vec(0u64..10_000, 0..30)) {
        times.sort_unstable();
        let jsonl: Vec<String> = times.iter().map(|t| move_line(*t)).collect();
        let trace = parse_trace(&jsonl.join("\n")).unwrap();

        prop_assert_eq!(trace.events.len(), times.len());
        prop_assert_eq!(trace.duration_ms(), times.last().copied().unwrap_or(0));
        prop_assert_eq!(trace.header.surfaces.len(), 1);
    }

    #[test]
    fn backwards_timestamp_reports_its_line(
        prefix in proptest::collection::vec(0u64..1_000, 0..10),
        drop_by in 1u64..500,
    ) {
        let mut times = prefix;
        times.sort_unstable();
        let last = times.last().copied().unwrap_or(0) + drop_by;
        times.push(last);
        times.push(last - drop_by);

        let jsonl: Vec<String> = times.iter().map(|t| move_line(*t)).collect();
        match parse_trace(&jsonl.join("\n")) {
            Err(DraglineError::Trace { line, .. }) => prop_assert_eq!(line, times.len()),
            other => prop_assert!(false, "expected trace error, got {:?}", other),
        }
    }

    #[test]
    fn touch_position_is_first_active_contact(
        contacts in proptest::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..5),
    ) {
        let touches: Vec<TouchPoint> = contacts
            .iter()
            .enumerate()
            .map(|(id, (x, y))| TouchPoint::new(id as u64, *x, *y))
            .collect();
        let event = PointerEvent::touch_move(touches.clone());

        prop_assert_eq!(event.position(), Some(touches[0].position()));
        prop_assert_eq!(event.active_touch_count(), touches.len());
    }
}
