use dragline_common::config::DragConfig;
use dragline_common::error::DraglineError;
use dragline_controller::source::ScriptedSource;
use dragline_controller::TraceReplayer;
use dragline_gesture_model::event::PointerEvent;
use dragline_gesture_model::notification::{GesturePhase, NotificationKind};
use dragline_gesture_model::trace::{parse_trace, TimedEvent, TraceHeader, TraceTarget};

const MOUSE_TRACE: &str = r#"# {"schema_version":"1.0","surfaces":[{"subject":"card-1","delay_ms":80},{"subject":"card-2","detach_threshold":3}]}
{"t":0,"target":{"surface":0},"type":"mouse_down","x":0,"y":0}
{"t":120,"target":"document","type":"mouse_move","x":10,"y":4}
{"t":140,"target":"document","type":"mouse_up","x":10,"y":4}
{"t":200,"target":{"surface":1},"type":"mouse_down","x":50,"y":50}
{"t":205,"target":"document","type":"mouse_move","x":51,"y":51}
{"t":210,"target":"document","type":"mouse_move","x":52,"y":52}
{"t":215,"target":"document","type":"context_menu","x":52,"y":52}
"#;

fn replay(jsonl: &str) -> dragline_controller::ReplaySummary {
    let trace = parse_trace(jsonl).unwrap();
    let source = ScriptedSource::from_trace("test", &trace);
    let mut replayer = TraceReplayer::new(&trace.header, DragConfig::default(), Box::new(source));
    replayer.run().unwrap()
}

#[test]
fn replays_mouse_trace_with_surface_overrides() {
    let summary = replay(MOUSE_TRACE);
    let n = &summary.notifications;

    assert_eq!(summary.events, 7);
    assert_eq!(summary.final_phase, GesturePhase::Idle);
    assert_eq!(n.len(), 5);

    // card-1: timer fires at its own 80ms deadline
    assert_eq!(n[0].kind, NotificationKind::Drag);
    assert_eq!((n[0].timestamp_ms, n[0].subject.as_str()), (80, "card-1"));
    assert_eq!((n[1].dx, n[1].dy), (10.0, 4.0));
    assert_eq!(n[2].kind, NotificationKind::Drop);
    assert!(!n[2].canceled);

    // card-2: threshold 3 crossed by the second move, then canceled
    assert_eq!((n[3].timestamp_ms, n[3].subject.as_str()), (210, "card-2"));
    assert_eq!((n[3].dx, n[3].dy), (2.0, 2.0));
    assert_eq!(n[4].kind, NotificationKind::Drop);
    assert!(n[4].canceled);
}

#[test]
fn trailing_timer_fires_after_last_event() {
    let summary = replay(r#"{"t":10,"target":{"surface":0},"type":"mouse_down","x":1,"y":1}"#);

    assert_eq!(summary.final_phase, GesturePhase::Dragging);
    assert_eq!(summary.notifications.len(), 1);
    assert_eq!(summary.notifications[0].timestamp_ms, 60);
    assert_eq!(summary.notifications[0].subject, "surface-0");
}

#[test]
fn touch_moves_during_gesture_are_prevented() {
    let trace = r#"{"t":0,"target":{"surface":0},"type":"touch_start","touches":[{"id":1,"x":0,"y":0}],"changed_touches":[{"id":1,"x":0,"y":0}]}
{"t":10,"target":"document","type":"touch_move","touches":[{"id":1,"x":1,"y":0}],"changed_touches":[{"id":1,"x":1,"y":0}]}
{"t":90,"target":"document","type":"touch_move","touches":[{"id":1,"x":5,"y":-2}],"changed_touches":[{"id":1,"x":5,"y":-2}]}
{"t":100,"target":"document","type":"touch_end","touches":[],"changed_touches":[{"id":1,"x":5,"y":-2}]}
{"t":120,"target":"document","type":"touch_move","touches":[{"id":2,"x":9,"y":9}],"changed_touches":[{"id":2,"x":9,"y":9}]}
"#;
    let summary = replay(trace);

    assert_eq!(summary.prevented_defaults, 2);
    let kinds: Vec<_> = summary.notifications.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::Drag, NotificationKind::Drag, NotificationKind::Drop]
    );
    assert_eq!(summary.notifications[1].delta().x, 5.0);
}

#[test]
fn unknown_surface_is_a_replay_error() {
    let source = ScriptedSource::new(
        "bad",
        vec![TimedEvent::new(
            0,
            TraceTarget::Surface(3),
            PointerEvent::mouse_down(0.0, 0.0),
        )],
    );
    let mut replayer =
        TraceReplayer::new(&TraceHeader::default(), DragConfig::default(), Box::new(source));

    assert!(matches!(replayer.run(), Err(DraglineError::Replay { .. })));
}
