use std::cell::RefCell;
use std::rc::Rc;

use dragline_common::clock::{Clock, ManualClock};
use dragline_common::config::DragConfig;
use dragline_controller::{EventTarget, GestureController, InMemoryDocument, SurfaceHandle};
use dragline_gesture_model::event::PointerEvent;
use dragline_gesture_model::notification::{GesturePhase, NotificationKind, RecordedNotification};

fn controller_with_log(
    document: InMemoryDocument,
    config: DragConfig,
) -> (
    GestureController<String>,
    ManualClock,
    SurfaceHandle,
    Rc<RefCell<Vec<RecordedNotification>>>,
) {
    let clock = ManualClock::new(0);
    let mut controller = GestureController::new(Box::new(document), Box::new(clock.clone()));
    controller.init();
    let surface = controller.attach("item-7".to_string(), config);

    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let stamp = clock.clone();
    controller.subscribe(move |event| {
        sink.borrow_mut()
            .push(RecordedNotification::capture(stamp.now_ms(), event));
    });

    (controller, clock, surface, log)
}

fn send(controller: &mut GestureController<String>, target: EventTarget, event: PointerEvent) {
    let mut event = event;
    controller.dispatch(target, &mut event);
}

#[test]
fn held_pointer_drags_after_delay_and_drops_on_release() {
    let (mut controller, clock, surface, log) =
        controller_with_log(InMemoryDocument::new(), DragConfig::default());

    send(&mut controller, EventTarget::Surface(surface), PointerEvent::mouse_down(0.0, 0.0));
    clock.advance(75);
    controller.tick();
    send(&mut controller, EventTarget::Document, PointerEvent::mouse_move(10.0, 4.0));
    send(&mut controller, EventTarget::Document, PointerEvent::mouse_up(10.0, 4.0));

    let log = log.borrow();
    let kinds: Vec<NotificationKind> = log.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::Drag, NotificationKind::Drag, NotificationKind::Drop]
    );
    assert_eq!((log[0].dx, log[0].dy), (0.0, 0.0));
    assert_eq!(log[0].timestamp_ms, 75);
    assert_eq!((log[1].dx, log[1].dy), (10.0, 4.0));
    assert_eq!((log[2].dx, log[2].dy, log[2].canceled), (10.0, 4.0, false));
    assert!(log.iter().all(|n| n.subject == "item-7"));
}

#[test]
fn threshold_three_waits_for_real_motion() {
    let (mut controller, clock, surface, log) = controller_with_log(
        InMemoryDocument::new(),
        DragConfig::default().with_detach_threshold(3.0),
    );

    send(&mut controller, EventTarget::Surface(surface), PointerEvent::mouse_down(0.0, 0.0));
    send(&mut controller, EventTarget::Document, PointerEvent::mouse_move(1.0, 1.0));
    assert!(log.borrow().is_empty());

    send(&mut controller, EventTarget::Document, PointerEvent::mouse_move(2.0, 2.0));
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].delta().x, 2.0);
    assert_eq!(controller.pending_deadline(), None);

    clock.advance(1_000);
    assert!(!controller.tick());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn custom_selection_style_survives_a_gesture() {
    let document = InMemoryDocument::new()
        .with_style("user-select", "contain")
        .with_style("-webkit-user-select", "text");
    let (mut controller, clock, surface, _log) =
        controller_with_log(document, DragConfig::default());

    send(&mut controller, EventTarget::Surface(surface), PointerEvent::mouse_down(3.0, 3.0));
    assert_eq!(
        controller.document().style_property("user-select").as_deref(),
        Some("none")
    );
    clock.advance(50);
    controller.tick();
    send(&mut controller, EventTarget::Document, PointerEvent::mouse_up(3.0, 3.0));

    assert_eq!(
        controller.document().style_property("user-select").as_deref(),
        Some("contain")
    );
    assert_eq!(
        controller
            .document()
            .style_property("-webkit-user-select")
            .as_deref(),
        Some("text")
    );
}

#[test]
fn context_menu_during_drag_cancels() {
    let (mut controller, clock, surface, log) =
        controller_with_log(InMemoryDocument::new(), DragConfig::default());

    send(&mut controller, EventTarget::Surface(surface), PointerEvent::mouse_down(0.0, 0.0));
    clock.advance(50);
    controller.tick();
    send(&mut controller, EventTarget::Document, PointerEvent::mouse_move(-8.0, 2.0));
    send(&mut controller, EventTarget::Surface(surface), PointerEvent::context_menu(-8.0, 2.0));

    let last = log.borrow().last().cloned().unwrap();
    assert_eq!(last.kind, NotificationKind::Drop);
    assert!(last.canceled);
    assert_eq!(last.delta().x, -8.0);
    assert_eq!(controller.phase(), GesturePhase::Idle);
}

#[test]
fn controllers_do_not_share_state() {
    let (mut first, first_clock, first_surface, first_log) =
        controller_with_log(InMemoryDocument::new(), DragConfig::default());
    let (mut second, _second_clock, _second_surface, second_log) =
        controller_with_log(InMemoryDocument::new(), DragConfig::default());

    send(&mut first, EventTarget::Surface(first_surface), PointerEvent::mouse_down(0.0, 0.0));
    first_clock.advance(50);
    first.tick();
    send(&mut second, EventTarget::Document, PointerEvent::mouse_up(0.0, 0.0));

    assert_eq!(first.phase(), GesturePhase::Dragging);
    assert_eq!(second.phase(), GesturePhase::Idle);
    assert_eq!(first_log.borrow().len(), 1);
    assert!(second_log.borrow().is_empty());
}
