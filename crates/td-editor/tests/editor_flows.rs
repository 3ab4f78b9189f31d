//! Integration tests: pointer / keyboard input → editor → scene + history.
//!
//! Drives `Editor` the way the browser host does and checks the resulting
//! scene, history and event stream.

use pretty_assertions::assert_eq;
use td_core::{Element, ElementId, ManualClock, Placement, Point, Rect, Size};
use td_editor::{Editor, EditorEvent, Gesture, InputEvent, Modifiers, ShortcutAction};

// ─── Helpers ─────────────────────────────────────────────────────────────

fn editor() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    Editor::with_clock(Default::default(), Box::new(ManualClock::new(0)))
}

fn add(editor: &mut Editor, name: &str, rect: Rect) -> ElementId {
    let id = editor
        .add_element(Element::new(
            ElementId::intern(name),
            "Click to edit",
            rect.origin(),
            rect.size(),
        ))
        .expect("add failed");
    editor.clear_selection();
    editor.drain_events();
    id
}

fn drag(editor: &mut Editor, from: Point, to: Point) {
    editor.handle(&InputEvent::pointer_down(from.x, from.y, Modifiers::NONE));
    let steps = 10;
    for i in 1..=steps {
        let t = f64::from(i) / f64::from(steps);
        let p = from.lerp(to, t);
        editor.handle(&InputEvent::pointer_move(p.x, p.y, Modifiers::NONE));
    }
    editor.handle(&InputEvent::pointer_up(to.x, to.y, Modifiers::NONE));
}

fn rect_of(editor: &Editor, id: ElementId) -> Rect {
    editor.scene().element(id).unwrap().rect()
}

// ─── Gestures ────────────────────────────────────────────────────────────

#[test]
fn whole_drag_is_one_history_step() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_drag", Rect::new(100.0, 100.0, 300.0, 180.0));
    let len = editor.scene().history_len();

    drag(&mut editor, Point::new(150.0, 120.0), Point::new(200.0, 150.0));

    assert_eq!(editor.scene().element(id).unwrap().position, Point::new(150.0, 130.0));
    assert_eq!(editor.scene().history_len(), len + 1);
    assert_eq!(*editor.gesture(), Gesture::Idle);

    assert!(editor.undo());
    assert_eq!(editor.scene().element(id).unwrap().position, Point::new(100.0, 100.0));
}

#[test]
fn resize_via_se_grip_clamps_to_minimum() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_resize", Rect::new(10.0, 10.0, 70.0, 50.0));
    editor.select(id, false);

    drag(&mut editor, Point::new(70.0, 50.0), Point::new(20.0, 30.0));

    assert_eq!(rect_of(&editor, id), Rect::new(10.0, 10.0, 60.0, 40.0));
    let el = editor.scene().element(id).unwrap();
    assert_eq!(el.size, Size::new(50.0, 30.0));
}

#[test]
fn drag_past_the_edge_stays_inside_canvas() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_edge", Rect::new(1600.0, 900.0, 1800.0, 980.0));
    drag(&mut editor, Point::new(1650.0, 920.0), Point::new(2400.0, 1400.0));
    assert_eq!(rect_of(&editor, id), Rect::new(1720.0, 1000.0, 1920.0, 1080.0));
}

#[test]
fn locked_element_ignores_drag_and_delete() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_locked", Rect::new(100.0, 100.0, 300.0, 180.0));
    editor.select(id, false);
    assert!(editor.set_locked_selected(true));
    let len = editor.scene().history_len();

    drag(&mut editor, Point::new(150.0, 120.0), Point::new(400.0, 400.0));
    let out = editor.key("Delete", Modifiers::NONE);

    assert_eq!(out.action, Some(ShortcutAction::DeleteSelected));
    assert!(!out.changed);
    assert_eq!(rect_of(&editor, id), Rect::new(100.0, 100.0, 300.0, 180.0));
    assert_eq!(editor.scene().history_len(), len);
}

// ─── Edit sessions ───────────────────────────────────────────────────────

#[test]
fn escape_discards_typed_text() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_escape", Rect::new(100.0, 100.0, 300.0, 180.0));
    let len = editor.scene().history_len();

    editor.handle(&InputEvent::DoubleClick { x: 150.0, y: 120.0 });
    assert_eq!(editor.scene().editing(), Some(id));
    editor.edit_input("Hello");
    let out = editor.key("Escape", Modifiers::NONE);

    assert!(out.prevent_default);
    assert_eq!(editor.scene().element(id).unwrap().text, "Click to edit");
    assert_eq!(editor.scene().history_len(), len);
    assert_eq!(editor.scene().editing(), None);
    // Escape ended the session; it did not also clear the selection.
    assert_eq!(editor.scene().selection(), &[id]);
}

#[test]
fn blur_commits_typed_text() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_blur", Rect::new(100.0, 100.0, 300.0, 180.0));
    editor.begin_edit(id);
    editor.edit_input("Hello");
    editor.handle(&InputEvent::Blur);
    assert_eq!(editor.scene().element(id).unwrap().text, "Hello");
    let events = editor.drain_events();
    assert!(events.contains(&EditorEvent::EditEnded {
        id,
        committed: true
    }));
}

#[test]
fn pressing_empty_canvas_commits_the_session_and_deselects() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_canvas", Rect::new(100.0, 100.0, 300.0, 180.0));
    editor.begin_edit(id);
    editor.edit_input("Done");
    editor.pointer_down(Point::new(1000.0, 800.0), Modifiers::NONE);
    editor.pointer_up();
    assert_eq!(editor.scene().element(id).unwrap().text, "Done");
    assert!(editor.scene().selection().is_empty());
    assert!(editor.session().is_none());
}

#[test]
fn editing_element_refuses_drag() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_edit_drag", Rect::new(100.0, 100.0, 300.0, 180.0));
    editor.begin_edit(id);
    drag(&mut editor, Point::new(150.0, 120.0), Point::new(300.0, 300.0));
    assert_eq!(rect_of(&editor, id), Rect::new(100.0, 100.0, 300.0, 180.0));
    assert!(editor.session().is_some());
}

// ─── Shortcuts ───────────────────────────────────────────────────────────

#[test]
fn create_duplicate_delete_then_undo_three_times() {
    let mut editor = editor();
    let before = editor.scene().snapshot();

    let original = editor
        .add_text(None, Placement::at(Point::new(100.0, 100.0)))
        .unwrap();
    let out = editor.key("d", Modifiers::CMD);
    assert_eq!(out.action, Some(ShortcutAction::Duplicate));
    let copy = editor.scene().primary_selection().unwrap();
    assert_ne!(copy, original);

    editor.select(original, false);
    editor.key("Backspace", Modifiers::NONE);
    assert!(!editor.scene().contains(original));

    for _ in 0..3 {
        assert!(editor.key("z", Modifiers::CMD).changed);
    }
    assert_eq!(editor.scene().snapshot(), before);
    assert!(!editor.key("z", Modifiers::CMD).changed);

    // Cmd+Shift+Z walks forward again.
    assert!(editor.key("Z", Modifiers::CMD_SHIFT).changed);
    assert!(editor.scene().contains(original));
}

#[test]
fn bring_to_front_keeps_relative_order_of_selection() {
    let mut editor = editor();
    let a = add(&mut editor, "flow_z_a", Rect::new(0.0, 0.0, 100.0, 50.0));
    let b = add(&mut editor, "flow_z_b", Rect::new(0.0, 0.0, 100.0, 50.0));
    let c = add(&mut editor, "flow_z_c", Rect::new(0.0, 0.0, 100.0, 50.0));
    editor.select(a, false);
    editor.select(b, true);
    let len = editor.scene().history_len();

    editor.key("]", Modifiers::CMD);

    let order: Vec<_> = editor.scene().elements_by_z().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![c, a, b]);
    assert_eq!(editor.scene().history_len(), len + 1);
}

#[test]
fn escape_outside_session_clears_selection() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_esc_sel", Rect::new(0.0, 0.0, 100.0, 50.0));
    editor.select(id, false);
    let out = editor.key("Escape", Modifiers::NONE);
    assert_eq!(out.action, Some(ShortcutAction::ClearSelection));
    assert!(editor.scene().selection().is_empty());
}

#[test]
fn select_all_then_nudge_moves_everything_once() {
    let mut editor = editor();
    let a = add(&mut editor, "flow_all_a", Rect::new(10.0, 10.0, 110.0, 60.0));
    let b = add(&mut editor, "flow_all_b", Rect::new(300.0, 300.0, 400.0, 350.0));
    editor.key("a", Modifiers::CMD);
    let len = editor.scene().history_len();
    editor.key("ArrowDown", Modifiers::NONE);
    assert_eq!(editor.scene().element(a).unwrap().position, Point::new(10.0, 11.0));
    assert_eq!(editor.scene().element(b).unwrap().position, Point::new(300.0, 301.0));
    assert_eq!(editor.scene().history_len(), len + 1);
}

#[test]
fn zoom_shortcuts_change_viewport_only() {
    let mut editor = editor();
    let len = editor.scene().history_len();
    assert!(editor.key("=", Modifiers::CMD).changed);
    assert!((editor.scene().viewport().zoom() - 1.2).abs() < 1e-9);
    assert!(editor.key("0", Modifiers::CMD).changed);
    assert_eq!(editor.scene().viewport().zoom(), 1.0);
    assert_eq!(editor.scene().history_len(), len);
}

#[test]
fn events_serialize_for_the_host() {
    let mut editor = editor();
    let id = add(&mut editor, "flow_events", Rect::new(100.0, 100.0, 300.0, 180.0));
    editor.begin_edit(id);
    let events = editor.drain_events();
    let json = serde_json::to_value(&events).unwrap();
    let started = json
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["type"] == "editStarted")
        .unwrap();
    assert_eq!(started["selectAll"], serde_json::json!(true));
    assert_eq!(started["id"], serde_json::json!("flow_events"));
}
