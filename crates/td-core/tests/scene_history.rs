//! Integration tests: scene actions → history → undo/redo.
//!
//! Exercises the `td-core` pipeline the editor relies on: every mutation goes
//! through `Scene::apply`, lands in history, and restores cleanly.

use pretty_assertions::assert_eq;
use td_core::geometry::{ResizeHandle, resize_from_handle, screen_delta_to_canvas_delta};
use td_core::scene::IdList;
use td_core::*;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn scene() -> (Scene, ManualClock) {
    let clock = ManualClock::new(10_000);
    (
        Scene::with_clock(EditorConfig::default(), Box::new(clock.clone())),
        clock,
    )
}

fn add_box(scene: &mut Scene, name: &str, rect: Rect) -> ElementId {
    scene
        .add(Element::new(
            ElementId::intern(name),
            "Click to edit",
            rect.origin(),
            rect.size(),
        ))
        .expect("add failed")
}

fn ids(scene: &Scene) -> Vec<ElementId> {
    scene.elements_by_z().iter().map(|e| e.id).collect()
}

// ─── Direct manipulation ─────────────────────────────────────────────────

#[test]
fn drag_by_screen_delta_at_zoom_one() {
    let (mut scene, _) = scene();
    let id = add_box(&mut scene, "it_drag", Rect::new(100.0, 100.0, 300.0, 180.0));
    let start = scene.element(id).unwrap().position;

    scene.begin_gesture();
    let delta = screen_delta_to_canvas_delta(Vec2::new(50.0, 30.0), scene.viewport().zoom());
    scene.apply(SceneAction::Move {
        id,
        position: start + delta,
    });
    assert!(scene.end_gesture());

    assert_eq!(scene.element(id).unwrap().position, Point::new(150.0, 130.0));
}

#[test]
fn resize_se_clamps_to_minimum() {
    let (mut scene, _) = scene();
    let id = add_box(&mut scene, "it_resize", Rect::new(10.0, 10.0, 70.0, 50.0));
    let start = scene.element(id).unwrap().rect();
    let rect = resize_from_handle(
        start,
        ResizeHandle::Se,
        Vec2::new(-50.0, -20.0),
        scene.config().min_size,
        scene.canvas_size(),
    );
    scene.apply(SceneAction::Resize { id, rect });

    let el = scene.element(id).unwrap();
    assert_eq!(el.size, Size::new(50.0, 30.0));
    assert_eq!(el.position, Point::new(10.0, 10.0));
}

#[test]
fn drag_never_leaves_canvas() {
    let (mut scene, _) = scene();
    let id = add_box(&mut scene, "it_bounds", Rect::new(0.0, 0.0, 200.0, 80.0));
    for target in [
        Point::new(-500.0, -500.0),
        Point::new(5000.0, 5000.0),
        Point::new(f64::NAN, 900.0),
    ] {
        scene.apply(SceneAction::Move { id, position: target });
        let el = scene.element(id).unwrap();
        assert!(el.position.x >= 0.0 && el.position.y >= 0.0);
        assert!(el.position.x + el.size.width <= 1920.0);
        assert!(el.position.y + el.size.height <= 1080.0);
    }
}

// ─── History ─────────────────────────────────────────────────────────────

#[test]
fn create_duplicate_delete_then_undo_three_times() {
    let (mut scene, _) = scene();
    let before = scene.current_snapshot().clone();

    let original = add_box(&mut scene, "it_cdd", Rect::new(100.0, 100.0, 300.0, 180.0));
    let copy = scene.duplicate(original).unwrap();
    assert!(scene.apply(SceneAction::Delete {
        ids: IdList::from_slice(&[original])
    }));
    assert_eq!(ids(&scene), vec![copy]);

    assert!(scene.undo());
    assert_eq!(ids(&scene), vec![original, copy]);
    assert!(scene.undo());
    assert_eq!(ids(&scene), vec![original]);
    assert!(scene.undo());
    assert!(scene.is_empty());
    assert!(scene.current_snapshot().same_state(&before));
    assert!(!scene.undo());
}

#[test]
fn redo_after_undo_then_commit_discards_future() {
    let (mut scene, _) = scene();
    let id = add_box(&mut scene, "it_redo", Rect::new(0.0, 0.0, 100.0, 50.0));
    scene.apply(SceneAction::SetText {
        id,
        text: "one".into(),
    });
    scene.apply(SceneAction::SetText {
        id,
        text: "two".into(),
    });

    assert!(scene.undo());
    assert_eq!(scene.element(id).unwrap().text, "one");
    assert!(scene.redo());
    assert_eq!(scene.element(id).unwrap().text, "two");

    scene.undo();
    scene.apply(SceneAction::SetText {
        id,
        text: "three".into(),
    });
    assert!(!scene.can_redo());
    assert!(!scene.redo());
    assert_eq!(scene.element(id).unwrap().text, "three");
}

#[test]
fn history_is_capped_at_fifty() {
    let (mut scene, _) = scene();
    let id = add_box(&mut scene, "it_cap", Rect::new(0.0, 0.0, 100.0, 50.0));
    for i in 1..=60 {
        scene.apply(SceneAction::SetText {
            id,
            text: format!("v{i}"),
        });
        assert!(scene.history_len() <= 50);
    }
    let mut undos = 0;
    while scene.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    // Oldest reachable state: "v11" (the add and v1..v10 were dropped).
    assert_eq!(scene.element(id).unwrap().text, "v11");
}

#[test]
fn z_index_strictly_increases_on_add_and_duplicate() {
    let (mut scene, _) = scene();
    let mut last = 0;
    let a = add_box(&mut scene, "it_z_a", Rect::new(0.0, 0.0, 100.0, 50.0));
    for id in [
        a,
        add_box(&mut scene, "it_z_b", Rect::new(0.0, 0.0, 100.0, 50.0)),
    ] {
        let z = scene.element(id).unwrap().z_index;
        assert!(z > last);
        last = z;
    }
    scene.apply(SceneAction::SendToBack { id: a });
    let copy = scene.duplicate(a).unwrap();
    let max_other = scene
        .elements_by_z()
        .iter()
        .filter(|e| e.id != copy)
        .map(|e| e.z_index)
        .max()
        .unwrap();
    assert!(scene.element(copy).unwrap().z_index > max_other);
}

#[test]
fn updated_at_tracks_the_clock() {
    let (mut scene, clock) = scene();
    let id = add_box(&mut scene, "it_clock", Rect::new(0.0, 0.0, 100.0, 50.0));
    clock.advance(2_500);
    scene.apply(SceneAction::Restyle {
        id,
        style: StyleBag::new().with("color", "#ff0000"),
    });
    let el = scene.element(id).unwrap();
    assert_eq!(el.created_at, 10_000);
    assert_eq!(el.updated_at, 12_500);
}

#[test]
fn restyle_merges_while_patch_style_replaces() {
    let (mut scene, _) = scene();
    let id = add_box(&mut scene, "it_style", Rect::new(0.0, 0.0, 100.0, 50.0));
    scene.apply(SceneAction::Restyle {
        id,
        style: StyleBag::new().with("fontSize", 32).with("color", "#fff"),
    });
    scene.apply(SceneAction::Restyle {
        id,
        style: StyleBag::new().with("color", "#000"),
    });
    assert_eq!(scene.element(id).unwrap().style.len(), 2);

    scene.apply(SceneAction::Update {
        id,
        patch: ElementPatch {
            style: Some(StyleBag::new().with("fontFamily", "Inter")),
            ..ElementPatch::default()
        },
    });
    let style = &scene.element(id).unwrap().style;
    assert_eq!(style.len(), 1);
    assert!(style.get("fontFamily").is_some());
}

#[test]
fn presets_land_on_top() {
    let (mut scene, _) = scene();
    add_box(&mut scene, "it_preset_base", Rect::new(0.0, 0.0, 100.0, 50.0));
    let bundle = PresetBundle::from_json(r#"{"sampleText": "Big Sale", "style": {"fontWeight": 800}}"#)
        .unwrap();
    let id = scene
        .instantiate_from_preset(&bundle, Placement::Center)
        .unwrap();
    assert_eq!(ids(&scene).last(), Some(&id));
    assert_eq!(scene.element(id).unwrap().text, "Big Sale");
    assert!(scene.undo());
    assert!(!scene.contains(id));
}
