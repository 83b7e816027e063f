//! Integration tests: history through the `Studio` aggregate.
//!
//! Every completed operation records one entry; undo/redo restore whole
//! layer snapshots and prune the selection to what still exists.

use pretty_assertions::assert_eq;
use studio_core::{AlignEdge, Layer, LayerPatch, LayerType, NewLayer, Point};
use studio_editor::{AlignReference, InputEvent, Modifiers, PointerTarget, Studio};

fn descriptions(studio: &Studio) -> Vec<&str> {
    studio
        .history()
        .entries()
        .iter()
        .map(|e| e.description.as_str())
        .collect()
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn fresh_studio_has_baseline() {
    let studio = Studio::default();
    assert_eq!(descriptions(&studio), vec!["Initial state"]);
    assert!(!studio.history().can_undo());
}

#[test]
fn undo_then_redo_move() {
    let mut studio = Studio::default();
    let id = studio.add_layer(NewLayer::new(LayerType::Shape).at(0.0, 0.0));
    studio.update_layer(id, LayerPatch::x(100.0));
    assert_eq!(descriptions(&studio), vec!["Initial state", "Add shape layer", "Update layer"]);

    assert_eq!(studio.undo().as_deref(), Some("Update layer"));
    assert_eq!(studio.document().get(id).unwrap().x, 0.0);

    assert_eq!(studio.redo().as_deref(), Some("Update layer"));
    assert_eq!(studio.document().get(id).unwrap().x, 100.0);
    assert_eq!(studio.redo(), None);
}

#[test]
fn undo_prunes_selection() {
    let mut studio = Studio::default();
    let id = studio.add_layer_of(LayerType::Text);
    assert_eq!(studio.selection(), &[id]);

    studio.undo();
    assert!(studio.document().is_empty());
    assert!(studio.selection().is_empty());
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut studio = Studio::default();
    let a = studio.add_layer_of(LayerType::Shape);
    studio.update_layer(a, LayerPatch::y(10.0));
    studio.undo();
    assert!(studio.history().can_redo());

    studio.update_layer(a, LayerPatch::y(30.0));
    assert!(!studio.history().can_redo());
    assert_eq!(studio.history().len(), 3);
    assert_eq!(studio.document().get(a).unwrap().y, 30.0);
}

#[test]
fn undo_k_steps_then_edit_truncates() {
    let mut studio = Studio::default();
    let a = studio.add_layer_of(LayerType::Shape);
    for x in [10.0, 20.0, 30.0, 40.0] {
        studio.update_layer(a, LayerPatch::x(x));
    }
    let len_before = studio.history().len();
    assert_eq!(len_before, 6);

    for _ in 0..3 {
        studio.undo();
    }
    assert_eq!(studio.document().get(a).unwrap().x, 10.0);

    studio.update_layer(a, LayerPatch::x(99.0));
    assert_eq!(studio.history().len(), len_before - 3 + 1);
    assert!(!studio.history().can_redo());
    assert_eq!(studio.redo(), None);
    assert_eq!(studio.document().get(a).unwrap().x, 99.0);
}

#[test]
fn no_op_edits_are_not_recorded() {
    let mut studio = Studio::default();
    let a = studio.add_layer_of(LayerType::Shape);
    let before = studio.history().len();

    studio.update_layer(a, LayerPatch::default());
    studio.distribute_selected(studio_core::Axis::Horizontal);
    assert_eq!(studio.history().len(), before);
}

#[test]
fn jump_to_restores_any_entry() {
    let mut studio = Studio::default();
    let a = studio.add_layer_of(LayerType::Shape);
    for x in [10.0, 20.0, 30.0] {
        studio.update_layer(a, LayerPatch::x(x));
    }
    assert!(studio.jump_to(2));
    assert_eq!(studio.document().get(a).unwrap().x, 10.0);
    assert!(studio.jump_to(4));
    assert_eq!(studio.document().get(a).unwrap().x, 30.0);
    assert!(!studio.jump_to(99));
}

#[test]
fn depth_limit_discards_oldest() {
    let config = studio_editor::StudioConfig {
        history_depth: Some(3),
        ..Default::default()
    };
    let mut studio = Studio::new(config);
    for _ in 0..5 {
        studio.add_layer_of(LayerType::Shape);
    }
    assert_eq!(studio.history().len(), 3);
    assert_eq!(studio.history().current_index(), Some(2));
}

// ─── Gestures and history ───────────────────────────────────────────────

#[test]
fn drag_at_zoom_two_is_one_entry() {
    let mut studio = Studio::default();
    let id = studio.add_layer(
        NewLayer::new(LayerType::Shape)
            .at(100.0, 100.0)
            .sized(100.0, 100.0),
    );
    studio.set_zoom(2.0);
    let entries = studio.history().len();

    // Layer spans screen 200..400 at zoom 2.
    studio.handle_input(&InputEvent::down(250.0, 250.0, PointerTarget::Layer(id)));
    studio.handle_input(&InputEvent::moved(290.0, 270.0));
    studio.handle_input(&InputEvent::moved(330.0, 290.0));
    assert_eq!(studio.history().len(), entries);
    studio.handle_input(&InputEvent::up(330.0, 290.0));

    // Screen delta (80, 40) is (40, 20) in document units.
    assert_eq!(studio.document().get(id).unwrap().origin(), Point::new(140.0, 120.0));
    assert_eq!(studio.history().len(), entries + 1);

    studio.undo();
    assert_eq!(studio.document().get(id).unwrap().origin(), Point::new(100.0, 100.0));
    studio.redo();
    assert_eq!(studio.document().get(id).unwrap().origin(), Point::new(140.0, 120.0));
}

#[test]
fn mixed_operations_round_trip() {
    let mut studio = Studio::default();
    let mut states: Vec<Vec<Layer>> = vec![studio.layers().to_vec()];

    let a = studio.add_layer(NewLayer::new(LayerType::Shape).at(0.0, 0.0).sized(100.0, 100.0));
    states.push(studio.layers().to_vec());
    let b = studio.add_layer(NewLayer::new(LayerType::Shape).at(200.0, 200.0).sized(100.0, 100.0));
    states.push(studio.layers().to_vec());

    studio.handle_input(&InputEvent::down(250.0, 250.0, PointerTarget::Layer(b)));
    studio.handle_input(&InputEvent::moved(290.0, 270.0));
    studio.handle_input(&InputEvent::up(290.0, 270.0));
    assert_eq!(studio.document().get(b).unwrap().origin(), Point::new(240.0, 220.0));
    states.push(studio.layers().to_vec());

    studio.select_many([a, b]);
    studio.group_selected().unwrap();
    states.push(studio.layers().to_vec());

    assert_eq!(studio.ungroup_selected().len(), 2);
    states.push(studio.layers().to_vec());

    studio.align_selected(AlignEdge::Left, AlignReference::Selection);
    assert_eq!(studio.document().get(b).unwrap().x, 0.0);
    states.push(studio.layers().to_vec());

    let n = states.len() - 1;
    assert_eq!(studio.history().len(), n + 1);

    for i in (0..n).rev() {
        assert!(studio.undo().is_some());
        assert_eq!(studio.layers(), states[i].as_slice());
    }
    assert_eq!(studio.undo(), None);

    for i in 1..=n {
        assert!(studio.redo().is_some());
        assert_eq!(studio.layers(), states[i].as_slice());
    }
    assert_eq!(studio.redo(), None);
}

#[test]
fn click_without_move_records_nothing() {
    let mut studio = Studio::default();
    let id = studio.add_layer(NewLayer::new(LayerType::Shape).at(100.0, 100.0));
    let entries = studio.history().len();
    studio.handle_input(&InputEvent::down(150.0, 150.0, PointerTarget::Layer(id)));
    studio.handle_input(&InputEvent::up(150.0, 150.0));
    assert_eq!(studio.history().len(), entries);
}

#[test]
fn undo_shortcut_is_ignored_in_text_fields() {
    let mut studio = Studio::default();
    studio.add_layer_of(LayerType::Shape);

    let typing = InputEvent::Key(studio_editor::KeyEvent::new("z", Modifiers::CMD).in_text_input());
    studio.handle_input(&typing);
    assert_eq!(studio.document().len(), 1);

    studio.handle_input(&InputEvent::key("z", Modifiers::CMD));
    assert!(studio.document().is_empty());
}
