//! Integration tests: tree restructuring and property edits (td-editor).
//!
//! Reparenting must be atomic — a control has exactly one owner at every
//! observable point — and property/array edits must round-trip through
//! undo at arbitrary nesting depths.

use pretty_assertions::assert_eq;
use serde_json::json;
use td_core::{
    Control, ControlId, ControlKind, Layout, Length, Position, Size, create_control, locate,
};
use td_editor::{ArrayAction, Command, CommandError, EditorSession};

fn ctl(id: &str, kind: ControlKind, x: f64, y: f64) -> Control {
    let mut control = create_control(kind, (x, y));
    control.id = ControlId::intern(id);
    control
}

/// `[fire, cluster(group)[existing]]` in the default set.
fn session_with_group() -> EditorSession {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut layout = Layout::new("tree tests");
    layout
        .active_set_mut()
        .push(ctl("fire", ControlKind::Button, 10.0, 10.0));
    let mut cluster = ctl("cluster", ControlKind::Group, 400.0, 100.0);
    cluster.size = Size::px(200.0, 150.0);
    cluster.controls = Some(vec![ctl("existing", ControlKind::Button, 5.0, 5.0)]);
    layout.active_set_mut().push(cluster);
    EditorSession::new(layout)
}

/// How many times an id occurs anywhere in the document. The ownership
/// invariant says this is 0 or 1, always.
fn occurrences(layout: &Layout, id: ControlId) -> usize {
    fn count(controls: &[Control], id: ControlId) -> usize {
        controls
            .iter()
            .map(|c| usize::from(c.id == id) + count(c.children(), id))
            .sum()
    }
    layout.control_sets.values().map(|set| count(set, id)).sum()
}

// ─── Reparenting ─────────────────────────────────────────────────────────

#[test]
fn move_to_group_is_exclusive_and_preserves_size() {
    let mut session = session_with_group();
    let fire = ControlId::intern("fire");
    let cluster = ControlId::intern("cluster");

    let command = Command::move_to_group(
        session.layout(),
        fire,
        cluster,
        Position::at_px(20.0, 30.0),
    )
    .expect("both endpoints resolve");
    session.execute_command(command);

    assert_eq!(occurrences(session.layout(), fire), 1);
    let location = locate(session.layout(), fire).unwrap();
    assert_eq!(location.parent, Some(cluster));
    assert_eq!(location.depth, 1);

    let moved = session.layout().control(fire).unwrap();
    assert_eq!(moved.position.left, Some(Length::Px(20.0)));
    // The group-relative position replaced the old one; size is intact.
    assert_eq!(moved.size, Size::px(80.0, 80.0));
}

#[test]
fn move_to_group_undo_restores_original_slot() {
    let mut session = session_with_group();
    let before = session.layout().clone();
    let fire = ControlId::intern("fire");

    let command = Command::move_to_group(
        session.layout(),
        fire,
        ControlId::intern("cluster"),
        Position::at_px(20.0, 30.0),
    )
    .unwrap();
    session.execute_command(command);
    session.undo();

    assert_eq!(session.layout(), &before);
    let location = locate(session.layout(), fire).unwrap();
    assert_eq!(location.index, 0);
    assert_eq!(location.parent, None);
}

#[test]
fn move_to_group_survives_undo_redo_cycles() {
    let mut session = session_with_group();
    let fire = ControlId::intern("fire");
    let command = Command::move_to_group(
        session.layout(),
        fire,
        ControlId::intern("cluster"),
        Position::at_px(20.0, 30.0),
    )
    .unwrap();
    session.execute_command(command);

    for _ in 0..3 {
        session.undo();
        assert_eq!(locate(session.layout(), fire).unwrap().parent, None);
        session.redo();
        assert_eq!(
            locate(session.layout(), fire).unwrap().parent,
            Some(ControlId::intern("cluster"))
        );
        assert_eq!(occurrences(session.layout(), fire), 1);
    }
}

#[test]
fn move_to_group_construction_fails_fast() {
    let session = session_with_group();
    let err = Command::move_to_group(
        session.layout(),
        ControlId::intern("fire"),
        ControlId::intern("fire"),
        Position::at_px(0.0, 0.0),
    )
    .unwrap_err();
    assert_eq!(err, CommandError::NotAGroup(ControlId::intern("fire")));

    // Nothing was mutated by the failed construction.
    assert_eq!(occurrences(session.layout(), ControlId::intern("fire")), 1);
}

#[test]
fn group_cannot_be_moved_into_its_own_subtree() {
    let mut session = session_with_group();
    // Give the cluster a nested group child.
    let mut inner = ctl("inner", ControlKind::Group, 0.0, 0.0);
    inner.controls = Some(Vec::new());
    session.execute_command(Command::update_array(
        ControlId::intern("cluster"),
        "controls",
        ArrayAction::Add {
            item: serde_json::to_value(&inner).unwrap(),
        },
    ));

    let err = Command::move_to_group(
        session.layout(),
        ControlId::intern("cluster"),
        ControlId::intern("inner"),
        Position::at_px(0.0, 0.0),
    )
    .unwrap_err();
    assert_eq!(
        err,
        CommandError::CyclicReparent {
            control: ControlId::intern("cluster"),
            group: ControlId::intern("inner"),
        }
    );
}

// ─── Property updates ────────────────────────────────────────────────────

#[test]
fn update_property_roundtrips_scalar_fields() {
    let mut session = session_with_group();
    let fire = ControlId::intern("fire");

    let command =
        Command::update_property(session.layout(), fire, "label", json!("Primary fire"));
    session.execute_command(command);
    assert_eq!(
        session.layout().control(fire).unwrap().label,
        "Primary fire"
    );

    session.undo();
    assert_eq!(session.layout().control(fire).unwrap().label, "button");
}

#[test]
fn update_property_creates_intermediate_objects() {
    let mut session = session_with_group();
    let fire = ControlId::intern("fire");
    let before = session.layout().clone();

    let command = Command::update_property(
        session.layout(),
        fire,
        "mapping.combo.hold",
        json!(true),
    );
    session.execute_command(command);
    assert_eq!(
        session.layout().control(fire).unwrap().mapping,
        json!({"combo": {"hold": true}})
    );

    // The path did not exist before; undo restores its absence.
    session.undo();
    assert_eq!(session.layout(), &before);
}

#[test]
fn update_property_style_entry() {
    let mut session = session_with_group();
    let fire = ControlId::intern("fire");

    let command = Command::update_property(
        session.layout(),
        fire,
        "style.backgroundColor",
        json!("#FF5722"),
    );
    session.execute_command(command);
    assert_eq!(
        session
            .layout()
            .control(fire)
            .unwrap()
            .style
            .get("backgroundColor")
            .map(String::as_str),
        Some("#FF5722")
    );

    session.undo();
    assert!(
        session
            .layout()
            .control(fire)
            .unwrap()
            .style
            .is_empty()
    );
}

#[test]
fn update_property_cooldown() {
    let mut session = session_with_group();
    let fire = ControlId::intern("fire");

    let command = Command::update_property(session.layout(), fire, "cooldown", json!(1.5));
    session.execute_command(command);
    assert_eq!(session.layout().control(fire).unwrap().cooldown, Some(1.5));

    session.undo();
    assert_eq!(session.layout().control(fire).unwrap().cooldown, None);
}

// ─── Array updates ───────────────────────────────────────────────────────

fn session_with_radial() -> EditorSession {
    let mut layout = Layout::new("radial tests");
    let mut wheel = ctl("wheel", ControlKind::Radial, 100.0, 100.0);
    wheel.buttons = Some(Vec::new());
    layout.active_set_mut().push(wheel);
    EditorSession::new(layout)
}

fn wheel_labels(session: &EditorSession) -> Vec<String> {
    session
        .layout()
        .control(ControlId::intern("wheel"))
        .and_then(|c| c.buttons.as_ref())
        .map(|buttons| buttons.iter().map(|b| b.label.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn array_add_remove_update_roundtrip() {
    let mut session = session_with_radial();
    let wheel = ControlId::intern("wheel");

    session.execute_command(Command::update_array(
        wheel,
        "buttons",
        ArrayAction::Add {
            item: json!({"label": "Wave", "angle": 0.0}),
        },
    ));
    session.execute_command(Command::update_array(
        wheel,
        "buttons",
        ArrayAction::Add {
            item: json!({"label": "Dance", "angle": 180.0}),
        },
    ));
    assert_eq!(wheel_labels(&session), vec!["Wave", "Dance"]);

    session.execute_command(Command::update_array(
        wheel,
        "buttons",
        ArrayAction::Update {
            index: 0,
            item: json!({"label": "Salute", "angle": 0.0, "action": {"emote": "salute"}}),
        },
    ));
    assert_eq!(wheel_labels(&session), vec!["Salute", "Dance"]);

    session.execute_command(Command::update_array(
        wheel,
        "buttons",
        ArrayAction::Remove { index: 0 },
    ));
    assert_eq!(wheel_labels(&session), vec!["Dance"]);

    // Walk the whole stack back.
    session.undo();
    assert_eq!(wheel_labels(&session), vec!["Salute", "Dance"]);
    session.undo();
    assert_eq!(wheel_labels(&session), vec!["Wave", "Dance"]);
    session.undo();
    assert_eq!(wheel_labels(&session), vec!["Wave"]);
    session.undo();
    assert_eq!(wheel_labels(&session), Vec::<String>::new());
}

#[test]
fn array_edit_on_unresolved_path_is_a_noop() {
    let mut session = session_with_radial();
    let before = session.layout().clone();

    session.execute_command(Command::update_array(
        ControlId::intern("wheel"),
        "mapping.slots",
        ArrayAction::Remove { index: 0 },
    ));
    session.undo();
    assert_eq!(session.layout(), &before);
}

#[test]
fn array_edit_can_manage_group_children() {
    let mut session = session_with_group();
    let cluster = ControlId::intern("cluster");
    let new_child = ctl("added", ControlKind::Button, 12.0, 12.0);

    session.execute_command(Command::update_array(
        cluster,
        "controls",
        ArrayAction::Add {
            item: serde_json::to_value(&new_child).unwrap(),
        },
    ));
    assert_eq!(
        locate(session.layout(), ControlId::intern("added"))
            .unwrap()
            .parent,
        Some(cluster)
    );

    session.undo();
    assert!(session.layout().control(ControlId::intern("added")).is_none());
}
