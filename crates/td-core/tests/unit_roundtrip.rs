//! Integration tests: pixel ↔ responsive unit conversion (td-core).
//!
//! Exercises the whole-tree converters against the reference 812×375
//! canvas, including the nested-group percent rules and re-import error
//! bounds.

use pretty_assertions::assert_eq;
use td_core::{
    CanvasRect, Control, ControlId, ControlKind, Length, Size, create_control, layout_to_px,
    layout_to_responsive,
};

const CANVAS: CanvasRect = CanvasRect::new(812.0, 375.0);

fn px_control(id: &str, kind: ControlKind, left: f64, top: f64, w: f64, h: f64) -> Control {
    let mut control = create_control(kind, (left, top));
    control.id = ControlId::intern(id);
    control.size = Size::px(w, h);
    control
}

/// Top-level group at {100, 50} sized 200×150 with one child at {20, 40}
/// sized 50×50 relative to the group.
fn group_layout() -> td_core::Layout {
    let mut layout = td_core::Layout::new("roundtrip");
    let mut group = px_control("grp", ControlKind::Group, 100.0, 50.0, 200.0, 150.0);
    group.controls = Some(vec![px_control(
        "child",
        ControlKind::Button,
        20.0,
        40.0,
        50.0,
        50.0,
    )]);
    layout.active_set_mut().push(group);
    layout
}

#[test]
fn export_uses_vw_vh_at_top_level_and_percent_inside_groups() {
    let responsive = layout_to_responsive(&group_layout(), CANVAS);

    let group = responsive.control(ControlId::intern("grp")).unwrap();
    assert_eq!(group.position.left, Some(Length::Vw(12.32)));
    assert_eq!(group.position.top, Some(Length::Vh(13.33)));
    assert_eq!(group.size.width, Length::Vw(24.63));
    assert_eq!(group.size.height, Length::Vh(40.0));
    assert_eq!(group.size.height.to_string(), "40.00vh");

    let child = responsive.control(ControlId::intern("child")).unwrap();
    assert_eq!(child.position.left, Some(Length::Percent(10.0)));
    assert_eq!(child.position.left.unwrap().to_string(), "10.00%");
    assert_eq!(child.position.top, Some(Length::Percent(26.67)));
    assert_eq!(child.size.width, Length::Percent(25.0));
    assert_eq!(child.size.height, Length::Percent(33.33));
}

#[test]
fn reimport_reproduces_pixels_within_one_px() {
    let original = group_layout();
    let reimported = layout_to_px(&layout_to_responsive(&original, CANVAS), CANVAS);

    for id in ["grp", "child"] {
        let id = ControlId::intern(id);
        let before = original.control(id).unwrap();
        let after = reimported.control(id).unwrap();
        for (a, b) in [
            (before.position.left, after.position.left),
            (before.position.top, after.position.top),
        ] {
            let (Some(Length::Px(a)), Some(Length::Px(b))) = (a, b) else {
                panic!("expected px values on both sides");
            };
            assert!((a - b).abs() <= 1.0, "position drifted: {a} vs {b}");
        }
        let Length::Px(w) = after.size.width else {
            panic!("expected px width");
        };
        let Length::Px(h) = after.size.height else {
            panic!("expected px height");
        };
        let Length::Px(w0) = before.size.width else {
            panic!();
        };
        let Length::Px(h0) = before.size.height else {
            panic!();
        };
        assert!((w - w0).abs() <= 1.0, "width drifted: {w0} vs {w}");
        assert!((h - h0).abs() <= 1.0, "height drifted: {h0} vs {h}");
    }
}

#[test]
fn top_level_non_group_controls_also_use_viewport_units() {
    let mut layout = td_core::Layout::new("plain");
    layout
        .active_set_mut()
        .push(px_control("fire", ControlKind::Button, 406.0, 75.0, 80.0, 80.0));

    let responsive = layout_to_responsive(&layout, CANVAS);
    let fire = responsive.control(ControlId::intern("fire")).unwrap();
    assert_eq!(fire.position.left, Some(Length::Vw(50.0)));
    assert_eq!(fire.position.top, Some(Length::Vh(20.0)));
    assert_eq!(fire.size.width, Length::Vw(9.85));
    assert_eq!(fire.size.height, Length::Vh(21.33));
}

#[test]
fn nested_group_children_resolve_against_their_own_group_box() {
    // outer 400×300 at the origin; inner group 200×150 at {40, 30};
    // leaf 50×75 at {20, 15} inside the inner group.
    let mut layout = td_core::Layout::new("nested");
    let mut outer = px_control("outer", ControlKind::Group, 0.0, 0.0, 400.0, 300.0);
    let mut inner = px_control("inner", ControlKind::Group, 40.0, 30.0, 200.0, 150.0);
    inner.controls = Some(vec![px_control(
        "deep_leaf",
        ControlKind::Button,
        20.0,
        15.0,
        50.0,
        75.0,
    )]);
    outer.controls = Some(vec![inner]);
    layout.active_set_mut().push(outer);

    let responsive = layout_to_responsive(&layout, CANVAS);

    // inner is a group child → percent of outer's 400×300 box.
    let inner = responsive.control(ControlId::intern("inner")).unwrap();
    assert_eq!(inner.position.left, Some(Length::Percent(10.0)));
    assert_eq!(inner.position.top, Some(Length::Percent(10.0)));
    assert_eq!(inner.size.width, Length::Percent(50.0));
    assert_eq!(inner.size.height, Length::Percent(50.0));

    // deep_leaf resolves against inner's 200×150 box, not outer's.
    let leaf = responsive.control(ControlId::intern("deep_leaf")).unwrap();
    assert_eq!(leaf.position.left, Some(Length::Percent(10.0)));
    assert_eq!(leaf.position.top, Some(Length::Percent(10.0)));
    assert_eq!(leaf.size.width, Length::Percent(25.0));
    assert_eq!(leaf.size.height, Length::Percent(50.0));

    // And the reverse pass lands back on the original pixels (within the
    // error the two-decimal export rounding allows).
    let px = layout_to_px(&responsive, CANVAS);
    let leaf = px.control(ControlId::intern("deep_leaf")).unwrap();
    let Some(Length::Px(left)) = leaf.position.left else {
        panic!("expected px left");
    };
    let Some(Length::Px(top)) = leaf.position.top else {
        panic!("expected px top");
    };
    assert!((left - 20.0).abs() <= 1.0, "left drifted: {left}");
    assert!((top - 15.0).abs() <= 1.0, "top drifted: {top}");
}

#[test]
fn conversion_never_mutates_the_source_document() {
    let original = group_layout();
    let _ = layout_to_responsive(&original, CANVAS);
    let group = original.control(ControlId::intern("grp")).unwrap();
    assert_eq!(group.position.left, Some(Length::Px(100.0)));
}

#[test]
fn persisted_document_fixture_roundtrip() {
    let json = include_str!("fixtures/sample_layout.json");
    let layout: td_core::Layout = serde_json::from_str(json).unwrap();

    assert_eq!(layout.initial_set, "default");
    let pause = layout.control(ControlId::intern("pause_btn")).unwrap();
    assert_eq!(pause.kind, ControlKind::Button);
    assert_eq!(pause.position.anchor.to_string(), "top-right");
    assert_eq!(pause.position.right, Some(Length::Px(16.0)));
    assert_eq!(pause.cooldown, Some(0.5));

    let wheel = layout.control(ControlId::intern("emote_wheel")).unwrap();
    assert_eq!(wheel.buttons.as_ref().map(Vec::len), Some(2));
    assert_eq!(wheel.position.left.unwrap().to_string(), "calc(50% + 120px)");

    let stick = layout.control(ControlId::intern("move_stick")).unwrap();
    assert_eq!(stick.position.left, Some(Length::Vw(4.93)));

    // Re-serialize and parse again: structurally identical.
    let reparsed: td_core::Layout =
        serde_json::from_str(&serde_json::to_string(&layout).unwrap()).unwrap();
    assert_eq!(reparsed, layout);
}
