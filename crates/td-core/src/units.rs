//! Pixel ↔ responsive-unit conversion.
//!
//! Interactive editing works in absolute canvas pixels; persistence stores
//! responsive units — vw/vh of the canvas for top-level controls, percent
//! of the owning group's box for nested children. The scalar converters
//! and the two whole-tree passes here are the only places that unit policy
//! lives.
//!
//! The core never measures anything: the caller supplies the canvas box
//! (and, transitively, each group's box is derived from it).

use crate::model::{Anchor, Control, HAnchor, Layout, Position, VAnchor};
use crate::value::Length;

/// A pixel box: the canvas itself, or one group's resolved extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasRect {
    fn default() -> Self {
        // The reference canvas the stock layouts were authored against.
        Self::new(812.0, 375.0)
    }
}

/// Which axis a length applies to; decides the container dimension that
/// percentages and centering expressions resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// An absolute pixel rectangle, as produced by drag/resize gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PxRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ─── Scalar conversions ──────────────────────────────────────────────────

/// Pixels → vw of the given total width, rounded to two decimals.
pub fn px_to_vw(px: f64, total: f64) -> Length {
    Length::Vw(round2(px / total * 100.0))
}

/// Pixels → vh of the given total height, rounded to two decimals.
pub fn px_to_vh(px: f64, total: f64) -> Length {
    Length::Vh(round2(px / total * 100.0))
}

/// Pixels → percent of the given total, rounded to two decimals.
pub fn px_to_percent(px: f64, total: f64) -> Length {
    Length::Percent(round2(px / total * 100.0))
}

/// Resolve any stored length to pixels against a container box.
/// Percentages and centering expressions use the axis-appropriate
/// dimension; vw/vh always use width/height respectively.
pub fn resolve_length(value: Length, container: CanvasRect, axis: Axis) -> f64 {
    let axis_dim = match axis {
        Axis::X => container.width,
        Axis::Y => container.height,
    };
    match value {
        Length::Px(v) => v,
        Length::Vw(v) => v / 100.0 * container.width,
        Length::Vh(v) => v / 100.0 * container.height,
        Length::Percent(v) => v / 100.0 * axis_dim,
        Length::Calc { offset_px } => axis_dim / 2.0 + offset_px,
    }
}

/// Resolve a position to its anchor-point pixel coordinates within a
/// container. `left`/`top` win over `right`/`bottom` when both axes'
/// leading edges are present; an axis with neither edge resolves to 0.
pub fn resolve_position(position: &Position, container: CanvasRect) -> (f64, f64) {
    let x = if let Some(left) = position.left {
        resolve_length(left, container, Axis::X)
    } else if let Some(right) = position.right {
        container.width - resolve_length(right, container, Axis::X)
    } else {
        0.0
    };
    let y = if let Some(top) = position.top {
        resolve_length(top, container, Axis::Y)
    } else if let Some(bottom) = position.bottom {
        container.height - resolve_length(bottom, container, Axis::Y)
    } else {
        0.0
    };
    (x, y)
}

// ─── Anchor algebra ──────────────────────────────────────────────────────

/// Anchor role collapsed to one axis: measured from the leading edge, the
/// midpoint, or the trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisRole {
    Near,
    Center,
    Far,
}

impl From<HAnchor> for AxisRole {
    fn from(h: HAnchor) -> Self {
        match h {
            HAnchor::Left => AxisRole::Near,
            HAnchor::Center => AxisRole::Center,
            HAnchor::Right => AxisRole::Far,
        }
    }
}

impl From<VAnchor> for AxisRole {
    fn from(v: VAnchor) -> Self {
        match v {
            VAnchor::Top => AxisRole::Near,
            VAnchor::Middle => AxisRole::Center,
            VAnchor::Bottom => AxisRole::Far,
        }
    }
}

/// Which of the two opposing edge fields an encoded axis writes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisEdge {
    Near(Length),
    Far(Length),
}

/// Encode one axis of a pixel rect per the anchor role:
/// near  → `near = leading`
/// far   → `far = container − leading − extent`
/// center→ `near = calc(50% + Δ)`, Δ = leading + extent/2 − container/2
///         (a zero Δ renders as the bare `50%` literal).
fn encode_axis(role: AxisRole, leading: f64, extent: f64, container: f64) -> AxisEdge {
    match role {
        AxisRole::Near => AxisEdge::Near(Length::Px(leading)),
        AxisRole::Far => AxisEdge::Far(Length::Px(container - leading - extent)),
        AxisRole::Center => AxisEdge::Near(Length::Calc {
            offset_px: leading + extent / 2.0 - container / 2.0,
        }),
    }
}

/// Rewrite a position from an absolute pixel rect, honoring the anchor.
/// Writing an edge always clears its opposing edge, so a control never
/// carries conflicting `left`+`right` or `top`+`bottom` values.
pub fn apply_anchored_rect(
    position: &mut Position,
    rect: PxRect,
    anchor: Anchor,
    canvas: CanvasRect,
) {
    position.anchor = anchor;
    match encode_axis(anchor.horizontal.into(), rect.left, rect.width, canvas.width) {
        AxisEdge::Near(v) => position.set_left(v),
        AxisEdge::Far(v) => position.set_right(v),
    }
    match encode_axis(anchor.vertical.into(), rect.top, rect.height, canvas.height) {
        AxisEdge::Near(v) => position.set_top(v),
        AxisEdge::Far(v) => position.set_bottom(v),
    }
}

// ─── Whole-tree conversion ───────────────────────────────────────────────

/// Convert a whole document from pixel geometry to responsive units,
/// returning a converted copy. Top-level controls (groups included)
/// become vw/vh of the canvas; children owned by a group become percent
/// of that group's own pixel box. Only pixel-valued fields convert;
/// centering expressions and already-responsive values pass through.
pub fn layout_to_responsive(layout: &Layout, canvas: CanvasRect) -> Layout {
    let mut out = layout.clone();
    for controls in out.control_sets.values_mut() {
        for control in controls.iter_mut() {
            responsive_control(control, canvas, None);
        }
    }
    out
}

fn responsive_control(control: &mut Control, canvas: CanvasRect, parent_box: Option<CanvasRect>) {
    let container = parent_box.unwrap_or(canvas);

    // The box the children resolve against — captured once, from this
    // node's pre-rewrite values.
    let child_box = CanvasRect::new(
        resolve_length(control.size.width, container, Axis::X),
        resolve_length(control.size.height, container, Axis::Y),
    );

    let (unit_x, unit_y): (fn(f64, f64) -> Length, fn(f64, f64) -> Length) = match parent_box {
        None => (px_to_vw, px_to_vh),
        Some(_) => (px_to_percent, px_to_percent),
    };

    for edge in [&mut control.position.left, &mut control.position.right] {
        if let Some(Length::Px(px)) = *edge {
            *edge = Some(unit_x(px, container.width));
        }
    }
    for edge in [&mut control.position.top, &mut control.position.bottom] {
        if let Some(Length::Px(px)) = *edge {
            *edge = Some(unit_y(px, container.height));
        }
    }
    if let Length::Px(px) = control.size.width {
        control.size.width = unit_x(px, container.width);
    }
    if let Length::Px(px) = control.size.height {
        control.size.height = unit_y(px, container.height);
    }

    if let Some(children) = &mut control.controls {
        for child in children {
            responsive_control(child, canvas, Some(child_box));
        }
    }
}

/// Convert a whole document from responsive units back to pixels,
/// returning a converted copy. Each node resolves against its parent's
/// pixel box, so boxes derive top-down; a group's box is computed once
/// from its pre-rewrite values and cached for its children.
pub fn layout_to_px(layout: &Layout, canvas: CanvasRect) -> Layout {
    let mut out = layout.clone();
    for controls in out.control_sets.values_mut() {
        for control in controls.iter_mut() {
            px_control(control, canvas, None);
        }
    }
    out
}

fn px_control(control: &mut Control, canvas: CanvasRect, parent_box: Option<CanvasRect>) {
    let container = parent_box.unwrap_or(canvas);

    let child_box = CanvasRect::new(
        resolve_length(control.size.width, container, Axis::X),
        resolve_length(control.size.height, container, Axis::Y),
    );

    control.size.width = Length::Px(child_box.width);
    control.size.height = Length::Px(child_box.height);

    // A centering expression on a leading edge inverts exactly because the
    // extent is known: near = container/2 + Δ − extent/2.
    if let Some(v) = control.position.left {
        control.position.left = Some(Length::Px(match v {
            Length::Calc { offset_px } => container.width / 2.0 + offset_px - child_box.width / 2.0,
            other => resolve_length(other, container, Axis::X),
        }));
    }
    if let Some(v) = control.position.top {
        control.position.top = Some(Length::Px(match v {
            Length::Calc { offset_px } => {
                container.height / 2.0 + offset_px - child_box.height / 2.0
            }
            other => resolve_length(other, container, Axis::Y),
        }));
    }
    if let Some(v) = control.position.right {
        control.position.right = Some(Length::Px(resolve_length(v, container, Axis::X)));
    }
    if let Some(v) = control.position.bottom {
        control.position.bottom = Some(Length::Px(resolve_length(v, container, Axis::Y)));
    }

    if let Some(children) = &mut control.controls {
        for child in children {
            px_control(child, canvas, Some(child_box));
        }
    }
}
