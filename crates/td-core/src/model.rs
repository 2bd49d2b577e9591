//! Core data model for TouchDeck layout documents.
//!
//! A `Layout` maps named control-sets to ordered sequences of `Control`
//! nodes. Controls nest: a `group` owns a child sequence, a `radial` owns
//! its button entries, everything else is a leaf. Geometry is stored as
//! suffix-carrying [`Length`] strings (px while editing, vw/vh/% once the
//! persistence converters have run) plus an [`Anchor`] naming the edges the
//! position is measured from.
//!
//! The model owns no behavior beyond structural storage and lookup; every
//! mutation goes through the command engine in `td-editor`.

use crate::id::ControlId;
use crate::value::Length;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ─── Anchors ─────────────────────────────────────────────────────────────

/// Vertical anchor role: which horizontal edge the y-position is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Horizontal anchor role: which vertical edge the x-position is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAnchor {
    #[default]
    Left,
    Center,
    Right,
}

/// The pair of edges a control's position is measured from.
/// Serialized as `"top-left"`, `"middle-center"`, `"bottom-right"`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub vertical: VAnchor,
    pub horizontal: HAnchor,
}

impl Anchor {
    pub const fn new(vertical: VAnchor, horizontal: HAnchor) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = match self.vertical {
            VAnchor::Top => "top",
            VAnchor::Middle => "middle",
            VAnchor::Bottom => "bottom",
        };
        let h = match self.horizontal {
            HAnchor::Left => "left",
            HAnchor::Center => "center",
            HAnchor::Right => "right",
        };
        write!(f, "{v}-{h}")
    }
}

/// Error parsing an anchor tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAnchorError(String);

impl fmt::Display for ParseAnchorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid anchor tag: {:?}", self.0)
    }
}

impl std::error::Error for ParseAnchorError {}

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAnchorError(s.to_string());
        let (v, h) = s.split_once('-').ok_or_else(err)?;
        let vertical = match v {
            "top" => VAnchor::Top,
            "middle" => VAnchor::Middle,
            "bottom" => VAnchor::Bottom,
            _ => return Err(err()),
        };
        let horizontal = match h {
            "left" => HAnchor::Left,
            "center" => HAnchor::Center,
            "right" => HAnchor::Right,
            _ => return Err(err()),
        };
        Ok(Anchor {
            vertical,
            horizontal,
        })
    }
}

impl Serialize for Anchor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Anchor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Position & Size ─────────────────────────────────────────────────────

/// Per-axis position: at most one of the two opposing edges is set at a
/// time (`left` xor `right`, `top` xor `bottom`). The edge-writing helpers
/// below keep that invariant; persisted documents are expected to honor it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Length>,
}

impl Position {
    /// Top-left anchored pixel position — what the factory and drag code produce.
    pub fn at_px(x: f64, y: f64) -> Self {
        Position {
            anchor: Anchor::default(),
            left: Some(Length::Px(x)),
            top: Some(Length::Px(y)),
            right: None,
            bottom: None,
        }
    }

    /// Set the leading horizontal edge, clearing the opposing one.
    pub fn set_left(&mut self, value: Length) {
        self.left = Some(value);
        self.right = None;
    }

    /// Set the trailing horizontal edge, clearing the opposing one.
    pub fn set_right(&mut self, value: Length) {
        self.right = Some(value);
        self.left = None;
    }

    /// Set the leading vertical edge, clearing the opposing one.
    pub fn set_top(&mut self, value: Length) {
        self.top = Some(value);
        self.bottom = None;
    }

    /// Set the trailing vertical edge, clearing the opposing one.
    pub fn set_bottom(&mut self, value: Length) {
        self.bottom = Some(value);
        self.top = None;
    }
}

/// Control dimensions, same value-kind union as positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub width: Length,
    pub height: Length,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<f64>,
}

impl Size {
    pub fn px(width: f64, height: f64) -> Self {
        Size {
            width: Length::Px(width),
            height: Length::Px(height),
            aspect_ratio: None,
        }
    }
}

// ─── Controls ────────────────────────────────────────────────────────────

/// The control variants a layout can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    Button,
    DPad,
    Joystick,
    Group,
    Radial,
    Slider,
}

impl ControlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlKind::Button => "button",
            ControlKind::DPad => "d-pad",
            ControlKind::Joystick => "joystick",
            ControlKind::Group => "group",
            ControlKind::Radial => "radial",
            ControlKind::Slider => "slider",
        }
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a radial menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialButton {
    pub label: String,
    /// Placement angle in degrees, clockwise from 12 o'clock.
    pub angle: f64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub action: Value,
}

/// One placeable element in the layout tree.
///
/// `controls` is populated only when `kind` is [`ControlKind::Group`];
/// `buttons` only when it is [`ControlKind::Radial`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    #[serde(rename = "type")]
    pub kind: ControlKind,
    pub label: String,
    pub position: Position,
    pub size: Size,
    /// Free-form CSS-ish style overrides.
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Free-form input-mapping metadata.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub mapping: Value,
    /// Free-form action metadata.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub action: Value,
    /// Re-trigger cooldown in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
    /// Child sequence — groups only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<Control>>,
    /// Radial menu entries — radials only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<RadialButton>>,
}

impl Control {
    pub fn is_group(&self) -> bool {
        self.kind == ControlKind::Group
    }

    /// The child sequence, empty for anything that is not a populated group.
    pub fn children(&self) -> &[Control] {
        self.controls.as_deref().unwrap_or_default()
    }
}

// ─── Layout (document root) ──────────────────────────────────────────────

/// The whole document: named control-sets over a virtual canvas.
///
/// Invariant: `initial_set` always keys an existing entry in
/// `control_sets` — anything that assumes the active set creates it on
/// first use rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub layout_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    /// Name of the active control-set.
    pub initial_set: String,
    pub control_sets: BTreeMap<String, Vec<Control>>,
}

impl Layout {
    /// A fresh document with one empty `default` set active.
    pub fn new(name: &str) -> Self {
        let mut control_sets = BTreeMap::new();
        control_sets.insert("default".to_string(), Vec::new());
        Layout {
            layout_id: ControlId::with_prefix("layout").as_str().to_string(),
            name: name.to_string(),
            version: None,
            inherits: None,
            initial_set: "default".to_string(),
            control_sets,
        }
    }

    /// The active control-set, if it exists.
    pub fn active_set(&self) -> Option<&Vec<Control>> {
        self.control_sets.get(&self.initial_set)
    }

    /// The active control-set, created empty on first use.
    pub fn active_set_mut(&mut self) -> &mut Vec<Control> {
        self.control_sets
            .entry(self.initial_set.clone())
            .or_default()
    }

    /// Plain recursive lookup by id across every set and nesting level.
    pub fn control(&self, id: ControlId) -> Option<&Control> {
        fn find(controls: &[Control], id: ControlId) -> Option<&Control> {
            for control in controls {
                if control.id == id {
                    return Some(control);
                }
                if let Some(children) = &control.controls
                    && let Some(found) = find(children, id)
                {
                    return Some(found);
                }
            }
            None
        }
        self.control_sets.values().find_map(|set| find(set, id))
    }

    /// Mutable recursive lookup by id.
    pub fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        fn find(controls: &mut [Control], id: ControlId) -> Option<&mut Control> {
            for control in controls {
                if control.id == id {
                    return Some(control);
                }
                if let Some(children) = &mut control.controls
                    && let Some(found) = find(children, id)
                {
                    return Some(found);
                }
            }
            None
        }
        self.control_sets
            .values_mut()
            .find_map(|set| find(set, id))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new("Untitled layout")
    }
}
