//! Default-control factory.
//!
//! Freshly dropped controls always start in pixel units at the drop point,
//! top-left anchored, with a fresh document-unique id; the persistence
//! converters take over from there.

use crate::id::ControlId;
use crate::model::{Control, ControlKind, Position, Size};
use serde_json::Value;
use std::collections::BTreeMap;

/// Build a type-appropriate default control at a pixel drop position.
pub fn create_control(kind: ControlKind, drop_position: (f64, f64)) -> Control {
    let (x, y) = drop_position;
    let size = match kind {
        ControlKind::Button => Size::px(80.0, 80.0),
        _ => Size::px(120.0, 60.0),
    };

    Control {
        id: ControlId::with_prefix(kind.as_str()),
        kind,
        label: kind.as_str().to_string(),
        position: Position::at_px(x, y),
        size,
        style: BTreeMap::new(),
        mapping: Value::Object(serde_json::Map::new()),
        action: Value::Null,
        cooldown: None,
        // Only groups own a child sequence, only radials own buttons.
        controls: (kind == ControlKind::Group).then(Vec::new),
        buttons: (kind == ControlKind::Radial).then(Vec::new),
    }
}
