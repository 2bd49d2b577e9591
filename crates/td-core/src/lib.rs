pub mod factory;
pub mod id;
pub mod locate;
pub mod model;
pub mod units;
pub mod value;

pub use factory::create_control;
pub use id::ControlId;
pub use locate::{ControlLocation, Owner, absolute_position, all_groups, descendants, is_ancestor, locate};
pub use model::*;
pub use units::{
    Axis, CanvasRect, PxRect, apply_anchored_rect, layout_to_px, layout_to_responsive,
    px_to_percent, px_to_vh, px_to_vw, resolve_length, resolve_position,
};
pub use value::Length;
