//! Tree search over the control hierarchy.
//!
//! Every query re-walks the document — nothing is cached, so correctness
//! never depends on invalidation. Expected documents are tens to low
//! hundreds of nodes; simplicity wins over speed here.
//!
//! Locations are handles (owner tag + index + id path), never references
//! into the live tree, so a caller can hold one across mutations and
//! resolve it through [`Layout::sequence`] / [`Layout::sequence_mut`] when
//! it actually touches the document.

use crate::id::ControlId;
use crate::model::{Control, Layout};
use crate::units::{CanvasRect, resolve_position};
use smallvec::SmallVec;

/// Recursion ceiling for tree walks. The mutation commands keep the tree
/// acyclic; this guard bounds the walk if that invariant is ever broken.
pub const MAX_DEPTH: usize = 64;

/// Root-to-node id path. Stays inline for the shallow trees we expect.
pub type IdPath = SmallVec<[ControlId; 8]>;

/// The single sequence a control currently belongs to: either the top
/// level of a named control-set or one group's child sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Set(String),
    Group(ControlId),
}

/// Full location record for one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLocation {
    /// The sequence owning the control.
    pub owner: Owner,
    /// The owning group's id, `None` at the top level of a set.
    pub parent: Option<ControlId>,
    /// Index within the owning sequence.
    pub index: usize,
    /// Ids from the top-level ancestor down to (and including) the control.
    pub path: IdPath,
    /// Nesting level, 0 = top level.
    pub depth: usize,
}

impl Layout {
    /// Resolve an owner tag to its sequence.
    pub fn sequence(&self, owner: &Owner) -> Option<&Vec<Control>> {
        match owner {
            Owner::Set(name) => self.control_sets.get(name),
            Owner::Group(id) => self.control(*id).and_then(|c| c.controls.as_ref()),
        }
    }

    /// Resolve an owner tag to its sequence, mutably.
    pub fn sequence_mut(&mut self, owner: &Owner) -> Option<&mut Vec<Control>> {
        match owner {
            Owner::Set(name) => self.control_sets.get_mut(name),
            Owner::Group(id) => self.control_mut(*id).and_then(|c| c.controls.as_mut()),
        }
    }
}

/// Find a control anywhere in the document and return its full location.
/// Depth-first across every control-set, recursing into group children.
pub fn locate(layout: &Layout, id: ControlId) -> Option<ControlLocation> {
    for (set_name, controls) in &layout.control_sets {
        let owner = Owner::Set(set_name.clone());
        if let Some(found) = locate_in(controls, id, &owner, &IdPath::new(), 0) {
            return Some(found);
        }
    }
    None
}

fn locate_in(
    controls: &[Control],
    id: ControlId,
    owner: &Owner,
    path: &IdPath,
    depth: usize,
) -> Option<ControlLocation> {
    if depth > MAX_DEPTH {
        log::warn!("control tree deeper than {MAX_DEPTH} levels, aborting search");
        return None;
    }
    for (index, control) in controls.iter().enumerate() {
        let mut current_path = path.clone();
        current_path.push(control.id);

        if control.id == id {
            let parent = match owner {
                Owner::Set(_) => None,
                Owner::Group(group_id) => Some(*group_id),
            };
            return Some(ControlLocation {
                owner: owner.clone(),
                parent,
                index,
                path: current_path,
                depth,
            });
        }

        if let Some(children) = &control.controls
            && !children.is_empty()
        {
            let child_owner = Owner::Group(control.id);
            if let Some(found) = locate_in(children, id, &child_owner, &current_path, depth + 1) {
                return Some(found);
            }
        }
    }
    None
}

/// True iff `ancestor` appears on the root-to-node path of `descendant`.
/// A control is on its own path, so `is_ancestor(x, x)` holds — which is
/// exactly what the reparent cycle guard wants.
pub fn is_ancestor(layout: &Layout, ancestor: ControlId, descendant: ControlId) -> bool {
    locate(layout, descendant).is_some_and(|loc| loc.path.contains(&ancestor))
}

/// Pre-order flattened ids of everything nested under `id`, excluding
/// `id` itself. Empty when the control is missing or has no children.
pub fn descendants(layout: &Layout, id: ControlId) -> Vec<ControlId> {
    let mut out = Vec::new();
    if let Some(control) = layout.control(id) {
        collect_descendants(control.children(), &mut out, 0);
    }
    out
}

fn collect_descendants(controls: &[Control], out: &mut Vec<ControlId>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    for control in controls {
        out.push(control.id);
        collect_descendants(control.children(), out, depth + 1);
    }
}

/// Every group node anywhere in the tree, pre-order per set.
pub fn all_groups(layout: &Layout) -> Vec<ControlId> {
    let mut out = Vec::new();
    for controls in layout.control_sets.values() {
        collect_groups(controls, &mut out, 0);
    }
    out
}

fn collect_groups(controls: &[Control], out: &mut Vec<ControlId>, depth: usize) {
    if depth > MAX_DEPTH {
        return;
    }
    for control in controls {
        if control.is_group() {
            out.push(control.id);
        }
        collect_groups(control.children(), out, depth + 1);
    }
}

/// Canvas-relative pixel origin of a control: each ancestor's resolved
/// position accumulated root-to-node. Used while editing, where stored
/// values are pixels (or centering expressions, resolved against the
/// canvas box).
pub fn absolute_position(
    layout: &Layout,
    id: ControlId,
    canvas: CanvasRect,
) -> Option<(f64, f64)> {
    let location = locate(layout, id)?;
    let mut x = 0.0;
    let mut y = 0.0;
    for node_id in &location.path {
        let control = layout.control(*node_id)?;
        let (nx, ny) = resolve_position(&control.position, canvas);
        x += nx;
        y += ny;
    }
    Some((x, y))
}
