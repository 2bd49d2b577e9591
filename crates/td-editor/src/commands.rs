//! Reversible document commands.
//!
//! Every mutation of a layout is one `Command` value: constructed against
//! the current document (capturing deep snapshots of whatever its `undo`
//! will need — never live aliases), then driven exclusively by the
//! session's execute/undo/redo orchestration.
//!
//! Failure policy is two-tier. A stale target id at execute time is a
//! benign no-op (rapid interactive editing makes stale references routine,
//! and surfacing each one would be disruptive); anything that could
//! corrupt the tree structure — reparenting to a missing or non-group
//! target, or into the moved control's own subtree — is rejected at
//! construction, before any mutation.

use crate::props::{get_path, get_path_mut, remove_path, set_path};
use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use td_core::{
    Anchor, CanvasRect, Control, ControlId, Layout, Length, Owner, Position, PxRect, Size,
    apply_anchored_rect, is_ancestor, locate,
};

/// Structural failure detected while building a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    ControlNotFound(ControlId),
    GroupNotFound(ControlId),
    NotAGroup(ControlId),
    /// The target group sits inside the control being moved.
    CyclicReparent { control: ControlId, group: ControlId },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::ControlNotFound(id) => write!(f, "control {id} not found"),
            CommandError::GroupNotFound(id) => write!(f, "target group {id} not found"),
            CommandError::NotAGroup(id) => write!(f, "control {id} is not a group"),
            CommandError::CyclicReparent { control, group } => {
                write!(f, "cannot move {control} into {group}: target is inside it")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// One entry of a multi-select drag.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntry {
    pub id: ControlId,
    pub old_position: Position,
    pub new_position: Position,
}

/// What an array-property edit does.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayAction {
    Add { item: Value },
    Remove { index: usize },
    Update { index: usize, item: Value },
}

/// Old value captured for a property update. The snapshot is taken at the
/// path's root field (everything a nested update creates lives beneath
/// it, so restoring that one field is an exact inverse), and the field may
/// legitimately have held nothing — undo must restore that absence.
#[derive(Debug, Clone, PartialEq)]
pub enum PriorValue {
    Absent,
    Present(Value),
}

/// A control removed by a bulk delete, with everything needed to put it
/// back exactly where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedControl {
    pub control: Control,
    pub owner: Owner,
    pub index: usize,
}

/// One reversible mutation of the layout document.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Append a fully-formed control to the active set.
    AddControl { control: Control },
    /// Remove one control from the active set's top level.
    DeleteControl {
        id: ControlId,
        removed: Option<(Control, usize)>,
    },
    /// Bulk delete anywhere in the tree; clears the selection.
    DeleteControls {
        ids: Vec<ControlId>,
        removed: Vec<RemovedControl>,
    },
    /// Overwrite a control's position and size (end of a drag).
    MoveControl {
        id: ControlId,
        new_position: Position,
        old_position: Position,
        new_size: Size,
        old_size: Size,
    },
    /// Reposition several controls at once (multi-select drag).
    BatchMove { moves: Vec<MoveEntry> },
    /// Re-encode position from an absolute pixel rect honoring an anchor,
    /// and overwrite the size.
    ResizeControl {
        id: ControlId,
        rect: PxRect,
        anchor: Anchor,
        canvas: CanvasRect,
        prior: Option<(Position, Size)>,
    },
    /// Reparent a control into a group, atomically.
    MoveToGroup {
        id: ControlId,
        group_id: ControlId,
        new_position: Position,
        origin: Owner,
        origin_index: usize,
        snapshot: Box<Control>,
    },
    /// Set an arbitrary nested property on a control.
    UpdateProperty {
        id: ControlId,
        path: String,
        new_value: Value,
        prior: Option<PriorValue>,
    },
    /// Edit an array-valued property on a control.
    UpdateArray {
        id: ControlId,
        path: String,
        action: ArrayAction,
        remembered: Option<Value>,
    },
    /// Replace the whole document.
    LoadLayout {
        new_layout: Box<Layout>,
        old_layout: Box<Layout>,
    },
}

impl Command {
    pub fn add_control(control: Control) -> Self {
        Command::AddControl { control }
    }

    pub fn delete_control(id: ControlId) -> Self {
        Command::DeleteControl { id, removed: None }
    }

    pub fn delete_controls(ids: Vec<ControlId>) -> Self {
        Command::DeleteControls {
            ids,
            removed: Vec::new(),
        }
    }

    pub fn move_control(
        id: ControlId,
        new_position: Position,
        old_position: Position,
        new_size: Size,
        old_size: Size,
    ) -> Self {
        Command::MoveControl {
            id,
            new_position,
            old_position,
            new_size,
            old_size,
        }
    }

    pub fn batch_move(moves: Vec<MoveEntry>) -> Self {
        Command::BatchMove { moves }
    }

    /// Snapshots the control's current position and size so undo can
    /// restore them wholesale.
    pub fn resize_control(
        layout: &Layout,
        id: ControlId,
        rect: PxRect,
        anchor: Anchor,
        canvas: CanvasRect,
    ) -> Self {
        let prior = layout
            .control(id)
            .map(|c| (c.position.clone(), c.size.clone()));
        Command::ResizeControl {
            id,
            rect,
            anchor,
            canvas,
            prior,
        }
    }

    /// Fails fast: a dangling reference here would corrupt the tree, so
    /// both endpoints must resolve before any mutation is possible.
    pub fn move_to_group(
        layout: &Layout,
        id: ControlId,
        group_id: ControlId,
        new_position: Position,
    ) -> Result<Self, CommandError> {
        let location = locate(layout, id).ok_or(CommandError::ControlNotFound(id))?;
        let group = layout
            .control(group_id)
            .ok_or(CommandError::GroupNotFound(group_id))?;
        if !group.is_group() {
            return Err(CommandError::NotAGroup(group_id));
        }
        if is_ancestor(layout, id, group_id) {
            return Err(CommandError::CyclicReparent {
                control: id,
                group: group_id,
            });
        }
        let snapshot = layout
            .control(id)
            .cloned()
            .ok_or(CommandError::ControlNotFound(id))?;
        Ok(Command::MoveToGroup {
            id,
            group_id,
            new_position,
            origin: location.owner,
            origin_index: location.index,
            snapshot: Box::new(snapshot),
        })
    }

    /// Captures the current value of the path's root field (or its
    /// absence) for undo.
    pub fn update_property(layout: &Layout, id: ControlId, path: &str, new_value: Value) -> Self {
        let root_field = path.split('.').next().unwrap_or(path);
        let prior = layout.control(id).map(|control| {
            serde_json::to_value(control)
                .ok()
                .and_then(|image| get_path(&image, root_field).cloned())
                .map_or(PriorValue::Absent, PriorValue::Present)
        });
        Command::UpdateProperty {
            id,
            path: path.to_string(),
            new_value,
            prior,
        }
    }

    pub fn update_array(id: ControlId, path: &str, action: ArrayAction) -> Self {
        Command::UpdateArray {
            id,
            path: path.to_string(),
            action,
            remembered: None,
        }
    }

    /// Snapshots the current document as the undo target.
    pub fn load_layout(current: &Layout, new_layout: Layout) -> Self {
        Command::LoadLayout {
            new_layout: Box::new(new_layout),
            old_layout: Box::new(current.clone()),
        }
    }

    pub(crate) fn execute(&mut self, layout: &mut Layout, selection: &mut Vec<ControlId>) {
        match self {
            Command::AddControl { control } => {
                layout.active_set_mut().push(control.clone());
            }

            Command::DeleteControl { id, removed } => {
                let set = layout.active_set_mut();
                match set.iter().position(|c| c.id == *id) {
                    Some(index) => *removed = Some((set.remove(index), index)),
                    None => debug!("delete: {id} not in active set, nothing to do"),
                }
            }

            Command::DeleteControls { ids, removed } => {
                removed.clear();
                // Back to front keeps earlier indices stable while later
                // siblings are spliced out.
                for id in ids.iter().rev() {
                    let Some(location) = locate(layout, *id) else {
                        debug!("bulk delete: {id} not found, skipping");
                        continue;
                    };
                    if let Some(sequence) = layout.sequence_mut(&location.owner) {
                        let control = sequence.remove(location.index);
                        removed.push(RemovedControl {
                            control,
                            owner: location.owner,
                            index: location.index,
                        });
                    }
                }
                selection.clear();
            }

            Command::MoveControl {
                id,
                new_position,
                new_size,
                ..
            } => match layout.control_mut(*id) {
                Some(control) => {
                    control.position = new_position.clone();
                    control.size = new_size.clone();
                }
                None => debug!("move: {id} not found, nothing to do"),
            },

            Command::BatchMove { moves } => {
                for entry in moves.iter() {
                    if let Some(control) = layout.control_mut(entry.id) {
                        control.position = entry.new_position.clone();
                    }
                }
            }

            Command::ResizeControl {
                id,
                rect,
                anchor,
                canvas,
                ..
            } => {
                let Some(control) = layout.control_mut(*id) else {
                    debug!("resize: {id} not found, nothing to do");
                    return;
                };
                apply_anchored_rect(&mut control.position, *rect, *anchor, *canvas);
                control.size.width = Length::Px(rect.width);
                control.size.height = Length::Px(rect.height);
                debug!("resized {id} to {rect:?} ({anchor})");
            }

            Command::MoveToGroup {
                id,
                group_id,
                new_position,
                ..
            } => {
                // Re-validate the target before touching anything: a half
                // reparent would leave the control unowned.
                match layout.control(*group_id) {
                    Some(group) if group.is_group() => {}
                    _ => {
                        warn!("reparent: target {group_id} missing or not a group");
                        return;
                    }
                }
                if is_ancestor(layout, *id, *group_id) {
                    warn!("reparent: {group_id} is inside {id}, refusing");
                    return;
                }
                let Some(location) = locate(layout, *id) else {
                    debug!("reparent: {id} not found, nothing to do");
                    return;
                };
                let Some(sequence) = layout.sequence_mut(&location.owner) else {
                    return;
                };
                let mut control = sequence.remove(location.index);
                // Position becomes group-relative; size is preserved.
                control.position = new_position.clone();
                if let Some(group) = layout.control_mut(*group_id) {
                    let children = group.controls.get_or_insert_with(Vec::new);
                    children.push(control);
                    debug!(
                        "moved {id} into group {group_id} ({} children)",
                        children.len()
                    );
                }
            }

            Command::UpdateProperty {
                id,
                path,
                new_value,
                ..
            } => {
                edit_serialized(layout, *id, |image| {
                    set_path(image, path, new_value.clone());
                    true
                });
            }

            Command::UpdateArray {
                id,
                path,
                action,
                remembered,
            } => {
                edit_serialized(layout, *id, |image| {
                    let Some(array) = get_path_mut(image, path).and_then(Value::as_array_mut)
                    else {
                        debug!("array edit: path {path:?} unresolved on {id}");
                        return false;
                    };
                    match action {
                        ArrayAction::Add { item } => {
                            array.push(item.clone());
                        }
                        ArrayAction::Remove { index } => {
                            if *index >= array.len() {
                                return false;
                            }
                            *remembered = Some(array.remove(*index));
                        }
                        ArrayAction::Update { index, item } => {
                            if *index >= array.len() {
                                return false;
                            }
                            *remembered =
                                Some(std::mem::replace(&mut array[*index], item.clone()));
                        }
                    }
                    true
                });
            }

            Command::LoadLayout { new_layout, .. } => {
                *layout = (**new_layout).clone();
            }
        }
    }

    pub(crate) fn undo(&mut self, layout: &mut Layout, selection: &mut Vec<ControlId>) {
        match self {
            Command::AddControl { control } => {
                let set = layout.active_set_mut();
                if let Some(index) = set.iter().position(|c| c.id == control.id) {
                    set.remove(index);
                }
            }

            Command::DeleteControl { removed, .. } => {
                if let Some((control, index)) = removed.take() {
                    let set = layout.active_set_mut();
                    let index = index.min(set.len());
                    set.insert(index, control);
                }
            }

            Command::DeleteControls { ids, removed } => {
                // Reinsert in original document order so every remembered
                // index is exact again.
                for entry in removed.drain(..).rev() {
                    let RemovedControl {
                        control,
                        owner,
                        index,
                    } = entry;
                    let sequence = match owner {
                        Owner::Set(name) => Some(layout.control_sets.entry(name).or_default()),
                        Owner::Group(group_id) => layout
                            .control_mut(group_id)
                            .and_then(|g| g.controls.as_mut()),
                    };
                    match sequence {
                        Some(sequence) => {
                            let index = index.min(sequence.len());
                            sequence.insert(index, control);
                        }
                        None => warn!("undo delete: owning group vanished, dropping control"),
                    }
                }
                *selection = ids.clone();
            }

            Command::MoveControl {
                id,
                old_position,
                old_size,
                ..
            } => {
                if let Some(control) = layout.control_mut(*id) {
                    control.position = old_position.clone();
                    control.size = old_size.clone();
                }
            }

            Command::BatchMove { moves } => {
                for entry in moves.iter() {
                    if let Some(control) = layout.control_mut(entry.id) {
                        control.position = entry.old_position.clone();
                    }
                }
            }

            Command::ResizeControl { id, prior, .. } => {
                if let Some((position, size)) = prior
                    && let Some(control) = layout.control_mut(*id)
                {
                    control.position = position.clone();
                    control.size = size.clone();
                }
            }

            Command::MoveToGroup {
                id,
                group_id,
                origin,
                origin_index,
                snapshot,
                ..
            } => {
                if let Some(group) = layout.control_mut(*group_id)
                    && let Some(children) = &mut group.controls
                    && let Some(index) = children.iter().position(|c| c.id == *id)
                {
                    children.remove(index);
                }
                // A fresh copy of the pre-move snapshot goes back to the
                // original slot; the command keeps its own for redo cycles.
                let sequence = match origin {
                    Owner::Set(name) => {
                        Some(layout.control_sets.entry(name.clone()).or_default())
                    }
                    Owner::Group(group_id) => layout
                        .control_mut(*group_id)
                        .and_then(|g| g.controls.as_mut()),
                };
                if let Some(sequence) = sequence {
                    let index = (*origin_index).min(sequence.len());
                    sequence.insert(index, (**snapshot).clone());
                }
            }

            Command::UpdateProperty {
                id, path, prior, ..
            } => {
                let Some(prior) = prior else {
                    return;
                };
                let prior = prior.clone();
                let root_field = path.split('.').next().unwrap_or(path);
                edit_serialized(layout, *id, |image| {
                    match prior {
                        PriorValue::Present(old) => set_path(image, root_field, old),
                        PriorValue::Absent => remove_path(image, root_field),
                    }
                    true
                });
            }

            Command::UpdateArray {
                id,
                path,
                action,
                remembered,
            } => {
                edit_serialized(layout, *id, |image| {
                    let Some(array) = get_path_mut(image, path).and_then(Value::as_array_mut)
                    else {
                        return false;
                    };
                    match action {
                        ArrayAction::Add { .. } => {
                            array.pop();
                        }
                        ArrayAction::Remove { index } => {
                            let Some(item) = remembered.take() else {
                                return false;
                            };
                            let index = (*index).min(array.len());
                            array.insert(index, item);
                        }
                        ArrayAction::Update { index, .. } => {
                            let Some(item) = remembered.take() else {
                                return false;
                            };
                            if *index >= array.len() {
                                return false;
                            }
                            array[*index] = item;
                        }
                    }
                    true
                });
            }

            Command::LoadLayout { old_layout, .. } => {
                *layout = (**old_layout).clone();
            }
        }
    }
}

/// Apply an edit to a control's serialized image and write it back.
/// The closure returns false to signal "nothing changed". An edit that
/// no longer deserializes as a control is rejected wholesale, leaving
/// the document untouched.
fn edit_serialized<F>(layout: &mut Layout, id: ControlId, edit: F)
where
    F: FnOnce(&mut Value) -> bool,
{
    let Some(control) = layout.control(id) else {
        debug!("property edit: {id} not found, nothing to do");
        return;
    };
    let Ok(mut image) = serde_json::to_value(control) else {
        return;
    };
    if !edit(&mut image) {
        return;
    }
    match serde_json::from_value::<Control>(image) {
        Ok(updated) => {
            if let Some(slot) = layout.control_mut(id) {
                *slot = updated;
            }
        }
        Err(e) => warn!("rejected structurally-invalid edit on {id}: {e}"),
    }
}
