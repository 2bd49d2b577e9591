//! The editing session: one document, one selection, one linear history.
//!
//! `execute_command` / `undo` / `redo` are the only sanctioned ways to
//! mutate the document — mutating `Layout` behind the session's back
//! bypasses history and is a programming error, not a runtime-checked one.
//! Everything is synchronous and single-threaded; commands run to
//! completion and never re-enter the session.

use crate::commands::Command;
use td_core::{Control, ControlId, Layout};

type ChangeListener = Box<dyn FnMut(&Layout)>;

/// An open document plus its transient editing state.
///
/// Selection is session state, not document state: it is never persisted,
/// bulk deletes clear it, and undoing a bulk delete restores it.
pub struct EditorSession {
    layout: Layout,
    selection: Vec<ControlId>,
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    revision: u64,
    on_change: Option<ChangeListener>,
}

impl EditorSession {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            selection: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            revision: 0,
            on_change: None,
        }
    }

    /// The live document. Read-only — mutation goes through commands.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Bumped once per executed/undone/redone command. A cheap way for a
    /// UI to detect staleness without subscribing.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Install the single change listener, invoked once per document
    /// mutation (execute, undo, or redo).
    pub fn set_change_listener(&mut self, listener: impl FnMut(&Layout) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Currently selected ids, in selection order.
    pub fn selection(&self) -> &[ControlId] {
        &self.selection
    }

    pub fn set_selection(&mut self, ids: Vec<ControlId>) {
        self.selection = ids;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The first selected id — what the property inspector shows.
    pub fn primary_selection(&self) -> Option<ControlId> {
        self.selection.first().copied()
    }

    /// The first selected control, if it still exists in the document.
    pub fn primary_selected_control(&self) -> Option<&Control> {
        self.primary_selection().and_then(|id| self.layout.control(id))
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Execute a new command. Any new command discards all pending redos —
    /// history is strictly linear.
    pub fn execute_command(&mut self, mut command: Command) {
        command.execute(&mut self.layout, &mut self.selection);
        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.notify();
    }

    /// Undo the most recent command. No-op on an empty history.
    pub fn undo(&mut self) {
        let Some(mut command) = self.undo_stack.pop() else {
            return;
        };
        command.undo(&mut self.layout, &mut self.selection);
        self.redo_stack.push(command);
        self.notify();
    }

    /// Re-execute the most recently undone command. No-op when nothing
    /// is pending.
    pub fn redo(&mut self) {
        let Some(mut command) = self.redo_stack.pop() else {
            return;
        };
        command.execute(&mut self.layout, &mut self.selection);
        self.undo_stack.push(command);
        self.notify();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn notify(&mut self) {
        self.revision += 1;
        if let Some(listener) = &mut self.on_change {
            listener(&self.layout);
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use td_core::{ControlKind, create_control};

    #[test]
    fn empty_history_is_a_noop() {
        let mut session = EditorSession::default();
        session.undo();
        session.redo();
        assert_eq!(session.revision(), 0);
        assert!(!session.can_undo());
        assert!(!session.can_redo());
    }

    #[test]
    fn listener_fires_once_per_mutation() {
        let fired = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&fired);

        let mut session = EditorSession::default();
        session.set_change_listener(move |_| counter.set(counter.get() + 1));

        let control = create_control(ControlKind::Button, (10.0, 10.0));
        session.execute_command(Command::add_control(control));
        session.undo();
        session.redo();

        assert_eq!(fired.get(), 3);
        assert_eq!(session.revision(), 3);
    }

    #[test]
    fn primary_selection_is_first_id() {
        let mut session = EditorSession::default();
        let a = create_control(ControlKind::Button, (0.0, 0.0));
        let b = create_control(ControlKind::Slider, (0.0, 0.0));
        let (a_id, b_id) = (a.id, b.id);
        session.execute_command(Command::add_control(a));
        session.execute_command(Command::add_control(b));

        session.set_selection(vec![b_id, a_id]);
        assert_eq!(session.primary_selection(), Some(b_id));
        assert_eq!(session.primary_selected_control().map(|c| c.id), Some(b_id));

        session.clear_selection();
        assert_eq!(session.primary_selection(), None);
    }
}
