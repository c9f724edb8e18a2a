//! Snapshot-based undo/redo.

use crate::error::{EditError, EditResult};

/// Availability changes raised by [`UndoRedo`]. Only raised on transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    CanUndoChanged(bool),
    CanRedoChanged(bool),
}

/// Two-stack history of whole-state snapshots.
///
/// `current` starts empty so that the first recorded state is never pushed onto
/// the undo stack. Adding a state always discards the redo stack.
#[derive(Debug, Clone)]
pub struct UndoRedo<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    current: Option<T>,
    limit: Option<usize>,
    can_undo: bool,
    can_redo: bool,
    events: Vec<HistoryEvent>,
}

impl<T> Default for UndoRedo<T> {
    fn default() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            current: None,
            limit: None,
            can_undo: false,
            can_redo: false,
            events: Vec::new(),
        }
    }
}

impl<T> UndoRedo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` undo steps; the oldest are dropped first.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn can_undo(&self) -> bool {
        self.can_undo
    }

    pub fn can_redo(&self) -> bool {
        self.can_redo
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Record a new state, making it current.
    pub fn add_state(&mut self, state: T) {
        self.redo_stack.clear();
        if let Some(previous) = self.current.take() {
            self.undo_stack.push(previous);
            if let Some(limit) = self.limit {
                while self.undo_stack.len() > limit {
                    self.undo_stack.remove(0);
                }
            }
        }
        self.current = Some(state);
        self.update_can_do();
    }

    /// Step back to the previous state and return it.
    pub fn undo(&mut self) -> EditResult<&T> {
        let previous = self.undo_stack.pop().ok_or(EditError::NothingToUndo)?;
        if let Some(current) = self.current.take() {
            self.redo_stack.push(current);
        }
        self.update_can_do();
        Ok(self.current.insert(previous))
    }

    /// Step forward to the next state and return it.
    pub fn redo(&mut self) -> EditResult<&T> {
        let next = self.redo_stack.pop().ok_or(EditError::NothingToRedo)?;
        if let Some(current) = self.current.take() {
            self.undo_stack.push(current);
        }
        self.update_can_do();
        Ok(self.current.insert(next))
    }

    /// Drop all history and start again from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current = Some(initial);
        self.update_can_do();
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.events)
    }

    fn update_can_do(&mut self) {
        let can_undo = !self.undo_stack.is_empty();
        if can_undo != self.can_undo {
            self.can_undo = can_undo;
            self.events.push(HistoryEvent::CanUndoChanged(can_undo));
        }
        let can_redo = !self.redo_stack.is_empty();
        if can_redo != self.can_redo {
            self.can_redo = can_redo;
            self.events.push(HistoryEvent::CanRedoChanged(can_redo));
        }
    }
}
