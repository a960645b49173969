//! # Undo/Redo Stack
//!
//! Tracks committed transactions and enables undo/redo.
//!
//! ## Design
//!
//! - Each committed transaction pushes the pre-commit snapshot
//! - Undo swaps the current state for the last snapshot and moves the
//!   current one to the redo stack
//! - New commits clear the redo stack
//! - Bounded depth: oldest snapshots fall off first

use crate::transaction::Selection;
use vellum_dom::Node;

/// Document state captured around a transaction boundary.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tree: Node,
    pub selection: Selection,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Pre-commit snapshots (most recent last)
    undo_stack: Vec<Snapshot>,

    /// Undone snapshots (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the state a commit replaced. Clears the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.undo_stack.push(snapshot);
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }
    }

    /// Step back: returns the snapshot to restore, moving `current` onto
    /// the redo stack.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward: returns the snapshot to restore, moving `current`
    /// back onto the undo stack.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
