//! Bounded snapshot undo/redo.

use crate::store::Snapshot;
use std::collections::VecDeque;

/// Default number of undo states to keep.
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Undo and redo stacks of whole-state snapshots.
#[derive(Debug, Clone)]
pub struct History {
    /// Oldest entry at the front.
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `max_entries` undo states.
    ///
    /// At least one state is always kept.
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Maximum number of undo states kept.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Push the state before a change (call before mutating).
    pub fn record(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the last recorded state, saving `current` for redo.
    ///
    /// Returns the state to restore, or `None` if there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Pop the last undone state, saving `current` for undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
        Some(next)
    }

    /// Drop the most recent redo entry (used after an automatic rollback).
    pub fn discard_redo(&mut self) -> Option<Snapshot> {
        self.redo_stack.pop()
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
