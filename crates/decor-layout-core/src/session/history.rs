// crates/decor-layout-core/src/session/history.rs
// ============================================================================
// Module: Undo/Redo History Manager
// Description: Bounded linear history over item-list snapshots.
// Purpose: Allow reverting and reapplying edits without unbounded memory.
// Dependencies: crate::core::item
// ============================================================================

//! ## Overview
//! The history manager keeps two stacks of full item-list snapshots. Every
//! content mutation pushes the pre-mutation snapshot, trims the stack to the
//! most recent [`MAX_UNDO_DEPTH`] entries, and clears the redo stack: a new
//! edit invalidates any previously undone future.
//!
//! The change counter is a documented approximation: it tracks that
//! something changed since the last save, not a content diff against the
//! saved baseline, so undoing back to an identical state still reads as
//! "has changes".

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::item::DecorItem;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum retained undo snapshots; oldest entries are discarded first.
pub const MAX_UNDO_DEPTH: usize = 50;

// ============================================================================
// SECTION: History
// ============================================================================

/// Bounded linear undo/redo history over item-list snapshots.
///
/// # Invariants
/// - `undo_stack` never holds more than [`MAX_UNDO_DEPTH`] snapshots.
/// - Recording a mutation clears `redo_stack`.
/// - The change counter is monotonic between saves and bumped on every
///   mutation, undo, and redo.
#[derive(Debug, Default, Clone)]
pub struct EditHistory {
    /// Pre-mutation snapshots, most recent last.
    undo_stack: Vec<Vec<DecorItem>>,
    /// Undone snapshots awaiting redo, most recent last.
    redo_stack: Vec<Vec<DecorItem>>,
    /// Count of changes since the last save (or since reset).
    change_counter: u64,
}

impl EditHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            change_counter: 0,
        }
    }

    /// Records the pre-mutation snapshot for a content mutation.
    pub fn record(&mut self, pre_mutation: Vec<DecorItem>) {
        self.undo_stack.push(pre_mutation);
        if self.undo_stack.len() > MAX_UNDO_DEPTH {
            let excess = self.undo_stack.len() - MAX_UNDO_DEPTH;
            self.undo_stack.drain(.. excess);
        }
        self.redo_stack.clear();
        self.change_counter = self.change_counter.saturating_add(1);
    }

    /// Pops the most recent undo snapshot, pushing `current` for redo.
    ///
    /// Returns `None` (a no-op) when the undo stack is empty.
    pub fn undo(&mut self, current: &[DecorItem]) -> Option<Vec<DecorItem>> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        self.change_counter = self.change_counter.saturating_add(1);
        Some(snapshot)
    }

    /// Pops the most recent redo snapshot, pushing `current` for undo.
    ///
    /// Returns `None` (a no-op) when the redo stack is empty. Redo pushes
    /// directly, bypassing the trim-and-clear performed by [`Self::record`].
    pub fn redo(&mut self, current: &[DecorItem]) -> Option<Vec<DecorItem>> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        self.change_counter = self.change_counter.saturating_add(1);
        Some(snapshot)
    }

    /// Clears both stacks and the change counter.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.change_counter = 0;
    }

    /// Returns whether any change occurred since the last save.
    #[must_use]
    pub const fn has_pending_changes(&self) -> bool {
        self.change_counter > 0
    }

    /// Returns the change counter value.
    #[must_use]
    pub const fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// Returns whether an undo snapshot is available.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns whether a redo snapshot is available.
    #[must_use]
    pub const fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Returns the current undo stack depth.
    #[must_use]
    pub const fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the current redo stack depth.
    #[must_use]
    pub const fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}
