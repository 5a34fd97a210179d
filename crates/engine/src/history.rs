//! Snapshot-based undo/redo for timeline edits.
//!
//! Because `TimelineState` is an immutable value, history is just two
//! stacks of snapshots. Before each edit the engine pushes the prior
//! snapshot with a label; `undo` trades the current snapshot for the one
//! on top of the undo stack, and `redo` goes the other way. Batch mode
//! collapses a burst of small edits (a drag, a bulk import) into a
//! single undo step.

use tc_timeline::TimelineState;
use tracing::{debug, warn};

/// One entry on an undo/redo stack.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Human-readable action label ("Move clip", "Delete clip").
    pub label: String,
    /// The timeline snapshot before the labeled action ran.
    pub snapshot: TimelineState,
}

/// Bounded undo/redo stacks over `TimelineState` snapshots.
#[derive(Debug)]
pub struct HistoryManager {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_entries: usize,
    /// When Some, pushes are suppressed until `end_batch`.
    batch: Option<HistoryEntry>,
}

impl HistoryManager {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries,
            batch: None,
        }
    }

    /// Push the state *before* an action onto the undo stack.
    ///
    /// Clears the redo stack (the edit forks a new branch). Suppressed
    /// while a batch is open.
    pub fn push(&mut self, label: &str, snapshot: TimelineState) {
        if self.batch.is_some() {
            debug!(label, "History push suppressed: batch in progress");
            return;
        }

        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry {
            label: label.to_string(),
            snapshot,
        });
        self.trim();
        debug!(label, undo_depth = self.undo_stack.len(), "History entry pushed");
    }

    /// Undo the last action. `current` is the live snapshot; it moves to
    /// the redo stack so `redo` can come back here. Returns the snapshot
    /// to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: TimelineState) -> Option<TimelineState> {
        self.abort_stuck_batch("undo");
        let entry = self.undo_stack.pop()?;
        debug!(label = %entry.label, undo_remaining = self.undo_stack.len(), "Undo");
        self.redo_stack.push(HistoryEntry {
            label: entry.label,
            snapshot: current,
        });
        Some(entry.snapshot)
    }

    /// Redo the last undone action. `current` moves to the undo stack.
    pub fn redo(&mut self, current: TimelineState) -> Option<TimelineState> {
        self.abort_stuck_batch("redo");
        let entry = self.redo_stack.pop()?;
        debug!(label = %entry.label, redo_remaining = self.redo_stack.len(), "Redo");
        self.undo_stack.push(HistoryEntry {
            label: entry.label,
            snapshot: current,
        });
        self.trim();
        Some(entry.snapshot)
    }

    /// Open a batch. Pushes are suppressed until `end_batch`, which
    /// records `before` as the single undo entry for the whole batch.
    pub fn start_batch(&mut self, label: &str, before: TimelineState) {
        if self.batch.is_some() {
            warn!(label, "start_batch while already batching, ignoring");
            return;
        }
        debug!(label, "Batch started");
        self.batch = Some(HistoryEntry {
            label: label.to_string(),
            snapshot: before,
        });
    }

    /// Close the current batch, pushing its before-snapshot as one entry.
    /// No-op when no batch is open.
    pub fn end_batch(&mut self) {
        let Some(entry) = self.batch.take() else {
            return;
        };
        self.redo_stack.clear();
        self.undo_stack.push(entry);
        self.trim();
        debug!(undo_depth = self.undo_stack.len(), "Batch ended, entry pushed");
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the action that would be undone next.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.label.as_str())
    }

    /// Label of the action that would be redone next.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.label.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batch = None;
        debug!("History cleared");
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    // Undo/redo during an open batch means a lost drag-end somewhere;
    // discard the batch rather than wedging history.
    fn abort_stuck_batch(&mut self, op: &str) {
        if self.batch.take().is_some() {
            warn!(op, "Discarding stuck batch");
        }
    }
}
