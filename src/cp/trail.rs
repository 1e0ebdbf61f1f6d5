//! Undo trail for depth-first search.
//!
//! Every change made to a [`SearchState`](super::SearchState) below the
//! root is recorded here before it happens. A frame marks where a search
//! depth began; popping the frame replays its entries in reverse and
//! restores the state exactly as it was when the frame was pushed.

use super::domain::IntervalVar;
use crate::models::OperationId;

/// A single recorded change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrailEntry {
    /// Bounds of `op` before a tightening.
    Bounds { op: OperationId, previous: IntervalVar },
    /// Disjunction `pair` was undecided before an order was committed.
    Order { pair: usize },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SearchTrail {
    /// The linear history of all changes made to the state.
    entries: Vec<TrailEntry>,
    /// `frames[i]` is the index in `entries` where depth `i + 1` began.
    frames: Vec<usize>,
}

impl SearchTrail {
    /// Creates an empty trail with room for `num_disjunctions` decision levels.
    pub(crate) fn preallocated(num_operations: usize, num_disjunctions: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_operations + num_disjunctions),
            frames: Vec::with_capacity(num_disjunctions + 1),
        }
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub(crate) fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Whether changes are currently being recorded. Changes at the root
    /// (no frame) are permanent.
    #[inline]
    pub(crate) fn is_recording(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Marks the start of a new decision level.
    #[inline]
    pub(crate) fn push_frame(&mut self) {
        self.frames.push(self.entries.len());
    }

    #[inline]
    pub(crate) fn record(&mut self, entry: TrailEntry) {
        if self.is_recording() {
            self.entries.push(entry);
        }
    }

    /// Removes the newest frame and returns its entries newest-first.
    ///
    /// Returns `None` when there is no frame to pop.
    pub(crate) fn pop_frame(&mut self) -> Option<std::iter::Rev<std::vec::Drain<'_, TrailEntry>>> {
        let start = self.frames.pop()?;
        Some(self.entries.drain(start..).rev())
    }
}
