//! Operation model.
//!
//! An operation is the smallest schedulable unit of work: one processing
//! step of a job, bound to exactly one machine for a fixed duration.
//!
//! Operations are enumerated once at model-build time (job-major, then
//! position), so every component can address them by a dense
//! [`OperationId`] instead of looking them up by key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable `(job, position)` key of an operation.
///
/// Ordering is lexicographic (job first), which is the order the search
/// uses to break ties between disjunctions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationKey {
    /// Job index (0-based).
    pub job: usize,
    /// Position within the job (0-based).
    pub position: usize,
}

impl OperationKey {
    /// Creates a new key.
    #[inline]
    pub fn new(job: usize, position: usize) -> Self {
        Self { job, position }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O({},{})", self.job, self.position)
    }
}

/// Dense index of an operation within a [`JobShopInstance`](super::JobShopInstance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct OperationId(pub usize);

impl OperationId {
    /// Returns the raw index.
    #[inline(always)]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A validated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// `(job, position)` key.
    pub key: OperationKey,
    /// Machine that processes this operation.
    pub machine: usize,
    /// Fixed processing duration (time units, non-negative).
    pub duration: i64,
}

impl Operation {
    /// Creates a new operation.
    pub fn new(key: OperationKey, machine: usize, duration: i64) -> Self {
        Self {
            key,
            machine,
            duration,
        }
    }

    /// Job index.
    #[inline]
    pub fn job(&self) -> usize {
        self.key.job
    }

    /// Position within the job.
    #[inline]
    pub fn position(&self) -> usize {
        self.key.position
    }
}
