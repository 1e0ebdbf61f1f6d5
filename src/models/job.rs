//! Job model.
//!
//! A job is an ordered sequence of operations with a fixed precedence
//! chain: the operation at position `k + 1` may not start before the
//! operation at position `k` has ended.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use serde::{Deserialize, Serialize};

use super::OperationId;

/// A job of a [`JobShopInstance`](super::JobShopInstance).
///
/// Holds the dense ids of its operations in processing order. Jobs are
/// immutable after the instance is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job index (0-based).
    pub index: usize,
    /// Operation ids in processing order.
    pub operations: Vec<OperationId>,
    /// Sum of the durations of all operations.
    pub total_duration: i64,
}

impl Job {
    /// Creates a job from its operation ids.
    pub fn new(index: usize, operations: Vec<OperationId>, total_duration: i64) -> Self {
        Self {
            index,
            operations,
            total_duration,
        }
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// First operation, if any.
    pub fn first(&self) -> Option<OperationId> {
        self.operations.first().copied()
    }

    /// Last operation, if any. Its end is the job's completion time.
    pub fn last(&self) -> Option<OperationId> {
        self.operations.last().copied()
    }

    /// Adjacent `(current, next)` pairs of the precedence chain.
    pub fn chain(&self) -> impl Iterator<Item = (OperationId, OperationId)> + '_ {
        self.operations.windows(2).map(|w| (w[0], w[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_accessors() {
        let job = Job::new(0, vec![OperationId(0), OperationId(1), OperationId(2)], 9);
        assert_eq!(job.operation_count(), 3);
        assert_eq!(job.first(), Some(OperationId(0)));
        assert_eq!(job.last(), Some(OperationId(2)));
        assert_eq!(job.total_duration, 9);
    }

    #[test]
    fn test_job_chain() {
        let job = Job::new(1, vec![OperationId(3), OperationId(4), OperationId(5)], 0);
        let chain: Vec<_> = job.chain().collect();
        assert_eq!(
            chain,
            vec![
                (OperationId(3), OperationId(4)),
                (OperationId(4), OperationId(5))
            ]
        );
    }

    #[test]
    fn test_single_operation_has_no_chain() {
        let job = Job::new(0, vec![OperationId(0)], 4);
        assert_eq!(job.chain().count(), 0);
        assert_eq!(job.first(), job.last());
    }
}
