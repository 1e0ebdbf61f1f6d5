//! Solution extraction.
//!
//! Turns fixed start times into a [`Schedule`]. The starts come from a
//! fully ordered, propagated state (or a checked warm start), so no
//! feasibility check is repeated here.

use crate::models::{JobShopInstance, Schedule, ScheduledOperation};

/// Builds the schedule for `starts`, indexed by dense operation id.
///
/// Records follow the dense id order; the makespan is the latest end
/// among the last operations of all jobs.
pub fn extract_schedule(instance: &JobShopInstance, starts: &[i64]) -> Schedule {
    debug_assert_eq!(starts.len(), instance.num_operations());
    let records = instance
        .operations()
        .iter()
        .zip(starts)
        .map(|(op, &start)| ScheduledOperation::from_operation(op, start))
        .collect();
    Schedule::new(records)
}
