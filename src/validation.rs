//! Input validation for job-shop instances.
//!
//! Checks the raw `(machine, duration)` job lists before a
//! [`JobShopInstance`](crate::models::JobShopInstance) is built. Detects:
//! - An empty job list
//! - A machine count above [`MAX_MACHINES`]
//! - Jobs without operations
//! - Machine ids outside `[0, num_machines)`
//! - Negative durations
//! - A horizon (sum of durations) that overflows `i64`
//!
//! Validation runs before any solving; an invalid instance is never
//! partially solved.

use thiserror::Error;

/// Largest accepted machine count.
///
/// The model keeps one operation list and one no-overlap group per
/// machine id, so the count is bounded before anything is allocated.
pub const MAX_MACHINES: usize = 1 << 16;

/// Reasons an instance is rejected at model-build time.
///
/// Every variant that concerns a single operation names it by
/// `(job, position)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInstance {
    /// The job list is empty.
    #[error("instance has no jobs")]
    NoJobs,
    /// The machine count (explicit or `max(machine id) + 1`) exceeds the limit.
    #[error("instance needs {num_machines} machines, at most {limit} are supported")]
    TooManyMachines { num_machines: usize, limit: usize },
    /// A job has no operations.
    #[error("job {job} has no operations")]
    EmptyJob { job: usize },
    /// An operation references a machine outside `[0, num_machines)`.
    #[error(
        "operation ({job},{position}) references machine {machine}, expected 0..{num_machines}"
    )]
    MachineOutOfRange {
        job: usize,
        position: usize,
        machine: i64,
        num_machines: usize,
    },
    /// An operation has a negative duration.
    #[error("operation ({job},{position}) has negative duration {duration}")]
    NegativeDuration {
        job: usize,
        position: usize,
        duration: i64,
    },
    /// The sum of all durations does not fit in `i64`.
    #[error("sum of durations overflows the time representation")]
    HorizonOverflow,
}

/// Infers the machine count as `max(machine id) + 1`.
///
/// Negative ids are ignored here; they are reported by [`validate_jobs`].
pub fn infer_num_machines(jobs: &[Vec<(i64, i64)>]) -> usize {
    jobs.iter()
        .flatten()
        .filter_map(|&(machine, _)| usize::try_from(machine).ok())
        .max()
        .map_or(0, |m| m.saturating_add(1))
}

/// Validates raw job data against a machine count.
///
/// # Returns
/// All detected issues in enumeration order (job-major, then position).
/// An empty vector means the data is valid. A machine count above
/// [`MAX_MACHINES`] is reported alone.
pub fn validate_jobs(jobs: &[Vec<(i64, i64)>], num_machines: usize) -> Vec<InvalidInstance> {
    let mut errors = Vec::new();

    if jobs.is_empty() {
        errors.push(InvalidInstance::NoJobs);
        return errors;
    }

    if num_machines > MAX_MACHINES {
        errors.push(InvalidInstance::TooManyMachines {
            num_machines,
            limit: MAX_MACHINES,
        });
        return errors;
    }

    let mut horizon: Option<i64> = Some(0);

    for (job, ops) in jobs.iter().enumerate() {
        if ops.is_empty() {
            errors.push(InvalidInstance::EmptyJob { job });
        }

        for (position, &(machine, duration)) in ops.iter().enumerate() {
            let in_range = usize::try_from(machine).is_ok_and(|m| m < num_machines);
            if !in_range {
                errors.push(InvalidInstance::MachineOutOfRange {
                    job,
                    position,
                    machine,
                    num_machines,
                });
            }

            if duration < 0 {
                errors.push(InvalidInstance::NegativeDuration {
                    job,
                    position,
                    duration,
                });
            } else {
                horizon = horizon.and_then(|h| h.checked_add(duration));
            }
        }
    }

    if horizon.is_none() {
        errors.push(InvalidInstance::HorizonOverflow);
    }

    errors
}
