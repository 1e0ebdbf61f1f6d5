//! Non-delay list scheduler.
//!
//! # Algorithm
//!
//! 1. Every job offers its next unscheduled operation as a [`Candidate`],
//!    with earliest start `max(job ready, machine ready)`.
//! 2. Among the candidates that can start at the smallest earliest start,
//!    the rule engine picks one.
//! 3. The pick is scheduled at its earliest start; job and machine ready
//!    times advance to its end.
//!
//! No machine is ever left idle while an operation could run on it, so
//! the result is a non-delay schedule.
//!
//! # Complexity
//! O(n² · r) where n = operations and r = rules in the engine.
//!
//! # Reference
//! Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"

use log::trace;

use crate::cp::extract_schedule;
use crate::dispatching::{Candidate, RuleEngine, RuleKind, SchedulingContext};
use crate::models::{JobShopInstance, Schedule};

/// Priority-rule list scheduler.
///
/// # Example
///
/// ```
/// use u_jobshop::models::JobShopInstance;
/// use u_jobshop::scheduler::SimpleScheduler;
///
/// let instance = JobShopInstance::new(vec![
///     vec![(0, 3), (1, 2)],
///     vec![(1, 4), (0, 1)],
/// ]).unwrap();
///
/// let schedule = SimpleScheduler::new().schedule(&instance);
/// assert_eq!(schedule.operation_count(), 4);
/// assert!(schedule.is_feasible(&instance));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleScheduler {
    rule_engine: RuleEngine,
}

impl SimpleScheduler {
    /// Creates a scheduler with the default rule (MWKR, then SPT).
    pub fn new() -> Self {
        Self {
            rule_engine: RuleKind::default().engine(),
        }
    }

    /// Uses the given rule engine.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Uses a named rule.
    pub fn with_rule(self, kind: RuleKind) -> Self {
        self.with_rule_engine(kind.engine())
    }

    /// Builds a schedule.
    pub fn schedule(&self, instance: &JobShopInstance) -> Schedule {
        extract_schedule(instance, &self.start_times(instance))
    }

    /// Start time of every operation, indexed by dense operation id.
    pub fn start_times(&self, instance: &JobShopInstance) -> Vec<i64> {
        let num_jobs = instance.num_jobs();
        let mut starts = vec![0; instance.num_operations()];
        let mut next_position = vec![0usize; num_jobs];
        let mut remaining_work: Vec<i64> = instance.jobs().iter().map(|j| j.total_duration).collect();
        let mut job_ready = vec![0i64; num_jobs];
        let mut machine_ready = vec![0i64; instance.num_machines()];

        let mut candidates = Vec::with_capacity(num_jobs);
        for _ in 0..instance.num_operations() {
            candidates.clear();
            for job in instance.jobs() {
                let position = next_position[job.index];
                let Some(&op) = job.operations.get(position) else {
                    continue;
                };
                let operation = instance.operation(op);
                let ready_time = job_ready[job.index];
                candidates.push(Candidate {
                    op,
                    key: operation.key,
                    machine: operation.machine,
                    duration: operation.duration,
                    remaining_work: remaining_work[job.index],
                    remaining_operations: job.operation_count() - position,
                    ready_time,
                    earliest_start: ready_time.max(machine_ready[operation.machine]),
                    next_machine: job
                        .operations
                        .get(position + 1)
                        .map(|&next| instance.operation(next).machine),
                });
            }

            let Some(now) = candidates.iter().map(|c| c.earliest_start).min() else {
                break;
            };
            candidates.retain(|c| c.earliest_start == now);

            let mut queued_work = vec![0i64; instance.num_machines()];
            for c in &candidates {
                queued_work[c.machine] += c.duration;
            }
            let context = SchedulingContext::at_time(now).with_queued_work(queued_work);

            let Some(best) = self.rule_engine.select_best(&candidates, &context) else {
                break;
            };
            let pick = &candidates[best];
            let end = pick.earliest_start + pick.duration;
            trace!("dispatch {} on machine {} at {}", pick.key, pick.machine, pick.earliest_start);

            starts[pick.op.get()] = pick.earliest_start;
            let job = pick.key.job;
            next_position[job] += 1;
            remaining_work[job] -= pick.duration;
            job_ready[job] = end;
            machine_ready[pick.machine] = end;
        }

        starts
    }
}

impl Default for SimpleScheduler {
    fn default() -> Self {
        Self::new()
    }
}
