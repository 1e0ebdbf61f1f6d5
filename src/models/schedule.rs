//! Schedule (solution) model.
//!
//! A schedule fixes a start time for every operation of an instance.
//! It is the only shape handed to reporting or charting collaborators:
//! a flat list of [`ScheduledOperation`] records plus the makespan.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};

use super::{JobShopInstance, Operation, OperationKey};

/// A complete schedule.
///
/// Records are stored in dense operation order (job-major, then position).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// One record per operation.
    pub operations: Vec<ScheduledOperation>,
    /// Latest end among the last operations of all jobs.
    pub makespan: i64,
}

/// An operation placed on its machine in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// Job index.
    pub job: usize,
    /// Position within the job.
    pub position: usize,
    /// Machine id.
    pub machine: usize,
    /// Start time.
    pub start: i64,
    /// End time (`start + duration`).
    pub end: i64,
    /// Processing duration.
    pub duration: i64,
}

/// A rule broken by a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Operation the violation is reported on.
    pub operation: OperationKey,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Operation started before its job predecessor ended.
    PrecedenceViolation,
    /// Two operations overlap on the same machine.
    MachineOverlap,
    /// `end - start` differs from the operation's duration, or the record
    /// disagrees with the instance (machine, missing or extra record).
    RecordMismatch,
    /// Reported makespan differs from the last operations' ends.
    MakespanMismatch,
}

impl ScheduledOperation {
    /// Places `operation` at `start`.
    pub fn from_operation(operation: &Operation, start: i64) -> Self {
        Self {
            job: operation.job(),
            position: operation.position(),
            machine: operation.machine,
            start,
            end: start + operation.duration,
            duration: operation.duration,
        }
    }

    /// `(job, position)` key.
    #[inline]
    pub fn key(&self) -> OperationKey {
        OperationKey::new(self.job, self.position)
    }

    /// Whether the two records overlap in time.
    ///
    /// Touching intervals (`a.end == b.start`) do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &ScheduledOperation) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        operation: OperationKey,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            operation,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates a schedule from records, computing the makespan as the
    /// latest end of each job's last operation.
    pub fn new(operations: Vec<ScheduledOperation>) -> Self {
        let makespan = last_operation_ends(&operations).max().unwrap_or(0);
        Self {
            operations,
            makespan,
        }
    }

    /// Record for the operation at `key`.
    pub fn operation(&self, key: OperationKey) -> Option<&ScheduledOperation> {
        self.operations.iter().find(|op| op.key() == key)
    }

    /// Records of a job, in position order.
    pub fn operations_for_job(&self, job: usize) -> Vec<&ScheduledOperation> {
        let mut ops: Vec<_> = self.operations.iter().filter(|op| op.job == job).collect();
        ops.sort_by_key(|op| op.position);
        ops
    }

    /// Records of a machine, in start-time order.
    pub fn operations_for_machine(&self, machine: usize) -> Vec<&ScheduledOperation> {
        let mut ops: Vec<_> = self
            .operations
            .iter()
            .filter(|op| op.machine == machine)
            .collect();
        ops.sort_by_key(|op| (op.start, op.end, op.job, op.position));
        ops
    }

    /// Completion time of a job (end of its last operation).
    pub fn job_completion_time(&self, job: usize) -> Option<i64> {
        self.operations_for_job(job).last().map(|op| op.end)
    }

    /// Total processing time on a machine.
    pub fn machine_busy_time(&self, machine: usize) -> i64 {
        self.operations
            .iter()
            .filter(|op| op.machine == machine)
            .map(|op| op.duration)
            .sum()
    }

    /// Machine utilization: busy time / makespan.
    ///
    /// Returns `None` if the makespan is zero.
    pub fn machine_utilization(&self, machine: usize) -> Option<f64> {
        if self.makespan <= 0 {
            return None;
        }
        Some(self.machine_busy_time(machine) as f64 / self.makespan as f64)
    }

    /// The last operation to finish. Ties go to the lowest `(job, position)`.
    pub fn last_finishing(&self) -> Option<&ScheduledOperation> {
        self.operations
            .iter()
            .max_by(|a, b| a.end.cmp(&b.end).then_with(|| b.key().cmp(&a.key())))
    }

    /// Number of records.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Checks the schedule against an instance.
    ///
    /// Returns every violation found; an empty vector means the schedule
    /// is feasible for `instance` and its makespan is consistent.
    pub fn violations(&self, instance: &JobShopInstance) -> Vec<Violation> {
        let mut violations = Vec::new();

        if self.operations.len() != instance.num_operations() {
            violations.push(Violation::new(
                ViolationType::RecordMismatch,
                OperationKey::new(0, 0),
                format!(
                    "schedule has {} records, instance has {} operations",
                    self.operations.len(),
                    instance.num_operations()
                ),
            ));
        }

        for rec in &self.operations {
            let Some(id) = instance.operation_id(rec.key()) else {
                violations.push(Violation::new(
                    ViolationType::RecordMismatch,
                    rec.key(),
                    format!("{} does not exist in the instance", rec.key()),
                ));
                continue;
            };
            let op = instance.operation(id);
            if op.machine != rec.machine || op.duration != rec.duration {
                violations.push(Violation::new(
                    ViolationType::RecordMismatch,
                    rec.key(),
                    format!(
                        "{} recorded on machine {} for {}, instance says machine {} for {}",
                        rec.key(),
                        rec.machine,
                        rec.duration,
                        op.machine,
                        op.duration
                    ),
                ));
            }
            if rec.end - rec.start != rec.duration || rec.start < 0 {
                violations.push(Violation::new(
                    ViolationType::RecordMismatch,
                    rec.key(),
                    format!("{} spans [{}, {})", rec.key(), rec.start, rec.end),
                ));
            }
        }

        for job in 0..instance.num_jobs() {
            let ops = self.operations_for_job(job);
            for pair in ops.windows(2) {
                if pair[0].end > pair[1].start {
                    violations.push(Violation::new(
                        ViolationType::PrecedenceViolation,
                        pair[1].key(),
                        format!(
                            "{} starts at {} before {} ends at {}",
                            pair[1].key(),
                            pair[1].start,
                            pair[0].key(),
                            pair[0].end
                        ),
                    ));
                }
            }
        }

        for machine in 0..instance.num_machines() {
            let ops = self.operations_for_machine(machine);
            for i in 0..ops.len() {
                for j in (i + 1)..ops.len() {
                    if ops[i].overlaps(ops[j]) {
                        violations.push(Violation::new(
                            ViolationType::MachineOverlap,
                            ops[j].key(),
                            format!(
                                "{} [{}, {}) overlaps {} [{}, {}) on machine {}",
                                ops[i].key(),
                                ops[i].start,
                                ops[i].end,
                                ops[j].key(),
                                ops[j].start,
                                ops[j].end,
                                machine
                            ),
                        ));
                    }
                }
            }
        }

        let expected = last_operation_ends(&self.operations).max().unwrap_or(0);
        if expected != self.makespan {
            violations.push(Violation::new(
                ViolationType::MakespanMismatch,
                OperationKey::new(0, 0),
                format!("makespan {} but last operations end at {}", self.makespan, expected),
            ));
        }

        violations
    }

    /// Whether the schedule satisfies every rule of `instance`.
    pub fn is_feasible(&self, instance: &JobShopInstance) -> bool {
        self.violations(instance).is_empty()
    }
}

/// Ends of each job's highest-position record.
fn last_operation_ends(ops: &[ScheduledOperation]) -> impl Iterator<Item = i64> + '_ {
    ops.iter()
        .filter(move |op| {
            !ops
                .iter()
                .any(|other| other.job == op.job && other.position > op.position)
        })
        .map(|op| op.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(job: usize, position: usize, machine: usize, start: i64, duration: i64) -> ScheduledOperation {
        ScheduledOperation {
            job,
            position,
            machine,
            start,
            end: start + duration,
            duration,
        }
    }

    fn instance() -> JobShopInstance {
        JobShopInstance::new(vec![vec![(0, 3), (1, 2)], vec![(1, 4), (0, 1)]]).unwrap()
    }

    fn sample_schedule() -> Schedule {
        Schedule::new(vec![
            rec(0, 0, 0, 0, 3),
            rec(0, 1, 1, 4, 2),
            rec(1, 0, 1, 0, 4),
            rec(1, 1, 0, 4, 1),
        ])
    }

    #[test]
    fn test_schedule_makespan() {
        let s = sample_schedule();
        assert_eq!(s.makespan, 6);
    }

    #[test]
    fn test_schedule_is_feasible() {
        let s = sample_schedule();
        assert!(s.violations(&instance()).is_empty());
        assert!(s.is_feasible(&instance()));
    }

    #[test]
    fn test_precedence_violation() {
        let mut s = sample_schedule();
        s.operations[1] = rec(0, 1, 1, 2, 2);
        s.operations[2] = rec(1, 0, 1, 4, 4);
        s.operations[3] = rec(1, 1, 0, 8, 1);
        s.makespan = 9;
        let violations = s.violations(&instance());
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::PrecedenceViolation
                && v.operation == OperationKey::new(0, 1)));
    }

    #[test]
    fn test_machine_overlap() {
        let mut s = sample_schedule();
        s.operations[1] = rec(0, 1, 1, 3, 2);
        s.makespan = 5;
        let violations = s.violations(&instance());
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::MachineOverlap));
    }

    #[test]
    fn test_record_mismatch() {
        let mut s = sample_schedule();
        s.operations[0].end = 5;
        let violations = s.violations(&instance());
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::RecordMismatch));
    }

    #[test]
    fn test_makespan_mismatch() {
        let mut s = sample_schedule();
        s.makespan = 10;
        let violations = s.violations(&instance());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, ViolationType::MakespanMismatch);
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = rec(0, 0, 0, 0, 3);
        let b = rec(1, 0, 0, 3, 2);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&rec(1, 0, 0, 2, 2)));
    }

    #[test]
    fn test_operations_for_machine_sorted_by_start() {
        let s = sample_schedule();
        let m1 = s.operations_for_machine(1);
        assert_eq!(m1.len(), 2);
        assert_eq!(m1[0].key(), OperationKey::new(1, 0));
        assert_eq!(m1[1].key(), OperationKey::new(0, 1));
    }

    #[test]
    fn test_job_completion_time() {
        let s = sample_schedule();
        assert_eq!(s.job_completion_time(0), Some(6));
        assert_eq!(s.job_completion_time(1), Some(5));
        assert_eq!(s.job_completion_time(9), None);
    }

    #[test]
    fn test_machine_utilization() {
        let s = sample_schedule();
        assert_eq!(s.machine_busy_time(0), 4);
        assert_eq!(s.machine_busy_time(1), 6);
        let util = s.machine_utilization(1).unwrap();
        assert!((util - 1.0).abs() < 1e-10);
        let util0 = s.machine_utilization(0).unwrap();
        assert!((util0 - 4.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_last_finishing() {
        let s = sample_schedule();
        assert_eq!(s.last_finishing().unwrap().key(), OperationKey::new(0, 1));
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::default();
        assert_eq!(s.makespan, 0);
        assert_eq!(s.operation_count(), 0);
        assert!(s.machine_utilization(0).is_none());
        assert!(s.last_finishing().is_none());
    }

    #[test]
    fn test_serialize_records() {
        let s = sample_schedule();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"makespan\":6"));
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
