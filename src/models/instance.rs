//! Job-shop problem instance.
//!
//! The read-only index every other component works from: jobs, the
//! canonical operation list, per-machine operation lists and the
//! horizon. Built once from raw `(machine, duration)` data and never
//! mutated afterwards.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7

use serde::{Deserialize, Serialize};

use super::{Job, Operation, OperationId, OperationKey};
use crate::validation::{infer_num_machines, validate_jobs, InvalidInstance};

/// Raw instance data as handed over by a loader.
///
/// Machine ids and durations are signed so malformed input can be
/// represented and rejected by validation.
///
/// # Examples
///
/// ```
/// use u_jobshop::models::{InstanceData, JobShopInstance};
///
/// let data = InstanceData::new(vec![vec![(0, 3), (1, 2)], vec![(1, 4)]]);
/// let instance = JobShopInstance::try_from(data).unwrap();
/// assert_eq!(instance.num_machines(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Machine count. `None` = inferred as `max(machine id) + 1`.
    #[serde(default)]
    pub num_machines: Option<usize>,
    /// Jobs as ordered `(machine id, duration)` pairs.
    pub jobs: Vec<Vec<(i64, i64)>>,
}

impl InstanceData {
    /// Creates instance data with an inferred machine count.
    pub fn new(jobs: Vec<Vec<(i64, i64)>>) -> Self {
        Self {
            num_machines: None,
            jobs,
        }
    }

    /// Sets an explicit machine count.
    pub fn with_num_machines(mut self, num_machines: usize) -> Self {
        self.num_machines = Some(num_machines);
        self
    }
}

/// A validated job-shop instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobShopInstance {
    jobs: Vec<Job>,
    operations: Vec<Operation>,
    machine_operations: Vec<Vec<OperationId>>,
    horizon: i64,
}

impl JobShopInstance {
    /// Builds an instance, inferring the machine count.
    ///
    /// # Errors
    /// The first [`InvalidInstance`] detected by validation.
    pub fn new(jobs: Vec<Vec<(i64, i64)>>) -> Result<Self, InvalidInstance> {
        let num_machines = infer_num_machines(&jobs);
        Self::build(&jobs, num_machines)
    }

    /// Builds an instance with an explicit machine count.
    ///
    /// Machines without operations are allowed.
    ///
    /// # Errors
    /// The first [`InvalidInstance`] detected by validation.
    pub fn with_machines(
        jobs: Vec<Vec<(i64, i64)>>,
        num_machines: usize,
    ) -> Result<Self, InvalidInstance> {
        Self::build(&jobs, num_machines)
    }

    fn build(jobs: &[Vec<(i64, i64)>], num_machines: usize) -> Result<Self, InvalidInstance> {
        if let Some(first) = validate_jobs(jobs, num_machines).into_iter().next() {
            return Err(first);
        }

        let mut operations = Vec::with_capacity(jobs.iter().map(Vec::len).sum());
        let mut machine_operations = vec![Vec::new(); num_machines];
        let mut built_jobs = Vec::with_capacity(jobs.len());
        let mut horizon: i64 = 0;

        for (job_index, raw_ops) in jobs.iter().enumerate() {
            let mut ids = Vec::with_capacity(raw_ops.len());
            let mut total: i64 = 0;

            for (position, &(machine, duration)) in raw_ops.iter().enumerate() {
                let id = OperationId(operations.len());
                // Range already checked by validation.
                let machine = machine as usize;
                operations.push(Operation::new(
                    OperationKey::new(job_index, position),
                    machine,
                    duration,
                ));
                machine_operations[machine].push(id);
                ids.push(id);
                total += duration;
            }

            horizon += total;
            built_jobs.push(Job::new(job_index, ids, total));
        }

        Ok(Self {
            jobs: built_jobs,
            operations,
            machine_operations,
            horizon,
        })
    }

    /// Jobs in index order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// All operations in dense-id order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operation by dense id.
    #[inline]
    pub fn operation(&self, id: OperationId) -> &Operation {
        &self.operations[id.get()]
    }

    /// Dense id of the operation at `key`, if it exists.
    pub fn operation_id(&self, key: OperationKey) -> Option<OperationId> {
        self.jobs
            .get(key.job)
            .and_then(|job| job.operations.get(key.position))
            .copied()
    }

    /// Operation ids assigned to `machine`, in dense-id order.
    pub fn machine_operations(&self, machine: usize) -> &[OperationId] {
        self.machine_operations
            .get(machine)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of jobs.
    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Number of machines.
    pub fn num_machines(&self) -> usize {
        self.machine_operations.len()
    }

    /// Number of operations.
    pub fn num_operations(&self) -> usize {
        self.operations.len()
    }

    /// Safe upper bound on any timestamp: the sum of all durations.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Ids of the last operation of every job.
    pub fn last_operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.jobs.iter().filter_map(Job::last)
    }

    /// Total processing time on `machine`.
    pub fn machine_load(&self, machine: usize) -> i64 {
        self.machine_operations(machine)
            .iter()
            .map(|&id| self.operation(id).duration)
            .sum()
    }

    /// Converts back into raw data.
    pub fn to_data(&self) -> InstanceData {
        let jobs = self
            .jobs
            .iter()
            .map(|job| {
                job.operations
                    .iter()
                    .map(|&id| {
                        let op = self.operation(id);
                        (op.machine as i64, op.duration)
                    })
                    .collect()
            })
            .collect();
        InstanceData {
            num_machines: Some(self.num_machines()),
            jobs,
        }
    }
}

impl TryFrom<InstanceData> for JobShopInstance {
    type Error = InvalidInstance;

    fn try_from(data: InstanceData) -> Result<Self, Self::Error> {
        match data.num_machines {
            Some(n) => Self::with_machines(data.jobs, n),
            None => Self::new(data.jobs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MAX_MACHINES;

    fn reference() -> JobShopInstance {
        JobShopInstance::new(vec![
            vec![(1, 2), (2, 3), (0, 5)],
            vec![(0, 3), (1, 6), (2, 4)],
            vec![(1, 2), (0, 2), (2, 4)],
        ])
        .unwrap()
    }

    #[test]
    fn test_reference_dimensions() {
        let inst = reference();
        assert_eq!(inst.num_jobs(), 3);
        assert_eq!(inst.num_machines(), 3);
        assert_eq!(inst.num_operations(), 9);
        assert_eq!(inst.horizon(), 31);
    }

    #[test]
    fn test_dense_ids_are_job_major() {
        let inst = reference();
        let id = inst.operation_id(OperationKey::new(1, 2)).unwrap();
        assert_eq!(id, OperationId(5));
        let op = inst.operation(id);
        assert_eq!(op.machine, 2);
        assert_eq!(op.duration, 4);
        assert!(inst.operation_id(OperationKey::new(3, 0)).is_none());
        assert!(inst.operation_id(OperationKey::new(0, 3)).is_none());
    }

    #[test]
    fn test_machine_index() {
        let inst = reference();
        assert_eq!(
            inst.machine_operations(1),
            &[OperationId(0), OperationId(4), OperationId(6)]
        );
        assert_eq!(inst.machine_load(0), 10);
        assert_eq!(inst.machine_load(1), 10);
        assert_eq!(inst.machine_load(2), 11);
        assert!(inst.machine_operations(9).is_empty());
    }

    #[test]
    fn test_last_operations() {
        let inst = reference();
        let last: Vec<_> = inst.last_operations().collect();
        assert_eq!(last, vec![OperationId(2), OperationId(5), OperationId(8)]);
    }

    #[test]
    fn test_explicit_machine_count() {
        let inst = JobShopInstance::with_machines(vec![vec![(0, 1)]], 4).unwrap();
        assert_eq!(inst.num_machines(), 4);
        assert!(inst.machine_operations(3).is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_machine() {
        let err = JobShopInstance::with_machines(vec![vec![(0, 1), (2, 1)]], 2).unwrap_err();
        assert_eq!(
            err,
            InvalidInstance::MachineOutOfRange {
                job: 0,
                position: 1,
                machine: 2,
                num_machines: 2,
            }
        );
    }

    #[test]
    fn test_rejects_huge_machine_id() {
        let err = JobShopInstance::new(vec![vec![(1i64 << 40, 1)]]).unwrap_err();
        assert_eq!(
            err,
            InvalidInstance::TooManyMachines {
                num_machines: (1usize << 40) + 1,
                limit: MAX_MACHINES,
            }
        );

        let err = JobShopInstance::with_machines(vec![vec![(0, 1)]], usize::MAX).unwrap_err();
        assert!(matches!(err, InvalidInstance::TooManyMachines { .. }));

        let inst = JobShopInstance::with_machines(vec![vec![(0, 1)]], MAX_MACHINES).unwrap();
        assert_eq!(inst.num_machines(), MAX_MACHINES);
    }

    #[test]
    fn test_rejects_negative_duration() {
        let err = JobShopInstance::new(vec![vec![(0, -1)]]).unwrap_err();
        assert!(matches!(err, InvalidInstance::NegativeDuration { .. }));
    }

    #[test]
    fn test_rejects_empty_job_list() {
        assert_eq!(
            JobShopInstance::new(vec![]).unwrap_err(),
            InvalidInstance::NoJobs
        );
    }

    #[test]
    fn test_data_round_trip() {
        let inst = reference();
        let data = inst.to_data();
        assert_eq!(data.num_machines, Some(3));
        let rebuilt = JobShopInstance::try_from(data).unwrap();
        assert_eq!(rebuilt, inst);
    }

    #[test]
    fn test_deserialize_instance_data() {
        let json = r#"{"jobs": [[[0, 3], [1, 2]], [[1, 4]]]}"#;
        let data: InstanceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.num_machines, None);
        let inst = JobShopInstance::try_from(data).unwrap();
        assert_eq!(inst.num_machines(), 2);
        assert_eq!(inst.horizon(), 9);
    }
}
