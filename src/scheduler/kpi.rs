//! Schedule quality metrics (KPIs).
//!
//! Computes standard performance indicators from a completed schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Busy time | Sum of durations on a machine |
//! | Utilization | Busy time / makespan |
//! | Idle time | Makespan - busy time |
//! | Avg flow time | Mean job completion time (all jobs released at 0) |
//! | Bottleneck | Machine with the highest busy time |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::Schedule;

/// Per-machine figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineKpi {
    /// Machine id.
    pub machine: usize,
    /// Total processing time.
    pub busy_time: i64,
    /// Time within `[0, makespan]` the machine is idle.
    pub idle_time: i64,
    /// `busy_time / makespan` (0.0 for an empty schedule).
    pub utilization: f64,
    /// Number of operations processed.
    pub operation_count: usize,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Makespan: latest completion time.
    pub makespan: i64,
    /// One entry per machine, in machine order.
    pub machines: Vec<MachineKpi>,
    /// Mean utilization over all machines.
    pub avg_utilization: f64,
    /// Mean job completion time.
    pub avg_flow_time: f64,
    /// Machine with the largest busy time (lowest id on ties).
    pub bottleneck: Option<usize>,
}

impl ScheduleKpi {
    /// Computes KPIs for `num_machines` machines.
    ///
    /// Machines that process no operation appear with zero busy time.
    pub fn calculate(schedule: &Schedule, num_machines: usize) -> Self {
        let makespan = schedule.makespan;

        let machines: Vec<MachineKpi> = (0..num_machines)
            .map(|machine| {
                let busy_time = schedule.machine_busy_time(machine);
                MachineKpi {
                    machine,
                    busy_time,
                    idle_time: (makespan - busy_time).max(0),
                    utilization: schedule.machine_utilization(machine).unwrap_or(0.0),
                    operation_count: schedule
                        .operations
                        .iter()
                        .filter(|op| op.machine == machine)
                        .count(),
                }
            })
            .collect();

        let avg_utilization = if machines.is_empty() {
            0.0
        } else {
            machines.iter().map(|m| m.utilization).sum::<f64>() / machines.len() as f64
        };

        let mut completions: Vec<i64> = Vec::new();
        let mut job = 0;
        while let Some(completion) = schedule.job_completion_time(job) {
            completions.push(completion);
            job += 1;
        }
        let avg_flow_time = if completions.is_empty() {
            0.0
        } else {
            completions.iter().sum::<i64>() as f64 / completions.len() as f64
        };

        let bottleneck = machines
            .iter()
            .max_by(|a, b| a.busy_time.cmp(&b.busy_time).then(b.machine.cmp(&a.machine)))
            .map(|m| m.machine);

        Self {
            makespan,
            machines,
            avg_utilization,
            avg_flow_time,
            bottleneck,
        }
    }

    /// Utilization of one machine, if it exists.
    pub fn utilization(&self, machine: usize) -> Option<f64> {
        self.machines.get(machine).map(|m| m.utilization)
    }

    /// Whether every machine reaches the given utilization.
    pub fn meets_utilization(&self, min_utilization: f64) -> bool {
        self.machines.iter().all(|m| m.utilization >= min_utilization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduledOperation;

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

    /// Optimal schedule of the 3x3 reference instance.
    fn reference_schedule() -> Schedule {
        Schedule::new(vec![
            rec(0, 0, 1, 0, 2),
            rec(0, 1, 2, 2, 3),
            rec(0, 2, 0, 6, 5),
            rec(1, 0, 0, 0, 3),
            rec(1, 1, 1, 4, 6),
            rec(1, 2, 2, 10, 4),
            rec(2, 0, 1, 2, 2),
            rec(2, 1, 0, 4, 2),
            rec(2, 2, 2, 6, 4),
        ])
    }

    #[test]
    fn test_reference_utilization() {
        let kpi = ScheduleKpi::calculate(&reference_schedule(), 3);
        assert_eq!(kpi.makespan, 14);
        assert_eq!(kpi.machines[0].busy_time, 10);
        assert_eq!(kpi.machines[1].busy_time, 10);
        assert_eq!(kpi.machines[2].busy_time, 11);
        assert_eq!(kpi.machines[2].idle_time, 3);
        assert!((kpi.utilization(2).unwrap() - 11.0 / 14.0).abs() < 1e-10);
        assert!((kpi.utilization(0).unwrap() - 10.0 / 14.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 31.0 / 42.0).abs() < 1e-10);
        assert_eq!(kpi.bottleneck, Some(2));
        assert_eq!(kpi.machines[1].operation_count, 3);
    }

    #[test]
    fn test_flow_time() {
        let kpi = ScheduleKpi::calculate(&reference_schedule(), 3);
        // Jobs complete at 11, 14, 10.
        assert!((kpi.avg_flow_time - 35.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_idle_machine() {
        let schedule = Schedule::new(vec![rec(0, 0, 0, 0, 4)]);
        let kpi = ScheduleKpi::calculate(&schedule, 2);
        assert_eq!(kpi.machines[1].busy_time, 0);
        assert_eq!(kpi.machines[1].idle_time, 4);
        assert!((kpi.avg_utilization - 0.5).abs() < 1e-10);
        assert!(!kpi.meets_utilization(0.6));
        assert!(kpi.meets_utilization(0.0));
    }

    #[test]
    fn test_bottleneck_tie_goes_to_lowest_id() {
        let schedule = Schedule::new(vec![rec(0, 0, 1, 0, 3), rec(1, 0, 0, 0, 3)]);
        let kpi = ScheduleKpi::calculate(&schedule, 2);
        assert_eq!(kpi.bottleneck, Some(0));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = ScheduleKpi::calculate(&Schedule::default(), 0);
        assert_eq!(kpi.makespan, 0);
        assert!(kpi.machines.is_empty());
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
        assert_eq!(kpi.bottleneck, None);
        assert_eq!(kpi.utilization(0), None);
    }
}
