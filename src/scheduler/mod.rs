//! Greedy scheduling and KPI evaluation.
//!
//! Provides a priority-rule list scheduler and schedule quality metrics.
//!
//! # Algorithm
//!
//! `SimpleScheduler` builds a non-delay schedule with a dispatching rule.
//! It is not optimal, but provides fast baseline solutions; the
//! branch-and-bound solver uses it as warm start.
//!
//! # KPI
//!
//! `ScheduleKpi` computes makespan, per-machine busy time, utilization,
//! idle time, flow time and the bottleneck machine.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod simple;

pub use kpi::{MachineKpi, ScheduleKpi};
pub use simple::SimpleScheduler;
