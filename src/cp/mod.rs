//! Constraint-based branch-and-bound for the job-shop problem.
//!
//! Every operation is an interval variable with a start domain and a
//! fixed duration. Job routes become precedence arcs; every pair of
//! operations sharing a machine becomes a disjunction that the search
//! orders one way or the other. After each decision a propagator
//! tightens start and end bounds to a fixed point and commits pair
//! orders that only fit one way.
//!
//! # Modules
//!
//! - [`domain`]: interval variables and bound tightening
//! - [`constraint`]: precedence arcs, disjunctions and machine groups
//! - [`propagator`]: fixed-point bound propagation
//! - [`search`]: depth-first branch-and-bound with an undo trail
//! - [`monitor`]: time, node and cancellation budgets, progress logging
//! - [`solver`]: the [`JobShopSolver`] facade
//!
//! # Reference
//! - Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling"
//! - Applegate & Cook (1991), "A Computational Study of the Job-Shop
//!   Scheduling Problem"

pub mod config;
pub mod constraint;
pub mod domain;
mod extract;
pub mod incumbent;
pub mod monitor;
#[cfg(feature = "parallel")]
mod parallel;
pub mod propagator;
pub mod search;
pub mod solver;
mod state;
pub mod stats;
mod trail;

pub use config::SolverConfig;
pub use constraint::{ConstraintStore, Disjunction, NoOverlapGroup, PairOrder, Precedence};
pub use domain::{InfeasibleBound, IntervalVar};
pub use extract::extract_schedule;
pub use incumbent::{Incumbent, IncumbentStore, LocalIncumbent, SharedIncumbent};
pub use monitor::{
    CancellationMonitor, CompositeMonitor, FirstSolutionMonitor, LogMonitor, NodeLimitMonitor,
    SearchCommand, SearchMonitor, TimeLimitMonitor,
};
pub use propagator::{Infeasible, Propagator};
pub use search::{earliest_makespan, makespan_lower_bound, SearchEngine, SearchOutcome};
pub use solver::{JobShopSolver, SolveOutcome, SolveStatus, TerminationReason};
pub use state::SearchState;
pub use stats::SearchStatistics;
