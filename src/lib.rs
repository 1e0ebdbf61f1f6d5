//! Exact job-shop scheduling.
//!
//! Jobs are fixed routes of operations, each needing one machine for a
//! fixed duration. A machine runs one operation at a time. The crate
//! finds a schedule of minimum makespan with a constraint-propagating
//! branch-and-bound search, seeded by a dispatching-rule heuristic.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `JobShopInstance`, `Job`, `Operation`,
//!   `Schedule`
//! - **`validation`**: Input integrity checks (machine ids, durations,
//!   empty jobs, horizon overflow)
//! - **`cp`**: Interval variables, constraint store, propagation,
//!   branch-and-bound search and the `JobShopSolver` facade
//! - **`dispatching`**: Priority rules (SPT, LPT, MWKR, ...) and the
//!   multi-layer rule engine
//! - **`scheduler`**: Non-delay list scheduler and schedule KPIs
//! - **`generator`**: Seeded random instances
//!
//! # Example
//!
//! ```
//! use u_jobshop::cp::{JobShopSolver, SolveStatus};
//!
//! let outcome = JobShopSolver::new()
//!     .solve_jobs(vec![vec![(0, 3), (1, 2)], vec![(1, 4), (0, 1)]], None)
//!     .unwrap();
//! assert_eq!(outcome.status, SolveStatus::Optimal);
//! assert_eq!(outcome.makespan(), Some(6));
//! ```
//!
//! # Features
//!
//! - **`parallel`**: explores independent subtrees on rayon workers when
//!   `SolverConfig::num_workers > 1`.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"
//! - Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling"

pub mod cp;
pub mod dispatching;
pub mod generator;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use cp::{JobShopSolver, SolveOutcome, SolveStatus, SolverConfig};
pub use models::{JobShopInstance, Schedule};
pub use validation::InvalidInstance;

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use crate::cp::{JobShopSolver, SolveStatus, SolverConfig};
    use crate::generator::{GeneratorConfig, InstanceGenerator};
    use crate::models::JobShopInstance;
    use crate::scheduler::SimpleScheduler;

    fn small_instance(jobs: usize, machines: usize, seed: u64) -> JobShopInstance {
        let config = GeneratorConfig {
            num_jobs: jobs,
            num_machines: machines,
            duration_range: (1, 9),
        };
        InstanceGenerator::new(config, seed).generate().unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn solver_output_is_feasible_and_optimal(
            jobs in 1usize..=3,
            machines in 1usize..=3,
            seed in any::<u64>(),
        ) {
            let inst = small_instance(jobs, machines, seed);
            let outcome = JobShopSolver::new().solve(&inst);

            prop_assert_eq!(outcome.status, SolveStatus::Optimal);
            let schedule = outcome.schedule.unwrap();
            prop_assert!(schedule.violations(&inst).is_empty());

            let warm = SimpleScheduler::new().schedule(&inst);
            prop_assert!(schedule.makespan <= warm.makespan);

            let by_machine = (0..inst.num_machines()).map(|m| inst.machine_load(m)).max().unwrap_or(0);
            let by_job = inst.jobs().iter().map(|j| j.total_duration).max().unwrap_or(0);
            prop_assert!(schedule.makespan >= by_machine.max(by_job));
        }

        #[test]
        fn warm_start_does_not_change_optimum(
            jobs in 1usize..=3,
            machines in 1usize..=3,
            seed in any::<u64>(),
        ) {
            let inst = small_instance(jobs, machines, seed);
            let cold = JobShopSolver::with_config(SolverConfig::default().with_warm_start(false))
                .solve(&inst);
            let warm = JobShopSolver::new().solve(&inst);
            prop_assert_eq!(cold.makespan(), warm.makespan());
        }

        #[test]
        fn budgeted_search_returns_feasible_schedules(
            seed in any::<u64>(),
            nodes in 1u64..20,
        ) {
            let inst = small_instance(4, 3, seed);
            let config = SolverConfig::default().with_node_limit(nodes);
            let outcome = JobShopSolver::with_config(config).solve(&inst);

            prop_assert!(outcome.status != SolveStatus::Infeasible);
            if let Some(schedule) = outcome.schedule {
                prop_assert!(schedule.is_feasible(&inst));
            }
        }
    }

    #[cfg(feature = "parallel")]
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn parallel_agrees_with_sequential(seed in any::<u64>()) {
            let inst = small_instance(4, 3, seed);
            let sequential = JobShopSolver::new().solve(&inst);
            let parallel = JobShopSolver::with_config(
                SolverConfig::default().with_num_workers(3).with_split_depth(3),
            )
            .solve(&inst);

            prop_assert_eq!(parallel.status, SolveStatus::Optimal);
            prop_assert_eq!(parallel.makespan(), sequential.makespan());
        }
    }
}
