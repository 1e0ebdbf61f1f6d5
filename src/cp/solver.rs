//! Job-shop solver facade.
//!
//! One call builds the constraint store, seeds the incumbent with a
//! dispatching-rule schedule, runs the branch-and-bound search and
//! reports a status-tagged [`SolveOutcome`].
//!
//! | Search ended by | Schedule found | Status |
//! |-----------------|----------------|--------|
//! | Exhaustion | yes | `Optimal` |
//! | Exhaustion | no | `Infeasible` |
//! | Budget | yes | `Feasible` |
//! | Budget | no | `Unknown` |

use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::config::SolverConfig;
use super::constraint::ConstraintStore;
use super::extract::extract_schedule;
use super::incumbent::{Incumbent, LocalIncumbent};
use super::monitor::{
    CompositeMonitor, FirstSolutionMonitor, LogMonitor, NodeLimitMonitor, SearchMonitor,
    TimeLimitMonitor,
};
use super::search::{SearchEngine, SearchOutcome};
use super::state::SearchState;
use super::stats::SearchStatistics;
use crate::models::{JobShopInstance, Schedule};
use crate::scheduler::SimpleScheduler;
use crate::validation::InvalidInstance;

/// Solve status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Best schedule found and proven optimal.
    Optimal,
    /// A schedule was found but the budget ended before the proof.
    Feasible,
    /// Proven that no schedule fits the horizon.
    Infeasible,
    /// The budget ended before any schedule was found.
    Unknown,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Feasible => write!(f, "Feasible"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The search space was exhausted with a schedule in hand.
    OptimalityProven,
    /// The search space was exhausted without any schedule.
    InfeasibilityProven,
    /// A budget or monitor stopped the search.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "optimality proven"),
            TerminationReason::InfeasibilityProven => write!(f, "infeasibility proven"),
            TerminationReason::Aborted(reason) => write!(f, "aborted: {reason}"),
        }
    }
}

/// Result of a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Best schedule, present for `Optimal` and `Feasible`.
    pub schedule: Option<Schedule>,
    pub termination_reason: TerminationReason,
    pub statistics: SearchStatistics,
}

impl SolveOutcome {
    /// Makespan of the schedule, if any.
    pub fn makespan(&self) -> Option<i64> {
        self.schedule.as_ref().map(|s| s.makespan)
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    pub fn has_schedule(&self) -> bool {
        self.schedule.is_some()
    }

    /// Maps a search result and its incumbent to a status.
    pub(crate) fn from_search(
        instance: &JobShopInstance,
        outcome: SearchOutcome,
        best: Option<Incumbent>,
        statistics: SearchStatistics,
    ) -> Self {
        let schedule = best.map(|b| extract_schedule(instance, &b.starts));
        let (status, termination_reason) = match (outcome, schedule.is_some()) {
            (SearchOutcome::Exhausted, true) => {
                (SolveStatus::Optimal, TerminationReason::OptimalityProven)
            }
            (SearchOutcome::Exhausted, false) => {
                (SolveStatus::Infeasible, TerminationReason::InfeasibilityProven)
            }
            (SearchOutcome::Aborted(reason), true) => {
                (SolveStatus::Feasible, TerminationReason::Aborted(reason))
            }
            (SearchOutcome::Aborted(reason), false) => {
                (SolveStatus::Unknown, TerminationReason::Aborted(reason))
            }
        };
        Self {
            status,
            schedule,
            termination_reason,
            statistics,
        }
    }
}

/// Branch-and-bound job-shop solver.
///
/// # Example
///
/// ```
/// use u_jobshop::cp::{JobShopSolver, SolveStatus};
/// use u_jobshop::models::JobShopInstance;
///
/// let instance = JobShopInstance::new(vec![
///     vec![(1, 2), (2, 3), (0, 5)],
///     vec![(0, 3), (1, 6), (2, 4)],
///     vec![(1, 2), (0, 2), (2, 4)],
/// ]).unwrap();
///
/// let outcome = JobShopSolver::new().solve(&instance);
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// assert_eq!(outcome.makespan(), Some(14));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobShopSolver {
    config: SolverConfig,
}

impl JobShopSolver {
    /// Solver with the default configuration (no budget, MWKR warm start).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Validates raw jobs and solves them.
    ///
    /// # Errors
    /// [`InvalidInstance`] if the jobs do not form a valid instance; no
    /// search is started.
    pub fn solve_jobs(
        &self,
        jobs: Vec<Vec<(i64, i64)>>,
        num_machines: Option<usize>,
    ) -> Result<SolveOutcome, InvalidInstance> {
        let instance = match num_machines {
            Some(n) => JobShopInstance::with_machines(jobs, n)?,
            None => JobShopInstance::new(jobs)?,
        };
        Ok(self.solve(&instance))
    }

    /// Solves an instance.
    ///
    /// With the `parallel` feature and `num_workers > 1` the tree is split
    /// across rayon workers.
    pub fn solve(&self, instance: &JobShopInstance) -> SolveOutcome {
        #[cfg(feature = "parallel")]
        {
            if self.config.num_workers > 1 {
                return super::parallel::solve_parallel(instance, &self.config);
            }
        }
        self.solve_with_monitor(instance, CompositeMonitor::new())
    }

    /// Solves an instance sequentially with an extra monitor attached
    /// next to the ones the configuration asks for.
    pub fn solve_with_monitor<M>(&self, instance: &JobShopInstance, monitor: M) -> SolveOutcome
    where
        M: SearchMonitor,
    {
        let start = Instant::now();
        let horizon = self.config.effective_horizon(instance.horizon());
        info!(
            "solving {} jobs x {} machines ({} operations), horizon {}",
            instance.num_jobs(),
            instance.num_machines(),
            instance.num_operations(),
            horizon
        );

        let store = ConstraintStore::new(instance);
        let mut incumbent = match warm_start(instance, &self.config, horizon) {
            Some(seed) => LocalIncumbent::seeded(seed),
            None => LocalIncumbent::new(),
        };

        let mut monitors = build_monitors(&self.config, deadline(&self.config, start));
        monitors.add_monitor(monitor);

        let mut state = SearchState::new(instance, &store, horizon);
        let mut stats = SearchStatistics::default();

        monitors.on_enter_search(instance);
        let outcome =
            SearchEngine::new(&store).search(&mut state, &mut incumbent, &mut monitors, &mut stats);
        stats.set_total_time(start.elapsed());
        monitors.on_exit_search(&stats);

        let result = SolveOutcome::from_search(instance, outcome, incumbent.into_best(), stats);
        info!(
            "finished: {} makespan={:?} ({}) in {:.2?}",
            result.status,
            result.makespan(),
            result.termination_reason,
            result.statistics.time_total
        );
        result
    }
}

/// Runs the dispatching heuristic and returns its schedule if it fits the
/// horizon.
pub(crate) fn warm_start(
    instance: &JobShopInstance,
    config: &SolverConfig,
    horizon: i64,
) -> Option<Incumbent> {
    if !config.warm_start {
        return None;
    }
    let starts = SimpleScheduler::new()
        .with_rule(config.warm_start_rule)
        .start_times(instance);
    let makespan = instance
        .last_operations()
        .map(|op| starts[op.get()] + instance.operation(op).duration)
        .max()
        .unwrap_or(0);

    if makespan > horizon {
        debug!("warm start ({:?}) makespan {makespan} exceeds horizon {horizon}; discarded", config.warm_start_rule);
        return None;
    }
    debug!("warm start ({:?}) makespan {makespan}", config.warm_start_rule);
    Some(Incumbent::new(makespan, starts))
}

/// Deadline implied by the time limit, counted from `start`.
pub(crate) fn deadline(config: &SolverConfig, start: Instant) -> Option<Instant> {
    config
        .time_limit_ms
        .map(|ms| start + Duration::from_millis(ms))
}

/// Monitors for the budgets set in `config`.
pub(crate) fn build_monitors<'a>(
    config: &SolverConfig,
    deadline: Option<Instant>,
) -> CompositeMonitor<'a> {
    let mut monitors = CompositeMonitor::new();
    if let Some((ms, deadline)) = config.time_limit_ms.zip(deadline) {
        monitors.add_monitor(TimeLimitMonitor::with_deadline(
            Duration::from_millis(ms),
            deadline,
        ));
    }
    if let Some(limit) = config.node_limit {
        monitors.add_monitor(NodeLimitMonitor::new(limit));
    }
    if config.stop_after_first {
        monitors.add_monitor(FirstSolutionMonitor);
    }
    if config.log_progress {
        monitors.add_monitor(LogMonitor::default());
    }
    monitors
}
