//! Parallel tree search.
//!
//! The root is propagated once, then expanded breadth-first for
//! `split_depth` levels. Every surviving node becomes an independent
//! subproblem explored by a rayon worker. Workers share one
//! [`SharedIncumbent`], so a schedule found by any worker tightens the
//! bound for all of them.
//!
//! Budgets apply per worker. When one worker is stopped the others are
//! cancelled through a shared flag. The result is `Optimal` only if every
//! subtree was exhausted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use super::config::SolverConfig;
use super::constraint::{ConstraintStore, PairOrder};
use super::incumbent::SharedIncumbent;
use super::monitor::{CancellationMonitor, SearchMonitor};
use super::search::{Prune, SearchEngine, SearchOutcome};
use super::solver::{build_monitors, deadline, warm_start, SolveOutcome};
use super::state::SearchState;
use super::stats::SearchStatistics;
use crate::models::JobShopInstance;

const CANCELLED: &str = "search cancelled";

/// Solves `instance` with `config.num_workers` rayon workers.
pub(crate) fn solve_parallel(instance: &JobShopInstance, config: &SolverConfig) -> SolveOutcome {
    let start = Instant::now();
    let horizon = config.effective_horizon(instance.horizon());
    let store = ConstraintStore::new(instance);
    let engine = SearchEngine::new(&store);

    let incumbent = match warm_start(instance, config, horizon) {
        Some(seed) => SharedIncumbent::seeded(seed),
        None => SharedIncumbent::new(),
    };

    let mut stats = SearchStatistics::default();
    let mut root = SearchState::new(instance, &store, horizon);
    let subproblems = match engine.prepare_root(&mut root, incumbent.upper_bound(), &mut stats) {
        Ok(()) => split_frontier(
            &engine,
            root,
            config.split_depth,
            incumbent.upper_bound(),
            &mut stats,
        ),
        Err(prune) => {
            debug!("root pruned ({prune:?}); tree exhausted");
            Vec::new()
        }
    };
    info!(
        "parallel search: {} subproblems on {} workers",
        subproblems.len(),
        config.num_workers
    );

    let deadline = deadline(config, start);
    let cancel = Arc::new(AtomicBool::new(false));
    let run = || {
        subproblems
            .into_par_iter()
            .map(|mut state| {
                let mut monitors = build_monitors(config, deadline);
                monitors.add_monitor(CancellationMonitor::new(Arc::clone(&cancel)));
                let mut worker_stats = SearchStatistics::default();
                let mut shared = &incumbent;

                monitors.on_enter_search(instance);
                let outcome = engine.explore(&mut state, &mut shared, &mut monitors, &mut worker_stats);
                monitors.on_exit_search(&worker_stats);

                if !outcome.is_exhausted() {
                    cancel.store(true, Ordering::Relaxed);
                }
                (outcome, worker_stats)
            })
            .collect::<Vec<_>>()
    };

    let results = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_workers)
        .build()
    {
        Ok(pool) => pool.install(run),
        Err(err) => {
            warn!("could not build a pool of {} workers ({err}); using the global pool", config.num_workers);
            run()
        }
    };

    let mut outcome = SearchOutcome::Exhausted;
    for (worker_outcome, worker_stats) in results {
        stats.merge(&worker_stats);
        if let SearchOutcome::Aborted(reason) = worker_outcome {
            // Prefer the reason that stopped the first worker over the
            // cancellations it caused.
            let replace = match &outcome {
                SearchOutcome::Exhausted => true,
                SearchOutcome::Aborted(current) => current == CANCELLED && reason != CANCELLED,
            };
            if replace {
                outcome = SearchOutcome::Aborted(reason);
            }
        }
    }
    stats.set_total_time(start.elapsed());

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

/// Expands `root` level by level up to `depth` decisions.
///
/// Children are cloned states with their decisions applied permanently.
/// Pruned children are dropped; fully ordered nodes are kept as
/// subproblems so a worker records their schedule.
fn split_frontier(
    engine: &SearchEngine<'_>,
    root: SearchState,
    depth: usize,
    upper_bound: i64,
    stats: &mut SearchStatistics,
) -> Vec<SearchState> {
    let store: &ConstraintStore = engine.store();
    let mut frontier = vec![root];

    for _ in 0..depth {
        let mut next = Vec::with_capacity(frontier.len() * 2);
        for state in frontier {
            let Some(pair) = store.first_undecided(&state) else {
                next.push(state);
                continue;
            };
            stats.on_node_explored();
            for order in PairOrder::CHOICES {
                let mut child = state.clone();
                match engine.enter_child(&mut child, pair, order, upper_bound, stats) {
                    Ok(()) => next.push(child),
                    Err(Prune::Infeasible) => stats.on_pruning_infeasible(),
                    Err(Prune::Bound) => stats.on_pruning_bound(),
                }
            }
        }
        frontier = next;
    }

    frontier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::{JobShopSolver, SolveStatus};

    fn reference() -> JobShopInstance {
        JobShopInstance::new(vec![
            vec![(1, 2), (2, 3), (0, 5)],
            vec![(0, 3), (1, 6), (2, 4)],
            vec![(1, 2), (0, 2), (2, 4)],
        ])
        .unwrap()
    }

    #[test]
    fn test_split_frontier_size() {
        let inst = reference();
        let store = ConstraintStore::new(&inst);
        let engine = SearchEngine::new(&store);
        let mut stats = SearchStatistics::default();
        let mut root = SearchState::new(&inst, &store, inst.horizon());
        engine.prepare_root(&mut root, i64::MAX, &mut stats).unwrap();

        let frontier = split_frontier(&engine, root, 3, i64::MAX, &mut stats);
        assert!(!frontier.is_empty());
        assert!(frontier.len() <= 8);
        assert!(frontier.iter().all(|s| s.depth() == 0));
    }

    #[test]
    fn test_parallel_agrees_with_sequential() {
        let inst = reference();
        let sequential = JobShopSolver::new().solve(&inst);

        let config = SolverConfig::default()
            .with_num_workers(2)
            .with_split_depth(3)
            .with_warm_start(false);
        let parallel = JobShopSolver::with_config(config).solve(&inst);

        assert_eq!(parallel.status, SolveStatus::Optimal);
        assert_eq!(parallel.makespan(), sequential.makespan());
        assert!(parallel.schedule.unwrap().is_feasible(&inst));
    }

    #[test]
    fn test_parallel_infeasible_cap() {
        let config = SolverConfig::default().with_num_workers(2).with_horizon(13);
        let outcome = JobShopSolver::with_config(config).solve(&reference());
        assert_eq!(outcome.status, SolveStatus::Infeasible);
    }

    #[test]
    fn test_parallel_node_limit_not_optimal() {
        let config = SolverConfig::default()
            .with_num_workers(2)
            .with_split_depth(1)
            .with_warm_start(false)
            .with_node_limit(1);
        let outcome = JobShopSolver::with_config(config).solve(&reference());
        assert_ne!(outcome.status, SolveStatus::Optimal);
        assert_ne!(outcome.status, SolveStatus::Infeasible);
    }
}
