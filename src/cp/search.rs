//! Depth-first branch-and-bound over machine orderings.
//!
//! Each node picks the first undecided disjunction (lowest machine id,
//! then lowest operation keys) and tries both orders, `first before
//! second` first. A child is entered by committing the order, tightening
//! every job's last operation to end before the incumbent makespan, and
//! propagating. The child is pruned if propagation fails or its makespan
//! lower bound reaches the incumbent.
//!
//! When every disjunction is decided the fixed-point start lower bounds
//! satisfy all arcs, so they form a schedule; its makespan is strictly
//! below the incumbent by construction.
//!
//! # Reference
//! - Carlier & Pinson (1989), "An Algorithm for Solving the Job-Shop Problem"
//! - Brucker, Jurisch & Sievers (1994), "A Branch and Bound Algorithm for the
//!   Job-Shop Scheduling Problem"

use std::ops::ControlFlow;

use log::debug;

use super::constraint::{ConstraintStore, PairOrder};
use super::incumbent::IncumbentStore;
use super::monitor::{SearchCommand, SearchMonitor};
use super::propagator::{Infeasible, Propagator};
use super::state::SearchState;
use super::stats::SearchStatistics;

/// How a tree search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The whole tree was explored: the incumbent (if any) is optimal,
    /// and no incumbent means no schedule exists.
    Exhausted,
    /// A monitor stopped the search.
    Aborted(String),
}

impl SearchOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, SearchOutcome::Exhausted)
    }
}

/// Why a child node was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prune {
    Infeasible,
    Bound,
}

impl From<Infeasible> for Prune {
    fn from(_: Infeasible) -> Self {
        Prune::Infeasible
    }
}

/// Lower bound on the makespan of any completion of `state`.
///
/// The larger of the latest earliest end among jobs' last operations and,
/// per machine, the earliest start on it plus its total load.
pub fn makespan_lower_bound(store: &ConstraintStore, state: &SearchState) -> i64 {
    let by_jobs = store
        .last_operations()
        .iter()
        .map(|&op| state.var(op).end_min())
        .max()
        .unwrap_or(0);

    let by_machines = store
        .groups()
        .iter()
        .filter_map(|group| {
            group
                .operations
                .iter()
                .map(|&op| state.var(op).start_min())
                .min()
                .map(|earliest| earliest + group.load)
        })
        .max()
        .unwrap_or(0);

    by_jobs.max(by_machines)
}

/// Makespan of the schedule given by the start lower bounds.
pub fn earliest_makespan(store: &ConstraintStore, state: &SearchState) -> i64 {
    store
        .last_operations()
        .iter()
        .map(|&op| state.var(op).end_min())
        .max()
        .unwrap_or(0)
}

/// The tree search over one instance.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    store: &'a ConstraintStore,
    propagator: Propagator<'a>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a ConstraintStore) -> Self {
        Self {
            store,
            propagator: Propagator::new(store),
        }
    }

    pub fn store(&self) -> &'a ConstraintStore {
        self.store
    }

    /// Propagates the root and, if it survives, explores the whole tree.
    ///
    /// Root changes are permanent in `state`. Monitor entry and exit
    /// hooks are left to the caller.
    pub fn search<I, M>(
        &self,
        state: &mut SearchState,
        incumbent: &mut I,
        monitor: &mut M,
        stats: &mut SearchStatistics,
    ) -> SearchOutcome
    where
        I: IncumbentStore,
        M: SearchMonitor + ?Sized,
    {
        match self.prepare_root(state, incumbent.upper_bound(), stats) {
            Ok(()) => self.explore(state, incumbent, monitor, stats),
            Err(prune) => {
                debug!("root pruned ({prune:?}); tree exhausted");
                SearchOutcome::Exhausted
            }
        }
    }

    /// Root propagation plus the incumbent bound; records the root lower
    /// bound.
    pub(crate) fn prepare_root(
        &self,
        state: &mut SearchState,
        upper_bound: i64,
        stats: &mut SearchStatistics,
    ) -> Result<(), Prune> {
        let undecided = state.num_undecided();
        self.tighten_to_incumbent(state, upper_bound)?;
        self.propagator.propagate(state)?;
        stats.on_forced_orders((undecided - state.num_undecided()) as u64);

        let lower_bound = makespan_lower_bound(self.store, state);
        stats.set_root_lower_bound(lower_bound);
        debug!(
            "root propagated: lower bound {lower_bound}, {} of {} disjunctions open",
            state.num_undecided(),
            self.store.num_disjunctions()
        );

        if lower_bound >= upper_bound {
            return Err(Prune::Bound);
        }
        Ok(())
    }

    /// Explores the subtree below an already propagated `state`.
    pub fn explore<I, M>(
        &self,
        state: &mut SearchState,
        incumbent: &mut I,
        monitor: &mut M,
        stats: &mut SearchStatistics,
    ) -> SearchOutcome
    where
        I: IncumbentStore,
        M: SearchMonitor + ?Sized,
    {
        match self.dfs(state, incumbent, monitor, stats) {
            ControlFlow::Continue(()) => SearchOutcome::Exhausted,
            ControlFlow::Break(reason) => SearchOutcome::Aborted(reason),
        }
    }

    fn dfs<I, M>(
        &self,
        state: &mut SearchState,
        incumbent: &mut I,
        monitor: &mut M,
        stats: &mut SearchStatistics,
    ) -> ControlFlow<String>
    where
        I: IncumbentStore,
        M: SearchMonitor + ?Sized,
    {
        stats.on_node_explored();

        let Some(pair) = self.store.first_undecided(state) else {
            return self.record_leaf(state, incumbent, monitor, stats);
        };

        if let SearchCommand::Terminate(reason) = monitor.check_termination(state, stats) {
            return ControlFlow::Break(reason);
        }

        for order in PairOrder::CHOICES {
            state.push_frame();
            stats.on_depth_update(state.depth() as u64);

            let flow = match self.enter_child(state, pair, order, incumbent.upper_bound(), stats) {
                Ok(()) => {
                    monitor.on_descend(state, stats);
                    self.dfs(state, incumbent, monitor, stats)
                }
                Err(Prune::Infeasible) => {
                    stats.on_pruning_infeasible();
                    ControlFlow::Continue(())
                }
                Err(Prune::Bound) => {
                    stats.on_pruning_bound();
                    ControlFlow::Continue(())
                }
            };

            state.pop_frame();
            stats.on_backtrack();
            monitor.on_backtrack(state, stats);
            if flow.is_break() {
                return flow;
            }
        }

        ControlFlow::Continue(())
    }

    fn record_leaf<I, M>(
        &self,
        state: &SearchState,
        incumbent: &mut I,
        monitor: &mut M,
        stats: &mut SearchStatistics,
    ) -> ControlFlow<String>
    where
        I: IncumbentStore,
        M: SearchMonitor + ?Sized,
    {
        let makespan = earliest_makespan(self.store, state);
        if !incumbent.offer(makespan, &state.earliest_starts()) {
            return ControlFlow::Continue(());
        }

        stats.on_solution_found();
        debug!(
            "improving schedule: makespan {makespan} at node {}",
            stats.nodes_explored
        );
        match monitor.on_solution(makespan, stats) {
            SearchCommand::Continue => ControlFlow::Continue(()),
            SearchCommand::Terminate(reason) => ControlFlow::Break(reason),
        }
    }

    /// Commits `order` for `pair`, applies the incumbent bound, propagates
    /// and checks the makespan lower bound.
    pub(crate) fn enter_child(
        &self,
        state: &mut SearchState,
        pair: usize,
        order: PairOrder,
        upper_bound: i64,
        stats: &mut SearchStatistics,
    ) -> Result<(), Prune> {
        state.commit_order(pair, order);
        let undecided = state.num_undecided();

        self.tighten_to_incumbent(state, upper_bound)?;
        self.propagator.propagate(state)?;
        stats.on_forced_orders((undecided - state.num_undecided()) as u64);

        if makespan_lower_bound(self.store, state) >= upper_bound {
            return Err(Prune::Bound);
        }
        Ok(())
    }

    /// Every job must end strictly before the incumbent makespan.
    fn tighten_to_incumbent(&self, state: &mut SearchState, upper_bound: i64) -> Result<(), Prune> {
        if upper_bound == i64::MAX {
            return Ok(());
        }
        for &op in self.store.last_operations() {
            state
                .tighten_end_upper_bound(op, upper_bound - 1)
                .map_err(|_| Prune::Bound)?;
        }
        Ok(())
    }
}
