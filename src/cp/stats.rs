//! Search statistics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Counters collected during one solve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Nodes entered (root included).
    pub nodes_explored: u64,
    /// Times the search returned from a child to its parent.
    pub backtracks: u64,
    /// Deepest decision level reached.
    pub max_depth: u64,
    /// Children discarded because propagation failed.
    pub prunings_infeasible: u64,
    /// Children discarded because their makespan lower bound reached the
    /// incumbent.
    pub prunings_bound: u64,
    /// Improving complete schedules found by the tree search.
    pub solutions_found: u64,
    /// Disjunction orders committed by propagation rather than branching.
    pub forced_orders: u64,
    /// Makespan lower bound after root propagation.
    pub root_lower_bound: i64,
    /// Wall-clock time of the solve.
    pub time_total: Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_forced_orders(&mut self, count: u64) {
        self.forced_orders = self.forced_orders.saturating_add(count);
    }

    #[inline]
    pub fn set_root_lower_bound(&mut self, bound: i64) {
        self.root_lower_bound = bound;
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Adds the counters of another (worker) run. Depth and root bound
    /// take the maximum; time is left untouched.
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.nodes_explored = self.nodes_explored.saturating_add(other.nodes_explored);
        self.backtracks = self.backtracks.saturating_add(other.backtracks);
        self.max_depth = self.max_depth.max(other.max_depth);
        self.prunings_infeasible = self
            .prunings_infeasible
            .saturating_add(other.prunings_infeasible);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.solutions_found = self.solutions_found.saturating_add(other.solutions_found);
        self.forced_orders = self.forced_orders.saturating_add(other.forced_orders);
        self.root_lower_bound = self.root_lower_bound.max(other.root_lower_bound);
    }

    /// Total pruned children.
    pub fn prunings(&self) -> u64 {
        self.prunings_infeasible.saturating_add(self.prunings_bound)
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Job-shop search statistics:")?;
        writeln!(f, "  Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "  Backtracks:            {}", self.backtracks)?;
        writeln!(f, "  Max depth reached:     {}", self.max_depth)?;
        writeln!(f, "  Prunings (infeasible): {}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):      {}", self.prunings_bound)?;
        writeln!(f, "  Forced orders:         {}", self.forced_orders)?;
        writeln!(f, "  Solutions found:       {}", self.solutions_found)?;
        writeln!(f, "  Root lower bound:      {}", self.root_lower_bound)?;
        writeln!(f, "  Total time:            {:.2?}", self.time_total)?;
        Ok(())
    }
}
