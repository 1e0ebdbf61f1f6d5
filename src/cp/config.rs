//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::dispatching::RuleKind;

/// Configuration parameters for [`JobShopSolver`](super::JobShopSolver).
///
/// Budgets are optional; without any the search runs until optimality or
/// infeasibility is proven.
///
/// # Examples
///
/// ```
/// use u_jobshop::cp::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_node_limit(100_000)
///     .with_warm_start(false);
/// assert_eq!(config.time_limit_ms, Some(5_000));
/// assert!(!config.warm_start);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,
    /// Maximum number of search nodes.
    pub node_limit: Option<u64>,
    /// Stop after the first schedule found by the tree search.
    pub stop_after_first: bool,
    /// Seed the incumbent with a dispatching-rule schedule.
    pub warm_start: bool,
    /// Rule used by the warm start.
    pub warm_start_rule: RuleKind,
    /// Upper limit on every end time. Capped to the sum of durations;
    /// a value below the optimum makes the instance infeasible.
    pub horizon: Option<i64>,
    /// Number of parallel workers (used with the `parallel` feature).
    pub num_workers: usize,
    /// Disjunctions decided up front to create parallel subproblems
    /// (up to `2^split_depth` subtrees).
    pub split_depth: usize,
    /// Attach a progress-logging monitor.
    pub log_progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            node_limit: None,
            stop_after_first: false,
            warm_start: true,
            warm_start_rule: RuleKind::Mwkr,
            horizon: None,
            num_workers: 1,
            split_depth: 4,
            log_progress: false,
        }
    }
}

impl SolverConfig {
    /// Sets the time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Stops the search at the first schedule it finds.
    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Enables or disables the warm start.
    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    /// Sets the warm-start dispatching rule.
    pub fn with_warm_start_rule(mut self, rule: RuleKind) -> Self {
        self.warm_start_rule = rule;
        self
    }

    /// Caps the horizon.
    pub fn with_horizon(mut self, horizon: i64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Sets the number of parallel workers.
    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Sets the parallel split depth.
    pub fn with_split_depth(mut self, depth: usize) -> Self {
        self.split_depth = depth;
        self
    }

    /// Enables progress logging through the `log` facade.
    pub fn with_log_progress(mut self, log_progress: bool) -> Self {
        self.log_progress = log_progress;
        self
    }

    /// Effective horizon for an instance whose durations sum to
    /// `natural_horizon`.
    pub fn effective_horizon(&self, natural_horizon: i64) -> i64 {
        self.horizon
            .map_or(natural_horizon, |cap| cap.min(natural_horizon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, None);
        assert_eq!(config.node_limit, None);
        assert!(config.warm_start);
        assert_eq!(config.warm_start_rule, RuleKind::Mwkr);
        assert_eq!(config.num_workers, 1);
    }

    #[test]
    fn test_effective_horizon() {
        let config = SolverConfig::default();
        assert_eq!(config.effective_horizon(31), 31);
        assert_eq!(config.clone().with_horizon(13).effective_horizon(31), 13);
        assert_eq!(config.with_horizon(50).effective_horizon(31), 31);
    }

    #[test]
    fn test_partial_json() {
        let config: SolverConfig = serde_json::from_str(r#"{"node_limit": 10}"#).unwrap();
        assert_eq!(config.node_limit, Some(10));
        assert!(config.warm_start);
    }
}
