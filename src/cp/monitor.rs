//! Search monitors.
//!
//! A [`SearchMonitor`] observes the tree search and decides when it must
//! stop. The engine asks [`SearchMonitor::check_termination`] at every
//! branch point and [`SearchMonitor::on_solution`] after every improving
//! schedule; both may return [`SearchCommand::Terminate`].
//!
//! Budgets are cooperative: nothing interrupts a propagation call, so a
//! time limit is honored with the granularity of one node.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;

use super::state::SearchState;
use super::stats::SearchStatistics;
use crate::models::JobShopInstance;

/// Decision returned by a monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    /// Keep searching.
    Continue,
    /// Stop the search; the string explains why.
    Terminate(String),
}

impl SearchCommand {
    #[inline]
    pub fn is_terminate(&self) -> bool {
        matches!(self, SearchCommand::Terminate(_))
    }
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate({reason})"),
        }
    }
}

/// Observer of a branch-and-bound run.
pub trait SearchMonitor: Send {
    /// Called once before the root is propagated.
    fn on_enter_search(&mut self, _instance: &JobShopInstance) {}

    /// Called at every branch point.
    fn check_termination(
        &mut self,
        _state: &SearchState,
        _stats: &SearchStatistics,
    ) -> SearchCommand {
        SearchCommand::Continue
    }

    /// Called after an improving schedule with the given makespan was
    /// recorded.
    fn on_solution(&mut self, _makespan: i64, _stats: &SearchStatistics) -> SearchCommand {
        SearchCommand::Continue
    }

    /// Called after a child was entered and propagated successfully.
    fn on_descend(&mut self, _state: &SearchState, _stats: &SearchStatistics) {}

    /// Called after a child was undone.
    fn on_backtrack(&mut self, _state: &SearchState, _stats: &SearchStatistics) {}

    /// Called once when the search ends, exhausted or stopped.
    fn on_exit_search(&mut self, _stats: &SearchStatistics) {}

    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn SearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

/// Stops the search at a wall-clock deadline.
///
/// The clock is read only when `nodes_explored & clock_check_mask == 0`.
#[derive(Debug, Clone)]
pub struct TimeLimitMonitor {
    limit: Duration,
    deadline: Instant,
    clock_check_mask: u64,
    reset_on_entry: bool,
}

impl TimeLimitMonitor {
    /// Deadline `limit` after construction; reset on search entry.
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            deadline: Instant::now() + limit,
            clock_check_mask: 0xFF,
            reset_on_entry: true,
        }
    }

    /// Fixed deadline shared with other searches (not reset on entry).
    ///
    /// `limit` is the configured budget the deadline was derived from; it
    /// only appears in the termination message.
    pub fn with_deadline(limit: Duration, deadline: Instant) -> Self {
        Self {
            limit,
            deadline,
            clock_check_mask: 0xFF,
            reset_on_entry: false,
        }
    }

    /// Sets how often the clock is read; `0` reads it at every node.
    pub fn with_clock_check_mask(mut self, mask: u64) -> Self {
        self.clock_check_mask = mask;
        self
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn on_enter_search(&mut self, _instance: &JobShopInstance) {
        if self.reset_on_entry {
            self.deadline = Instant::now() + self.limit;
        }
    }

    fn check_termination(
        &mut self,
        _state: &SearchState,
        stats: &SearchStatistics,
    ) -> SearchCommand {
        if stats.nodes_explored & self.clock_check_mask == 0 && Instant::now() >= self.deadline {
            SearchCommand::Terminate(format!("time limit of {:?} reached", self.limit))
        } else {
            SearchCommand::Continue
        }
    }

    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }
}

/// Stops the search after a number of explored nodes.
#[derive(Debug, Clone, Copy)]
pub struct NodeLimitMonitor {
    limit: u64,
}

impl NodeLimitMonitor {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl SearchMonitor for NodeLimitMonitor {
    fn check_termination(
        &mut self,
        _state: &SearchState,
        stats: &SearchStatistics,
    ) -> SearchCommand {
        if stats.nodes_explored >= self.limit {
            SearchCommand::Terminate(format!("node limit of {} reached", self.limit))
        } else {
            SearchCommand::Continue
        }
    }

    fn name(&self) -> &str {
        "NodeLimitMonitor"
    }
}

/// Stops the search as soon as the tree search finds a schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSolutionMonitor;

impl SearchMonitor for FirstSolutionMonitor {
    fn on_solution(&mut self, makespan: i64, _stats: &SearchStatistics) -> SearchCommand {
        SearchCommand::Terminate(format!("stopped after first solution (makespan {makespan})"))
    }

    fn name(&self) -> &str {
        "FirstSolutionMonitor"
    }
}

/// Stops the search once a shared flag is raised.
///
/// Lets another thread cancel a running solve; parallel workers use it
/// to stop their siblings when one of them runs out of budget.
#[derive(Debug, Clone, Default)]
pub struct CancellationMonitor {
    flag: Arc<AtomicBool>,
}

impl CancellationMonitor {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Handle that raises the flag.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl SearchMonitor for CancellationMonitor {
    fn check_termination(
        &mut self,
        _state: &SearchState,
        _stats: &SearchStatistics,
    ) -> SearchCommand {
        if self.flag.load(Ordering::Relaxed) {
            SearchCommand::Terminate("search cancelled".to_string())
        } else {
            SearchCommand::Continue
        }
    }

    fn name(&self) -> &str {
        "CancellationMonitor"
    }
}

/// Reports progress through the `log` facade.
///
/// Emits an `info!` line for every improving schedule and, at most once
/// per `log_interval`, a progress line while descending.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_makespan: Option<i64>,
}

impl LogMonitor {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            log_interval,
            clock_check_mask,
            best_makespan: None,
        }
    }

    fn log_line(&mut self, state: &SearchState, stats: &SearchStatistics) {
        let now = Instant::now();
        let best = self
            .best_makespan
            .map_or_else(|| "-".to_string(), |m| m.to_string());
        info!(
            "[{:.1}s] nodes={} depth={} undecided={} best={} backtracks={} pruned={}",
            now.duration_since(self.start_time).as_secs_f32(),
            stats.nodes_explored,
            state.depth(),
            state.num_undecided(),
            best,
            stats.backtracks,
            stats.prunings()
        );
        self.last_log_time = now;
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl SearchMonitor for LogMonitor {
    fn on_enter_search(&mut self, instance: &JobShopInstance) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_makespan = None;
        info!(
            "search started: {} jobs, {} machines, {} operations",
            instance.num_jobs(),
            instance.num_machines(),
            instance.num_operations()
        );
    }

    fn on_solution(&mut self, makespan: i64, stats: &SearchStatistics) -> SearchCommand {
        self.best_makespan = Some(makespan);
        info!(
            "[{:.1}s] improving schedule: makespan={} nodes={}",
            self.start_time.elapsed().as_secs_f32(),
            makespan,
            stats.nodes_explored
        );
        SearchCommand::Continue
    }

    fn on_descend(&mut self, state: &SearchState, stats: &SearchStatistics) {
        if stats.nodes_explored & self.clock_check_mask == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(state, stats);
        }
    }

    fn on_exit_search(&mut self, stats: &SearchStatistics) {
        info!(
            "search finished after {:.2?}: nodes={} solutions={}",
            self.start_time.elapsed(),
            stats.nodes_explored,
            stats.solutions_found
        );
    }

    fn name(&self) -> &str {
        "LogMonitor"
    }
}

/// Runs several monitors as one. The first `Terminate` wins.
#[derive(Default)]
pub struct CompositeMonitor<'a> {
    monitors: Vec<Box<dyn SearchMonitor + 'a>>,
}

impl<'a> CompositeMonitor<'a> {
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn SearchMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl std::fmt::Debug for CompositeMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.monitors.iter().map(|m| m.name()))
            .finish()
    }
}

impl SearchMonitor for CompositeMonitor<'_> {
    fn on_enter_search(&mut self, instance: &JobShopInstance) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(instance);
        }
    }

    fn check_termination(
        &mut self,
        state: &SearchState,
        stats: &SearchStatistics,
    ) -> SearchCommand {
        self.monitors
            .iter_mut()
            .map(|m| m.check_termination(state, stats))
            .find(SearchCommand::is_terminate)
            .unwrap_or(SearchCommand::Continue)
    }

    fn on_solution(&mut self, makespan: i64, stats: &SearchStatistics) -> SearchCommand {
        // Every monitor sees the solution, even after one asked to stop.
        let mut command = SearchCommand::Continue;
        for monitor in &mut self.monitors {
            let next = monitor.on_solution(makespan, stats);
            if !command.is_terminate() {
                command = next;
            }
        }
        command
    }

    fn on_descend(&mut self, state: &SearchState, stats: &SearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_descend(state, stats);
        }
    }

    fn on_backtrack(&mut self, state: &SearchState, stats: &SearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_backtrack(state, stats);
        }
    }

    fn on_exit_search(&mut self, stats: &SearchStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(stats);
        }
    }

    fn name(&self) -> &str {
        "CompositeMonitor"
    }
}
