//! Dispatching rules and rule engine for list scheduling.
//!
//! A list scheduler repeatedly picks one operation among the jobs whose
//! next operation is ready. The pick is delegated to priority rules
//! (SPT, MWKR, FIFO, ...) evaluated on a [`Candidate`], composed by a
//! [`RuleEngine`].
//!
//! # Usage
//!
//! ```
//! use u_jobshop::dispatching::{rules, RuleEngine, RuleKind};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Mwkr)
//!     .with_rule(rules::Spt);
//! assert_eq!(engine.len(), 2);
//! assert_eq!(RuleKind::Mwkr.engine().rule_names(), engine.rule_names());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{RuleEngine, RuleKind};

use std::fmt::Debug;

use crate::models::{OperationId, OperationKey};

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (scheduled first).
/// This follows the academic convention where SPT = shortest processing time first.
pub type RuleScore = f64;

/// The next unscheduled operation of a job, as seen by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Dense id of the operation.
    pub op: OperationId,
    /// `(job, position)` of the operation.
    pub key: OperationKey,
    /// Machine the operation runs on.
    pub machine: usize,
    /// Processing time of the operation.
    pub duration: i64,
    /// Processing time left in the job, this operation included.
    pub remaining_work: i64,
    /// Operations left in the job, this one included.
    pub remaining_operations: usize,
    /// Time the job's previous operation ends (0 for the first one).
    pub ready_time: i64,
    /// Earliest start: `max(ready_time, machine ready time)`.
    pub earliest_start: i64,
    /// Machine of the job's following operation, if any.
    pub next_machine: Option<usize>,
}

/// A dispatching rule that evaluates operation priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for candidates that should be dispatched first.
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT", "MWKR").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a candidate given the current scheduling context.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, candidate: &Candidate, context: &SchedulingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
