//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Time-based**: SPT, LPT, LWKR, MWKR
//! - **Operation count**: MOPNR
//! - **Queue/Load**: FIFO, WINQ
//!
//! # Score Convention
//! All rules return lower scores for higher priority candidates.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{Candidate, DispatchingRule, RuleScore, SchedulingContext};

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes operations with shorter processing time.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &SchedulingContext) -> RuleScore {
        candidate.duration as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &SchedulingContext) -> RuleScore {
        -(candidate.duration as f64)
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time"
    }
}

/// Least Work Remaining.
///
/// Prioritizes jobs closer to completion.
#[derive(Debug, Clone, Copy)]
pub struct Lwkr;

impl DispatchingRule for Lwkr {
    fn name(&self) -> &'static str {
        "LWKR"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &SchedulingContext) -> RuleScore {
        candidate.remaining_work as f64
    }

    fn description(&self) -> &'static str {
        "Least Work Remaining"
    }
}

/// Most Work Remaining.
///
/// Prioritizes jobs with the most remaining work. For makespan
/// minimization in job shops this is usually the strongest single rule.
///
/// # Reference
/// Haupt (1989), Table 1
#[derive(Debug, Clone, Copy)]
pub struct Mwkr;

impl DispatchingRule for Mwkr {
    fn name(&self) -> &'static str {
        "MWKR"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &SchedulingContext) -> RuleScore {
        -(candidate.remaining_work as f64)
    }

    fn description(&self) -> &'static str {
        "Most Work Remaining"
    }
}

// ======================== Operation count ========================

/// Most Operations Remaining.
#[derive(Debug, Clone, Copy)]
pub struct Mopnr;

impl DispatchingRule for Mopnr {
    fn name(&self) -> &'static str {
        "MOPNR"
    }

    fn evaluate(&self, candidate: &Candidate, _context: &SchedulingContext) -> RuleScore {
        -(candidate.remaining_operations as f64)
    }

    fn description(&self) -> &'static str {
        "Most Operations Remaining"
    }
}

// ======================== Queue/Load rules ========================

/// First In First Out.
///
/// Prioritizes the operation that has waited longest, i.e. whose job
/// became ready first. The score is `-(current_time - ready_time)`.
#[derive(Debug, Clone, Copy)]
pub struct Fifo;

impl DispatchingRule for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn evaluate(&self, candidate: &Candidate, context: &SchedulingContext) -> RuleScore {
        -((context.current_time - candidate.ready_time) as f64)
    }

    fn description(&self) -> &'static str {
        "First In First Out"
    }
}

/// Work In Next Queue.
///
/// Prioritizes operations whose following machine has the least work
/// waiting. Uses `context.queued_work`; a job's last operation scores 0.
#[derive(Debug, Clone, Copy)]
pub struct Winq;

impl DispatchingRule for Winq {
    fn name(&self) -> &'static str {
        "WINQ"
    }

    fn evaluate(&self, candidate: &Candidate, context: &SchedulingContext) -> RuleScore {
        candidate
            .next_machine
            .map_or(0, |m| context.queued_work_on(m)) as f64
    }

    fn description(&self) -> &'static str {
        "Work In Next Queue"
    }
}
