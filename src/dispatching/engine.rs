//! Layered rule engine.
//!
//! Rules are applied lexicographically: the first rule decides, the next
//! one only sees candidates the earlier rules scored equal. Candidates
//! still tied after the last rule are ordered by operation key, so a
//! pick is always deterministic.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{rules, Candidate, DispatchingRule, RuleScore, SchedulingContext};

/// Scores closer than this are a tie.
const SCORE_EPSILON: f64 = 1e-9;

/// Ordered stack of dispatching rules.
///
/// # Example
/// ```
/// use u_jobshop::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Mwkr)
///     .with_rule(rules::Spt);
/// assert_eq!(engine.rule_names(), vec!["MWKR", "SPT"]);
/// ```
#[derive(Clone, Default)]
pub struct RuleEngine {
    layers: Vec<Arc<dyn DispatchingRule>>,
}

impl RuleEngine {
    /// Engine without rules: candidates are ranked by key only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule consulted after the existing ones.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.layers.push(Arc::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|rule| rule.name()).collect()
    }

    /// Compares two candidates; `Less` means `a` goes first.
    pub fn compare(&self, a: &Candidate, b: &Candidate, context: &SchedulingContext) -> Ordering {
        self.layers
            .iter()
            .map(|rule| {
                let (score_a, score_b) = (rule.evaluate(a, context), rule.evaluate(b, context));
                if (score_a - score_b).abs() <= SCORE_EPSILON {
                    Ordering::Equal
                } else {
                    score_a.total_cmp(&score_b)
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.key.cmp(&b.key))
    }

    /// Candidate indices, highest priority first.
    pub fn rank(&self, candidates: &[Candidate], context: &SchedulingContext) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..candidates.len()).collect();
        indices.sort_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context));
        indices
    }

    /// Index of the highest-priority candidate.
    pub fn select_best(&self, candidates: &[Candidate], context: &SchedulingContext) -> Option<usize> {
        (0..candidates.len()).min_by(|&a, &b| self.compare(&candidates[a], &candidates[b], context))
    }

    /// Score of `candidate` under every rule, in evaluation order.
    pub fn scores(&self, candidate: &Candidate, context: &SchedulingContext) -> Vec<RuleScore> {
        self.layers
            .iter()
            .map(|rule| rule.evaluate(candidate, context))
            .collect()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RuleEngine").field(&self.rule_names()).finish()
    }
}

/// Named primary rule, for configuration.
///
/// Each kind expands into an engine with the rule first and SPT second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Spt,
    Lpt,
    Lwkr,
    #[default]
    Mwkr,
    Mopnr,
    Fifo,
    Winq,
}

impl RuleKind {
    /// Every kind, in declaration order.
    pub const ALL: [RuleKind; 7] = [
        RuleKind::Spt,
        RuleKind::Lpt,
        RuleKind::Lwkr,
        RuleKind::Mwkr,
        RuleKind::Mopnr,
        RuleKind::Fifo,
        RuleKind::Winq,
    ];

    /// Builds the rule engine for this kind.
    pub fn engine(self) -> RuleEngine {
        let engine = RuleEngine::new();
        match self {
            RuleKind::Spt => engine.with_rule(rules::Spt),
            RuleKind::Lpt => engine.with_rule(rules::Lpt).with_rule(rules::Spt),
            RuleKind::Lwkr => engine.with_rule(rules::Lwkr).with_rule(rules::Spt),
            RuleKind::Mwkr => engine.with_rule(rules::Mwkr).with_rule(rules::Spt),
            RuleKind::Mopnr => engine.with_rule(rules::Mopnr).with_rule(rules::Spt),
            RuleKind::Fifo => engine.with_rule(rules::Fifo).with_rule(rules::Spt),
            RuleKind::Winq => engine.with_rule(rules::Winq).with_rule(rules::Spt),
        }
    }
}
