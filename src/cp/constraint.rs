//! Constraint store.
//!
//! Two constraint families, built once from a [`JobShopInstance`] and
//! never mutated afterwards:
//!
//! - **Precedence**: one arc per adjacent operation pair of a job,
//!   `after.start >= before.end`.
//! - **No-overlap**: one group per machine. Each group is expanded into
//!   its pairwise [`Disjunction`]s; a group is satisfied once every pair
//!   has an order and all implied arcs hold.
//!
//! Disjunctions are stored in branching order: machine id ascending, then
//! `(first, second)` operation keys ascending. The search engine picks
//! the first undecided one, which gives a deterministic tie-break.
//!
//! # Reference
//! Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling", Ch. 2

use crate::models::{JobShopInstance, OperationId};

/// Precedence arc: `after` may not start before `before` ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    /// Operation that must end first.
    pub before: OperationId,
    /// Operation that must start afterwards.
    pub after: OperationId,
}

/// Relative order chosen for a [`Disjunction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairOrder {
    /// `first` ends before `second` starts.
    FirstBeforeSecond,
    /// `second` ends before `first` starts.
    SecondBeforeFirst,
}

impl PairOrder {
    /// Both choices, in the order the search explores them.
    pub const CHOICES: [PairOrder; 2] = [PairOrder::FirstBeforeSecond, PairOrder::SecondBeforeFirst];

    /// The opposite order.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            PairOrder::FirstBeforeSecond => PairOrder::SecondBeforeFirst,
            PairOrder::SecondBeforeFirst => PairOrder::FirstBeforeSecond,
        }
    }
}

/// Two operations sharing a machine; exactly one must precede the other.
///
/// Invariant: `first < second` (dense id, hence key order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disjunction {
    /// Machine both operations run on.
    pub machine: usize,
    /// Lower-keyed operation.
    pub first: OperationId,
    /// Higher-keyed operation.
    pub second: OperationId,
}

impl Disjunction {
    /// The precedence arc implied by `order`.
    #[inline]
    pub fn arc(&self, order: PairOrder) -> Precedence {
        match order {
            PairOrder::FirstBeforeSecond => Precedence {
                before: self.first,
                after: self.second,
            },
            PairOrder::SecondBeforeFirst => Precedence {
                before: self.second,
                after: self.first,
            },
        }
    }
}

/// All operations of one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoOverlapGroup {
    /// Machine id.
    pub machine: usize,
    /// Operations on the machine, in id order.
    pub operations: Vec<OperationId>,
    /// Sum of the durations of `operations`.
    pub load: i64,
    /// Range of this group's entries in [`ConstraintStore::disjunctions`].
    pub disjunctions: std::ops::Range<usize>,
}

/// Immutable precedence and no-overlap constraints of an instance.
#[derive(Debug, Clone)]
pub struct ConstraintStore {
    precedences: Vec<Precedence>,
    groups: Vec<NoOverlapGroup>,
    disjunctions: Vec<Disjunction>,
    last_operations: Vec<OperationId>,
}

impl ConstraintStore {
    /// Builds the store from an instance.
    pub fn new(instance: &JobShopInstance) -> Self {
        let precedences = instance
            .jobs()
            .iter()
            .flat_map(|job| job.chain())
            .map(|(before, after)| Precedence { before, after })
            .collect();

        let mut groups = Vec::with_capacity(instance.num_machines());
        let mut disjunctions = Vec::new();

        for machine in 0..instance.num_machines() {
            let ops = instance.machine_operations(machine);
            let begin = disjunctions.len();
            for (i, &first) in ops.iter().enumerate() {
                for &second in &ops[i + 1..] {
                    disjunctions.push(Disjunction {
                        machine,
                        first,
                        second,
                    });
                }
            }
            groups.push(NoOverlapGroup {
                machine,
                operations: ops.to_vec(),
                load: instance.machine_load(machine),
                disjunctions: begin..disjunctions.len(),
            });
        }

        Self {
            precedences,
            groups,
            disjunctions,
            last_operations: instance.last_operations().collect(),
        }
    }

    /// Intra-job precedence arcs.
    #[inline]
    pub fn precedences(&self) -> &[Precedence] {
        &self.precedences
    }

    /// One no-overlap group per machine, in machine order.
    #[inline]
    pub fn groups(&self) -> &[NoOverlapGroup] {
        &self.groups
    }

    /// All disjunctions in branching order.
    #[inline]
    pub fn disjunctions(&self) -> &[Disjunction] {
        &self.disjunctions
    }

    #[inline]
    pub fn disjunction(&self, index: usize) -> &Disjunction {
        &self.disjunctions[index]
    }

    pub fn num_disjunctions(&self) -> usize {
        self.disjunctions.len()
    }

    /// Last operation of every job; their ends define the makespan.
    #[inline]
    pub fn last_operations(&self) -> &[OperationId] {
        &self.last_operations
    }
}
