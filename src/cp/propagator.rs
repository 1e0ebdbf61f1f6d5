//! Bound propagation.
//!
//! Tightens the bounds of a [`SearchState`] until nothing changes or a
//! contradiction is found. Rules, applied in passes until a fixed point:
//!
//! - **Arc** `A before B` (job precedence or decided disjunction):
//!   `B.start_lb >= A.end_lb` and, backwards, `A.end_ub <= B.start_ub`.
//! - **Undecided disjunction** `{A, B}`: if `A.end_lb > B.start_ub`, A
//!   cannot precede B, so `B before A` is committed (and symmetrically).
//!   If neither order fits, the state is infeasible.
//!
//! Every bound only ever narrows and is bounded by the horizon, so the
//! loop terminates.
//!
//! # Reference
//! Baptiste, Le Pape & Nuijten (2001), "Constraint-Based Scheduling", Ch. 2.1

use log::trace;
use thiserror::Error;

use super::constraint::{ConstraintStore, Disjunction, PairOrder, Precedence};
use super::domain::InfeasibleBound;
use super::state::SearchState;
use crate::models::OperationId;

/// Propagation proved that the current state has no feasible completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Infeasible {
    /// A variable domain became empty.
    #[error(transparent)]
    EmptyDomain(#[from] InfeasibleBound),

    /// Neither order of a disjunction fits the current bounds.
    #[error("operations {first} and {second} cannot be ordered on machine {machine}")]
    Unorderable {
        machine: usize,
        first: OperationId,
        second: OperationId,
    },
}

/// Fixed-point bound propagation over a [`ConstraintStore`].
#[derive(Debug, Clone, Copy)]
pub struct Propagator<'a> {
    store: &'a ConstraintStore,
}

impl<'a> Propagator<'a> {
    pub fn new(store: &'a ConstraintStore) -> Self {
        Self { store }
    }

    /// Runs all rules until no bound or order changes.
    ///
    /// Returns the number of passes made. Only the bound state and the
    /// disjunction orders of `state` are mutated.
    ///
    /// # Errors
    /// [`Infeasible`] if any domain empties or a disjunction cannot be
    /// ordered. The state is then partially tightened and must be
    /// restored by the caller (popping its frame).
    pub fn propagate(&self, state: &mut SearchState) -> Result<usize, Infeasible> {
        if let Some(var) = state.vars().iter().find(|v| v.is_empty()) {
            return Err(InfeasibleBound { op: var.op() }.into());
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;

            for &arc in self.store.precedences() {
                changed |= apply_arc(state, arc)?;
            }

            for (pair, disjunction) in self.store.disjunctions().iter().enumerate() {
                changed |= match state.order(pair) {
                    Some(order) => apply_arc(state, disjunction.arc(order))?,
                    None => detect_forced_order(state, pair, disjunction)?,
                };
            }

            if !changed {
                break;
            }
        }

        trace!("propagation reached fixed point after {passes} passes");
        Ok(passes)
    }
}

/// Enforces `before.end <= after.start` on the bounds.
fn apply_arc(state: &mut SearchState, arc: Precedence) -> Result<bool, Infeasible> {
    let before_end_min = state.var(arc.before).end_min();
    let forward = state.tighten_start_lower_bound(arc.after, before_end_min)?;

    let after_start_max = state.var(arc.after).start_max();
    let backward = state.tighten_end_upper_bound(arc.before, after_start_max)?;

    Ok(forward || backward)
}

/// Commits the only order that still fits, if exactly one does.
fn detect_forced_order(
    state: &mut SearchState,
    pair: usize,
    disjunction: &Disjunction,
) -> Result<bool, Infeasible> {
    let first = state.var(disjunction.first);
    let second = state.var(disjunction.second);
    let first_can_precede = first.end_min() <= second.start_max();
    let second_can_precede = second.end_min() <= first.start_max();

    let order = match (first_can_precede, second_can_precede) {
        (true, true) => return Ok(false),
        (true, false) => PairOrder::FirstBeforeSecond,
        (false, true) => PairOrder::SecondBeforeFirst,
        (false, false) => {
            return Err(Infeasible::Unorderable {
                machine: disjunction.machine,
                first: disjunction.first,
                second: disjunction.second,
            })
        }
    };

    state.commit_order(pair, order);
    apply_arc(state, disjunction.arc(order))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobShopInstance;

    fn solve_root(jobs: Vec<Vec<(i64, i64)>>, horizon: Option<i64>) -> (SearchState, Result<usize, Infeasible>) {
        let inst = JobShopInstance::new(jobs).unwrap();
        let store = ConstraintStore::new(&inst);
        let mut state = SearchState::new(&inst, &store, horizon.unwrap_or(inst.horizon()));
        let result = Propagator::new(&store).propagate(&mut state);
        (state, result)
    }

    #[test]
    fn test_chain_forward_and_backward() {
        let (state, result) = solve_root(vec![vec![(0, 3), (1, 4)]], None);
        assert!(result.is_ok());
        // Horizon 7: the chain is tight.
        assert_eq!(state.var(OperationId(0)).start_min(), 0);
        assert_eq!(state.var(OperationId(0)).start_max(), 0);
        assert_eq!(state.var(OperationId(1)).start_min(), 3);
        assert_eq!(state.var(OperationId(1)).start_max(), 3);
    }

    #[test]
    fn test_forced_order_is_committed() {
        // Horizon 6: job 1 reaches machine 0 at time 4 at the earliest,
        // so it cannot run before job 0's 5-long op.
        let inst = JobShopInstance::new(vec![vec![(0, 5)], vec![(1, 4), (0, 1)]]).unwrap();
        let store = ConstraintStore::new(&inst);
        let mut state = SearchState::new(&inst, &store, 6);
        Propagator::new(&store).propagate(&mut state).unwrap();

        // Pair on machine 0: op 0 (job 0) and op 2 (job 1, pos 1).
        assert_eq!(store.num_disjunctions(), 1);
        assert_eq!(state.order(0), Some(PairOrder::FirstBeforeSecond));
        assert_eq!(state.var(OperationId(2)).start_min(), 5);
        assert!(state.is_fully_ordered());
    }

    #[test]
    fn test_unorderable_pair() {
        // Two 4-long ops on one machine within horizon 6.
        let (_, result) = solve_root(vec![vec![(0, 4)], vec![(0, 4)]], Some(6));
        assert!(matches!(result, Err(Infeasible::Unorderable { machine: 0, .. })));
    }

    #[test]
    fn test_empty_domain_at_root() {
        let (_, result) = solve_root(vec![vec![(0, 4), (0, 4)]], Some(7));
        assert!(matches!(result, Err(Infeasible::EmptyDomain(_))));
    }

    #[test]
    fn test_duration_beyond_cap() {
        let (_, result) = solve_root(vec![vec![(0, 9)]], Some(5));
        assert_eq!(
            result,
            Err(Infeasible::EmptyDomain(InfeasibleBound { op: OperationId(0) }))
        );
    }

    #[test]
    fn test_decided_order_propagates() {
        let inst = JobShopInstance::new(vec![vec![(0, 2)], vec![(0, 3)]]).unwrap();
        let store = ConstraintStore::new(&inst);
        let mut state = SearchState::new(&inst, &store, inst.horizon());
        let propagator = Propagator::new(&store);
        propagator.propagate(&mut state).unwrap();
        assert_eq!(state.order(0), None);

        state.push_frame();
        state.commit_order(0, PairOrder::SecondBeforeFirst);
        propagator.propagate(&mut state).unwrap();
        assert_eq!(state.var(OperationId(0)).start_min(), 3);
        assert_eq!(state.var(OperationId(1)).end_max(), 3);

        state.pop_frame();
        assert_eq!(state.var(OperationId(0)).start_min(), 0);
    }

    #[test]
    fn test_fixed_point_is_stable() {
        let inst = JobShopInstance::new(vec![
            vec![(1, 2), (2, 3), (0, 5)],
            vec![(0, 3), (1, 6), (2, 4)],
            vec![(1, 2), (0, 2), (2, 4)],
        ])
        .unwrap();
        let store = ConstraintStore::new(&inst);
        let mut state = SearchState::new(&inst, &store, inst.horizon());
        let propagator = Propagator::new(&store);
        propagator.propagate(&mut state).unwrap();
        let snapshot = state.vars().to_vec();

        assert_eq!(propagator.propagate(&mut state), Ok(1));
        assert_eq!(state.vars(), snapshot.as_slice());
        // Job 1 needs 13 time units before its last op can end.
        assert_eq!(state.var(OperationId(5)).start_min(), 9);
    }
}
