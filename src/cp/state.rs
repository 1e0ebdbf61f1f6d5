//! Search state: the bound state of one solve attempt.
//!
//! Holds an [`IntervalVar`] per operation and the committed order (if
//! any) of every disjunction. The state is exclusively owned by one
//! search; it is mutated in place and restored through the trail when
//! the search backtracks.
//!
//! Changes made before the first [`SearchState::push_frame`] are
//! permanent (root propagation); everything after is undone frame by
//! frame.

use super::constraint::{ConstraintStore, PairOrder};
use super::domain::{InfeasibleBound, IntervalVar};
use super::trail::{SearchTrail, TrailEntry};
use crate::models::{JobShopInstance, OperationId};

#[derive(Debug, Clone)]
pub struct SearchState {
    vars: Vec<IntervalVar>,
    orders: Vec<Option<PairOrder>>,
    num_undecided: usize,
    trail: SearchTrail,
}

impl SearchState {
    /// Creates the root state: every start within `[0, horizon - duration]`,
    /// every disjunction undecided.
    pub fn new(instance: &JobShopInstance, store: &ConstraintStore, horizon: i64) -> Self {
        let vars = instance
            .operations()
            .iter()
            .enumerate()
            .map(|(i, op)| IntervalVar::new(OperationId(i), op.duration, horizon))
            .collect();
        let num_disjunctions = store.num_disjunctions();

        Self {
            vars,
            orders: vec![None; num_disjunctions],
            num_undecided: num_disjunctions,
            trail: SearchTrail::preallocated(instance.num_operations(), num_disjunctions),
        }
    }

    /// Bounds of an operation.
    #[inline]
    pub fn var(&self, op: OperationId) -> &IntervalVar {
        &self.vars[op.get()]
    }

    /// All variables in dense-id order.
    #[inline]
    pub fn vars(&self) -> &[IntervalVar] {
        &self.vars
    }

    /// Committed order of disjunction `pair`, if any.
    #[inline]
    pub fn order(&self, pair: usize) -> Option<PairOrder> {
        self.orders[pair]
    }

    /// Number of disjunctions without a committed order.
    #[inline]
    pub fn num_undecided(&self) -> usize {
        self.num_undecided
    }

    /// Whether every disjunction has an order.
    #[inline]
    pub fn is_fully_ordered(&self) -> bool {
        self.num_undecided == 0
    }

    /// Current decision depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.trail.depth()
    }

    /// Whether any variable has an empty domain.
    pub fn has_empty_domain(&self) -> bool {
        self.vars.iter().any(IntervalVar::is_empty)
    }

    /// Raises the start lower bound of `op`.
    ///
    /// # Errors
    /// [`InfeasibleBound`] if the domain would become empty; the state is
    /// left unchanged.
    pub fn tighten_start_lower_bound(
        &mut self,
        op: OperationId,
        value: i64,
    ) -> Result<bool, InfeasibleBound> {
        let previous = self.vars[op.get()];
        let changed = self.vars[op.get()].tighten_start_lower_bound(value)?;
        if changed {
            self.trail.record(TrailEntry::Bounds { op, previous });
        }
        Ok(changed)
    }

    /// Lowers the end upper bound of `op`.
    ///
    /// # Errors
    /// [`InfeasibleBound`] if the domain would become empty; the state is
    /// left unchanged.
    pub fn tighten_end_upper_bound(
        &mut self,
        op: OperationId,
        value: i64,
    ) -> Result<bool, InfeasibleBound> {
        let previous = self.vars[op.get()];
        let changed = self.vars[op.get()].tighten_end_upper_bound(value)?;
        if changed {
            self.trail.record(TrailEntry::Bounds { op, previous });
        }
        Ok(changed)
    }

    /// Commits an order for disjunction `pair`.
    ///
    /// Committing the same order twice is a no-op. The caller never
    /// commits the opposite order of an already decided pair.
    pub fn commit_order(&mut self, pair: usize, order: PairOrder) {
        debug_assert!(
            self.orders[pair].is_none_or(|o| o == order),
            "called `SearchState::commit_order` with a conflicting order for pair {pair}"
        );
        if self.orders[pair].is_none() {
            self.orders[pair] = Some(order);
            self.num_undecided -= 1;
            self.trail.record(TrailEntry::Order { pair });
        }
    }

    /// Opens a new decision level.
    #[inline]
    pub fn push_frame(&mut self) {
        self.trail.push_frame();
    }

    /// Undoes every change since the matching [`SearchState::push_frame`].
    pub fn pop_frame(&mut self) {
        let Some(entries) = self.trail.pop_frame() else {
            return;
        };
        for entry in entries {
            match entry {
                TrailEntry::Bounds { op, previous } => self.vars[op.get()] = previous,
                TrailEntry::Order { pair } => {
                    self.orders[pair] = None;
                    self.num_undecided += 1;
                }
            }
        }
    }

    /// Earliest start of every operation, in dense-id order.
    pub fn earliest_starts(&self) -> Vec<i64> {
        self.vars.iter().map(IntervalVar::start_min).collect()
    }
}

impl ConstraintStore {
    /// Index of the first disjunction still undecided in `state`, in
    /// branching order (machine id, then operation keys).
    pub fn first_undecided(&self, state: &SearchState) -> Option<usize> {
        if state.is_fully_ordered() {
            return None;
        }
        (0..self.num_disjunctions()).find(|&pair| state.order(pair).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (JobShopInstance, ConstraintStore) {
        let inst = JobShopInstance::new(vec![vec![(0, 3), (1, 2)], vec![(0, 4), (1, 1)]]).unwrap();
        let store = ConstraintStore::new(&inst);
        (inst, store)
    }

    #[test]
    fn test_root_state() {
        let (inst, store) = setup();
        let state = SearchState::new(&inst, &store, inst.horizon());
        assert_eq!(state.vars().len(), 4);
        assert_eq!(state.num_undecided(), 2);
        assert_eq!(state.var(OperationId(0)).start_max(), 10 - 3);
        assert_eq!(store.first_undecided(&state), Some(0));
    }

    #[test]
    fn test_pop_frame_restores_bounds_and_orders() {
        let (inst, store) = setup();
        let mut state = SearchState::new(&inst, &store, inst.horizon());

        state.push_frame();
        state.commit_order(0, PairOrder::FirstBeforeSecond);
        state.tighten_start_lower_bound(OperationId(2), 3).unwrap();
        state.tighten_end_upper_bound(OperationId(0), 6).unwrap();
        assert_eq!(state.num_undecided(), 1);
        assert_eq!(store.first_undecided(&state), Some(1));

        state.push_frame();
        state.tighten_start_lower_bound(OperationId(2), 5).unwrap();
        state.commit_order(1, PairOrder::SecondBeforeFirst);
        assert!(state.is_fully_ordered());
        assert_eq!(store.first_undecided(&state), None);

        state.pop_frame();
        assert_eq!(state.var(OperationId(2)).start_min(), 3);
        assert_eq!(state.order(1), None);
        assert_eq!(state.num_undecided(), 1);

        state.pop_frame();
        assert_eq!(state.var(OperationId(2)).start_min(), 0);
        assert_eq!(state.var(OperationId(0)).end_max(), 10);
        assert_eq!(state.order(0), None);
        assert_eq!(state.num_undecided(), 2);
        assert_eq!(state.depth(), 0);
    }

    #[test]
    fn test_root_changes_survive_pop() {
        let (inst, store) = setup();
        let mut state = SearchState::new(&inst, &store, inst.horizon());
        state.tighten_start_lower_bound(OperationId(1), 4).unwrap();
        state.pop_frame();
        assert_eq!(state.var(OperationId(1)).start_min(), 4);
    }

    #[test]
    fn test_failed_tightening_leaves_state() {
        let (inst, store) = setup();
        let mut state = SearchState::new(&inst, &store, inst.horizon());
        state.push_frame();
        assert!(state.tighten_start_lower_bound(OperationId(0), 100).is_err());
        assert_eq!(state.var(OperationId(0)).start_min(), 0);
    }

    #[test]
    fn test_commit_same_order_twice() {
        let (inst, store) = setup();
        let mut state = SearchState::new(&inst, &store, inst.horizon());
        state.push_frame();
        state.commit_order(0, PairOrder::FirstBeforeSecond);
        state.commit_order(0, PairOrder::FirstBeforeSecond);
        assert_eq!(state.num_undecided(), 1);
        state.pop_frame();
        assert_eq!(state.num_undecided(), 2);
    }
}
