//! Interval variables.
//!
//! One [`IntervalVar`] per operation: a start domain `[start_min,
//! start_max]` and a fixed duration. The end domain is derived through
//! the link `end = start + duration`, so the link can never be violated
//! by a tightening.
//!
//! All narrowing is monotone: a tightening that would widen a bound is a
//! no-op, and one that would empty the domain fails with
//! [`InfeasibleBound`] and leaves the variable untouched.

use thiserror::Error;

use crate::models::OperationId;

/// A bound tightening emptied the domain of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("domain of operation {op} became empty")]
pub struct InfeasibleBound {
    /// Operation whose domain would have become empty.
    pub op: OperationId,
}

/// Start/end bounds of one operation.
///
/// # Examples
///
/// ```
/// use u_jobshop::cp::IntervalVar;
/// use u_jobshop::models::OperationId;
///
/// let mut var = IntervalVar::new(OperationId(0), 4, 20);
/// assert_eq!((var.start_min(), var.start_max()), (0, 16));
/// assert_eq!((var.end_min(), var.end_max()), (4, 20));
///
/// var.tighten_start_lower_bound(3).unwrap();
/// assert_eq!(var.end_min(), 7);
/// assert!(var.tighten_end_upper_bound(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalVar {
    op: OperationId,
    start_min: i64,
    start_max: i64,
    duration: i64,
}

impl IntervalVar {
    /// Creates the initial variable: start and end both within `[0, horizon]`.
    ///
    /// If `duration > horizon` the variable starts out empty; the first
    /// tightening or [`IntervalVar::is_empty`] reports it.
    pub fn new(op: OperationId, duration: i64, horizon: i64) -> Self {
        Self {
            op,
            start_min: 0,
            start_max: horizon - duration,
            duration,
        }
    }

    /// Operation this variable belongs to.
    #[inline]
    pub fn op(&self) -> OperationId {
        self.op
    }

    #[inline]
    pub fn start_min(&self) -> i64 {
        self.start_min
    }

    #[inline]
    pub fn start_max(&self) -> i64 {
        self.start_max
    }

    #[inline]
    pub fn end_min(&self) -> i64 {
        self.start_min + self.duration
    }

    #[inline]
    pub fn end_max(&self) -> i64 {
        self.start_max + self.duration
    }

    #[inline]
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Whether the start domain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start_min > self.start_max
    }

    /// Whether the start time is fixed to a single value.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.start_min == self.start_max
    }

    /// Raises the start lower bound to `value`.
    ///
    /// Returns `Ok(true)` if the bound changed.
    ///
    /// # Errors
    /// [`InfeasibleBound`] if `value` exceeds the start upper bound.
    pub fn tighten_start_lower_bound(&mut self, value: i64) -> Result<bool, InfeasibleBound> {
        if value <= self.start_min {
            return Ok(false);
        }
        if value > self.start_max {
            return Err(InfeasibleBound { op: self.op });
        }
        self.start_min = value;
        Ok(true)
    }

    /// Lowers the start upper bound to `value`.
    ///
    /// # Errors
    /// [`InfeasibleBound`] if `value` is below the start lower bound.
    pub fn tighten_start_upper_bound(&mut self, value: i64) -> Result<bool, InfeasibleBound> {
        if value >= self.start_max {
            return Ok(false);
        }
        if value < self.start_min {
            return Err(InfeasibleBound { op: self.op });
        }
        self.start_max = value;
        Ok(true)
    }

    /// Raises the end lower bound to `value`.
    ///
    /// # Errors
    /// [`InfeasibleBound`] if the implied start lower bound exceeds the
    /// start upper bound.
    #[inline]
    pub fn tighten_end_lower_bound(&mut self, value: i64) -> Result<bool, InfeasibleBound> {
        self.tighten_start_lower_bound(value - self.duration)
    }

    /// Lowers the end upper bound to `value`.
    ///
    /// # Errors
    /// [`InfeasibleBound`] if the implied start upper bound is below the
    /// start lower bound.
    #[inline]
    pub fn tighten_end_upper_bound(&mut self, value: i64) -> Result<bool, InfeasibleBound> {
        self.tighten_start_upper_bound(value - self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(duration: i64, horizon: i64) -> IntervalVar {
        IntervalVar::new(OperationId(3), duration, horizon)
    }

    #[test]
    fn test_initial_domain() {
        let v = var(5, 31);
        assert_eq!(v.start_min(), 0);
        assert_eq!(v.start_max(), 26);
        assert_eq!(v.end_min(), 5);
        assert_eq!(v.end_max(), 31);
        assert!(!v.is_empty());
        assert!(!v.is_fixed());
    }

    #[test]
    fn test_end_follows_start() {
        let mut v = var(5, 31);
        assert_eq!(v.tighten_start_lower_bound(10), Ok(true));
        assert_eq!(v.end_min() - v.start_min(), 5);
        assert_eq!(v.tighten_end_upper_bound(20), Ok(true));
        assert_eq!(v.start_max(), 15);
        assert_eq!(v.end_max() - v.start_max(), 5);
    }

    #[test]
    fn test_tightening_is_monotone() {
        let mut v = var(2, 20);
        v.tighten_start_lower_bound(6).unwrap();
        assert_eq!(v.tighten_start_lower_bound(4), Ok(false));
        assert_eq!(v.start_min(), 6);

        v.tighten_end_upper_bound(12).unwrap();
        assert_eq!(v.tighten_end_upper_bound(15), Ok(false));
        assert_eq!(v.end_max(), 12);
    }

    #[test]
    fn test_infeasible_lower_bound() {
        let mut v = var(4, 10);
        let err = v.tighten_start_lower_bound(7).unwrap_err();
        assert_eq!(err.op, OperationId(3));
        // Untouched on failure.
        assert_eq!(v.start_min(), 0);
    }

    #[test]
    fn test_infeasible_end_upper_bound() {
        let mut v = var(4, 10);
        v.tighten_start_lower_bound(3).unwrap();
        assert!(v.tighten_end_upper_bound(6).is_err());
        assert_eq!(v.tighten_end_upper_bound(7), Ok(true));
        assert!(v.is_fixed());
    }

    #[test]
    fn test_end_lower_bound() {
        let mut v = var(4, 10);
        assert_eq!(v.tighten_end_lower_bound(9), Ok(true));
        assert_eq!(v.start_min(), 5);
        assert!(v.tighten_end_lower_bound(15).is_err());
    }

    #[test]
    fn test_zero_duration() {
        let mut v = var(0, 0);
        assert!(v.is_fixed());
        assert_eq!(v.tighten_start_lower_bound(0), Ok(false));
        assert!(v.tighten_start_lower_bound(1).is_err());
    }

    #[test]
    fn test_duration_beyond_horizon_is_empty() {
        let v = var(8, 5);
        assert!(v.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = InfeasibleBound { op: OperationId(2) };
        assert_eq!(err.to_string(), "domain of operation #2 became empty");
    }
}
