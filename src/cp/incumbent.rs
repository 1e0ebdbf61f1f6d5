//! Incumbent storage.
//!
//! The incumbent is the best complete schedule found so far, kept as the
//! start time of every operation (dense-id order) plus its makespan. The
//! search reads its makespan as the pruning bound and offers every
//! complete schedule it reaches.
//!
//! [`LocalIncumbent`] serves a single search. [`SharedIncumbent`] is
//! shared by parallel workers: the bound lives in an atomic so reads
//! never lock; installs take a mutex and re-check against the stored
//! schedule.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Best complete schedule known, as raw start times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    pub makespan: i64,
    /// Start time per operation, indexed by dense operation id.
    pub starts: Vec<i64>,
}

impl Incumbent {
    pub fn new(makespan: i64, starts: Vec<i64>) -> Self {
        Self { makespan, starts }
    }
}

/// Access to the incumbent used by the search engine.
pub trait IncumbentStore {
    /// Current makespan bound; `i64::MAX` when no schedule is known.
    fn upper_bound(&self) -> i64;

    /// Installs the candidate if it is strictly better than the current
    /// incumbent. Returns `true` if it was installed.
    fn offer(&mut self, makespan: i64, starts: &[i64]) -> bool;
}

/// Incumbent owned by one search.
#[derive(Debug, Clone, Default)]
pub struct LocalIncumbent {
    best: Option<Incumbent>,
}

impl LocalIncumbent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a known schedule (e.g. a warm start).
    pub fn seeded(incumbent: Incumbent) -> Self {
        Self {
            best: Some(incumbent),
        }
    }

    pub fn best(&self) -> Option<&Incumbent> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<Incumbent> {
        self.best
    }
}

impl IncumbentStore for LocalIncumbent {
    #[inline]
    fn upper_bound(&self) -> i64 {
        self.best.as_ref().map_or(i64::MAX, |b| b.makespan)
    }

    fn offer(&mut self, makespan: i64, starts: &[i64]) -> bool {
        if makespan >= self.upper_bound() {
            return false;
        }
        self.best = Some(Incumbent::new(makespan, starts.to_vec()));
        true
    }
}

/// Incumbent shared across threads.
#[derive(Debug)]
pub struct SharedIncumbent {
    upper_bound: AtomicI64,
    best: Mutex<Option<Incumbent>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SharedIncumbent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incumbent(upper_bound: {})", self.upper_bound())
    }
}

impl SharedIncumbent {
    /// No schedule installed; the bound is `i64::MAX`.
    pub fn new() -> Self {
        Self {
            upper_bound: AtomicI64::new(i64::MAX),
            best: Mutex::new(None),
        }
    }

    pub fn seeded(incumbent: Incumbent) -> Self {
        Self {
            upper_bound: AtomicI64::new(incumbent.makespan),
            best: Mutex::new(Some(incumbent)),
        }
    }

    #[inline]
    pub fn upper_bound(&self) -> i64 {
        self.upper_bound.load(Ordering::Relaxed)
    }

    /// Copy of the current incumbent, if any.
    pub fn snapshot(&self) -> Option<Incumbent> {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_best(self) -> Option<Incumbent> {
        self.best.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs the candidate if strictly better. Equal makespans keep the
    /// schedule that arrived first.
    pub fn try_install(&self, makespan: i64, starts: &[i64]) -> bool {
        if makespan >= self.upper_bound() {
            return false;
        }

        let mut guard = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        // The atomic may be stale; compare against the stored schedule.
        if guard.as_ref().is_some_and(|b| makespan >= b.makespan) {
            return false;
        }

        *guard = Some(Incumbent::new(makespan, starts.to_vec()));
        self.upper_bound.store(makespan, Ordering::Relaxed);
        true
    }
}

impl IncumbentStore for &SharedIncumbent {
    #[inline]
    fn upper_bound(&self) -> i64 {
        SharedIncumbent::upper_bound(self)
    }

    #[inline]
    fn offer(&mut self, makespan: i64, starts: &[i64]) -> bool {
        self.try_install(makespan, starts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_local_incumbent() {
        let mut inc = LocalIncumbent::new();
        assert_eq!(inc.upper_bound(), i64::MAX);
        assert!(inc.offer(20, &[0, 5]));
        assert!(!inc.offer(20, &[1, 6]));
        assert!(inc.offer(18, &[0, 3]));
        assert_eq!(inc.best(), Some(&Incumbent::new(18, vec![0, 3])));
    }

    #[test]
    fn test_seeded_local_incumbent() {
        let mut inc = LocalIncumbent::seeded(Incumbent::new(15, vec![0]));
        assert_eq!(inc.upper_bound(), 15);
        assert!(!inc.offer(16, &[1]));
        assert_eq!(inc.into_best().map(|b| b.makespan), Some(15));
    }

    #[test]
    fn test_shared_initial_state() {
        let inc = SharedIncumbent::new();
        assert_eq!(inc.upper_bound(), i64::MAX);
        assert!(inc.snapshot().is_none());
        assert_eq!(inc.to_string(), format!("Incumbent(upper_bound: {})", i64::MAX));
    }

    #[test]
    fn test_shared_install_only_improvements() {
        let inc = SharedIncumbent::seeded(Incumbent::new(30, vec![0, 0]));
        assert!(!inc.try_install(30, &[1, 1]));
        assert!(inc.try_install(25, &[2, 2]));
        assert_eq!(inc.upper_bound(), 25);
        assert_eq!(inc.snapshot(), Some(Incumbent::new(25, vec![2, 2])));
    }

    #[test]
    fn test_shared_store_trait() {
        let inc = SharedIncumbent::new();
        let mut handle = &inc;
        assert!(handle.offer(9, &[0]));
        assert_eq!(IncumbentStore::upper_bound(&handle), 9);
    }

    #[test]
    fn test_concurrent_installs_keep_minimum() {
        let inc = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let inc = Arc::clone(&inc);
                thread::spawn(move || {
                    for k in 0..50 {
                        let makespan = 1000 - (t * 50 + k) as i64;
                        inc.try_install(makespan, &[makespan]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let best = inc.snapshot().unwrap();
        assert_eq!(best.makespan, 1000 - 399);
        assert_eq!(inc.upper_bound(), best.makespan);
        assert_eq!(best.starts, vec![best.makespan]);
    }
}
