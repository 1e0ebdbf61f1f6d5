//! Scheduling context for dispatching rule evaluation.

/// Runtime scheduling state passed to dispatching rules.
///
/// Holds the current dispatch time and the work waiting in front of each
/// machine, as read by FIFO and WINQ.
#[derive(Debug, Clone, Default)]
pub struct SchedulingContext {
    /// Current dispatch time.
    pub current_time: i64,
    /// Processing time of the candidates currently waiting for each machine.
    pub queued_work: Vec<i64>,
}

impl SchedulingContext {
    /// Creates a context at the given time.
    pub fn at_time(current_time: i64) -> Self {
        Self {
            current_time,
            ..Default::default()
        }
    }

    /// Sets the queued work per machine.
    pub fn with_queued_work(mut self, queued_work: Vec<i64>) -> Self {
        self.queued_work = queued_work;
        self
    }

    /// Work waiting in front of `machine`; 0 when unknown.
    pub fn queued_work_on(&self, machine: usize) -> i64 {
        self.queued_work.get(machine).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let ctx = SchedulingContext::at_time(5).with_queued_work(vec![3, 0]);
        assert_eq!(ctx.current_time, 5);
        assert_eq!(ctx.queued_work_on(0), 3);
        assert_eq!(ctx.queued_work_on(7), 0);
    }
}
