//! Live depth and worker-count probes.
//!
//! tokio channels expose no stable synchronous length, so the engine
//! tracks queue depths itself: enqueue/dequeue paths bump atomic gauges
//! and the monitor samples them on its tick. Counts are approximate at
//! instants where an item is mid-transfer; readers clamp at zero.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Atomic gauges shared between the pool and the statistics monitor.
#[derive(Debug, Default)]
pub struct PoolGauges {
    queued: AtomicI64,
    retrying: AtomicI64,
    workers: AtomicUsize,
}

impl PoolGauges {
    /// Approximate number of tasks waiting in the task queue.
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed).max(0) as u64
    }

    /// Approximate number of tasks awaiting their retry delay.
    pub fn retrying(&self) -> u64 {
        self.retrying.load(Ordering::Relaxed).max(0) as u64
    }

    /// Number of executors currently launched.
    pub fn workers(&self) -> usize {
        self.workers.load(Ordering::Relaxed)
    }

    pub(crate) fn task_enqueued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn task_dequeued(&self) {
        self.queued.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn retry_enqueued(&self) {
        self.retrying.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn retry_dequeued(&self) {
        self.retrying.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn set_workers(&self, count: usize) {
        self.workers.store(count, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauges_track_and_clamp() {
        let g = PoolGauges::default();
        g.task_enqueued();
        g.task_enqueued();
        g.task_dequeued();
        assert_eq!(g.queued(), 1);

        // A dequeue observed before its enqueue must not underflow.
        g.retry_dequeued();
        assert_eq!(g.retrying(), 0);

        g.set_workers(3);
        assert_eq!(g.workers(), 3);
    }
}
