//! Aggregated execution statistics.
//!
//! [`PoolStats`] is a plain fold over terminal [`TaskResult`]s plus a
//! periodic sample of the engine gauges. Latency aggregates use the
//! exact incremental arithmetic mean, so the average never drifts from
//! the true mean of everything recorded.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::core::PoolGauges;
use crate::tasks::{TaskCategory, TaskResult};

/// Per-category slice of the aggregate.
#[derive(Clone, Debug, Default)]
pub struct CategoryStats {
    /// Results recorded for this category.
    pub total: u64,
    /// Results that ended in success.
    pub succeeded: u64,
    /// Results that ended in failure.
    pub failed: u64,
    /// Results whose task ran more than one attempt.
    pub retried: u64,
    /// Mean of `total_duration` in milliseconds.
    pub avg_duration_ms: f64,
}

impl CategoryStats {
    /// Success percentage in `[0, 100]`; `0.0` before any result.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64 * 100.0
    }

    fn record(&mut self, result: &TaskResult, duration_ms: f64) {
        self.total += 1;
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        if result.was_retried() {
            self.retried += 1;
        }
        let n = self.total as f64;
        self.avg_duration_ms = (self.avg_duration_ms * (n - 1.0) + duration_ms) / n;
    }
}

/// Snapshot of everything the monitor knows.
///
/// `Clone` produces a deep copy: the per-category map is owned, so a
/// snapshot never changes after it is taken.
#[derive(Clone, Debug)]
pub struct PoolStats {
    /// Terminal results recorded since start.
    pub total_tasks: u64,
    /// Results that ended in success.
    pub completed_tasks: u64,
    /// Results that ended in failure.
    pub failed_tasks: u64,
    /// Tasks waiting in the task queue (sampled).
    pub queued_tasks: u64,
    /// Tasks awaiting their retry delay (sampled).
    pub retrying_tasks: u64,
    /// Workers currently launched. Sampling approximates every launched
    /// worker as active.
    pub active_workers: usize,
    /// Always zero under the sampling approximation.
    pub idle_workers: usize,
    /// Smallest `total_duration` seen, in milliseconds.
    pub min_duration_ms: f64,
    /// Largest `total_duration` seen, in milliseconds.
    pub max_duration_ms: f64,
    /// Mean `total_duration`, in milliseconds.
    pub avg_duration_ms: f64,
    /// Per-category breakdown.
    pub categories: HashMap<TaskCategory, CategoryStats>,
    /// Time since the monitor started.
    pub uptime: Duration,
    /// Wall clock of the last record or sample.
    pub last_updated: SystemTime,
}

impl PoolStats {
    pub(crate) fn new() -> Self {
        Self {
            total_tasks: 0,
            completed_tasks: 0,
            failed_tasks: 0,
            queued_tasks: 0,
            retrying_tasks: 0,
            active_workers: 0,
            idle_workers: 0,
            min_duration_ms: 0.0,
            max_duration_ms: 0.0,
            avg_duration_ms: 0.0,
            categories: HashMap::new(),
            uptime: Duration::ZERO,
            last_updated: SystemTime::now(),
        }
    }

    /// Folds one terminal result into the aggregate.
    pub(crate) fn record(&mut self, result: &TaskResult) {
        let duration_ms = result.total_duration.as_secs_f64() * 1000.0;

        self.total_tasks += 1;
        if result.success {
            self.completed_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }

        // Min/max are seeded from the first sample so a fast first task
        // does not leave min stuck at zero.
        if self.total_tasks == 1 {
            self.min_duration_ms = duration_ms;
            self.max_duration_ms = duration_ms;
        } else {
            self.min_duration_ms = self.min_duration_ms.min(duration_ms);
            self.max_duration_ms = self.max_duration_ms.max(duration_ms);
        }
        let n = self.total_tasks as f64;
        self.avg_duration_ms = (self.avg_duration_ms * (n - 1.0) + duration_ms) / n;

        self.categories
            .entry(result.category)
            .or_default()
            .record(result, duration_ms);

        self.last_updated = SystemTime::now();
    }

    /// Refreshes the sampled portion from the engine gauges.
    pub(crate) fn sample(&mut self, gauges: &PoolGauges, uptime: Duration) {
        self.queued_tasks = gauges.queued();
        self.retrying_tasks = gauges.retrying();
        self.active_workers = gauges.workers();
        self.idle_workers = 0;
        self.uptime = uptime;
        self.last_updated = SystemTime::now();
    }
}
