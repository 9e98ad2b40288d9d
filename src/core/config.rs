//! Pool configuration.
//!
//! All buffers in the engine are bounded; a full task queue exerts
//! backpressure on producers, while a full retry queue degrades to a
//! terminal failure instead of blocking a worker (see the worker
//! module docs).

use std::time::Duration;

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
///
/// ## Field semantics
/// - `task_queue_capacity`: pending-work buffer; `add_task` blocks when full
/// - `retry_queue_capacity`: backoff buffer; overflow fails the task
/// - `result_capacity`: completed-outcome buffer; workers block when full,
///   so consume results while the pool runs
/// - `task_timeout`: per-attempt deadline applied to every handler
///
/// Capacities are clamped to a minimum of 1 when the channels are built.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Capacity of the pending task queue.
    pub task_queue_capacity: usize,
    /// Capacity of the retry queue. Sized larger than the task queue so
    /// a burst of transient failures does not immediately saturate it.
    pub retry_queue_capacity: usize,
    /// Capacity of the result channel.
    pub result_capacity: usize,
    /// Deadline applied to each handler invocation.
    pub task_timeout: Duration,
}

impl Default for PoolConfig {
    /// Defaults: task queue 10, retry queue 50, results 10, timeout 30s.
    fn default() -> Self {
        Self {
            task_queue_capacity: 10,
            retry_queue_capacity: 50,
            result_capacity: 10,
            task_timeout: Duration::from_secs(30),
        }
    }
}
