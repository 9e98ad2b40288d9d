//! # Monitor loop: non-blocking statistics collection.
//!
//! The monitor decouples stats bookkeeping from the result-consumption
//! path: callers hand results to a bounded inlet with `try_send` and
//! move on, and a single loop folds them into the aggregate.
//!
//! ```text
//! recv_result() ─► on_task_result() ─► [update inlet] ─► monitor loop
//!                     (try_send,                             │ fold
//!                      drop on full)                         ▼
//!                                        gauges ──tick──► PoolStats
//! ```
//!
//! ## Rules
//! - `on_task_result` never blocks; under sustained overload updates are
//!   dropped and the aggregate undercounts.
//! - The periodic tick samples queue depths and worker counts; recorded
//!   results update the fold immediately.
//! - `stats()` is a deep snapshot, untouched by later updates.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::PoolGauges;
use crate::error::PoolError;
use crate::monitor::PoolStats;
use crate::tasks::TaskResult;

const UPDATE_INLET_CAPACITY: usize = 100;
const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Statistics aggregator for a running pool.
///
/// Feed it every result pulled from the pool and it maintains global and
/// per-category aggregates plus sampled queue depths.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use taskpool::{Monitor, PoolConfig, WorkerPool};
///
/// # async fn demo() {
/// let pool = WorkerPool::new(PoolConfig::default());
/// let mut monitor = Monitor::new(pool.gauges()).with_tick(Duration::from_millis(500));
/// monitor.start().unwrap();
///
/// while let Some(result) = pool.recv_result().await {
///     monitor.on_task_result(result);
/// }
/// println!("completed: {}", monitor.stats().completed_tasks);
/// monitor.stop().await;
/// # }
/// ```
pub struct Monitor {
    stats: Arc<Mutex<PoolStats>>,
    gauges: Arc<PoolGauges>,
    tick: Duration,
    update_tx: mpsc::Sender<TaskResult>,
    update_rx: Option<mpsc::Receiver<TaskResult>>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Creates a monitor sampling the given gauges on a 1s tick.
    pub fn new(gauges: Arc<PoolGauges>) -> Self {
        let (update_tx, update_rx) = mpsc::channel(UPDATE_INLET_CAPACITY);
        Self {
            stats: Arc::new(Mutex::new(PoolStats::new())),
            gauges,
            tick: DEFAULT_TICK,
            update_tx,
            update_rx: Some(update_rx),
            shutdown: CancellationToken::new(),
            handle: None,
        }
    }

    /// Overrides the sampling interval.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Launches the aggregation loop. Uptime counts from this call.
    ///
    /// Returns [`PoolError::AlreadyRunning`] on a second start.
    pub fn start(&mut self) -> Result<(), PoolError> {
        let Some(mut update_rx) = self.update_rx.take() else {
            return Err(PoolError::AlreadyRunning);
        };

        let stats = Arc::clone(&self.stats);
        let gauges = Arc::clone(&self.gauges);
        let shutdown = self.shutdown.clone();
        let tick = self.tick;
        self.handle = Some(tokio::spawn(async move {
            debug!("monitor started");
            let started = Instant::now();
            let mut interval = time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    recv = update_rx.recv() => match recv {
                        Some(result) => {
                            let mut stats =
                                stats.lock().unwrap_or_else(PoisonError::into_inner);
                            stats.record(&result);
                        }
                        None => break,
                    },
                    _ = interval.tick() => {
                        let mut stats =
                            stats.lock().unwrap_or_else(PoisonError::into_inner);
                        stats.sample(&gauges, started.elapsed());
                    }
                }
            }
            debug!("monitor exited");
        }));
        Ok(())
    }

    /// Hands one result to the aggregation loop without blocking.
    ///
    /// When the inlet is full the update is dropped; the aggregate then
    /// undercounts rather than stalling the caller.
    pub fn on_task_result(&self, result: TaskResult) {
        if let Err(err) = self.update_tx.try_send(result) {
            debug!("stats update dropped: {err}");
        }
    }

    /// Returns a deep snapshot of the current aggregate.
    pub fn stats(&self) -> PoolStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stops the loop and waits for it to exit. Safe to call twice.
    pub async fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskCategory;
    use std::time::SystemTime;

    fn result(id: u64, success: bool) -> TaskResult {
        let now = SystemTime::now();
        TaskResult {
            task_id: id,
            task_name: format!("t-{id}"),
            category: TaskCategory::ALL[(id % 4) as usize],
            success,
            error: (!success).then(|| TaskError::handler("boom")),
            duration: Duration::from_millis(5),
            total_duration: Duration::from_millis(5),
            worker_id: 0,
            started_at: now,
            finished_at: now,
            attempt_count: 1,
            is_final: true,
        }
    }

    async fn wait_for_total(monitor: &Monitor, expected: u64) -> PoolStats {
        for _ in 0..200 {
            let stats = monitor.stats();
            if stats.total_tasks >= expected {
                return stats;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        monitor.stats()
    }

    #[tokio::test]
    async fn records_results_and_samples_gauges() {
        let gauges = Arc::new(PoolGauges::default());
        gauges.set_workers(2);
        let mut monitor =
            Monitor::new(Arc::clone(&gauges)).with_tick(Duration::from_millis(10));
        monitor.start().unwrap();

        for id in 0..8 {
            monitor.on_task_result(result(id, id % 4 != 0));
        }

        let stats = wait_for_total(&monitor, 8).await;
        assert_eq!(stats.total_tasks, 8);
        assert_eq!(stats.completed_tasks, 6);
        assert_eq!(stats.failed_tasks, 2);
        assert_eq!(stats.completed_tasks + stats.failed_tasks, stats.total_tasks);

        time::sleep(Duration::from_millis(30)).await;
        let stats = monitor.stats();
        assert_eq!(stats.active_workers, 2);
        assert_eq!(stats.idle_workers, 0);
        assert!(stats.uptime > Duration::ZERO);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn overload_drops_updates_instead_of_blocking() {
        let gauges = Arc::new(PoolGauges::default());
        let mut monitor =
            Monitor::new(Arc::clone(&gauges)).with_tick(Duration::from_millis(10));

        // Loop not started yet: only the inlet buffer absorbs these, and
        // the overflow is dropped without blocking this thread.
        for id in 0..150 {
            monitor.on_task_result(result(id, true));
        }

        monitor.start().unwrap();
        let stats = wait_for_total(&monitor, 100).await;
        assert_eq!(stats.total_tasks, 100);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn snapshots_are_internally_consistent_under_concurrent_updates() {
        let gauges = Arc::new(PoolGauges::default());
        let mut monitor =
            Monitor::new(Arc::clone(&gauges)).with_tick(Duration::from_millis(10));
        monitor.start().unwrap();

        let producer = {
            let tx = monitor.update_tx.clone();
            tokio::spawn(async move {
                for id in 0..50 {
                    let _ = tx.send(result(id, id % 2 == 0)).await;
                    time::sleep(Duration::from_millis(1)).await;
                }
            })
        };

        for _ in 0..30 {
            let stats = monitor.stats();
            assert_eq!(
                stats.completed_tasks + stats.failed_tasks,
                stats.total_tasks
            );
            time::sleep(Duration::from_millis(2)).await;
        }

        producer.await.unwrap();
        let stats = wait_for_total(&monitor, 50).await;
        assert_eq!(stats.total_tasks, 50);
        monitor.stop().await;
    }

    #[tokio::test]
    async fn starting_twice_fails_and_stop_is_idempotent() {
        let gauges = Arc::new(PoolGauges::default());
        let mut monitor = Monitor::new(gauges);
        monitor.start().unwrap();
        assert_eq!(monitor.start(), Err(PoolError::AlreadyRunning));
        monitor.stop().await;
        monitor.stop().await;
    }
}
