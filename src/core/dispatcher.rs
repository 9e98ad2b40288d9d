//! # Retry dispatcher: the sequential backoff loop.
//!
//! A single loop drains the retry queue: pop a task, compute its delay
//! from the category's policy, sleep, then resubmit to the task queue.
//! Retries are rate-limited by design (one delay at a time), not
//! throughput-limited, so the loop is deliberately not parallelized.
//!
//! ## Shutdown semantics
//! If the shutdown token fires while the dispatcher sleeps or while it
//! waits for queue space, the in-flight task is dropped and the loop
//! exits without resubmission. Such tasks are permanently lost and emit
//! no terminal result — a documented limitation callers must reconcile
//! against if exact counts matter.

use std::sync::Arc;

use log::debug;
use tokio::sync::mpsc;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::PoolGauges;
use crate::policies::PolicyTable;
use crate::tasks::Task;

pub(crate) struct RetryDispatcher {
    pub(crate) retry_rx: mpsc::Receiver<Task>,
    pub(crate) task_tx: mpsc::Sender<Task>,
    pub(crate) policies: Arc<PolicyTable>,
    pub(crate) gauges: Arc<PoolGauges>,
    pub(crate) shutdown: CancellationToken,
}

impl RetryDispatcher {
    /// Runs until shutdown is signalled or the retry queue closes.
    pub(crate) async fn run(mut self) {
        debug!("retry dispatcher started");
        loop {
            let task = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                recv = self.retry_rx.recv() => match recv {
                    Some(task) => task,
                    None => break,
                },
            };
            self.gauges.retry_dequeued();

            let policy = self.policies.get(task.category);
            let delay = policy.calculate_retry_delay(task.attempt_count);
            debug!(
                "task {} re-queued in {:?} (attempt {}/{})",
                task.id,
                delay,
                task.attempt_count + 1,
                policy.max_retries + 1
            );

            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = self.shutdown.cancelled() => {
                    debug!("shutdown during backoff, task {} dropped", task.id);
                    break;
                }
            }

            let task_id = task.id;
            tokio::select! {
                sent = self.task_tx.send(task) => {
                    if sent.is_err() {
                        break;
                    }
                    self.gauges.task_enqueued();
                    debug!("task {task_id} returned to the task queue");
                }
                _ = self.shutdown.cancelled() => {
                    debug!("shutdown during resubmit, task {task_id} dropped");
                    break;
                }
            }
        }
        debug!("retry dispatcher exited");
    }
}
