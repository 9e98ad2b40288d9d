//! # Executor loop: one worker of the pool.
//!
//! Each worker repeatedly dequeues a task from the shared queue, runs one
//! attempt under the configured deadline, classifies the outcome, and
//! either emits a terminal [`TaskResult`] or routes the task to the retry
//! queue.
//!
//! ## Outcome flow
//! ```text
//! dequeue ─► resolve handler ──none──► UnregisteredCategory (terminal)
//!               │
//!               ▼
//!          run under timeout ──expired──► Timeout
//!               │
//!               ▼
//!            Ok / Err
//!               │
//!   Ok ──► result (is_final = true)
//!   Err ─► policy.should_retry()?
//!            ├─ yes ─► retry queue (try_send)
//!            │           └─ full ─► result QueueSaturated (is_final = false)
//!            └─ no ──► result (is_final = true)
//! ```
//!
//! ## Rules
//! - Attempts of one task are strictly sequential; a task is owned by
//!   exactly one worker while it executes.
//! - A full retry queue is a failure branch, never a blocking wait.
//! - On deadline expiry the attempt token is cancelled and the engine
//!   stops waiting; the handler's own work is not forcibly terminated.
//! - A handler failure never unwinds the worker; everything becomes data
//!   on the result.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime};

use log::{debug, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::PoolGauges;
use crate::error::TaskError;
use crate::policies::PolicyTable;
use crate::tasks::{HandlerRef, Task, TaskCategory, TaskResult};

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) task_rx: Arc<Mutex<mpsc::Receiver<Task>>>,
    pub(crate) retry_tx: mpsc::Sender<Task>,
    pub(crate) result_tx: mpsc::Sender<TaskResult>,
    pub(crate) handlers: Arc<RwLock<HashMap<TaskCategory, HandlerRef>>>,
    pub(crate) policies: Arc<PolicyTable>,
    pub(crate) gauges: Arc<PoolGauges>,
    pub(crate) timeout: Duration,
}

impl Worker {
    /// Runs until the task queue is closed and drained.
    pub(crate) async fn run(self) {
        debug!("worker {} started", self.id);
        loop {
            let task = { self.task_rx.lock().await.recv().await };
            let Some(task) = task else { break };
            self.gauges.task_dequeued();
            self.execute(task).await;
        }
        debug!("worker {} exited", self.id);
    }

    /// Executes one attempt and routes the outcome.
    async fn execute(&self, mut task: Task) {
        let attempt_started = Instant::now();
        if task.first_attempt.is_none() {
            task.first_attempt = Some(attempt_started);
            task.started_at = Some(SystemTime::now());
        }
        if task.attempt_count > 0 {
            debug!(
                "worker {} retrying task {} ({}), attempt {}",
                self.id,
                task.id,
                task.name,
                task.attempt_count + 1
            );
        }

        let outcome = self.run_attempt(&task).await;
        let duration = attempt_started.elapsed();
        let total_duration = task
            .first_attempt
            .map(|first| first.elapsed())
            .unwrap_or(duration);

        let err = match outcome {
            Ok(()) => {
                self.emit(task, None, duration, total_duration, true).await;
                return;
            }
            Err(err) => err,
        };

        let policy = self.policies.get(task.category);
        if policy.should_retry(&err, task.attempt_count) {
            task.attempt_count += 1;
            task.last_error = Some(err.clone());
            match self.retry_tx.try_send(task) {
                Ok(()) => {
                    self.gauges.retry_enqueued();
                }
                Err(send_err) => {
                    let mut task = send_err.into_inner();
                    // Roll back so the reported count equals attempts run.
                    task.attempt_count -= 1;
                    warn!(
                        "worker {}: retry queue saturated, task {} fails terminally",
                        self.id, task.id
                    );
                    let saturated = TaskError::QueueSaturated {
                        cause: err.to_string(),
                    };
                    self.emit(task, Some(saturated), duration, total_duration, false)
                        .await;
                }
            }
        } else {
            debug!(
                "worker {}: task {} failed terminally after {} attempt(s): {}",
                self.id,
                task.id,
                task.attempt_count + 1,
                err
            );
            self.emit(task, Some(err), duration, total_duration, true)
                .await;
        }
    }

    /// Runs the registered handler under the attempt deadline.
    async fn run_attempt(&self, task: &Task) -> Result<(), TaskError> {
        let handler = {
            let map = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            map.get(&task.category).cloned()
        };
        let Some(handler) = handler else {
            return Err(TaskError::UnregisteredCategory {
                category: task.category,
            });
        };

        let attempt_token = CancellationToken::new();
        match time::timeout(self.timeout, handler.run(task, attempt_token.clone())).await {
            Ok(result) => result,
            Err(_elapsed) => {
                attempt_token.cancel();
                Err(TaskError::Timeout {
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn emit(
        &self,
        task: Task,
        error: Option<TaskError>,
        duration: Duration,
        total_duration: Duration,
        is_final: bool,
    ) {
        let finished_at = SystemTime::now();
        let result = TaskResult {
            task_id: task.id,
            task_name: task.name,
            category: task.category,
            success: error.is_none(),
            error,
            duration,
            total_duration,
            worker_id: self.id,
            started_at: task.started_at.unwrap_or(finished_at),
            finished_at,
            attempt_count: task.attempt_count + 1,
            is_final,
        };
        let _ = self.result_tx.send(result).await;
    }
}
