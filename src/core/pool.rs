//! # WorkerPool: bounded execution engine with retry and backpressure.
//!
//! The [`WorkerPool`] owns the three bounded buffers of the engine and
//! the threads of control that move tasks between them.
//!
//! ## High-level architecture
//! ```text
//! add_task() ──► [task queue] ──► worker 0..N ──► [result channel] ──► recv_result()
//!                     ▲               │
//!                     │          retryable failure
//!                     │               ▼
//!                     └──── retry dispatcher ◄── [retry queue]
//!                            (sleep backoff)       (try_send; full = fail)
//! ```
//!
//! ## Lifecycle
//! ```text
//! new(cfg) ─► register_handler()* ─► set_retry_policy()* ─► start(n)
//!    │
//!    ├─ add_task() ....... blocks on a full queue (backpressure)
//!    ├─ recv_result() .... blocking pull of completed outcomes
//!    │
//!    └─ stop():
//!         1. signal the retry dispatcher
//!         2. close the task queue, drain, join all workers
//!         3. close the retry queue, join the dispatcher
//!         4. result channel closes with the last worker
//! ```
//!
//! ## Rules
//! - `add_task` after `stop` has begun returns [`PoolError::QueueClosed`].
//! - Within one task's retry lineage attempts are strictly sequential;
//!   across tasks, completion order is unspecified.
//! - Retries in flight when `stop` runs are dropped without a terminal
//!   result; reconcile counts externally if exactness is required.
//! - Consume results while the pool runs: workers block on a full result
//!   channel, and `stop` waits for workers.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::core::dispatcher::RetryDispatcher;
use crate::core::worker::Worker;
use crate::core::{PoolConfig, PoolGauges};
use crate::error::PoolError;
use crate::policies::{PolicyTable, RetryPolicy};
use crate::tasks::{HandlerRef, Task, TaskCategory, TaskResult};

/// Bounded multi-worker task execution engine.
///
/// See the [module docs](self) for architecture and lifecycle.
pub struct WorkerPool {
    cfg: PoolConfig,
    handlers: Arc<RwLock<HashMap<TaskCategory, HandlerRef>>>,
    policies: Arc<PolicyTable>,
    gauges: Arc<PoolGauges>,

    task_tx: Option<mpsc::Sender<Task>>,
    task_rx: Option<mpsc::Receiver<Task>>,
    retry_tx: Option<mpsc::Sender<Task>>,
    retry_rx: Option<mpsc::Receiver<Task>>,
    result_tx: Option<mpsc::Sender<TaskResult>>,
    result_rx: Mutex<mpsc::Receiver<TaskResult>>,

    workers: JoinSet<()>,
    dispatcher: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Creates a pool with the given configuration and the seeded
    /// per-category retry policies ([`PolicyTable::seeded`]).
    ///
    /// The queues exist from this point on, so tasks may be enqueued
    /// before [`WorkerPool::start`]; they sit in the task queue until
    /// workers launch.
    pub fn new(cfg: PoolConfig) -> Self {
        let (task_tx, task_rx) = mpsc::channel(cfg.task_queue_capacity.max(1));
        let (retry_tx, retry_rx) = mpsc::channel(cfg.retry_queue_capacity.max(1));
        let (result_tx, result_rx) = mpsc::channel(cfg.result_capacity.max(1));

        Self {
            cfg,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            policies: Arc::new(PolicyTable::seeded()),
            gauges: Arc::new(PoolGauges::default()),
            task_tx: Some(task_tx),
            task_rx: Some(task_rx),
            retry_tx: Some(retry_tx),
            retry_rx: Some(retry_rx),
            result_tx: Some(result_tx),
            result_rx: Mutex::new(result_rx),
            workers: JoinSet::new(),
            dispatcher: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Binds a handler to a category, replacing any previous binding.
    ///
    /// Tasks whose category has no handler fail with
    /// [`TaskError::UnregisteredCategory`](crate::TaskError::UnregisteredCategory).
    pub fn register_handler(&self, category: TaskCategory, handler: HandlerRef) {
        let mut map = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.insert(category, handler);
    }

    /// Sets the per-attempt deadline. Must be called before
    /// [`WorkerPool::start`]; workers copy the value when they launch.
    pub fn set_task_timeout(&mut self, timeout: Duration) {
        self.cfg.task_timeout = timeout;
    }

    /// Overrides the retry policy for one category (last-writer-wins).
    pub fn set_retry_policy(&self, category: TaskCategory, policy: RetryPolicy) {
        self.policies.set(category, policy);
    }

    /// Returns the effective retry policy for a category.
    pub fn retry_policy(&self, category: TaskCategory) -> RetryPolicy {
        self.policies.get(category)
    }

    /// Returns the gauges handle for a monitor to sample.
    pub fn gauges(&self) -> Arc<PoolGauges> {
        Arc::clone(&self.gauges)
    }

    /// Launches `worker_count` executors and one retry dispatcher.
    ///
    /// Must be called from within a tokio runtime. Returns
    /// [`PoolError::AlreadyRunning`] if the pool was started before.
    pub fn start(&mut self, worker_count: usize) -> Result<(), PoolError> {
        let (Some(task_rx), Some(retry_rx), Some(result_tx), Some(retry_tx), Some(task_tx)) = (
            self.task_rx.take(),
            self.retry_rx.take(),
            self.result_tx.take(),
            self.retry_tx.clone(),
            self.task_tx.clone(),
        ) else {
            return Err(PoolError::AlreadyRunning);
        };

        info!("starting {worker_count} workers");
        let task_rx = Arc::new(Mutex::new(task_rx));
        for id in 0..worker_count {
            let worker = Worker {
                id,
                task_rx: Arc::clone(&task_rx),
                retry_tx: retry_tx.clone(),
                result_tx: result_tx.clone(),
                handlers: Arc::clone(&self.handlers),
                policies: Arc::clone(&self.policies),
                gauges: Arc::clone(&self.gauges),
                timeout: self.cfg.task_timeout,
            };
            self.workers.spawn(worker.run());
        }

        let dispatcher = RetryDispatcher {
            retry_rx,
            task_tx,
            policies: Arc::clone(&self.policies),
            gauges: Arc::clone(&self.gauges),
            shutdown: self.shutdown.clone(),
        };
        self.dispatcher = Some(tokio::spawn(dispatcher.run()));
        self.gauges.set_workers(worker_count);
        Ok(())
    }

    /// Enqueues a task, waiting while the task queue is full.
    ///
    /// Fails with [`PoolError::QueueClosed`] once [`WorkerPool::stop`]
    /// has closed the queue for new entries.
    pub async fn add_task(&self, task: Task) -> Result<(), PoolError> {
        let Some(tx) = self.task_tx.as_ref() else {
            return Err(PoolError::QueueClosed);
        };
        let task_id = task.id;
        tx.send(task).await.map_err(|_| PoolError::QueueClosed)?;
        self.gauges.task_enqueued();
        debug!("task {task_id} enqueued");
        Ok(())
    }

    /// Receives the next completed outcome.
    ///
    /// Returns `None` once the pool has stopped and every buffered
    /// result has been consumed.
    pub async fn recv_result(&self) -> Option<TaskResult> {
        self.result_rx.lock().await.recv().await
    }

    /// Receives up to `count` outcomes, stopping early when the result
    /// channel closes.
    pub async fn recv_results(&self, count: usize) -> Vec<TaskResult> {
        let mut results = Vec::with_capacity(count);
        let mut rx = self.result_rx.lock().await;
        for _ in 0..count {
            match rx.recv().await {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    /// Performs the ordered drain and returns once every executor and
    /// the dispatcher have exited.
    ///
    /// Call it once; a second call finds nothing running and returns
    /// immediately. Tasks sleeping out a retry delay when shutdown is
    /// signalled are dropped silently (see the module docs).
    pub async fn stop(&mut self) {
        if self.task_tx.is_none() && self.dispatcher.is_none() {
            return;
        }
        info!("stopping worker pool");

        self.shutdown.cancel();

        self.task_tx = None;
        while self.workers.join_next().await.is_some() {}

        self.retry_tx = None;
        if let Some(handle) = self.dispatcher.take() {
            let _ = handle.await;
        }

        self.gauges.set_workers(0);
        info!("worker pool stopped");
    }
}
