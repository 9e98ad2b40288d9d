//! # taskpool
//!
//! **Taskpool** is a bounded, multi-worker task execution engine for Rust.
//!
//! Tasks are classified into categories; each category has its own
//! handler and retry policy. Every buffer is bounded, so producers feel
//! backpressure instead of growing unbounded queues, and a monitor folds
//! completed results into live statistics.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                 add_task()                     recv_result()
//!                     │                                ▲
//!                     ▼                                │
//!            ┌─────────────────┐             ┌─────────────────┐
//!            │   task queue    │             │ result channel  │
//!            │   (bounded)     │             │   (bounded)     │
//!            └───┬────┬────┬───┘             └───▲────▲────▲───┘
//!                ▼    ▼    ▼                     │    │    │
//!            ┌────────────────────────────────────────────────┐
//!            │  Worker 0..N (shared dequeue, per-attempt       │
//!            │  deadline, outcome classification)              │
//!            └───────────────────────┬────────────────────────┘
//!                                    │ retryable failure
//!                                    ▼ (try_send; full = fail)
//!                          ┌─────────────────┐
//!                          │   retry queue   │
//!                          │   (bounded)     │
//!                          └────────┬────────┘
//!                                   ▼
//!                          ┌─────────────────┐
//!                          │ RetryDispatcher │──sleep(backoff)──► task queue
//!                          └─────────────────┘
//!
//!            ┌─────────────────┐        ┌─────────────────┐
//!            │   PoolGauges    │──tick──│     Monitor     │◄── on_task_result()
//!            │ (atomic depths) │        │  (PoolStats)    │
//!            └─────────────────┘        └─────────────────┘
//! ```
//!
//! ### Task lifecycle
//! ```text
//! Task ──► task queue ──► worker attempt
//!   │
//!   ├─ Ok ────────────────► TaskResult { success, is_final: true }
//!   │
//!   └─ Err ─► should_retry(error, attempts)?
//!        ├─ no ──────────► TaskResult { error, is_final: true }
//!        └─ yes ─► retry queue
//!             ├─ accepted ─► dispatcher: sleep(delay(attempt)) ─► task queue
//!             └─ full ─────► TaskResult { QueueSaturated, is_final: false }
//! ```
//!
//! ## Features
//! | Area           | Description                                              | Key types                              |
//! |----------------|----------------------------------------------------------|----------------------------------------|
//! | **Engine**     | Bounded queues, worker lifecycle, ordered shutdown.      | [`WorkerPool`], [`PoolConfig`]         |
//! | **Tasks**      | Categorized units of work with opaque payloads.          | [`Task`], [`TaskCategory`]             |
//! | **Handlers**   | Async execution bodies, trait or closure backed.         | [`Handler`], [`HandlerFn`]             |
//! | **Retries**    | Per-category limits, backoff, and error signatures.      | [`RetryPolicy`], [`PolicyTable`]       |
//! | **Results**    | Terminal outcome per task with attempt accounting.       | [`TaskResult`]                         |
//! | **Statistics** | Live totals, latency extremes, per-category breakdowns.  | [`Monitor`], [`PoolStats`]             |
//! | **Errors**     | Typed errors for the engine boundary and task failures.  | [`PoolError`], [`TaskError`]           |
//!
//! ## Example
//! ```rust
//! use taskpool::{HandlerFn, PoolConfig, Task, TaskCategory, WorkerPool};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pool = WorkerPool::new(PoolConfig::default());
//!
//!     pool.register_handler(
//!         TaskCategory::Email,
//!         HandlerFn::arc(|task: Task, _ctx: CancellationToken| async move {
//!             println!("sending {}", task.name);
//!             Ok(())
//!         }),
//!     );
//!     pool.start(2)?;
//!
//!     pool.add_task(Task::new(1, "welcome-mail", TaskCategory::Email)).await?;
//!     if let Some(result) = pool.recv_result().await {
//!         println!("task {} done in {:?}", result.task_id, result.duration);
//!     }
//!
//!     pool.stop().await;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod monitor;
mod policies;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{PoolConfig, PoolGauges, WorkerPool};
pub use crate::error::{PoolError, TaskError};
pub use crate::monitor::{CategoryStats, Monitor, PoolStats};
pub use crate::policies::{PolicyTable, RetryPolicy};
pub use crate::tasks::{Handler, HandlerFn, HandlerRef, Task, TaskCategory, TaskResult};
