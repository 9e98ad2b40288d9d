//! Retry policies and the per-category policy table.
//!
//! This module groups the knobs that control **if** a failed task is
//! retried and **how long** to wait before re-queueing it.
//!
//! ## Contents
//! - [`RetryPolicy`] limits, delay schedule, and retryable signatures
//! - [`PolicyTable`] category-keyed policies with seeded defaults
//!
//! ## Quick wiring
//! ```text
//! worker ──failure──► PolicyTable::get(category) ─► should_retry()?
//!                                                     │ yes ─► retry queue
//! dispatcher ──pop──► calculate_retry_delay(attempt) ─► sleep ─► task queue
//! ```

mod retry;
mod table;

pub use retry::RetryPolicy;
pub use table::PolicyTable;
