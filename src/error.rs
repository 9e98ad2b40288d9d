//! Error types used by the pool runtime and task execution.
//!
//! This module defines two error enums:
//!
//! - [`PoolError`] — errors raised at the engine boundary (misuse of the
//!   pool lifecycle, submitting work after shutdown).
//! - [`TaskError`] — failures observed while executing a single task.
//!
//! A [`TaskError`] is always carried as data on a
//! [`TaskResult`](crate::TaskResult); a failing task never takes down its
//! worker. Retry classification happens on the error's rendered
//! description (see [`RetryPolicy::should_retry`](crate::RetryPolicy::should_retry)),
//! so handlers should keep failure messages stable and prefix-friendly.

use std::time::Duration;
use thiserror::Error;

use crate::tasks::TaskCategory;

/// # Errors produced at the worker pool boundary.
///
/// These represent lifecycle misuse, not task failures.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The task queue has been closed for new entries (shutdown has begun).
    #[error("task queue is closed")]
    QueueClosed,

    /// `start` was called on a pool whose executors are already running.
    #[error("worker pool is already running")]
    AlreadyRunning,
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::QueueClosed => "queue_closed",
            PoolError::AlreadyRunning => "already_running",
        }
    }
}

/// # Failures observed while executing a task.
///
/// Whether a failure is retried is decided by the category's
/// [`RetryPolicy`](crate::RetryPolicy), which prefix-matches the rendered
/// description — except [`TaskError::UnregisteredCategory`], which is
/// always terminal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// No handler is bound for the task's category. Never retried.
    #[error("no handler registered for category {category}")]
    UnregisteredCategory {
        /// The category that had no registered handler.
        category: TaskCategory,
    },

    /// The handler exceeded the configured task timeout.
    ///
    /// Renders as `task timeout after ...`, so a policy listing the
    /// `"task timeout"` signature treats deadline expiry as retryable.
    #[error("task timeout after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// Domain failure reported by the handler itself.
    #[error("{message}")]
    Handler {
        /// Human-readable failure description (used for retry matching).
        message: String,
    },

    /// The retry queue was full; the task degraded to a terminal failure
    /// instead of blocking its worker.
    #[error("retry queue saturated: {cause}")]
    QueueSaturated {
        /// Description of the failure that triggered the retry attempt.
        cause: String,
    },
}

impl TaskError {
    /// Creates a handler failure with the given description.
    ///
    /// # Example
    /// ```
    /// use taskpool::TaskError;
    ///
    /// let err = TaskError::handler("SMTP connect error: refused");
    /// assert_eq!(err.to_string(), "SMTP connect error: refused");
    /// ```
    pub fn handler(message: impl Into<String>) -> Self {
        TaskError::Handler {
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use taskpool::TaskError;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::UnregisteredCategory { .. } => "unregistered_category",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Handler { .. } => "handler_failure",
            TaskError::QueueSaturated { .. } => "queue_saturated",
        }
    }

    /// Indicates whether this failure exceeded the attempt deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}
