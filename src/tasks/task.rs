//! # Unit of work flowing through the pool.
//!
//! A [`Task`] is owned exclusively by whichever queue or worker currently
//! holds it; ownership transfers queue-to-worker-to-queue and is never
//! shared between executors. The engine stamps the first-attempt
//! timestamps exactly once and advances the attempt counter on each
//! retry; callers only provide identity, category, and payload.
//!
//! The payload is opaque to the engine. It is stored as
//! `Arc<dyn Any + Send + Sync>` and handlers downcast it back with
//! [`Task::payload`]:
//!
//! ```rust
//! use taskpool::{Task, TaskCategory};
//!
//! let task = Task::new(7, "welcome-mail", TaskCategory::Email)
//!     .with_payload(String::from("user@example.com"));
//!
//! assert_eq!(task.payload::<String>().map(String::as_str), Some("user@example.com"));
//! assert!(task.payload::<u64>().is_none());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::error::TaskError;
use crate::tasks::TaskCategory;

/// A unit of work submitted to the pool.
#[derive(Clone)]
pub struct Task {
    /// Caller-assigned unique identifier.
    pub id: u64,
    /// Display name for logs and results.
    pub name: String,
    /// Category selecting the handler and retry policy.
    pub category: TaskCategory,

    payload: Option<Arc<dyn Any + Send + Sync>>,
    created_at: SystemTime,

    /// Number of retries performed so far (0 on first submission).
    pub(crate) attempt_count: u32,
    /// Failure recorded by the most recent attempt, if any.
    pub(crate) last_error: Option<TaskError>,
    /// Monotonic instant of the first attempt; set once, never overwritten.
    pub(crate) first_attempt: Option<Instant>,
    /// Wall-clock counterpart of `first_attempt`, for result reporting.
    pub(crate) started_at: Option<SystemTime>,
}

impl Task {
    /// Creates a new task with no payload.
    pub fn new(id: u64, name: impl Into<String>, category: TaskCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            payload: None,
            created_at: SystemTime::now(),
            attempt_count: 0,
            last_error: None,
            first_attempt: None,
            started_at: None,
        }
    }

    /// Attaches an opaque payload, replacing any previous one.
    pub fn with_payload<P: Any + Send + Sync>(mut self, payload: P) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Downcasts the payload to `P`, if one of that type is attached.
    pub fn payload<P: Any + Send + Sync>(&self) -> Option<&P> {
        self.payload.as_deref().and_then(|p| p.downcast_ref())
    }

    /// Returns how many retries this task has gone through so far.
    ///
    /// The value is 0 while the first attempt runs and increments each
    /// time the task is routed to the retry queue.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Returns the failure recorded by the most recent attempt.
    pub fn last_error(&self) -> Option<&TaskError> {
        self.last_error.as_ref()
    }

    /// Returns the wall-clock creation time of the task.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("attempt_count", &self.attempt_count)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_untouched() {
        let task = Task::new(1, "t", TaskCategory::Image);
        assert_eq!(task.attempt_count(), 0);
        assert!(task.last_error().is_none());
        assert!(task.first_attempt.is_none());
        assert!(task.payload::<String>().is_none());
    }

    #[test]
    fn payload_downcast_is_typed() {
        let task = Task::new(2, "t", TaskCategory::Report).with_payload(42u32);
        assert_eq!(task.payload::<u32>(), Some(&42));
        assert!(task.payload::<i32>().is_none());
    }
}
