//! Outcome emitted for a task attempt.
//!
//! A [`TaskResult`] is created once per terminal outcome — success,
//! exhausted or denied retries, or a drop caused by a saturated retry
//! queue — and is immutable afterwards. The `is_final` flag stays `false`
//! only for saturation drops, mirroring how the engine distinguishes
//! "ran out of attempts" from "ran out of buffer".

use std::time::{Duration, SystemTime};

use crate::error::TaskError;
use crate::tasks::TaskCategory;

/// Completed outcome of a task, consumed from the result channel.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Identifier of the originating task.
    pub task_id: u64,
    /// Display name of the originating task.
    pub task_name: String,
    /// Category of the originating task.
    pub category: TaskCategory,
    /// Whether the final attempt succeeded.
    pub success: bool,
    /// Failure detail when `success` is false.
    pub error: Option<TaskError>,
    /// Duration of the final attempt only.
    pub duration: Duration,
    /// Cumulative duration since the first attempt, including backoff.
    pub total_duration: Duration,
    /// Identity of the worker that executed the final attempt.
    pub worker_id: usize,
    /// Wall-clock time of the first attempt.
    pub started_at: SystemTime,
    /// Wall-clock time the final attempt finished.
    pub finished_at: SystemTime,
    /// Total number of handler invocations for this task.
    pub attempt_count: u32,
    /// `false` only when the task was dropped because the retry queue
    /// was full; `true` for every other terminal outcome.
    pub is_final: bool,
}

impl TaskResult {
    /// Returns true when the task needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempt_count > 1
    }

    /// Returns true when the final failure was a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(TaskError::is_timeout)
    }

    /// Returns the stable label of the failure, if any.
    pub fn error_label(&self) -> Option<&'static str> {
        self.error.as_ref().map(TaskError::as_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(attempts: u32, error: Option<TaskError>) -> TaskResult {
        let now = SystemTime::now();
        TaskResult {
            task_id: 1,
            task_name: "t".into(),
            category: TaskCategory::Email,
            success: error.is_none(),
            error,
            duration: Duration::from_millis(5),
            total_duration: Duration::from_millis(5),
            worker_id: 0,
            started_at: now,
            finished_at: now,
            attempt_count: attempts,
            is_final: true,
        }
    }

    #[test]
    fn was_retried_needs_more_than_one_attempt() {
        assert!(!result(1, None).was_retried());
        assert!(result(2, None).was_retried());
    }

    #[test]
    fn timeout_detection_and_label() {
        let timed_out = result(
            1,
            Some(TaskError::Timeout {
                timeout: Duration::from_secs(1),
            }),
        );
        assert!(timed_out.is_timeout());
        assert_eq!(timed_out.error_label(), Some("task_timeout"));

        let failed = result(1, Some(TaskError::handler("boom")));
        assert!(!failed.is_timeout());
        assert_eq!(failed.error_label(), Some("handler_failure"));

        assert_eq!(result(1, None).error_label(), None);
    }
}
