//! # Category-keyed policy table.
//!
//! [`PolicyTable`] maps each [`TaskCategory`] to its [`RetryPolicy`]. It
//! is read on every failed attempt by the workers and once per retry by
//! the dispatcher, and written only when an operator overrides a policy.
//!
//! Synchronization: the table owns an `RwLock`; reads clone the policy
//! out so no lock is held across awaits, and [`PolicyTable::set`] is
//! last-writer-wins per category (no transactional update across
//! categories).

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::policies::RetryPolicy;
use crate::tasks::TaskCategory;

/// Shared, category-keyed retry policies.
#[derive(Debug)]
pub struct PolicyTable {
    policies: RwLock<HashMap<TaskCategory, RetryPolicy>>,
}

impl PolicyTable {
    /// Creates an empty table; every category falls back to
    /// [`RetryPolicy::default`].
    pub fn empty() -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a table seeded with per-category defaults:
    ///
    /// | category | retries | initial | max  | factor | retryable on                                  |
    /// |----------|---------|---------|------|--------|-----------------------------------------------|
    /// | email    | 5       | 2s      | 60s  | 2.0    | SMTP connect error                            |
    /// | image    | 2       | 5s      | 30s  | 1.5    | (nothing — format errors don't improve)       |
    /// | database | 4       | 1s      | 20s  | 2.5    | database connection error, task timeout       |
    /// | report   | 3       | 10s     | 120s | 2.0    | data inconsistency error                      |
    pub fn seeded() -> Self {
        let mut map = HashMap::new();
        map.insert(
            TaskCategory::Email,
            RetryPolicy {
                max_retries: 5,
                initial_delay: Duration::from_secs(2),
                max_delay: Duration::from_secs(60),
                backoff_factor: 2.0,
                retryable_errors: vec!["SMTP connect error".to_string()],
            },
        );
        map.insert(
            TaskCategory::Image,
            RetryPolicy {
                max_retries: 2,
                initial_delay: Duration::from_secs(5),
                max_delay: Duration::from_secs(30),
                backoff_factor: 1.5,
                retryable_errors: Vec::new(),
            },
        );
        map.insert(
            TaskCategory::Database,
            RetryPolicy {
                max_retries: 4,
                initial_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(20),
                backoff_factor: 2.5,
                retryable_errors: vec![
                    "database connection error".to_string(),
                    "task timeout".to_string(),
                ],
            },
        );
        map.insert(
            TaskCategory::Report,
            RetryPolicy {
                max_retries: 3,
                initial_delay: Duration::from_secs(10),
                max_delay: Duration::from_secs(120),
                backoff_factor: 2.0,
                retryable_errors: vec!["data inconsistency error".to_string()],
            },
        );
        Self {
            policies: RwLock::new(map),
        }
    }

    /// Returns the policy for a category, or [`RetryPolicy::default`]
    /// when none is registered.
    pub fn get(&self, category: TaskCategory) -> RetryPolicy {
        let map = self.policies.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&category).cloned().unwrap_or_default()
    }

    /// Replaces the policy for one category (last-writer-wins).
    pub fn set(&self, category: TaskCategory, policy: RetryPolicy) {
        let mut map = self
            .policies
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        map.insert(category, policy);
    }
}

impl Default for PolicyTable {
    /// Returns [`PolicyTable::seeded`].
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_falls_back_to_default_policy() {
        let table = PolicyTable::empty();
        assert_eq!(table.get(TaskCategory::Email), RetryPolicy::default());
    }

    #[test]
    fn seeded_table_has_per_category_entries() {
        let table = PolicyTable::seeded();
        assert_eq!(table.get(TaskCategory::Email).max_retries, 5);
        assert_eq!(table.get(TaskCategory::Image).max_retries, 2);
        assert!(table.get(TaskCategory::Image).retryable_errors.is_empty());
        assert_eq!(
            table.get(TaskCategory::Report).initial_delay,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn set_overrides_one_category_only() {
        let table = PolicyTable::seeded();
        let custom = RetryPolicy {
            max_retries: 9,
            ..RetryPolicy::default()
        };
        table.set(TaskCategory::Email, custom.clone());
        assert_eq!(table.get(TaskCategory::Email), custom);
        assert_eq!(table.get(TaskCategory::Database).max_retries, 4);
    }
}
