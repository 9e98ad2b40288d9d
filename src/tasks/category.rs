//! Closed set of task classifications.
//!
//! The category determines which [`Handler`](crate::Handler) executes a
//! task and which [`RetryPolicy`](crate::RetryPolicy) governs its
//! failures. Unregistered categories are rejected explicitly at execution
//! time, never silently defaulted.

use std::fmt;

/// Classification of a task, keying both handlers and retry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    /// Outbound mail delivery.
    Email,
    /// Image conversion and resizing.
    Image,
    /// Database maintenance work.
    Database,
    /// Report generation.
    Report,
}

impl TaskCategory {
    /// All categories, in declaration order.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Email,
        TaskCategory::Image,
        TaskCategory::Database,
        TaskCategory::Report,
    ];

    /// Returns the stable lowercase name used in logs and stats output.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Email => "email",
            TaskCategory::Image => "image",
            TaskCategory::Database => "database",
            TaskCategory::Report => "report",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        for cat in TaskCategory::ALL {
            assert_eq!(cat.to_string(), cat.as_str());
        }
    }

    #[test]
    fn all_contains_each_variant_once() {
        assert_eq!(TaskCategory::ALL.len(), 4);
        for cat in TaskCategory::ALL {
            assert_eq!(TaskCategory::ALL.iter().filter(|c| **c == cat).count(), 1);
        }
    }
}
