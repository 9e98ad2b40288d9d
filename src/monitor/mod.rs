//! Statistics aggregation: live totals, latency extremes, and
//! per-category breakdowns.
//!
//! - `stats`: the [`PoolStats`] / [`CategoryStats`] fold;
//! - `monitor`: the [`Monitor`] loop that owns the fold, drains a
//!   bounded update inlet, and samples the engine gauges on a tick.

mod monitor;
mod stats;

pub use monitor::Monitor;
pub use stats::{CategoryStats, PoolStats};
