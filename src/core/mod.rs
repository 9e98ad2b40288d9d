//! Engine core: queues, workers, retry dispatch, and lifecycle.
//!
//! The only public API from this module is [`WorkerPool`] plus its
//! configuration and gauges. Internal modules:
//! - `worker`: the executor loop (dequeue, deadline, classify, route);
//! - `dispatcher`: the sequential retry-dispatch loop;
//! - `pool`: wiring, lifecycle, and the ordered shutdown drain;
//! - `config` / `gauges`: knobs and depth probes.

mod config;
mod dispatcher;
mod gauges;
mod pool;
mod worker;

pub use config::PoolConfig;
pub use gauges::PoolGauges;
pub use pool::WorkerPool;
