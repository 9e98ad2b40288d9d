//! Task data model and the handler seam.
//!
//! Contents:
//! - [`TaskCategory`] closed classification used to key handlers and policies;
//! - [`Task`] the unit of work flowing through the queues;
//! - [`Handler`] / [`HandlerFn`] caller-supplied execution bodies;
//! - [`TaskResult`] the outcome emitted for each terminal attempt.

mod category;
mod handler;
mod result;
mod task;

pub use category::TaskCategory;
pub use handler::{Handler, HandlerFn, HandlerRef};
pub use result::TaskResult;
pub use task::Task;
