//! # Handler abstraction and function-backed implementation.
//!
//! This module defines the [`Handler`] trait (async, cancelable) and a
//! convenient closure-backed implementation [`HandlerFn`]. The common
//! handle type is [`HandlerRef`], an `Arc<dyn Handler>` registered on the
//! pool per [`TaskCategory`](crate::TaskCategory).
//!
//! A handler receives a [`CancellationToken`] that is cancelled when the
//! attempt deadline expires; it should check the token and exit promptly.
//! Retries re-invoke the handler with the same payload and an incremented
//! attempt count, so handlers must be idempotent-safe for the same
//! logical task.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::Task;

/// Shared handle to a registered handler.
pub type HandlerRef = Arc<dyn Handler>;

/// # Caller-supplied execution body for one task category.
///
/// Implementors should regularly check `ctx.is_cancelled()` and exit
/// quickly once the deadline has passed; the engine stops waiting at the
/// deadline regardless, but it never forcibly terminates handler work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use taskpool::{Handler, Task, TaskError};
///
/// struct Mailer;
///
/// #[async_trait]
/// impl Handler for Mailer {
///     async fn run(&self, task: &Task, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::handler("canceled before send"));
///         }
///         // send mail for task.payload()...
///         let _ = task;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Executes one attempt of the given task.
    ///
    /// Returning `Err` with a description that prefix-matches one of the
    /// category's retryable signatures makes the attempt eligible for
    /// retry; any other `Err` is terminal.
    async fn run(&self, task: &Task, ctx: CancellationToken) -> Result<(), TaskError>;
}

/// Function-backed handler implementation.
///
/// Wraps a closure that creates a fresh future per attempt. The closure
/// receives its own clone of the task, so no hidden state is shared
/// between attempts; share state explicitly with `Arc` if needed.
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// # Example
    /// ```
    /// use tokio_util::sync::CancellationToken;
    /// use taskpool::{HandlerFn, HandlerRef, Task, TaskError};
    ///
    /// let h: HandlerRef = HandlerFn::arc(|_task: Task, _ctx: CancellationToken| async {
    ///     Ok::<_, TaskError>(())
    /// });
    /// # let _ = h;
    /// ```
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Task, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run(&self, task: &Task, ctx: CancellationToken) -> Result<(), TaskError> {
        (self.f)(task.clone(), ctx).await
    }
}
