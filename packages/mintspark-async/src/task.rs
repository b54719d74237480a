//! Asynchronous tasks.

use core::future::Future;

use crate::executor::EXECUTOR;

/// A spawned task.
///
/// A [`Task`] can be awaited to retrieve the output of its future.
///
/// Dropping a [`Task`] cancels it, which means its future won't be polled again. To drop the
/// [`Task`] handle without canceling it, use [`detach()`][`Task::detach()`] instead. To cancel a
/// task gracefully and wait until it is fully destroyed, use the [`cancel()`][Task::cancel()]
/// method.
///
/// # Examples
///
/// ```
/// use mintspark_async::{block_on, spawn};
///
/// let sum = block_on(async {
///     // Spawn a future onto the executor.
///     let task = spawn(async { 1 + 2 });
///
///     // Wait for the task's output.
///     task.await
/// });
/// assert_eq!(sum, 3);
/// ```
pub type Task<T> = async_task::Task<T>;

/// Spawns a new async task that can be controlled with the returned task handle.
pub fn spawn<T: 'static>(future: impl Future<Output = T> + 'static) -> Task<T> {
    EXECUTOR.with(|executor| executor.spawn(future))
}
