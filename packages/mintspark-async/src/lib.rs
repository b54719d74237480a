//! Tiny async runtime for `mintspark`.
//!
//! The async executor supports spawning tasks and blocking on futures.
//! It has a reactor that wakes sleeping tasks once their deadline passes.
//!
//! Everything runs on the thread that calls [`block_on`]. Tasks only give up
//! control at `.await` points, so a control loop must [`sleep`](time::sleep)
//! between ticks for other tasks to make progress.

mod executor;
mod reactor;

pub mod task;
pub mod time;

use core::future::Future;

use executor::EXECUTOR;
pub use task::spawn;

/// Blocks the current thread until a return value can be extracted from the provided future.
///
/// Tasks spawned while the future runs are polled alongside it. Tasks that are still
/// pending when the future resolves stay queued for the next call to `block_on`.
///
/// Must not be called from inside a task.
pub fn block_on<F>(future: F) -> F::Output
where
    F: Future + 'static,
    F::Output: 'static,
{
    let task = spawn(future);
    EXECUTOR.with(|executor| executor.block_on(task))
}
