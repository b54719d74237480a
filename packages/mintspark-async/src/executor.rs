use std::{
    cell::RefCell,
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    task::{Context, Poll},
};

use async_task::Runnable;
use waker_fn::waker_fn;

use crate::{
    reactor::Reactor,
    task::Task,
    time::{self, Instant},
};

thread_local! {
    pub(crate) static EXECUTOR: Executor = const { Executor::new() };
}

pub(crate) struct Executor {
    queue: RefCell<VecDeque<Runnable>>,
    reactor: RefCell<Reactor>,
}

impl Executor {
    pub const fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            reactor: RefCell::new(Reactor::new()),
        }
    }

    pub fn spawn<T: 'static>(&self, future: impl Future<Output = T> + 'static) -> Task<T> {
        // Runnables are only ever pushed onto the queue of the thread that spawned them.
        let (runnable, task) = async_task::spawn_local(future, |runnable| {
            EXECUTOR.with(|executor| executor.queue.borrow_mut().push_back(runnable));
        });

        runnable.schedule();

        task
    }

    /// Run the provided closure with the reactor.
    pub(crate) fn with_reactor<R>(&self, f: impl FnOnce(&mut Reactor) -> R) -> R {
        f(&mut self.reactor.borrow_mut())
    }

    /// Wakes due sleepers and runs at most one task. Returns `true` if a task ran.
    pub(crate) fn tick(&self) -> bool {
        self.reactor.borrow_mut().wake_due(Instant::now());

        let runnable = self.queue.borrow_mut().pop_front();

        if let Some(runnable) = runnable {
            runnable.run();
            true
        } else {
            false
        }
    }

    /// Waits for the next sleeper deadline when there is nothing to run.
    ///
    /// With a paused clock the wait is skipped and time jumps straight to the deadline.
    fn park(&self) {
        let Some(deadline) = self.reactor.borrow().next_deadline() else {
            std::thread::yield_now();
            return;
        };

        let now = Instant::now();
        if deadline <= now {
            return;
        }

        if time::is_paused() {
            time::advance_to(deadline);
        } else {
            std::thread::sleep(deadline - now);
        }
    }

    pub fn block_on<R>(&self, mut task: Task<R>) -> R {
        let woken = Arc::new(AtomicBool::new(true));

        let waker = waker_fn({
            let woken = woken.clone();
            move || woken.store(true, Ordering::Relaxed)
        });
        let mut cx = Context::from_waker(&waker);

        loop {
            if woken.swap(false, Ordering::Relaxed) {
                if let Poll::Ready(output) = Pin::new(&mut task).poll(&mut cx) {
                    return output;
                }
            }

            if !self.tick() && !woken.load(Ordering::Relaxed) {
                self.park();
            }
        }
    }
}
