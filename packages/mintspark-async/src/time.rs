//! Utilities for tracking time.
//!
//! This module provides types for executing code after a set period of time.
//!
//! - [`Instant`] is a monotonic timestamp read from the executor's clock.
//! - [`Sleep`] is a future that does no work and completes at a specific [`Instant`] in time.
//! - [`sleep`] and [`sleep_until`] provide ways to yield control away from a future for or until a
//!   specific instant in time.
//!
//! # Paused clocks
//!
//! Calling [`pause`] freezes the clock of the current thread. While paused, time only moves
//! when [`advance`] is called or when the executor has nothing left to run, in which case it
//! jumps straight to the earliest sleeper's deadline. A one-minute drive then completes
//! instantly and every tick lands on an exact multiple of its period, which is what tests want.

use core::{
    fmt,
    future::Future,
    ops::{Add, AddAssign, Sub},
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use std::cell::Cell;

use crate::{executor::EXECUTOR, reactor::Sleeper};

struct Clock {
    origin: std::time::Instant,
    frozen: Cell<Option<Duration>>,
}

impl Clock {
    fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
            frozen: Cell::new(None),
        }
    }

    fn now(&self) -> Duration {
        self.frozen
            .get()
            .unwrap_or_else(|| self.origin.elapsed())
    }
}

thread_local! {
    static CLOCK: Clock = Clock::new();
}

/// A measurement of the executor's monotonically nondecreasing clock.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(Duration);

impl Instant {
    /// Returns an instant corresponding to "now".
    #[must_use]
    pub fn now() -> Self {
        Self(CLOCK.with(Clock::now))
    }

    /// Returns the amount of time elapsed from another instant to this one,
    /// or zero duration if that instant is later than this one.
    #[must_use]
    pub fn duration_since(&self, earlier: Instant) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns the amount of time elapsed since this instant.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Self::now().duration_since(*self)
    }
}

impl fmt::Debug for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instant({:?})", self.0)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    /// # Panics
    ///
    /// This function may panic if the resulting point in time cannot be represented.
    fn add(self, rhs: Duration) -> Self::Output {
        Instant(self.0 + rhs)
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Self::Output {
        self.duration_since(rhs)
    }
}

/// Freezes the clock of the current thread.
///
/// Has no effect if the clock is already paused.
pub fn pause() {
    CLOCK.with(|clock| {
        if clock.frozen.get().is_none() {
            clock.frozen.set(Some(clock.now()));
        }
    });
}

/// Returns `true` if the clock of the current thread is paused.
#[must_use]
pub fn is_paused() -> bool {
    CLOCK.with(|clock| clock.frozen.get().is_some())
}

/// Moves a paused clock forward by `duration`.
///
/// Sleepers whose deadline has passed are woken the next time the executor ticks.
///
/// # Panics
///
/// Panics if the clock is not paused.
pub fn advance(duration: Duration) {
    CLOCK.with(|clock| {
        let frozen = clock.frozen.get();
        assert!(frozen.is_some(), "time::advance requires a paused clock");
        clock.frozen.set(frozen.map(|now| now + duration));
    });
}

/// Moves a paused clock to `deadline` if it lies in the future.
pub(crate) fn advance_to(deadline: Instant) {
    CLOCK.with(|clock| {
        if let Some(now) = clock.frozen.get() {
            clock.frozen.set(Some(now.max(deadline.0)));
        }
    });
}

/// A future that will complete after a certain instant is reached in time.
///
/// This type is returned by the [`sleep`] and [`sleep_until`] functions.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Sleep {
    deadline: Instant,
    registered: bool,
}

impl Sleep {
    /// Returns the instant at which this future completes.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if Instant::now() >= self.deadline {
            return Poll::Ready(());
        } else if !self.registered {
            EXECUTOR.with(|executor| {
                executor.with_reactor(|reactor| {
                    reactor.push(Sleeper {
                        deadline: self.deadline,
                        waker: cx.waker().clone(),
                    });
                });
            });

            self.registered = true;
        }

        Poll::Pending
    }
}

/// Waits until `duration` has elapsed.
///
/// This function returns a future that will complete after the given duration, effectively yielding
/// the current task for a period of time.
///
/// Equivalent to `sleep_until(Instant::now() + duration)`.
///
/// # Examples
///
/// ```
/// use core::time::Duration;
///
/// use mintspark_async::{block_on, time::{self, sleep, Instant}};
///
/// time::pause();
/// let start = Instant::now();
/// block_on(sleep(Duration::from_secs(300)));
/// assert_eq!(start.elapsed(), Duration::from_secs(300));
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep {
        deadline: Instant::now() + duration,
        registered: false,
    }
}

/// Waits until `deadline` is reached.
///
/// This function returns a future that will complete once a given `Instant` in time has been
/// reached.
pub const fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        registered: false,
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{block_on, spawn};

    #[test]
    fn paused_clock_only_moves_when_advanced() {
        pause();
        let start = Instant::now();
        assert_eq!(start.elapsed(), Duration::ZERO);

        advance(Duration::from_millis(250));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn paused_executor_jumps_to_deadlines() {
        pause();
        let start = Instant::now();

        block_on(sleep(Duration::from_secs(60)));

        assert_eq!(start.elapsed(), Duration::from_secs(60));
    }

    #[test]
    fn sleepers_wake_in_deadline_order() {
        pause();
        let order = Rc::new(RefCell::new(Vec::new()));

        block_on({
            let order = order.clone();
            async move {
                let slow = spawn({
                    let order = order.clone();
                    async move {
                        sleep(Duration::from_millis(30)).await;
                        order.borrow_mut().push(30);
                    }
                });
                let fast = spawn({
                    let order = order.clone();
                    async move {
                        sleep(Duration::from_millis(10)).await;
                        order.borrow_mut().push(10);
                    }
                });

                fast.await;
                slow.await;
            }
        });

        assert_eq!(*order.borrow(), vec![10, 30]);
    }

    #[test]
    fn equal_deadlines_all_wake() {
        pause();
        let deadline = Instant::now() + Duration::from_millis(50);

        let finished = block_on(async move {
            let a = spawn(sleep_until(deadline));
            let b = spawn(sleep_until(deadline));
            a.await;
            b.await;
            Instant::now()
        });

        assert_eq!(finished, deadline);
    }
}
