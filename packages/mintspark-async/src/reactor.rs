use std::task::Waker;

use crate::time::Instant;

pub(crate) struct Sleeper {
    pub deadline: Instant,
    pub waker: Waker,
}

pub(crate) struct Reactor {
    sleepers: Vec<Sleeper>,
}

impl Reactor {
    pub const fn new() -> Self {
        Self {
            sleepers: Vec::new(),
        }
    }

    pub fn push(&mut self, sleeper: Sleeper) {
        self.sleepers.push(sleeper);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sleepers.iter().map(|sleeper| sleeper.deadline).min()
    }

    /// Wakes every sleeper whose deadline is at or before `now`.
    pub fn wake_due(&mut self, now: Instant) {
        let mut index = 0;
        while index < self.sleepers.len() {
            if self.sleepers[index].deadline <= now {
                self.sleepers.swap_remove(index).waker.wake();
            } else {
                index += 1;
            }
        }
    }
}
