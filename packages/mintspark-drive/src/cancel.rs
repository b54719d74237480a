//! Cooperative cancellation.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A flag shared between a controller and the one control loop it started.
///
/// Clones observe the same flag. Each command gets a fresh token, so cancelling one command
/// can never leak into the next.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the loop holding this token to stop at its next tick.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let loop_side = token.clone();
        assert!(!loop_side.is_cancelled());

        token.cancel();
        assert!(loop_side.is_cancelled());
    }

    #[test]
    fn fresh_tokens_start_clear() {
        let first = CancelToken::new();
        first.cancel();

        assert!(!CancelToken::new().is_cancelled());
    }
}
