//! Single-shot cancelable delayed execution.
//!
//! Used to tolerate brief region-boundary flicker: a floor-plan exit arms a
//! timer instead of acting immediately, and a qualifying re-entry cancels
//! it before it fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A single-shot timer scoped to one pending delayed action.
///
/// [`arm`](DebounceTimer::arm) schedules a callback to run once after the
/// delay unless [`cancel`](DebounceTimer::cancel) is invoked first. Arming
/// while already armed cancels the previous schedule, so at most one
/// callback is pending at any time. Firing and cancellation are mutually
/// exclusive: the underlying `select!` resolves exactly one of the two.
///
/// The callback runs on a spawned task. Callers that need the action on a
/// specific sequencing context should make the callback enqueue a message
/// there rather than perform the action directly.
#[derive(Debug, Default)]
pub struct DebounceTimer {
    pending: Option<CancellationToken>,
}

impl DebounceTimer {
    /// Create a timer with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `callback` to run once after `delay`.
    ///
    /// Cancels any previously armed schedule first.
    pub fn arm<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let canceled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = canceled.cancelled() => {}
                _ = tokio::time::sleep(delay) => callback(),
            }
        });
        self.pending = Some(token);
    }

    /// Cancel the pending schedule, if any. A canceled timer never fires.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
