//! Cooperative cancellation.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Marker returned by interruptible waits when the token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cancelled;

/// A one-shot cancellation flag with an interruptible sleep.
///
/// A fresh token is issued per run; `stop()` fires the previous run's
/// token without affecting later runs.
#[derive(Default)]
pub(crate) struct CancelToken {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl CancelToken {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        *self.lock() = true;
        self.condvar.notify_all();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// Sleeps for `duration`, waking early if the token fires.
    pub(crate) fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.lock();
        loop {
            if *cancelled {
                return Err(Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let (guard, _) = self
                .condvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cancelled = guard;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, bool> {
        self.cancelled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn sleep_completes_when_not_cancelled() {
        let token = CancelToken::new();
        assert_eq!(token.sleep(Duration::from_millis(1)), Ok(()));
    }

    #[test]
    fn cancel_interrupts_sleep() {
        let token = Arc::new(CancelToken::new());
        let waiter = Arc::clone(&token);
        let handle = std::thread::spawn(move || waiter.sleep(Duration::from_secs(30)));
        // Give the waiter a moment to park before firing.
        std::thread::sleep(Duration::from_millis(10));
        token.cancel();
        assert_eq!(handle.join().unwrap(), Err(Cancelled));
    }

    #[test]
    fn cancelled_token_fails_fast() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.sleep(Duration::from_secs(30)), Err(Cancelled));
    }
}
