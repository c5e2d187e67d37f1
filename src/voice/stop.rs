//! Stop requests that late waiters still observe

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;

/// Counts stop requests
///
/// A waiter remembers the generation it started at and resolves once any
/// stop has been requested since, even if that stop happened before it was
/// first polled.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    generation: AtomicU64,
    notify: Notify,
}

impl StopSignal {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current generation, to pass to `stopped_since`
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Request a stop, waking every waiter
    pub(crate) fn trigger(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Resolve once a stop was requested after `generation`
    pub(crate) async fn stopped_since(&self, generation: u64) {
        loop {
            // Registered before the check, so a trigger in between is not lost
            let notified = self.notify.notified();
            if self.generation() != generation {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_stop_before_wait_is_observed() {
        let signal = StopSignal::new();
        let since = signal.generation();
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), signal.stopped_since(since))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_wakes_waiter() {
        let signal = Arc::new(StopSignal::new());
        let since = signal.generation();
        let waiter = tokio::spawn({
            let signal = Arc::clone(&signal);
            async move { signal.stopped_since(since).await }
        });

        tokio::task::yield_now().await;
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_waiter_after_stop_keeps_waiting() {
        let signal = StopSignal::new();
        signal.trigger();
        let since = signal.generation();

        let waited =
            tokio::time::timeout(Duration::from_millis(20), signal.stopped_since(since)).await;
        assert!(waited.is_err());
    }
}
