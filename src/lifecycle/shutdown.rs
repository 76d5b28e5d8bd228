//! Shutdown coordination for a batch.

use tokio::sync::watch;

/// Coordinator for operator-initiated shutdown.
///
/// Hands out [`Cancellation`] handles that every polling wait checks.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A handle observing this coordinator.
    pub fn cancellation(&self) -> Cancellation {
        Cancellation {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of [`Shutdown`].
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// A handle that is never cancelled.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Keep the value readable after the sender is gone.
        drop(tx);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is triggered. Pends forever if the coordinator
    /// is dropped without triggering.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_handles() {
        let shutdown = Shutdown::new();
        let handle = shutdown.cancellation();
        assert!(!handle.is_cancelled());

        shutdown.trigger();
        assert!(handle.is_cancelled());
        handle.cancelled().await;
    }

    #[tokio::test]
    async fn test_handle_created_after_trigger_is_cancelled() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();
        assert!(shutdown.is_triggered());
        assert!(shutdown.cancellation().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_pends() {
        let handle = Cancellation::never();
        let waited = tokio::time::timeout(Duration::from_secs(60), handle.cancelled()).await;
        assert!(waited.is_err());
        assert!(!handle.is_cancelled());
    }
}
