//! Cooperative cancellation
//!
//! A `watch` channel carrying `false` until shutdown is requested.
//! [`ShutdownTrigger`] flips it once; every [`Shutdown`] clone observes it.

use tokio::sync::watch;

/// Sending half: requests shutdown
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half: checked between retries and raced against every
/// blocking point of the engine
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger / signal pair
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        // send_replace succeeds even when every receiver is gone
        self.tx.send_replace(true);
    }

    /// Create another receiver
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

impl Shutdown {
    /// A signal that never fires
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender makes `requested` wait forever.
        drop(tx);
        Self { rx }
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested
    ///
    /// Cancel-safe. If the trigger is dropped without firing, this never
    /// resolves.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_waiters() {
        let (trigger, shutdown) = channel();
        let mut waiter = shutdown.clone();

        let handle = tokio::spawn(async move {
            waiter.requested().await;
        });

        assert!(!shutdown.is_requested());
        trigger.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .expect("task should not panic");
        assert!(shutdown.is_requested());
    }

    #[tokio::test]
    async fn requested_resolves_immediately_after_trigger() {
        let (trigger, mut shutdown) = channel();
        trigger.trigger();
        trigger.trigger(); // idempotent
        shutdown.requested().await;
    }

    #[tokio::test(start_paused = true)]
    async fn never_does_not_resolve() {
        let mut shutdown = Shutdown::never();
        let res = tokio::time::timeout(Duration::from_secs(60), shutdown.requested()).await;
        assert!(res.is_err());
        assert!(!shutdown.is_requested());
    }

    #[tokio::test]
    async fn subscribe_sees_earlier_trigger() {
        let (trigger, _shutdown) = channel();
        trigger.trigger();
        assert!(trigger.subscribe().is_requested());
    }
}
