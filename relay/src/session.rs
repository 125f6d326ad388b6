//! Stream session - one subscription attempt
//!
//! A session opens one subscription, forwards every raw event to a handler,
//! and reports how the attempt ended. It never filters or deduplicates.
//!
//! # State Machine
//!
//! ```text
//! [Opening]   ──open ok──────────► [Receiving]
//! [Opening]   ──open fails───────► [Failed(received_any = false)]
//! [Receiving] ──event────────────► [Receiving]          (received_any = true, then handler)
//! [Receiving] ──receive fails────► [Failed(received_any = accumulated)]
//! [any]       ──shutdown─────────► [Stopped]            (terminal, not an error)
//! ```
//!
//! The session is consumed by [`StreamSession::run`], so per-attempt state
//! cannot leak into the next attempt.

use crate::feed::{FeedError, FeedFilter, Subscriber};
use crate::metrics::Metrics;
use crate::retry::AttemptOutcome;
use crate::shutdown::Shutdown;
use async_trait::async_trait;
use disaster_relay_core::Event;
use tracing::{debug, info};

/// Receives every event a session reads, in arrival order
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one raw event
    async fn handle(&self, event: Event);
}

/// How a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// Shutdown was requested
    Stopped,
    /// The attempt failed
    Failed(AttemptFailure),
}

/// A failed attempt and what it achieved before failing
#[derive(Debug)]
pub struct AttemptFailure {
    /// Whether at least one event arrived on this attempt
    pub received_any: bool,
    /// Number of events that arrived
    pub received: u64,
    /// Why it failed
    pub error: FeedError,
}

impl AttemptFailure {
    /// Classify for the reconnect policy
    pub fn outcome(&self) -> AttemptOutcome {
        AttemptOutcome::from_received_any(self.received_any)
    }
}

/// One subscription attempt
pub struct StreamSession<'a> {
    subscriber: &'a dyn Subscriber,
    filter: FeedFilter,
    shutdown: Shutdown,
    received_any: bool,
    received: u64,
}

impl<'a> StreamSession<'a> {
    /// Prepare an attempt; nothing is opened until [`run`](Self::run)
    pub fn new(subscriber: &'a dyn Subscriber, filter: FeedFilter, shutdown: Shutdown) -> Self {
        Self {
            subscriber,
            filter,
            shutdown,
            received_any: false,
            received: 0,
        }
    }

    /// Open the subscription and pump events into `handler` until the
    /// attempt fails or shutdown is requested
    pub async fn run(mut self, handler: &dyn EventHandler) -> SessionEnd {
        let opened = tokio::select! {
            biased;
            _ = self.shutdown.requested() => return SessionEnd::Stopped,
            opened = self.subscriber.subscribe(&self.filter) => opened,
        };

        let mut subscription = match opened {
            Ok(subscription) => subscription,
            Err(error) => {
                return SessionEnd::Failed(AttemptFailure {
                    received_any: false,
                    received: 0,
                    error,
                });
            }
        };

        info!(
            subscriber = self.subscriber.name(),
            category = ?self.filter.category,
            "stream connected"
        );
        if let Some(m) = Metrics::get() {
            m.set_stream_connected(true);
        }

        let end = loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.requested() => break SessionEnd::Stopped,
                next = subscription.next_event() => next,
            };

            match next {
                Ok(event) => {
                    if !self.received_any {
                        if let Some(m) = Metrics::get() {
                            m.reset_consecutive_failures();
                        }
                    }
                    // Set before the handler runs
                    self.received_any = true;
                    self.received += 1;
                    debug!(id = %event.id, category = %event.category, "event received");
                    handler.handle(event).await;
                }
                Err(error) => {
                    break SessionEnd::Failed(AttemptFailure {
                        received_any: self.received_any,
                        received: self.received,
                        error,
                    });
                }
            }
        };

        if let Some(m) = Metrics::get() {
            m.set_stream_connected(false);
        }
        end
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::feed::Subscription;
    use disaster_relay_core::Category;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Subscription replaying a fixed script, then a final result
    struct Scripted {
        events: VecDeque<Event>,
        hang_at_end: bool,
    }

    #[async_trait]
    impl Subscription for Scripted {
        async fn next_event(&mut self) -> Result<Event, FeedError> {
            match self.events.pop_front() {
                Some(e) => Ok(e),
                None if self.hang_at_end => std::future::pending().await,
                None => Err(FeedError::Ended),
            }
        }
    }

    enum Open {
        Fail,
        Hang,
        Events(Vec<Event>, bool),
    }

    struct OneShot(Mutex<Option<Open>>);

    #[async_trait]
    impl Subscriber for OneShot {
        fn name(&self) -> &'static str {
            "one-shot"
        }

        async fn subscribe(
            &self,
            _filter: &FeedFilter,
        ) -> Result<Box<dyn crate::feed::Subscription>, FeedError> {
            let script = self.0.lock().take().expect("subscribed once");
            match script {
                Open::Fail => Err(FeedError::Connect("refused".into())),
                Open::Hang => std::future::pending().await,
                Open::Events(events, hang_at_end) => Ok(Box::new(Scripted {
                    events: events.into(),
                    hang_at_end,
                })),
            }
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    #[async_trait]
    impl EventHandler for Collect {
        async fn handle(&self, event: Event) {
            self.0.lock().push(event.id);
        }
    }

    fn events(n: usize) -> Vec<Event> {
        (0..n)
            .map(|i| Event::new(format!("evt-{i}"), Category::Flood))
            .collect()
    }

    #[tokio::test]
    async fn open_failure_reports_no_data() {
        let sub = OneShot(Mutex::new(Some(Open::Fail)));
        let handler = Collect::default();

        let end = StreamSession::new(&sub, FeedFilter::default(), Shutdown::never())
            .run(&handler)
            .await;

        match end {
            SessionEnd::Failed(f) => {
                assert!(!f.received_any);
                assert_eq!(f.outcome(), AttemptOutcome::NoData);
                assert!(matches!(f.error, FeedError::Connect(_)));
            }
            SessionEnd::Stopped => panic!("expected failure"),
        }
        assert!(handler.0.lock().is_empty());
    }

    #[tokio::test]
    async fn stream_end_after_events_reports_data() {
        let sub = OneShot(Mutex::new(Some(Open::Events(events(3), false))));
        let handler = Collect::default();

        let end = StreamSession::new(&sub, FeedFilter::default(), Shutdown::never())
            .run(&handler)
            .await;

        match end {
            SessionEnd::Failed(f) => {
                assert!(f.received_any);
                assert_eq!(f.received, 3);
                assert_eq!(f.outcome(), AttemptOutcome::HadDataThenFailed);
                assert!(matches!(f.error, FeedError::Ended));
            }
            SessionEnd::Stopped => panic!("expected failure"),
        }
        assert_eq!(*handler.0.lock(), vec!["evt-0", "evt-1", "evt-2"]);
    }

    #[tokio::test]
    async fn immediate_stream_end_reports_no_data() {
        let sub = OneShot(Mutex::new(Some(Open::Events(vec![], false))));
        let handler = Collect::default();

        let end = StreamSession::new(&sub, FeedFilter::default(), Shutdown::never())
            .run(&handler)
            .await;

        assert!(matches!(
            end,
            SessionEnd::Failed(AttemptFailure {
                received_any: false,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn shutdown_interrupts_open() {
        let sub = OneShot(Mutex::new(Some(Open::Hang)));
        let handler = Collect::default();
        let (trigger, shutdown) = crate::shutdown::channel();

        let task = tokio::spawn(async move {
            StreamSession::new(&sub, FeedFilter::default(), shutdown)
                .run(&handler)
                .await
        });

        trigger.trigger();
        let end = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("session should stop promptly")
            .unwrap();
        assert!(matches!(end, SessionEnd::Stopped));
    }

    #[tokio::test]
    async fn shutdown_interrupts_receive() {
        let sub = OneShot(Mutex::new(Some(Open::Events(events(2), true))));
        let (trigger, shutdown) = crate::shutdown::channel();
        let handler = std::sync::Arc::new(Collect::default());

        let task = {
            let handler = handler.clone();
            tokio::spawn(async move {
                StreamSession::new(&sub, FeedFilter::default(), shutdown)
                    .run(handler.as_ref())
                    .await
            })
        };

        // Wait until both scripted events are through
        while handler.0.lock().len() < 2 {
            tokio::task::yield_now().await;
        }
        trigger.trigger();

        let end = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("session should stop promptly")
            .unwrap();
        assert!(matches!(end, SessionEnd::Stopped));
        assert_eq!(handler.0.lock().len(), 2);
    }
}
