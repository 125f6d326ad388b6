//! Delivery engine - supervises the feed and delivers qualifying events
//!
//! ```text
//!             ┌────────────┐
//!  startup ──►│  Backfill  │── snapshot, magnitude gate, mark, deliver
//!             └─────┬──────┘
//!                   ▼
//!             ┌────────────┐  event   ┌──────────┐   ┌─────────┐   ┌──────┐
//!        ┌───►│  Session   │────────►│  Filter  │──►│  Dedup  │──►│ Sink │──► mark
//!        │    └─────┬──────┘         └──────────┘   └─────────┘   └──────┘
//!        │          │ failed
//!        │          ▼
//!        │    RetryTracker ──GiveUp──► Err(MaxRetriesExceeded)
//!        │          │ Retry
//!        └── backoff (or shutdown) ◄┘
//! ```
//!
//! Only one sink call is ever in flight. Events are delivered in the order
//! they arrive. Sink failures are logged and never end the engine.

use crate::dedup::DeliveryRecord;
use crate::error::{RelayError, Result};
use crate::feed::{Directory, FeedFilter, SnapshotQuery, Subscriber};
use crate::filter::FilterPolicy;
use crate::metrics::{DeliveryPath, Metrics};
use crate::retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF, RetryDecision, RetryTracker};
use crate::session::{EventHandler, SessionEnd, StreamSession};
use crate::shutdown::Shutdown;
use async_trait::async_trait;
use disaster_relay_core::{Event, Sink};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Snapshot size ceiling
pub const MAX_BACKFILL_LIMIT: usize = 50;

/// Engine tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Severity thresholds
    pub policy: FilterPolicy,
    /// Consecutive no-data failures before giving up (minimum 1)
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub retry_backoff: Duration,
    /// Snapshot size at startup, capped at [`MAX_BACKFILL_LIMIT`]. 0 skips it.
    pub backfill_limit: usize,
    /// Sent upstream on every subscribe
    pub feed_filter: FeedFilter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: FilterPolicy::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            backfill_limit: MAX_BACKFILL_LIMIT,
            feed_filter: FeedFilter::default(),
        }
    }
}

/// What happened to one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The sink accepted it
    Delivered,
    /// Below the severity thresholds
    Filtered,
    /// Already in the delivery record
    Duplicate,
    /// The sink returned an error
    SinkFailed,
}

/// Filter, dedup, deliver, record
///
/// Shared by the live path and backfill.
pub struct Pipeline {
    policy: FilterPolicy,
    record: Arc<DeliveryRecord>,
    sink: Arc<dyn Sink>,
}

impl Pipeline {
    /// Create a pipeline over a shared record
    pub fn new(policy: FilterPolicy, record: Arc<DeliveryRecord>, sink: Arc<dyn Sink>) -> Self {
        Self {
            policy,
            record,
            sink,
        }
    }

    /// Live-path handling of one event
    ///
    /// The id is recorded only after the sink accepts the event, so a
    /// failed event stays eligible if the feed sends it again.
    pub async fn process(&self, event: &Event) -> Disposition {
        if let Some(m) = Metrics::get() {
            m.record_received(DeliveryPath::Stream);
        }

        if !self.policy.should_deliver(event) {
            debug!(
                id = %event.id,
                category = %event.category,
                magnitude = event.magnitude,
                alert_level = %event.alert_level,
                "below threshold, skipped"
            );
            crate::metrics::try_record_dropped("filtered");
            return Disposition::Filtered;
        }

        if self.record.contains(&event.id) {
            debug!(id = %event.id, "already delivered, skipped");
            crate::metrics::try_record_dropped("duplicate");
            return Disposition::Duplicate;
        }

        match self.deliver(event, DeliveryPath::Stream).await {
            Disposition::Delivered => {
                self.record.mark_delivered(&event.id);
                self.update_record_size();
                Disposition::Delivered
            }
            other => other,
        }
    }

    /// Deliver a snapshot in the order the directory returns it
    ///
    /// Earthquakes still pass the magnitude gate. Every qualifying id is
    /// recorded before its sink call, so a failure here is never retried.
    pub async fn backfill(&self, directory: &dyn Directory, query: &SnapshotQuery) -> Result<usize> {
        let events = directory
            .list(query)
            .await
            .map_err(|e| RelayError::Backfill(e.to_string()))?;

        info!(count = events.len(), limit = query.limit, "backfill snapshot received");

        let mut delivered = 0;
        for event in &events {
            if let Some(m) = Metrics::get() {
                m.record_received(DeliveryPath::Backfill);
            }

            if !self.policy.passes_magnitude_gate(event) {
                debug!(id = %event.id, magnitude = event.magnitude, "backfill: below magnitude, skipped");
                crate::metrics::try_record_dropped("filtered");
                continue;
            }

            if !self.record.mark_delivered(&event.id) {
                debug!(id = %event.id, "backfill: already delivered, skipped");
                crate::metrics::try_record_dropped("duplicate");
                continue;
            }
            self.update_record_size();

            if self.deliver(event, DeliveryPath::Backfill).await == Disposition::Delivered {
                delivered += 1;
            }
        }

        Ok(delivered)
    }

    async fn deliver(&self, event: &Event, path: DeliveryPath) -> Disposition {
        let sink = self.sink.name();
        let start = Instant::now();
        let result = self.sink.deliver(event).await;

        if let Some(m) = Metrics::get() {
            m.record_sink_duration(sink, start.elapsed());
        }

        match result {
            Ok(()) => {
                info!(
                    id = %event.id,
                    category = %event.category,
                    title = %event.title,
                    path = path.as_str(),
                    "alert delivered"
                );
                if let Some(m) = Metrics::get() {
                    m.record_delivered(path, sink);
                }
                Disposition::Delivered
            }
            Err(e) => {
                warn!(
                    id = %event.id,
                    sink = sink,
                    path = path.as_str(),
                    error = %e,
                    "sink delivery failed"
                );
                crate::metrics::try_record_dropped("sink_error");
                Disposition::SinkFailed
            }
        }
    }

    fn update_record_size(&self) {
        if let Some(m) = Metrics::get() {
            m.set_record_size(self.record.len());
        }
    }

    /// The shared delivery record
    pub fn record(&self) -> &Arc<DeliveryRecord> {
        &self.record
    }
}

#[async_trait]
impl EventHandler for Pipeline {
    async fn handle(&self, event: Event) {
        self.process(&event).await;
    }
}

/// Supervised delivery loop
///
/// Consumed by [`run`](Self::run). Grab [`record`](Self::record) first if
/// something else (the health endpoint) needs it.
pub struct DeliveryEngine {
    config: EngineConfig,
    subscriber: Arc<dyn Subscriber>,
    directory: Option<Arc<dyn Directory>>,
    pipeline: Pipeline,
    shutdown: Shutdown,
}

impl DeliveryEngine {
    /// Create an engine with a fresh delivery record and no backfill source
    pub fn new(
        config: EngineConfig,
        subscriber: Arc<dyn Subscriber>,
        sink: Arc<dyn Sink>,
        shutdown: Shutdown,
    ) -> Self {
        let pipeline = Pipeline::new(config.policy, Arc::new(DeliveryRecord::new()), sink);
        Self {
            config,
            subscriber,
            directory: None,
            pipeline,
            shutdown,
        }
    }

    /// Backfill from `directory` before streaming
    pub fn with_directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Use an existing delivery record
    pub fn with_record(mut self, record: Arc<DeliveryRecord>) -> Self {
        self.pipeline.record = record;
        self
    }

    /// Shareable handle to the delivery record
    pub fn record(&self) -> Arc<DeliveryRecord> {
        Arc::clone(self.pipeline.record())
    }

    /// The effective configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run until shutdown or until the retry ceiling is reached
    ///
    /// Returns `Ok(())` on shutdown and [`RelayError::MaxRetriesExceeded`]
    /// when the feed could not be reached often enough in a row. Backfill
    /// errors are logged and never returned.
    pub async fn run(mut self) -> Result<()> {
        info!(
            subscriber = self.subscriber.name(),
            sink = self.pipeline.sink.name(),
            min_magnitude = self.config.policy.min_magnitude,
            min_alert_level = %self.config.policy.min_alert_level,
            max_retries = self.config.max_retries,
            backoff_secs = self.config.retry_backoff.as_secs_f64(),
            "delivery engine started"
        );

        if let Some(directory) = self.directory.clone() {
            let query = self.snapshot_query();
            if query.limit == 0 {
                debug!("backfill disabled");
            } else {
                tokio::select! {
                    biased;
                    _ = self.shutdown.requested() => {
                        info!("shutdown during backfill");
                        return Ok(());
                    }
                    result = self.pipeline.backfill(directory.as_ref(), &query) => match result {
                        Ok(delivered) => info!(delivered, "backfill complete"),
                        Err(e) => warn!(error = %e, "backfill failed, continuing with live stream"),
                    },
                }
            }
        }

        let mut tracker = RetryTracker::new(self.config.max_retries);
        let mut attempt: u64 = 0;

        loop {
            if self.shutdown.is_requested() {
                break;
            }

            attempt += 1;
            debug!(attempt, "opening stream");

            let session = StreamSession::new(
                self.subscriber.as_ref(),
                self.config.feed_filter,
                self.shutdown.clone(),
            );
            let failure = match session.run(&self.pipeline).await {
                SessionEnd::Stopped => break,
                SessionEnd::Failed(failure) => failure,
            };

            if self.shutdown.is_requested() {
                break;
            }

            let outcome = failure.outcome();
            let decision = tracker.record(outcome);
            if let Some(m) = Metrics::get() {
                m.record_attempt(outcome.as_str(), tracker.consecutive_failures());
            }

            match decision {
                RetryDecision::GiveUp {
                    consecutive_failures,
                } => {
                    error!(
                        error = %failure.error,
                        consecutive_failures,
                        "giving up on feed"
                    );
                    return Err(RelayError::MaxRetriesExceeded {
                        attempts: consecutive_failures,
                        last_error: failure.error.to_string(),
                    });
                }
                RetryDecision::Retry {
                    consecutive_failures,
                } => {
                    warn!(
                        error = %failure.error,
                        outcome = outcome.as_str(),
                        received = failure.received,
                        consecutive_failures,
                        max_retries = tracker.max_retries(),
                        backoff_secs = self.config.retry_backoff.as_secs_f64(),
                        "stream failed, reconnecting"
                    );
                }
            }

            tokio::select! {
                biased;
                _ = self.shutdown.requested() => break,
                _ = tokio::time::sleep(self.config.retry_backoff) => {}
            }
        }

        info!(
            attempts = attempt,
            delivered_ids = self.pipeline.record().len(),
            "delivery engine stopped"
        );
        Ok(())
    }

    fn snapshot_query(&self) -> SnapshotQuery {
        SnapshotQuery {
            limit: self.config.backfill_limit.min(MAX_BACKFILL_LIMIT),
            min_alert_level: self.config.policy.min_alert_level,
            filter: self.config.feed_filter,
        }
    }
}
