//! Prometheus metrics for the relay

use crate::error::{RelayError, Result};
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramVec, TextEncoder, register_counter_vec, register_gauge,
    register_histogram_vec,
};
use std::sync::OnceLock;
use std::time::Duration;

/// Global metrics instance
static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Where an event entered the delivery path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPath {
    /// Startup snapshot
    Backfill,
    /// Live subscription
    Stream,
}

impl DeliveryPath {
    /// Label value
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryPath::Backfill => "backfill",
            DeliveryPath::Stream => "stream",
        }
    }
}

/// All relay metrics
pub struct Metrics {
    // ─────────────────────────────────────────────────────────────────────────
    // Event counters
    // ─────────────────────────────────────────────────────────────────────────
    /// Events received (by path)
    pub events_received: CounterVec,

    /// Events handed to the sink successfully (by path, sink)
    pub events_delivered: CounterVec,

    /// Events not delivered (by reason)
    pub events_dropped: CounterVec,

    /// Sink call duration (by sink)
    pub sink_duration_seconds: HistogramVec,

    // ─────────────────────────────────────────────────────────────────────────
    // Stream supervision
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed stream attempts (by outcome)
    pub stream_attempts: CounterVec,

    /// Consecutive attempts that failed without data
    pub consecutive_failures: Gauge,

    /// 1 while a subscription is open
    pub stream_connected: Gauge,

    /// Ids in the delivery record
    pub delivery_record_size: Gauge,
}

impl Metrics {
    /// Initialize metrics (call once at startup)
    ///
    /// Returns error if metric registration fails.
    #[allow(clippy::result_large_err)]
    pub fn init() -> Result<&'static Metrics> {
        if let Some(metrics) = METRICS.get() {
            return Ok(metrics);
        }

        let metrics = Metrics {
            events_received: register_counter_vec!(
                "relay_events_received_total",
                "Total events received from the upstream feed",
                &["path"]
            )
            .map_err(|e| RelayError::Metrics(format!("events_received: {e}")))?,

            events_delivered: register_counter_vec!(
                "relay_events_delivered_total",
                "Total events delivered to the sink",
                &["path", "sink"]
            )
            .map_err(|e| RelayError::Metrics(format!("events_delivered: {e}")))?,

            events_dropped: register_counter_vec!(
                "relay_events_dropped_total",
                "Total events not delivered",
                &["reason"]
            )
            .map_err(|e| RelayError::Metrics(format!("events_dropped: {e}")))?,

            sink_duration_seconds: register_histogram_vec!(
                "relay_sink_duration_seconds",
                "Time spent in a single sink call",
                &["sink"],
                // Buckets: 1ms to 30s (HTTP sinks)
                vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
            )
            .map_err(|e| RelayError::Metrics(format!("sink_duration_seconds: {e}")))?,

            stream_attempts: register_counter_vec!(
                "relay_stream_failed_attempts_total",
                "Failed stream attempts by outcome",
                &["outcome"]
            )
            .map_err(|e| RelayError::Metrics(format!("stream_attempts: {e}")))?,

            consecutive_failures: register_gauge!(
                "relay_stream_consecutive_failures",
                "Consecutive stream attempts that failed without data"
            )
            .map_err(|e| RelayError::Metrics(format!("consecutive_failures: {e}")))?,

            stream_connected: register_gauge!(
                "relay_stream_connected",
                "Whether a subscription is open (1 = open, 0 = closed)"
            )
            .map_err(|e| RelayError::Metrics(format!("stream_connected: {e}")))?,

            delivery_record_size: register_gauge!(
                "relay_delivery_record_size",
                "Number of event ids in the delivery record"
            )
            .map_err(|e| RelayError::Metrics(format!("delivery_record_size: {e}")))?,
        };

        // Set the metrics (only succeeds once)
        let _ = METRICS.set(metrics);

        METRICS
            .get()
            .ok_or_else(|| RelayError::Metrics("Failed to initialize metrics".to_string()))
    }

    /// Get the global metrics instance
    ///
    /// Returns None if metrics haven't been initialized yet.
    pub fn get() -> Option<&'static Metrics> {
        METRICS.get()
    }

    /// Record one received event
    pub fn record_received(&self, path: DeliveryPath) {
        self.events_received
            .with_label_values(&[path.as_str()])
            .inc();
    }

    /// Record one successful delivery
    pub fn record_delivered(&self, path: DeliveryPath, sink: &str) {
        self.events_delivered
            .with_label_values(&[path.as_str(), sink])
            .inc();
    }

    /// Record one dropped event
    ///
    /// Reasons: `filtered`, `duplicate`, `sink_error`.
    pub fn record_dropped(&self, reason: &str) {
        self.events_dropped.with_label_values(&[reason]).inc();
    }

    /// Record how long a sink call took
    pub fn record_sink_duration(&self, sink: &str, duration: Duration) {
        self.sink_duration_seconds
            .with_label_values(&[sink])
            .observe(duration.as_secs_f64());
    }

    /// Record a failed stream attempt and the counter after classifying it
    pub fn record_attempt(&self, outcome: &str, consecutive_failures: u32) {
        self.stream_attempts.with_label_values(&[outcome]).inc();
        self.consecutive_failures.set(consecutive_failures as f64);
    }

    /// Clear the failure gauge once an attempt has received data
    pub fn reset_consecutive_failures(&self) {
        self.consecutive_failures.set(0.0);
    }

    /// Mark the subscription open or closed
    pub fn set_stream_connected(&self, connected: bool) {
        self.stream_connected.set(if connected { 1.0 } else { 0.0 });
    }

    /// Update the delivery record size
    pub fn set_record_size(&self, size: usize) {
        self.delivery_record_size.set(size as f64);
    }
}

/// Gather all metrics and encode as Prometheus text format
///
/// Returns the metrics as a String, ready to be served via HTTP.
pub fn gather() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_ok() {
        String::from_utf8(buffer).unwrap_or_default()
    } else {
        String::new()
    }
}

/// Record a dropped event if metrics are initialized, otherwise skip
pub fn try_record_dropped(reason: &str) {
    if let Some(m) = Metrics::get() {
        m.record_dropped(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_init_is_idempotent() {
        let first = Metrics::init().map(|m| m as *const Metrics).ok();
        let second = Metrics::init().map(|m| m as *const Metrics).ok();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recording_shows_up_in_gather() {
        let _ = Metrics::init();
        if let Some(metrics) = Metrics::get() {
            metrics.record_received(DeliveryPath::Stream);
            metrics.record_delivered(DeliveryPath::Backfill, "stdout");
            metrics.record_dropped("duplicate");
            metrics.record_attempt("no_data", 2);
            metrics.set_stream_connected(true);
            metrics.set_record_size(7);
            metrics.record_sink_duration("stdout", Duration::from_millis(3));

            let text = gather();
            assert!(text.contains("relay_events_received_total"));
            assert!(text.contains("relay_events_delivered_total"));
            assert!(text.contains("relay_stream_failed_attempts_total"));
            assert!(text.contains("relay_delivery_record_size"));
        }
    }

    #[test]
    fn test_path_labels() {
        assert_eq!(DeliveryPath::Backfill.as_str(), "backfill");
        assert_eq!(DeliveryPath::Stream.as_str(), "stream");
    }
}
