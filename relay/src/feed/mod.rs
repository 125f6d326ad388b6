//! Upstream feed interfaces
//!
//! The relay reads disasters from two upstream operations:
//!
//! ```text
//!                ┌──────────────► Subscriber::subscribe ──► Subscription::next_event (repeat)
//! Upstream feed ─┤
//!                └──────────────► Directory::list         (once, at startup)
//! ```
//!
//! [`GrpcFeed`] implements both over one `tonic` channel. Tests script them
//! in memory.

mod grpc;

pub use grpc::GrpcFeed;

use async_trait::async_trait;
use disaster_relay_core::{AlertLevel, Category, Event};
use thiserror::Error;

/// Failure reported by a feed operation
#[derive(Error, Debug)]
pub enum FeedError {
    /// Could not build or reach the upstream endpoint
    #[error("connection error: {0}")]
    Connect(String),

    /// The subscribe call was rejected
    #[error("starting stream: {0}")]
    Subscribe(tonic::Status),

    /// The stream failed mid-flight
    #[error("receiving: {0}")]
    Receive(tonic::Status),

    /// The server closed the stream
    #[error("stream ended by server")]
    Ended,

    /// The snapshot query failed
    #[error("listing disasters: {0}")]
    Directory(tonic::Status),
}

/// Criteria sent upstream when subscribing
///
/// Severity is deliberately absent: it is always evaluated locally by
/// [`FilterPolicy`](crate::FilterPolicy).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedFilter {
    /// Only stream this category
    pub category: Option<Category>,
}

impl FeedFilter {
    /// Restrict the stream to one category
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
        }
    }
}

/// Parameters of the startup snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotQuery {
    /// Maximum number of events to return
    pub limit: usize,
    /// Only events at or above this alert level
    pub min_alert_level: AlertLevel,
    /// Same category restriction as the stream
    pub filter: FeedFilter,
}

/// Opens subscriptions to the live event stream
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Name for logging
    fn name(&self) -> &'static str;

    /// Open a new subscription
    ///
    /// An error here means no events can arrive on this attempt.
    async fn subscribe(&self, filter: &FeedFilter) -> Result<Box<dyn Subscription>, FeedError>;
}

/// An open subscription
#[async_trait]
pub trait Subscription: Send {
    /// Wait for the next event
    ///
    /// Returns [`FeedError::Ended`] when the server closes the stream.
    async fn next_event(&mut self) -> Result<Event, FeedError>;
}

/// Bounded snapshot of recent events
#[async_trait]
pub trait Directory: Send + Sync {
    /// Most recent events matching `query`, in the order to deliver them
    async fn list(&self, query: &SnapshotQuery) -> Result<Vec<Event>, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_error_display() {
        assert_eq!(FeedError::Ended.to_string(), "stream ended by server");
        assert_eq!(
            FeedError::Connect("refused".into()).to_string(),
            "connection error: refused"
        );
        let err = FeedError::Receive(tonic::Status::unavailable("reset"));
        assert!(err.to_string().starts_with("receiving: "));
    }

    #[test]
    fn default_filter_is_unrestricted() {
        assert_eq!(FeedFilter::default().category, None);
        assert_eq!(
            FeedFilter::category(Category::Flood).category,
            Some(Category::Flood)
        );
    }
}
