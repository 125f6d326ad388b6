//! gRPC feed client
//!
//! Talks to `disasters.v1.DisasterService`: `StreamDisasters` for the live
//! subscription and `ListDisasters` for the startup snapshot.
//!
//! The channel connects lazily, so building a `GrpcFeed` never fails because
//! the upstream is down. Connection errors surface on the first call, which is
//! where the engine classifies them.
//!
//! # Example
//!
//! ```ignore
//! let feed = GrpcFeed::new("http://localhost:50051")?;
//! let subscription = feed.subscribe(&FeedFilter::default()).await?;
//! ```

use super::{Directory, FeedError, FeedFilter, SnapshotQuery, Subscriber, Subscription};
use async_trait::async_trait;
use disaster_relay_core::proto::disaster_service_client::DisasterServiceClient;
use disaster_relay_core::proto::{Disaster, ListDisastersRequest, StreamDisastersRequest};
use disaster_relay_core::Event;
use std::time::Duration;
use tonic::codec::Streaming;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

/// Default connect timeout for the upstream (10 seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Deadline for the snapshot call. The stream itself has no deadline.
const LIST_TIMEOUT_SECS: u64 = 30;

/// gRPC client for the upstream disaster feed
///
/// Cheap to share: tonic clients are clonable and thread-safe, so each call
/// clones the client instead of locking.
pub struct GrpcFeed {
    client: DisasterServiceClient<Channel>,
    endpoint: String,
}

impl GrpcFeed {
    /// Create a feed client for `endpoint` (e.g. "http://localhost:50051")
    ///
    /// A bare `host:port` is accepted and treated as plaintext HTTP/2.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FeedError> {
        let endpoint = normalize_endpoint(&endpoint.into());
        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| FeedError::Connect(format!("invalid endpoint URL '{}': {}", endpoint, e)))?
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .connect_lazy();

        debug!(endpoint = %endpoint, "feed endpoint configured (lazy)");

        Ok(Self {
            client: DisasterServiceClient::new(channel),
            endpoint,
        })
    }

    /// The upstream endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn stream_request(filter: &FeedFilter) -> StreamDisastersRequest {
        StreamDisastersRequest {
            min_magnitude: None,
            r#type: filter
                .category
                .and_then(|c| c.to_proto())
                .map(|t| t as i32),
            alert_level: None,
        }
    }

    fn list_request(query: &SnapshotQuery) -> ListDisastersRequest {
        ListDisastersRequest {
            limit: i32::try_from(query.limit).unwrap_or(i32::MAX),
            min_alert_level: Some(query.min_alert_level.to_proto() as i32),
            r#type: query
                .filter
                .category
                .and_then(|c| c.to_proto())
                .map(|t| t as i32),
        }
    }
}

/// Prefix `http://` when no scheme is given
fn normalize_endpoint(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

#[async_trait]
impl Subscriber for GrpcFeed {
    fn name(&self) -> &'static str {
        "grpc"
    }

    async fn subscribe(&self, filter: &FeedFilter) -> Result<Box<dyn Subscription>, FeedError> {
        let mut client = self.client.clone();
        let response = client
            .stream_disasters(Self::stream_request(filter))
            .await
            .map_err(FeedError::Subscribe)?;

        debug!(endpoint = %self.endpoint, "stream opened");
        Ok(Box::new(GrpcSubscription {
            stream: response.into_inner(),
        }))
    }
}

#[async_trait]
impl Directory for GrpcFeed {
    async fn list(&self, query: &SnapshotQuery) -> Result<Vec<Event>, FeedError> {
        let mut client = self.client.clone();
        let mut request = tonic::Request::new(Self::list_request(query));
        request.set_timeout(Duration::from_secs(LIST_TIMEOUT_SECS));

        let response = client
            .list_disasters(request)
            .await
            .map_err(FeedError::Directory)?;

        let mut events: Vec<Event> = response
            .into_inner()
            .disasters
            .into_iter()
            .map(Event::from)
            .collect();
        // Upstream may ignore the limit
        events.truncate(query.limit);
        Ok(events)
    }
}

/// Live server stream
struct GrpcSubscription {
    stream: Streaming<Disaster>,
}

#[async_trait]
impl Subscription for GrpcSubscription {
    async fn next_event(&mut self) -> Result<Event, FeedError> {
        match self.stream.message().await {
            Ok(Some(disaster)) => Ok(Event::from(disaster)),
            Ok(None) => Err(FeedError::Ended),
            Err(status) => Err(FeedError::Receive(status)),
        }
    }
}
