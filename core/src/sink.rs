//! Sink trait for relay outputs
//!
//! The [`Sink`] trait is the output side of the relay: the place a qualifying
//! event becomes user-visible (a chat post, a line on stdout).

use crate::error::SinkError;
use crate::event::Event;
use async_trait::async_trait;

/// Sink trait - delivers one Event to a destination
///
/// # Implementation Requirements
///
/// - Sinks must be `Send + Sync` for use across async tasks
/// - `deliver` is called once per qualifying event; a returned error means
///   the event was not delivered and will not be retried by the relay
/// - Health checks should be lightweight
///
/// # Example
///
/// ```ignore
/// use disaster_relay_core::{Event, Sink, SinkError};
/// use async_trait::async_trait;
///
/// struct WebhookSink {
///     client: reqwest::Client,
///     url: String,
/// }
///
/// #[async_trait]
/// impl Sink for WebhookSink {
///     fn name(&self) -> &'static str {
///         "webhook"
///     }
///
///     async fn deliver(&self, event: &Event) -> Result<(), SinkError> {
///         self.client
///             .post(&self.url)
///             .json(event)
///             .send()
///             .await
///             .map_err(|e| SinkError::Connection(e.to_string()))?
///             .error_for_status()
///             .map_err(|e| SinkError::Send(e.to_string()))?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name for logging and metrics labels ("discord", "stdout")
    fn name(&self) -> &'static str;

    /// Deliver a single event
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The event is now visible at the destination
    /// * `Err(SinkError)` - The event was not delivered
    async fn deliver(&self, event: &Event) -> Result<(), SinkError>;

    /// Check if the destination is reachable
    ///
    /// The default implementation reports healthy.
    async fn health(&self) -> bool {
        true
    }

    /// Graceful shutdown
    ///
    /// Called once when the relay stops. The default implementation returns
    /// `Ok(())` for sinks that hold no resources.
    async fn shutdown(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
