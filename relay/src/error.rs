//! Error types for the relay

use thiserror::Error;

// Re-export SinkError from disaster-relay-core
pub use disaster_relay_core::SinkError;

use crate::feed::FeedError;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Main error type for the relay
#[derive(Error, Debug)]
#[allow(clippy::result_large_err)]
pub enum RelayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Feed client could not be built
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Sink could not be built
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Startup snapshot could not be fetched (non-fatal, logged only)
    #[error("backfill failed: {0}")]
    Backfill(String),

    /// The feed could not be reached `attempts` times in a row
    #[error("giving up after {attempts} consecutive failed connection attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    /// Metrics error
    #[error("metrics error: {0}")]
    Metrics(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_to_relay_error() {
        let relay_err: RelayError = SinkError::Init("token missing".to_string()).into();
        assert!(matches!(relay_err, RelayError::Sink(SinkError::Init(_))));
        assert_eq!(
            relay_err.to_string(),
            "sink error: initialization failed: token missing"
        );
    }

    #[test]
    fn test_feed_error_to_relay_error() {
        let relay_err: RelayError = FeedError::Connect("bad url".to_string()).into();
        assert!(matches!(relay_err, RelayError::Feed(FeedError::Connect(_))));
        assert!(relay_err.to_string().starts_with("feed error: "));
    }

    #[test]
    fn test_max_retries_display() {
        let err = RelayError::MaxRetriesExceeded {
            attempts: 5,
            last_error: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "giving up after 5 consecutive failed connection attempts: connection refused"
        );
    }
}
