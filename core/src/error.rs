//! Error types for relay sinks

use thiserror::Error;

/// Error type for sink operations
///
/// Returned by [`Sink`](crate::Sink) implementations. The relay logs these
/// and moves on to the next event; it never retries a failed delivery.
///
/// # Example
///
/// ```
/// use disaster_relay_core::SinkError;
///
/// fn post() -> Result<(), SinkError> {
///     Err(SinkError::Send("429 Too Many Requests".to_string()))
/// }
///
/// match post() {
///     Ok(_) => println!("posted"),
///     Err(SinkError::Send(msg)) => println!("post failed: {}", msg),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Initialization failed
    ///
    /// Examples: missing credentials, invalid base URL.
    #[error("initialization failed: {0}")]
    Init(String),

    /// Send failed
    ///
    /// The destination was reached but refused or failed the request.
    /// Examples: non-2xx status, rate limited, write error.
    #[error("send failed: {0}")]
    Send(String),

    /// Connection error
    ///
    /// Examples: DNS lookup failed, connection refused, TLS handshake error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Shutdown error
    ///
    /// Buffered output could not be flushed when the relay stopped.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}
