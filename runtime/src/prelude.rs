//! Convenience re-exports for embedding the relay.
//!
//! ```rust
//! use disaster_relay_runtime::prelude::*;
//! ```

// Core types
pub use disaster_relay_core::{AlertLevel, Category, Coordinates, Event};

// Sinks
pub use disaster_relay::{DiscordSink, Sink, SinkError, StdoutSink};

// Engine
pub use disaster_relay::{DeliveryEngine, DeliveryRecord, EngineConfig, FilterPolicy};

// Feed
pub use disaster_relay::{Directory, FeedFilter, GrpcFeed, Subscriber};

// Error types
pub use disaster_relay::RelayError;

// Runtime
pub use crate::RuntimeBuilder;
