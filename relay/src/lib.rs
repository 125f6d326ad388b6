//! disaster-relay - streaming delivery engine for disaster alerts
//!
//! Subscribes to an upstream disaster feed, keeps the events severe enough to
//! matter, and delivers each one exactly once to a chat sink.
//!
//! # Architecture
//!
//! ```text
//! Feed (gRPC) ──► StreamSession ──► FilterPolicy ──► DeliveryRecord ──► Sink
//!                      ▲                                                  │
//!                      └──── RetryTracker ◄── failed attempt              ▼
//!                                                                     Discord
//! ```
//!
//! The feed and the sink are traits. [`GrpcFeed`] and [`DiscordSink`] are the
//! production implementations; tests script both in memory.

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod feed;
pub mod filter;
pub mod metrics;
pub mod metrics_server;
pub mod retry;
pub mod session;
pub mod shutdown;
pub mod sink;

pub use config::{Config, DiscordSettings, LogFormat, SinkSettings};
pub use dedup::DeliveryRecord;
pub use engine::{DeliveryEngine, Disposition, EngineConfig, Pipeline, MAX_BACKFILL_LIMIT};
pub use error::{RelayError, Result};
pub use feed::{Directory, FeedError, FeedFilter, GrpcFeed, SnapshotQuery, Subscriber, Subscription};
pub use filter::FilterPolicy;
pub use metrics_server::MetricsServer;
pub use retry::{AttemptOutcome, RetryDecision, RetryTracker};
pub use session::{AttemptFailure, EventHandler, SessionEnd, StreamSession};
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use sink::{DiscordSink, StdoutSink};

pub use disaster_relay_core::{AlertLevel, Category, Coordinates, Event, Sink, SinkError};
