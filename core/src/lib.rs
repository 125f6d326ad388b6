//! disaster-relay-core - Core types for the disaster relay
//!
//! This crate provides the types shared between the relay engine and its
//! outputs:
//!
//! - [`Event`] - the typed disaster report that flows through the relay
//! - [`AlertLevel`] / [`Category`] - ordered alert tiers and disaster kinds
//! - [`Sink`] trait - async interface for delivering events to a destination
//! - [`SinkError`] - error type for sink operations
//! - [`proto`] - the `disasters.v1` wire format and generated gRPC client
//!
//! Sink implementations only need this crate, not the engine.

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![warn(missing_docs)]

mod error;
/// Typed disaster events
#[allow(missing_docs)]
pub mod event;
mod sink;

// Proto types generated from disasters/v1/disasters.proto
pub mod proto {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::derive_partial_eq_without_eq)]
    #![allow(missing_docs)]

    include!("proto/disasters.v1.rs");
}

pub use error::SinkError;
pub use event::{AlertLevel, Category, Coordinates, Event, ParseLevelError};
pub use sink::Sink;
