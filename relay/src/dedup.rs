//! Delivery record
//!
//! Remembers which event ids have already been handed to the sink so each
//! event is delivered at most once per process lifetime.
//! Thread-safe using a parking_lot read/write lock: readers (the health
//! endpoint, metrics) never block each other, the delivery path is the
//! single writer.
//!
//! # Memory Behavior
//!
//! The set only grows. There is no TTL and no eviction; it is reset when
//! the process restarts.

use parking_lot::RwLock;
use std::collections::HashSet;

/// Set of event ids already delivered
///
/// The record knows nothing about filtering. Callers check [`contains`]
/// before delivering and call [`mark_delivered`] once they decide the event
/// is consumed.
///
/// [`contains`]: DeliveryRecord::contains
/// [`mark_delivered`]: DeliveryRecord::mark_delivered
#[derive(Debug, Default)]
pub struct DeliveryRecord {
    delivered: RwLock<HashSet<String>>,
}

impl DeliveryRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `id` has been delivered
    pub fn contains(&self, id: &str) -> bool {
        self.delivered.read().contains(id)
    }

    /// Record `id` as delivered
    ///
    /// Returns true if the id was not recorded before.
    pub fn mark_delivered(&self, id: &str) -> bool {
        let mut delivered = self.delivered.write();
        if delivered.contains(id) {
            return false;
        }
        delivered.insert(id.to_string())
    }

    /// Number of recorded ids
    ///
    /// Returns a snapshot at the time of the call.
    pub fn len(&self) -> usize {
        self.delivered.read().len()
    }

    /// Check if nothing has been delivered yet
    pub fn is_empty(&self) -> bool {
        self.delivered.read().is_empty()
    }
}
