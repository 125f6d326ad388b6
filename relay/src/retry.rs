//! Reconnect policy
//!
//! Classifies each failed stream attempt and decides whether to try again.
//!
//! ```text
//! attempt failed ──► received any event? ──yes──► HadDataThenFailed ──► counter = 0 ──► Retry
//!                            │
//!                            no
//!                            ▼
//!                         NoData ──► counter += 1 ──► counter >= max? ──yes──► GiveUp
//!                                                            │
//!                                                            no ──► Retry
//! ```
//!
//! A feed that streamed for hours before one hiccup resets trust. A feed
//! that cannot be reached at all erodes it.

use std::time::Duration;

/// Default number of consecutive no-data failures before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default fixed delay between attempts
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// How a failed attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Failed before a single event arrived (open failed, or the stream
    /// broke before its first message)
    NoData,
    /// Delivered at least one event, then failed
    HadDataThenFailed,
}

impl AttemptOutcome {
    /// Classify from the per-attempt flag
    pub fn from_received_any(received_any: bool) -> Self {
        if received_any {
            AttemptOutcome::HadDataThenFailed
        } else {
            AttemptOutcome::NoData
        }
    }

    /// Label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::NoData => "no_data",
            AttemptOutcome::HadDataThenFailed => "had_data",
        }
    }
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait the backoff delay and open a new attempt
    Retry { consecutive_failures: u32 },
    /// The ceiling was reached; stop with a fatal error
    GiveUp { consecutive_failures: u32 },
}

/// Consecutive no-data failure counter
///
/// Lives for the whole supervised loop. One attempt's own
/// `received_any` flag lives in the session; only the classified outcome
/// reaches the tracker.
#[derive(Debug, Clone)]
pub struct RetryTracker {
    consecutive_failures: u32,
    max_retries: u32,
}

impl RetryTracker {
    /// Create a tracker that gives up after `max_retries` consecutive
    /// no-data failures (minimum 1)
    pub fn new(max_retries: u32) -> Self {
        Self {
            consecutive_failures: 0,
            max_retries: max_retries.max(1),
        }
    }

    /// Record a failed attempt and decide what happens next
    pub fn record(&mut self, outcome: AttemptOutcome) -> RetryDecision {
        match outcome {
            AttemptOutcome::HadDataThenFailed => {
                self.consecutive_failures = 0;
            }
            AttemptOutcome::NoData => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.consecutive_failures >= self.max_retries {
                    return RetryDecision::GiveUp {
                        consecutive_failures: self.consecutive_failures,
                    };
                }
            }
        }
        RetryDecision::Retry {
            consecutive_failures: self.consecutive_failures,
        }
    }

    /// Current consecutive no-data failure count
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// The configured ceiling
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
