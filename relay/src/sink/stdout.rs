//! Stdout sink for debugging
//!
//! Prints alerts to stdout instead of posting them. Useful for running the
//! relay locally without chat credentials.

use super::discord::render;
use async_trait::async_trait;
use disaster_relay_core::{Event, Sink, SinkError};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stdout sink - prints events for debugging
pub struct StdoutSink {
    /// Print the full chat message instead of one line
    pretty: bool,
    /// Count of events delivered
    delivered_count: AtomicU64,
}

impl StdoutSink {
    /// One line per event
    pub fn new() -> Self {
        Self {
            pretty: false,
            delivered_count: AtomicU64::new(0),
        }
    }

    /// The rendered chat message, framed
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            delivered_count: AtomicU64::new(0),
        }
    }

    /// Get total events delivered
    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    fn write_event(&self, out: &mut impl Write, event: &Event) -> std::io::Result<()> {
        if self.pretty {
            writeln!(out, "┌─ Alert ─────────────────────────────────────────────")?;
            for line in render(event).lines() {
                writeln!(out, "│ {line}")?;
            }
            writeln!(out, "└─────────────────────────────────────────────────────")
        } else {
            writeln!(
                out,
                "[{}] {}:{} mag={:.1} alert={} {}",
                event.source, event.category, event.id, event.magnitude, event.alert_level, event.title
            )
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let mut stdout = std::io::stdout().lock();
        self.write_event(&mut stdout, event)
            .map_err(|e| SinkError::Send(format!("stdout write failed: {}", e)))?;
        self.delivered_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SinkError> {
        std::io::stdout()
            .lock()
            .flush()
            .map_err(|e| SinkError::Shutdown(format!("stdout flush failed: {}", e)))
    }
}
