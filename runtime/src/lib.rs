//! disaster-relay runtime - process wiring for the relay
//!
//! Provides [`run()`] for the stock binary, and [`RuntimeBuilder`] for
//! embedding the relay with a custom sink or metrics address.
//!
//! # Quick start
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     disaster_relay_runtime::run().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]

pub mod prelude;

use disaster_relay::config::{Config, LogFormat, SinkSettings};
use disaster_relay::metrics::Metrics;
use disaster_relay::metrics_server::MetricsServer;
use disaster_relay::shutdown::{self, ShutdownTrigger};
use disaster_relay::{DeliveryEngine, DiscordSink, GrpcFeed, Result, Sink, StdoutSink};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run the relay with settings from the environment.
///
/// Loads configuration, initialises tracing and metrics, backfills, then
/// streams until SIGINT/SIGTERM or until the feed cannot be reached.
/// Returns an error in the second case, so the process exits non-zero.
pub async fn run() -> anyhow::Result<()> {
    RuntimeBuilder::new().run().await
}

/// Builder for overriding parts of the environment configuration.
///
/// # Example
///
/// ```ignore
/// RuntimeBuilder::new()
///     .sink(Arc::new(StdoutSink::pretty()))
///     .metrics_addr("127.0.0.1:9191".parse()?)
///     .run()
///     .await
/// ```
pub struct RuntimeBuilder {
    sink: Option<Arc<dyn Sink>>,
    metrics_addr: Option<SocketAddr>,
    metrics_enabled: bool,
}

impl RuntimeBuilder {
    /// Create a new builder with defaults from environment variables.
    pub fn new() -> Self {
        Self {
            sink: None,
            metrics_addr: None,
            metrics_enabled: true,
        }
    }

    /// Deliver to `sink` instead of the one `RELAY_SINK` selects.
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the metrics HTTP server address.
    ///
    /// Default: loaded from `METRICS_ADDR`, or `0.0.0.0:9090`.
    pub fn metrics_addr(mut self, addr: SocketAddr) -> Self {
        self.metrics_addr = Some(addr);
        self
    }

    /// Do not start the metrics HTTP server.
    pub fn disable_metrics(mut self) -> Self {
        self.metrics_enabled = false;
        self
    }

    /// Run the relay to completion.
    ///
    /// This is the terminal method. It returns after shutdown.
    pub async fn run(self) -> anyhow::Result<()> {
        // ── 1. Load config from env ──────────────────────────────
        let config = Config::from_env()?;

        // ── 2. Init tracing ──────────────────────────────────────
        init_tracing(&config);

        info!(
            grpc_address = %config.grpc_address,
            sink = config.sink.name(),
            category = ?config.engine.feed_filter.category,
            "Starting disaster relay"
        );

        // ── 3. Build sink and feed ───────────────────────────────
        let sink: Arc<dyn Sink> = match self.sink {
            Some(sink) => sink,
            None => build_sink(&config.sink)?,
        };
        let feed = build_feed(&config.grpc_address)?;

        // ── 4. Engine ────────────────────────────────────────────
        let (trigger, signal) = shutdown::channel();
        let engine = DeliveryEngine::new(config.engine, feed.clone(), Arc::clone(&sink), signal)
            .with_directory(feed);

        // ── 5. Init metrics + HTTP server ────────────────────────
        Metrics::init()?;
        let metrics_addr = self.metrics_addr.or(config.metrics_addr);
        let metrics_handle = match metrics_addr {
            Some(addr) if self.metrics_enabled => {
                Some(MetricsServer::start(addr, engine.record(), Arc::clone(&sink)))
            }
            _ => {
                info!("Metrics server disabled");
                None
            }
        };

        // ── 6. Signals trigger shutdown ──────────────────────────
        let signal_handle = tokio::spawn(forward_shutdown(trigger));

        // ── 7. Run until shutdown or fatal error ─────────────────
        let result = engine.run().await;

        // ── 8. Shutdown ──────────────────────────────────────────
        signal_handle.abort();
        if let Err(e) = sink.shutdown().await {
            warn!(error = %e, sink = sink.name(), "Sink shutdown failed");
        }
        if let Some(handle) = metrics_handle {
            handle.abort();
        }

        match result {
            Ok(()) => {
                info!("Disaster relay shutdown complete");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Disaster relay stopped");
                Err(e.into())
            }
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_sink(settings: &SinkSettings) -> Result<Arc<dyn Sink>> {
    Ok(match settings {
        SinkSettings::Discord(discord) => Arc::new(DiscordSink::new(
            discord.token.clone(),
            discord.channel_id.clone(),
            discord.api_base.clone(),
        )?),
        SinkSettings::Stdout => Arc::new(StdoutSink::pretty()),
    })
}

fn build_feed(address: &str) -> Result<Arc<GrpcFeed>> {
    Ok(Arc::new(GrpcFeed::new(address)?))
}

/// Initialise the tracing subscriber based on config.
fn init_tracing(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

async fn forward_shutdown(trigger: ShutdownTrigger) {
    shutdown_signal().await;
    trigger.trigger();
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use disaster_relay::config::DiscordSettings;
    use disaster_relay::RelayError;

    #[test]
    fn build_sink_from_settings() {
        let stdout = build_sink(&SinkSettings::Stdout).unwrap();
        assert_eq!(stdout.name(), "stdout");

        let discord = build_sink(&SinkSettings::Discord(DiscordSettings {
            token: "t".into(),
            channel_id: "1".into(),
            api_base: "http://localhost:1".into(),
        }))
        .unwrap();
        assert_eq!(discord.name(), "discord");
    }

    #[test]
    fn build_sink_rejects_empty_token() {
        let result = build_sink(&SinkSettings::Discord(DiscordSettings {
            token: " ".into(),
            channel_id: "1".into(),
            api_base: "http://localhost:1".into(),
        }));
        assert!(matches!(
            result,
            Err(RelayError::Sink(disaster_relay::SinkError::Init(_)))
        ));
    }

    #[tokio::test]
    async fn build_feed_rejects_bad_address() {
        let result = build_feed("http://bad host:50051");
        assert!(matches!(result, Err(RelayError::Feed(_))));

        assert!(build_feed("http://localhost:50051").is_ok());
    }

    #[tokio::test]
    async fn forward_shutdown_waits_for_signal() {
        let (trigger, signal) = shutdown::channel();
        let handle = tokio::spawn(forward_shutdown(trigger));
        tokio::task::yield_now().await;
        assert!(!signal.is_requested());
        handle.abort();
    }
}
