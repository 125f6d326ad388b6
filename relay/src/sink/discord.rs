//! Discord channel sink
//!
//! Posts one message per event through the Discord REST API:
//!
//! ```text
//! POST {api_base}/channels/{channel_id}/messages
//! Authorization: Bot {token}
//! {"content": "..."}
//! ```

use async_trait::async_trait;
use disaster_relay_core::{AlertLevel, Category, Event, Sink, SinkError};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Default REST API root
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Discord rejects longer message bodies
const MAX_CONTENT_CHARS: usize = 2000;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// Posts alerts to one Discord channel
#[derive(Clone)]
pub struct DiscordSink {
    client: reqwest::Client,
    api_base: String,
    channel_id: String,
    token: String,
}

impl DiscordSink {
    /// Create a sink posting as a bot to `channel_id`
    pub fn new(
        token: impl Into<String>,
        channel_id: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, SinkError> {
        let token = token.into();
        let channel_id = channel_id.into();
        if token.trim().is_empty() {
            return Err(SinkError::Init("discord token must not be empty".into()));
        }
        if channel_id.trim().is_empty() {
            return Err(SinkError::Init("discord channel id must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("disaster-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SinkError::Init(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            channel_id,
            token,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }
}

#[async_trait]
impl Sink for DiscordSink {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let content = render(event);
        let response = self
            .client
            .post(self.messages_url())
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
            .json(&CreateMessage { content: &content })
            .send()
            .await
            .map_err(|e| SinkError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Send(format!("discord returned {status}: {body}")));
        }

        debug!(id = %event.id, channel = %self.channel_id, "message posted");
        Ok(())
    }
}

/// Render an event as a chat message
///
/// ```text
/// 🌍 **M 6.5 - Near Tokyo, Japan**
/// 📍 Location: 35.6762° N, 139.6503° E
/// 📊 Magnitude: 6.5
/// 🚨 Alert: ORANGE
/// 🕐 Time: 2026-01-15 14:30 UTC
/// 🔗 Source: GDACS
/// ```
pub fn render(event: &Event) -> String {
    let mut msg = format!(
        "{} **{}**\n📍 Location: {:.4}° N, {:.4}° E\n📊 Magnitude: {:.1}",
        category_emoji(event.category),
        event.title,
        event.coordinates.latitude,
        event.coordinates.longitude,
        event.magnitude,
    );

    if event.alert_level != AlertLevel::Unknown {
        msg.push_str(&format!("\n🚨 Alert: {}", event.alert_level));
    }

    let time = event
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    msg.push_str(&format!("\n🕐 Time: {}\n🔗 Source: {}", time, event.source));

    truncate_chars(msg, MAX_CONTENT_CHARS)
}

fn category_emoji(category: Category) -> &'static str {
    match category {
        Category::Earthquake => "🌍",
        Category::Flood | Category::Tsunami => "🌊",
        Category::Wildfire => "🔥",
        Category::Cyclone => "🌀",
        Category::Volcano => "🌋",
        Category::Drought => "☀️",
        Category::Other => "⚠️",
    }
}

fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use disaster_relay_core::Coordinates;

    fn tokyo() -> Event {
        let mut event = Event::new("test-123", Category::Earthquake)
            .with_title("M 6.5 - Near Tokyo, Japan")
            .with_magnitude(6.5)
            .with_alert_level(AlertLevel::Orange);
        event.coordinates = Coordinates {
            latitude: 35.6762,
            longitude: 139.6503,
        };
        event.source = "GDACS".into();
        event.timestamp = Some(Utc.with_ymd_and_hms(2026, 1, 15, 14, 30, 0).unwrap());
        event
    }

    #[test]
    fn render_full_message() {
        let msg = render(&tokyo());
        assert_eq!(
            msg,
            "🌍 **M 6.5 - Near Tokyo, Japan**\n\
             📍 Location: 35.6762° N, 139.6503° E\n\
             📊 Magnitude: 6.5\n\
             🚨 Alert: ORANGE\n\
             🕐 Time: 2026-01-15 14:30 UTC\n\
             🔗 Source: GDACS"
        );
    }

    #[test]
    fn render_omits_unknown_alert() {
        let mut event = tokyo();
        event.alert_level = AlertLevel::Unknown;
        assert!(!render(&event).contains("Alert:"));
    }

    #[test]
    fn render_without_timestamp() {
        let mut event = tokyo();
        event.timestamp = None;
        assert!(render(&event).contains("🕐 Time: unknown"));
    }

    #[test]
    fn every_category_has_an_emoji() {
        for category in Category::ALL {
            assert!(!category_emoji(category).is_empty());
        }
    }

    #[test]
    fn render_caps_length() {
        let event = tokyo().with_title("x".repeat(5000));
        assert_eq!(render(&event).chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn new_rejects_missing_credentials() {
        assert!(matches!(
            DiscordSink::new("", "123", DEFAULT_API_BASE),
            Err(SinkError::Init(_))
        ));
        assert!(matches!(
            DiscordSink::new("token", " ", DEFAULT_API_BASE),
            Err(SinkError::Init(_))
        ));
    }

    #[test]
    fn messages_url_strips_trailing_slash() {
        let sink = DiscordSink::new("token", "42", "http://localhost:8080/api/").unwrap();
        assert_eq!(sink.messages_url(), "http://localhost:8080/api/channels/42/messages");
    }
}
