//! Discord sink against an in-process stand-in for the REST API

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use disaster_relay::{AlertLevel, Category, DiscordSink, Event, Sink, SinkError};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;

// =============================================================================
// TEST INFRASTRUCTURE
// =============================================================================

#[derive(Debug, Clone)]
struct Posted {
    channel: String,
    authorization: String,
    content: String,
}

#[derive(Clone)]
struct FakeApi {
    posted: Arc<Mutex<Vec<Posted>>>,
    status: StatusCode,
}

async fn create_message(
    State(api): State<FakeApi>,
    Path(channel): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    api.posted.lock().push(Posted {
        channel,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        content: body["content"].as_str().unwrap_or_default().to_string(),
    });
    (api.status, Json(serde_json::json!({"id": "1"})))
}

async fn start_api(status: StatusCode) -> (SocketAddr, Arc<Mutex<Vec<Posted>>>) {
    let posted = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/v10/channels/:channel/messages", post(create_message))
        .with_state(FakeApi {
            posted: posted.clone(),
            status,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, posted)
}

fn wildfire() -> Event {
    let mut event = Event::new("gdacs-wf-1", Category::Wildfire)
        .with_title("Forest fire in Attica, Greece")
        .with_alert_level(AlertLevel::Red);
    event.source = "GDACS".into();
    event
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn test_posts_rendered_message_as_bot() {
    let (addr, posted) = start_api(StatusCode::OK).await;
    let sink = DiscordSink::new("bot-token", "998877", format!("http://{addr}/api/v10")).unwrap();

    sink.deliver(&wildfire()).await.unwrap();

    let posted = posted.lock();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].channel, "998877");
    assert_eq!(posted[0].authorization, "Bot bot-token");
    assert!(posted[0].content.starts_with("🔥 **Forest fire in Attica, Greece**"));
    assert!(posted[0].content.contains("🚨 Alert: RED"));
    assert!(posted[0].content.contains("🔗 Source: GDACS"));
}

#[tokio::test]
async fn test_error_status_is_send_error() {
    let (addr, posted) = start_api(StatusCode::TOO_MANY_REQUESTS).await;
    let sink = DiscordSink::new("bot-token", "1", format!("http://{addr}/api/v10")).unwrap();

    let err = sink.deliver(&wildfire()).await.unwrap_err();

    match err {
        SinkError::Send(msg) => assert!(msg.contains("429"), "{msg}"),
        other => panic!("expected send error, got {other:?}"),
    }
    assert_eq!(posted.lock().len(), 1);
}

#[tokio::test]
async fn test_unreachable_api_is_connection_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sink = DiscordSink::new("bot-token", "1", format!("http://{addr}")).unwrap();
    let err = sink.deliver(&wildfire()).await.unwrap_err();

    assert!(matches!(err, SinkError::Connection(_)));
}
