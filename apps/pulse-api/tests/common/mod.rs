use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time;
use tokio_tungstenite::tungstenite;

use pulse_api::collab::last_seen::MemoryLastSeenRecorder;
use pulse_api::collab::notifications::MemoryNotificationStore;
use pulse_api::collab::profiles::{MemoryProfileDirectory, UserProfile};
use pulse_api::config::Config;
use pulse_api::AppState;

/// Handles to the in-memory collaborators behind a test AppState.
pub struct TestCollaborators {
    pub profiles: Arc<MemoryProfileDirectory>,
    pub notifications: Arc<MemoryNotificationStore>,
    pub last_seen: Arc<MemoryLastSeenRecorder>,
}

/// Build an AppState wired to in-memory collaborators.
pub fn test_state() -> (AppState, TestCollaborators) {
    let profiles = Arc::new(MemoryProfileDirectory::new());
    let notifications = Arc::new(MemoryNotificationStore::new());
    let last_seen = Arc::new(MemoryLastSeenRecorder::new());

    let config = Config {
        app_url: "http://127.0.0.1:0".to_string(),
        port: 0,
    };
    let state = AppState::new(
        config,
        profiles.clone(),
        notifications.clone(),
        last_seen.clone(),
    );

    (
        state,
        TestCollaborators {
            profiles,
            notifications,
            last_seen,
        },
    )
}

/// Start an actual TCP server for WebSocket + HTTP testing.
/// Returns (addr, state, collaborators). The server runs in the background.
pub async fn start_server() -> (SocketAddr, AppState, TestCollaborators) {
    let (state, collab) = test_state();
    let app = pulse_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state, collab)
}

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Open a gateway WebSocket connection.
pub async fn connect_gateway(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/gateway");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws_stream
}

/// Send an `authenticate` frame.
pub async fn send_authenticate(ws: &mut WsStream, user_id: &str) {
    let frame = serde_json::json!({
        "event": "authenticate",
        "data": { "userId": user_id }
    });
    ws.send(tungstenite::Message::Text(frame.to_string().into()))
        .await
        .expect("send authenticate");
}

/// Read the next text frame as JSON, with a timeout.
pub async fn next_json(ws: &mut WsStream) -> serde_json::Value {
    let msg = time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout waiting for frame")
        .expect("stream ended")
        .expect("ws read error");
    let text = msg.into_text().expect("not text");
    serde_json::from_str(&text).expect("parse frame")
}

/// Assert that no frame arrives within a short window.
pub async fn assert_no_frame(ws: &mut WsStream) {
    let result = time::timeout(Duration::from_millis(300), ws.next()).await;
    assert!(result.is_err(), "expected no frame, got {result:?}");
}

/// Consume `count` roster pushes, returning the last one.
pub async fn drain_rosters(ws: &mut WsStream, count: usize) -> serde_json::Value {
    let mut last = serde_json::Value::Null;
    for _ in 0..count {
        last = next_json(ws).await;
        assert_eq!(last["event"], "update_connected_users");
    }
    last
}

/// Connect, authenticate, and consume the ack plus the first roster push.
pub async fn connect_and_authenticate(addr: SocketAddr, user_id: &str) -> WsStream {
    let mut ws = connect_gateway(addr).await;
    send_authenticate(&mut ws, user_id).await;

    let ack = next_json(&mut ws).await;
    assert_eq!(ack["event"], "authenticated");
    assert_eq!(ack["data"]["success"], true);
    assert_eq!(ack["data"]["userId"], user_id);

    drain_rosters(&mut ws, 1).await;

    ws
}

/// A profile with the given display name and follower count.
pub fn profile(username: &str, followers: i64) -> UserProfile {
    UserProfile {
        username: username.to_string(),
        image: Some(format!("https://cdn.example/{username}.png")),
        city: Some("Lisbon".to_string()),
        followers_count: followers,
    }
}

/// User ids appearing in a roster frame.
pub fn roster_ids(frame: &serde_json::Value) -> Vec<String> {
    frame["data"]["users"]
        .as_array()
        .expect("users array")
        .iter()
        .map(|u| u["id"].as_str().expect("user id").to_string())
        .collect()
}
