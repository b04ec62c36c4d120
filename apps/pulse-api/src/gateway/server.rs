//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use pulse_common::protocol::{ClientEvent, ServerEvent};
use tokio::sync::broadcast;

use crate::AppState;

use super::broadcast::BroadcastPayload;
use super::handler::handle_authenticate;
use super::session::GatewaySession;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let mut session = GatewaySession::new();
    state.registry.connect(&session.session_id);

    tracing::info!(session_id = %session.session_id, "gateway session connected");

    // Subscribe before entering the loop so no roster push is missed.
    let broadcast_rx = state.broadcast.subscribe();
    run_session(&mut session, socket, broadcast_rx, &state).await;

    state.registry.disconnect(&session.session_id);

    tracing::info!(
        session_id = %session.session_id,
        user_id = session.user_id().unwrap_or("-"),
        "gateway session ended"
    );

    // Remaining sessions see the post-disconnect roster.
    state.presence.broadcast_roster().await;
}

/// Main session event loop: read client messages, forward hub payloads.
///
/// There is deliberately no handshake deadline: a session that never
/// authenticates stays connected and simply never enters the roster.
async fn run_session(
    session: &mut GatewaySession,
    socket: WebSocket,
    mut broadcast_rx: broadcast::Receiver<Arc<BroadcastPayload>>,
    state: &AppState,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event = match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => event,
                            Err(_) => {
                                // Malformed frames get an error reply; the session stays connected.
                                let reply = ServerEvent::error("Malformed gateway message");
                                if send_event(&mut ws_tx, &reply).await.is_err() {
                                    break;
                                }
                                continue;
                            }
                        };

                        match event {
                            ClientEvent::Authenticate(payload) => {
                                let (reply, roster_changed) =
                                    handle_authenticate(&state.registry, session, payload);
                                if send_event(&mut ws_tx, &reply).await.is_err() {
                                    break;
                                }
                                if roster_changed {
                                    tracing::info!(
                                        session_id = %session.session_id,
                                        user_id = session.user_id().unwrap_or("-"),
                                        "gateway session authenticated"
                                    );
                                    state.presence.broadcast_roster().await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, session_id = %session.session_id, "ws read error");
                        break;
                    }
                    _ => continue,
                }
            }

            // Payload from the broadcast hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        let event = match payload.as_ref() {
                            BroadcastPayload::Roster(users) => ServerEvent::roster(users.clone()),
                            BroadcastPayload::Notification { session_ids, push } => {
                                if !session_ids.contains(&session.session_id) {
                                    continue;
                                }
                                ServerEvent::Notification(push.clone())
                            }
                        };
                        if send_event(&mut ws_tx, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            session_id = %session.session_id,
                            skipped = n,
                            "gateway session lagged behind broadcast"
                        );
                        // Continue; the next roster push is a full snapshot anyway.
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        }
    }
}

/// Serialize and send a single event frame.
async fn send_event(
    ws_tx: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).unwrap();
    ws_tx.send(Message::Text(json.into())).await
}
