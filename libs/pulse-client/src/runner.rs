//! Tokio glue between a transport, the context, and the liveness interval.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time;

use crate::context::{Command, ConnectionState, PresenceContext};
use crate::liveness::{LivenessProbe, LIVENESS_INTERVAL};
use crate::transport::Transport;

/// Drive `context` with events from `transport` until the transport ends or
/// the context fails terminally. The context is shared so the embedding UI
/// can read roster/notification state concurrently.
pub async fn run(
    context: Arc<Mutex<PresenceContext>>,
    mut transport: impl Transport,
    probe: Arc<dyn LivenessProbe>,
) {
    let mut liveness = time::interval(LIVENESS_INTERVAL);
    liveness.tick().await; // First tick fires immediately; skip it.

    loop {
        tokio::select! {
            event = transport.next_event() => {
                let Some(event) = event else { break };

                let commands = context.lock().handle_event(event);
                for command in commands {
                    match command {
                        Command::Send(client_event) => {
                            if let Err(err) = transport.send(&client_event).await {
                                tracing::warn!(%err, "transport send failed");
                            }
                        }
                    }
                }

                if context.lock().state() == ConnectionState::Failed {
                    tracing::warn!("realtime connection lost, giving up until restart");
                    break;
                }
            }

            _ = liveness.tick() => {
                if context.lock().wants_liveness() {
                    if let Err(err) = probe.ping().await {
                        tracing::debug!(%err, "liveness ping failed");
                    }
                }
            }
        }
    }
}
