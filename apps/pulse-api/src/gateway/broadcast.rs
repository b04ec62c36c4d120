//! Broadcast hub for pushing gateway events to connected sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connected session
//! subscribes and filters payloads locally: roster snapshots go to every
//! session, notification payloads only to the sessions they name. A session
//! write happens on that session's own task, so a registry mutation never
//! waits on socket I/O.

use std::collections::HashSet;
use std::sync::Arc;

use pulse_common::protocol::{NotificationPush, RosterEntry};
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// A payload broadcast to all connected gateway sessions.
#[derive(Debug, Clone)]
pub enum BroadcastPayload {
    /// Full roster snapshot for every session, bound or not.
    Roster(Vec<RosterEntry>),
    /// A notification addressed to the sessions named in `session_ids`.
    Notification {
        session_ids: HashSet<String>,
        push: NotificationPush,
    },
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct GatewayBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl GatewayBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each gateway session should call
    /// this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Dispatch a payload to all connected sessions.
    pub fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }
}
