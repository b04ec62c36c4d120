//! Transport seam between the presence context and the realtime channel.

use std::time::Duration;

use async_trait::async_trait;
use pulse_common::protocol::{ClientEvent, ServerEvent};

/// Reconnection policy handed to the transport implementation. The context
/// never retries on its own; it only reacts to the lifecycle events the
/// transport reports while executing this policy.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Attempts before the transport gives up and reports exhaustion.
    /// Zero disables reconnection entirely.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(3),
        }
    }
}

impl ReconnectPolicy {
    pub fn enabled(&self) -> bool {
        self.max_attempts > 0
    }
}

/// Lifecycle and message events reported by the transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The connection (or a reconnection) is up.
    Opened,
    /// The connection dropped; the transport retries per its policy.
    Closed,
    /// All reconnection attempts failed.
    ReconnectExhausted,
    /// A server frame arrived.
    Message(ServerEvent),
}

#[derive(Debug)]
pub struct TransportError(pub String);

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// An async duplex transport (a WebSocket in production, scripted in tests).
#[async_trait]
pub trait Transport: Send {
    /// The next lifecycle or message event; `None` when the transport is done.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Send a client frame. A failed send is logged by the runner; recovery
    /// comes from the transport lifecycle, not from retrying the write.
    async fn send(&mut self, event: &ClientEvent) -> Result<(), TransportError>;
}
