//! Per-connection gateway session state.

use pulse_common::id::{self, prefix};

/// State for a single WebSocket connection.
pub struct GatewaySession {
    /// Unique session identifier (`ses_` prefixed ULID).
    pub session_id: String,
    /// Bound user identity, set at most once by the handshake.
    user_id: Option<String>,
}

impl GatewaySession {
    pub fn new() -> Self {
        Self {
            session_id: id::prefixed_ulid(prefix::SESSION),
            user_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Record the binding locally after the registry accepted it.
    pub fn set_bound(&mut self, user_id: &str) {
        self.user_id = Some(user_id.to_string());
    }
}
