//! Handshake handling: the only path by which a session acquires a binding.

use pulse_common::protocol::{AuthenticatePayload, ServerEvent};

use super::registry::{BindError, ConnectionRegistry};
use super::session::GatewaySession;

/// Process an `authenticate` payload for `session`.
///
/// Returns the ack or error event to send to this session only, plus whether
/// the roster changed (the caller triggers the presence broadcast).
pub fn handle_authenticate(
    registry: &ConnectionRegistry,
    session: &mut GatewaySession,
    payload: AuthenticatePayload,
) -> (ServerEvent, bool) {
    let user_id = payload.user_id.trim();
    if user_id.is_empty() {
        return (
            ServerEvent::error("A user id is required to authenticate"),
            false,
        );
    }

    match registry.bind(&session.session_id, user_id) {
        Ok(()) => {
            session.set_bound(user_id);
            (ServerEvent::authenticated(user_id), true)
        }
        Err(BindError::AlreadyBound) => {
            (ServerEvent::error("Session is already authenticated"), false)
        }
        Err(BindError::UnknownSession) => (ServerEvent::error("Session is not connected"), false),
    }
}
