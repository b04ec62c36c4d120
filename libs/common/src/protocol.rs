//! Wire-format messages exchanged over the presence gateway.
//!
//! Every frame is a JSON envelope `{ "event": <name>, "data": <payload> }`.
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// A message received from a client over the gateway socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Sent once, immediately after the transport connects.
    Authenticate(AuthenticatePayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatePayload {
    pub user_id: String,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// A message pushed from the server to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Handshake acknowledgement, sent to the authenticating session only.
    Authenticated(AuthenticatedPayload),
    /// Per-session error report. The session stays connected.
    Error(ErrorPayload),
    /// Full online roster snapshot, broadcast to every connected session.
    UpdateConnectedUsers(RosterPayload),
    /// A notification push, sent to the target user's sessions only.
    Notification(NotificationPush),
}

impl ServerEvent {
    /// Build a successful handshake acknowledgement.
    pub fn authenticated(user_id: &str) -> Self {
        Self::Authenticated(AuthenticatedPayload {
            success: true,
            user_id: user_id.to_string(),
        })
    }

    /// Build a per-session error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Build a roster snapshot push.
    pub fn roster(users: Vec<RosterEntry>) -> Self {
        Self::UpdateConnectedUsers(RosterPayload { users })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedPayload {
    pub success: bool,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterPayload {
    pub users: Vec<RosterEntry>,
}

/// One online user in the roster, enriched with display fields.
///
/// Enrichment fields are omitted when the profile lookup failed or returned
/// nothing; a roster entry is never withheld for missing display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<i64>,
    pub connected_at: DateTime<Utc>,
}

impl RosterEntry {
    /// A bare entry carrying only identity and connect time.
    pub fn bare(id: impl Into<String>, connected_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            username: None,
            image: None,
            city: None,
            followers_count: None,
            connected_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// The fixed set of notification types the application emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Message,
    Like,
    Comment,
    CommentLike,
    CommentReply,
}

/// A notification event as submitted by a collaborator action and persisted
/// by the notification store. `data` is an opaque bag referencing the
/// triggering entity (post id, comment id, sender id, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub target_user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl NotificationEvent {
    /// The wire payload pushed to live sessions. The target id is stripped;
    /// the session it arrives on is the target.
    pub fn to_push(&self) -> NotificationPush {
        NotificationPush {
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPush {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub data: Value,
}
