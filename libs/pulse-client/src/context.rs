//! The presence state machine: one instance per tab / embedding process.

use std::collections::VecDeque;

use pulse_common::protocol::{
    AuthenticatePayload, ClientEvent, NotificationPush, RosterEntry, ServerEvent,
};

use crate::transport::{ReconnectPolicy, TransportEvent};

/// How many notifications are kept for immediate display. The full history
/// lives in the notification store, not here.
const NOTIFICATION_BUFFER: usize = 10;

/// Connection lifecycle of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport yet (initial).
    Disconnected,
    /// Transport up, handshake not yet acknowledged.
    Unauthenticated,
    /// Handshake acknowledged; only now is this client eligible to appear in
    /// the roster.
    Authenticated,
    /// Transport dropped; the transport's retry policy is running.
    Reconnecting,
    /// Retries exhausted. Terminal until a manual restart.
    Failed,
}

/// A command the runner must execute against the transport.
#[derive(Debug, Clone)]
pub enum Command {
    Send(ClientEvent),
}

pub struct PresenceContext {
    user_id: String,
    policy: ReconnectPolicy,
    state: ConnectionState,
    roster: Vec<RosterEntry>,
    notifications: VecDeque<NotificationPush>,
    last_error: Option<String>,
}

impl PresenceContext {
    pub fn new(user_id: &str, policy: ReconnectPolicy) -> Self {
        Self {
            user_id: user_id.to_string(),
            policy,
            state: ConnectionState::Disconnected,
            roster: Vec::new(),
            notifications: VecDeque::new(),
            last_error: None,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Latest roster snapshot pushed by the server.
    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.roster.iter().any(|entry| entry.id == user_id)
    }

    /// The most recent notifications, oldest first.
    pub fn notifications(&self) -> &VecDeque<NotificationPush> {
        &self.notifications
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the periodic liveness ping should fire right now.
    pub fn wants_liveness(&self) -> bool {
        self.state == ConnectionState::Authenticated
    }

    /// Advance the state machine with a transport event. Returns the
    /// commands the runner must execute.
    pub fn handle_event(&mut self, event: TransportEvent) -> Vec<Command> {
        match event {
            TransportEvent::Opened => {
                // Every (re)connect is a brand-new server session: handshake
                // again, unconditionally.
                self.state = ConnectionState::Unauthenticated;
                vec![Command::Send(ClientEvent::Authenticate(
                    AuthenticatePayload {
                        user_id: self.user_id.clone(),
                    },
                ))]
            }
            TransportEvent::Closed => {
                self.roster.clear();
                self.state = if self.policy.enabled() {
                    ConnectionState::Reconnecting
                } else {
                    ConnectionState::Failed
                };
                Vec::new()
            }
            TransportEvent::ReconnectExhausted => {
                self.state = ConnectionState::Failed;
                Vec::new()
            }
            TransportEvent::Message(message) => {
                self.handle_server_event(message);
                Vec::new()
            }
        }
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Authenticated(payload) if payload.success => {
                self.state = ConnectionState::Authenticated;
                self.last_error = None;
            }
            ServerEvent::Authenticated(_) => {
                // Explicit rejection: stay connected but unauthenticated.
            }
            ServerEvent::Error(payload) => {
                self.last_error = Some(payload.message);
            }
            ServerEvent::UpdateConnectedUsers(payload) => {
                self.roster = payload.users;
            }
            ServerEvent::Notification(push) => {
                self.notifications.push_back(push);
                while self.notifications.len() > NOTIFICATION_BUFFER {
                    self.notifications.pop_front();
                }
            }
        }
    }
}
