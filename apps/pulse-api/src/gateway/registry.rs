//! Authoritative registry of gateway sessions and their identity bindings.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Why a `bind` call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// The session id does not correspond to a connected session.
    UnknownSession,
    /// The session already carries a binding. A session's identity is
    /// immutable; it must reconnect to bind a different one.
    AlreadyBound,
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::UnknownSession => write!(f, "session is not connected"),
            BindError::AlreadyBound => write!(f, "session is already bound"),
        }
    }
}

impl std::error::Error for BindError {}

struct SessionInfo {
    connected_at: DateTime<Utc>,
    user_id: Option<String>,
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<String, SessionInfo>,
    by_user: HashMap<String, HashSet<String>>,
}

impl Inner {
    /// Remove a session's binding from both indexes. Returns whether a
    /// binding was actually removed.
    fn unbind(&mut self, session_id: &str) -> bool {
        let Some(info) = self.sessions.get_mut(session_id) else {
            return false;
        };
        let Some(user_id) = info.user_id.take() else {
            return false;
        };
        if let Some(set) = self.by_user.get_mut(&user_id) {
            set.remove(session_id);
            if set.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
        true
    }
}

/// Session ↔ identity bindings plus the reverse index.
///
/// Both maps live behind one mutex: a bind must never be observable with the
/// session map updated but the reverse index not.
pub struct ConnectionRegistry {
    inner: Mutex<Inner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a freshly connected, unbound session.
    pub fn connect(&self, session_id: &str) {
        let mut inner = self.inner.lock();
        inner.sessions.insert(
            session_id.to_string(),
            SessionInfo {
                connected_at: Utc::now(),
                user_id: None,
            },
        );
    }

    /// Bind a connected session to a user identity. Succeeds at most once per
    /// session; rebinding is rejected with the registry unchanged.
    pub fn bind(&self, session_id: &str, user_id: &str) -> Result<(), BindError> {
        let mut inner = self.inner.lock();
        {
            let info = inner
                .sessions
                .get_mut(session_id)
                .ok_or(BindError::UnknownSession)?;
            if info.user_id.is_some() {
                return Err(BindError::AlreadyBound);
            }
            info.user_id = Some(user_id.to_string());
        }
        inner
            .by_user
            .entry(user_id.to_string())
            .or_default()
            .insert(session_id.to_string());
        Ok(())
    }

    /// Remove a session's binding. Safe to call for unbound or unknown
    /// sessions. Returns whether a binding was removed.
    pub fn unbind(&self, session_id: &str) -> bool {
        self.inner.lock().unbind(session_id)
    }

    /// Drop the session entirely on transport disconnect. Returns whether the
    /// session carried a binding.
    pub fn disconnect(&self, session_id: &str) -> bool {
        let mut inner = self.inner.lock();
        let was_bound = inner.unbind(session_id);
        inner.sessions.remove(session_id);
        was_bound
    }

    /// Session ids currently bound to `user_id`; empty when none online.
    pub fn sessions_for(&self, user_id: &str) -> HashSet<String> {
        self.inner
            .lock()
            .by_user
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Distinct user identities with at least one bound session.
    pub fn all_online_user_ids(&self) -> Vec<String> {
        self.inner.lock().by_user.keys().cloned().collect()
    }

    /// Distinct online identities with the earliest connect time across each
    /// identity's sessions, sorted by user id for stable roster output.
    pub fn online_snapshot(&self) -> Vec<(String, DateTime<Utc>)> {
        let inner = self.inner.lock();
        let mut snapshot: Vec<(String, DateTime<Utc>)> = inner
            .by_user
            .iter()
            .map(|(user_id, session_ids)| {
                let connected_at = session_ids
                    .iter()
                    .filter_map(|sid| inner.sessions.get(sid))
                    .map(|info| info.connected_at)
                    .min()
                    .unwrap_or_else(Utc::now);
                (user_id.clone(), connected_at)
            })
            .collect();
        snapshot.sort_by(|a, b| a.0.cmp(&b.0));
        snapshot
    }

    /// Number of connected sessions, bound or not.
    pub fn connected_sessions(&self) -> usize {
        self.inner.lock().sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_sessions(ids: &[&str]) -> ConnectionRegistry {
        let registry = ConnectionRegistry::new();
        for id in ids {
            registry.connect(id);
        }
        registry
    }

    #[test]
    fn bind_requires_connected_session() {
        let registry = ConnectionRegistry::new();
        assert_eq!(
            registry.bind("ses_missing", "u1"),
            Err(BindError::UnknownSession)
        );
        assert!(registry.all_online_user_ids().is_empty());
    }

    #[test]
    fn bind_adds_user_to_online_set() {
        let registry = registry_with_sessions(&["s1"]);
        registry.bind("s1", "u1").unwrap();

        assert_eq!(registry.all_online_user_ids(), vec!["u1".to_string()]);
        assert!(registry.sessions_for("u1").contains("s1"));
    }

    #[test]
    fn rebind_is_rejected_and_state_unchanged() {
        let registry = registry_with_sessions(&["s1"]);
        registry.bind("s1", "u1").unwrap();

        assert_eq!(registry.bind("s1", "u2"), Err(BindError::AlreadyBound));
        assert_eq!(registry.all_online_user_ids(), vec!["u1".to_string()]);
        assert!(registry.sessions_for("u2").is_empty());
        assert!(registry.sessions_for("u1").contains("s1"));
    }

    #[test]
    fn unbind_is_idempotent() {
        let registry = registry_with_sessions(&["s1"]);
        registry.bind("s1", "u1").unwrap();

        assert!(registry.unbind("s1"));
        assert!(!registry.unbind("s1"));
        assert!(registry.all_online_user_ids().is_empty());
        assert!(registry.sessions_for("u1").is_empty());
    }

    #[test]
    fn unbind_never_bound_is_a_noop() {
        let registry = registry_with_sessions(&["s1"]);
        assert!(!registry.unbind("s1"));
        assert!(!registry.unbind("ses_unknown"));
        assert_eq!(registry.connected_sessions(), 1);
    }

    #[test]
    fn multi_tab_user_stays_online_until_last_session_leaves() {
        let registry = registry_with_sessions(&["s1", "s2"]);
        registry.bind("s1", "u1").unwrap();
        registry.bind("s2", "u1").unwrap();

        assert_eq!(registry.sessions_for("u1").len(), 2);

        registry.disconnect("s1");
        assert_eq!(registry.all_online_user_ids(), vec!["u1".to_string()]);
        assert_eq!(registry.sessions_for("u1").len(), 1);

        registry.disconnect("s2");
        assert!(registry.all_online_user_ids().is_empty());
        assert_eq!(registry.connected_sessions(), 0);
    }

    #[test]
    fn disconnect_unknown_session_is_safe() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.disconnect("ses_unknown"));
    }

    #[test]
    fn online_set_matches_bound_sessions_after_any_sequence() {
        let registry = registry_with_sessions(&["s1", "s2", "s3", "s4"]);
        registry.bind("s1", "u1").unwrap();
        registry.bind("s2", "u2").unwrap();
        registry.bind("s3", "u2").unwrap();
        registry.unbind("s1");
        registry.disconnect("s3");
        // s4 stays connected but never binds.

        let mut online = registry.all_online_user_ids();
        online.sort();
        assert_eq!(online, vec!["u2".to_string()]);
        assert_eq!(registry.sessions_for("u2").len(), 1);
        assert_eq!(registry.connected_sessions(), 3);
    }

    #[test]
    fn snapshot_lists_each_user_once_sorted() {
        let registry = registry_with_sessions(&["s1", "s2", "s3"]);
        registry.bind("s1", "u2").unwrap();
        registry.bind("s2", "u1").unwrap();
        registry.bind("s3", "u2").unwrap();

        let snapshot = registry.online_snapshot();
        let ids: Vec<&str> = snapshot.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(snapshot.iter().all(|(_, at)| *at <= Utc::now()));
    }
}
