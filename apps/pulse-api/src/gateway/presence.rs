//! Full-roster presence broadcasting.
//!
//! On every registry mutation the complete online roster is recomputed and
//! pushed to every connected session, bound or not. Always the full
//! snapshot, never a delta.

use std::sync::Arc;

use futures_util::future;
use pulse_common::protocol::RosterEntry;

use crate::collab::profiles::ProfileDirectory;

use super::broadcast::{BroadcastPayload, GatewayBroadcast};
use super::registry::ConnectionRegistry;

pub struct PresenceBroadcaster {
    registry: Arc<ConnectionRegistry>,
    profiles: Arc<dyn ProfileDirectory>,
    hub: GatewayBroadcast,
}

impl PresenceBroadcaster {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        profiles: Arc<dyn ProfileDirectory>,
        hub: GatewayBroadcast,
    ) -> Self {
        Self {
            registry,
            profiles,
            hub,
        }
    }

    /// Recompute the roster and push it to every connected session.
    pub async fn broadcast_roster(&self) {
        let roster = self.current_roster().await;
        self.hub.dispatch(BroadcastPayload::Roster(roster));
    }

    /// The enriched roster as of now. Shared with the HTTP presence query.
    ///
    /// A failed profile lookup degrades that entry to `{ id, connectedAt }`;
    /// it never drops the user or fails the roster.
    pub async fn current_roster(&self) -> Vec<RosterEntry> {
        let snapshot = self.registry.online_snapshot();
        let fetches = snapshot.into_iter().map(|(user_id, connected_at)| async move {
            let mut entry = RosterEntry::bare(user_id.as_str(), connected_at);
            match self.profiles.profile(&user_id).await {
                Ok(Some(profile)) => {
                    entry.username = Some(profile.username);
                    entry.image = profile.image;
                    entry.city = profile.city;
                    entry.followers_count = Some(profile.followers_count);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%user_id, ?err, "profile lookup failed, sending bare roster entry");
                }
            }
            entry
        });
        future::join_all(fetches).await
    }
}
