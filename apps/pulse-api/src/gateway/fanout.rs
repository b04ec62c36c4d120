//! Live notification fan-out to a target user's connected sessions.

use std::sync::Arc;

use pulse_common::protocol::NotificationEvent;

use crate::collab::notifications::NotificationStore;

use super::broadcast::{BroadcastPayload, GatewayBroadcast};
use super::registry::ConnectionRegistry;

pub struct NotificationFanout {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn NotificationStore>,
    hub: GatewayBroadcast,
}

impl NotificationFanout {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn NotificationStore>,
        hub: GatewayBroadcast,
    ) -> Self {
        Self {
            registry,
            store,
            hub,
        }
    }

    /// Push `event` to every session currently bound to the target user and
    /// hand it to the notification store. Returns the number of sessions the
    /// live push was addressed to; zero is not an error. Repeated calls for
    /// the same logical event push repeatedly; dedup is the caller's job.
    pub async fn deliver(&self, event: &NotificationEvent) -> usize {
        let session_ids = self.registry.sessions_for(&event.target_user_id);
        let targeted = session_ids.len();

        if targeted > 0 {
            self.hub.dispatch(BroadcastPayload::Notification {
                session_ids,
                push: event.to_push(),
            });
        } else {
            tracing::debug!(
                target_user_id = %event.target_user_id,
                "no live sessions for notification, skipping push"
            );
        }

        if let Err(err) = self.store.persist(event).await {
            tracing::warn!(
                target_user_id = %event.target_user_id,
                ?err,
                "notification persist failed"
            );
        }

        targeted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::notifications::MemoryNotificationStore;
    use pulse_common::protocol::NotificationKind;
    use serde_json::json;

    fn follow_event(target: &str) -> NotificationEvent {
        NotificationEvent {
            target_user_id: target.to_string(),
            kind: NotificationKind::Follow,
            title: "New follower".to_string(),
            message: "ada started following you".to_string(),
            data: json!({ "senderId": "u2" }),
        }
    }

    fn fanout_with_bindings(
        bindings: &[(&str, &str)],
    ) -> (NotificationFanout, Arc<MemoryNotificationStore>, GatewayBroadcast) {
        let registry = Arc::new(ConnectionRegistry::new());
        for (session_id, user_id) in bindings {
            registry.connect(session_id);
            registry.bind(session_id, user_id).unwrap();
        }
        let store = Arc::new(MemoryNotificationStore::new());
        let hub = GatewayBroadcast::new();
        let fanout = NotificationFanout::new(registry, store.clone(), hub.clone());
        (fanout, store, hub)
    }

    #[tokio::test]
    async fn targets_every_session_of_the_user() {
        let (fanout, store, hub) = fanout_with_bindings(&[("s1", "u1"), ("s2", "u1"), ("s3", "u2")]);
        let mut rx = hub.subscribe();

        let delivered = fanout.deliver(&follow_event("u1")).await;
        assert_eq!(delivered, 2);

        let payload = rx.recv().await.unwrap();
        match payload.as_ref() {
            BroadcastPayload::Notification { session_ids, push } => {
                assert!(session_ids.contains("s1"));
                assert!(session_ids.contains("s2"));
                assert!(!session_ids.contains("s3"));
                assert_eq!(push.kind, NotificationKind::Follow);
            }
            other => panic!("expected notification payload, got {other:?}"),
        }

        assert_eq!(store.persisted().len(), 1);
    }

    #[tokio::test]
    async fn offline_target_persists_without_a_push() {
        let (fanout, store, hub) = fanout_with_bindings(&[("s1", "u1")]);
        let mut rx = hub.subscribe();

        let delivered = fanout.deliver(&follow_event("u_offline")).await;
        assert_eq!(delivered, 0);

        assert!(rx.try_recv().is_err());
        assert_eq!(store.persisted().len(), 1);
        assert_eq!(store.persisted()[0].target_user_id, "u_offline");
    }

    #[tokio::test]
    async fn repeated_delivery_pushes_repeatedly() {
        let (fanout, store, hub) = fanout_with_bindings(&[("s1", "u1")]);
        let mut rx = hub.subscribe();

        let event = follow_event("u1");
        fanout.deliver(&event).await;
        fanout.deliver(&event).await;

        assert!(rx.recv().await.is_ok());
        assert!(rx.recv().await.is_ok());
        assert_eq!(store.persisted().len(), 2);
    }
}
