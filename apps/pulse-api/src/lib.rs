pub mod collab;
pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;

use std::sync::Arc;

use collab::last_seen::LastSeenRecorder;
use collab::notifications::NotificationStore;
use collab::profiles::ProfileDirectory;
use config::Config;
use gateway::broadcast::GatewayBroadcast;
use gateway::fanout::NotificationFanout;
use gateway::presence::PresenceBroadcaster;
use gateway::registry::ConnectionRegistry;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcast: Arc<GatewayBroadcast>,
    pub presence: Arc<PresenceBroadcaster>,
    pub fanout: Arc<NotificationFanout>,
    pub last_seen: Arc<dyn LastSeenRecorder>,
}

impl AppState {
    /// Wire the component graph around a fresh registry and broadcast hub.
    pub fn new(
        config: Config,
        profiles: Arc<dyn ProfileDirectory>,
        notifications: Arc<dyn NotificationStore>,
        last_seen: Arc<dyn LastSeenRecorder>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = GatewayBroadcast::new();
        let presence = Arc::new(PresenceBroadcaster::new(
            registry.clone(),
            profiles,
            hub.clone(),
        ));
        let fanout = Arc::new(NotificationFanout::new(
            registry.clone(),
            notifications,
            hub.clone(),
        ));
        Self {
            config: Arc::new(config),
            registry,
            broadcast: Arc::new(hub),
            presence,
            fanout,
            last_seen,
        }
    }
}
