use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_api::collab::last_seen::{HttpLastSeenRecorder, LastSeenRecorder};
use pulse_api::collab::notifications::{HttpNotificationStore, NotificationStore};
use pulse_api::collab::profiles::{HttpProfileDirectory, ProfileDirectory};
use pulse_api::config::Config;
use pulse_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    // All three collaborator seams point at the main web application.
    let profiles: Arc<dyn ProfileDirectory> = Arc::new(HttpProfileDirectory::new(&config.app_url));
    let notifications: Arc<dyn NotificationStore> =
        Arc::new(HttpNotificationStore::new(&config.app_url));
    let last_seen: Arc<dyn LastSeenRecorder> = Arc::new(HttpLastSeenRecorder::new(&config.app_url));

    tracing::info!(app_url = %config.app_url, "pulse-api configured");

    let state = AppState::new(config, profiles, notifications, last_seen);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(pulse_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "pulse-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
