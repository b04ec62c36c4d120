pub mod health;
pub mod notifications;
pub mod presence;

use axum::Router;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest(
            "/api/v1",
            presence::router().merge(notifications::router()),
        )
}
