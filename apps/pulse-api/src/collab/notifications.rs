//! Durable notification storage behind the fan-out.

use async_trait::async_trait;
use parking_lot::Mutex;
use pulse_common::protocol::NotificationEvent;

use crate::error::ApiError;

/// Write seam for persisted notifications. Live gateway delivery and this
/// store are not transactionally linked; a persist failure is logged by the
/// caller and never retried here.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn persist(&self, event: &NotificationEvent) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Store backed by the main application's internal notification API.
pub struct HttpNotificationStore {
    app_url: String,
    http: reqwest::Client,
}

impl HttpNotificationStore {
    pub fn new(app_url: &str) -> Self {
        Self {
            app_url: app_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationStore for HttpNotificationStore {
    async fn persist(&self, event: &NotificationEvent) -> Result<(), ApiError> {
        let url = format!("{}/internal/api/notifications", self.app_url);
        self.http
            .post(&url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests)
// ---------------------------------------------------------------------------

pub struct MemoryNotificationStore {
    events: Mutex<Vec<NotificationEvent>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Everything persisted so far, in arrival order.
    pub fn persisted(&self) -> Vec<NotificationEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn persist(&self, event: &NotificationEvent) -> Result<(), ApiError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
