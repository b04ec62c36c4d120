//! Last-seen bookkeeping behind the liveness ping endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::ApiError;

/// Records that a user was recently active, independent of the gateway.
#[async_trait]
pub trait LastSeenRecorder: Send + Sync {
    async fn touch(&self, user_id: &str) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Recorder backed by the main application's internal API.
pub struct HttpLastSeenRecorder {
    app_url: String,
    http: reqwest::Client,
}

impl HttpLastSeenRecorder {
    pub fn new(app_url: &str) -> Self {
        Self {
            app_url: app_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LastSeenRecorder for HttpLastSeenRecorder {
    async fn touch(&self, user_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/internal/api/users/{}/last-seen", self.app_url, user_id);
        self.http.post(&url).send().await?.error_for_status()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests)
// ---------------------------------------------------------------------------

pub struct MemoryLastSeenRecorder {
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl MemoryLastSeenRecorder {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn last_seen(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.seen.lock().get(user_id).copied()
    }
}

#[async_trait]
impl LastSeenRecorder for MemoryLastSeenRecorder {
    async fn touch(&self, user_id: &str) -> Result<(), ApiError> {
        self.seen.lock().insert(user_id.to_string(), Utc::now());
        Ok(())
    }
}
