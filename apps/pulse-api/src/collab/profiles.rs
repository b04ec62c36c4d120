//! User profile lookups for roster enrichment.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::ApiError;

/// Display fields for one user, as served by the profile API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub followers_count: i64,
}

/// Read seam used by the presence broadcaster. A failed lookup degrades the
/// roster entry; it never fails a broadcast.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Profile directory backed by the main application's internal API.
pub struct HttpProfileDirectory {
    app_url: String,
    http: reqwest::Client,
}

impl HttpProfileDirectory {
    pub fn new(app_url: &str) -> Self {
        Self {
            app_url: app_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ProfileDirectory for HttpProfileDirectory {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, ApiError> {
        let url = format!("{}/internal/api/users/{}/profile", self.app_url, user_id);
        let resp = self.http.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let profile = resp.error_for_status()?.json::<UserProfile>().await?;
        Ok(Some(profile))
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests)
// ---------------------------------------------------------------------------

pub struct MemoryProfileDirectory {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryProfileDirectory {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, user_id: &str, profile: UserProfile) {
        self.profiles.lock().insert(user_id.to_string(), profile);
    }
}

#[async_trait]
impl ProfileDirectory for MemoryProfileDirectory {
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, ApiError> {
        Ok(self.profiles.lock().get(user_id).cloned())
    }
}
