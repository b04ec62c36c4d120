//! Periodic liveness signal, independent of the realtime transport.
//!
//! Server-side "last seen" bookkeeping must stay fresh even when the
//! realtime channel has degraded, so this goes over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;

/// Fixed interval between liveness pings while authenticated.
pub const LIVENESS_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct ProbeError(pub String);

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "liveness probe error: {}", self.0)
    }
}

impl std::error::Error for ProbeError {}

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn ping(&self) -> Result<(), ProbeError>;
}

/// Probe hitting the presence ping endpoint.
pub struct HttpLivenessProbe {
    url: String,
    user_id: String,
    http: reqwest::Client,
}

impl HttpLivenessProbe {
    pub fn new(base_url: &str, user_id: &str) -> Self {
        Self {
            url: format!("{}/api/v1/presence/ping", base_url.trim_end_matches('/')),
            user_id: user_id.to_string(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LivenessProbe for HttpLivenessProbe {
    async fn ping(&self) -> Result<(), ProbeError> {
        self.http
            .post(&self.url)
            .json(&serde_json::json!({ "userId": self.user_id }))
            .send()
            .await
            .map_err(|e| ProbeError(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProbeError(e.to_string()))?;
        Ok(())
    }
}
