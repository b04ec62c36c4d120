/// Pulse API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the main web application (e.g. `http://localhost:3000`),
    /// which serves the internal profile, notification, and last-seen APIs.
    pub app_url: String,
    /// Port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            app_url: required_var("APP_URL"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4003),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}
