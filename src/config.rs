//! Environment-derived service configuration.

use std::env;

/// Deployment environment, from `APP_ENV`. Defaults to `sandbox`.
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_port: u16,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let http_port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        Self {
            environment: get_environment(),
            http_port,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            http_port: 8080,
        }
    }
}
