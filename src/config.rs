//! Application-level configuration loaded from the environment at startup.

use std::env;

use tracing::{info, warn};

/// Default shared admin secret accepted when `ADMIN_PASSWORD` is unset.
const DEFAULT_ADMIN_PASSWORD: &str = "change-me-in-production";
/// Default TCP port for the HTTP server.
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Shared secret checked by the login endpoint.
    pub admin_password: String,
    /// Key used to sign admin session tokens.
    pub session_secret: String,
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// MongoDB connection URI; the in-memory backend is used when unset.
    pub mongo_uri: Option<String>,
    /// MongoDB database name override.
    pub mongo_db: Option<String>,
}

impl AppConfig {
    /// Load the configuration from environment variables, logging every
    /// fallback so misconfigured deployments are visible at startup.
    pub fn from_env() -> Self {
        let admin_password = match env::var("ADMIN_PASSWORD") {
            Ok(value) if !value.is_empty() => value,
            _ => {
                warn!("ADMIN_PASSWORD not set; using the default admin password");
                DEFAULT_ADMIN_PASSWORD.to_string()
            }
        };

        // Sessions signed with a secret derived from the password survive a
        // restart only when the operator pins SESSION_SECRET explicitly.
        let session_secret = match env::var("SESSION_SECRET") {
            Ok(value) if !value.is_empty() => value,
            _ => {
                info!("SESSION_SECRET not set; deriving the signing key from the admin password");
                format!("session:{admin_password}")
            }
        };

        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let mongo_uri = env::var("MONGO_URI").ok().filter(|uri| !uri.is_empty());
        let mongo_db = env::var("MONGO_DB").ok().filter(|db| !db.is_empty());
        if mongo_uri.is_none() {
            info!("MONGO_URI not set; teams will be kept in process memory");
        }

        Self {
            admin_password,
            session_secret,
            port,
            mongo_uri,
            mongo_db,
        }
    }

    /// Whether the deployment still runs on the built-in admin password.
    pub fn uses_default_password(&self) -> bool {
        self.admin_password == DEFAULT_ADMIN_PASSWORD
    }
}
