//! Server and session configuration types.

use serde::Deserialize;

/// Minimum session secret length, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the HTTP listener.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Directory holding the static pages.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
            static_dir: "./static".to_string(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Secret used to sign session cookies.
    ///
    /// When unset, a random key is generated at startup and sessions do not
    /// survive a restart.
    pub secret_key: Option<String>,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            cookie_name: "session".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("session secret must be at least {min} bytes, got {0}", min = MIN_SECRET_KEY_LEN)]
    WeakSecret(usize),

    #[error("session cookie name must not be empty")]
    EmptyCookieName,

    #[error("unknown storage type: {0}")]
    UnknownStorage(String),
}
