//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod server;

pub use server::{ConfigError, ServerConfig, SessionConfig, MIN_SECRET_KEY_LEN};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "STARTUP_PROFIT_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "STARTUP_PROFIT";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "STARTUP_PROFIT_LOG";
/// Unprefixed environment variable for the session secret.
pub const SECRET_KEY_ENV_VAR: &str = "SECRET_KEY";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Model artifact locations.
    pub model: ModelConfig,
    /// Prediction behaviour.
    pub prediction: PredictionConfig,
    /// Session cookie configuration.
    pub session: SessionConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type (sqlite).
    #[serde(rename = "type")]
    pub storage_type: String,
    /// Path to database file.
    pub path: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: "sqlite".to_string(),
            path: "./data/users.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Locations of the trained model and its feature schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Linear regression parameters (JSON).
    pub model_path: String,
    /// Ordered feature columns (JSON, `{"data_columns": [...]}`).
    pub columns_path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/startup_profit_prediction_lr_model.json".to_string(),
            columns_path: "./models/columns.json".to_string(),
        }
    }
}

/// Prediction behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Reject states with no indicator column instead of zero-filling them.
    pub strict_state: bool,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    ///
    /// `SECRET_KEY` fills in the session secret when nothing else set it.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;
        if config.session.secret_key.is_none() {
            config.session.secret_key = std::env::var(SECRET_KEY_ENV_VAR).ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.session.secret_key {
            if secret.len() < MIN_SECRET_KEY_LEN {
                return Err(ConfigError::WeakSecret(secret.len()));
            }
        }

        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::EmptyCookieName);
        }

        if self.storage.storage_type != "sqlite" {
            return Err(ConfigError::UnknownStorage(self.storage.storage_type.clone()));
        }

        Ok(())
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        let mut config = Self::default();
        config.storage.path = crate::storage::IN_MEMORY_PATH.to_string();
        config.session.secret_key = Some("test-secret-key-that-is-long-enough-to-sign".to_string());
        config
    }
}
