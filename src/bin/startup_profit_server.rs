//! startup-profit-server: profit estimator web application
//!
//! ## Configuration
//! - `--config <path>`: YAML config file (optional)
//! - STARTUP_PROFIT_CONFIG: YAML config file (optional)
//! - STARTUP_PROFIT__SECTION__KEY: override any setting, e.g. STARTUP_PROFIT__SERVER__PORT
//! - SECRET_KEY: session signing secret when `session.secret_key` is unset
//! - STARTUP_PROFIT_LOG: tracing filter (default: info)
//!
//! The model and column artifacts are loaded once at startup; a missing or
//! inconsistent artifact aborts the process.

use tracing::{error, info};

use startup_profit::auth::{session_key, SessionSettings};
use startup_profit::config::Config;
use startup_profit::handlers::{serve, AppState};
use startup_profit::prediction::PredictionService;
use startup_profit::storage::init_storage;
use startup_profit::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let predictor = PredictionService::load(&config.model, &config.prediction).map_err(|e| {
        error!(error = %e, "failed to load prediction model");
        e
    })?;

    let users = init_storage(&config.storage).await?;

    let state = AppState {
        users,
        predictor,
        session_key: session_key(config.session.secret_key.as_deref()),
        session: SessionSettings {
            cookie_name: config.session.cookie_name.clone(),
        },
    };

    info!(
        storage = %config.storage.path,
        model = %config.model.model_path,
        "starting startup-profit-server"
    );

    serve(state, &config.server)
        .await
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    info!("startup-profit-server stopped");
    Ok(())
}
