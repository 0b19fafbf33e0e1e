//! HTTP surface.
//!
//! Routes:
//! - `GET /` login page, `POST /` credential check
//! - `GET /register` registration page, `POST /register` create account
//! - `GET /info` landing view for the signed-in user
//! - `GET /profile`, `POST /profile` view and edit the signed-in user
//! - `GET /logout` end the session
//! - `GET /home`, `/government_schemes`, `/help_desk` static pages
//! - `POST /predict` profit estimate for the submitted expenses
//! - `GET /result` date and reference number for the result page
//! - `GET /bar_plot`, `GET /pie_plot` expense charts as PNG
//! - `GET /health` liveness

pub mod account;
pub mod charts;
pub mod error;
pub mod predict;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::routing::{get, get_service, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::SessionSettings;
use crate::config::ServerConfig;
use crate::interfaces::UserStore;
use crate::prediction::PredictionService;
use crate::utils::bootstrap::shutdown_signal;

pub use error::AppError;

/// Shared state for axum handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub predictor: PredictionService,
    pub session_key: Key,
    pub session: SessionSettings,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session_key.clone()
    }
}

impl FromRef<AppState> for SessionSettings {
    fn from_ref(state: &AppState) -> Self {
        state.session.clone()
    }
}

/// Start the HTTP server and run until Ctrl-C.
///
/// When `config.port` is 0, the OS assigns an ephemeral port. The actual bound
/// port is always logged so it can be discovered.
pub async fn serve(
    state: AppState,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state, Path::new(&config.static_dir));
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();
    info!(host = %config.host, port = actual_port, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let page = |name: &str| get_service(ServeFile::new(static_dir.join(name)));

    Router::new()
        .route("/", page("login.html").post(account::login))
        .route("/register", page("register.html").post(account::register))
        .route("/info", get(account::info))
        .route("/profile", get(account::profile).post(account::update_profile))
        .route("/logout", get(account::logout))
        .route("/home", page("home.html"))
        .route("/government_schemes", page("government_schemes.html"))
        .route("/help_desk", page("help_desk.html"))
        .route("/predict", post(predict::predict))
        .route("/result", get(predict::result))
        .route("/bar_plot", get(charts::bar_plot))
        .route("/pie_plot", get(charts::pie_plot))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}
