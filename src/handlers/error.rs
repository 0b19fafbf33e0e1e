//! Mapping from domain errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::auth::SessionError;
use crate::charts::ChartError;
use crate::interfaces::StoreError;
use crate::prediction::PredictionError;

/// Message shown for failures whose detail stays in the logs.
pub const GENERIC_ERROR: &str = "An error occurred.";
/// Message shown on a username collision.
pub const USERNAME_TAKEN: &str = "Username already exists.";
/// Message shown on a failed login.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Any failure a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{msg}", msg = INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("invalid {field}: {message}")]
    InvalidForm {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn invalid_form(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidForm {
            field,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::InvalidForm { .. } => StatusCode::BAD_REQUEST,
            AppError::Prediction(PredictionError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            AppError::Prediction(PredictionError::UnknownState(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Prediction(PredictionError::ModelUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Store(StoreError::UsernameTaken(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Chart(ChartError::OutOfRange { .. }) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Chart(_) | AppError::Session(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text safe to show the requester.
    fn public_message(&self) -> String {
        match self {
            AppError::Store(StoreError::UsernameTaken(_)) => USERNAME_TAKEN.to_string(),
            AppError::Prediction(PredictionError::ModelUnavailable(_)) => {
                "Prediction is unavailable.".to_string()
            }
            err if err.status().is_server_error() => GENERIC_ERROR.to_string(),
            err => err.to_string(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
