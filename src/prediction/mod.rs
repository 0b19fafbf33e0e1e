//! Startup profit prediction.
//!
//! Turns three expense amounts and a state name into a fixed-order feature
//! vector and runs it through a pre-trained linear regression model.
//!
//! ```text
//! raw form fields --> Expenses::parse --> encode(schema) --> EncodedFeatureVector
//!                                                                  |
//!                                          RegressionModel::predict v
//!                                                              Profit (2 dp)
//! ```
//!
//! The schema and the model are loaded once at startup (see
//! [`PredictionService::load`]) and shared read-only between requests.

pub mod encoder;
pub mod model;
pub mod schema;
pub mod service;


pub use encoder::{encode, EncodedFeatureVector, Expenses};
pub use model::{LinearRegression, RegressionModel};
pub use schema::FeatureSchema;
pub use service::{Prediction, PredictionService, Profit};

/// Result type for prediction operations.
pub type Result<T> = std::result::Result<T, PredictionError>;

/// Per-request prediction failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("invalid input for {field}: {value:?}")]
    InvalidInput { field: &'static str, value: String },

    #[error("unknown state: {0:?}")]
    UnknownState(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Failures loading the feature schema or model artifacts at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature schema has no columns")]
    EmptySchema,

    #[error("feature schema is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("feature schema lists column {0:?} more than once")]
    DuplicateColumn(String),

    #[error("model expects {model} features but schema has {schema} columns")]
    DimensionMismatch { model: usize, schema: usize },

    #[error("model feature {index} is {model:?} but schema column is {schema:?}")]
    FeatureNameMismatch {
        index: usize,
        model: String,
        schema: String,
    },

    #[error("model parameters must be finite")]
    NonFiniteParameter,
}

pub(crate) fn read_artifact(path: &std::path::Path) -> std::result::Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })
}
