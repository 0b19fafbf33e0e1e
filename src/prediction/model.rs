//! Pre-trained regression models.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::schema::FeatureSchema;
use super::{read_artifact, ArtifactError, PredictionError, Result};

/// A fitted model mapping one feature row to a scalar.
pub trait RegressionModel: Send + Sync + 'static {
    /// Number of input features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Predict the target for a single row.
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Ordinary least squares linear regression, exported from training as JSON.
///
/// ```text
/// y = intercept + Σ coefficients[i] * x[i]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
    /// Column names seen during fitting, when the exporter recorded them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names: Option<Vec<String>>,
}

impl LinearRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            intercept,
            coefficients,
            feature_names: None,
        }
    }

    pub fn from_json_str(json: &str) -> std::result::Result<Self, ArtifactError> {
        let model: Self = serde_json::from_str(json)?;
        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::NonFiniteParameter);
        }
        Ok(model)
    }

    /// Load a model exported as `{"intercept": .., "coefficients": [..]}`.
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, ArtifactError> {
        Self::from_json_str(&read_artifact(path.as_ref())?)
    }

    /// Check that this model was fitted on the layout `schema` describes.
    pub fn check_schema(&self, schema: &FeatureSchema) -> std::result::Result<(), ArtifactError> {
        if self.coefficients.len() != schema.len() {
            return Err(ArtifactError::DimensionMismatch {
                model: self.coefficients.len(),
                schema: schema.len(),
            });
        }

        if let Some(names) = &self.feature_names {
            if names.len() != schema.len() {
                return Err(ArtifactError::DimensionMismatch {
                    model: names.len(),
                    schema: schema.len(),
                });
            }
            for (index, (model, column)) in names.iter().zip(schema.columns()).enumerate() {
                if model != column {
                    return Err(ArtifactError::FeatureNameMismatch {
                        index,
                        model: model.clone(),
                        schema: column.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl RegressionModel for LinearRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(PredictionError::ModelUnavailable(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }

        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| c * x)
            .sum();

        Ok(self.intercept + dot)
    }
}
