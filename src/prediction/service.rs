//! Prediction service: encoder + model behind one call.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ModelConfig, PredictionConfig};

use super::encoder::{encode, EncodedFeatureVector, Expenses};
use super::model::{LinearRegression, RegressionModel};
use super::schema::FeatureSchema;
use super::{ArtifactError, PredictionError, Result};

/// Estimated profit, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Profit(f64);

impl Profit {
    /// Values too large to scale by 100 carry no cents and are kept as is.
    fn from_raw(raw: f64) -> Self {
        let cents = raw * 100.0;
        if cents.is_finite() {
            Self(cents.round() / 100.0)
        } else {
            Self(raw)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Profit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A successful prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub profit: Profit,
    /// False when the state matched no indicator column and was left out.
    pub state_recognized: bool,
}

/// Shared, read-only prediction pipeline.
///
/// Cheap to clone; schema and model sit behind `Arc`s.
#[derive(Clone)]
pub struct PredictionService {
    schema: Arc<FeatureSchema>,
    model: Arc<dyn RegressionModel>,
    strict_state: bool,
}

impl PredictionService {
    /// Pair a schema with a model of the same width.
    pub fn new(
        schema: Arc<FeatureSchema>,
        model: Arc<dyn RegressionModel>,
    ) -> std::result::Result<Self, ArtifactError> {
        if model.n_features() != schema.len() {
            return Err(ArtifactError::DimensionMismatch {
                model: model.n_features(),
                schema: schema.len(),
            });
        }

        Ok(Self {
            schema,
            model,
            strict_state: false,
        })
    }

    /// Reject states the schema does not know instead of zero-filling them.
    #[must_use]
    pub fn with_strict_state(mut self, strict: bool) -> Self {
        self.strict_state = strict;
        self
    }

    /// Load schema and model artifacts from disk.
    pub fn load(
        model_config: &ModelConfig,
        prediction_config: &PredictionConfig,
    ) -> std::result::Result<Self, ArtifactError> {
        let schema = FeatureSchema::load(&model_config.columns_path)?;
        let model = LinearRegression::load(&model_config.model_path)?;
        model.check_schema(&schema)?;

        info!(
            columns = schema.len(),
            states = schema.states().count(),
            model = %model_config.model_path,
            strict_state = prediction_config.strict_state,
            "prediction model loaded"
        );

        Ok(Self::new(Arc::new(schema), Arc::new(model))?
            .with_strict_state(prediction_config.strict_state))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encode inputs, applying the unknown-state policy.
    pub fn encode(&self, expenses: &Expenses, state: &str) -> Result<EncodedFeatureVector> {
        let vector = encode(&self.schema, expenses, state);

        if !vector.state_recognized() {
            if self.strict_state {
                return Err(PredictionError::UnknownState(state.to_string()));
            }
            warn!(state = %state, "state matches no feature column; indicators left at zero");
        }

        Ok(vector)
    }

    /// Run the model on an already-encoded vector.
    pub fn predict_vector(&self, vector: &EncodedFeatureVector) -> Result<Profit> {
        let raw = self.model.predict(vector.values())?;
        if !raw.is_finite() {
            return Err(PredictionError::ModelUnavailable(format!(
                "model produced non-finite output {raw}"
            )));
        }
        Ok(Profit::from_raw(raw))
    }

    /// Encode and predict in one step.
    pub fn predict(&self, expenses: &Expenses, state: &str) -> Result<Prediction> {
        let vector = self.encode(expenses, state)?;
        let profit = self.predict_vector(&vector)?;

        debug!(profit = %profit, state = %state, "profit predicted");

        Ok(Prediction {
            profit,
            state_recognized: vector.state_recognized(),
        })
    }
}

impl fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionService")
            .field("columns", &self.schema.columns())
            .field("strict_state", &self.strict_state)
            .finish_non_exhaustive()
    }
}
