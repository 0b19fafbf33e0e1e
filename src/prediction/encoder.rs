//! Feature encoder: expenses + state name to a model input vector.

use serde::Serialize;

use super::schema::FeatureSchema;
use super::{PredictionError, Result};

/// Validated expense amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Expenses {
    pub r_d_expenses: f64,
    pub administration_expenses: f64,
    pub marketing_expenses: f64,
}

impl Expenses {
    pub fn new(r_d_expenses: f64, administration_expenses: f64, marketing_expenses: f64) -> Self {
        Self {
            r_d_expenses,
            administration_expenses,
            marketing_expenses,
        }
    }

    /// Parse the three amounts from raw form text.
    ///
    /// Each value must be a finite floating point number.
    pub fn parse(r_d: &str, administration: &str, marketing: &str) -> Result<Self> {
        Ok(Self {
            r_d_expenses: parse_amount("r_d_expenses", r_d)?,
            administration_expenses: parse_amount("administration_expenses", administration)?,
            marketing_expenses: parse_amount("marketing_expenses", marketing)?,
        })
    }

    fn as_array(&self) -> [f64; 3] {
        [
            self.r_d_expenses,
            self.administration_expenses,
            self.marketing_expenses,
        ]
    }
}

/// Parse one expense amount, naming the field on failure.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PredictionError::InvalidInput {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Model input: one slot per schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    values: Vec<f64>,
    state_slot: Option<usize>,
}

impl EncodedFeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the state indicator that was set, if the state was known.
    pub fn state_slot(&self) -> Option<usize> {
        self.state_slot
    }

    pub fn state_recognized(&self) -> bool {
        self.state_slot.is_some()
    }
}

/// Encode expenses and a state name against `schema`.
///
/// Every slot starts at zero; the expense slots take their amounts and the
/// matching `state_<name>` slot is set to 1. A state the schema does not list
/// leaves every indicator at zero.
pub fn encode(schema: &FeatureSchema, expenses: &Expenses, state: &str) -> EncodedFeatureVector {
    let mut values = vec![0.0; schema.len()];

    for (slot, amount) in schema.expense_positions().into_iter().zip(expenses.as_array()) {
        values[slot] = amount;
    }

    let state_slot = schema.state_position(state);
    if let Some(slot) = state_slot {
        values[slot] = 1.0;
    }

    EncodedFeatureVector { values, state_slot }
}
