//! Feature schema: the ordered column layout the model was trained on.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::{read_artifact, ArtifactError};

/// Column holding research and development spend.
pub const R_D_EXPENSES: &str = "r_d_expenses";
/// Column holding administration spend.
pub const ADMINISTRATION_EXPENSES: &str = "administration_expenses";
/// Column holding marketing spend.
pub const MARKETING_EXPENSES: &str = "marketing_expenses";
/// Prefix of the one-hot state indicator columns.
pub const STATE_PREFIX: &str = "state_";

const EXPENSE_COLUMNS: [&str; 3] = [R_D_EXPENSES, ADMINISTRATION_EXPENSES, MARKETING_EXPENSES];

/// On-disk layout of the columns document.
#[derive(Debug, Deserialize)]
struct ColumnsDocument {
    data_columns: Vec<String>,
}

/// Ordered, immutable list of model input columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from column names in training order.
    ///
    /// All three expense columns must be present and names must be unique.
    pub fn new(columns: Vec<String>) -> Result<Self, ArtifactError> {
        if columns.is_empty() {
            return Err(ArtifactError::EmptySchema);
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            if positions.insert(column.clone(), index).is_some() {
                return Err(ArtifactError::DuplicateColumn(column.clone()));
            }
        }

        if let Some(missing) = EXPENSE_COLUMNS.iter().find(|c| !positions.contains_key(**c)) {
            return Err(ArtifactError::MissingColumn(*missing));
        }

        Ok(Self { columns, positions })
    }

    /// Parse a `{"data_columns": [...]}` document.
    pub fn from_json_str(json: &str) -> Result<Self, ArtifactError> {
        let doc: ColumnsDocument = serde_json::from_str(json)?;
        Self::new(doc.data_columns)
    }

    /// Load the schema from a columns JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        Self::from_json_str(&read_artifact(path.as_ref())?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of a column, if the schema has it.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Index of the indicator column for a state, after normalizing the name.
    pub fn state_position(&self, state: &str) -> Option<usize> {
        self.position(&state_column(state))
    }

    /// State names known to the schema, in column order.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter_map(|c| c.strip_prefix(STATE_PREFIX))
    }

    pub(crate) fn expense_positions(&self) -> [usize; 3] {
        // new() guarantees all three are present
        EXPENSE_COLUMNS.map(|c| self.positions[c])
    }
}

/// Column name for a free-text state: trimmed, lower-cased, prefixed.
pub fn state_column(state: &str) -> String {
    format!("{}{}", STATE_PREFIX, state.trim().to_lowercase())
}
