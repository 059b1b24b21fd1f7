//! Row validation and normalization

use crate::config::ColumnMap;
use crate::reader::Row;
use tracing::debug;

pub use crate::error::RowError;

/// A row that passed validation. Every cell is trimmed and the identity
/// fields are known to be present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRow {
    row: Row,
}

impl ValidRow {
    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn into_row(self) -> Row {
        self.row
    }
}

/// Enforces the required-field and identifier-type policy for the antibody
/// table.
#[derive(Debug, Clone)]
pub struct RowValidator {
    required: Vec<String>,
    integer_fields: Vec<String>,
}

impl RowValidator {
    /// Antibody UID, virus id and virus name are required. The antibody
    /// name is optional even when it keys the antibody.
    pub fn new(columns: &ColumnMap) -> Self {
        Self {
            required: vec![
                columns.antibody_uid.clone(),
                columns.virus_id.clone(),
                columns.virus_name.clone(),
            ],
            integer_fields: vec![columns.virus_id.clone()],
        }
    }

    /// Trim the row and check it. On failure the diagnostic carries the
    /// offending row content.
    pub fn validate(&self, mut row: Row) -> Result<ValidRow, RowError> {
        row.trim_values();

        if let Some(field) = self.required.iter().find(|f| row.non_empty(f).is_none()) {
            debug!(
                index = row.index(),
                field = %field,
                row = %row.to_json(),
                "Missing required field in row"
            );
            return Err(RowError::MissingRequiredField {
                index: row.index(),
                field: field.clone(),
            });
        }

        for field in &self.integer_fields {
            let value = row.non_empty(field).unwrap_or_default();
            if value.parse::<i64>().is_err() {
                debug!(
                    index = row.index(),
                    field = %field,
                    row = %row.to_json(),
                    "Invalid identifier value in row"
                );
                return Err(RowError::InvalidIdentifierType {
                    index: row.index(),
                    field: field.clone(),
                    value: value.to_string(),
                });
            }
        }

        Ok(ValidRow { row })
    }
}
