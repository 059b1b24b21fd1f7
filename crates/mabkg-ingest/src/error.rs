//! Row-level error types

use thiserror::Error;

/// Row-level failures. Never fatal to a run: the row is logged and dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Row {index}: malformed ({reason})")]
    MalformedRow { index: usize, reason: String },

    #[error("Row {index}: missing required field '{field}'")]
    MissingRequiredField { index: usize, field: String },

    #[error("Row {index}: field '{field}' must be an integer, got '{value}'")]
    InvalidIdentifierType {
        index: usize,
        field: String,
        value: String,
    },
}
