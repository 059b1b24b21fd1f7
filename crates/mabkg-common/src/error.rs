//! Error types for MABKG

use thiserror::Error;

/// Result type alias for batch-level MABKG operations
pub type Result<T> = std::result::Result<T, MabkgError>;

/// Batch-level error type.
///
/// Row-level problems (malformed or invalid rows) never surface here; they
/// are logged and the row is dropped. Only conditions that stop a whole run
/// are represented.
#[derive(Error, Debug)]
pub enum MabkgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl MabkgError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// True when the error means the source table itself could not be read
    pub fn is_io(&self) -> bool {
        match self {
            MabkgError::Io(_) => true,
            MabkgError::Csv(e) => e.is_io_error(),
            _ => false,
        }
    }
}
