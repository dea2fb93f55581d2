//! Error types for fitdb
//!
//! Internal operations return [`FitDbError`]. The query executor turns
//! every one of them into a [`QueryError`](crate::query::QueryError) at its
//! boundary, so callers of `execute()` only ever see the result envelope.

use thiserror::Error;

/// Error code for `single()` matching zero or several rows
pub const CODE_NO_SINGLE_ROW: &str = "PGRST116";

/// Error code for a unique constraint violation
pub const CODE_UNIQUE_VIOLATION: &str = "23505";

/// Result type alias using FitDbError
pub type Result<T> = std::result::Result<T, FitDbError>;

/// Unified error type for fitdb operations
#[derive(Debug, Error)]
pub enum FitDbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("Row not found")]
    RowNotFound,

    #[error("Multiple rows found")]
    MultipleRows,

    #[error("{message}")]
    UniqueViolation {
        table: String,
        field: String,
        message: String,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FitDbError {
    /// Datastore error code for this failure, if it has one
    ///
    /// - `PGRST116`: `single()` matched zero or several rows
    /// - `23505`: unique constraint violation
    pub fn code(&self) -> Option<&'static str> {
        match self {
            FitDbError::RowNotFound | FitDbError::MultipleRows => Some(CODE_NO_SINGLE_ROW),
            FitDbError::UniqueViolation { .. } => Some(CODE_UNIQUE_VIOLATION),
            _ => None,
        }
    }
}
