//! Execution results
//!
//! Shaped like the hosted datastore's client response: `{ data, error }`,
//! exactly one of which carries information.

use serde::Serialize;
use thiserror::Error;

use crate::error::FitDbError;
use crate::row::Row;

/// Payload of a successful query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// `single()` was requested and exactly one row matched
    Row(Row),

    /// Everything else
    Rows(Vec<Row>),
}

/// Error half of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<FitDbError> for QueryError {
    fn from(err: FitDbError) -> Self {
        Self {
            code: err.code().map(str::to_string),
            message: err.to_string(),
        }
    }
}

/// The resolved value of every `execute()`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub data: Option<Data>,
    pub error: Option<QueryError>,
}

impl QueryResult {
    pub fn ok(data: Option<Data>) -> Self {
        Self { data, error: None }
    }

    pub fn err(error: impl Into<QueryError>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Rows of the result: the list, the single row, or nothing
    pub fn rows(&self) -> &[Row] {
        match &self.data {
            Some(Data::Rows(rows)) => rows,
            Some(Data::Row(row)) => std::slice::from_ref(row),
            None => &[],
        }
    }

    /// The row returned by `single()`, if that is what came back
    pub fn row(&self) -> Option<&Row> {
        match &self.data {
            Some(Data::Row(row)) => Some(row),
            _ => None,
        }
    }

    /// Error code, if the query failed with one
    pub fn code(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.code.as_deref())
    }

    /// Convert into a `Result` for `?`-style callers
    pub fn into_result(self) -> Result<Option<Data>, QueryError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}
