//! Query descriptor
//!
//! The accumulated, not-yet-executed description of one table operation.

use crate::row::{Fields, Row};

use super::filter::{matches_all, Filter};

/// What a query does to its table
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Read matching rows
    Select,

    /// Append new rows built from these field maps
    Insert(Vec<Fields>),

    /// Overlay this patch onto every matching row
    Update(Fields),

    /// Remove every matching row
    Delete,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Select => "select",
            Action::Insert(_) => "insert",
            Action::Update(_) => "update",
            Action::Delete => "delete",
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Action::Select)
    }
}

/// One `order()` key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

/// Everything needed to run one query
#[derive(Debug, Clone)]
pub struct Query {
    /// Target table
    pub table: String,

    /// Requested action and its payload
    pub action: Action,

    /// Predicates, implicitly ANDed
    pub filters: Vec<Filter>,

    /// Sort keys, primary first
    pub sorts: Vec<SortKey>,

    /// Cap on returned rows
    pub limit: Option<usize>,

    /// Expect exactly one row
    pub single: bool,

    /// `select()` was chained: mutations return the affected rows
    pub returning: bool,

    /// Column list passed to `select()`. Recorded only: every column is
    /// always returned.
    pub columns: Option<String>,

    /// Error detected while building, reported at execution
    pub(crate) invalid: Option<String>,
}

impl Query {
    /// A plain `select` against `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            action: Action::Select,
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
            single: false,
            returning: false,
            columns: None,
            invalid: None,
        }
    }

    /// Whether `row` passes every filter
    pub fn matches(&self, row: &Row) -> bool {
        matches_all(&self.filters, row)
    }

    /// Build-time error, if any
    pub fn invalid(&self) -> Option<&str> {
        self.invalid.as_deref()
    }
}
