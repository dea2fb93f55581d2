//! Query Builder
//!
//! Chainable, side-effect free construction of a [`Query`]. Every method
//! consumes the builder and hands back the updated one, so a builder is
//! used exactly once and nothing touches the store before `execute()`.

use std::sync::Arc;

use crate::row::{Fields, Value};
use crate::store::RowStore;

use super::descriptor::{Action, Query, SortKey};
use super::executor;
use super::filter::{CompareOp, Filter};
use super::result::QueryResult;

/// Rows accepted by [`QueryBuilder::insert`]: one field map or many
pub trait IntoRows {
    fn into_rows(self) -> Vec<Fields>;
}

impl IntoRows for Fields {
    fn into_rows(self) -> Vec<Fields> {
        vec![self]
    }
}

impl IntoRows for Vec<Fields> {
    fn into_rows(self) -> Vec<Fields> {
        self
    }
}

impl<const N: usize> IntoRows for [Fields; N] {
    fn into_rows(self) -> Vec<Fields> {
        self.into_iter().collect()
    }
}

/// Builder for one query against one table
#[must_use = "a query does nothing until `execute()` is awaited"]
pub struct QueryBuilder {
    store: Arc<RowStore>,
    query: Query,
}

impl QueryBuilder {
    pub(crate) fn new(store: Arc<RowStore>, table: &str) -> Self {
        Self {
            store,
            query: Query::new(table),
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Ask for rows back
    ///
    /// Every column is returned whatever `columns` says; there is no
    /// projection.
    pub fn select(mut self, columns: &str) -> Self {
        self.query.returning = true;
        self.query.columns = Some(columns.to_string());
        self
    }

    pub fn insert(mut self, rows: impl IntoRows) -> Self {
        self.query.action = Action::Insert(rows.into_rows());
        self
    }

    pub fn update(mut self, patch: Fields) -> Self {
        self.query.action = Action::Update(patch);
        self
    }

    pub fn delete(mut self) -> Self {
        self.query.action = Action::Delete;
        self
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn neq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Neq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, CompareOp::Gt, value.into())
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, CompareOp::Gte, value.into())
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, CompareOp::Lt, value.into())
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, CompareOp::Lte, value.into())
    }

    /// Case-insensitive LIKE; `%` matches any run of characters
    pub fn ilike(mut self, field: &str, pattern: &str) -> Self {
        match Filter::ilike(field, pattern) {
            Ok(filter) => self.query.filters.push(filter),
            Err(e) => {
                // Surfaced by execute(); keep the first problem only.
                self.query
                    .invalid
                    .get_or_insert_with(|| format!("ilike({}, {:?}): {}", field, pattern, e));
            }
        }
        self
    }

    // =========================================================================
    // Shaping
    // =========================================================================

    /// Add a sort key; earlier calls take precedence
    pub fn order(mut self, field: &str, ascending: bool) -> Self {
        self.query.sorts.push(SortKey {
            field: field.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.query.limit = Some(n);
        self
    }

    pub fn single(mut self) -> Self {
        self.query.single = true;
        self
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// The descriptor built so far
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Run the query
    ///
    /// Nothing happens until the returned future is polled. Never fails:
    /// every problem is reported through [`QueryResult::error`].
    pub async fn execute(self) -> QueryResult {
        executor::execute(&self.store, self.query)
    }

    fn compare(mut self, field: &str, op: CompareOp, value: Value) -> Self {
        self.query.filters.push(Filter::Compare {
            field: field.to_string(),
            op,
            value,
        });
        self
    }
}
