//! Deferred Executor
//!
//! Applies a [`Query`] to the current snapshot of its table.
//!
//! ## Pipeline
//! ```text
//! action (select / insert / update / delete)
//!    │   affected rows
//!    ▼
//! sort (stable, multi-key) → limit → single? → returning?
//!    │
//!    ▼
//! QueryResult { data, error }
//! ```
//!
//! Sort and limit shape the returned rows only; they never restrict which
//! rows a mutation touches.

use std::cmp::Ordering;

use crate::config::UniqueConstraint;
use crate::error::{FitDbError, Result};
use crate::row::{Fields, Row, Value};
use crate::store::{Change, RowStore};

use super::descriptor::{Action, Query, SortKey};
use super::filter::{matches_all, Filter};
use super::result::{Data, QueryResult};

/// Run `query` against `store`, converting every failure into the envelope
pub(crate) fn execute(store: &RowStore, query: Query) -> QueryResult {
    let table = query.table.clone();
    let action = query.action.name();

    match run(store, query) {
        Ok(data) => QueryResult::ok(data),
        Err(e) => {
            if e.code().is_some() {
                tracing::debug!(table = %table, action, error = %e, "Query rejected");
            } else {
                tracing::error!(table = %table, action, error = %e, "Query failed");
            }
            QueryResult::err(e)
        }
    }
}

fn run(store: &RowStore, query: Query) -> Result<Option<Data>> {
    let Query {
        table,
        action,
        filters,
        sorts,
        limit,
        single,
        returning,
        invalid,
        ..
    } = query;

    if let Some(reason) = invalid {
        return Err(FitDbError::InvalidPattern(reason));
    }

    let is_select = action.is_select();
    let affected = match action {
        Action::Select => select(store, &table, &filters)?,
        Action::Insert(payload) => insert(store, &table, payload)?,
        Action::Update(patch) => update(store, &table, &filters, &patch)?,
        Action::Delete => delete(store, &table, &filters)?,
    };

    shape(affected, &sorts, limit, single, is_select, returning)
}

// =============================================================================
// Actions
// =============================================================================

fn select(store: &RowStore, table: &str, filters: &[Filter]) -> Result<Vec<Row>> {
    store.transact(table, |rows| {
        let matched: Vec<Row> = rows
            .iter()
            .filter(|row| matches_all(filters, row))
            .cloned()
            .collect();
        Ok(Change::keep(matched))
    })
}

fn insert(store: &RowStore, table: &str, payload: Vec<Fields>) -> Result<Vec<Row>> {
    let constraints: Vec<UniqueConstraint> =
        store.config().constraints_for(table).cloned().collect();

    store.transact(table, |rows| {
        let new_rows: Vec<Row> = payload.into_iter().map(Row::new).collect();
        if new_rows.is_empty() {
            return Ok(Change::keep(new_rows));
        }

        for constraint in &constraints {
            check_unique(constraint, rows, &new_rows)?;
        }

        let mut next = Vec::with_capacity(rows.len() + new_rows.len());
        next.extend_from_slice(rows);
        next.extend(new_rows.iter().cloned());
        Ok(Change::replace(next, new_rows))
    })
}

fn update(store: &RowStore, table: &str, filters: &[Filter], patch: &Fields) -> Result<Vec<Row>> {
    store.transact(table, |rows| {
        let mut updated = Vec::new();
        let mut next = Vec::with_capacity(rows.len());

        for row in rows {
            if matches_all(filters, row) {
                let new_row = row.overlay(patch)?;
                updated.push(new_row.clone());
                next.push(new_row);
            } else {
                next.push(row.clone());
            }
        }

        // Nothing matched: leave the document untouched
        if updated.is_empty() {
            return Ok(Change::keep(updated));
        }
        Ok(Change::replace(next, updated))
    })
}

fn delete(store: &RowStore, table: &str, filters: &[Filter]) -> Result<Vec<Row>> {
    store.transact(table, |rows| {
        let (removed, kept): (Vec<Row>, Vec<Row>) = rows
            .iter()
            .cloned()
            .partition(|row| matches_all(filters, row));

        if removed.is_empty() {
            return Ok(Change::keep(removed));
        }
        Ok(Change::replace(kept, removed))
    })
}

/// Reject the batch if any new row repeats a constrained value
///
/// Values are checked against existing rows and against earlier rows of
/// the same batch. Missing and null values never collide.
fn check_unique(constraint: &UniqueConstraint, existing: &[Row], new_rows: &[Row]) -> Result<()> {
    let field = constraint.field.as_str();
    let mut seen: Vec<Value> = existing
        .iter()
        .filter_map(|row| row.get(field))
        .filter(|v| !v.is_null())
        .map(|v| v.into_owned())
        .collect();

    for row in new_rows {
        let Some(value) = row.get(field).filter(|v| !v.is_null()) else {
            continue;
        };
        if seen.iter().any(|s| *s == *value) {
            return Err(FitDbError::UniqueViolation {
                table: constraint.table.clone(),
                field: constraint.field.clone(),
                message: constraint.violation_message(),
            });
        }
        seen.push(value.into_owned());
    }

    Ok(())
}

// =============================================================================
// Result Shaping
// =============================================================================

fn shape(
    mut rows: Vec<Row>,
    sorts: &[SortKey],
    limit: Option<usize>,
    single: bool,
    is_select: bool,
    returning: bool,
) -> Result<Option<Data>> {
    if !sorts.is_empty() {
        // sort_by is stable: ties keep insertion order
        rows.sort_by(|a, b| compare_rows(a, b, sorts));
    }

    if let Some(n) = limit {
        rows.truncate(n);
    }

    if single {
        return match rows.len() {
            0 if is_select => Err(FitDbError::RowNotFound),
            0 => Ok(None),
            1 => Ok(rows.pop().map(Data::Row)),
            _ => Err(FitDbError::MultipleRows),
        };
    }

    if !is_select && !returning {
        return Ok(None);
    }
    Ok(Some(Data::Rows(rows)))
}

/// Multi-key comparison over a total order
///
/// Values of different types order by type (bool, number, text), and
/// missing or null values sort after everything else, so they come last
/// ascending and first descending.
fn compare_rows(a: &Row, b: &Row, sorts: &[SortKey]) -> Ordering {
    for key in sorts {
        let ordering = sort_order(a.get(&key.field).as_deref(), b.get(&key.field).as_deref());

        if ordering != Ordering::Equal {
            return if key.ascending {
                ordering
            } else {
                ordering.reverse()
            };
        }
    }
    Ordering::Equal
}

fn sort_order(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            Some(Value::Bool(_)) => 0,
            Some(Value::Integer(_)) | Some(Value::Float(_)) => 1,
            Some(Value::Text(_)) => 2,
            Some(Value::Null) | None => 3,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) if rank(a) == rank(b) => x.compare(y).unwrap_or_else(|| {
            // Only NaN gets here
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.total_cmp(&y)
        }),
        _ => rank(a).cmp(&rank(b)),
    }
}
