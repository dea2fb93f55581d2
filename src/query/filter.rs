//! Row predicates
//!
//! Filters are data, not closures, so a query descriptor stays inspectable
//! and cloneable. Chained filters combine with logical AND.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::row::{Row, Value};

/// Comparison used by range filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A single predicate over one field
///
/// A row that lacks the field never matches, whatever the filter.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals value
    Eq { field: String, value: Value },

    /// Field is present and differs from value
    Neq { field: String, value: Value },

    /// Field orders against value as `op` requires
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },

    /// Case-insensitive LIKE on a text field
    ILike {
        field: String,
        pattern: String,
        regex: Regex,
    },
}

impl Filter {
    /// Build an `ilike` filter
    ///
    /// `%` matches any run of characters; every other character is literal.
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let regex = like_regex(&pattern)?;
        Ok(Filter::ILike {
            field: field.into(),
            pattern,
            regex,
        })
    }

    /// Name of the field this filter inspects
    pub fn field(&self) -> &str {
        match self {
            Filter::Eq { field, .. }
            | Filter::Neq { field, .. }
            | Filter::Compare { field, .. }
            | Filter::ILike { field, .. } => field,
        }
    }

    /// Whether `row` passes this filter
    pub fn matches(&self, row: &Row) -> bool {
        let Some(actual) = row.get(self.field()) else {
            return false;
        };

        match self {
            Filter::Eq { value, .. } => *actual == *value,
            Filter::Neq { value, .. } => *actual != *value,
            Filter::Compare { op, value, .. } => actual
                .compare(value)
                .map(|ordering| op.accepts(ordering))
                .unwrap_or(false),
            Filter::ILike { regex, .. } => actual.as_str().map(|s| regex.is_match(s)).unwrap_or(false),
        }
    }
}

/// Whether `row` passes every filter (short-circuits on the first failure)
pub fn matches_all(filters: &[Filter], row: &Row) -> bool {
    filters.iter().all(|f| f.matches(row))
}

fn like_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('%')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}
