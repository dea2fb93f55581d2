//! Query Module
//!
//! Supabase-style query building and execution.
//!
//! ## Responsibilities
//! - Collect filters, sort keys, limit, and single-row expectations
//! - Run select / insert / update / delete against one table
//! - Report every outcome as `{ data, error }`, never as a panic or `Err`
//!
//! ## Example
//! ```no_run
//! # async fn demo(db: &fitdb::Datastore) {
//! use fitdb::row::fields;
//!
//! let result = db
//!     .from("workouts")
//!     .insert(fields([("name", "Leg Day"), ("difficulty", "Beginner")]))
//!     .select("*")
//!     .execute()
//!     .await;
//! assert!(result.is_ok());
//! # }
//! ```

mod builder;
mod descriptor;
mod executor;
mod filter;
mod result;

pub use builder::{IntoRows, QueryBuilder};
pub use descriptor::{Action, Query, SortKey};
pub use filter::{CompareOp, Filter};
pub use result::{Data, QueryError, QueryResult};
