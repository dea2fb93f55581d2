//! Storage Module
//!
//! In-memory tables backed by a single JSON document.
//!
//! ## Responsibilities
//! - Hold the authoritative snapshot of every table
//! - Rewrite the full document after every mutation
//! - Degrade to empty tables when the document is missing or unreadable
//!
//! ## File Format
//! ```text
//! {
//!   "daily_logs": [],
//!   "users": [
//!     { "id": "…", "created_at": "2024-05-01T08:00:00.000Z", "email": "…" }
//!   ],
//!   "workouts": [ … ]
//! }
//! ```

pub mod persist;
mod row_store;

pub use persist::{LoadReport, Tables};
pub(crate) use row_store::Change;
pub use row_store::RowStore;
