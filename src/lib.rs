//! # fitdb
//!
//! A file-backed stand-in for a hosted Postgres/PostgREST datastore:
//! - Open-schema rows with generated `id` / `created_at`
//! - Chainable query builder (`eq`, `ilike`, `order`, `limit`, `single`, ...)
//! - `{ data, error }` results, never panics or `Err`s
//! - Whole-document JSON persistence with atomic replace
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Datastore::from(table)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   QueryBuilder                               │
//! │         (filters, sorts, limit, single, action)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ execute().await
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Deferred Executor                            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  RowStore   │─────────▶│  persist    │
//!   │  (Mutex)    │  commit  │ (db.json)   │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod row;
pub mod store;
pub mod query;
pub mod datastore;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FitDbError, Result};
pub use config::{Config, SyncStrategy, UniqueConstraint};
pub use datastore::Datastore;
pub use query::{Data, QueryBuilder, QueryError, QueryResult};
pub use row::{fields, Fields, Row, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of fitdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
