//! Datastore Module
//!
//! Entry point handed to application code. Mirrors the hosted client's
//! surface (`from(table)` → builder → `execute()`), so handlers can be
//! written once against either backend.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::store::{RowStore, Tables};

/// A file-backed datastore
///
/// Cheap to clone; clones share the same in-memory snapshot. Opening the
/// same file twice yields two independent snapshots that only reconcile
/// on the next load.
#[derive(Clone)]
pub struct Datastore {
    store: Arc<RowStore>,
}

impl Datastore {
    /// Open or create a datastore with the given config
    pub fn open(config: Config) -> Result<Self> {
        let store = RowStore::open(config)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified document path
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().db_path(path).build())
    }

    /// Start a query against `table`
    ///
    /// Unknown tables are created empty on first reference.
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(Arc::clone(&self.store), table)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Names of all tables in memory
    pub fn table_names(&self) -> Vec<String> {
        self.store.table_names()
    }

    /// Clone of every table
    pub fn snapshot(&self) -> Tables {
        self.store.snapshot()
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Underlying row store
    pub fn store(&self) -> &RowStore {
        &self.store
    }
}
