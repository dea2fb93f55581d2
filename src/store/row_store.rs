//! Row Store
//!
//! Authoritative in-memory snapshot of every table, mirrored to disk after
//! each mutation.

use std::path::Path;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::row::Row;

use super::persist::{self, LoadReport, Tables};

/// What a transaction wants done with its table
pub(crate) struct Change<T> {
    /// New contents for the table, or `None` to leave it (and the file) alone
    pub rows: Option<Vec<Row>>,

    /// Value handed back to the caller
    pub output: T,
}

impl<T> Change<T> {
    pub fn keep(output: T) -> Self {
        Self { rows: None, output }
    }

    pub fn replace(rows: Vec<Row>, output: T) -> Self {
        Self {
            rows: Some(rows),
            output,
        }
    }
}

/// Holds all tables and keeps the backing document in sync
///
/// ## Concurrency:
/// - `tables`: one Mutex for the whole database
/// - A transaction reads, computes, and commits under a single lock hold,
///   so two queries against the same store never interleave mid-mutation
/// - Separate `RowStore` instances on the same file do NOT coordinate;
///   the last writer's snapshot wins
pub struct RowStore {
    /// Store configuration
    config: Config,

    /// Table name → rows
    tables: Mutex<Tables>,

    /// Result of the initial load
    load_report: LoadReport,
}

impl RowStore {
    /// Open the store described by `config`
    ///
    /// On startup:
    /// 1. Create the parent directory of the document
    /// 2. Load the document (or fall back to the known empty tables)
    pub fn open(config: Config) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let (tables, load_report) = persist::load(&config.db_path, &config.tables);

        tracing::info!(
            path = %config.db_path.display(),
            tables = load_report.tables,
            rows = load_report.rows,
            fell_back = load_report.fell_back,
            "Row store opened"
        );

        Ok(Self {
            config,
            tables: Mutex::new(tables),
            load_report,
        })
    }

    /// Current rows of `table`
    ///
    /// An unknown table is created empty in memory; it reaches the disk with
    /// the next mutation.
    pub fn get(&self, table: &str) -> Vec<Row> {
        let mut tables = self.tables.lock();
        tables.entry(table.to_string()).or_default().clone()
    }

    /// Replace the rows of `table` and rewrite the document
    pub fn commit(&self, table: &str, rows: Vec<Row>) -> Result<()> {
        let mut tables = self.tables.lock();
        self.commit_locked(&mut tables, table, rows)
    }

    /// Clone of the whole database
    pub fn snapshot(&self) -> Tables {
        self.tables.lock().clone()
    }

    /// Names of all tables currently in memory
    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().cloned().collect()
    }

    /// Run `f` against `table` and apply its change, all under one lock hold
    pub(crate) fn transact<T, F>(&self, table: &str, f: F) -> Result<T>
    where
        F: FnOnce(&[Row]) -> Result<Change<T>>,
    {
        let mut tables = self.tables.lock();
        let current = tables.entry(table.to_string()).or_default();

        let change = f(current)?;
        if let Some(rows) = change.rows {
            self.commit_locked(&mut tables, table, rows)?;
        }
        Ok(change.output)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.config.db_path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the initial load report
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Swap in the new rows, save, and roll back if the save fails
    fn commit_locked(&self, tables: &mut Tables, table: &str, rows: Vec<Row>) -> Result<()> {
        let row_count = rows.len();
        let previous = tables.insert(table.to_string(), rows);

        if let Err(e) = persist::save(
            &self.config.db_path,
            tables,
            self.config.sync_strategy,
            self.config.pretty,
        ) {
            match previous {
                Some(rows) => tables.insert(table.to_string(), rows),
                None => tables.remove(table),
            };
            return Err(e);
        }

        tracing::debug!(
            table,
            rows = row_count,
            path = %self.config.db_path.display(),
            "Committed table"
        );
        Ok(())
    }
}
