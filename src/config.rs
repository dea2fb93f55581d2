//! Configuration for fitdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Tables that exist on every freshly opened database
pub const DEFAULT_TABLES: &[&str] = &[
    "users",
    "daily_logs",
    "workouts",
    "exercises",
    "workout_exercises",
];

/// Main configuration for a fitdb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the JSON document holding every table.
    /// A sibling `{db_path}.tmp` is used while saving.
    pub db_path: PathBuf,

    /// Tables guaranteed to be present after load
    pub tables: Vec<String>,

    /// Pretty-print the document (2-space indent)
    pub pretty: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How hard a save pushes data to the disk
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Constraint Configuration
    // -------------------------------------------------------------------------
    /// Unique fields enforced on insert
    pub unique_constraints: Vec<UniqueConstraint>,
}

/// Save sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync the temp file and the directory around the rename (safest)
    EveryWrite,

    /// Rename only, leave flushing to the OS (fastest)
    OsBuffered,
}

/// A field whose non-null values must be distinct within a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub table: String,
    pub field: String,

    /// Message reported on violation; a Postgres-style message is used if unset
    pub message: Option<String>,
}

impl UniqueConstraint {
    pub fn new(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            message: None,
        }
    }

    /// Override the violation message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Message to report when this constraint is violated
    pub fn violation_message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!(
                "duplicate key value violates unique constraint \"{}_{}_key\"",
                self.table, self.field
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/db.json"),
            tables: DEFAULT_TABLES.iter().map(|t| t.to_string()).collect(),
            pretty: true,
            sync_strategy: SyncStrategy::EveryWrite,
            unique_constraints: vec![
                UniqueConstraint::new("users", "email").with_message("User already exists"),
            ],
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Unique constraints declared for `table`
    pub fn constraints_for<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a UniqueConstraint> + 'a {
        self.unique_constraints
            .iter()
            .filter(move |c| c.table == table)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Replace the set of tables created on load
    pub fn tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Toggle pretty-printed output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.config.pretty = pretty;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Add a unique constraint
    pub fn unique(mut self, constraint: UniqueConstraint) -> Self {
        self.config.unique_constraints.push(constraint);
        self
    }

    /// Drop all unique constraints, including the default `users.email`
    pub fn no_unique_constraints(mut self) -> Self {
        self.config.unique_constraints.clear();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
