//! fitdb CLI
//!
//! Runs one query against a database file and prints the `{ data, error }`
//! envelope as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fitdb::row::fields_from_json;
use fitdb::{Config, Datastore, Fields, FitDbError, QueryBuilder, QueryResult, SyncStrategy, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// fitdb CLI
#[derive(Parser, Debug)]
#[command(name = "fitdb-cli")]
#[command(about = "Query a fitdb JSON database file")]
#[command(version)]
struct Args {
    /// Database file
    #[arg(short, long, default_value = "./data/db.json")]
    db: PathBuf,

    /// Skip fsync on save
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommand),

    /// List table names
    Tables,
}

/// Subcommands that run one query
#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Read matching rows
    Select {
        /// Requested columns (all columns are always returned)
        #[arg(default_value = "*")]
        columns: String,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Insert one JSON object or a JSON array of objects
    Insert {
        /// Target table
        #[arg(short, long)]
        table: String,

        /// Row payload
        rows: String,

        /// Return the inserted rows
        #[arg(long)]
        returning: bool,

        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Apply a JSON object patch to matching rows
    Update {
        /// Patch payload
        patch: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Return the updated rows
        #[arg(long)]
        returning: bool,

        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Remove matching rows
    Delete {
        #[command(flatten)]
        filters: FilterArgs,

        /// Return the deleted rows
        #[arg(long)]
        returning: bool,

        #[command(flatten)]
        shape: ShapeArgs,
    },
}

/// Filters, each given as FIELD=VALUE and repeatable
#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Table to query
    #[arg(short, long)]
    table: String,

    #[arg(long, value_name = "FIELD=VALUE")]
    eq: Vec<String>,

    #[arg(long, value_name = "FIELD=VALUE")]
    neq: Vec<String>,

    #[arg(long, value_name = "FIELD=VALUE")]
    gt: Vec<String>,

    #[arg(long, value_name = "FIELD=VALUE")]
    gte: Vec<String>,

    #[arg(long, value_name = "FIELD=VALUE")]
    lt: Vec<String>,

    #[arg(long, value_name = "FIELD=VALUE")]
    lte: Vec<String>,

    /// `%` matches any run of characters
    #[arg(long, value_name = "FIELD=PATTERN")]
    ilike: Vec<String>,
}

/// Result shaping
#[derive(clap::Args, Debug, Default)]
struct ShapeArgs {
    /// Sort key, repeatable; append `:desc` for descending
    #[arg(long, value_name = "FIELD[:desc]")]
    order: Vec<String>,

    /// Maximum number of rows returned
    #[arg(long)]
    limit: Option<usize>,

    /// Expect exactly one row
    #[arg(long)]
    single: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,fitdb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let sync = if args.no_sync {
        SyncStrategy::OsBuffered
    } else {
        SyncStrategy::EveryWrite
    };
    let config = Config::builder().db_path(&args.db).sync_strategy(sync).build();

    let db = match Datastore::open(config) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Tables => {
            println!("{}", db.table_names().join("\n"));
            return ExitCode::SUCCESS;
        }
        Commands::Query(command) => match build_query(&db, command) {
            Ok(query) => query.execute().await,
            Err(e) => QueryResult::err(e),
        },
    };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Failed to encode result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    exit_code(&result)
}

/// Exit status for a printed result: failure whenever `error` is set
fn exit_code(result: &QueryResult) -> ExitCode {
    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Turn a subcommand into a ready-to-run query
fn build_query(db: &Datastore, command: QueryCommand) -> Result<QueryBuilder, FitDbError> {
    let query = match command {
        QueryCommand::Select {
            columns,
            filters,
            shape,
        } => {
            let query = db.from(&filters.table).select(&columns);
            apply_shape(apply_filters(query, &filters)?, &shape)
        }
        QueryCommand::Insert {
            table,
            rows,
            returning,
            shape,
        } => {
            let query = db.from(&table).insert(parse_rows(&rows)?);
            apply_shape(returning_if(query, returning), &shape)
        }
        QueryCommand::Update {
            patch,
            filters,
            returning,
            shape,
        } => {
            let patch = parse_object(&patch)?;
            let query = db.from(&filters.table).update(patch);
            let query = apply_filters(returning_if(query, returning), &filters)?;
            apply_shape(query, &shape)
        }
        QueryCommand::Delete {
            filters,
            returning,
            shape,
        } => {
            let query = db.from(&filters.table).delete();
            let query = apply_filters(returning_if(query, returning), &filters)?;
            apply_shape(query, &shape)
        }
    };
    Ok(query)
}

fn returning_if(query: QueryBuilder, returning: bool) -> QueryBuilder {
    if returning {
        query.select("*")
    } else {
        query
    }
}

fn apply_filters(mut query: QueryBuilder, args: &FilterArgs) -> Result<QueryBuilder, FitDbError> {
    for pair in &args.eq {
        let (field, value) = split_pair(pair)?;
        query = query.eq(field, Value::literal(value));
    }
    for pair in &args.neq {
        let (field, value) = split_pair(pair)?;
        query = query.neq(field, Value::literal(value));
    }
    for pair in &args.gt {
        let (field, value) = split_pair(pair)?;
        query = query.gt(field, Value::literal(value));
    }
    for pair in &args.gte {
        let (field, value) = split_pair(pair)?;
        query = query.gte(field, Value::literal(value));
    }
    for pair in &args.lt {
        let (field, value) = split_pair(pair)?;
        query = query.lt(field, Value::literal(value));
    }
    for pair in &args.lte {
        let (field, value) = split_pair(pair)?;
        query = query.lte(field, Value::literal(value));
    }
    for pair in &args.ilike {
        let (field, pattern) = split_pair(pair)?;
        query = query.ilike(field, pattern);
    }
    Ok(query)
}

fn apply_shape(mut query: QueryBuilder, shape: &ShapeArgs) -> QueryBuilder {
    for key in &shape.order {
        query = match key.strip_suffix(":desc") {
            Some(field) => query.order(field, false),
            None => query.order(key.strip_suffix(":asc").unwrap_or(key), true),
        };
    }
    if let Some(n) = shape.limit {
        query = query.limit(n);
    }
    if shape.single {
        query = query.single();
    }
    query
}

/// "field=value" → ("field", "value")
fn split_pair(pair: &str) -> Result<(&str, &str), FitDbError> {
    pair.split_once('=')
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| FitDbError::InvalidArgument(format!("expected FIELD=VALUE, got `{}`", pair)))
}

/// One JSON object or an array of them
fn parse_rows(json: &str) -> Result<Vec<Fields>, FitDbError> {
    match serde_json::from_str::<serde_json::Value>(json)? {
        serde_json::Value::Array(items) => items.into_iter().map(fields_from_json).collect(),
        object => Ok(vec![fields_from_json(object)?]),
    }
}

fn parse_object(json: &str) -> Result<Fields, FitDbError> {
    fields_from_json(serde_json::from_str(json)?)
}
