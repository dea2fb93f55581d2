//! Persistence Adapter
//!
//! Moves the whole database between memory and one JSON document.
//!
//! Saves go through a temp file and a rename so a crash mid-write leaves
//! either the old or the new document, never a truncated one. Loads never
//! fail: a missing or unreadable document degrades to the known empty
//! tables with a warning.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::Result;
use crate::row::Row;

/// Table name → rows, in insertion order
pub type Tables = BTreeMap<String, Vec<Row>>;

/// Outcome of loading the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of tables present after load (known tables included)
    pub tables: usize,

    /// Total rows read from disk
    pub rows: usize,

    /// Whether the document existed but could not be used
    pub fell_back: bool,
}

/// Load the database document
///
/// Every name in `known` is present in the result, empty if the document
/// did not mention it.
pub fn load(path: &Path, known: &[String]) -> (Tables, LoadReport) {
    let mut fell_back = false;

    let mut tables = if path.exists() {
        match read_document(path) {
            Ok(tables) => tables,
            Err(e) => {
                // The next mutation overwrites the unreadable document.
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load database, starting empty"
                );
                fell_back = true;
                Tables::new()
            }
        }
    } else {
        Tables::new()
    };

    for name in known {
        tables.entry(name.clone()).or_default();
    }

    let report = LoadReport {
        tables: tables.len(),
        rows: tables.values().map(Vec::len).sum(),
        fell_back,
    };

    (tables, report)
}

/// Write the full document, replacing the previous one atomically
///
/// On failure the temp file is removed and the previous document is left
/// in place.
pub fn save(path: &Path, tables: &Tables, sync: SyncStrategy, pretty: bool) -> Result<()> {
    let tmp = tmp_path(path);

    if let Err(e) = write_and_replace(path, &tmp, tables, sync, pretty) {
        if tmp.exists() {
            if let Err(remove_err) = fs::remove_file(&tmp) {
                tracing::warn!(
                    path = %tmp.display(),
                    error = %remove_err,
                    "Failed to remove temp file after failed save"
                );
            }
        }
        return Err(e);
    }

    // Make the rename itself durable
    if sync == SyncStrategy::EveryWrite {
        sync_parent_dir(path);
    }

    Ok(())
}

/// Path of the temp file used while saving `path`
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn read_document(path: &Path) -> Result<Tables> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_and_replace(
    path: &Path,
    tmp: &Path,
    tables: &Tables,
    sync: SyncStrategy,
    pretty: bool,
) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp)?;
    let mut writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(&mut writer, tables)?;
    } else {
        serde_json::to_writer(&mut writer, tables)?;
    }
    writer.flush()?;

    if sync == SyncStrategy::EveryWrite {
        writer.get_ref().sync_all()?;
    }
    drop(writer);

    fs::rename(tmp, path)?;
    Ok(())
}

/// Best-effort fsync of the directory holding `path`
fn sync_parent_dir(path: &Path) {
    let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };

    let result = File::open(dir).and_then(|dir| dir.sync_all());
    if let Err(e) = result {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Failed to sync database directory after rename"
        );
    }
}
