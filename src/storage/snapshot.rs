//! Snapshot persistence for RustDB
//!
//! The whole database is written as one pretty-printed JSON document. A write
//! replaces the previous file in place; there is no protection against a crash
//! in the middle of a write.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use super::database::Database;
use crate::error::Result;

/// Serialize `db` to `path`, overwriting any previous snapshot
pub fn save(db: &Database, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, db)?;
    writer.flush()?;
    debug!(path = %path.display(), "snapshot written");
    Ok(())
}

/// Load the database stored at `path`, or an empty one if there is no file
pub fn load(path: impl AsRef<Path>) -> Result<Database> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "no snapshot found, starting empty");
        return Ok(Database::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let db: Database = serde_json::from_reader(reader)?;
    db.verify()?;
    info!(
        path = %path.display(),
        tables = db.list_tables().len(),
        "snapshot loaded"
    );
    Ok(db)
}
