//! Shared-state coordinator
//!
//! The one owner of the [`Database`]. Every statement, reads included, runs
//! parse, execute and persist while holding a single mutex, so statements
//! from the shell and from HTTP clients are applied one at a time.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::executor::{ExecutionEngine, QueryResult};
use crate::sql::Parser;
use crate::storage::{snapshot, Database};

/// Serialized access to a database, with optional snapshot persistence
pub struct Coordinator {
    db: Mutex<Database>,
    snapshot: Option<PathBuf>,
}

impl Coordinator {
    /// Load the snapshot at `path` (an absent file gives an empty database)
    /// and persist to it after every successful mutation.
    ///
    /// A snapshot that exists but cannot be read is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let db = snapshot::load(&path)?;
        info!(
            path = %path.display(),
            tables = db.list_tables().len(),
            "database opened"
        );
        Ok(Self {
            db: Mutex::new(db),
            snapshot: Some(path),
        })
    }

    /// A database that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            db: Mutex::new(Database::new()),
            snapshot: None,
        }
    }

    /// Where snapshots are written, if anywhere
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Parse and execute one statement.
    ///
    /// After a successful CREATE, INSERT, UPDATE or DELETE the snapshot is
    /// rewritten before the guard is released. If that write fails, the
    /// change stays applied in memory and the persistence error is returned.
    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let mut db = self.db.lock();

        let stmt = Parser::parse_sql(sql).map_err(|e| {
            warn!(error = %e, "statement rejected");
            e
        })?;
        let kind = stmt.kind();
        let mutation = stmt.is_mutation();
        debug!(kind, "executing statement");

        let result = ExecutionEngine::new(&mut db).execute(stmt).map_err(|e| {
            warn!(kind, error = %e, "statement failed");
            e
        })?;

        if mutation {
            self.persist(&db)?;
        }
        Ok(result)
    }

    /// Write the snapshot now; a no-op for in-memory databases
    pub fn flush(&self) -> Result<()> {
        let db = self.db.lock();
        self.persist(&db)?;
        if let Some(path) = &self.snapshot {
            info!(path = %path.display(), "snapshot flushed");
        }
        Ok(())
    }

    /// Table names, in creation order
    pub fn table_names(&self) -> Vec<String> {
        self.db.lock().list_tables()
    }

    /// Human-readable description of one table
    pub fn describe(&self, table: &str) -> Result<String> {
        self.db.lock().table_info(table)
    }

    fn persist(&self, db: &Database) -> Result<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };
        snapshot::save(db, path).map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to write snapshot");
            e
        })
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::Value;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_in_memory_execute() {
        let coordinator = Coordinator::in_memory();
        assert!(coordinator.snapshot_path().is_none());

        coordinator.execute("CREATE TABLE t (a INT)").unwrap();
        coordinator.execute("INSERT INTO t VALUES (7)").unwrap();
        let result = coordinator.execute("SELECT * FROM t").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(1), Value::Integer(7)]]);
        assert_eq!(coordinator.table_names(), vec!["t"]);
        coordinator.flush().unwrap();
    }

    #[test]
    fn test_errors_leave_state_usable() {
        let coordinator = Coordinator::in_memory();
        assert!(coordinator.execute("SELEC * FROM t").unwrap_err().is_parse_error());
        assert!(matches!(
            coordinator.execute("SELECT * FROM t"),
            Err(Error::TableNotFound(_))
        ));
        coordinator.execute("CREATE TABLE t (a INT)").unwrap();
        assert!(coordinator.execute("INSERT INTO t VALUES ('x')").is_err());
        assert_eq!(
            coordinator.execute("SELECT * FROM t").unwrap().to_string(),
            "ID | a\nSuccess: Returned 0 rows"
        );
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let coordinator = Coordinator::open(&path).unwrap();
        coordinator
            .execute("CREATE TABLE users (id INT, email TEXT UNIQUE)")
            .unwrap();
        coordinator
            .execute("INSERT INTO users VALUES (1, 'ian@test.com')")
            .unwrap();
        coordinator
            .execute("UPDATE users SET email = 'new@test.com' WHERE id = 1")
            .unwrap();

        let reloaded = snapshot::load(&path).unwrap();
        let users = reloaded.table("users").unwrap();
        assert_eq!(users.last_id(), 1);
        assert_eq!(
            users.get(1).unwrap().get("email"),
            Some(&Value::from("new@test.com"))
        );

        // Reopening continues the identity sequence
        drop(coordinator);
        let coordinator = Coordinator::open(&path).unwrap();
        coordinator.execute("DELETE FROM users WHERE id = 1").unwrap();
        coordinator
            .execute("INSERT INTO users VALUES (2, 'b@test.com')")
            .unwrap();
        let reloaded = snapshot::load(&path).unwrap();
        let ids: Vec<u64> = reloaded.table("users").unwrap().scan().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_open_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Coordinator::open(&path).unwrap_err();
        assert!(err.is_persistence_error());
    }

    #[test]
    fn test_failed_snapshot_write_keeps_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("db.json");

        let coordinator = Coordinator::open(&path).unwrap();
        let err = coordinator.execute("CREATE TABLE t (a INT)").unwrap_err();
        assert!(err.is_persistence_error());
        assert_eq!(coordinator.table_names(), vec!["t"]);
        assert!(coordinator.flush().is_err());
    }

    #[test]
    fn test_concurrent_inserts_are_serialized() {
        let coordinator = Arc::new(Coordinator::in_memory());
        coordinator
            .execute("CREATE TABLE hits (worker INT, n INT)")
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || {
                    for n in 0..25 {
                        coordinator
                            .execute(&format!("INSERT INTO hits VALUES ({}, {})", worker, n))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let result = coordinator.execute("SELECT * FROM hits").unwrap();
        assert_eq!(result.rows.len(), 200);

        let db = coordinator.db.lock();
        let hits = db.table("hits").unwrap();
        assert_eq!(hits.last_id(), 200);
        let ids: BTreeSet<u64> = hits.scan().map(|r| r.id).collect();
        assert_eq!(ids, (1..=200).collect::<BTreeSet<u64>>());
    }

    #[test]
    fn test_overflowing_float_never_reaches_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let coordinator = Coordinator::open(&path).unwrap();
        coordinator.execute("CREATE TABLE t (v FLOAT)").unwrap();
        let err = coordinator.execute("INSERT INTO t VALUES (1e999)").unwrap_err();
        assert!(matches!(err, Error::InvalidNumber(_)));
        coordinator.execute("INSERT INTO t VALUES (-1.5e300)").unwrap();
        drop(coordinator);

        let coordinator = Coordinator::open(&path).unwrap();
        let result = coordinator.execute("SELECT * FROM t").unwrap();
        assert_eq!(result.rows, vec![vec![Value::Integer(1), Value::Float(-1.5e300)]]);
    }

    #[test]
    fn test_deeply_nested_statement_is_rejected() {
        let coordinator = Coordinator::in_memory();
        coordinator.execute("CREATE TABLE t (a INT)").unwrap();
        coordinator.execute("INSERT INTO t VALUES (1)").unwrap();

        // Run on a small stack so unbounded recursion would abort the test
        let sql = format!("DELETE FROM t WHERE id = {}1{}", "(".repeat(5000), ")".repeat(5000));
        let err = thread::scope(|s| {
            thread::Builder::new()
                .stack_size(1024 * 1024)
                .spawn_scoped(s, || coordinator.execute(&sql))
                .unwrap()
                .join()
                .unwrap()
        })
        .unwrap_err();
        assert!(matches!(err, Error::NestingTooDeep(_)));
        assert_eq!(
            coordinator.execute("DELETE FROM t WHERE id = ((1))").unwrap().affected_rows,
            1
        );
    }

    #[test]
    fn test_describe() {
        let coordinator = Coordinator::in_memory();
        coordinator
            .execute("CREATE TABLE users (id INT, email TEXT UNIQUE)")
            .unwrap();
        let info = coordinator.describe("users").unwrap();
        assert!(info.contains("email TEXT [UNIQUE]"));
        assert!(matches!(
            coordinator.describe("ghost"),
            Err(Error::TableNotFound(_))
        ));
    }
}
