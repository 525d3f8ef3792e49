//! The SQLite database file and its read-side queries.

use crate::sql::checked_name;
use crate::{StoreError, StoreResult};
use pdbsync_schema::Schema;
use pdbsync_types::Timestamp;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Files SQLite may leave next to a database.
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Handle to the local SQLite database.
///
/// Cloning is cheap and every clone shares the same connection. Readers and
/// batches take the connection lock for the duration of one statement or one
/// transaction.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened database");
        Ok(Self::from_connection(conn))
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Opens a database file, first removing any existing one when
    /// `remove_existing` is set.
    pub fn create(path: impl AsRef<Path>, remove_existing: bool) -> StoreResult<Self> {
        let path = path.as_ref();
        if remove_existing && delete_database(path)? {
            info!(path = %path.display(), "removed existing database");
        }
        Self::open(path)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub(crate) fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Creates every table and index of `schema` that does not exist yet.
    pub fn init_schema(&self, schema: &Schema) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&schema.create_statements())?;
        debug!(tables = schema.tables.len(), "schema initialized");
        Ok(())
    }

    /// Deletes every row of every table in `schema` and resets the
    /// auto-increment counters. Returns the number of rows removed.
    pub fn clear(&self, schema: &Schema) -> StoreResult<usize> {
        for name in schema.table_names() {
            checked_name(name)?;
        }
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut removed = 0;
        for name in schema.table_names().into_iter().rev() {
            if table_exists(&tx, name)? {
                removed += tx.execute(&format!("DELETE FROM {name}"), [])?;
            }
        }
        if table_exists(&tx, "sqlite_sequence")? {
            tx.execute("DELETE FROM sqlite_sequence", [])?;
        }
        tx.commit()?;
        debug!(removed, "database cleared");
        Ok(removed)
    }

    /// Returns true when `table` exists in the database.
    pub fn has_table(&self, table: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        table_exists(&conn, table)
    }

    /// The watermark of `table`: the latest `updated` value stored in it, or
    /// [`Timestamp::EPOCH`] when the table is empty.
    pub fn since_date(&self, table: &str) -> StoreResult<Timestamp> {
        let table = checked_name(table)?;
        let conn = self.lock()?;
        if !table_exists(&conn, table)? {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        let latest: SqlValue =
            conn.query_row(&format!("SELECT MAX(updated) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        let since = match latest {
            SqlValue::Null => Timestamp::EPOCH,
            SqlValue::Integer(secs) => Timestamp::from_unix(secs),
            SqlValue::Real(secs) => Timestamp::from_unix(secs as i64),
            SqlValue::Text(text) => Timestamp::parse(&text)
                .map_err(|e| StoreError::InvalidData(format!("{table}.updated: {e}")))?,
            SqlValue::Blob(_) => {
                return Err(StoreError::InvalidData(format!(
                    "{table}.updated holds a blob"
                )));
            }
        };
        debug!(table, %since, "watermark");
        Ok(since)
    }

    /// Returns true when a row with `id` exists in `table`.
    pub fn exists(&self, table: &str, id: i64) -> StoreResult<bool> {
        let table = checked_name(table)?;
        let conn = self.lock()?;
        exists_in(&conn, table, id)
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: &str) -> StoreResult<usize> {
        let table = checked_name(table)?;
        let conn = self.lock()?;
        count_in(&conn, table)
    }

    /// Ids stored in `table`, ascending.
    pub fn ids(&self, table: &str) -> StoreResult<Vec<i64>> {
        let table = checked_name(table)?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT id FROM {table} ORDER BY id"))?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Reads one row as a column name to value map.
    pub fn row(&self, table: &str, id: i64) -> StoreResult<Option<BTreeMap<String, SqlValue>>> {
        let table = checked_name(table)?;
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {table} WHERE id = ?1"))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let row = stmt
            .query_row(params![id], |row| {
                let mut columns = BTreeMap::new();
                for (i, name) in names.iter().enumerate() {
                    columns.insert(name.clone(), row.get::<_, SqlValue>(i)?);
                }
                Ok(columns)
            })
            .optional()?;
        Ok(row)
    }
}

/// Removes a database file and its journal files. Returns false when there
/// was nothing to remove.
pub fn delete_database(path: impl AsRef<Path>) -> StoreResult<bool> {
    let path = path.as_ref();
    let removed = remove_if_present(path)?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_present(Path::new(&sidecar))?;
    }
    Ok(removed)
}

fn remove_if_present(path: &Path) -> StoreResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn exists_in(conn: &Connection, table: &str, id: i64) -> StoreResult<bool> {
    let mut stmt = conn.prepare_cached(&format!("SELECT id FROM {table} WHERE id = ?1"))?;
    Ok(stmt.exists(params![id])?)
}

pub(crate) fn count_in(conn: &Connection, table: &str) -> StoreResult<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(usize::try_from(count).unwrap_or_default())
}
