//! Storage layer for flightdesk.
//!
//! This module provides `SQLite`-based persistent storage for pilots,
//! destinations and flights. Every operation is column-driven: callers name
//! a [`Table`] and columns by string, and storage checks those names against
//! the live schema before they are placed in any SQL text. Values are always
//! bound as parameters.

pub mod migrations;
pub mod schema;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use rusqlite::{params, params_from_iter, Connection, Params};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{FlightBoardEntry, Table};
use crate::record::{Record, RecordSet, Value};

const MEMORY_PATH: &str = ":memory:";

/// Storage engine for flight data.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Table creation, drop and whole-database teardown
/// - Insert, lookup, search, update and delete by column name
/// - The joined flight board view
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Whether the database file was created by this open.
    created: bool,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let created = !path.exists();
        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", true)?;

        migrations::initialize_schema(&conn)?;

        if created {
            info!("Created new database at {}", path.display());
        } else {
            info!("Database opened successfully at {}", path.display());
        }
        Ok(Self {
            path,
            conn,
            created,
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        conn.pragma_update(None, "foreign_keys", true)?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
            created: true,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this open created the database file.
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.created
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    /// Turn foreign key enforcement on or off for this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the pragma cannot be set.
    pub fn set_foreign_keys(&self, enabled: bool) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", enabled)?;
        debug!("Foreign key enforcement {}", if enabled { "on" } else { "off" });
        Ok(())
    }

    /// Run `f` inside a transaction, committing if it succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `f` (after rolling back) or from the commit.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    /// Create a table (and its indexes) if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL fails.
    pub fn create_table(&self, table: Table) -> Result<()> {
        for statement in schema::table_ddl(table) {
            self.conn.execute(statement, [])?;
        }
        info!("Table {} created successfully", table);
        Ok(())
    }

    /// Drop a table if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the drop fails, including when foreign keys are
    /// enforced and other rows still reference this table.
    pub fn drop_table(&self, table: Table) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", table.name());
        debug!("Running: {}", sql);
        self.conn.execute(&sql, []).map_err(Error::from_sqlite)?;
        info!("Table {} dropped successfully", table);
        Ok(())
    }

    /// Check whether a table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn table_exists(&self, table: Table) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table.name()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of a table, in declaration order.
    ///
    /// Returns an empty list if the table does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn columns(&self, table: Table) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", table.name()))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn require_columns(&self, table: Table) -> Result<Vec<String>> {
        let columns = self.columns(table)?;
        if columns.is_empty() {
            return Err(Error::MissingTable(table.name().to_string()));
        }
        Ok(columns)
    }

    /// Match `column` against the live column list, returning the schema's
    /// spelling.
    fn resolve_column(known: &[String], table: Table, column: &str) -> Result<String> {
        known
            .iter()
            .find(|k| k.eq_ignore_ascii_case(column.trim()))
            .cloned()
            .ok_or_else(|| Error::unknown_column(table.name(), column))
    }

    /// Insert a record, returning the new row id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is empty, names an unknown column or the
    /// `id` column, or is rejected by a constraint.
    pub fn insert(&self, record: &Record) -> Result<i64> {
        let table = record.table();
        if record.is_empty() {
            return Err(Error::EmptyRecord {
                table: table.name().to_string(),
            });
        }

        let known = self.require_columns(table)?;
        let mut columns = Vec::with_capacity(record.len());
        for column in record.columns() {
            let column = Self::resolve_column(&known, table, column)?;
            if column == "id" {
                return Err(Error::ImmutableColumn { column });
            }
            columns.push(column);
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name(),
            columns.join(", "),
            placeholders.join(", ")
        );
        debug!("Running: {} with {:?}", sql, record.values());

        self.conn
            .execute(&sql, params_from_iter(record.values()))
            .map_err(Error::from_sqlite)?;

        let id = self.conn.last_insert_rowid();
        info!("Inserted row {} into {}", id, table);
        Ok(id)
    }

    /// Fetch one row by id. The result is empty if no row matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or the query fails.
    pub fn get(&self, table: Table, id: i64) -> Result<RecordSet> {
        self.require_columns(table)?;
        let sql = format!("SELECT * FROM {} WHERE id = ?1", table.name());
        self.query_set(&sql, [id])
    }

    /// Fetch every row of a table, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or the query fails.
    pub fn select_all(&self, table: Table) -> Result<RecordSet> {
        self.require_columns(table)?;
        let sql = format!("SELECT * FROM {} ORDER BY id", table.name());
        self.query_set(&sql, [])
    }

    /// Fetch rows where `column = value`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the table or column is unknown or the query fails.
    pub fn search(&self, table: Table, column: &str, value: &Value) -> Result<RecordSet> {
        let known = self.require_columns(table)?;
        let column = Self::resolve_column(&known, table, column)?;
        let sql = format!(
            "SELECT * FROM {} WHERE {column} = ?1 ORDER BY id",
            table.name()
        );
        self.query_set(&sql, [value])
    }

    /// Set one column of the row with the given id.
    ///
    /// Returns `true` if a row was updated, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown or is `id`, the table has no
    /// `id` column, or a constraint rejects the new value.
    pub fn update(&self, table: Table, id: i64, column: &str, value: &Value) -> Result<bool> {
        let known = self.require_columns(table)?;
        if !known.iter().any(|c| c == "id") {
            return Err(Error::unknown_column(table.name(), "id"));
        }
        let column = Self::resolve_column(&known, table, column)?;
        if column == "id" {
            return Err(Error::ImmutableColumn { column });
        }

        let sql = format!("UPDATE {} SET {column} = ?1 WHERE id = ?2", table.name());
        debug!("Running: {} with value {:?} for id {}", sql, value, id);
        let affected = self
            .conn
            .execute(&sql, params![value, id])
            .map_err(Error::from_sqlite)?;

        if affected > 0 {
            info!("Updated {}.{} for id {}", table, column, id);
        }
        Ok(affected > 0)
    }

    /// Delete a row by id.
    ///
    /// Returns `true` if a row was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or other rows still reference
    /// this one.
    pub fn delete(&self, table: Table, id: i64) -> Result<bool> {
        self.require_columns(table)?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", table.name());
        debug!("Running: {} for id {}", sql, id);
        let affected = self
            .conn
            .execute(&sql, [id])
            .map_err(Error::from_sqlite)?;

        if affected > 0 {
            info!("Deleted row {} from {}", id, table);
        }
        Ok(affected > 0)
    }

    /// Count the rows in a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or the query fails.
    pub fn count(&self, table: Table) -> Result<i64> {
        self.require_columns(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Flights joined with their route and pilot, ordered by departure.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the tables is missing or the query fails.
    pub fn flight_board(&self) -> Result<Vec<FlightBoardEntry>> {
        for table in Table::ALL {
            self.require_columns(table)?;
        }

        let mut stmt = self.conn.prepare(schema::SELECT_FLIGHT_BOARD)?;
        let entries = stmt
            .query_map([], |row| {
                Ok(FlightBoardEntry {
                    id: row.get(0)?,
                    flight_number: row.get(1)?,
                    from_code: row.get(2)?,
                    from_city: row.get(3)?,
                    to_code: row.get(4)?,
                    to_city: row.get(5)?,
                    departure_time: row.get(6)?,
                    arrival_time: row.get(7)?,
                    status: row.get(8)?,
                    pilot: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let mut tables = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let rows = if self.table_exists(table)? {
                Some(self.count(table)?)
            } else {
                None
            };
            tables.push(TableStats { table, rows });
        }

        let db_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            path: self.path.clone(),
            schema_version: migrations::get_schema_version(&self.conn)?,
            tables,
            db_size_bytes,
        })
    }

    /// Close the connection and delete the database file with its WAL and
    /// shared-memory companions.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be closed or a file cannot
    /// be removed.
    pub fn destroy(self) -> Result<()> {
        let in_memory = self.is_in_memory();
        let Self { path, conn, .. } = self;
        conn.close().map_err(|(_, err)| Error::from(err))?;

        if in_memory {
            return Ok(());
        }

        for file in [path.clone(), sidecar(&path, "-wal"), sidecar(&path, "-shm")] {
            match std::fs::remove_file(&file) {
                Ok(()) => debug!("Removed {}", file.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        info!("Database {} removed", path.display());
        Ok(())
    }

    /// Run a query and collect every column of every row.
    fn query_set<P: Params>(&self, sql: &str, params: P) -> Result<RecordSet> {
        debug!("Running: {}", sql);
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let rows = stmt
            .query_map(params, |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(Value::from))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(RecordSet { columns, rows })
    }
}

/// `<path><suffix>`, e.g. `Flights.db-wal`.
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Row count for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStats {
    /// The table.
    pub table: Table,
    /// Number of rows, or `None` if the table has been dropped.
    pub rows: Option<i64>,
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Path to the database file.
    pub path: PathBuf,
    /// Schema version recorded in the metadata table.
    pub schema_version: i32,
    /// Per-table row counts.
    pub tables: Vec<TableStats>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn pilot(license: &str) -> Record {
        Record::new(Table::Pilots)
            .with("first_name", "Amelia")
            .with("last_name", "Earhart")
            .with("license_number", license)
            .with("flight_hours", 1200_i64)
    }

    fn destination(city: &str, code: &str) -> Record {
        Record::new(Table::Destinations)
            .with("city", city)
            .with("country", "Testland")
            .with("airport_code", code)
    }

    fn flight(number: &str, from: i64, to: i64, pilot: Option<i64>) -> Record {
        let mut record = Record::new(Table::Flights)
            .with("flight_number", number)
            .with("source_id", from)
            .with("destination_id", to)
            .with("departure_time", "2025-03-01 08:30")
            .with("arrival_time", "2025-03-01 11:45")
            .with("status", "scheduled");
        if let Some(p) = pilot {
            record.set("pilot_id", p);
        }
        record
    }

    fn populated_storage() -> Storage {
        let storage = create_test_storage();
        storage.insert(&pilot("LIC-001")).unwrap();
        storage.insert(&destination("London", "LHR")).unwrap();
        storage.insert(&destination("Paris", "CDG")).unwrap();
        storage.insert(&flight("BA304", 1, 2, Some(1))).unwrap();
        storage
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert!(storage.was_created());
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_columns() {
        let storage = create_test_storage();
        assert_eq!(
            storage.columns(Table::Destinations).unwrap(),
            vec!["id", "city", "country", "airport_code"]
        );
    }

    #[test]
    fn test_insert_and_get() {
        let storage = create_test_storage();
        let id = storage.insert(&pilot("LIC-001")).unwrap();

        let row = storage.get(Table::Pilots, id).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row.value(0, "last_name"), Some(&Value::from("Earhart")));
        assert_eq!(row.value(0, "flight_hours"), Some(&Value::Integer(1200)));
    }

    #[test]
    fn test_get_nonexistent() {
        let storage = create_test_storage();
        let row = storage.get(Table::Pilots, 99_999).unwrap();
        assert!(row.is_empty());
        assert_eq!(row.columns.len(), 5);
    }

    #[test]
    fn test_insert_empty_record() {
        let storage = create_test_storage();
        let err = storage.insert(&Record::new(Table::Pilots)).unwrap_err();
        assert!(matches!(err, Error::EmptyRecord { .. }));
    }

    #[test]
    fn test_insert_unknown_column() {
        let storage = create_test_storage();
        let record = pilot("LIC-001").with("rank", "captain");
        let err = storage.insert(&record).unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { ref column, .. } if column == "rank"));
    }

    #[test]
    fn test_insert_rejects_id() {
        let storage = create_test_storage();
        let record = pilot("LIC-001").with("id", 7_i64);
        let err = storage.insert(&record).unwrap_err();
        assert!(matches!(err, Error::ImmutableColumn { .. }));
    }

    #[test]
    fn test_insert_unique_violation() {
        let storage = create_test_storage();
        storage.insert(&pilot("LIC-001")).unwrap();
        let err = storage.insert(&pilot("LIC-001")).unwrap_err();
        assert!(err.is_constraint());
        assert!(err.to_string().contains("license_number"));
    }

    #[test]
    fn test_insert_check_violation() {
        let storage = create_test_storage();
        let record = pilot("LIC-001").with("flight_hours", Value::Integer(-1));
        let err = storage.insert(&record).unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_insert_not_null_violation() {
        let storage = create_test_storage();
        let record = Record::new(Table::Destinations).with("city", "Nowhere");
        let err = storage.insert(&record).unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_insert_foreign_key_violation() {
        let storage = create_test_storage();
        let err = storage.insert(&flight("BA1", 1, 2, None)).unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_foreign_keys_can_be_disabled() {
        let storage = create_test_storage();
        storage.set_foreign_keys(false).unwrap();
        assert!(storage.insert(&flight("BA1", 1, 2, None)).is_ok());
    }

    #[test]
    fn test_flight_route_checks() {
        let storage = populated_storage();

        let same_airport = flight("BA2", 1, 1, None);
        assert!(storage.insert(&same_airport).unwrap_err().is_constraint());

        let backwards = flight("BA3", 1, 2, None)
            .with("arrival_time", "2025-03-01 06:00");
        assert!(storage.insert(&backwards).unwrap_err().is_constraint());
    }

    #[test]
    fn test_select_all_ordered_by_id() {
        let storage = create_test_storage();
        storage.insert(&destination("Oslo", "OSL")).unwrap();
        storage.insert(&destination("Lima", "LIM")).unwrap();

        let all = storage.select_all(Table::Destinations).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.value(0, "city"), Some(&Value::from("Oslo")));
        assert_eq!(all.value(1, "id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_search_by_column() {
        let storage = create_test_storage();
        storage.insert(&destination("Oslo", "OSL")).unwrap();
        storage.insert(&destination("Lima", "LIM")).unwrap();

        let found = storage
            .search(Table::Destinations, "AIRPORT_CODE", &Value::from("LIM"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.value(0, "city"), Some(&Value::from("Lima")));

        let none = storage
            .search(Table::Destinations, "city", &Value::from("Rome"))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_search_integer_column() {
        let storage = create_test_storage();
        storage.insert(&pilot("LIC-001")).unwrap();

        let found = storage
            .search(Table::Pilots, "flight_hours", &Value::Integer(1200))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_search_unknown_column() {
        let storage = create_test_storage();
        let err = storage
            .search(Table::Pilots, "1=1; DROP TABLE pilots; --", &Value::Null)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
        assert!(storage.table_exists(Table::Pilots).unwrap());
    }

    #[test]
    fn test_update() {
        let storage = create_test_storage();
        let id = storage.insert(&pilot("LIC-001")).unwrap();

        assert!(storage
            .update(Table::Pilots, id, "flight_hours", &Value::Integer(1300))
            .unwrap());
        let row = storage.get(Table::Pilots, id).unwrap();
        assert_eq!(row.value(0, "flight_hours"), Some(&Value::Integer(1300)));
    }

    #[test]
    fn test_update_missing_row() {
        let storage = create_test_storage();
        assert!(!storage
            .update(Table::Pilots, 42, "first_name", &Value::from("X"))
            .unwrap());
    }

    #[test]
    fn test_update_id_rejected() {
        let storage = create_test_storage();
        let id = storage.insert(&pilot("LIC-001")).unwrap();
        let err = storage
            .update(Table::Pilots, id, "ID", &Value::Integer(9))
            .unwrap_err();
        assert!(matches!(err, Error::ImmutableColumn { .. }));
    }

    #[test]
    fn test_update_constraint() {
        let storage = create_test_storage();
        storage.insert(&pilot("LIC-001")).unwrap();
        let id = storage.insert(&pilot("LIC-002")).unwrap();
        let err = storage
            .update(Table::Pilots, id, "license_number", &Value::from("LIC-001"))
            .unwrap_err();
        assert!(err.is_constraint());
    }

    #[test]
    fn test_delete() {
        let storage = create_test_storage();
        let id = storage.insert(&destination("Oslo", "OSL")).unwrap();

        assert!(storage.delete(Table::Destinations, id).unwrap());
        assert!(storage.get(Table::Destinations, id).unwrap().is_empty());
        assert!(!storage.delete(Table::Destinations, id).unwrap());
    }

    #[test]
    fn test_delete_referenced_row() {
        let storage = populated_storage();
        let err = storage.delete(Table::Destinations, 1).unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(storage.count(Table::Destinations).unwrap(), 2);
    }

    #[test]
    fn test_count() {
        let storage = populated_storage();
        assert_eq!(storage.count(Table::Pilots).unwrap(), 1);
        assert_eq!(storage.count(Table::Destinations).unwrap(), 2);
        assert_eq!(storage.count(Table::Flights).unwrap(), 1);
    }

    #[test]
    fn test_drop_and_create_table() {
        let storage = create_test_storage();
        storage.drop_table(Table::Flights).unwrap();

        assert!(!storage.table_exists(Table::Flights).unwrap());
        assert!(storage.columns(Table::Flights).unwrap().is_empty());
        let err = storage.select_all(Table::Flights).unwrap_err();
        assert!(matches!(err, Error::MissingTable(ref t) if t == "flights"));

        storage.create_table(Table::Flights).unwrap();
        assert!(storage.table_exists(Table::Flights).unwrap());
    }

    #[test]
    fn test_drop_missing_table_is_noop() {
        let storage = create_test_storage();
        storage.drop_table(Table::Flights).unwrap();
        storage.drop_table(Table::Flights).unwrap();
    }

    #[test]
    fn test_flight_board() {
        let storage = populated_storage();
        storage
            .insert(&flight("AF101", 2, 1, None).with("departure_time", "2025-03-01 07:00"))
            .unwrap();

        let board = storage.flight_board().unwrap();
        assert_eq!(board.len(), 2);

        assert_eq!(board[0].flight_number, "AF101");
        assert_eq!(board[0].from_city, "Paris");
        assert!(board[0].pilot.is_none());

        assert_eq!(board[1].flight_number, "BA304");
        assert_eq!(board[1].to_code, "CDG");
        assert_eq!(board[1].pilot.as_deref(), Some("Amelia Earhart"));
    }

    #[test]
    fn test_in_transaction_rolls_back() {
        let storage = create_test_storage();
        let result: Result<()> = storage.in_transaction(|s| {
            s.insert(&pilot("LIC-001"))?;
            Err(Error::internal("abort"))
        });
        assert!(result.is_err());
        assert_eq!(storage.count(Table::Pilots).unwrap(), 0);
    }

    #[test]
    fn test_in_transaction_commits() {
        let storage = create_test_storage();
        storage
            .in_transaction(|s| {
                s.insert(&pilot("LIC-001"))?;
                s.insert(&pilot("LIC-002"))
            })
            .unwrap();
        assert_eq!(storage.count(Table::Pilots).unwrap(), 2);
    }

    #[test]
    fn test_stats() {
        let storage = populated_storage();
        storage.drop_table(Table::Flights).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.schema_version, migrations::CURRENT_VERSION);
        assert_eq!(stats.db_size_bytes, 0);
        assert_eq!(
            stats.tables,
            vec![
                TableStats {
                    table: Table::Pilots,
                    rows: Some(1)
                },
                TableStats {
                    table: Table::Destinations,
                    rows: Some(2)
                },
                TableStats {
                    table: Table::Flights,
                    rows: None
                },
            ]
        );
    }

    #[test]
    fn test_open_file_based_and_destroy() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("Testing.db");

        let storage = Storage::open(&db_path).unwrap();
        assert!(storage.was_created());
        storage.insert(&destination("Oslo", "OSL")).unwrap();
        assert!(storage.stats().unwrap().db_size_bytes > 0);
        drop(storage);

        let storage = Storage::open(&db_path).unwrap();
        assert!(!storage.was_created());
        assert_eq!(storage.count(Table::Destinations).unwrap(), 1);

        storage.destroy().unwrap();
        assert!(!db_path.exists());
        assert!(!sidecar(&db_path, "-wal").exists());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/Flights.db");

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
        drop(storage);
    }

    #[test]
    fn test_sidecar() {
        assert_eq!(
            sidecar(Path::new("/tmp/Flights.db"), "-wal"),
            PathBuf::from("/tmp/Flights.db-wal")
        );
    }
}
