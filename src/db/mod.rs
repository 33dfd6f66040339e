//! Read-only SQLite access for the employee events store.
//!
//! Every call opens its own connection, runs one statement, fetches all rows
//! and closes the connection before returning, whether the statement
//! succeeded or not. There is no pooling, caching or transaction state, so an
//! `EventsDb` can be shared freely between callers.
//!
//! Statements are described by a [`Query`] (SQL text, bound integer
//! parameters, row mapper) built in [`catalog`] and handed to
//! [`EventsDb::execute`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::{params_from_iter, Connection, OpenFlags, Row};

pub mod catalog;
pub mod types;
pub use types::*;

#[cfg(test)]
pub(crate) mod test_support;

/// Tables the store must provide. Checked by [`EventsDb::missing_tables`],
/// never created here.
pub const REQUIRED_TABLES: [&str; 4] = ["employee", "team", "employee_events", "notes"];

/// Maps one result row to a typed record.
pub type RowMapper<T> = fn(&Row<'_>) -> rusqlite::Result<T>;

/// A fully built read-only statement.
///
/// Parameters are always bound, never spliced into `sql`.
pub struct Query<T> {
    pub label: &'static str,
    pub sql: &'static str,
    pub params: Vec<i64>,
    pub map: RowMapper<T>,
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("label", &self.label)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Handle to the store file. Holds no connection between calls.
#[derive(Debug)]
pub struct EventsDb {
    path: PathBuf,
    live: AtomicUsize,
}

impl EventsDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            live: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of connections currently open through this handle.
    ///
    /// Always zero between calls.
    pub fn live_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Run `query` on a fresh connection and return every row.
    ///
    /// All-or-nothing: a failure while stepping or mapping any row discards
    /// the rows already read.
    pub fn execute<T>(&self, query: &Query<T>) -> Result<Vec<T>, DataAccessError> {
        let scoped = self.connect()?;
        let fetched = fetch_all(scoped.conn(), query);
        let closed = scoped.close();

        let rows = fetched.map_err(|e| {
            log::warn!("{} failed: {}", query.label, e);
            DataAccessError::from(e)
        })?;
        closed?;

        log::debug!("{} returned {} rows", query.label, rows.len());
        Ok(rows)
    }

    /// Required tables that are absent from the store.
    pub fn missing_tables(&self) -> Result<Vec<&'static str>, DataAccessError> {
        let present = self.execute(&catalog::table_names())?;
        Ok(REQUIRED_TABLES
            .iter()
            .copied()
            .filter(|t| !present.iter().any(|p| p == t))
            .collect())
    }

    fn connect(&self) -> Result<ScopedConnection<'_>, DataAccessError> {
        // Read-only open would otherwise fail with a bare CANTOPEN.
        if !self.path.exists() {
            return Err(DataAccessError::DatabaseNotFound(self.path.clone()));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(ScopedConnection {
            conn,
            _guard: LiveGuard(&self.live),
        })
    }
}

fn fetch_all<T>(conn: &Connection, query: &Query<T>) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare(query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), query.map)?;
    rows.collect()
}

/// A connection that is released when it goes out of scope.
struct ScopedConnection<'a> {
    conn: Connection,
    _guard: LiveGuard<'a>,
}

impl ScopedConnection<'_> {
    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Close explicitly so close errors surface instead of being dropped.
    fn close(self) -> Result<(), DataAccessError> {
        let ScopedConnection { conn, _guard } = self;
        conn.close().map_err(|(_, e)| DataAccessError::Sqlite(e))
    }
}

/// Decrements the live-connection count when dropped.
struct LiveGuard<'a>(&'a AtomicUsize);

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{fixture_db, seed_employee_events};
    use super::*;

    fn employee_identities() -> Query<Identity> {
        catalog::identities(
            "employee identities",
            catalog::EMPLOYEE_IDENTITIES,
            catalog::employee_identity,
        )
    }

    fn team_identities() -> Query<Identity> {
        catalog::identities("team identities", catalog::TEAM_IDENTITIES, catalog::team_identity)
    }

    #[test]
    fn test_execute_releases_connection_on_success() {
        let (_dir, db) = fixture_db();
        let rows = db
            .execute(&employee_identities())
            .expect("identity query should succeed");
        assert!(!rows.is_empty());
        assert_eq!(db.live_connections(), 0);
    }

    #[test]
    fn test_execute_releases_connection_on_statement_failure() {
        let (_dir, db) = fixture_db();
        let broken: Query<i64> = Query {
            label: "broken",
            sql: "SELECT nope FROM missing_table",
            params: Vec::new(),
            map: |row| row.get(0),
        };
        let err = db.execute(&broken).unwrap_err();
        assert!(matches!(err, DataAccessError::Sqlite(_)), "got {err:?}");
        assert_eq!(db.live_connections(), 0);
    }

    #[test]
    fn test_execute_fails_whole_call_on_bad_row() {
        let (_dir, db) = fixture_db();
        seed_employee_events(
            db.path(),
            1,
            &[("2024-03-01", 1, 0), ("not-a-date", 2, 2), ("2024-03-03", 1, 1)],
        );
        let result = db.execute(&catalog::event_history(SubjectKind::Employee, 1));
        assert!(matches!(result, Err(DataAccessError::Sqlite(_))));
        assert_eq!(db.live_connections(), 0);
    }

    #[test]
    fn test_missing_database_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = EventsDb::new(dir.path().join("absent.db"));
        let err = db
            .execute(&team_identities())
            .unwrap_err();
        assert!(matches!(err, DataAccessError::DatabaseNotFound(_)));
        assert_eq!(db.live_connections(), 0);
        // Read-only open must not create the file as a side effect.
        assert!(!db.path().exists());
    }

    #[test]
    fn test_connections_are_read_only() {
        let (_dir, db) = fixture_db();
        let write: Query<i64> = Query {
            label: "write",
            sql: "DELETE FROM team RETURNING team_id",
            params: Vec::new(),
            map: |row| row.get(0),
        };
        assert!(db.execute(&write).is_err());
        let teams = db
            .execute(&team_identities())
            .expect("teams should still be readable");
        assert_eq!(teams.len(), 2);
    }

    #[test]
    fn test_missing_tables_on_complete_schema() {
        let (_dir, db) = fixture_db();
        assert!(db.missing_tables().expect("schema check").is_empty());
    }

    #[test]
    fn test_missing_tables_reports_absent_tables() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("partial.db");
        let conn = Connection::open(&path).expect("open");
        conn.execute_batch("CREATE TABLE employee (employee_id INTEGER PRIMARY KEY);")
            .expect("create");
        drop(conn);

        let db = EventsDb::new(&path);
        assert_eq!(
            db.missing_tables().expect("schema check"),
            vec!["team", "employee_events", "notes"]
        );
    }
}
