//! Shared type definitions for the data-access layer.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the connection executor.
///
/// Zero rows is never an error; callers get an empty `Vec` instead.
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database not found at {0}")]
    DatabaseNotFound(PathBuf),
}

/// A stored value that does not fit the expected column shape.
///
/// Boxed into `rusqlite::Error::FromSqlConversionFailure` by the row mappers,
/// so it reaches callers as `DataAccessError::Sqlite`.
#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("unrecognized date {0:?}")]
    InvalidDate(String),

    #[error("event count out of range: {0}")]
    CountOutOfRange(i64),
}

/// The unit that event and note rows are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Employee,
    Team,
}

impl SubjectKind {
    /// Label used in page titles and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Employee => "employee",
            SubjectKind::Team => "team",
        }
    }

    /// Parse a command-line label. Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Some(SubjectKind::Employee),
            "team" => Some(SubjectKind::Team),
            _ => None,
        }
    }

    /// Column in `employee_events` and `notes` that references this subject.
    pub fn id_column(&self) -> &'static str {
        match self {
            SubjectKind::Employee => "employee_id",
            SubjectKind::Team => "team_id",
        }
    }
}

/// One `(id, display name)` pair for a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub display_name: String,
}

/// A row from `employee_events`, projected to date and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub date: NaiveDate,
    pub positive: u32,
    pub negative: u32,
}

/// A row from `notes`, passed through as stored.
///
/// `date` keeps the stored text so an odd value never fails the query;
/// use [`NoteRecord::parsed_date`] for a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub date: String,
    pub note: String,
}

impl NoteRecord {
    /// `None` when the stored date is not in a recognized format.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        super::catalog::parse_store_date(&self.date)
    }
}
