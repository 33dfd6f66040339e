//! The fixed set of read-only statements over the events store.
//!
//! Each builder returns a [`Query`] ready for [`super::EventsDb::execute`].
//! Subject ids are bound as `?1`; the subject column is picked from static
//! SQL per [`SubjectKind`], so no caller input is ever spliced into text.
//! Date-ordered queries sort ascending because cumulative series are built
//! by folding rows in order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::types::{Type, ValueRef};
use rusqlite::Row;

use super::{ColumnError, EventRecord, Identity, NoteRecord, Query, RowMapper, SubjectKind};

/// Employee identities; pair with [`employee_identity`].
pub const EMPLOYEE_IDENTITIES: &str = "SELECT employee_id, first_name, last_name
     FROM employee
     ORDER BY rowid";

/// Team identities; pair with [`team_identity`].
pub const TEAM_IDENTITIES: &str = "SELECT team_id, team_name
     FROM team
     ORDER BY rowid";

const EMPLOYEE_EVENTS: &str = "SELECT event_date, positive_events, negative_events
     FROM employee_events
     WHERE employee_id = ?1
     ORDER BY event_date";

const TEAM_EVENTS: &str = "SELECT event_date, positive_events, negative_events
     FROM employee_events
     WHERE team_id = ?1
     ORDER BY event_date";

const EMPLOYEE_NOTES: &str = "SELECT note_date, note
     FROM notes
     WHERE employee_id = ?1
     ORDER BY note_date";

const TEAM_NOTES: &str = "SELECT note_date, note
     FROM notes
     WHERE team_id = ?1
     ORDER BY note_date";

/// Every subject as `(id, display name)`, in table order.
///
/// `sql` selects the id first; `map` builds the display name.
pub fn identities(
    label: &'static str,
    sql: &'static str,
    map: RowMapper<Identity>,
) -> Query<Identity> {
    Query {
        label,
        sql,
        params: Vec::new(),
        map,
    }
}

/// Event counts for one subject, oldest first.
pub fn event_history(kind: SubjectKind, subject_id: i64) -> Query<EventRecord> {
    let (label, sql) = match kind {
        SubjectKind::Employee => ("employee events", EMPLOYEE_EVENTS),
        SubjectKind::Team => ("team events", TEAM_EVENTS),
    };
    Query {
        label,
        sql,
        params: vec![subject_id],
        map: event_record,
    }
}

/// Notes for one subject, oldest first.
pub fn notes(kind: SubjectKind, subject_id: i64) -> Query<NoteRecord> {
    let (label, sql) = match kind {
        SubjectKind::Employee => ("employee notes", EMPLOYEE_NOTES),
        SubjectKind::Team => ("team notes", TEAM_NOTES),
    };
    Query {
        label,
        sql,
        params: vec![subject_id],
        map: note_record,
    }
}

/// Names of all tables in the store.
pub fn table_names() -> Query<String> {
    Query {
        label: "table names",
        sql: "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        params: Vec::new(),
        map: |row| row.get(0),
    }
}

/// `"first last"`.
pub fn employee_identity(row: &Row<'_>) -> rusqlite::Result<Identity> {
    let first: String = row.get(1)?;
    let last: String = row.get(2)?;
    Ok(Identity {
        id: row.get(0)?,
        display_name: format!("{first} {last}"),
    })
}

/// `team_name` as stored.
pub fn team_identity(row: &Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: row.get(0)?,
        display_name: row.get(1)?,
    })
}

fn event_record(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        date: date_column(row, 0)?,
        positive: count_column(row, 1)?,
        negative: count_column(row, 2)?,
    })
}

fn note_record(row: &Row<'_>) -> rusqlite::Result<NoteRecord> {
    Ok(NoteRecord {
        date: text_column(row, 0)?,
        note: text_column(row, 1)?,
    })
}

/// Any stored value as display text. NULL reads as empty.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    parse_store_date(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(ColumnError::InvalidDate(raw)),
        )
    })
}

/// NULL counts read as zero. Negative or oversized counts are rejected.
fn count_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let raw: Option<i64> = row.get(idx)?;
    let value = raw.unwrap_or(0);
    u32::try_from(value).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            Box::new(ColumnError::CountOutOfRange(value)),
        )
    })
}

/// Parse a stored date, keeping only the calendar day.
///
/// Accepts `YYYY-MM-DD`, SQLite `datetime()` output and RFC 3339.
pub fn parse_store_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}
