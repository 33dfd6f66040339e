//! Fixture databases for unit tests.
//!
//! Seeded contents:
//! - teams: 1 "Alpha", 2 "Beta"
//! - employees: 1 Ada Lovelace (team 1), 2 Grace Hopper (team 1),
//!   3 Linus Torvalds (team 2, no events or notes)
//! - events: employee 1 on 2024-01-02 (2, 0) and 2024-01-01 (3, 1), inserted
//!   newest first; employee 2 on 2024-01-03 (1, 2) and 2024-01-05 (0, 1)
//! - notes: employee 1 on 2024-01-04 and 2024-01-01, inserted newest first

use std::path::Path;

use rusqlite::{params, Connection};
use tempfile::TempDir;

use super::EventsDb;

const SEED: &str = "
INSERT INTO team (team_id, team_name, shift, manager_name) VALUES
    (1, 'Alpha', 'day', 'Mara Quinn'),
    (2, 'Beta', 'night', 'Otto Reyes');

INSERT INTO employee (employee_id, first_name, last_name, team_id) VALUES
    (1, 'Ada', 'Lovelace', 1),
    (2, 'Grace', 'Hopper', 1),
    (3, 'Linus', 'Torvalds', 2);

INSERT INTO employee_events (event_date, employee_id, team_id, positive_events, negative_events) VALUES
    ('2024-01-02', 1, 1, 2, 0),
    ('2024-01-01', 1, 1, 3, 1),
    ('2024-01-03', 2, 1, 1, 2),
    ('2024-01-05', 2, 1, 0, 1);

INSERT INTO notes (employee_id, team_id, note, note_date) VALUES
    (1, 1, 'Second note', '2024-01-04'),
    (1, 1, 'First note', '2024-01-01');
";

/// Create a seeded store in a fresh temp directory.
///
/// The `TempDir` is returned so the file outlives the test body.
pub(crate) fn fixture_db() -> (TempDir, EventsDb) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("employee_events.db");
    let conn = Connection::open(&path).expect("Failed to create fixture database");
    conn.execute_batch(include_str!("fixture_schema.sql"))
        .expect("Failed to apply fixture schema");
    conn.execute_batch(SEED).expect("Failed to seed fixture");
    drop(conn);
    (dir, EventsDb::new(path))
}

/// Append `(date, positive, negative)` rows for an employee. Team id is
/// looked up from the employee row.
pub(crate) fn seed_employee_events(path: &Path, employee_id: i64, rows: &[(&str, i64, i64)]) {
    let conn = Connection::open(path).expect("open fixture");
    for (date, pos, neg) in rows {
        conn.execute(
            "INSERT INTO employee_events (event_date, employee_id, team_id, positive_events, negative_events)
             VALUES (?1, ?2, (SELECT team_id FROM employee WHERE employee_id = ?2), ?3, ?4)",
            params![date, employee_id, pos, neg],
        )
        .expect("insert event");
    }
}

/// Append `(date, note)` rows attached to a team only.
pub(crate) fn seed_team_notes(path: &Path, team_id: i64, rows: &[(&str, &str)]) {
    let conn = Connection::open(path).expect("open fixture");
    for (date, note) in rows {
        conn.execute(
            "INSERT INTO notes (employee_id, team_id, note, note_date) VALUES (NULL, ?1, ?2, ?3)",
            params![team_id, note, date],
        )
        .expect("insert note");
    }
}
