//! Employee and team views over the events store.
//!
//! Both subjects share one [`EntityView`]; the differences (which queries to
//! run, how to label pages) live in a [`SubjectSpec`]. Unknown ids are not
//! an error: they produce empty histories, `[0, 0]` features and no notes.

use std::fmt;

use crate::db::{
    catalog, DataAccessError, EventsDb, Identity, NoteRecord, Query, RowMapper, SubjectKind,
};

pub mod history;
pub use history::{CumulativePoint, EventHistory, FeatureVector, HISTORY_COLUMNS};

/// What distinguishes one kind of subject from another.
#[derive(Clone, Copy)]
pub struct SubjectSpec {
    pub kind: SubjectKind,
    /// Lists every subject; selects the id first.
    pub identity_sql: &'static str,
    /// Builds the display name from one `identity_sql` row.
    pub identity: RowMapper<Identity>,
    /// Risk is averaged over classifier rows rather than taken from the first.
    pub average_risk: bool,
}

pub const EMPLOYEE: SubjectSpec = SubjectSpec {
    kind: SubjectKind::Employee,
    identity_sql: catalog::EMPLOYEE_IDENTITIES,
    identity: catalog::employee_identity,
    average_risk: false,
};

pub const TEAM: SubjectSpec = SubjectSpec {
    kind: SubjectKind::Team,
    identity_sql: catalog::TEAM_IDENTITIES,
    identity: catalog::team_identity,
    average_risk: true,
};

impl fmt::Debug for SubjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectSpec")
            .field("kind", &self.kind)
            .field("average_risk", &self.average_risk)
            .finish_non_exhaustive()
    }
}

impl SubjectSpec {
    pub fn for_kind(kind: SubjectKind) -> &'static SubjectSpec {
        match kind {
            SubjectKind::Employee => &EMPLOYEE,
            SubjectKind::Team => &TEAM,
        }
    }

    /// Lowercase label, e.g. `"employee"`.
    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn identity_query(&self) -> Query<Identity> {
        let label = match self.kind {
            SubjectKind::Employee => "employee identities",
            SubjectKind::Team => "team identities",
        };
        catalog::identities(label, self.identity_sql, self.identity)
    }
}

/// Read-only view of one kind of subject.
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    db: &'a EventsDb,
    spec: &'static SubjectSpec,
}

impl<'a> EntityView<'a> {
    pub fn new(db: &'a EventsDb, spec: &'static SubjectSpec) -> Self {
        Self { db, spec }
    }

    pub fn employee(db: &'a EventsDb) -> Self {
        Self::new(db, &EMPLOYEE)
    }

    pub fn team(db: &'a EventsDb) -> Self {
        Self::new(db, &TEAM)
    }

    pub fn spec(&self) -> &'static SubjectSpec {
        self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name()
    }

    /// All subjects as `(id, display name)` in table order.
    pub fn list_identities(&self) -> Result<Vec<Identity>, DataAccessError> {
        self.db.execute(&self.spec.identity_query())
    }

    /// Dated event counts, ascending. Empty for unknown ids.
    pub fn event_history(&self, id: i64) -> Result<EventHistory, DataAccessError> {
        let rows = self.db.execute(&catalog::event_history(self.spec.kind, id))?;
        if rows.is_empty() {
            log::debug!("No events for {} {}", self.name(), id);
        }
        Ok(EventHistory::from_records(rows))
    }

    /// `[total_positive, total_negative]` over the whole history.
    pub fn feature_vector(&self, id: i64) -> Result<FeatureVector, DataAccessError> {
        Ok(self.event_history(id)?.totals())
    }

    /// Notes as stored, ascending by date.
    pub fn notes(&self, id: i64) -> Result<Vec<NoteRecord>, DataAccessError> {
        self.db.execute(&catalog::notes(self.spec.kind, id))
    }
}
