//! Dashboard data for one subject, ready to serialize.
//!
//! Rendering is left to the consumer; this gathers what a page shows:
//! a title, the subject picker options, the cumulative trend, the notes
//! table and the risk score.

use serde::Serialize;
use thiserror::Error;

use crate::db::{DataAccessError, Identity, NoteRecord, SubjectKind};
use crate::risk::{aggregate_risk, risk_probabilities, RiskClassifier, RiskError};
use crate::views::{CumulativePoint, EntityView, FeatureVector, SubjectSpec};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Data(#[from] DataAccessError),

    #[error(transparent)]
    Risk(#[from] RiskError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectReport {
    pub title: String,
    pub subject: SubjectKind,
    pub id: i64,
    /// `None` when the id is not in the identity list.
    pub display_name: Option<String>,
    pub options: Vec<Identity>,
    pub trend: Vec<CumulativePoint>,
    pub features: FeatureVector,
    /// `None` when no classifier was supplied.
    pub risk: Option<f64>,
    pub notes: Vec<NoteRecord>,
}

/// `"Employee Dashboard"` / `"Team Dashboard"`.
pub fn dashboard_title(spec: &SubjectSpec) -> String {
    let mut chars = spec.name().chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{name} Dashboard")
}

pub fn build_report(
    view: &EntityView<'_>,
    classifier: Option<&dyn RiskClassifier>,
    id: i64,
) -> Result<SubjectReport, ReportError> {
    let options = view.list_identities()?;
    let display_name = options
        .iter()
        .find(|o| o.id == id)
        .map(|o| o.display_name.clone());
    if display_name.is_none() {
        log::warn!("{} {} not found in identity list", view.name(), id);
    }

    let history = view.event_history(id)?;
    let features = history.totals();
    let risk = match classifier {
        Some(classifier) => {
            let probabilities = risk_probabilities(classifier, &[features])?;
            Some(aggregate_risk(view.spec(), &probabilities))
        }
        None => None,
    };

    Ok(SubjectReport {
        title: dashboard_title(view.spec()),
        subject: view.spec().kind,
        id,
        display_name,
        options,
        trend: history.cumulative(),
        features,
        risk,
        notes: view.notes(id)?,
    })
}
