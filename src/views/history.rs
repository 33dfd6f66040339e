//! Derived tables built from event rows.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::EventRecord;

/// Column names of an [`EventHistory`], in order.
pub const HISTORY_COLUMNS: [&str; 3] = ["date", "positive", "negative"];

/// Per-date event counts for one subject, ascending by date.
///
/// An empty history is still a well-formed table: it reports the same
/// three columns and zero rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventHistory {
    rows: Vec<EventRecord>,
}

impl EventHistory {
    /// Build from store rows. Rows are stably re-sorted by date so the
    /// ordering holds even for rows that did not come from the catalog.
    pub fn from_records(mut rows: Vec<EventRecord>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self { rows }
    }

    pub fn columns(&self) -> [&'static str; 3] {
        HISTORY_COLUMNS
    }

    pub fn rows(&self) -> &[EventRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of positive and negative counts. `[0, 0]` when empty.
    pub fn totals(&self) -> FeatureVector {
        self.rows
            .iter()
            .fold(FeatureVector::default(), |acc, r| FeatureVector {
                total_positive: acc.total_positive + u64::from(r.positive),
                total_negative: acc.total_negative + u64::from(r.negative),
            })
    }

    /// Running totals per row, for trend charts.
    pub fn cumulative(&self) -> Vec<CumulativePoint> {
        let mut positive = 0u64;
        let mut negative = 0u64;
        self.rows
            .iter()
            .map(|r| {
                positive += u64::from(r.positive);
                negative += u64::from(r.negative);
                CumulativePoint {
                    date: r.date,
                    positive,
                    negative,
                }
            })
            .collect()
    }
}

/// One point on a cumulative positive/negative trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub positive: u64,
    pub negative: u64,
}

/// Classifier input: `[total_positive, total_negative]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub total_positive: u64,
    pub total_negative: u64,
}

impl FeatureVector {
    pub fn new(total_positive: u64, total_negative: u64) -> Self {
        Self {
            total_positive,
            total_negative,
        }
    }

    pub fn as_array(&self) -> [u64; 2] {
        [self.total_positive, self.total_negative]
    }

    /// Values as model inputs.
    pub fn as_f64(&self) -> [f64; 2] {
        [self.total_positive as f64, self.total_negative as f64]
    }
}
