//! Recruitment-risk scoring from event feature vectors.
//!
//! The classifier is trained elsewhere and shipped as a small JSON file
//! (`assets/model.json` by default). Scoring only needs the probability of
//! the positive class; classifiers that can only emit a hard label are
//! mapped to `[1 - p, p]`.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::db::DataAccessError;
use crate::views::{EntityView, FeatureVector, SubjectSpec};

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Classifier does not provide probabilities")]
    Unsupported,

    #[error("Classifier error: {0}")]
    Model(String),

    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] DataAccessError),
}

/// A pre-trained binary classifier over [`FeatureVector`] rows.
pub trait RiskClassifier {
    /// `[p(no risk), p(risk)]` per row.
    fn predict_proba(&self, _rows: &[FeatureVector]) -> Result<Vec<[f64; 2]>, RiskError> {
        Err(RiskError::Unsupported)
    }

    /// Hard `0`/`1` label per row.
    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<u8>, RiskError>;
}

/// Logistic regression over `[total_positive, total_negative]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticModel {
    pub coefficients: [f64; 2],
    pub intercept: f64,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self, RiskError> {
        let content = std::fs::read_to_string(path)?;
        let model: LogisticModel = serde_json::from_str(&content)?;
        if !model.intercept.is_finite() || model.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(RiskError::Model(format!(
                "non-finite weights in {}",
                path.display()
            )));
        }
        log::info!("Loaded risk model from {}", path.display());
        Ok(model)
    }

    fn probability(&self, row: &FeatureVector) -> f64 {
        let [x0, x1] = row.as_f64();
        let z = self.intercept + self.coefficients[0] * x0 + self.coefficients[1] * x1;
        1.0 / (1.0 + (-z).exp())
    }
}

impl RiskClassifier for LogisticModel {
    fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Vec<[f64; 2]>, RiskError> {
        Ok(rows
            .iter()
            .map(|r| {
                let p = self.probability(r);
                [1.0 - p, p]
            })
            .collect())
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<u8>, RiskError> {
        Ok(rows
            .iter()
            .map(|r| u8::from(self.probability(r) >= 0.5))
            .collect())
    }
}

/// Probability of the risk class for each row.
///
/// Falls back to `predict` when `predict_proba` is unsupported.
pub fn risk_probabilities(
    classifier: &dyn RiskClassifier,
    rows: &[FeatureVector],
) -> Result<Vec<f64>, RiskError> {
    let proba = match classifier.predict_proba(rows) {
        Ok(proba) => proba,
        Err(RiskError::Unsupported) => {
            log::debug!("predict_proba unsupported, using hard labels");
            classifier
                .predict(rows)?
                .into_iter()
                .map(|label| {
                    let p = f64::from(label.min(1));
                    [1.0 - p, p]
                })
                .collect()
        }
        Err(e) => return Err(e),
    };

    proba
        .into_iter()
        .map(|[_, p]| {
            if p.is_finite() && (0.0..=1.0).contains(&p) {
                Ok(p)
            } else {
                Err(RiskError::Model(format!("probability out of range: {p}")))
            }
        })
        .collect()
}

/// Collapse per-row probabilities into one score for the subject.
///
/// Averaging subjects take the mean; others take the first row. No rows
/// scores 0.0.
pub fn aggregate_risk(spec: &SubjectSpec, probabilities: &[f64]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    if spec.average_risk {
        probabilities.iter().sum::<f64>() / probabilities.len() as f64
    } else {
        probabilities[0]
    }
}

/// Risk score in `[0, 1]` for one subject.
pub fn recruitment_risk(
    classifier: &dyn RiskClassifier,
    view: &EntityView<'_>,
    id: i64,
) -> Result<f64, RiskError> {
    let features = view.feature_vector(id)?;
    let probabilities = risk_probabilities(classifier, &[features])?;
    Ok(aggregate_risk(view.spec(), &probabilities))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::db::test_support::fixture_db;
    use crate::views::{EMPLOYEE, TEAM};

    /// Labels a row risky when negatives outnumber positives.
    struct LabelOnly;

    impl RiskClassifier for LabelOnly {
        fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<u8>, RiskError> {
            Ok(rows
                .iter()
                .map(|r| u8::from(r.total_negative > r.total_positive))
                .collect())
        }
    }

    struct Broken;

    impl RiskClassifier for Broken {
        fn predict_proba(&self, _rows: &[FeatureVector]) -> Result<Vec<[f64; 2]>, RiskError> {
            Ok(vec![[0.0, 1.5]])
        }

        fn predict(&self, _rows: &[FeatureVector]) -> Result<Vec<u8>, RiskError> {
            Err(RiskError::Model("should not be called".to_string()))
        }
    }

    fn model() -> LogisticModel {
        LogisticModel {
            coefficients: [-0.5, 0.8],
            intercept: 0.0,
        }
    }

    #[test]
    fn test_logistic_zero_input_is_sigmoid_of_intercept() {
        let p = risk_probabilities(&model(), &[FeatureVector::default()]).expect("proba");
        assert!((p[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_logistic_rows_sum_to_one() {
        let proba = model()
            .predict_proba(&[FeatureVector::new(5, 1), FeatureVector::new(0, 7)])
            .expect("proba");
        for [a, b] in proba {
            assert!((a + b - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fallback_synthesizes_from_labels() {
        let p = risk_probabilities(
            &LabelOnly,
            &[FeatureVector::new(1, 3), FeatureVector::new(3, 1)],
        )
        .expect("fallback");
        assert_eq!(p, vec![1.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        let err = risk_probabilities(&Broken, &[FeatureVector::default()]).unwrap_err();
        assert!(matches!(err, RiskError::Model(_)));
    }

    #[test]
    fn test_aggregate_employee_takes_first_row() {
        assert_eq!(aggregate_risk(&EMPLOYEE, &[0.2, 0.9]), 0.2);
        assert_eq!(aggregate_risk(&EMPLOYEE, &[]), 0.0);
    }

    #[test]
    fn test_aggregate_team_takes_mean() {
        assert!((aggregate_risk(&TEAM, &[0.2, 0.4, 0.9]) - 0.5).abs() < 1e-9);
        assert_eq!(aggregate_risk(&TEAM, &[]), 0.0);
    }

    #[test]
    fn test_recruitment_risk_for_fixture_subjects() {
        let (_dir, db) = fixture_db();
        let employee = EntityView::employee(&db);
        let team = EntityView::team(&db);

        // Employee 2 has 1 positive and 3 negative events.
        assert_eq!(recruitment_risk(&LabelOnly, &employee, 2).expect("risk"), 1.0);
        // Employee 3 has no events: features [0, 0].
        assert_eq!(recruitment_risk(&LabelOnly, &employee, 3).expect("risk"), 0.0);
        // Team 1 aggregates to [6, 4].
        assert_eq!(recruitment_risk(&LabelOnly, &team, 1).expect("risk"), 0.0);

        let p = recruitment_risk(&model(), &employee, 1).expect("risk");
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_load_model_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"coefficients": [-0.3, 0.6], "intercept": 0.1}}"#).expect("write");
        let loaded = LogisticModel::load(file.path()).expect("load");
        assert_eq!(loaded.coefficients, [-0.3, 0.6]);
        assert_eq!(loaded.intercept, 0.1);
    }

    #[test]
    fn test_load_model_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"coefficients": [1.0]}}"#).expect("write");
        assert!(matches!(
            LogisticModel::load(file.path()),
            Err(RiskError::Parse(_))
        ));
    }

    #[test]
    fn test_load_model_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(matches!(
            LogisticModel::load(&dir.path().join("model.json")),
            Err(RiskError::Io(_))
        ));
    }
}
