use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use super::artifacts::{
    ArtifactError, Classifier, ClassifierError, ModelArtifacts, ProbabilityRow, ScalingMode,
    StandardScaler,
};
use super::domain::{ApplicantRecord, ApplicantValidationError, FeatureRecord};
use super::features::derive;
use super::render::{render, Decision, DecisionView};
use super::schema::{check_columns, FeatureVector, FEATURE_COLUMNS};
use crate::config::ArtifactConfig;

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Orchestrates scaling, classification, and rendering over the loaded artifacts.
///
/// Artifacts are immutable after construction, so a single service can be shared behind an
/// `Arc` by every request.
pub struct ScoringService {
    classifier: Arc<dyn Classifier>,
    scaler: Arc<StandardScaler>,
    scaling: ScalingMode,
}

/// Feature record and rendered decision for one applicant.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredApplicant {
    pub features: FeatureRecord,
    pub decision: DecisionView,
}

impl ScoringService {
    pub fn new(artifacts: ModelArtifacts, scaling: ScalingMode) -> Result<Self, ScoringError> {
        check_columns(artifacts.classifier.feature_names(), &FEATURE_COLUMNS).map_err(
            |mismatch| ScoringError::MalformedInput {
                detail: format!(
                    "classifier expects a different feature layout: {}",
                    mismatch.describe()
                ),
            },
        )?;
        artifacts
            .scaler
            .validate()
            .map_err(|detail| ScoringError::MalformedInput {
                detail: format!("scaler does not match the continuous columns: {detail}"),
            })?;

        if scaling == ScalingMode::Passthrough {
            warn!(
                "feature scaling bypassed: the classifier receives raw values even though a \
                 scaler was fit for the 13 continuous columns"
            );
        }

        Ok(Self {
            classifier: artifacts.classifier,
            scaler: artifacts.scaler,
            scaling,
        })
    }

    /// Loads both artifacts from the configured paths; any failure disables scoring.
    pub fn from_config(config: &ArtifactConfig) -> Result<Self, ScoringError> {
        let artifacts = ModelArtifacts::load(&config.model_path, &config.scaler_path)?;
        Self::new(artifacts, config.scaling)
    }

    pub fn scaling(&self) -> ScalingMode {
        self.scaling
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Validates form input, derives features, and scores the applicant.
    pub fn analyze(&self, applicant: &ApplicantRecord) -> Result<ScoredApplicant, ScoringError> {
        applicant.validate()?;
        let features = derive(applicant);
        let decision = self.score(&features)?;
        Ok(ScoredApplicant { features, decision })
    }

    pub fn score(&self, record: &FeatureRecord) -> Result<DecisionView, ScoringError> {
        let decision = self
            .classify(&[record.to_vector()])?
            .pop()
            .ok_or_else(|| computation_failure("classifier returned no rows".to_string()))?;

        debug!(
            verdict = decision.verdict.label(),
            p_approved = decision.probabilities.approved,
            "applicant scored"
        );

        let probabilities = [
            decision.probabilities.rejected,
            decision.probabilities.approved,
        ];
        Ok(render(decision.label, probabilities, record))
    }

    /// Scores every row with a single call into the classifier.
    pub fn classify(&self, rows: &[FeatureVector]) -> Result<Vec<Decision>, ScoringError> {
        let prepared = self.prepare(rows)?;

        let labels = self.invoke(|classifier| classifier.predict(&prepared))?;
        let probabilities = self.invoke(|classifier| classifier.predict_proba(&prepared))?;

        if labels.len() != rows.len() || probabilities.len() != rows.len() {
            return Err(computation_failure(format!(
                "classifier returned {} labels and {} probability rows for {} inputs",
                labels.len(),
                probabilities.len(),
                rows.len()
            )));
        }

        labels
            .into_iter()
            .zip(probabilities)
            .enumerate()
            .map(|(row, (label, probability))| {
                check_outcome(row, label, probability)?;
                Ok(Decision::new(label, probability))
            })
            .collect()
    }

    fn prepare(&self, rows: &[FeatureVector]) -> Result<Vec<FeatureVector>, ScoringError> {
        rows.iter()
            .enumerate()
            .map(|(row, values)| {
                if let Some(column) = values.iter().position(|value| !value.is_finite()) {
                    return Err(ScoringError::MalformedInput {
                        detail: format!(
                            "row {} has a non-finite value in column '{}'",
                            row + 1,
                            FEATURE_COLUMNS[column]
                        ),
                    });
                }

                let mut prepared = *values;
                if self.scaling == ScalingMode::Apply {
                    self.scaler.transform(&mut prepared);
                }
                Ok(prepared)
            })
            .collect()
    }

    fn invoke<T>(
        &self,
        call: impl FnOnce(&dyn Classifier) -> Result<T, ClassifierError>,
    ) -> Result<T, ScoringError> {
        let classifier = self.classifier.as_ref();
        match panic::catch_unwind(AssertUnwindSafe(|| call(classifier))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(computation_failure(err.to_string())),
            Err(_) => Err(computation_failure(
                "classifier panicked while scoring".to_string(),
            )),
        }
    }
}

fn check_outcome(row: usize, label: u8, probability: ProbabilityRow) -> Result<(), ScoringError> {
    if label > 1 {
        return Err(computation_failure(format!(
            "row {}: classifier produced label {label}",
            row + 1
        )));
    }

    let in_range = probability
        .iter()
        .all(|p| p.is_finite() && (0.0..=1.0).contains(p));
    if !in_range || (probability[0] + probability[1] - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(computation_failure(format!(
            "row {}: classifier probabilities {:?} do not form a distribution",
            row + 1,
            probability
        )));
    }

    Ok(())
}

fn computation_failure(detail: String) -> ScoringError {
    error!(%detail, "classifier invocation failed");
    ScoringError::Computation { detail }
}

/// Error raised by the scoring service. Every variant is reported, never propagated as a panic.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring unavailable: {0}")]
    Unavailable(#[from] ArtifactError),
    #[error("malformed input: {detail}")]
    MalformedInput { detail: String },
    #[error("processing failed")]
    Computation { detail: String },
    #[error(transparent)]
    InvalidApplicant(#[from] ApplicantValidationError),
}
