//! Credit-approval scoring: feature engineering, artifact-backed classification, decision
//! rendering, and batch scoring over pre-built feature tables.

pub mod artifacts;
pub mod batch;
pub mod catalog;
pub mod domain;
pub mod features;
pub mod render;
pub mod router;
pub mod schema;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use artifacts::{
    ArtifactError, ArtifactKind, Classifier, ClassifierArtifact, ModelArtifacts, ScalingMode,
    StandardScaler,
};
pub use batch::{BatchError, BatchPreview, BatchResult, BatchRunner, BatchSummary, BatchTable};
pub use catalog::{ModelCard, ModelInformation, MODEL_CARD};
pub use domain::{
    ApplicantRecord, ApplicantValidationError, Education, FeatureRecord, FieldViolation,
    SelfEmployment,
};
pub use features::derive;
pub use render::{render, Decision, DecisionView, RiskFactor, Verdict};
pub use router::{scoring_router, ScoringState, ScoringSurface};
pub use service::{ScoredApplicant, ScoringError, ScoringService};
pub use validation::{EvaluationError, ValidationReport};
