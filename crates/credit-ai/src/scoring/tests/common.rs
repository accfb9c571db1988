use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::artifacts::{
    Classifier, ClassifierArtifact, ClassifierError, ModelArtifacts, ProbabilityRow,
    ScalingMode, StandardScaler, Tree, TreeEnsemble, TreeNode,
};
use crate::scoring::catalog::ModelInformation;
use crate::scoring::domain::{ApplicantRecord, Education, FeatureRecord, SelfEmployment};
use crate::scoring::features::derive;
use crate::scoring::router::{scoring_router, ScoringState, ScoringSurface};
use crate::scoring::schema::{FeatureVector, FEATURE_COLUMNS, SCALED_COLUMNS, SCALED_FEATURE_COUNT};
use crate::scoring::service::ScoringService;

fn stump(feature: usize, threshold: f64, below: f64, above: f64) -> Tree {
    Tree {
        nodes: vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { leaf: below },
            TreeNode::Leaf { leaf: above },
        ],
    }
}

pub(super) fn feature_names() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect()
}

/// Two stumps: a scaled credit score above 0.5 adds 2.0 (below subtracts 2.0), and a
/// credit/income ratio above 4 subtracts 1.5 (otherwise adds 0.5).
pub(super) fn classifier() -> ClassifierArtifact {
    ClassifierArtifact::GradientBoostedTrees(TreeEnsemble {
        feature_names: feature_names(),
        base_score: 0.0,
        trees: vec![stump(4, 0.5, -2.0, 2.0), stump(9, 4.0, 0.5, -1.5)],
    })
}

/// Identity scaling except the credit score, centred on 600 with unit 100.
pub(super) fn scaler() -> StandardScaler {
    let mut mean = vec![0.0; SCALED_FEATURE_COUNT];
    let mut scale = vec![1.0; SCALED_FEATURE_COUNT];
    mean[4] = 600.0;
    scale[4] = 100.0;
    StandardScaler {
        feature_names: SCALED_COLUMNS.iter().map(|name| name.to_string()).collect(),
        mean,
        scale,
    }
}

pub(super) fn artifacts_with(classifier: Arc<dyn Classifier>) -> ModelArtifacts {
    ModelArtifacts {
        classifier,
        scaler: Arc::new(scaler()),
    }
}

pub(super) fn build_service(scaling: ScalingMode) -> ScoringService {
    ScoringService::new(artifacts_with(Arc::new(classifier())), scaling)
        .expect("fixture artifacts are consistent")
}

pub(super) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Strong applicant: ratio 0.4, score 750, ample assets.
pub(super) fn approved_applicant() -> ApplicantRecord {
    ApplicantRecord {
        no_of_dependents: 2,
        income_annum: 5_000_000.0,
        loan_amount: 2_000_000.0,
        loan_term: 10,
        cibil_score: 750,
        residential_assets_value: 10_000_000.0,
        commercial_assets_value: 5_000_000.0,
        luxury_assets_value: 3_000_000.0,
        bank_asset_value: 5_000_000.0,
        education: Education::Graduate,
        self_employed: SelfEmployment::No,
    }
}

/// Weak applicant: ratio 5, score 600, no assets.
pub(super) fn rejected_applicant() -> ApplicantRecord {
    ApplicantRecord {
        no_of_dependents: 0,
        income_annum: 100.0,
        loan_amount: 500.0,
        loan_term: 5,
        cibil_score: 600,
        residential_assets_value: 0.0,
        commercial_assets_value: 0.0,
        luxury_assets_value: 0.0,
        bank_asset_value: 0.0,
        education: Education::NotGraduate,
        self_employed: SelfEmployment::Yes,
    }
}

pub(super) fn approved_features() -> FeatureRecord {
    derive(&approved_applicant())
}

pub(super) fn rejected_features() -> FeatureRecord {
    derive(&rejected_applicant())
}

fn format_row(row: &FeatureVector) -> String {
    row.iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub(super) fn batch_csv(records: &[FeatureRecord]) -> String {
    let mut csv = FEATURE_COLUMNS.join(",");
    csv.push('\n');
    for record in records {
        csv.push_str(&format_row(&record.to_vector()));
        csv.push('\n');
    }
    csv
}

/// Same table with one column removed from the header and every row.
pub(super) fn batch_csv_without(records: &[FeatureRecord], column: &str) -> String {
    let skip = FEATURE_COLUMNS
        .iter()
        .position(|name| *name == column)
        .expect("known column");
    let keep = |index: &usize| *index != skip;

    let header: Vec<&str> = (0..FEATURE_COLUMNS.len())
        .filter(keep)
        .map(|index| FEATURE_COLUMNS[index])
        .collect();
    let mut csv = header.join(",");
    csv.push('\n');
    for record in records {
        let vector = record.to_vector();
        let cells: Vec<String> = (0..vector.len())
            .filter(keep)
            .map(|index| vector[index].to_string())
            .collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }
    csv
}

/// Classifier whose probabilities are not finite.
pub(super) struct NonFiniteClassifier {
    pub(super) names: Vec<String>,
}

impl Classifier for NonFiniteClassifier {
    fn name(&self) -> &str {
        "non_finite"
    }

    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_proba(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<ProbabilityRow>, ClassifierError> {
        Ok(rows.iter().map(|_| [f64::NAN, f64::NAN]).collect())
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<u8>, ClassifierError> {
        Ok(vec![0; rows.len()])
    }
}

pub(super) struct PanickingClassifier {
    pub(super) names: Vec<String>,
}

impl Classifier for PanickingClassifier {
    fn name(&self) -> &str {
        "panicking"
    }

    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_proba(
        &self,
        _rows: &[FeatureVector],
    ) -> Result<Vec<ProbabilityRow>, ClassifierError> {
        panic!("model exploded")
    }
}

pub(super) fn ready_router() -> axum::Router {
    scoring_router(Arc::new(ScoringState {
        surface: ScoringSurface::Ready(Arc::new(build_service(ScalingMode::Apply))),
        information: ModelInformation::load("./no-comparison-table.csv"),
    }))
}

pub(super) fn unavailable_router() -> axum::Router {
    scoring_router(Arc::new(ScoringState {
        surface: ScoringSurface::Unavailable {
            reason: "classifier artifact not found at artifacts/credit_model.json".to_string(),
        },
        information: ModelInformation::load("./no-comparison-table.csv"),
    }))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json body")
}
