use std::path::PathBuf;

use chrono::NaiveDate;
use credit_ai::config::ArtifactConfig;
use credit_ai::scoring::batch::{export_to_dir, BatchRunner};
use credit_ai::scoring::{
    derive, ApplicantRecord, BatchError, Education, ModelInformation, ScalingMode,
    ScoringError, ScoringService, SelfEmployment, Verdict,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn artifact_config() -> ArtifactConfig {
    ArtifactConfig {
        model_path: fixture("credit_model.json"),
        scaler_path: fixture("scaler.json"),
        comparison_path: fixture("model_comparison.csv"),
        export_dir: std::env::temp_dir().join(format!("credit-ai-exports-{}", std::process::id())),
        scaling: ScalingMode::Apply,
    }
}

fn applicant(income: f64, loan: f64, assets: f64, cibil_score: u16) -> ApplicantRecord {
    ApplicantRecord {
        no_of_dependents: 1,
        income_annum: income,
        loan_amount: loan,
        loan_term: 12,
        cibil_score,
        residential_assets_value: assets,
        commercial_assets_value: 0.0,
        luxury_assets_value: 0.0,
        bank_asset_value: 0.0,
        education: Education::Graduate,
        self_employed: SelfEmployment::No,
    }
}

#[test]
fn strong_applicant_is_approved_without_risk_factors() {
    let service = ScoringService::from_config(&artifact_config()).expect("artifacts load");

    let scored = service
        .analyze(&applicant(5_000_000.0, 2_000_000.0, 23_000_000.0, 750))
        .expect("scores");

    assert!((scored.features.credit_income_ratio - 0.4).abs() < 1e-12);
    assert!((scored.features.loan_assets_ratio - 0.087).abs() < 1e-3);
    assert_eq!(scored.features.high_debt, 0);
    assert_eq!(scored.features.low_cibil, 0);
    assert_eq!(scored.decision.verdict(), Verdict::Approved);
    assert!(!scored.decision.has_risk_factors());
}

#[test]
fn overextended_applicant_carries_high_debt_narrative() {
    let service = ScoringService::from_config(&artifact_config()).expect("artifacts load");

    let scored = service
        .analyze(&applicant(100.0, 500.0, 0.0, 600))
        .expect("scores");

    assert_eq!(scored.features.credit_income_ratio, 5.0);
    assert_eq!(scored.features.high_debt, 1);
    assert_eq!(scored.decision.verdict(), Verdict::Rejected);
    assert!(scored
        .decision
        .risk_summary
        .contains(&"Very high credit/income ratio (> 4x)"));
}

#[test]
fn missing_artifact_disables_scoring() {
    let mut config = artifact_config();
    config.scaler_path = fixture("no-such-scaler.json");

    match ScoringService::from_config(&config) {
        Err(ScoringError::Unavailable(error)) => {
            assert!(error.to_string().contains("no-such-scaler.json"))
        }
        Err(other) => panic!("expected unavailable scoring, got {other:?}"),
        Ok(_) => panic!("scoring should not start without a scaler"),
    }
}

#[test]
fn batch_without_credit_score_scores_nothing() {
    let service = ScoringService::from_config(&artifact_config()).expect("artifacts load");
    let record = derive(&applicant(5_000_000.0, 2_000_000.0, 23_000_000.0, 750));
    let header = credit_ai::scoring::schema::FEATURE_COLUMNS
        .iter()
        .filter(|column| **column != "cibil_score")
        .copied()
        .collect::<Vec<_>>()
        .join(",");
    let row = record
        .named_values()
        .iter()
        .filter(|(column, _)| *column != "cibil_score")
        .map(|(_, value)| value.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let csv = format!("{header}\n{row}\n{row}\n");

    let error = BatchRunner::new(&service)
        .run_reader(csv.as_bytes())
        .expect_err("batch rejected");
    assert!(matches!(error, BatchError::MalformedInput { .. }));
}

#[test]
fn batch_export_lands_under_timestamped_name() {
    let config = artifact_config();
    let service = ScoringService::from_config(&config).expect("artifacts load");
    let records = [
        derive(&applicant(5_000_000.0, 2_000_000.0, 23_000_000.0, 750)),
        derive(&applicant(100.0, 500.0, 0.0, 600)),
    ];
    let mut csv = credit_ai::scoring::schema::FEATURE_COLUMNS.join(",");
    for record in &records {
        let cells: Vec<String> = record.to_vector().iter().map(f64::to_string).collect();
        csv.push('\n');
        csv.push_str(&cells.join(","));
    }

    let result = BatchRunner::new(&service)
        .run_reader(csv.as_bytes())
        .expect("batch scores");
    let at = NaiveDate::from_ymd_opt(2025, 1, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 1))
        .expect("valid timestamp");
    let path = export_to_dir(&result, &config.export_dir, at).expect("export written");

    assert!(path.ends_with("credit_analysis_20250131_235901.csv"));
    let exported = std::fs::read_to_string(&path).expect("export readable");
    assert_eq!(exported.lines().count(), 3);
    assert!(exported.contains("Rejected"));
}

#[test]
fn model_information_includes_comparison_table() {
    let info = ModelInformation::load(fixture("model_comparison.csv"));

    let table = info.comparison.expect("comparison table present");
    assert_eq!(table.header[0], "Model");
    assert_eq!(table.rows.len(), 3);
    assert_eq!(info.card.top_features[0], "Credit score (CIBIL)");
}
