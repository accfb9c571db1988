use super::common::*;
use crate::scoring::domain::FeatureRecord;
use crate::scoring::features::derive;
use crate::scoring::schema::FEATURE_COLUMNS;

#[test]
fn strong_applicant_features_match_training_formulas() {
    let record = approved_features();

    assert_eq!(record.total_assets, 23_000_000.0);
    assert!((record.credit_income_ratio - 0.4).abs() < 1e-12);
    assert!((record.assets_income_ratio - 4.6).abs() < 1e-12);
    assert!((record.loan_assets_ratio - 2.0 / 23.0).abs() < 1e-12);
    assert_eq!(record.high_debt, 0);
    assert_eq!(record.low_cibil, 0);
    assert_eq!(record.education_encoded, 1);
    assert_eq!(record.self_employed_encoded, 0);
}

#[test]
fn heavy_borrower_is_flagged_high_debt() {
    let record = rejected_features();

    assert_eq!(record.credit_income_ratio, 5.0);
    assert_eq!(record.high_debt, 1);
    assert_eq!(record.low_cibil, 1);
    assert_eq!(record.education_encoded, 0);
    assert_eq!(record.self_employed_encoded, 1);
}

#[test]
fn zero_income_and_assets_produce_zero_ratios() {
    let mut applicant = rejected_applicant();
    applicant.income_annum = 0.0;
    let record = derive(&applicant);

    assert_eq!(record.credit_income_ratio, 0.0);
    assert_eq!(record.assets_income_ratio, 0.0);
    assert_eq!(record.loan_assets_ratio, 0.0);
    assert_eq!(record.high_debt, 0);
}

#[test]
fn flag_thresholds_are_strict() {
    let mut applicant = approved_applicant();
    applicant.loan_amount = applicant.income_annum * 4.0;
    applicant.cibil_score = 650;
    let record = derive(&applicant);

    assert_eq!(record.credit_income_ratio, 4.0);
    assert_eq!(record.high_debt, 0, "exactly 4x is not high debt");
    assert_eq!(record.low_cibil, 0, "exactly 650 is not low");

    applicant.cibil_score = 649;
    assert_eq!(derive(&applicant).low_cibil, 1);
}

#[test]
fn vector_follows_schema_order() {
    let record = approved_features();
    let named = record.named_values();

    for ((name, value), (column, expected)) in named
        .iter()
        .zip(FEATURE_COLUMNS.iter().zip(record.to_vector().iter()))
    {
        assert_eq!(name, column);
        assert_eq!(value, expected);
    }
    assert_eq!(FeatureRecord::from_vector(&record.to_vector()), record);
}
