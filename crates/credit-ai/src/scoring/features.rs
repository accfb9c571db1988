use super::domain::{ApplicantRecord, FeatureRecord};

pub const HIGH_DEBT_RATIO: f64 = 4.0;
pub const LOW_CIBIL_THRESHOLD: f64 = 650.0;

/// Derives the engineered feature record used at training time.
///
/// No range checks happen here; the only guards replace divisions by zero with `0`.
pub fn derive(applicant: &ApplicantRecord) -> FeatureRecord {
    let income = applicant.income_annum;
    let loan = applicant.loan_amount;
    let cibil_score = f64::from(applicant.cibil_score);

    let total_assets = applicant.residential_assets_value
        + applicant.commercial_assets_value
        + applicant.luxury_assets_value
        + applicant.bank_asset_value;

    let credit_income_ratio = ratio_or_zero(loan, income);
    let assets_income_ratio = ratio_or_zero(total_assets, income);
    let loan_assets_ratio = ratio_or_zero(loan, total_assets);

    FeatureRecord {
        no_of_dependents: f64::from(applicant.no_of_dependents),
        income_annum: income,
        loan_amount: loan,
        loan_term: f64::from(applicant.loan_term),
        cibil_score,
        residential_assets_value: applicant.residential_assets_value,
        commercial_assets_value: applicant.commercial_assets_value,
        luxury_assets_value: applicant.luxury_assets_value,
        bank_asset_value: applicant.bank_asset_value,
        credit_income_ratio,
        total_assets,
        assets_income_ratio,
        loan_assets_ratio,
        high_debt: u8::from(credit_income_ratio > HIGH_DEBT_RATIO),
        low_cibil: u8::from(cibil_score < LOW_CIBIL_THRESHOLD),
        education_encoded: applicant.education.encoded(),
        self_employed_encoded: applicant.self_employed.encoded(),
    }
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
