//! Fixed column layout shared by the feature record, the scaler, and the classifier.
//!
//! Both artifacts were fit against exactly this order, so every path that builds or reads a
//! feature vector goes through these constants.

pub const FEATURE_COUNT: usize = 17;
pub const SCALED_FEATURE_COUNT: usize = 13;

pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "no_of_dependents",
    "income_annum",
    "loan_amount",
    "loan_term",
    "cibil_score",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
    "credit_income_ratio",
    "total_assets",
    "assets_income_ratio",
    "loan_assets_ratio",
    "high_debt",
    "low_cibil",
    "education_encoded",
    "self_employed_encoded",
];

/// Continuous columns normalized by the scaler; always the leading prefix of the layout.
pub const SCALED_COLUMNS: [&str; SCALED_FEATURE_COUNT] = [
    "no_of_dependents",
    "income_annum",
    "loan_amount",
    "loan_term",
    "cibil_score",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
    "credit_income_ratio",
    "total_assets",
    "assets_income_ratio",
    "loan_assets_ratio",
];

pub const PREDICTION_COLUMN: &str = "Prediction";
pub const PROB_APPROVED_COLUMN: &str = "Prob_Approved";
pub const PROB_REJECTED_COLUMN: &str = "Prob_Rejected";

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Describes how a declared column list diverges from an expected layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMismatch {
    Missing(Vec<String>),
    Unexpected(Vec<String>),
    OutOfOrder {
        position: usize,
        expected: String,
        found: String,
    },
}

impl ColumnMismatch {
    pub fn describe(&self) -> String {
        match self {
            ColumnMismatch::Missing(columns) => {
                format!("missing required column(s): {}", columns.join(", "))
            }
            ColumnMismatch::Unexpected(columns) => {
                format!("unexpected column(s): {}", columns.join(", "))
            }
            ColumnMismatch::OutOfOrder {
                position,
                expected,
                found,
            } => format!(
                "column {} is '{}' but '{}' is required at that position",
                position + 1,
                found,
                expected
            ),
        }
    }
}

/// Checks `declared` against `expected`, reporting missing names first, then extras, then order.
pub fn check_columns<S: AsRef<str>>(
    declared: &[S],
    expected: &[&str],
) -> Result<(), ColumnMismatch> {
    let missing: Vec<String> = expected
        .iter()
        .filter(|name| !declared.iter().any(|column| column.as_ref() == **name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ColumnMismatch::Missing(missing));
    }

    let unexpected: Vec<String> = declared
        .iter()
        .map(|column| column.as_ref())
        .filter(|column| !expected.contains(column))
        .map(str::to_string)
        .collect();
    if !unexpected.is_empty() {
        return Err(ColumnMismatch::Unexpected(unexpected));
    }

    if let Some((position, (found, expected))) = declared
        .iter()
        .zip(expected.iter())
        .enumerate()
        .find(|(_, (found, expected))| found.as_ref() != **expected)
    {
        return Err(ColumnMismatch::OutOfOrder {
            position,
            expected: expected.to_string(),
            found: found.as_ref().to_string(),
        });
    }

    if declared.len() != expected.len() {
        // Same names, different count: a duplicated column.
        return Err(ColumnMismatch::Unexpected(
            declared
                .iter()
                .skip(expected.len())
                .map(|column| column.as_ref().to_string())
                .collect(),
        ));
    }

    Ok(())
}
