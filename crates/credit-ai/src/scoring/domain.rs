use super::schema::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest education level reported by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "Graduate", alias = "graduate")]
    Graduate,
    #[serde(rename = "Not Graduate", alias = "not_graduate")]
    NotGraduate,
}

impl Education {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Graduate => "Graduate",
            Self::NotGraduate => "Not Graduate",
        }
    }

    pub const fn encoded(self) -> u8 {
        match self {
            Self::Graduate => 1,
            Self::NotGraduate => 0,
        }
    }
}

impl FromStr for Education {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "graduate" => Ok(Self::Graduate),
            "not graduate" => Ok(Self::NotGraduate),
            _ => Err(format!(
                "'{value}' is not an education level (expected 'Graduate' or 'Not Graduate')"
            )),
        }
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether the applicant is self-employed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelfEmployment {
    #[serde(rename = "Yes", alias = "yes")]
    Yes,
    #[serde(rename = "No", alias = "no")]
    No,
}

impl SelfEmployment {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub const fn encoded(self) -> u8 {
        match self {
            Self::Yes => 1,
            Self::No => 0,
        }
    }
}

impl FromStr for SelfEmployment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Self::Yes),
            "no" | "n" | "false" => Ok(Self::No),
            _ => Err(format!("'{value}' is not a self-employment answer (expected yes/no)")),
        }
    }
}

impl fmt::Display for SelfEmployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw inputs describing one credit applicant, exactly as collected by the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub no_of_dependents: u8,
    pub income_annum: f64,
    pub loan_amount: f64,
    pub loan_term: u8,
    pub cibil_score: u16,
    pub residential_assets_value: f64,
    pub commercial_assets_value: f64,
    pub luxury_assets_value: f64,
    pub bank_asset_value: f64,
    pub education: Education,
    pub self_employed: SelfEmployment,
}

impl ApplicantRecord {
    pub const MAX_DEPENDENTS: u8 = 10;
    pub const LOAN_TERM_YEARS: (u8, u8) = (1, 30);
    pub const CIBIL_RANGE: (u16, u16) = (300, 900);

    /// Range checks performed by the host before feature derivation.
    pub fn validate(&self) -> Result<(), ApplicantValidationError> {
        let mut violations = Vec::new();

        if self.no_of_dependents > Self::MAX_DEPENDENTS {
            violations.push(FieldViolation::new(
                "no_of_dependents",
                format!("must be between 0 and {}", Self::MAX_DEPENDENTS),
            ));
        }

        let (min_term, max_term) = Self::LOAN_TERM_YEARS;
        if !(min_term..=max_term).contains(&self.loan_term) {
            violations.push(FieldViolation::new(
                "loan_term",
                format!("must be between {min_term} and {max_term} years"),
            ));
        }

        let (min_score, max_score) = Self::CIBIL_RANGE;
        if !(min_score..=max_score).contains(&self.cibil_score) {
            violations.push(FieldViolation::new(
                "cibil_score",
                format!("must be between {min_score} and {max_score}"),
            ));
        }

        for (field, value) in [
            ("income_annum", self.income_annum),
            ("loan_amount", self.loan_amount),
            ("residential_assets_value", self.residential_assets_value),
            ("commercial_assets_value", self.commercial_assets_value),
            ("luxury_assets_value", self.luxury_assets_value),
            ("bank_asset_value", self.bank_asset_value),
        ] {
            if !value.is_finite() || value < 0.0 {
                violations.push(FieldViolation::new(
                    field,
                    "must be a finite, non-negative amount".to_string(),
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApplicantValidationError { violations })
        }
    }
}

/// A single out-of-range input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: String) -> Self {
        Self { field, message }
    }
}

/// Raised when a form submission falls outside the documented input ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid applicant data: {}", summarize(.violations))]
pub struct ApplicantValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{} {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Applicant record plus derived ratios and flags in the fixed model column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub no_of_dependents: f64,
    pub income_annum: f64,
    pub loan_amount: f64,
    pub loan_term: f64,
    pub cibil_score: f64,
    pub residential_assets_value: f64,
    pub commercial_assets_value: f64,
    pub luxury_assets_value: f64,
    pub bank_asset_value: f64,
    pub credit_income_ratio: f64,
    pub total_assets: f64,
    pub assets_income_ratio: f64,
    pub loan_assets_ratio: f64,
    pub high_debt: u8,
    pub low_cibil: u8,
    pub education_encoded: u8,
    pub self_employed_encoded: u8,
}

impl FeatureRecord {
    /// Flattens the record in `FEATURE_COLUMNS` order.
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.no_of_dependents,
            self.income_annum,
            self.loan_amount,
            self.loan_term,
            self.cibil_score,
            self.residential_assets_value,
            self.commercial_assets_value,
            self.luxury_assets_value,
            self.bank_asset_value,
            self.credit_income_ratio,
            self.total_assets,
            self.assets_income_ratio,
            self.loan_assets_ratio,
            f64::from(self.high_debt),
            f64::from(self.low_cibil),
            f64::from(self.education_encoded),
            f64::from(self.self_employed_encoded),
        ]
    }

    /// Rebuilds a record from a row already laid out in `FEATURE_COLUMNS` order.
    ///
    /// Flag columns are read as `value != 0`; uploaded tables are trusted as pre-built records.
    pub fn from_vector(values: &FeatureVector) -> Self {
        let flag = |value: f64| u8::from(value != 0.0);
        Self {
            no_of_dependents: values[0],
            income_annum: values[1],
            loan_amount: values[2],
            loan_term: values[3],
            cibil_score: values[4],
            residential_assets_value: values[5],
            commercial_assets_value: values[6],
            luxury_assets_value: values[7],
            bank_asset_value: values[8],
            credit_income_ratio: values[9],
            total_assets: values[10],
            assets_income_ratio: values[11],
            loan_assets_ratio: values[12],
            high_debt: flag(values[13]),
            low_cibil: flag(values[14]),
            education_encoded: flag(values[15]),
            self_employed_encoded: flag(values[16]),
        }
    }

    /// Pairs each value with its column name, useful for diagnostics and JSON views.
    pub fn named_values(&self) -> [(&'static str, f64); FEATURE_COUNT] {
        let vector = self.to_vector();
        let mut named = [("", 0.0); FEATURE_COUNT];
        for (slot, (name, value)) in named
            .iter_mut()
            .zip(FEATURE_COLUMNS.iter().zip(vector.iter()))
        {
            *slot = (*name, *value);
        }
        named
    }
}
