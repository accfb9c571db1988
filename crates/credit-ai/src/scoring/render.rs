//! Turns a classifier outcome into the verdict panel, probability bars, and risk narrative.
//!
//! The risk factors are advisory annotations only; nothing here feeds back into the label or
//! the probabilities.

use super::artifacts::ProbabilityRow;
use super::domain::FeatureRecord;
use serde::{Deserialize, Serialize};

pub const CREDIT_INCOME_VERY_HIGH: f64 = 4.0;
pub const CREDIT_INCOME_MODERATE: f64 = 3.0;
pub const CIBIL_LOW: f64 = 650.0;
pub const CIBIL_MODERATE: f64 = 700.0;
pub const LOAN_ASSETS_HIGH: f64 = 0.8;
pub const ASSET_COVERAGE_MIN: f64 = 0.5;

pub const NO_RISK_FACTORS: &str = "No significant risk factor identified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Class 1 is the approved class.
    pub const fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Approved => "CREDIT APPROVED",
            Self::Rejected => "CREDIT REJECTED",
        }
    }
}

/// Probability pair keyed by business meaning rather than class index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub approved: f64,
    pub rejected: f64,
}

impl ClassProbabilities {
    pub fn from_row(row: ProbabilityRow) -> Self {
        Self {
            approved: row[1],
            rejected: row[0],
        }
    }

    pub fn for_verdict(&self, verdict: Verdict) -> f64 {
        match verdict {
            Verdict::Approved => self.approved,
            Verdict::Rejected => self.rejected,
        }
    }
}

/// Raw classifier output for one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub label: u8,
    pub verdict: Verdict,
    pub probabilities: ClassProbabilities,
}

impl Decision {
    pub fn new(label: u8, row: ProbabilityRow) -> Self {
        Self {
            label,
            verdict: Verdict::from_label(label),
            probabilities: ClassProbabilities::from_row(row),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    CreditIncomeVeryHigh,
    CreditIncomeModerate,
    CreditScoreLow,
    CreditScoreModerate,
    LoanHighRelativeToAssets,
    LowAssetsRelativeToLoan,
}

impl RiskFactor {
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::CreditIncomeVeryHigh => "Very high credit/income ratio (> 4x)",
            Self::CreditIncomeModerate => "Moderate credit/income ratio (> 3x)",
            Self::CreditScoreLow => "Low credit score (< 650)",
            Self::CreditScoreModerate => "Moderate credit score (< 700)",
            Self::LoanHighRelativeToAssets => "Loan very high relative to assets (> 80%)",
            Self::LowAssetsRelativeToLoan => "Low total assets relative to the loan",
        }
    }
}

/// Evaluates the threshold rules in their fixed order.
pub fn risk_factors(record: &FeatureRecord) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if record.credit_income_ratio > CREDIT_INCOME_VERY_HIGH {
        factors.push(RiskFactor::CreditIncomeVeryHigh);
    } else if record.credit_income_ratio > CREDIT_INCOME_MODERATE {
        factors.push(RiskFactor::CreditIncomeModerate);
    }

    if record.cibil_score < CIBIL_LOW {
        factors.push(RiskFactor::CreditScoreLow);
    } else if record.cibil_score < CIBIL_MODERATE {
        factors.push(RiskFactor::CreditScoreModerate);
    }

    if record.loan_assets_ratio > LOAN_ASSETS_HIGH {
        factors.push(RiskFactor::LoanHighRelativeToAssets);
    }

    if record.total_assets < record.loan_amount * ASSET_COVERAGE_MIN {
        factors.push(RiskFactor::LowAssetsRelativeToLoan);
    }

    factors
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactorView {
    pub factor: RiskFactor,
    pub narrative: &'static str,
}

/// Figures shown next to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub loan_amount: f64,
    pub income_annum: f64,
    pub cibil_score: f64,
    pub credit_income_ratio: f64,
    pub total_assets: f64,
    pub assets_income_ratio: f64,
    pub loan_assets_ratio: f64,
}

impl DerivedMetrics {
    pub fn from_record(record: &FeatureRecord) -> Self {
        Self {
            loan_amount: record.loan_amount,
            income_annum: record.income_annum,
            cibil_score: record.cibil_score,
            credit_income_ratio: record.credit_income_ratio,
            total_assets: record.total_assets,
            assets_income_ratio: record.assets_income_ratio,
            loan_assets_ratio: record.loan_assets_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityBar {
    pub label: &'static str,
    pub percent: f64,
}

/// Everything the host needs to display one scored applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionView {
    pub decision: Decision,
    pub headline: &'static str,
    pub verdict_label: &'static str,
    pub displayed_probability: f64,
    pub probability_bars: Vec<ProbabilityBar>,
    pub risk_factors: Vec<RiskFactorView>,
    pub risk_summary: Vec<&'static str>,
    pub metrics: DerivedMetrics,
}

impl DecisionView {
    pub fn verdict(&self) -> Verdict {
        self.decision.verdict
    }

    pub fn has_risk_factors(&self) -> bool {
        !self.risk_factors.is_empty()
    }
}

pub fn render(label: u8, probabilities: ProbabilityRow, record: &FeatureRecord) -> DecisionView {
    let decision = Decision::new(label, probabilities);
    let verdict = decision.verdict;

    let factors = risk_factors(record);
    let risk_summary = if factors.is_empty() {
        vec![NO_RISK_FACTORS]
    } else {
        factors.iter().map(|factor| factor.narrative()).collect()
    };
    let risk_factors = factors
        .into_iter()
        .map(|factor| RiskFactorView {
            factor,
            narrative: factor.narrative(),
        })
        .collect();

    DecisionView {
        decision,
        headline: verdict.headline(),
        verdict_label: verdict.label(),
        displayed_probability: decision.probabilities.for_verdict(verdict),
        probability_bars: vec![
            ProbabilityBar {
                label: Verdict::Approved.label(),
                percent: decision.probabilities.approved * 100.0,
            },
            ProbabilityBar {
                label: Verdict::Rejected.label(),
                percent: decision.probabilities.rejected * 100.0,
            },
        ],
        risk_factors,
        risk_summary,
        metrics: DerivedMetrics::from_record(record),
    }
}
