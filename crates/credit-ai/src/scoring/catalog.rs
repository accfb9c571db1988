//! Static "about the model" information plus the optional model-comparison table.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportedMetric {
    pub name: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProjectStage {
    pub stage: &'static str,
    pub title: &'static str,
    pub activities: &'static [&'static str],
}

/// Technical summary of the deployed classifier as reported by the training pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelCard {
    pub algorithm: &'static str,
    pub characteristics: &'static [&'static str],
    pub imbalance_handling: &'static [&'static str],
    pub optimisation: &'static [&'static str],
    pub test_metrics: &'static [ReportedMetric],
    pub top_features: &'static [&'static str],
    pub preprocessing: &'static [&'static str],
    pub stages: &'static [ProjectStage],
    pub note: &'static str,
}

pub const MODEL_CARD: ModelCard = ModelCard {
    algorithm: "LightGBM (Light Gradient Boosting Machine)",
    characteristics: &[
        "Ensemble of decision trees",
        "Optimised for tabular data",
        "Fast and memory efficient",
        "Robust to outliers",
        "Captures non-linear relationships",
    ],
    imbalance_handling: &[
        "scale_pos_weight",
        "Weight adjusted automatically from the class proportions",
    ],
    optimisation: &[
        "GridSearchCV with 3-fold cross-validation",
        "Several hyperparameters tuned jointly",
        "Optimisation metric: AUC",
    ],
    test_metrics: &[
        ReportedMetric {
            name: "AUC",
            value: 0.9509,
        },
        ReportedMetric {
            name: "Recall (Rejected)",
            value: 0.8822,
        },
        ReportedMetric {
            name: "F1-Score",
            value: 0.9011,
        },
    ],
    top_features: &[
        "Credit score (CIBIL)",
        "Credit/income ratio",
        "Loan amount",
        "Annual income",
        "Total assets",
        "Loan/assets ratio",
    ],
    preprocessing: &[
        "Feature engineering",
        "StandardScaler normalisation",
        "Categorical encoding",
    ],
    stages: &[
        ProjectStage {
            stage: "1-4",
            title: "Preprocessing",
            activities: &["Exploratory analysis", "Data cleaning", "Feature engineering"],
        },
        ProjectStage {
            stage: "5",
            title: "Modelling",
            activities: &["Training and optimisation"],
        },
        ProjectStage {
            stage: "6",
            title: "Deployment",
            activities: &["Web interface", "Prediction system"],
        },
    ],
    note: "Built as an academic machine learning project; production use calls for additional \
           validation and continuous model monitoring.",
};

/// Free-form comparison of candidate models, displayed as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInformation {
    pub card: ModelCard,
    pub comparison: Option<ComparisonTable>,
}

impl ModelInformation {
    pub fn load<P: AsRef<Path>>(comparison_path: P) -> Self {
        Self {
            card: MODEL_CARD,
            comparison: load_comparison(comparison_path),
        }
    }
}

/// The table is optional; a missing or unreadable file hides the section instead of failing.
pub fn load_comparison<P: AsRef<Path>>(path: P) -> Option<ComparisonTable> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no model comparison table");
        return None;
    }

    match read_comparison(path) {
        Ok(table) => Some(table),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "model comparison table skipped");
            None
        }
    }
}

fn read_comparison(path: &Path) -> Result<ComparisonTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let header = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|row| row.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Ok(ComparisonTable { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_comparison_file_is_not_an_error() {
        let info = ModelInformation::load("./definitely-not-here.csv");
        assert!(info.comparison.is_none());
        assert_eq!(info.card.test_metrics.len(), 3);
    }

    #[test]
    fn comparison_table_is_read_verbatim() {
        let dir = std::env::temp_dir().join(format!("credit-ai-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        let path = dir.join("model_comparison.csv");
        std::fs::write(&path, "Model,AUC\nLightGBM,0.9509\nLogistic Regression,0.9120\n")
            .expect("write table");

        let table = load_comparison(&path).expect("table present");
        assert_eq!(table.header, vec!["Model", "AUC"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "Logistic Regression");
    }
}
