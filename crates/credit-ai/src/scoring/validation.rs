//! Scores a labelled hold-out set and reports discrimination and classification metrics for
//! the approved class.

use std::cmp::Ordering;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::batch::{BatchError, BatchRunner, BatchTable};
use super::render::{Decision, Verdict};
use super::service::{ScoringError, ScoringService};

pub const SAMPLE_PREDICTIONS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Features(#[from] BatchError),
    #[error("invalid label file: {detail}")]
    Labels { detail: String },
    #[error("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("failed to open validation data: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    fn record(&mut self, actual: u8, predicted: u8) {
        match (actual == 1, predicted == 1) {
            (true, true) => self.true_positive += 1,
            (false, true) => self.false_positive += 1,
            (false, false) => self.true_negative += 1,
            (true, false) => self.false_negative += 1,
        }
    }

    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positive,
            self.true_positive + self.false_negative,
        )
    }

    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positive,
            self.true_positive + self.false_positive,
        )
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }

    pub fn accuracy(&self) -> f64 {
        ratio(
            self.true_positive + self.true_negative,
            self.true_positive + self.true_negative + self.false_positive + self.false_negative,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePrediction {
    pub row: usize,
    pub actual: Verdict,
    pub decision: Decision,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub samples: usize,
    /// `None` when the labels contain a single class.
    pub auc: Option<f64>,
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub sample_predictions: Vec<SamplePrediction>,
}

pub fn evaluate_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    service: &ScoringService,
    features_path: P,
    labels_path: Q,
) -> Result<ValidationReport, EvaluationError> {
    let table = BatchRunner::load_path(features_path)?;
    let labels = load_labels(std::fs::File::open(labels_path)?)?;
    evaluate(service, &table, &labels)
}

pub fn evaluate(
    service: &ScoringService,
    table: &BatchTable,
    labels: &[u8],
) -> Result<ValidationReport, EvaluationError> {
    if table.len() != labels.len() {
        return Err(EvaluationError::LengthMismatch {
            features: table.len(),
            labels: labels.len(),
        });
    }

    let decisions = service.classify(table.rows())?;

    let mut confusion = ConfusionMatrix::default();
    for (actual, decision) in labels.iter().zip(&decisions) {
        confusion.record(*actual, decision.label);
    }

    let scores: Vec<f64> = decisions
        .iter()
        .map(|decision| decision.probabilities.approved)
        .collect();
    let auc = roc_auc(labels, &scores);

    let sample_predictions = labels
        .iter()
        .zip(&decisions)
        .take(SAMPLE_PREDICTIONS)
        .enumerate()
        .map(|(row, (actual, decision))| SamplePrediction {
            row: row + 1,
            actual: Verdict::from_label(*actual),
            decision: *decision,
        })
        .collect();

    let report = ValidationReport {
        samples: labels.len(),
        auc,
        recall: confusion.recall(),
        precision: confusion.precision(),
        f1: confusion.f1(),
        accuracy: confusion.accuracy(),
        confusion,
        sample_predictions,
    };

    info!(
        samples = report.samples,
        auc = ?report.auc,
        recall = report.recall,
        f1 = report.f1,
        "model validation finished"
    );
    Ok(report)
}

/// Reads a single-column label file with a header row; labels must be 0 or 1.
pub fn load_labels<R: Read>(reader: R) -> Result<Vec<u8>, EvaluationError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = csv_reader
        .headers()
        .map_err(|err| labels_error(format!("unreadable header: {err}")))?
        .len();
    if columns != 1 {
        return Err(labels_error(format!(
            "expected one label column, found {columns}"
        )));
    }

    let mut labels = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|err| labels_error(format!("row {}: {err}", index + 1)))?;
        let cell = record.get(0).unwrap_or_default();
        let label = match cell.parse::<f64>() {
            Ok(value) if value == 0.0 => 0,
            Ok(value) if value == 1.0 => 1,
            _ => {
                return Err(labels_error(format!(
                    "row {}: '{cell}' is not a 0/1 label",
                    index + 1
                )))
            }
        };
        labels.push(label);
    }

    if labels.is_empty() {
        return Err(labels_error("no labels".to_string()));
    }
    Ok(labels)
}

/// Area under the ROC curve via the rank-sum statistic; tied scores share their mean rank.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|label| **label == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 || labels.len() != scores.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| {
        scores[*a]
            .partial_cmp(&scores[*b])
            .unwrap_or(Ordering::Equal)
    });

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group spans ranks start+1..=end.
        let mean_rank = (start + 1 + end) as f64 / 2.0;
        positive_rank_sum += order[start..end]
            .iter()
            .filter(|index| labels[**index] == 1)
            .count() as f64
            * mean_rank;
        start = end;
    }

    let positives = positives as f64;
    let negatives = negatives as f64;
    Some((positive_rank_sum - positives * (positives + 1.0) / 2.0) / (positives * negatives))
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn labels_error(detail: String) -> EvaluationError {
    EvaluationError::Labels { detail }
}
