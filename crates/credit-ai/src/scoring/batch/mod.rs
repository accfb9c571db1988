//! Tabular scoring: parse a pre-built feature table, score it in one classifier call, and
//! summarise the outcome.

mod export;
mod parser;

pub use export::{export_file_name, export_to_dir, to_csv_string, write_csv, EXPORT_PREFIX};
pub use parser::{BatchPreview, BatchTable};

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::render::{Decision, Verdict};
use super::schema::{PREDICTION_COLUMN, PROB_APPROVED_COLUMN, PROB_REJECTED_COLUMN};
use super::service::{ScoringError, ScoringService};

/// Rows shown by the pre-scoring preview.
pub const PREVIEW_ROWS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("malformed batch input: {detail}")]
    MalformedInput { detail: String },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("failed to write batch export: {0}")]
    Csv(#[from] csv::Error),
    #[error("batch file error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    pub cells: Vec<String>,
    pub decision: Decision,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub mean_prob_approved: f64,
    pub approved_pct: f64,
    pub rejected_pct: f64,
}

impl BatchSummary {
    fn from_decisions(decisions: &[Decision]) -> Self {
        let total = decisions.len();
        let approved = decisions
            .iter()
            .filter(|decision| decision.verdict == Verdict::Approved)
            .count();
        let rejected = total - approved;

        if total == 0 {
            return Self {
                total,
                approved,
                rejected,
                mean_prob_approved: 0.0,
                approved_pct: 0.0,
                rejected_pct: 0.0,
            };
        }

        let count = total as f64;
        let mean_prob_approved = decisions
            .iter()
            .map(|decision| decision.probabilities.approved)
            .sum::<f64>()
            / count;

        Self {
            total,
            approved,
            rejected,
            mean_prob_approved,
            approved_pct: approved as f64 / count * 100.0,
            rejected_pct: rejected as f64 / count * 100.0,
        }
    }
}

/// Input table with the `Prediction`, `Prob_Approved` and `Prob_Rejected` columns appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub header: Vec<String>,
    pub rows: Vec<ScoredRow>,
    pub summary: BatchSummary,
}

pub struct BatchRunner<'a> {
    service: &'a ScoringService,
}

impl<'a> BatchRunner<'a> {
    pub fn new(service: &'a ScoringService) -> Self {
        Self { service }
    }

    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<BatchTable, BatchError> {
        let file = std::fs::File::open(path)?;
        Self::load_reader(file)
    }

    /// Parses and validates the whole table; any bad column or cell rejects it outright.
    pub fn load_reader<R: Read>(reader: R) -> Result<BatchTable, BatchError> {
        parser::parse_table(reader)
    }

    pub fn run(&self, table: &BatchTable) -> Result<BatchResult, BatchError> {
        let decisions = self.service.classify(table.rows())?;

        let summary = BatchSummary::from_decisions(&decisions);
        info!(
            total = summary.total,
            approved = summary.approved,
            rejected = summary.rejected,
            mean_prob_approved = summary.mean_prob_approved,
            "batch scored"
        );

        let mut header = table.header().to_vec();
        header.extend(
            [PREDICTION_COLUMN, PROB_APPROVED_COLUMN, PROB_REJECTED_COLUMN]
                .iter()
                .map(|column| column.to_string()),
        );

        let rows = table
            .cells()
            .iter()
            .cloned()
            .zip(decisions)
            .map(|(cells, decision)| ScoredRow { cells, decision })
            .collect();

        Ok(BatchResult {
            header,
            rows,
            summary,
        })
    }

    pub fn run_reader<R: Read>(&self, reader: R) -> Result<BatchResult, BatchError> {
        let table = Self::load_reader(reader)?;
        self.run(&table)
    }
}
