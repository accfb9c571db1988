use std::io::Read;

use serde::Serialize;

use super::BatchError;
use crate::scoring::schema::{check_columns, FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// A validated batch table: the exact 17-column header plus at least one numeric row.
///
/// The raw cells are kept next to the parsed vectors so the export reproduces the input as
/// the user supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTable {
    header: Vec<String>,
    cells: Vec<Vec<String>>,
    rows: Vec<FeatureVector>,
}

/// Record count and leading rows shown before a batch is scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPreview {
    pub total_rows: usize,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl BatchTable {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn preview(&self, limit: usize) -> BatchPreview {
        BatchPreview {
            total_rows: self.len(),
            header: self.header.clone(),
            rows: self.cells.iter().take(limit).cloned().collect(),
        }
    }
}

pub(crate) fn parse_table<R: Read>(reader: R) -> Result<BatchTable, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Vec<String> = csv_reader
        .headers()
        .map_err(|err| malformed(format!("unreadable header: {err}")))?
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if index == 0 {
                name.trim_start_matches(BYTE_ORDER_MARK).to_string()
            } else {
                name.to_string()
            }
        })
        .collect();

    check_columns(&header, &FEATURE_COLUMNS).map_err(|mismatch| malformed(mismatch.describe()))?;

    let mut cells = Vec::new();
    let mut rows = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 1;
        let record = record.map_err(|err| malformed(format!("row {line}: {err}")))?;

        let mut values = [0.0; FEATURE_COUNT];
        for (column, (slot, cell)) in values.iter_mut().zip(record.iter()).enumerate() {
            *slot = parse_cell(cell).ok_or_else(|| {
                malformed(format!(
                    "row {line}, column '{}': '{cell}' is not a finite number",
                    FEATURE_COLUMNS[column]
                ))
            })?;
        }

        cells.push(record.iter().map(str::to_string).collect());
        rows.push(values);
    }

    if rows.is_empty() {
        return Err(malformed("the table has a header but no rows".to_string()));
    }

    Ok(BatchTable {
        header,
        cells,
        rows,
    })
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn malformed(detail: String) -> BatchError {
    BatchError::MalformedInput { detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        FEATURE_COLUMNS.join(",")
    }

    #[test]
    fn strips_byte_order_mark_from_first_column() {
        let input = format!(
            "\u{feff}{}\n2,5000000,10000000,12,750,1,1,1,1,2,4,0.8,2.5,0,0,1,0\n",
            header()
        );
        let table = parse_table(input.as_bytes()).expect("table parses");
        assert_eq!(table.header()[0], "no_of_dependents");
        assert_eq!(table.rows()[0][4], 750.0);
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let input = format!(
            "{}\n2,five,10000000,12,750,1,1,1,1,2,4,0.8,2.5,0,0,1,0\n",
            header()
        );
        match parse_table(input.as_bytes()) {
            Err(BatchError::MalformedInput { detail }) => {
                assert!(detail.contains("income_annum"), "{detail}")
            }
            other => panic!("expected malformed input, got {other:?}"),
        }
    }

    #[test]
    fn rejects_nan_cells() {
        let input = format!("{}\n2,NaN,1,12,750,1,1,1,1,2,4,0.8,2.5,0,0,1,0\n", header());
        assert!(matches!(
            parse_table(input.as_bytes()),
            Err(BatchError::MalformedInput { .. })
        ));
    }

    #[test]
    fn rejects_ragged_rows() {
        let input = format!("{}\n2,5000000\n", header());
        assert!(matches!(
            parse_table(input.as_bytes()),
            Err(BatchError::MalformedInput { .. })
        ));
    }

    #[test]
    fn header_only_table_is_malformed() {
        let input = format!("{}\n", header());
        match parse_table(input.as_bytes()) {
            Err(BatchError::MalformedInput { detail }) => assert!(detail.contains("no rows")),
            other => panic!("expected malformed input, got {other:?}"),
        }
    }
}
