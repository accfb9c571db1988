use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::info;

use super::{BatchError, BatchResult};

pub const EXPORT_PREFIX: &str = "credit_analysis";

/// `credit_analysis_YYYYMMDD_HHMMSS.csv` for the given local time.
pub fn export_file_name(at: NaiveDateTime) -> String {
    format!("{EXPORT_PREFIX}_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Writes the augmented table (input columns followed by the three result columns).
pub fn write_csv<W: Write>(result: &BatchResult, writer: W) -> Result<(), BatchError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&result.header)?;

    for row in &result.rows {
        let appended = [
            row.decision.verdict.label().to_string(),
            row.decision.probabilities.approved.to_string(),
            row.decision.probabilities.rejected.to_string(),
        ];
        csv_writer.write_record(row.cells.iter().chain(appended.iter()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_string(result: &BatchResult) -> Result<String, BatchError> {
    let mut buffer = Vec::new();
    write_csv(result, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| BatchError::MalformedInput {
        detail: format!("export is not valid UTF-8: {err}"),
    })
}

/// Writes the export into `dir` under a timestamped name and returns the full path.
pub fn export_to_dir(
    result: &BatchResult,
    dir: &Path,
    at: NaiveDateTime,
) -> Result<PathBuf, BatchError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(at));
    write_csv(result, File::create(&path)?)?;
    info!(path = %path.display(), rows = result.rows.len(), "batch export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn file_name_uses_compact_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(7, 5, 31))
            .expect("valid timestamp");
        assert_eq!(export_file_name(at), "credit_analysis_20240309_070531.csv");
    }
}
