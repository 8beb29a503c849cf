//! Output formatting and persistence for score reports.
//!
//! Supports log-friendly rendering, JSON/CSV export, and CSV append.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::report::ScoreReport;
use crate::scoring::YearSummary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &ScoreReport) {
    debug!("{:#?}", report);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs one line per year, sentinels rendered as `-`.
pub fn log_years(years: &[YearSummary]) {
    for row in years {
        info!(
            year = row.year,
            environmental = %row.environmental,
            social = %row.social,
            governance = %row.governance,
            average = %row.average,
            "Year summary"
        );
    }
}

/// Writes `value` as pretty-printed JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {path}"))?;
    Ok(())
}

/// Writes `rows` as a CSV file with a header row, replacing any existing file.
pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("failed to create {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Appends a record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &str, record: &T) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;
    use crate::report::{Snapshot, report_from_submissions};
    use crate::scoring::Score;
    use crate::submission::RawSubmission;
    use serde_json::json;
    use std::fs;

    fn report() -> ScoreReport {
        let submissions = vec![RawSubmission::from(json!({
            "companyName": "A",
            "reportingYear": 2023,
            "environmental": { "scope1": "100", "scope2": "50" },
            "social": { "totalEmployees": "10" }
        }))];
        report_from_submissions(&submissions, &Normalizer::with_current_year(2030), None)
    }

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).display().to_string()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&report());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&report()).unwrap();
    }

    #[test]
    fn test_write_csv_keeps_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "years.csv");

        write_csv(&path, &report().years).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "year,environmental,social,governance,average");
        assert!(lines[1].starts_with("2023,75"), "unexpected row: {}", lines[1]);
        assert!(lines[1].ends_with(",-,-"), "unexpected row: {}", lines[1]);
        assert!(!content.contains("0.00"));
    }

    #[test]
    fn test_write_json_round_trips_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "report.json");

        write_json(&path, &report()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["years"][0]["governance"], json!("-"));
        assert_eq!(parsed["years"][0]["environmental"], json!(75.0));
        assert_eq!(parsed["overall"]["overall"], json!(Score::SENTINEL));
    }

    #[test]
    fn test_append_record_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "history.csv");

        append_record(&path, &Snapshot::from_report(&report())).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "history.csv");

        let snapshot = Snapshot::from_report(&report());
        append_record(&path, &snapshot).unwrap();
        append_record(&path, &snapshot).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);

        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);
    }
}
