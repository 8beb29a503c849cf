//! Flattens raw submissions into `(year, category, value)` entries.
//!
//! Normalization never fails. Records or metrics that cannot be attributed
//! to a year, a known category and a finite number are dropped.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::submission::{Category, RawSubmission, SubmissionPayload};

/// Metric key that nested forms use for free text, never a measurement.
const DESCRIPTION_KEY: &str = "description";

/// The canonical unit consumed by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEntry {
    pub year: i32,
    pub category: Category,
    pub metric: String,
    pub value: f64,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub region: Option<String>,
}

/// Converts submissions into [`NormalizedEntry`] records.
///
/// Holds the fallback year used when a submission carries neither a usable
/// timestamp nor a reporting year, so a run is reproducible once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    current_year: i32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Uses today's calendar year (UTC) as the fallback year.
    pub fn new() -> Self {
        Self::with_current_year(Utc::now().year())
    }

    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Timestamp year first, then `reportingYear`, then the fallback year.
    pub fn resolve_year(&self, submission: &RawSubmission) -> i32 {
        submission
            .timestamp
            .as_deref()
            .and_then(year_from_timestamp)
            .or(submission.reporting_year)
            .unwrap_or(self.current_year)
    }

    /// Expands one submission into zero or more entries, in source order.
    pub fn normalize_submission(&self, submission: &RawSubmission) -> Vec<NormalizedEntry> {
        let year = self.resolve_year(submission);
        let entry = |category: Category, metric: &str, value: f64| NormalizedEntry {
            year,
            category,
            metric: metric.to_string(),
            value,
            company_name: submission.company_name.clone(),
            sector: submission.sector.clone(),
            region: submission.region.clone(),
        };

        match &submission.payload {
            SubmissionPayload::Flat {
                category,
                metric,
                value,
            } => {
                let Some(category) = category.as_deref().and_then(|c| c.parse::<Category>().ok())
                else {
                    return Vec::new();
                };
                parse_metric_value(value)
                    .map(|v| entry(category, metric.as_deref().unwrap_or_default(), v))
                    .into_iter()
                    .collect()
            }
            payload @ SubmissionPayload::Nested { .. } => payload
                .sections()
                .flat_map(|(category, metrics)| {
                    metrics
                        .iter()
                        .filter(|(name, _)| name != DESCRIPTION_KEY)
                        .filter_map(move |(name, raw)| {
                            parse_metric_value(raw).map(|v| (category, name, v))
                        })
                })
                .map(|(category, name, v)| entry(category, name.as_str(), v))
                .collect(),
        }
    }

    /// Normalizes a whole snapshot of submissions.
    pub fn normalize_all(&self, submissions: &[RawSubmission]) -> Vec<NormalizedEntry> {
        let entries: Vec<NormalizedEntry> = submissions
            .iter()
            .flat_map(|s| self.normalize_submission(s))
            .collect();

        debug!(
            submissions = submissions.len(),
            entries = entries.len(),
            "Submissions normalized"
        );

        entries
    }
}

/// Parses a metric value as a finite decimal number.
///
/// Strings are parsed whole: surrounding whitespace, trailing text, the empty
/// string and non-finite spellings such as `"NaN"` are all rejected.
pub fn parse_metric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.is_empty() => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Calendar year of an ISO-8601 timestamp (full date-time or bare date).
pub fn year_from_timestamp(timestamp: &str) -> Option<i32> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.year());
    }
    // Minute precision, with an offset or `Z`.
    if let Ok(dt) = DateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M%#z") {
        return Some(dt.year());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, format) {
            return Some(dt.year());
        }
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
