//! Report assembly: source snapshot -> normalized entries -> summaries.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::normalize::{NormalizedEntry, Normalizer};
use crate::scoring::{
    CompanyScores, OverallSummary, Score, YearChange, YearSummary, aggregate_by_company,
    aggregate_by_year, aggregate_overall, year_over_year,
};
use crate::source::SubmissionSource;
use crate::submission::RawSubmission;

pub const SCHEMA_VERSION: u8 = 1;

/// Year series, overall figures and trend for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    /// Company filter the report was built with, if any.
    pub company: Option<String>,
    pub submissions: usize,
    pub entries: usize,
    pub years: Vec<YearSummary>,
    pub overall: OverallSummary,
    pub trend: Vec<YearChange>,
}

/// Per-company breakdown of one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub submissions: usize,
    pub companies: Vec<CompanyScores>,
}

/// One row of the watch-mode history CSV.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub submissions: usize,
    pub entries: usize,
    pub environmental: Score,
    pub social: Score,
    pub governance: Score,
    pub overall: Score,
}

impl Snapshot {
    pub fn from_report(report: &ScoreReport) -> Self {
        Self {
            timestamp: report.generated_at,
            submissions: report.submissions,
            entries: report.entries,
            environmental: report.overall.environmental,
            social: report.overall.social,
            governance: report.overall.governance,
            overall: report.overall.overall,
        }
    }
}

fn matches_company(submission: &RawSubmission, company: &str) -> bool {
    submission
        .company_name
        .as_deref()
        .is_some_and(|name| name.to_lowercase() == company.to_lowercase())
}

/// Builds a [`ScoreReport`] from an in-hand snapshot.
///
/// With `company` set, only submissions whose company name matches it
/// (ignoring case) are considered.
pub fn report_from_submissions(
    submissions: &[RawSubmission],
    normalizer: &Normalizer,
    company: Option<&str>,
) -> ScoreReport {
    let selected: Vec<&RawSubmission> = submissions
        .iter()
        .filter(|s| company.is_none_or(|c| matches_company(s, c)))
        .collect();

    let entries: Vec<NormalizedEntry> = selected
        .iter()
        .flat_map(|s| normalizer.normalize_submission(s))
        .collect();

    let years = aggregate_by_year(&entries);
    let trend = year_over_year(&years);

    ScoreReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        company: company.map(str::to_string),
        submissions: selected.len(),
        entries: entries.len(),
        overall: aggregate_overall(&entries),
        years,
        trend,
    }
}

/// Builds a [`CompanyReport`] from an in-hand snapshot.
pub fn company_report_from_submissions(
    submissions: &[RawSubmission],
    normalizer: &Normalizer,
) -> CompanyReport {
    let entries = normalizer.normalize_all(submissions);

    CompanyReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        submissions: submissions.len(),
        companies: aggregate_by_company(&entries),
    }
}

/// Takes a fresh snapshot from `source` and builds a [`ScoreReport`].
#[tracing::instrument(skip(source, normalizer), fields(source = %source.describe()))]
pub async fn build_report(
    source: &dyn SubmissionSource,
    normalizer: &Normalizer,
    company: Option<&str>,
) -> Result<ScoreReport> {
    let submissions = source.list_submissions().await?;
    let report = report_from_submissions(&submissions, normalizer, company);

    info!(
        submissions = report.submissions,
        entries = report.entries,
        years = report.years.len(),
        "Score report built"
    );

    Ok(report)
}

/// Takes a fresh snapshot from `source` and builds a [`CompanyReport`].
#[tracing::instrument(skip(source, normalizer), fields(source = %source.describe()))]
pub async fn build_company_report(
    source: &dyn SubmissionSource,
    normalizer: &Normalizer,
) -> Result<CompanyReport> {
    let submissions = source.list_submissions().await?;
    let report = company_report_from_submissions(&submissions, normalizer);

    info!(
        submissions = report.submissions,
        companies = report.companies.len(),
        "Company report built"
    );

    Ok(report)
}
