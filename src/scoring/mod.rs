//! ESG score aggregation.
//!
//! This module turns normalized entries into per-category averages, either
//! per reporting year, across every year at once, or per company. Missing
//! buckets are carried as the `"-"` sentinel rather than coerced to zero.

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate_by_company, aggregate_by_year, aggregate_overall, year_over_year};
pub use types::{CompanyScores, OverallSummary, Score, YearChange, YearSummary};
