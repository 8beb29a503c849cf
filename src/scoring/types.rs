//! Data types produced by the aggregation pipeline.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::submission::Category;

/// A category or combined average, or the `"-"` sentinel for "no data".
///
/// `Missing` is not a zero score: it serializes as the string `"-"` and
/// displays as `-`, so no formatter can turn it into `0.00`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Value(f64),
    Missing,
}

impl Score {
    pub const SENTINEL: &'static str = "-";

    pub fn value(self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(v),
            Score::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Score::Missing)
    }
}

impl From<Option<f64>> for Score {
    fn from(value: Option<f64>) -> Self {
        value
            .filter(|v| v.is_finite())
            .map_or(Score::Missing, Score::Value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(v) => write!(f, "{v:.2}"),
            Score::Missing => f.write_str(Self::SENTINEL),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Value(v) => serializer.serialize_f64(*v),
            Score::Missing => serializer.serialize_str(Self::SENTINEL),
        }
    }
}

/// Per-category averages for one reporting year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSummary {
    pub year: i32,
    pub environmental: Score,
    pub social: Score,
    pub governance: Score,
    /// Mean of the three category averages; `Missing` unless all three exist.
    pub average: Score,
}

impl YearSummary {
    pub fn category(&self, category: Category) -> Score {
        match category {
            Category::Environmental => self.environmental,
            Category::Social => self.social,
            Category::Governance => self.governance,
        }
    }
}

/// Per-category averages over every year combined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub environmental: Score,
    pub social: Score,
    pub governance: Score,
    pub overall: Score,
}

impl OverallSummary {
    pub fn category(&self, category: Category) -> Score {
        match category {
            Category::Environmental => self.environmental,
            Category::Social => self.social,
            Category::Governance => self.governance,
        }
    }
}

/// Difference between two consecutive [`YearSummary`] rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearChange {
    pub from_year: i32,
    pub to_year: i32,
    pub environmental: Score,
    pub social: Score,
    pub governance: Score,
    pub average: Score,
}

/// Year series and overall figures for a single company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyScores {
    pub company_name: String,
    pub years: Vec<YearSummary>,
    pub overall: OverallSummary,
}
