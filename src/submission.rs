//! Raw ESG submissions as they arrive from a local store or the data API.
//!
//! Submissions come in two shapes. A *flat* submission carries a single
//! `category` / `metric` / `value` triple; a *nested* one carries a map of
//! metric name to string-encoded number for each ESG pillar. The shape is
//! decided once, when the record is decoded, and kept as a [`SubmissionPayload`]
//! so the normalizer can match on it exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One of the three ESG pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Environmental,
    Social,
    Governance,
}

impl Category {
    /// All categories, in reporting order.
    pub const ALL: [Category; 3] = [
        Category::Environmental,
        Category::Social,
        Category::Governance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Environmental => "environmental",
            Category::Social => "social",
            Category::Governance => "governance",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Environmental => 0,
            Category::Social => 1,
            Category::Governance => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    /// Case-insensitive; anything other than the three pillar names is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "environmental" => Ok(Category::Environmental),
            "social" => Ok(Category::Social),
            "governance" => Ok(Category::Governance),
            other => Err(anyhow::anyhow!("unknown ESG category '{other}'")),
        }
    }
}

/// Metric name to raw value, in source order.
pub type MetricMap = Vec<(String, Value)>;

/// The two submission shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPayload {
    /// A single metric reading.
    Flat {
        category: Option<String>,
        metric: Option<String>,
        value: Value,
    },
    /// Per-pillar metric maps. A pillar that was absent (or not an object)
    /// is `None`.
    Nested {
        environmental: Option<MetricMap>,
        social: Option<MetricMap>,
        governance: Option<MetricMap>,
    },
}

impl SubmissionPayload {
    /// Iterates the pillar maps that are present, in [`Category::ALL`] order.
    pub fn sections(&self) -> impl Iterator<Item = (Category, &MetricMap)> {
        let maps = match self {
            SubmissionPayload::Nested {
                environmental,
                social,
                governance,
            } => [environmental.as_ref(), social.as_ref(), governance.as_ref()],
            SubmissionPayload::Flat { .. } => [None, None, None],
        };
        Category::ALL
            .into_iter()
            .zip(maps)
            .filter_map(|(category, map)| map.map(|m| (category, m)))
    }
}

/// One ESG data-entry event.
///
/// Decoding is lenient: any JSON value converts into a `RawSubmission`, with
/// unrecognised or mistyped fields left as `None`. Deciding whether the
/// record contributes anything is the normalizer's job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawSubmission {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub reporting_year: Option<i32>,
    pub timestamp: Option<String>,
    pub payload: SubmissionPayload,
}

impl From<Value> for RawSubmission {
    fn from(value: Value) -> Self {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        let is_nested = ["environmental", "social", "governance"]
            .iter()
            .any(|key| obj.get(*key).is_some_and(Value::is_object));

        let payload = if is_nested {
            let section = |key: &str| {
                obj.get(key).and_then(Value::as_object).map(|m| {
                    m.iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<MetricMap>()
                })
            };
            SubmissionPayload::Nested {
                environmental: section("environmental"),
                social: section("social"),
                governance: section("governance"),
            }
        } else {
            SubmissionPayload::Flat {
                category: text("category"),
                metric: text("metric"),
                value: obj.get("value").cloned().unwrap_or(Value::Null),
            }
        };

        RawSubmission {
            company_name: text("companyName"),
            sector: text("sector"),
            region: text("region"),
            reporting_year: obj.get("reportingYear").and_then(year_from_value),
            timestamp: text("timestamp"),
            payload,
        }
    }
}

/// Accepts an integral JSON number or a string holding one.
fn year_from_value(v: &Value) -> Option<i32> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.parse::<i32>().ok(),
        _ => None,
    }
}
