use crate::normalize::NormalizedEntry;
use crate::scoring::types::{CompanyScores, OverallSummary, Score, YearChange, YearSummary};
use crate::scoring::utility::{mean, round2};
use crate::submission::Category;
use std::collections::BTreeMap;

/// Group name used for entries that carry no company name.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Running sum, incremental mean and count for one category.
///
/// The incremental mean is only used once the sum has overflowed.
#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    sum: f64,
    running: f64,
    count: usize,
}

impl Bucket {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.running += (value - self.running) / self.count as f64;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        if self.sum.is_finite() {
            Some(self.sum / self.count as f64)
        } else {
            Some(self.running)
        }
    }
}

/// One bucket per [`Category`], indexed by [`Category::index`].
#[derive(Debug, Default, Clone, Copy)]
struct CategoryBuckets([Bucket; 3]);

/// Rounded category averages plus the gated combined average.
struct Averages {
    environmental: Score,
    social: Score,
    governance: Score,
    combined: Score,
}

impl CategoryBuckets {
    fn collect<'a>(entries: impl IntoIterator<Item = &'a NormalizedEntry>) -> Self {
        let mut buckets = Self::default();
        for entry in entries {
            buckets.push(entry);
        }
        buckets
    }

    fn push(&mut self, entry: &NormalizedEntry) {
        self.0[entry.category.index()].push(entry.value);
    }

    fn averages(&self) -> Averages {
        let means = Category::ALL.map(|c| self.0[c.index()].mean());

        // Only when every bucket has data; an empty bucket is not a zero.
        let combined = match means {
            [Some(e), Some(s), Some(g)] => Score::from(Some(round2(mean(&[e, s, g])))),
            _ => Score::Missing,
        };
        let [environmental, social, governance] = means.map(|m| Score::from(m.map(round2)));

        Averages {
            environmental,
            social,
            governance,
            combined,
        }
    }
}

fn summarize_years<'a>(
    entries: impl IntoIterator<Item = &'a NormalizedEntry>,
) -> Vec<YearSummary> {
    let mut by_year: BTreeMap<i32, CategoryBuckets> = BTreeMap::new();
    for entry in entries {
        by_year.entry(entry.year).or_default().push(entry);
    }

    by_year
        .into_iter()
        .map(|(year, buckets)| {
            let a = buckets.averages();
            YearSummary {
                year,
                environmental: a.environmental,
                social: a.social,
                governance: a.governance,
                average: a.combined,
            }
        })
        .collect()
}

fn summarize_overall<'a>(entries: impl IntoIterator<Item = &'a NormalizedEntry>) -> OverallSummary {
    let a = CategoryBuckets::collect(entries).averages();
    OverallSummary {
        environmental: a.environmental,
        social: a.social,
        governance: a.governance,
        overall: a.combined,
    }
}

/// Averages each category per reporting year.
///
/// Returns one row per distinct year, ascending. Empty input yields no rows.
pub fn aggregate_by_year(entries: &[NormalizedEntry]) -> Vec<YearSummary> {
    summarize_years(entries)
}

/// Averages each category over all entries regardless of year.
///
/// Recomputed from the raw entries rather than from [`aggregate_by_year`]
/// output, so per-year rounding does not compound.
pub fn aggregate_overall(entries: &[NormalizedEntry]) -> OverallSummary {
    summarize_overall(entries)
}

/// Year series and overall figures per company, sorted by company name.
pub fn aggregate_by_company(entries: &[NormalizedEntry]) -> Vec<CompanyScores> {
    let mut by_company: BTreeMap<&str, Vec<&NormalizedEntry>> = BTreeMap::new();
    for entry in entries {
        let name = entry.company_name.as_deref().unwrap_or(UNKNOWN_COMPANY);
        by_company.entry(name).or_default().push(entry);
    }

    by_company
        .into_iter()
        .map(|(name, rows)| CompanyScores {
            company_name: name.to_string(),
            years: summarize_years(rows.iter().copied()),
            overall: summarize_overall(rows.iter().copied()),
        })
        .collect()
}

/// Change between consecutive rows of an ascending year series.
///
/// A field is `Missing` unless both rows have a value for it.
pub fn year_over_year(years: &[YearSummary]) -> Vec<YearChange> {
    let delta = |from: Score, to: Score| match (from, to) {
        (Score::Value(a), Score::Value(b)) => Score::from(Some(round2(b - a))),
        _ => Score::Missing,
    };

    years
        .windows(2)
        .map(|pair| {
            let (prev, next) = (&pair[0], &pair[1]);
            YearChange {
                from_year: prev.year,
                to_year: next.year,
                environmental: delta(prev.environmental, next.environmental),
                social: delta(prev.social, next.social),
                governance: delta(prev.governance, next.governance),
                average: delta(prev.average, next.average),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(year: i32, category: Category, value: f64) -> NormalizedEntry {
        NormalizedEntry {
            year,
            category,
            metric: "m".to_string(),
            value,
            company_name: None,
            sector: None,
            region: None,
        }
    }

    fn company_entry(company: &str, year: i32, category: Category, value: f64) -> NormalizedEntry {
        NormalizedEntry {
            company_name: Some(company.to_string()),
            ..entry(year, category, value)
        }
    }

    fn full_year(year: i32) -> Vec<NormalizedEntry> {
        vec![
            entry(year, Category::Environmental, 80.0),
            entry(year, Category::Environmental, 60.0),
            entry(year, Category::Social, 40.0),
            entry(year, Category::Governance, 90.0),
        ]
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(aggregate_by_year(&[]).is_empty());
    }

    #[test]
    fn test_empty_input_overall_is_all_missing() {
        let overall = aggregate_overall(&[]);
        assert!(overall.environmental.is_missing());
        assert!(overall.social.is_missing());
        assert!(overall.governance.is_missing());
        assert!(overall.overall.is_missing());
    }

    #[test]
    fn test_single_year_partial_categories() {
        let entries = vec![
            entry(2023, Category::Environmental, 100.0),
            entry(2023, Category::Environmental, 50.0),
            entry(2023, Category::Social, 10.0),
        ];

        let rows = aggregate_by_year(&entries);
        assert_eq!(
            rows,
            vec![YearSummary {
                year: 2023,
                environmental: Score::Value(75.0),
                social: Score::Value(10.0),
                governance: Score::Missing,
                average: Score::Missing,
            }]
        );
    }

    #[test]
    fn test_single_category_year_has_two_sentinels() {
        let rows = aggregate_by_year(&[entry(2021, Category::Governance, 0.0)]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].governance, Score::Value(0.0));
        assert_eq!(rows[0].environmental, Score::Missing);
        assert_eq!(rows[0].social, Score::Missing);
        assert_eq!(rows[0].average, Score::Missing);
    }

    #[test]
    fn test_zero_values_are_not_sentinels() {
        let entries = vec![
            entry(2022, Category::Environmental, 0.0),
            entry(2022, Category::Social, 0.0),
            entry(2022, Category::Governance, 0.0),
        ];

        let rows = aggregate_by_year(&entries);
        assert_eq!(rows[0].average, Score::Value(0.0));
    }

    #[test]
    fn test_average_uses_unrounded_category_means() {
        let entries = vec![
            entry(2022, Category::Environmental, 2.0049),
            entry(2022, Category::Social, 2.0049),
            entry(2022, Category::Governance, 2.0149),
        ];

        let rows = aggregate_by_year(&entries);
        assert_eq!(rows[0].environmental, Score::Value(2.0));
        assert_eq!(rows[0].social, Score::Value(2.0));
        assert_eq!(rows[0].governance, Score::Value(2.01));
        // Averaging the rounded figures would give 2.00.
        assert_eq!(rows[0].average, Score::Value(2.01));
    }

    #[test]
    fn test_years_sorted_ascending() {
        let mut entries = full_year(2024);
        entries.extend(full_year(2019));
        entries.extend(full_year(2022));

        let years: Vec<i32> = aggregate_by_year(&entries).iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2019, 2022, 2024]);
    }

    #[test]
    fn test_full_year_average() {
        let rows = aggregate_by_year(&full_year(2024));

        assert_eq!(rows[0].environmental, Score::Value(70.0));
        assert_eq!(rows[0].social, Score::Value(40.0));
        assert_eq!(rows[0].governance, Score::Value(90.0));
        assert_eq!(rows[0].average, Score::Value(66.67));
    }

    #[test]
    fn test_gating_with_two_of_three_categories() {
        for missing in Category::ALL {
            let entries: Vec<_> = Category::ALL
                .into_iter()
                .filter(|c| *c != missing)
                .map(|c| entry(2020, c, 5.0))
                .collect();

            let rows = aggregate_by_year(&entries);
            assert_eq!(rows[0].category(missing), Score::Missing);
            assert_eq!(rows[0].average, Score::Missing);
            assert_eq!(aggregate_overall(&entries).overall, Score::Missing);
        }
    }

    #[test]
    fn test_overall_recomputed_from_raw_entries() {
        // 2023 environmental: 1 entry of 10; 2024 environmental: 3 entries of 30.
        // Averaging the per-year rows would give 20; the raw mean is 25.
        let mut entries = vec![entry(2023, Category::Environmental, 10.0)];
        entries.extend((0..3).map(|_| entry(2024, Category::Environmental, 30.0)));

        let overall = aggregate_overall(&entries);
        assert_eq!(overall.environmental, Score::Value(25.0));
        assert_eq!(overall.overall, Score::Missing);
    }

    #[test]
    fn test_overall_combined_when_all_categories_present() {
        let mut entries = full_year(2023);
        entries.push(entry(2024, Category::Social, 100.0));

        let overall = aggregate_overall(&entries);
        assert_eq!(overall.environmental, Score::Value(70.0));
        assert_eq!(overall.social, Score::Value(70.0));
        assert_eq!(overall.governance, Score::Value(90.0));
        assert_eq!(overall.overall, Score::Value(76.67));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut entries = full_year(2023);
        entries.push(entry(2024, Category::Social, 12.345));

        assert_eq!(aggregate_by_year(&entries), aggregate_by_year(&entries));
        assert_eq!(aggregate_overall(&entries), aggregate_overall(&entries));
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let mut entries = full_year(2023);
        entries.extend(full_year(2024));
        entries.push(entry(2024, Category::Social, 3.3));
        entries.push(entry(2025, Category::Environmental, 1.1));

        let forward_years = aggregate_by_year(&entries);
        let forward_overall = aggregate_overall(&entries);

        let mut reversed = entries.clone();
        reversed.reverse();
        // Deterministic interleaving shuffle.
        let mut shuffled: Vec<_> = reversed.iter().step_by(2).cloned().collect();
        shuffled.extend(reversed.iter().skip(1).step_by(2).cloned());

        for permuted in [reversed, shuffled] {
            let years = aggregate_by_year(&permuted);
            assert_eq!(years.len(), forward_years.len());
            for (a, b) in years.iter().zip(&forward_years) {
                assert_eq!(a.year, b.year);
                for c in Category::ALL {
                    assert_scores_close(a.category(c), b.category(c));
                }
                assert_scores_close(a.average, b.average);
            }

            let overall = aggregate_overall(&permuted);
            for c in Category::ALL {
                assert_scores_close(overall.category(c), forward_overall.category(c));
            }
            assert_scores_close(overall.overall, forward_overall.overall);
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let entries = full_year(2023);
        let before = entries.clone();
        let _ = aggregate_overall(&entries);
        let _ = aggregate_by_year(&entries);
        assert_eq!(entries, before);
    }

    #[test]
    fn test_aggregate_by_company() {
        let entries = vec![
            company_entry("Zeta", 2023, Category::Social, 10.0),
            company_entry("Acme", 2023, Category::Environmental, 20.0),
            company_entry("Acme", 2024, Category::Environmental, 40.0),
            entry(2023, Category::Governance, 5.0),
        ];

        let companies = aggregate_by_company(&entries);
        let names: Vec<_> = companies.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Acme", UNKNOWN_COMPANY, "Zeta"]);

        let acme = &companies[0];
        assert_eq!(acme.years.len(), 2);
        assert_eq!(acme.overall.environmental, Score::Value(30.0));
        assert_eq!(acme.overall.social, Score::Missing);
    }

    #[test]
    fn test_year_over_year() {
        let mut entries = full_year(2023);
        entries.push(entry(2024, Category::Environmental, 75.5));
        entries.push(entry(2024, Category::Social, 50.0));

        let changes = year_over_year(&aggregate_by_year(&entries));
        assert_eq!(
            changes,
            vec![YearChange {
                from_year: 2023,
                to_year: 2024,
                environmental: Score::Value(5.5),
                social: Score::Value(10.0),
                governance: Score::Missing,
                average: Score::Missing,
            }]
        );
    }

    #[test]
    fn test_huge_values_never_serialize_as_null() {
        let entries = vec![
            entry(2023, Category::Environmental, 1e307),
            entry(2023, Category::Social, 1.0),
            entry(2023, Category::Governance, 1.0),
        ];

        let years = aggregate_by_year(&entries);
        assert_eq!(years[0].environmental, Score::Value(1e307));
        assert!(years[0].average.value().is_some_and(f64::is_finite));

        let json = serde_json::to_value(&years[0]).unwrap();
        assert!(json["environmental"].is_number(), "got {json}");
        assert!(json["average"].is_number(), "got {json}");

        let overall = serde_json::to_value(aggregate_overall(&entries)).unwrap();
        assert!(overall["overall"].is_number(), "got {overall}");
    }

    #[test]
    fn test_overflowing_bucket_sum_keeps_mean_finite() {
        let entries = vec![
            entry(2023, Category::Environmental, f64::MAX),
            entry(2023, Category::Environmental, f64::MAX),
        ];

        let overall = aggregate_overall(&entries);
        assert_eq!(overall.environmental, Score::Value(f64::MAX));
    }

    #[test]
    fn test_overflowing_delta_is_missing() {
        let entries = vec![
            entry(2023, Category::Social, -f64::MAX),
            entry(2024, Category::Social, f64::MAX),
        ];

        let changes = year_over_year(&aggregate_by_year(&entries));
        assert_eq!(changes[0].social, Score::Missing);
    }

    #[test]
    fn test_year_over_year_needs_two_rows() {
        assert!(year_over_year(&[]).is_empty());
        assert!(year_over_year(&aggregate_by_year(&full_year(2020))).is_empty());
    }

    fn assert_scores_close(a: Score, b: Score) {
        match (a, b) {
            (Score::Value(x), Score::Value(y)) => {
                assert!((x - y).abs() < 1e-9, "{x} != {y}");
            }
            (Score::Missing, Score::Missing) => {}
            _ => panic!("sentinel mismatch: {a} vs {b}"),
        }
    }
}
