//! Aggregations over the filtered views.
//!
//! Nothing here raises on empty input: scalar means become `None` and
//! sequences come back empty.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{CategoryVariation, ForecastPoint, Observation};
use crate::math;

/// The three headline metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    /// Latest year present in the filtered data.
    pub latest_year: Option<i32>,
    /// Mean monthly value for `latest_year`.
    pub latest_year_mean: Option<f64>,
    /// Sum of filtered monthly values.
    pub cumulative_sum: f64,
    /// Sum of forecast expected values over the full horizon.
    pub forecast_sum: f64,
}

/// Per-year statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct YearStats {
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Value split into its positive and negative parts (for area charts).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedPoint {
    pub date: NaiveDate,
    pub positive: f64,
    pub negative: f64,
}

/// Highest positive and lowest negative month.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extremes {
    pub peak: Option<Observation>,
    pub trough: Option<Observation>,
}

/// A category's share of the summed cumulative variation.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub name: &'static str,
    pub share_pct: f64,
}

pub fn summarize(filtered: &[Observation], forecast: &[ForecastPoint]) -> SummaryMetrics {
    let latest_year = filtered.iter().map(|o| o.year()).max();
    let latest_year_mean = latest_year.and_then(|year| {
        let values: Vec<f64> = filtered
            .iter()
            .filter(|o| o.year() == year)
            .map(|o| o.value)
            .collect();
        math::mean(&values)
    });

    SummaryMetrics {
        latest_year,
        latest_year_mean,
        cumulative_sum: filtered.iter().map(|o| o.value).sum(),
        forecast_sum: forecast.iter().map(|p| p.expected()).sum(),
    }
}

/// Mean/median/min/max for every year present, ascending by year.
pub fn yearly_rollup(filtered: &[Observation]) -> Vec<YearStats> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for o in filtered {
        by_year.entry(o.year()).or_default().push(o.value);
    }

    by_year
        .into_iter()
        .filter_map(|(year, values)| {
            Some(YearStats {
                year,
                count: values.len(),
                mean: math::mean(&values)?,
                median: math::median(&values)?,
                min: math::min(&values)?,
                max: math::max(&values)?,
            })
        })
        .collect()
}

pub fn signed_split(filtered: &[Observation]) -> Vec<SignedPoint> {
    filtered
        .iter()
        .map(|o| SignedPoint {
            date: o.date,
            positive: o.value.max(0.0),
            negative: o.value.min(0.0),
        })
        .collect()
}

/// Earliest month holding the maximum positive value, and likewise for the
/// minimum negative value. Either side is `None` when no such month exists.
pub fn extremes(filtered: &[Observation]) -> Extremes {
    let mut out = Extremes::default();
    for o in filtered {
        if o.value > 0.0 && out.peak.is_none_or(|p| o.value > p.value) {
            out.peak = Some(*o);
        }
        if o.value < 0.0 && out.trough.is_none_or(|t| o.value < t.value) {
            out.trough = Some(*o);
        }
    }
    out
}

/// Percent share of each row's cumulative variation in the selection total.
///
/// Returns an empty vec when the selection is empty or sums to zero.
pub fn category_shares(rows: &[CategoryVariation]) -> Vec<CategoryShare> {
    let total: f64 = rows.iter().map(|c| c.cumulative_pct).sum();
    if rows.is_empty() || total == 0.0 {
        return Vec::new();
    }
    rows.iter()
        .map(|c| CategoryShare {
            name: c.name,
            share_pct: c.cumulative_pct / total * 100.0,
        })
        .collect()
}

/// First observed month of every year present (year separators).
pub fn year_markers(filtered: &[Observation]) -> Vec<NaiveDate> {
    let mut out: Vec<NaiveDate> = Vec::new();
    let mut last_year = None;
    for o in filtered {
        if last_year != Some(o.year()) {
            out.push(o.date);
            last_year = Some(o.year());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CATEGORY_TABLE;

    fn obs(y: i32, m: u32, v: f64) -> Observation {
        Observation::new(NaiveDate::from_ymd_opt(y, m, 1).unwrap(), v)
    }

    #[test]
    fn summary_uses_latest_year_in_filter() {
        let data = vec![obs(2023, 11, 0.2), obs(2023, 12, 0.6), obs(2024, 1, 0.4), obs(2024, 2, 0.8)];
        let fc = vec![
            ForecastPoint::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 0.5),
            ForecastPoint::new(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), 0.25),
        ];
        let s = summarize(&data, &fc);
        assert_eq!(s.latest_year, Some(2024));
        assert!((s.latest_year_mean.unwrap() - 0.6).abs() < 1e-12);
        assert!((s.cumulative_sum - 2.0).abs() < 1e-12);
        assert_eq!(s.forecast_sum, 0.75);
    }

    #[test]
    fn summary_of_empty_filter_is_well_defined() {
        let s = summarize(&[], &[]);
        assert_eq!(s.latest_year, None);
        assert_eq!(s.latest_year_mean, None);
        assert_eq!(s.cumulative_sum, 0.0);
        assert_eq!(s.forecast_sum, 0.0);
    }

    #[test]
    fn rollup_groups_by_year_ascending() {
        let data = vec![
            obs(2001, 1, 0.1),
            obs(2001, 2, 0.5),
            obs(2001, 3, 0.3),
            obs(2002, 1, -0.2),
            obs(2002, 2, 0.4),
        ];
        let rollup = yearly_rollup(&data);
        assert_eq!(rollup.len(), 2);

        assert_eq!(rollup[0].year, 2001);
        assert_eq!(rollup[0].count, 3);
        assert!((rollup[0].mean - 0.3).abs() < 1e-12);
        assert_eq!(rollup[0].median, 0.3);
        assert_eq!(rollup[0].min, 0.1);
        assert_eq!(rollup[0].max, 0.5);

        assert_eq!(rollup[1].year, 2002);
        assert!((rollup[1].median - 0.1).abs() < 1e-12);
        assert!(yearly_rollup(&[]).is_empty());
    }

    #[test]
    fn signed_split_separates_sign() {
        let split = signed_split(&[obs(2000, 1, 0.4), obs(2000, 2, -0.3), obs(2000, 3, 0.0)]);
        assert_eq!((split[0].positive, split[0].negative), (0.4, 0.0));
        assert_eq!((split[1].positive, split[1].negative), (0.0, -0.3));
        assert_eq!((split[2].positive, split[2].negative), (0.0, 0.0));
    }

    #[test]
    fn extremes_pick_first_peak_and_trough() {
        let data = vec![obs(2000, 1, 0.9), obs(2000, 2, -0.5), obs(2000, 3, 0.9), obs(2000, 4, -0.1)];
        let e = extremes(&data);
        assert_eq!(e.peak.map(|o| o.date.format("%Y-%m").to_string()), Some("2000-01".to_string()));
        assert_eq!(e.trough.map(|o| o.value), Some(-0.5));

        let all_positive = extremes(&[obs(2000, 1, 0.2)]);
        assert!(all_positive.trough.is_none());
        assert_eq!(extremes(&[]), Extremes::default());
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let shares = category_shares(&CATEGORY_TABLE);
        let total: f64 = shares.iter().map(|s| s.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(category_shares(&[]).is_empty());
    }

    #[test]
    fn year_markers_hit_each_year_once() {
        let data = vec![obs(2000, 11, 0.1), obs(2000, 12, 0.1), obs(2001, 1, 0.1), obs(2002, 1, 0.1)];
        let markers = year_markers(&data);
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0], NaiveDate::from_ymd_opt(2000, 11, 1).unwrap());
        assert_eq!(markers[1], NaiveDate::from_ymd_opt(2001, 1, 1).unwrap());
    }
}
