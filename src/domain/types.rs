//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - produced once by data acquisition and held immutably
//! - passed by reference into the pure filter/aggregation functions
//! - rendered by either the CLI or the TUI without conversion

use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::error::AppError;

/// Seasonal period of the monthly series (one year).
pub const SEASONAL_PERIOD: usize = 12;

/// Number of months projected forward by the forecast engine.
pub const FORECAST_HORIZON: usize = 24;

/// Multiplier applied to the expected forecast for the optimistic scenario.
pub const OPTIMISTIC_FACTOR: f64 = 0.9;

/// Multiplier applied to the expected forecast for the pessimistic scenario.
pub const PESSIMISTIC_FACTOR: f64 = 1.1;

/// Parse a 6-digit `YYYYMM` string into the first day of that month.
///
/// Returns `None` for anything that is not exactly six ASCII digits with a
/// month in `1..=12`.
pub fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw[..4].parse().ok()?;
    let month: u32 = raw[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Format a month as `YYYYMM` (the IBGE period key format).
pub fn format_year_month(date: NaiveDate) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}

/// First day of the month following `date`.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(1))
}

/// One monthly index reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    /// First day of the observed month.
    pub date: NaiveDate,
    /// Monthly IPCA variation (%).
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Chronologically ordered monthly observations.
///
/// Invariant: dates are strictly increasing (no duplicate months).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlySeries {
    observations: Vec<Observation>,
}

impl MonthlySeries {
    pub fn new(observations: Vec<Observation>) -> Result<Self, AppError> {
        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AppError::data_format(format!(
                    "Observations out of order: {} follows {}.",
                    pair[1].date.format("%Y-%m"),
                    pair[0].date.format("%Y-%m"),
                )));
            }
        }
        if let Some(obs) = observations.iter().find(|o| !o.value.is_finite()) {
            return Err(AppError::data_format(format!(
                "Non-finite value for {}.",
                obs.date.format("%Y-%m")
            )));
        }
        Ok(Self { observations })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Earliest and latest calendar year present.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        Some((self.first()?.year(), self.last()?.year()))
    }

    /// `true` when some consecutive pair is more than one month apart.
    pub fn has_gaps(&self) -> bool {
        self.observations
            .windows(2)
            .any(|pair| next_month(pair[0].date) != Some(pair[1].date))
    }
}

/// A projected month with its scenario band.
///
/// The bands are derived from `expected` at construction and cannot be set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    date: NaiveDate,
    expected: f64,
    optimistic: f64,
    pessimistic: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, expected: f64) -> Self {
        Self {
            date,
            expected,
            optimistic: expected * OPTIMISTIC_FACTOR,
            pessimistic: expected * PESSIMISTIC_FACTOR,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn expected(&self) -> f64 {
        self.expected
    }

    pub fn optimistic(&self) -> f64 {
        self.optimistic
    }

    pub fn pessimistic(&self) -> f64 {
        self.pessimistic
    }
}

/// A row of the static per-category reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryVariation {
    pub name: &'static str,
    /// Monthly variation (%).
    pub monthly_pct: f64,
    /// Cumulative variation (%).
    pub cumulative_pct: f64,
}

/// Inclusive calendar-year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// Build a range; reversed bounds are swapped.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn single(year: i32) -> Self {
        Self::new(year, year)
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    /// Restrict both ends to `[lo, hi]`, keeping `min <= max`.
    pub fn clamp_to(&self, lo: i32, hi: i32) -> Self {
        let (lo, hi) = (lo.min(hi), lo.max(hi));
        Self::new(self.min.clamp(lo, hi), self.max.clamp(lo, hi))
    }

    /// Move the lower bound by `delta`, never past the upper bound or `floor`.
    pub fn shift_min(&self, delta: i32, floor: i32) -> Self {
        let min = (self.min + delta).max(floor).min(self.max);
        Self { min, max: self.max }
    }

    /// Move the upper bound by `delta`, never below the lower bound or past `ceil`.
    pub fn shift_max(&self, delta: i32, ceil: i32) -> Self {
        let max = (self.max + delta).min(ceil).max(self.min);
        Self { min: self.min, max }
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// User-driven dashboard filter.
///
/// Owned by the presentation layer and passed explicitly into every
/// filter/aggregation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub years: YearRange,
    pub categories: BTreeSet<String>,
}

impl FilterState {
    pub fn new(years: YearRange, categories: impl IntoIterator<Item = String>) -> Self {
        Self {
            years,
            categories: categories.into_iter().collect(),
        }
    }

    /// Toggle a category in or out of the selection.
    pub fn toggle_category(&mut self, name: &str) {
        if !self.categories.remove(name) {
            self.categories.insert(name.to_string());
        }
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.categories.contains(name)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// API base URL (without trailing slash).
    pub api_base: String,
    /// First month requested from the API.
    pub period_start: NaiveDate,
    /// Last month requested from the API.
    pub period_end: NaiveDate,

    /// Initial year filter; `None` means the full span of the data.
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    /// Initial category selection; `None` means every category.
    pub categories: Option<Vec<String>>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn parse_year_month_accepts_six_digits_only() {
        assert_eq!(parse_year_month("200001"), Some(ym(2000, 1)));
        assert_eq!(parse_year_month("202512"), Some(ym(2025, 12)));
        assert_eq!(parse_year_month("200013"), None);
        assert_eq!(parse_year_month("200000"), None);
        assert_eq!(parse_year_month("20001"), None);
        assert_eq!(parse_year_month("2000-01"), None);
        assert_eq!(parse_year_month("+20001"), None);
    }

    #[test]
    fn next_month_rolls_over_year() {
        assert_eq!(next_month(ym(2002, 12)), Some(ym(2003, 1)));
        assert_eq!(format_year_month(ym(2003, 1)), "200301");
    }

    #[test]
    fn series_rejects_duplicate_months() {
        let obs = vec![
            Observation::new(ym(2000, 1), 1.0),
            Observation::new(ym(2000, 1), 2.0),
        ];
        assert!(MonthlySeries::new(obs).is_err());
    }

    #[test]
    fn series_detects_gaps() {
        let obs = vec![
            Observation::new(ym(2000, 1), 1.0),
            Observation::new(ym(2000, 3), 2.0),
        ];
        let series = MonthlySeries::new(obs).unwrap();
        assert!(series.has_gaps());
        assert_eq!(series.year_bounds(), Some((2000, 2000)));
    }

    #[test]
    fn forecast_point_bands_follow_expected() {
        let p = ForecastPoint::new(ym(2026, 1), 0.5);
        assert_eq!(p.optimistic(), 0.5 * 0.9);
        assert_eq!(p.pessimistic(), 0.5 * 1.1);
    }

    #[test]
    fn year_range_normalises_and_clamps() {
        let r = YearRange::new(2010, 2005);
        assert_eq!((r.min(), r.max()), (2005, 2010));
        let c = r.clamp_to(2007, 2020);
        assert_eq!((c.min(), c.max()), (2007, 2010));
        assert_eq!(c.shift_min(10, 2000).min(), 2010);
        assert_eq!(c.shift_max(-10, 2020).max(), 2007);
    }

    #[test]
    fn toggle_category_round_trips() {
        let mut f = FilterState::new(YearRange::single(2020), Vec::new());
        f.toggle_category("Habitação");
        assert!(f.is_selected("Habitação"));
        f.toggle_category("Habitação");
        assert!(f.categories.is_empty());
    }

    #[test]
    fn forecast_point_serializes_with_iso_date() {
        let p = ForecastPoint::new(ym(2026, 1), 1.0);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["date"], "2026-01-01");
        assert_eq!(json["expected"], 1.0);
        assert_eq!(json["pessimistic"], 1.1);
    }
}
