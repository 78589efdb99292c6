//! Shared "fetch and fit" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! IBGE fetch -> forecast fit -> initial filter
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Filtered views are recomputed by the caller with `DashboardView::compute`.

use std::collections::BTreeSet;

use tracing::warn;

use crate::data::{CATEGORY_TABLE, IbgeClient, find_category};
use crate::domain::{DashboardConfig, FORECAST_HORIZON, FilterState, MonthlySeries, YearRange};
use crate::error::AppError;
use crate::fit::{FitOptions, Forecast, forecast_series};
use crate::report::default_filter;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: MonthlySeries,
    pub forecast: Forecast,
    pub filter: FilterState,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let client = IbgeClient::new(config.api_base.clone());
    let series = client.fetch_series(config.period_start, config.period_end)?;

    run_with_series(config, series)
}

/// Execute the pipeline with a pre-fetched series.
pub fn run_with_series(config: &DashboardConfig, series: MonthlySeries) -> Result<RunOutput, AppError> {
    let forecast = forecast_series(&series, FORECAST_HORIZON, &FitOptions::default())?;
    let filter = initial_filter(config, &series)?;

    Ok(RunOutput {
        series,
        forecast,
        filter,
    })
}

/// Resolve the starting `FilterState` from config.
///
/// The year range is clamped to the data; category names are matched to the
/// static table and unknown names are a config error.
pub fn initial_filter(config: &DashboardConfig, series: &MonthlySeries) -> Result<FilterState, AppError> {
    let mut filter = default_filter(series, &CATEGORY_TABLE)
        .ok_or_else(|| AppError::insufficient_data("No observations in the series."))?;
    let (lo, hi) = (filter.years.min(), filter.years.max());

    let requested = YearRange::new(config.from_year.unwrap_or(lo), config.to_year.unwrap_or(hi));
    let years = requested.clamp_to(lo, hi);
    if years != requested {
        warn!(%requested, %years, "year filter clamped to available data");
    }
    filter.years = years;

    if let Some(names) = config.categories.as_ref().filter(|names| !names.is_empty()) {
        let selected: BTreeSet<String> = names
            .iter()
            .map(|name| {
                find_category(name)
                    .map(|c| c.name.to_string())
                    .ok_or_else(|| AppError::config(format!("Unknown category '{name}'.")))
            })
            .collect::<Result<_, AppError>>()?;
        filter.categories = selected;
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Observation, next_month};
    use chrono::NaiveDate;

    fn config() -> DashboardConfig {
        DashboardConfig {
            api_base: "http://localhost".to_string(),
            period_start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2002, 12, 1).unwrap(),
            from_year: None,
            to_year: None,
            categories: None,
            plot: false,
            plot_width: 80,
            plot_height: 20,
        }
    }

    fn series(n: usize) -> MonthlySeries {
        let mut date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let mut obs = Vec::new();
        for i in 0..n {
            let v = [1.5, 0.8, 0.5, 0.4, 0.3, 0.3, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7][i % 12];
            obs.push(Observation::new(date, v + (i % 3) as f64 / 50.0));
            date = next_month(date).unwrap();
        }
        MonthlySeries::new(obs).unwrap()
    }

    #[test]
    fn run_with_series_produces_forecast_and_default_filter() {
        let out = run_with_series(&config(), series(36)).unwrap();
        assert_eq!(out.forecast.points.len(), FORECAST_HORIZON);
        assert_eq!((out.filter.years.min(), out.filter.years.max()), (2000, 2002));
        assert_eq!(out.filter.categories.len(), CATEGORY_TABLE.len());
    }

    #[test]
    fn short_series_fails_before_any_output() {
        let err = run_with_series(&config(), series(12)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientData);
    }

    #[test]
    fn requested_years_are_clamped() {
        let mut cfg = config();
        cfg.from_year = Some(1995);
        cfg.to_year = Some(2001);
        let f = initial_filter(&cfg, &series(36)).unwrap();
        assert_eq!((f.years.min(), f.years.max()), (2000, 2001));
    }

    #[test]
    fn categories_resolve_to_canonical_names() {
        let mut cfg = config();
        cfg.categories = Some(vec!["transportes".to_string()]);
        let f = initial_filter(&cfg, &series(36)).unwrap();
        assert!(f.is_selected("Transportes"));
        assert_eq!(f.categories.len(), 1);

        cfg.categories = Some(vec!["Energia".to_string()]);
        let err = initial_filter(&cfg, &series(36)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
