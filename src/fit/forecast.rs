//! Forecast engine: fit the series and project it forward.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{ForecastPoint, MonthlySeries, next_month};
use crate::error::AppError;
use crate::fit::fitter::{FitOptions, fit_model};
use crate::models::{HoltWintersParams, forecast};

/// Fit diagnostics shown next to the forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub params: HoltWintersParams,
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Projected months plus the fit that produced them.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub summary: FitSummary,
}

impl Forecast {
    /// Sum of expected values over the full horizon.
    pub fn expected_sum(&self) -> f64 {
        self.points.iter().map(|p| p.expected()).sum()
    }
}

/// Fit the full series and forecast `horizon` months past its last observation.
pub fn forecast_series(
    series: &MonthlySeries,
    horizon: usize,
    opts: &FitOptions,
) -> Result<Forecast, AppError> {
    let Some(last) = series.last() else {
        return Err(AppError::insufficient_data("No observations to forecast from."));
    };
    if series.has_gaps() {
        warn!("series has missing months; seasonal positions assume contiguity");
    }

    let values = series.values();
    let fit = fit_model(&values, opts)?;

    info!(
        alpha = fit.params.alpha,
        beta = fit.params.beta,
        gamma = fit.params.gamma,
        rmse = fit.rmse,
        n = values.len(),
        "fitted Holt-Winters model"
    );

    let dates = month_sequence(last.date, horizon)?;
    let mut points = Vec::with_capacity(horizon);
    for (i, date) in dates.into_iter().enumerate() {
        let expected = forecast(&fit.state, i + 1);
        if !expected.is_finite() {
            return Err(AppError::model("Non-finite forecast value."));
        }
        points.push(ForecastPoint::new(date, expected));
    }

    Ok(Forecast {
        points,
        summary: FitSummary {
            params: fit.params,
            sse: fit.sse,
            rmse: fit.rmse,
            n: values.len(),
        },
    })
}

/// The `count` months following `after`.
fn month_sequence(after: NaiveDate, count: usize) -> Result<Vec<NaiveDate>, AppError> {
    let mut out = Vec::with_capacity(count);
    let mut cur = after;
    for _ in 0..count {
        cur = next_month(cur).ok_or_else(|| AppError::model("Forecast date out of range."))?;
        out.push(cur);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FORECAST_HORIZON, Observation};

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series_from(start: NaiveDate, values: &[f64]) -> MonthlySeries {
        let mut date = start;
        let mut obs = Vec::new();
        for &v in values {
            obs.push(Observation::new(date, v));
            date = next_month(date).unwrap();
        }
        MonthlySeries::new(obs).unwrap()
    }

    fn ipca_like(n: usize) -> Vec<f64> {
        let base = [1.5, 0.8, 0.5, 0.4, 0.3, 0.3, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        (0..n)
            .map(|t| base[t % 12] - 0.002 * t as f64 + ((t * 31) % 7) as f64 / 100.0)
            .collect()
    }

    #[test]
    fn thirty_six_months_forecast_2003_through_2004() {
        let series = series_from(ym(2000, 1), &ipca_like(36));
        let fc = forecast_series(&series, FORECAST_HORIZON, &FitOptions::default()).unwrap();

        assert_eq!(fc.points.len(), 24);
        assert_eq!(fc.points[0].date(), ym(2003, 1));
        assert_eq!(fc.points[23].date(), ym(2004, 12));
        for pair in fc.points.windows(2) {
            assert_eq!(next_month(pair[0].date()), Some(pair[1].date()));
        }
    }

    #[test]
    fn scenario_bands_are_exact_multiples() {
        let series = series_from(ym(2010, 6), &ipca_like(40));
        let fc = forecast_series(&series, FORECAST_HORIZON, &FitOptions::default()).unwrap();
        assert_eq!(fc.points[0].date(), ym(2013, 10));
        for p in &fc.points {
            assert_eq!(p.optimistic(), p.expected() * 0.9);
            assert_eq!(p.pessimistic(), p.expected() * 1.1);
        }
    }

    #[test]
    fn exactly_two_cycles_is_enough() {
        let series = series_from(ym(2000, 1), &ipca_like(24));
        let fc = forecast_series(&series, FORECAST_HORIZON, &FitOptions::default()).unwrap();

        assert_eq!(fc.points.len(), 24);
        assert_eq!(fc.points[0].date(), ym(2002, 1));
        assert_eq!(fc.points[23].date(), ym(2003, 12));
        assert_eq!(fc.summary.n, 24);
        assert!(fc.points.iter().all(|p| p.expected().is_finite()));
    }

    #[test]
    fn undersized_series_is_insufficient_data() {
        let series = series_from(ym(2000, 1), &ipca_like(23));
        let err = forecast_series(&series, FORECAST_HORIZON, &FitOptions::default()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InsufficientData);

        let empty = MonthlySeries::default();
        assert!(forecast_series(&empty, FORECAST_HORIZON, &FitOptions::default()).is_err());
    }

    #[test]
    fn expected_sum_matches_points() {
        let series = series_from(ym(2000, 1), &ipca_like(48));
        let fc = forecast_series(&series, FORECAST_HORIZON, &FitOptions::default()).unwrap();
        let manual: f64 = fc.points.iter().map(|p| p.expected()).sum();
        assert_eq!(fc.expected_sum(), manual);
        assert_eq!(fc.summary.n, 48);
    }
}
