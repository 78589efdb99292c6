//! Recomputation entry point for the filtered dashboard.
//!
//! The presentation layer calls [`DashboardView::compute`] with the current
//! `FilterState` after every interaction. Fetch and fit outputs are inputs,
//! never recomputed here.

use chrono::NaiveDate;

use crate::domain::{CategoryVariation, FilterState, ForecastPoint, MonthlySeries, Observation};
use crate::report::filter::{filter_categories, filter_observations};
use crate::report::summary::{
    CategoryShare, Extremes, SignedPoint, SummaryMetrics, YearStats, category_shares, extremes,
    signed_split, summarize, year_markers, yearly_rollup,
};

/// Everything the dashboard shows for one `FilterState`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub observations: Vec<Observation>,
    pub categories: Vec<CategoryVariation>,
    pub metrics: SummaryMetrics,
    pub rollup: Vec<YearStats>,
    pub signed: Vec<SignedPoint>,
    pub extremes: Extremes,
    pub shares: Vec<CategoryShare>,
    pub year_markers: Vec<NaiveDate>,
}

impl DashboardView {
    pub fn compute(
        series: &MonthlySeries,
        forecast: &[ForecastPoint],
        table: &[CategoryVariation],
        filter: &FilterState,
    ) -> Self {
        let observations = filter_observations(series.observations(), &filter.years);
        let categories = filter_categories(table, &filter.categories);

        Self {
            metrics: summarize(&observations, forecast),
            rollup: yearly_rollup(&observations),
            signed: signed_split(&observations),
            extremes: extremes(&observations),
            shares: category_shares(&categories),
            year_markers: year_markers(&observations),
            observations,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CATEGORY_TABLE;
    use crate::domain::{Observation, YearRange, next_month};

    fn series() -> MonthlySeries {
        let mut date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let mut obs = Vec::new();
        for i in 0..36 {
            obs.push(Observation::new(date, ((i % 5) as f64 - 1.0) / 4.0));
            date = next_month(date).unwrap();
        }
        MonthlySeries::new(obs).unwrap()
    }

    #[test]
    fn excluding_everything_yields_empty_view() {
        let filter = FilterState::new(YearRange::single(1990), Vec::new());
        let view = DashboardView::compute(&series(), &[], &CATEGORY_TABLE, &filter);

        assert!(view.observations.is_empty());
        assert!(view.categories.is_empty());
        assert!(view.rollup.is_empty());
        assert!(view.shares.is_empty());
        assert!(view.year_markers.is_empty());
        assert_eq!(view.metrics.latest_year_mean, None);
        assert_eq!(view.metrics.cumulative_sum, 0.0);
    }

    #[test]
    fn recompute_with_same_filter_is_stable() {
        let s = series();
        let filter = FilterState::new(YearRange::new(2020, 2021), vec!["Transportes".to_string()]);
        let a = DashboardView::compute(&s, &[], &CATEGORY_TABLE, &filter);
        let b = DashboardView::compute(&s, &[], &CATEGORY_TABLE, &filter);
        assert_eq!(a, b);
        assert_eq!(a.observations.len(), 24);
        assert_eq!(a.rollup.len(), 2);
        assert_eq!(a.metrics.latest_year, Some(2021));
        assert_eq!(a.shares.len(), 1);
        assert!((a.shares[0].share_pct - 100.0).abs() < 1e-12);
    }
}
