//! Filter functions driven by an explicit `FilterState`.
//!
//! All functions are pure: the same inputs always give the same output, and
//! filtering an already filtered sequence with the same state is a no-op.

use std::collections::BTreeSet;

use crate::domain::{CategoryVariation, FilterState, MonthlySeries, Observation, YearRange};

/// Observations whose year lies in `years` (inclusive), in series order.
pub fn filter_observations(observations: &[Observation], years: &YearRange) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| years.contains(o.year()))
        .copied()
        .collect()
}

/// Category rows whose name is selected, in table order.
pub fn filter_categories(
    table: &[CategoryVariation],
    selected: &BTreeSet<String>,
) -> Vec<CategoryVariation> {
    table
        .iter()
        .filter(|c| selected.contains(c.name))
        .copied()
        .collect()
}

/// Default filter: the full year span of the series and every category.
pub fn default_filter(series: &MonthlySeries, table: &[CategoryVariation]) -> Option<FilterState> {
    let (lo, hi) = series.year_bounds()?;
    Some(FilterState::new(
        YearRange::new(lo, hi),
        table.iter().map(|c| c.name.to_string()),
    ))
}
