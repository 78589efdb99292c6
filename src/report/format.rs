//! Formatted terminal output for the CLI subcommands.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized

use crate::domain::{CategoryVariation, FilterState, ForecastPoint, MonthlySeries, YearRange};
use crate::fit::FitSummary;
use crate::report::summary::{CategoryShare, Extremes, SummaryMetrics, YearStats};

/// Format the run header (dataset span, filter, fit diagnostics).
pub fn format_run_summary(series: &MonthlySeries, filter: &FilterState, fit: &FitSummary) -> String {
    let mut out = String::new();

    out.push_str("=== ipca - IPCA Dashboard (IBGE) ===\n");
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Series: n={} | {} .. {}\n",
            series.len(),
            first.date.format("%Y-%m"),
            last.date.format("%Y-%m"),
        )),
        _ => out.push_str("Series: n=0\n"),
    }
    out.push_str(&format!(
        "Filter: years={} | categories={}\n",
        filter.years,
        filter.categories.len()
    ));

    out.push_str("\nModel: Holt-Winters (additive trend, additive season, m=12)\n");
    out.push_str(&format!(
        "- alpha={:.4} beta={:.4} gamma={:.4}\n",
        fit.params.alpha, fit.params.beta, fit.params.gamma
    ));
    out.push_str(&format!(
        "- SSE={:.4} RMSE={:.4} n={}\n",
        fit.sse, fit.rmse, fit.n
    ));
    out.push('\n');

    out
}

/// Format the three headline metrics.
pub fn format_metrics(metrics: &SummaryMetrics, years: &YearRange, forecast: &[ForecastPoint]) -> String {
    let mut out = String::new();
    out.push_str("Key metrics:\n");

    let latest_label = match metrics.latest_year {
        Some(year) => format!("Mean IPCA in {year}"),
        None => "Mean IPCA (no data in range)".to_string(),
    };
    out.push_str(&format!(
        "  {:<34} {:>10}\n",
        latest_label,
        fmt_opt(metrics.latest_year_mean)
    ));
    out.push_str(&format!(
        "  {:<34} {:>10.2}\n",
        format!("Cumulative variation ({years})"),
        metrics.cumulative_sum
    ));

    let horizon = match (forecast.first(), forecast.last()) {
        (Some(a), Some(b)) => format!("{} .. {}", a.date().format("%Y-%m"), b.date().format("%Y-%m")),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "  {:<34} {:>10.2}\n",
        format!("Forecast total ({horizon})"),
        metrics.forecast_sum
    ));

    out
}

/// Format the selected category rows with their share of the total.
pub fn format_categories(rows: &[CategoryVariation], shares: &[CategoryShare]) -> String {
    let mut out = String::new();
    out.push_str("Category variation (static sample table):\n");

    if rows.is_empty() {
        out.push_str("  (no categories selected)\n");
        return out;
    }

    out.push_str(&format!(
        "  {:<26} {:>10} {:>12} {:>8}\n",
        "category", "monthly %", "cumulative %", "share %"
    ));
    out.push_str(&format!("  {:-<26} {:-<10} {:-<12} {:-<8}\n", "", "", "", ""));
    for row in rows {
        let share = shares
            .iter()
            .find(|s| s.name == row.name)
            .map(|s| format!("{:.1}", s.share_pct))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:<26} {:>10.2} {:>12.2} {:>8}\n",
            truncate(row.name, 26),
            row.monthly_pct,
            row.cumulative_pct,
            share
        ));
    }

    out
}

/// Format the per-year statistics table.
pub fn format_rollup(rollup: &[YearStats]) -> String {
    let mut out = String::new();
    out.push_str("Statistics by year:\n");

    if rollup.is_empty() {
        out.push_str("  (no observations in range)\n");
        return out;
    }

    out.push_str(&format!(
        "  {:<6} {:>3} {:>8} {:>8} {:>8} {:>8}\n",
        "year", "n", "mean", "median", "min", "max"
    ));
    out.push_str(&format!(
        "  {:-<6} {:-<3} {:-<8} {:-<8} {:-<8} {:-<8}\n",
        "", "", "", "", "", ""
    ));
    for s in rollup {
        out.push_str(&format!(
            "  {:<6} {:>3} {:>8.2} {:>8.2} {:>8.2} {:>8.2}\n",
            s.year, s.count, s.mean, s.median, s.min, s.max
        ));
    }

    out
}

/// Format the peak and trough months.
pub fn format_extremes(extremes: &Extremes) -> String {
    let fmt = |o: Option<crate::domain::Observation>| match o {
        Some(o) => format!("{:.2} ({})", o.value, o.date.format("%Y-%m")),
        None => "-".to_string(),
    };
    format!("Peak: {} | Trough: {}\n", fmt(extremes.peak), fmt(extremes.trough))
}

/// Format the forecast table with its scenario band.
pub fn format_forecast(points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    out.push_str("Forecast (scenario analysis):\n");
    out.push_str(&format!(
        "  {:<8} {:>10} {:>11} {:>12}\n",
        "month", "expected", "optimistic", "pessimistic"
    ));
    out.push_str(&format!("  {:-<8} {:-<10} {:-<11} {:-<12}\n", "", "", "", ""));
    for p in points {
        out.push_str(&format!(
            "  {:<8} {:>10.3} {:>11.3} {:>12.3}\n",
            p.date().format("%Y-%m"),
            p.expected(),
            p.optimistic(),
            p.pessimistic()
        ));
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
