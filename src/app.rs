//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initialises logging
//! - parses CLI arguments and resolves configuration
//! - fetches the IBGE series and fits the forecast
//! - prints reports or hands off to the TUI

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DashArgs, ForecastArgs};
use crate::data::CATEGORY_TABLE;
use crate::data::ibge::{API_BASE_ENV, DEFAULT_API_BASE};
use crate::domain::{DashboardConfig, ForecastPoint, parse_year_month};
use crate::error::AppError;
use crate::report::DashboardView;

pub mod pipeline;

/// Entry point for the `ipca` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // `ipca` alone (or `ipca --from-year 2020`) behaves like `ipca tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => handle_report(args),
        Command::Forecast(args) => handle_forecast(args),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_tui(args: DashArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    // Fetch and fit before touching the terminal: on failure nothing is drawn.
    let run = pipeline::run(&config)?;
    crate::tui::run(run)
}

fn handle_report(args: DashArgs) -> Result<(), AppError> {
    let config = config_from_args(&args)?;
    let run = pipeline::run(&config)?;
    let view = DashboardView::compute(&run.series, &run.forecast.points, &CATEGORY_TABLE, &run.filter);

    println!(
        "{}",
        crate::report::format_run_summary(&run.series, &run.filter, &run.forecast.summary)
    );
    println!(
        "{}",
        crate::report::format_metrics(&view.metrics, &run.filter.years, &run.forecast.points)
    );
    println!("{}", crate::report::format_extremes(&view.extremes));
    println!("{}", crate::report::format_categories(&view.categories, &view.shares));
    println!("{}", crate::report::format_rollup(&view.rollup));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &view.observations,
            &run.forecast.points,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.dash)?;
    let run = pipeline::run(&config)?;

    if args.json {
        println!("{}", forecast_json(&run.forecast.points)?);
        return Ok(());
    }

    println!(
        "{}",
        crate::report::format_run_summary(&run.series, &run.filter, &run.forecast.summary)
    );
    println!("{}", crate::report::format_forecast(&run.forecast.points));
    println!("Forecast total: {:.2}", run.forecast.expected_sum());
    Ok(())
}

/// Encode forecast rows as a pretty-printed JSON array.
fn forecast_json(points: &[ForecastPoint]) -> Result<String, AppError> {
    serde_json::to_string_pretty(points)
        .map_err(|e| AppError::model(format!("Failed to encode forecast: {e}")))
}

/// Resolve CLI flags, `.env`, and environment into a run configuration.
///
/// Precedence for the API base: `--api-base` > `IPCA_API_BASE` > built-in default.
pub fn config_from_args(args: &DashArgs) -> Result<DashboardConfig, AppError> {
    dotenvy::dotenv().ok();
    let env_base = std::env::var(API_BASE_ENV).ok().filter(|v| !v.trim().is_empty());
    config_from_parts(args, env_base)
}

fn config_from_parts(args: &DashArgs, env_base: Option<String>) -> Result<DashboardConfig, AppError> {
    let period_start = parse_year_month(args.start.trim())
        .ok_or_else(|| AppError::config(format!("Invalid --start '{}': expected YYYYMM.", args.start)))?;
    let period_end = parse_year_month(args.end.trim())
        .ok_or_else(|| AppError::config(format!("Invalid --end '{}': expected YYYYMM.", args.end)))?;
    if period_end < period_start {
        return Err(AppError::config(format!(
            "--end ({}) is before --start ({}).",
            args.end, args.start
        )));
    }

    let api_base = args
        .api_base
        .clone()
        .or(env_base)
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    Ok(DashboardConfig {
        api_base,
        period_start,
        period_end,
        from_year: args.from_year,
        to_year: args.to_year,
        categories: (!args.categories.is_empty()).then(|| args.categories.clone()),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

/// Rewrite argv so `ipca` defaults to `ipca tui`.
///
/// Rules:
/// - `ipca`                      -> `ipca tui`
/// - `ipca --from-year 2020 ...` -> `ipca tui --from-year 2020 ...`
/// - `ipca --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "forecast");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> DashArgs {
        DashArgs {
            start: "200001".to_string(),
            end: "202512".to_string(),
            api_base: None,
            from_year: None,
            to_year: None,
            categories: Vec::new(),
            plot: true,
            no_plot: false,
            width: 100,
            height: 20,
        }
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["ipca"])), argv(&["ipca", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["ipca", "--from-year", "2020"])),
            argv(&["ipca", "tui", "--from-year", "2020"])
        );
        assert_eq!(rewrite_args(argv(&["ipca", "report"])), argv(&["ipca", "report"]));
        assert_eq!(rewrite_args(argv(&["ipca", "--help"])), argv(&["ipca", "--help"]));
    }

    #[test]
    fn api_base_precedence() {
        let cfg = config_from_parts(&args(), None).unwrap();
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);

        let cfg = config_from_parts(&args(), Some("http://env".to_string())).unwrap();
        assert_eq!(cfg.api_base, "http://env");

        let mut a = args();
        a.api_base = Some("http://flag".to_string());
        let cfg = config_from_parts(&a, Some("http://env".to_string())).unwrap();
        assert_eq!(cfg.api_base, "http://flag");
    }

    #[test]
    fn invalid_period_is_config_error() {
        let mut a = args();
        a.start = "2000-01".to_string();
        let err = config_from_parts(&a, None).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);

        let mut a = args();
        a.start = "202601".to_string();
        assert!(config_from_parts(&a, None).is_err());
    }

    #[test]
    fn forecast_json_lists_rows_with_bands() {
        let points = vec![
            ForecastPoint::new(chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 0.5),
            ForecastPoint::new(chrono::NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 0.4),
        ];
        let json = forecast_json(&points).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], "2026-01-01");
        assert_eq!(rows[1]["expected"], 0.4);
        assert_eq!(rows[0]["optimistic"], 0.5 * 0.9);
    }

    #[test]
    fn no_plot_overrides_plot() {
        let mut a = args();
        a.no_plot = true;
        a.categories = vec!["Habitação".to_string()];
        let cfg = config_from_parts(&a, None).unwrap();
        assert!(!cfg.plot);
        assert_eq!(cfg.categories, Some(vec!["Habitação".to_string()]));
    }
}
