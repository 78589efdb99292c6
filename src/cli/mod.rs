//! Command-line parsing for the IPCA dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data/forecast code.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ipca", version, about = "IPCA inflation dashboard and forecast (IBGE data)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    ///
    /// Fetches the series once, fits the forecast once, then recomputes the
    /// filtered views on every key press.
    Tui(DashArgs),
    /// Print key metrics, the category table, and per-year statistics.
    Report(DashArgs),
    /// Print the 24-month forecast with its scenario band.
    Forecast(ForecastArgs),
}

/// Options for `ipca forecast`.
#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub dash: DashArgs,

    /// Print the forecast rows as a JSON array instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Common options for every subcommand.
#[derive(Debug, Args, Clone)]
pub struct DashArgs {
    /// First month to request from the API (YYYYMM).
    #[arg(long, default_value = "200001")]
    pub start: String,

    /// Last month to request from the API (YYYYMM).
    #[arg(long, default_value = "202512")]
    pub end: String,

    /// Override the API base URL (also read from IPCA_API_BASE).
    #[arg(long)]
    pub api_base: Option<String>,

    /// First year shown (defaults to the first year in the data).
    #[arg(long)]
    pub from_year: Option<i32>,

    /// Last year shown (defaults to the last year in the data).
    #[arg(long)]
    pub to_year: Option<i32>,

    /// Category to include; repeat for several (defaults to all).
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// Render an ASCII plot in `report` output (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the ASCII plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
