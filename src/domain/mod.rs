//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - monthly observations and the validated series (`Observation`, `MonthlySeries`)
//! - forecast output (`ForecastPoint`)
//! - the static category row and the dashboard filter (`CategoryVariation`, `FilterState`)
//! - run configuration (`DashboardConfig`)

pub mod types;

pub use types::*;
