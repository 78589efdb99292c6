//! `ipca-dash` library crate.
//!
//! The binary (`ipca`) is a thin wrapper around this library so that:
//!
//! - core logic (parsing, forecasting, aggregation) is testable without
//!   network access or a terminal
//! - the CLI and the TUI share one pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
