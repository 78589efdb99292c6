//! Forecast fitting orchestration.
//!
//! Responsibilities:
//!
//! - generate the smoothing-constant grid
//! - evaluate each candidate (parallel) and refine the best one
//! - project the fitted model forward with scenario bands

pub mod fitter;
pub mod forecast;
pub mod grid;

pub use fitter::*;
pub use forecast::*;
pub use grid::*;
