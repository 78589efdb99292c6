//! Exponential smoothing model implementations.
//!
//! Models are implemented as small, pure functions so that fitting/search code can
//! stay generic.

pub mod holt_winters;

pub use holt_winters::*;
