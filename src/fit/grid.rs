//! Smoothing-constant grid generation.
//!
//! The first stage of the fit is a deterministic grid search over `(α, β, γ)`.
//! It gives the local refinement a start point that is not at the mercy of a
//! single initial guess, and it is reproducible for the same inputs.

use crate::error::AppError;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linear_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::config(format!(
            "Invalid parameter range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::config("Grid steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// Cartesian grid of `[α, β, γ]` triples, α varying slowest.
pub fn smoothing_grid(min: f64, max: f64, steps: usize) -> Result<Vec<[f64; 3]>, AppError> {
    let values = linear_space(min, max, steps)?;
    let mut out = Vec::with_capacity(values.len().pow(3));
    for &a in &values {
        for &b in &values {
            for &g in &values {
                out.push([a, b, g]);
            }
        }
    }
    Ok(out)
}
