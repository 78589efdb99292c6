//! Least squares helpers.
//!
//! The forecast engine needs one small regression: a straight line through the
//! first two seasonal cycles, used to seed the Holt-Winters level and trend.
//!
//! Implementation choices:
//! - We solve with SVD so that tall design matrices (more rows than columns)
//!   are handled without special-casing.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Column count is tiny (2), so SVD cost is irrelevant.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y_i = intercept + slope * i` for `i = 0..n`.
///
/// Returns `(intercept, slope)`, or `None` for fewer than two points.
pub fn fit_line(ys: &[f64]) -> Option<(f64, f64)> {
    let n = ys.len();
    if n < 2 {
        return None;
    }

    let mut x = DMatrix::<f64>::zeros(n, 2);
    for i in 0..n {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = i as f64;
    }
    let y = DVector::from_column_slice(ys);

    let beta = solve_least_squares(&x, &y)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_trend() {
        let ys: Vec<f64> = (0..24).map(|i| 0.4 + 0.01 * i as f64).collect();
        let (a, b) = fit_line(&ys).unwrap();
        assert!((a - 0.4).abs() < 1e-10);
        assert!((b - 0.01).abs() < 1e-10);
    }

    #[test]
    fn fit_line_needs_two_points() {
        assert!(fit_line(&[1.0]).is_none());
    }
}
