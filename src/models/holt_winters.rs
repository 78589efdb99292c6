//! Additive Holt-Winters (additive trend, additive season) evaluation.
//!
//! ```text
//! level_t  = α (y_t − s_{t−m}) + (1 − α)(level_{t−1} + trend_{t−1})
//! trend_t  = β (level_t − level_{t−1}) + (1 − β) trend_{t−1}
//! season_t = γ (y_t − level_t) + (1 − γ) s_{t−m}
//! ŷ_{T+h}  = level_T + h·trend_T + s_{T+h−m}
//! ```
//!
//! Everything here is a pure function of the data, the smoothing constants and
//! the initial state, so the search code in `fit` can stay generic.

use crate::math::fit_line;

/// Smoothing constants, each in `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltWintersParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl HoltWintersParams {
    pub fn as_array(&self) -> [f64; 3] {
        [self.alpha, self.beta, self.gamma]
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self {
            alpha: v[0],
            beta: v[1],
            gamma: v[2],
        }
    }
}

/// State immediately before the first observation.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    pub level: f64,
    pub trend: f64,
    /// Seasonal offsets indexed by `t mod period`; sums to zero.
    pub seasonal: Vec<f64>,
}

/// Final state after running the recursions over the whole series.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedState {
    pub level: f64,
    pub trend: f64,
    /// Seasonal offsets indexed by `t mod period`.
    pub seasonal: Vec<f64>,
    /// Number of observations consumed.
    pub n: usize,
    /// Sum of squared one-step-ahead errors.
    pub sse: f64,
}

/// Estimate the initial state from the first two cycles.
///
/// Level and trend come from a least squares line; seasonal offsets are the
/// per-position mean of the detrended values, centred to sum to zero.
///
/// Returns `None` when fewer than `2 * period` values are available.
pub fn initial_state(data: &[f64], period: usize) -> Option<InitialState> {
    if period < 2 || data.len() < 2 * period {
        return None;
    }

    let head = &data[..2 * period];
    let (intercept, slope) = fit_line(head)?;

    let mut seasonal = vec![0.0; period];
    for (i, &y) in head.iter().enumerate() {
        seasonal[i % period] += (y - (intercept + slope * i as f64)) / 2.0;
    }
    let centre = seasonal.iter().sum::<f64>() / period as f64;
    for s in &mut seasonal {
        *s -= centre;
    }

    // The line is anchored at index 0; the recursion starts one step earlier.
    Some(InitialState {
        level: intercept - slope,
        trend: slope,
        seasonal,
    })
}

/// Run the smoothing recursions over `data`.
pub fn smooth(data: &[f64], params: HoltWintersParams, init: &InitialState) -> SmoothedState {
    let period = init.seasonal.len();
    let HoltWintersParams { alpha, beta, gamma } = params;

    let mut level = init.level;
    let mut trend = init.trend;
    let mut seasonal = init.seasonal.clone();
    let mut sse = 0.0;

    for (t, &y) in data.iter().enumerate() {
        let idx = t % period;
        let s_prev = seasonal[idx];

        let fitted = level + trend + s_prev;
        let err = y - fitted;
        sse += err * err;

        let new_level = alpha * (y - s_prev) + (1.0 - alpha) * (level + trend);
        trend = beta * (new_level - level) + (1.0 - beta) * trend;
        seasonal[idx] = gamma * (y - new_level) + (1.0 - gamma) * s_prev;
        level = new_level;
    }

    SmoothedState {
        level,
        trend,
        seasonal,
        n: data.len(),
        sse,
    }
}

/// Forecast `h` steps (1-indexed) past the last smoothed observation.
pub fn forecast(state: &SmoothedState, h: usize) -> f64 {
    let period = state.seasonal.len();
    let idx = (state.n + h - 1) % period;
    state.level + h as f64 * state.trend + state.seasonal[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_series(n: usize) -> Vec<f64> {
        let pattern = [0.3, 0.1, -0.1, -0.2, 0.0, 0.2, 0.4, 0.1, -0.3, -0.2, -0.1, -0.2];
        (0..n)
            .map(|t| 0.5 + 0.002 * t as f64 + pattern[t % 12])
            .collect()
    }

    #[test]
    fn initial_state_centres_seasonal() {
        let init = initial_state(&seasonal_series(36), 12).unwrap();
        let total: f64 = init.seasonal.iter().sum();
        assert!(total.abs() < 1e-10);
    }

    #[test]
    fn initial_state_of_a_line_has_flat_season() {
        let data: Vec<f64> = (0..24).map(|t| 1.0 + 0.05 * t as f64).collect();
        let init = initial_state(&data, 12).unwrap();
        assert!((init.trend - 0.05).abs() < 1e-10);
        assert!((init.level - 0.95).abs() < 1e-10);
        assert!(init.seasonal.iter().all(|s| s.abs() < 1e-10));
    }

    #[test]
    fn initial_state_requires_two_cycles() {
        assert!(initial_state(&seasonal_series(23), 12).is_none());
    }

    #[test]
    fn exact_state_is_preserved_and_extrapolated() {
        let data = seasonal_series(48);
        let init = InitialState {
            level: 0.5 - 0.002,
            trend: 0.002,
            seasonal: vec![0.3, 0.1, -0.1, -0.2, 0.0, 0.2, 0.4, 0.1, -0.3, -0.2, -0.1, -0.2],
        };
        let params = HoltWintersParams {
            alpha: 0.2,
            beta: 0.1,
            gamma: 0.1,
        };
        let state = smooth(&data, params, &init);
        assert_eq!(state.n, 48);
        assert!(state.sse < 1e-20);

        let truth = seasonal_series(60);
        for h in 1..=12 {
            let f = forecast(&state, h);
            assert!((f - truth[47 + h]).abs() < 1e-9, "h={h}: {f} vs {}", truth[47 + h]);
        }
    }

    #[test]
    fn sse_is_finite_and_non_negative() {
        let data: Vec<f64> = seasonal_series(30).iter().map(|v| v * 1.5).collect();
        let init = initial_state(&data, 12).unwrap();
        let state = smooth(
            &data,
            HoltWintersParams {
                alpha: 0.5,
                beta: 0.5,
                gamma: 0.5,
            },
            &init,
        );
        assert!(state.sse.is_finite() && state.sse >= 0.0);
    }
}
