//! Smoothing-constant estimation for the additive Holt-Winters model.
//!
//! Given:
//! - the observed values `y_t`
//! - the seasonal period `m`
//! - the box `[min_param, max_param]³`
//!
//! we minimise the in-sample one-step-ahead SSE in two stages:
//! - a coarse grid over `(α, β, γ)` evaluated in parallel
//! - a pattern search started from the best grid point
//!
//! Both stages are deterministic.

use rayon::prelude::*;
use tracing::debug;

use crate::error::AppError;
use crate::fit::grid::smoothing_grid;
use crate::models::{HoltWintersParams, InitialState, SmoothedState, initial_state, smooth};

/// Fitting options that affect how the model is calibrated.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Seasonal period (12 for monthly data).
    pub period: usize,
    /// Lower bound for each smoothing constant.
    pub min_param: f64,
    /// Upper bound for each smoothing constant.
    pub max_param: f64,
    /// Grid points per dimension in the coarse stage.
    pub grid_steps: usize,
    /// Initial pattern-search step.
    pub initial_step: f64,
    /// Pattern search stops once the step falls below this.
    pub step_tolerance: f64,
    /// Hard cap on pattern-search sweeps.
    pub max_sweeps: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            period: crate::domain::SEASONAL_PERIOD,
            min_param: 0.01,
            max_param: 0.99,
            grid_steps: 9,
            initial_step: 0.05,
            step_tolerance: 1e-4,
            max_sweeps: 400,
        }
    }
}

/// Best fit found by the search.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub params: HoltWintersParams,
    pub init: InitialState,
    pub state: SmoothedState,
    pub sse: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    params: [f64; 3],
    sse: f64,
}

/// Fit the smoothing constants to `data`.
pub fn fit_model(data: &[f64], opts: &FitOptions) -> Result<ModelFit, AppError> {
    let m = opts.period;
    if data.len() < 2 * m {
        return Err(AppError::insufficient_data(format!(
            "Need at least {} monthly observations (two seasonal cycles), got {}.",
            2 * m,
            data.len()
        )));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AppError::model("Series contains non-finite values."));
    }

    let init = initial_state(data, m)
        .ok_or_else(|| AppError::model("Could not estimate initial level/trend."))?;

    let grid = smoothing_grid(opts.min_param, opts.max_param, opts.grid_steps)?;
    let start = best_on_grid(data, &init, &grid)?;
    debug!(
        alpha = start.params[0],
        beta = start.params[1],
        gamma = start.params[2],
        sse = start.sse,
        "grid stage"
    );

    let (params, sse) = pattern_search(data, &init, start.params, start.sse, opts);
    let params = HoltWintersParams::from_array(params);
    let state = smooth(data, params, &init);

    let n = data.len();
    let rmse = (sse / n as f64).sqrt();
    Ok(ModelFit {
        params,
        init,
        state,
        sse,
        rmse,
    })
}

fn sse_at(data: &[f64], init: &InitialState, params: [f64; 3]) -> f64 {
    smooth(data, HoltWintersParams::from_array(params), init).sse
}

fn best_on_grid(data: &[f64], init: &InitialState, grid: &[[f64; 3]]) -> Result<Candidate, AppError> {
    // Evaluate each triple independently (parallel).
    let candidates: Vec<Candidate> = grid
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &params)| {
            let sse = sse_at(data, init, params);
            sse.is_finite().then_some(Candidate { idx, params, sse })
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::model("No finite fit candidates on the smoothing grid."));
    }

    // Deterministic selection: pick the minimum SSE; break ties by grid index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.sse < best.sse || (c.sse == best.sse && c.idx < best.idx) {
            best = c;
        }
    }

    Ok(best.clone())
}

/// Coordinate pattern search inside the parameter box.
///
/// Each sweep tries `±step` on every coordinate in order, keeping any strict
/// improvement. A sweep without improvement halves the step.
fn pattern_search(
    data: &[f64],
    init: &InitialState,
    start: [f64; 3],
    start_sse: f64,
    opts: &FitOptions,
) -> ([f64; 3], f64) {
    let mut best = start;
    let mut best_sse = start_sse;
    let mut step = opts.initial_step;
    let mut sweeps = 0;

    while step >= opts.step_tolerance && sweeps < opts.max_sweeps {
        sweeps += 1;
        let mut improved = false;

        for dim in 0..3 {
            for dir in [1.0, -1.0] {
                let mut trial = best;
                trial[dim] = (trial[dim] + dir * step).clamp(opts.min_param, opts.max_param);
                if trial[dim] == best[dim] {
                    continue;
                }
                let sse = sse_at(data, init, trial);
                if sse.is_finite() && sse < best_sse {
                    best = trial;
                    best_sse = sse;
                    improved = true;
                    break;
                }
            }
        }

        if !improved {
            step /= 2.0;
        }
    }

    debug!(sweeps, step, sse = best_sse, "pattern search finished");
    (best, best_sse)
}
