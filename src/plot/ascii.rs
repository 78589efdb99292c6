//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed months: `-` line
//! - expected forecast: `*` line
//! - optimistic / pessimistic band: `.`
//! - zero line: `·` where nothing else is drawn

use chrono::{Datelike, NaiveDate};

use crate::domain::{ForecastPoint, Observation};

/// Render observed months followed by the forecast on one time axis.
pub fn render_ascii_plot(
    observations: &[Observation],
    forecast: &[ForecastPoint],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let observed: Vec<(f64, f64)> = observations
        .iter()
        .map(|o| (month_index(o.date), o.value))
        .collect();
    let expected: Vec<(f64, f64)> = forecast
        .iter()
        .map(|p| (month_index(p.date()), p.expected()))
        .collect();
    let band: Vec<(f64, f64)> = forecast
        .iter()
        .flat_map(|p| {
            let x = month_index(p.date());
            [(x, p.optimistic()), (x, p.pessimistic())]
        })
        .collect();

    let all = observed.iter().chain(&expected).chain(&band);
    let Some((x_min, x_max)) = range(all.clone().map(|&(x, _)| x)) else {
        return "Plot: no data\n".to_string();
    };
    // A single month still needs a non-empty axis.
    let (x_min, x_max) = if x_max > x_min { (x_min, x_max) } else { (x_min - 1.0, x_max + 1.0) };
    let (y_min, y_max) = range(all.map(|&(_, y)| y)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min.min(0.0), y_max.max(0.0), 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Zero line first so data overlays it.
    let zero_row = map_y(0.0, y_min, y_max, height);
    for cell in grid[zero_row].iter_mut() {
        *cell = '·';
    }

    for &(x, y) in &band {
        let (c, r) = (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height));
        grid[r][c] = '.';
    }
    draw_polyline(&mut grid, &observed, x_min, x_max, y_min, y_max, '-');
    draw_polyline(&mut grid, &expected, x_min, x_max, y_min, y_max, '*');

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]%\n",
        label(x_min),
        label(x_max)
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn month_index(date: NaiveDate) -> f64 {
    (date.year() * 12 + date.month0() as i32) as f64
}

fn label(index: f64) -> String {
    let i = index.round() as i32;
    format!("{:04}-{:02}", i.div_euclid(12), i.rem_euclid(12) + 1)
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() { Some((min, max)) } else { None }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let c = map_x(x, x_min, x_max, width);
        let r = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, c, r, ch);
        } else {
            grid[r][c] = ch;
        }
        prev = Some((c, r));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank or background cells are overwritten.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if matches!(*cell, ' ' | '·' | '.') {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let obs = vec![Observation::new(ym(2000, 1), 1.0), Observation::new(ym(2000, 2), 1.0)];
        let txt = render_ascii_plot(&obs, &[], 10, 5);
        let expected = concat!(
            "Plot: months=[2000-01, 2000-02] | y=[-0.05, 1.05]%\n",
            "----------\n",
            "          \n",
            "          \n",
            "          \n",
            "··········\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn forecast_is_drawn_after_history() {
        let obs = vec![Observation::new(ym(2000, 1), 0.5), Observation::new(ym(2000, 2), 0.4)];
        let fc = vec![ForecastPoint::new(ym(2000, 3), 0.6), ForecastPoint::new(ym(2000, 4), 0.7)];
        let txt = render_ascii_plot(&obs, &fc, 20, 8);
        assert!(txt.starts_with("Plot: months=[2000-01, 2000-04]"));
        assert!(txt.contains('*'));
        assert!(txt.contains('-'));
    }

    #[test]
    fn empty_input_does_not_panic() {
        assert_eq!(render_ascii_plot(&[], &[], 10, 5), "Plot: no data\n");
    }
}
