//! Ratatui-based terminal dashboard.
//!
//! The series is fetched and the forecast fitted once, before the terminal is
//! touched. Every key press only updates the `FilterState` and recomputes the
//! `DashboardView`.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::data::CATEGORY_TABLE;
use crate::domain::{FilterState, ForecastPoint, YearRange, format_year_month};
use crate::error::AppError;
use crate::report::{DashboardView, format_rollup};

mod plotters_chart;

use plotters_chart::{LinePlottersChart, LineSpec, padded_bounds};

const OBSERVED: RGBColor = RGBColor(0, 255, 255);
const POSITIVE: RGBColor = RGBColor(0, 220, 0);
const NEGATIVE: RGBColor = RGBColor(255, 60, 60);
const MARKER: RGBColor = RGBColor(255, 255, 0);
const OPTIMISTIC: RGBColor = RGBColor(0, 200, 120);
const PESSIMISTIC: RGBColor = RGBColor(255, 140, 0);

/// Columns: monthly variation, cumulative variation, share of the selection.
const CATEGORY_PANEL_TITLE: &str = "Categories (month %, cum %, share)";

/// Observed months drawn ahead of the forecast for context.
const FORECAST_CONTEXT_MONTHS: usize = 24;

/// Start the TUI over an already fitted run.
pub fn run(output: RunOutput) -> Result<(), AppError> {
    let mut app = App::new(output)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    run: RunOutput,
    filter: FilterState,
    /// Year bounds of the full series; the range never leaves them.
    bounds: (i32, i32),
    selected: usize,
    status: String,
    view: DashboardView,
}

impl App {
    fn new(run: RunOutput) -> Result<Self, AppError> {
        let bounds = run
            .series
            .year_bounds()
            .ok_or_else(|| AppError::insufficient_data("No observations in the series."))?;
        let filter = run.filter.clone();
        let view = DashboardView::compute(&run.series, &run.forecast.points, &CATEGORY_TABLE, &filter);
        Ok(Self {
            run,
            filter,
            bounds,
            selected: 0,
            status: "Ready.".to_string(),
            view,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let (lo, hi) = self.bounds;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.set_years(self.filter.years.shift_min(-1, lo)),
            KeyCode::Right => self.set_years(self.filter.years.shift_min(1, lo)),
            KeyCode::Char('[') => self.set_years(self.filter.years.shift_max(-1, hi)),
            KeyCode::Char(']') => self.set_years(self.filter.years.shift_max(1, hi)),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < CATEGORY_TABLE.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') => {
                let name = CATEGORY_TABLE[self.selected].name;
                self.filter.toggle_category(name);
                let state = if self.filter.is_selected(name) { "on" } else { "off" };
                self.status = format!("{name}: {state}");
                self.recompute();
            }
            KeyCode::Char('a') => {
                self.filter.categories = CATEGORY_TABLE.iter().map(|c| c.name.to_string()).collect();
                self.status = "All categories selected.".to_string();
                self.recompute();
            }
            KeyCode::Char('n') => {
                self.filter.categories.clear();
                self.status = "No categories selected.".to_string();
                self.recompute();
            }
            _ => {}
        }
        false
    }

    fn set_years(&mut self, years: YearRange) {
        if years == self.filter.years {
            self.status = format!("years: {years} (limit)");
            return;
        }
        self.filter.years = years;
        self.status = format!("years: {years}");
        self.recompute();
    }

    fn recompute(&mut self) {
        self.view = DashboardView::compute(
            &self.run.series,
            &self.run.forecast.points,
            &CATEGORY_TABLE,
            &self.filter,
        );
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let m = &self.view.metrics;
        let fit = &self.run.forecast.summary;
        let gray = Style::default().fg(Color::Gray);

        let latest = match (m.latest_year, m.latest_year_mean) {
            (Some(year), Some(mean)) => format!("{year} mean: {mean:.2}%"),
            _ => "latest year mean: -".to_string(),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("ipca", Style::default().fg(Color::Cyan)),
                Span::raw(" IBGE monthly inflation dashboard"),
            ]),
            Line::from(Span::styled(
                format!(
                    "years: {} | {latest} | cumulative: {:.2} | forecast 24m: {:.2}",
                    self.filter.years, m.cumulative_sum, m.forecast_sum,
                ),
                gray,
            )),
            Line::from(Span::styled(
                format!(
                    "holt-winters alpha={:.3} beta={:.3} gamma={:.3} | rmse={:.4} | n={}",
                    fit.params.alpha, fit.params.beta, fit.params.gamma, fit.rmse, fit.n,
                ),
                gray,
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let charts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(columns[0]);

        self.draw_evolution(frame, charts[0]);
        self.draw_signed(frame, charts[1]);
        self.draw_forecast(frame, charts[2]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(CATEGORY_TABLE.len() as u16 + 2), Constraint::Min(0)])
            .split(columns[1]);

        self.draw_categories(frame, side[0]);
        self.draw_rollup(frame, side[1]);
    }

    fn draw_evolution(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(inner) = chart_frame(frame, area, "Monthly IPCA (%)") else {
            return;
        };
        if self.view.observations.is_empty() {
            draw_empty(frame, inner);
            return;
        }

        let points = self
            .view
            .observations
            .iter()
            .map(|o| (month_index(o.date), o.value))
            .collect::<Vec<_>>();
        let markers = self
            .view
            .observations
            .iter()
            .filter(|o| self.view.year_markers.contains(&o.date))
            .map(|o| ((month_index(o.date), o.value), MARKER))
            .collect::<Vec<_>>();

        let widget = LinePlottersChart {
            x_bounds: x_bounds(&points),
            y_bounds: padded_bounds(points.iter().map(|&(_, y)| y).chain([0.0])),
            lines: vec![LineSpec {
                points: &points,
                color: OBSERVED,
            }],
            markers,
            fmt_x: fmt_month,
            fmt_y: fmt_pct,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_signed(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match (&self.view.extremes.peak, &self.view.extremes.trough) {
            (Some(p), Some(t)) => format!(
                "Inflation / deflation | peak {} {:.2} | trough {} {:.2}",
                format_year_month(p.date),
                p.value,
                format_year_month(t.date),
                t.value
            ),
            _ => "Inflation / deflation".to_string(),
        };
        let Some(inner) = chart_frame(frame, area, &title) else {
            return;
        };
        if self.view.signed.is_empty() {
            draw_empty(frame, inner);
            return;
        }

        let positive = self
            .view
            .signed
            .iter()
            .map(|s| (month_index(s.date), s.positive))
            .collect::<Vec<_>>();
        let negative = self
            .view
            .signed
            .iter()
            .map(|s| (month_index(s.date), s.negative))
            .collect::<Vec<_>>();
        let markers = [&self.view.extremes.peak, &self.view.extremes.trough]
            .into_iter()
            .flatten()
            .map(|o| ((month_index(o.date), o.value), MARKER))
            .collect::<Vec<_>>();

        let widget = LinePlottersChart {
            x_bounds: x_bounds(&positive),
            y_bounds: padded_bounds(positive.iter().chain(&negative).map(|&(_, y)| y)),
            lines: vec![
                LineSpec {
                    points: &positive,
                    color: POSITIVE,
                },
                LineSpec {
                    points: &negative,
                    color: NEGATIVE,
                },
            ],
            markers,
            fmt_x: fmt_month,
            fmt_y: fmt_pct,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_forecast(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(inner) = chart_frame(frame, area, "Forecast: expected / optimistic / pessimistic") else {
            return;
        };
        let forecast = &self.run.forecast.points;
        if forecast.is_empty() {
            draw_empty(frame, inner);
            return;
        }

        let observed = self.run.series.observations();
        let tail = &observed[observed.len().saturating_sub(FORECAST_CONTEXT_MONTHS)..];
        let history = tail
            .iter()
            .map(|o| (month_index(o.date), o.value))
            .collect::<Vec<_>>();
        let scenario = |f: fn(&ForecastPoint) -> f64| {
            forecast
                .iter()
                .map(|p| (month_index(p.date()), f(p)))
                .collect::<Vec<_>>()
        };
        let expected = scenario(ForecastPoint::expected);
        let optimistic = scenario(ForecastPoint::optimistic);
        let pessimistic = scenario(ForecastPoint::pessimistic);

        let all = history
            .iter()
            .chain(&expected)
            .chain(&optimistic)
            .chain(&pessimistic)
            .copied()
            .collect::<Vec<_>>();

        let widget = LinePlottersChart {
            x_bounds: x_bounds(&all),
            y_bounds: padded_bounds(all.iter().map(|&(_, y)| y)),
            lines: vec![
                LineSpec {
                    points: &history,
                    color: OBSERVED,
                },
                LineSpec {
                    points: &optimistic,
                    color: OPTIMISTIC,
                },
                LineSpec {
                    points: &pessimistic,
                    color: PESSIMISTIC,
                },
                LineSpec {
                    points: &expected,
                    color: MARKER,
                },
            ],
            markers: Vec::new(),
            fmt_x: fmt_month,
            fmt_y: fmt_pct,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_categories(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let scale = CATEGORY_TABLE
            .iter()
            .flat_map(|c| [c.monthly_pct.abs(), c.cumulative_pct.abs()])
            .fold(0.0_f64, f64::max);
        let items = CATEGORY_TABLE
            .iter()
            .map(|c| {
                let on = self.filter.is_selected(c.name);
                let share = self
                    .view
                    .shares
                    .iter()
                    .find(|s| s.name == c.name)
                    .map(|s| format!("{:>5.1}%", s.share_pct))
                    .unwrap_or_else(|| "     -".to_string());
                let text = format!(
                    "[{}] {:<25} {:>5.2} {:<4} {:>6.2} {:<8} {share}",
                    if on { "x" } else { " " },
                    c.name,
                    c.monthly_pct,
                    bar(c.monthly_pct, scale, 4),
                    c.cumulative_pct,
                    bar(c.cumulative_pct, scale, 8),
                );
                let style = if on {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(text).style(style)
            })
            .collect::<Vec<_>>();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(CATEGORY_PANEL_TITLE)
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_rollup(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = Paragraph::new(format_rollup(&self.view.rollup))
            .block(Block::default().title("Per-year statistics").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ start year  [/] end year  ↑/↓ category  Space toggle  a all  n none  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Draw a titled block and return the cleared inner area.
fn chart_frame(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str) -> Option<Rect> {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return None;
    }
    frame.render_widget(Clear, inner);
    Some(inner)
}

fn draw_empty(frame: &mut ratatui::Frame<'_>, inner: Rect) {
    let msg = Paragraph::new("No data for the selected years.").style(Style::default().fg(Color::Yellow));
    frame.render_widget(msg, inner);
}

/// Horizontal text bar proportional to `|value| / scale`.
fn bar(value: f64, scale: f64, width: usize) -> String {
    if !(scale > 0.0) || !value.is_finite() {
        return String::new();
    }
    let cells = ((value.abs() / scale) * width as f64).round() as usize;
    "█".repeat(cells.min(width))
}

/// Months since year 0, so consecutive months are one unit apart.
fn month_index(date: NaiveDate) -> f64 {
    (date.year() * 12 + date.month0() as i32) as f64
}

fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let lo = points.iter().map(|&(x, _)| x).fold(f64::INFINITY, f64::min);
    let hi = points.iter().map(|&(x, _)| x).fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() || hi <= lo {
        return [lo - 1.0, lo + 1.0];
    }
    [lo, hi]
}

fn fmt_month(v: f64) -> String {
    let idx = v.round() as i32;
    format!("{}-{:02}", idx.div_euclid(12), idx.rem_euclid(12) + 1)
}

fn fmt_pct(v: f64) -> String {
    format!("{v:.2}")
}
