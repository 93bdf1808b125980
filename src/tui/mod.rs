//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for Ωm, the upper redshift and the grid
//! size, then renders the selected series (E², w or β) against z. When E² is
//! shown the matter-only term `Ωm (1+z)³` is drawn alongside for reference.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::app::pipeline::{run_table, TableRun};
use crate::cli::TuiArgs;
use crate::domain::{RatePoint, Series, SolverOptions, TableConfig};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::UamPlottersChart;

const OMEGA_STEP: f64 = 0.01;
const Z_MAX_FACTOR: f64 = 1.25;
const Z_MAX_RANGE: (f64, f64) = (0.1, 1e4);
const STEPS_DELTA: usize = 20;
const STEPS_RANGE: (usize, usize) = (11, 2001);
const N_FIELDS: usize = 3;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(&args)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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
    config: TableConfig,
    export_path: PathBuf,
    selected_field: usize,
    status: String,
    run: Option<TableRun>,
}

impl App {
    fn new(args: &TuiArgs) -> Result<Self, AppError> {
        let omega_m = crate::app::resolve_omega_m(args.omega_m)?;
        let mut app = Self {
            config: TableConfig {
                omega_m,
                z_min: 0.0,
                z_max: args.z_max.clamp(Z_MAX_RANGE.0, Z_MAX_RANGE.1),
                steps: args.steps.clamp(STEPS_RANGE.0, STEPS_RANGE.1),
                parallel: false,
                series: args.series,
                plot: false,
                plot_width: 0,
                plot_height: 0,
                export_csv: None,
                export_table: Some(args.export_table.clone()),
                solver: SolverOptions::default(),
            },
            export_path: args.export_table.clone(),
            selected_field: 0,
            status: String::new(),
            run: None,
        };
        app.recompute();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < N_FIELDS {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('s') => {
                self.config.series = self.config.series.next();
                self.status = format!("series: {}", self.config.series.display_name());
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        let up = delta >= 0;
        match self.selected_field {
            0 => {
                let step = if up { OMEGA_STEP } else { -OMEGA_STEP };
                // Snap to the step grid so repeated presses do not drift.
                let next = ((self.config.omega_m + step) / OMEGA_STEP).round() * OMEGA_STEP;
                self.config.omega_m = next.clamp(0.0, 1.0);
            }
            1 => {
                let next = if up {
                    self.config.z_max * Z_MAX_FACTOR
                } else {
                    self.config.z_max / Z_MAX_FACTOR
                };
                self.config.z_max = next.clamp(Z_MAX_RANGE.0, Z_MAX_RANGE.1);
            }
            2 => {
                let next = if up {
                    self.config.steps.saturating_add(STEPS_DELTA)
                } else {
                    self.config.steps.saturating_sub(STEPS_DELTA)
                };
                self.config.steps = next.clamp(STEPS_RANGE.0, STEPS_RANGE.1);
            }
            _ => return,
        }
        self.recompute();
    }

    /// Re-evaluate the grid; failures stay in the status line.
    fn recompute(&mut self) {
        match run_table(&self.config) {
            Ok(run) => {
                self.status = format!(
                    "Omega_m={:.4} z_max={:.3} steps={}",
                    self.config.omega_m, self.config.z_max, self.config.steps
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Evaluation failed: {err}");
                self.run = None;
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        self.status = match crate::io::write_table_json(&self.export_path, &run.table) {
            Ok(()) => format!("Wrote table: {}", self.export_path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("uam", Style::default().fg(Color::Cyan)),
            Span::raw(" - UAM expansion rate"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "Omega_m: {:.4} | z: [0, {:.3}] | steps: {} | series: {}",
                self.config.omega_m,
                self.config.z_max,
                self.config.steps,
                self.config.series.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        if let Some(p) = self.run.as_ref().and_then(|r| r.table.points.last()) {
            lines.push(Line::from(Span::styled(
                format!(
                    "at z={:.3}: w={:.6} beta={:.3e} E2={:.6} E={:.6}",
                    p.z,
                    p.w,
                    p.beta,
                    p.e2,
                    p.e(),
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("{} vs z", self.config.series.display_name());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No data (see status line).")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let series = self.config.series;
        let (curve, reference, x_bounds, y_bounds) =
            chart_series(&run.table.points, series, self.config.omega_m);
        let y_label = series.display_name().to_string();

        let (chart_rect, insets) = chart_layout(inner);
        let widget = UamPlottersChart {
            curve: &curve,
            reference: &reference,
            cursor: curve.last().copied(),
            x_bounds,
            y_bounds,
            x_label: "z",
            y_label: y_label.clone(),
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, &y_label);
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Omega_m: {:.4}", self.config.omega_m)),
            ListItem::new(format!("z max: {:.3}", self.config.z_max)),
            ListItem::new(format!("Steps: {}", self.config.steps)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  s series  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build chart series for Plotters: `(curve, reference, x_bounds, y_bounds)`.
fn chart_series(
    points: &[RatePoint],
    series: Series,
    omega_m: f64,
) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let curve: Vec<(f64, f64)> = points.iter().map(|p| (p.z, series.value(p))).collect();
    let reference: Vec<(f64, f64)> = if series == Series::E2 {
        points
            .iter()
            .map(|p| (p.z, omega_m * (1.0 + p.z).powi(3)))
            .collect()
    } else {
        Vec::new()
    };

    let (mut x0, mut x1) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, _) in &curve {
        x0 = x0.min(x);
        x1 = x1.max(x);
    }
    if !x0.is_finite() || !x1.is_finite() || x1 <= x0 {
        x0 = 0.0;
        x1 = 1.0;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in curve.iter().chain(&reference) {
        if y.is_finite() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    (curve, reference, [x0, x1], [y_min - pad, y_max + pad])
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_axis_y(v: f64) -> String {
    if v != 0.0 && v.abs() < 1e-2 {
        format!("{v:.1e}")
    } else {
        format!("{v:.2}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    y_name: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_x(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("z")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(y_name.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
