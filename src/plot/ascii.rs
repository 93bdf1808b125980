//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - model curve: `-` line
//! - optional reference curve (matter-only `Ωm (1+z)³`): `.` line

use crate::domain::{RatePoint, RateTable, Series};

/// Render the chosen series for in-memory points.
///
/// For `Series::E2` the matter-only term is overlaid when `omega_m` is given.
pub fn render_rate_plot(
    points: &[RatePoint],
    series: Series,
    omega_m: Option<f64>,
    width: usize,
    height: usize,
) -> String {
    let curve: Vec<(f64, f64)> = points.iter().map(|p| (p.z, series.value(p))).collect();
    let reference: Option<Vec<(f64, f64)>> = match (series, omega_m) {
        (Series::E2, Some(om)) => Some(points.iter().map(|p| (p.z, om * (1.0 + p.z).powi(3))).collect()),
        _ => None,
    };
    render_plot(&curve, reference.as_deref(), series.display_name(), width, height)
}

/// Render the chosen series from a saved table.
pub fn render_table_plot(table: &RateTable, series: Series, width: usize, height: usize) -> String {
    render_rate_plot(&table.points, series, Some(table.omega_m), width, height)
}

fn render_plot(
    curve: &[(f64, f64)],
    reference: Option<&[(f64, f64)]>,
    label: &str,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (z_min, z_max) = x_range(curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(curve, reference).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Model curve first so the reference only fills blank cells.
    draw_curve(&mut grid, curve, z_min, z_max, y_min, y_max, '-');
    if let Some(reference) = reference {
        draw_curve(&mut grid, reference, z_min, z_max, y_min, y_max, '.');
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: z=[{z_min:.3}, {z_max:.3}] | {label}=[{y_min:.4}, {y_max:.4}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn x_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in curve {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(curve: &[(f64, f64)], reference: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in curve.iter().chain(reference.unwrap_or(&[])) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
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

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let px = map_x(x, x_min, x_max, width);
        let py = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, px, py, ch);
        } else if grid[py][px] == ' ' {
            grid[py][px] = ch;
        }
        prev = Some((px, py));
    }
}

/// Integer line drawing (Bresenham-ish).
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
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
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
