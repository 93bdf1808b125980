//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the model code stays clean and testable
//! - output changes are localized (snapshot-friendly)

use crate::check::CheckReport;
use crate::domain::{RatePoint, TableConfig};
use crate::error::ModelError;
use crate::models::defining_residual;
use crate::report::TableSummary;

/// Header block for `uam table` (configuration and grid ranges).
pub fn format_table_summary(config: &TableConfig, summary: &TableSummary) -> String {
    let mut out = String::new();

    out.push_str("=== uam - UAM expansion rate ===\n");
    out.push_str(&format!("Omega_m: {:.6}\n", config.omega_m));
    out.push_str(&format!(
        "Grid: n={} | z=[{:.3}, {:.3}] | {}\n",
        summary.n,
        summary.z_min,
        summary.z_max,
        if config.parallel { "parallel" } else { "continuation" },
    ));
    out.push_str(&format!(
        "Solver: xtol={:e} rtol={:e} max_iter={}\n",
        config.solver.xtol, config.solver.rtol, config.solver.max_iter,
    ));
    out.push_str(&format!(
        "w=[{:.6}, {:.6}] | beta_max={:.4e} | E2=[{:.6}, {:.6}]\n",
        summary.w_min, summary.w_max, summary.beta_max, summary.e2_min, summary.e2_max,
    ));
    out.push('\n');

    out
}

/// Table of evaluated points.
pub fn format_rate_table(points: &[RatePoint]) -> String {
    let rows: Vec<Result<RatePoint, ModelError>> = points.iter().copied().map(Ok).collect();
    let zs: Vec<f64> = points.iter().map(|p| p.z).collect();
    format_rate_rows(&zs, &rows)
}

/// Table of evaluated points where individual rows may have failed.
pub fn format_rate_rows(zs: &[f64], rows: &[Result<RatePoint, ModelError>]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>12} {:>14} {:>12} {:>14} {:>16} {:>14}\n",
            "z", "w", "beta", "sec2", "E2", "E"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(dashes(&[12, 14, 12, 14, 16, 14]).trim_end());
    out.push('\n');

    for (&z, row) in zs.iter().zip(rows) {
        let line = match row {
            Ok(p) => format!(
                "{:>12} {:>14.9} {:>12.4e} {:>14.6} {:>16.6} {:>14.6}",
                fmt_z(p.z),
                p.w,
                p.beta,
                p.sec2,
                p.e2,
                p.e(),
            ),
            Err(e) => format!("{:>12} error: {e}", fmt_z(z)),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Table of solved angles with the residual of `(1+z) cos²w = exp(-tan w)`.
pub fn format_solve_table(zs: &[f64], ws: &[Result<f64, ModelError>]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>12} {:>16} {:>12} {:>12}\n", "z", "w", "w_deg", "residual").trim_end());
    out.push('\n');
    out.push_str(dashes(&[12, 16, 12, 12]).trim_end());
    out.push('\n');

    for (&z, w) in zs.iter().zip(ws) {
        let line = match w {
            Ok(w) => format!(
                "{:>12} {:>16.12} {:>12.6} {:>12.3e}",
                fmt_z(z),
                w,
                w.to_degrees(),
                defining_residual(z, *w),
            ),
            Err(e) => format!("{:>12} error: {e}", fmt_z(z)),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Pass/fail table for `uam check`.
pub fn format_check_report(report: &CheckReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== uam check (seed={}, redshifts={}) ===\n",
        report.seed, report.n_redshifts
    ));
    out.push_str(format!("{:<32} {:<6} {}\n", "check", "result", "detail").trim_end());
    out.push('\n');
    out.push_str(dashes(&[32, 6, 40]).trim_end());
    out.push('\n');

    for o in &report.outcomes {
        let status = if o.passed { "ok" } else { "FAIL" };
        out.push_str(format!("{:<32} {:<6} {}", truncate(o.name, 32), status, o.detail).trim_end());
        out.push('\n');
    }

    out.push('\n');
    if report.all_passed() {
        out.push_str(&format!("All {} checks passed.\n", report.outcomes.len()));
    } else {
        out.push_str(&format!(
            "{} of {} checks failed.\n",
            report.n_failed(),
            report.outcomes.len()
        ));
    }

    out
}

fn dashes(widths: &[usize]) -> String {
    let cols: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    cols.join(" ")
}

fn fmt_z(z: f64) -> String {
    if z != 0.0 && (z.abs() >= 1e6 || z.abs() < 1e-3) {
        format!("{z:.4e}")
    } else {
        format!("{z:.4}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CheckOutcome;

    #[test]
    fn rate_table_has_header_and_rule() {
        let points = vec![RatePoint {
            z: 0.0,
            w: 0.0,
            beta: 0.0,
            sec2: 1.0,
            e2: 1.0,
        }];
        let txt = format_rate_table(&points);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with('z'));
        assert!(lines[0].ends_with('E'));
        assert!(lines[1].chars().all(|c| c == '-' || c == ' '));
        assert!(lines[2].contains("1.000000"));
    }

    #[test]
    fn failed_rows_show_the_error() {
        let zs = [1.0, -1.0];
        let ws = vec![Ok(-0.45), Err(ModelError::Domain { z: -1.0 }.at(1))];
        let txt = format_solve_table(&zs, &ws);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].contains("error: element 1: redshift z=-1"));
        assert!(!lines[2].contains("error"));
    }

    #[test]
    fn check_report_marks_failures() {
        let report = CheckReport {
            seed: 3,
            n_redshifts: 10,
            outcomes: vec![
                CheckOutcome {
                    name: "first",
                    passed: true,
                    detail: "fine".to_string(),
                },
                CheckOutcome {
                    name: "second",
                    passed: false,
                    detail: "broken".to_string(),
                },
            ],
        };
        let txt = format_check_report(&report);
        assert!(txt.starts_with("=== uam check (seed=3, redshifts=10) ==="));
        let failed = txt.lines().find(|l| l.starts_with("second")).unwrap();
        assert!(failed.contains(" FAIL "));
        assert!(failed.ends_with("broken"));
        assert!(txt.ends_with("1 of 2 checks failed.\n"));
    }

    #[test]
    fn small_and_large_redshifts_use_exponent_form() {
        assert_eq!(fmt_z(0.0), "0.0000");
        assert_eq!(fmt_z(2.5), "2.5000");
        assert_eq!(fmt_z(1e-4), "1.0000e-4");
        assert_eq!(fmt_z(1e8), "1.0000e8");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
