//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves environment configuration (`.env`)
//! - runs the model
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    BackupArgs, CheckArgs, Command, PackArgs, PlotArgs, RateArgs, SolveArgs, TableArgs,
};
use crate::domain::{CheckConfig, DEFAULT_OMEGA_M, SolverOptions, TableConfig};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable supplying Ωm when `--omega-m` is absent.
pub const ENV_OMEGA_M: &str = "UAM_OMEGA_M";
/// Environment variable supplying the backup source when `--src` is absent.
pub const ENV_ARCHIVE_DIR: &str = "UAM_ARCHIVE_DIR";

/// Entry point for the `uam` binary.
pub fn run() -> Result<(), AppError> {
    // We want `uam` and `uam --omega-m 0.3` to behave like `uam tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    dotenvy::dotenv().ok();

    // The TUI owns the terminal; log lines would corrupt the alternate screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_logging(cli.verbose);
    }

    match cli.command {
        Command::Solve(args) => handle_solve(args),
        Command::Rate(args) => handle_rate(args),
        Command::Table(args) => handle_table(args),
        Command::Plot(args) => handle_plot(args),
        Command::Check(args) => handle_check(args),
        Command::Tui(args) => crate::tui::run(args),
        Command::Backup(args) => handle_backup(args),
        Command::Pack(args) => handle_pack(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_solve(args: SolveArgs) -> Result<(), AppError> {
    let opts = SolverOptions::default();
    let ws = if args.parallel {
        crate::models::solve_w_of_z_par(&args.z, &opts)
    } else {
        crate::models::solve_w_of_z_batch(&args.z, &opts)?
            .into_iter()
            .map(Ok)
            .collect()
    };

    print!("{}", crate::report::format_solve_table(&args.z, &ws));
    first_failure(&ws)
}

fn handle_rate(args: RateArgs) -> Result<(), AppError> {
    let omega_m = resolve_omega_m(args.omega_m)?;
    let opts = SolverOptions::default();
    let rows = if args.parallel {
        crate::models::rate_points_par(&args.z, omega_m, &opts)?
    } else {
        crate::models::rate_points(&args.z, omega_m, &opts)?
            .into_iter()
            .map(Ok)
            .collect()
    };

    println!("Omega_m: {omega_m:.6}");
    print!("{}", crate::report::format_rate_rows(&args.z, &rows));
    first_failure(&rows)
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let config = table_config_from_args(&args)?;
    let run = pipeline::run_table(&config)?;

    print!("{}", crate::report::format_table_summary(&config, &run.summary));
    println!("{}", crate::report::format_rate_table(&run.table.points));

    if config.plot {
        let plot = crate::plot::render_rate_plot(
            &run.table.points,
            config.series,
            Some(config.omega_m),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_rates_csv(path, &run.table.points)?;
    }
    if let Some(path) = &config.export_table {
        crate::io::write_table_json(path, &run.table)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let table = crate::io::read_table_json(&args.table)?;
    let plot = crate::plot::render_table_plot(&table, args.series, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let config = CheckConfig {
        samples: args.samples,
        seed: args.seed,
        z_max: args.z_max,
        omega_m: resolve_omega_m(args.omega_m)?,
        solver: SolverOptions::default(),
    };
    let report = crate::check::run_checks(&config)?;

    print!("{}", crate::report::format_check_report(&report));
    if report.all_passed() {
        Ok(())
    } else {
        Err(AppError::new(
            3,
            format!("{} property check(s) failed.", report.n_failed()),
        ))
    }
}

fn handle_backup(args: BackupArgs) -> Result<(), AppError> {
    let src = resolve_archive_dir(args.src);
    let manifest = crate::io::backup_archives(&src, &args.dest)?;
    info!(count = manifest.count, "archives backed up");
    println!(
        "Backed up {} archive(s) from '{}' to '{}'.",
        manifest.count,
        manifest.src.display(),
        manifest.dest.display()
    );
    Ok(())
}

fn handle_pack(args: PackArgs) -> Result<(), AppError> {
    let summary = crate::io::pack_tree(&args.src, &args.dest)?;
    println!("[zip] {}", summary.path.display());
    println!("[sha256] {}", summary.sha256);
    Ok(())
}

/// Report the first failed element, if any, after the table was printed.
fn first_failure<T>(rows: &[Result<T, crate::error::ModelError>]) -> Result<(), AppError> {
    match rows.iter().find_map(|r| r.as_ref().err()) {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

pub fn table_config_from_args(args: &TableArgs) -> Result<TableConfig, AppError> {
    Ok(TableConfig {
        omega_m: resolve_omega_m(args.omega_m)?,
        z_min: args.z_min,
        z_max: args.z_max,
        steps: args.steps,
        parallel: args.parallel,
        series: args.series,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_table: args.export_table.clone(),
        solver: SolverOptions::default(),
    })
}

/// `--omega-m`, else `UAM_OMEGA_M`, else `π³/100`.
pub fn resolve_omega_m(arg: Option<f64>) -> Result<f64, AppError> {
    omega_m_from(arg, std::env::var(ENV_OMEGA_M).ok())
}

fn omega_m_from(arg: Option<f64>, env: Option<String>) -> Result<f64, AppError> {
    let omega_m = match (arg, env) {
        (Some(v), _) => v,
        (None, Some(raw)) => raw.trim().parse::<f64>().map_err(|e| {
            AppError::new(2, format!("Invalid {ENV_OMEGA_M}='{raw}': {e}"))
        })?,
        (None, None) => DEFAULT_OMEGA_M,
    };
    crate::models::validate_omega_m(omega_m)?;
    Ok(omega_m)
}

/// `--src`, else `UAM_ARCHIVE_DIR`, else the current directory.
pub fn resolve_archive_dir(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var_os(ENV_ARCHIVE_DIR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Rewrite argv so `uam` defaults to `uam tui`.
///
/// Rules:
/// - `uam`                      -> `uam tui`
/// - `uam --omega-m 0.3 ...`    -> `uam tui --omega-m 0.3 ...`
/// - `uam --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "solve" | "rate" | "table" | "plot" | "check" | "tui" | "backup" | "pack"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
