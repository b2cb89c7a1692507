//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the cosmology
//! - runs the evaluation or the inverse solve
//! - prints reports and writes optional exports

use std::io::Write;

use clap::Parser;

use crate::cli::{Command, EvalArgs, ShowArgs, SolveArgs, TableArgs, TableFormat};
use crate::error::AppError;
use crate::solve::{collect_solutions, solve_each};

pub mod pipeline;

/// Entry point for the `cosmo` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    run_command(cli.command)
}

pub fn run_command(command: Command) -> Result<(), AppError> {
    match command {
        Command::List => {
            print!("{}", crate::report::format_realizations());
            Ok(())
        }
        Command::Show(args) => handle_show(args),
        Command::Eval(args) => handle_eval(args),
        Command::Solve(args) => handle_solve(args),
        Command::Table(args) => handle_table(args),
    }
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let cosmo = pipeline::resolve_cosmology(&args.cosmology)?;
    if args.json {
        let value = serde_json::json!({
            "class": cosmo.class_name(),
            "parameters": cosmo.params(),
            "dark_energy": cosmo.dark_energy().spec(),
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| AppError::new(4, format!("Failed to serialize cosmology: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", crate::report::format_summary(&cosmo));
    }
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let cosmo = pipeline::resolve_with_quadrature(&args.cosmology, &args.quadrature)?;
    let columns: Vec<_> = args
        .observables
        .iter()
        .map(|&observable| (observable, cosmo.evaluate_each(observable, &args.z)))
        .collect();

    print!("{}", crate::report::format_eval(&args.z, &columns));

    let total = columns.len() * args.z.len();
    let mut failures = columns
        .iter()
        .flat_map(|(_, results)| results.iter())
        .filter_map(|r| r.as_ref().err());
    match failures.next() {
        None => Ok(()),
        Some(first) if total == 1 => Err(first.clone().into()),
        Some(first) => {
            let failed = 1 + failures.count();
            let code = AppError::from(first.clone()).exit_code();
            Err(AppError::new(code, format!("{failed} of {total} values are undefined")))
        }
    }
}

fn handle_solve(args: SolveArgs) -> Result<(), AppError> {
    let cosmo = pipeline::resolve_with_quadrature(&args.cosmology, &args.quadrature)?;
    let opts = pipeline::solver_options(&args);
    let observable = args.observable;

    let results = solve_each(|z| observable.evaluate(&cosmo, z), &args.targets, &opts);
    print!(
        "{}",
        crate::report::format_solutions(observable, &args.targets, &results)
    );

    collect_solutions(results, opts.batch_mode)?;
    Ok(())
}

fn handle_table(args: TableArgs) -> Result<(), AppError> {
    let cosmo = pipeline::resolve_with_quadrature(&args.cosmology, &args.quadrature)?;
    let (table, _failed) = pipeline::build_table(&cosmo, &args)?;

    match &args.output {
        Some(path) => {
            match args.format {
                TableFormat::Text => std::fs::write(path, crate::report::format_table(&table))
                    .map_err(|e| AppError::new(4, format!("Failed to write '{}': {e}", path.display())))?,
                TableFormat::Csv => crate::io::write_table_csv_file(path, &table)?,
                TableFormat::Json => crate::io::write_table_json_file(path, &table)?,
            }
            tracing::info!(path = %path.display(), rows = table.rows(), "table written");
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            match args.format {
                TableFormat::Text => write!(out, "{}", crate::report::format_table(&table))
                    .map_err(|e| AppError::new(4, format!("Failed to write table: {e}")))?,
                TableFormat::Csv => crate::io::write_table_csv(&mut out, &table)?,
                TableFormat::Json => {
                    crate::io::write_table_json(&mut out, &table)?;
                    writeln!(out).map_err(|e| AppError::new(4, format!("Failed to write table: {e}")))?;
                }
            }
        }
    }
    Ok(())
}
