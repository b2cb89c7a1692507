//! Command-line parsing for the `cosmo` calculator.
//!
//! Argument parsing and command dispatch stay separate from the numerics:
//! this module only declares the surface, `app` turns it into library calls.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::Observable;
use crate::realizations::Realization;
use crate::solve::BatchMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cosmo", version, about = "FLRW cosmology calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the built-in published cosmologies.
    List,
    /// Print a cosmology's parameters and derived quantities.
    Show(ShowArgs),
    /// Evaluate observables at the given redshifts.
    Eval(EvalArgs),
    /// Find the redshift(s) at which an observable reaches target values.
    Solve(SolveArgs),
    /// Tabulate observables on a redshift grid (text, CSV or JSON).
    Table(TableArgs),
}

/// Dark-energy model selected by `--dark-energy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DarkEnergyKind {
    /// Cosmological constant.
    Lambda,
    /// Constant equation of state (`--w0`).
    W,
    /// `w0 + wa z/(1+z)` (`--w0 --wa`).
    W0wa,
    /// Pivot form (`--wp --wa --zp`).
    Wpwa,
    /// `w0 + wz z` (`--w0 --wz`).
    W0wz,
}

/// How the cosmology is chosen: a published realization, or custom parameters.
///
/// Passing `--h0` switches to custom mode; otherwise `--cosmology` (or
/// `COSMO_REALIZATION`) names a realization, defaulting to Planck18.
#[derive(Debug, Clone, Args)]
pub struct CosmologyArgs {
    /// Published parameter set.
    #[arg(short = 'c', long, value_enum, env = "COSMO_REALIZATION")]
    pub cosmology: Option<Realization>,

    /// Hubble constant [km/s/Mpc]; selects a custom cosmology.
    #[arg(long = "h0", requires = "om0")]
    pub h0: Option<f64>,

    /// Matter density today.
    #[arg(long = "om0", requires = "h0")]
    pub om0: Option<f64>,

    /// Dark-energy density today; selects a curved topology (flat when omitted).
    #[arg(long = "ode0", requires = "h0", allow_negative_numbers = true)]
    pub ode0: Option<f64>,

    /// CMB temperature today [K] (0 disables radiation).
    #[arg(long = "tcmb0", default_value_t = 0.0)]
    pub tcmb0: f64,

    /// Effective number of neutrino species.
    #[arg(long, default_value_t = 3.04)]
    pub neff: f64,

    /// Neutrino masses [eV], one shared value or one per species.
    #[arg(long = "m-nu", value_delimiter = ',', default_value = "0")]
    pub m_nu: Vec<f64>,

    /// Baryon density today (also applies to a realization).
    #[arg(long = "ob0")]
    pub ob0: Option<f64>,

    #[arg(long = "dark-energy", value_enum, default_value_t = DarkEnergyKind::Lambda)]
    pub dark_energy: DarkEnergyKind,

    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub w0: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub wa: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub wz: f64,

    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub wp: f64,

    /// Pivot redshift for `--dark-energy wpwa`.
    #[arg(long, default_value_t = 0.5)]
    pub zp: f64,

    /// Label shown in output (renames a realization).
    #[arg(long)]
    pub name: Option<String>,

    /// Override parameters of the selected cosmology (`KEY=VALUE`, repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE", allow_hyphen_values = true)]
    pub overrides: Vec<String>,
}

/// Integration tolerances.
#[derive(Debug, Clone, Args)]
pub struct QuadratureArgs {
    #[arg(long, default_value_t = 1.49e-8)]
    pub epsabs: f64,

    #[arg(long, default_value_t = 1.49e-8)]
    pub epsrel: f64,

    #[arg(long, default_value_t = 100)]
    pub max_subdivisions: usize,
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    /// Print the parameter set as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EvalArgs {
    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    #[command(flatten)]
    pub quadrature: QuadratureArgs,

    /// Quantities to evaluate (repeatable).
    #[arg(short = 'o', long = "observable", value_enum, required = true)]
    pub observables: Vec<Observable>,

    /// Redshifts.
    #[arg(required = true, allow_negative_numbers = true)]
    pub z: Vec<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct SolveArgs {
    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    #[command(flatten)]
    pub quadrature: QuadratureArgs,

    /// Quantity whose inverse is sought.
    #[arg(short = 'o', long = "observable", value_enum)]
    pub observable: Observable,

    /// Target values, in the observable's units.
    #[arg(required = true, allow_negative_numbers = true)]
    pub targets: Vec<f64>,

    /// Lower edge of the search bracket.
    #[arg(long)]
    pub zmin: Option<f64>,

    /// Upper edge of the search bracket.
    #[arg(long)]
    pub zmax: Option<f64>,

    #[arg(long, default_value_t = 1e-8)]
    pub ztol: f64,

    #[arg(long, default_value_t = 500)]
    pub max_iterations: usize,

    /// Grid size used to locate brackets.
    #[arg(long, default_value_t = 256)]
    pub scan_points: usize,

    #[arg(long, value_enum, default_value_t = BatchMode::FailFast)]
    pub batch_mode: BatchMode,
}

/// Output format for `cosmo table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Text,
    Csv,
    Json,
}

/// Redshift spacing for `cosmo table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Spacing {
    Linear,
    /// Uniform in `ln(1+z)`.
    Log1p,
}

#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub cosmology: CosmologyArgs,

    #[command(flatten)]
    pub quadrature: QuadratureArgs,

    /// Columns to tabulate (repeatable).
    #[arg(
        short = 'o',
        long = "observable",
        value_enum,
        default_values_t = [Observable::ComovingDistance, Observable::LuminosityDistance, Observable::Age]
    )]
    pub observables: Vec<Observable>,

    #[arg(long, default_value_t = 0.0)]
    pub zmin: f64,

    #[arg(long, default_value_t = 10.0)]
    pub zmax: f64,

    #[arg(long, default_value_t = 101)]
    pub steps: usize,

    #[arg(long, value_enum, default_value_t = Spacing::Linear)]
    pub spacing: Spacing,

    #[arg(long, value_enum, default_value_t = TableFormat::Text)]
    pub format: TableFormat,

    /// Write to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_eval_with_custom_cosmology() {
        let cli = Cli::try_parse_from([
            "cosmo", "eval", "--h0", "70", "--om0", "0.3", "--ode0", "0.7", "-o", "age", "-o",
            "comoving-distance", "0.5", "1",
        ])
        .unwrap();
        match cli.command {
            Command::Eval(args) => {
                assert_eq!(args.cosmology.h0, Some(70.0));
                assert_eq!(args.cosmology.ode0, Some(0.7));
                assert_eq!(args.observables, vec![Observable::Age, Observable::ComovingDistance]);
                assert_eq!(args.z, vec![0.5, 1.0]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_solve_with_bracket() {
        let cli = Cli::try_parse_from([
            "cosmo", "solve", "-c", "wmap9", "-o", "luminosity-distance", "--zmax", "1.5",
            "--batch-mode", "collect", "6000",
        ])
        .unwrap();
        match cli.command {
            Command::Solve(args) => {
                assert_eq!(args.cosmology.cosmology, Some(Realization::WMAP9));
                assert_eq!(args.zmax, Some(1.5));
                assert_eq!(args.batch_mode, BatchMode::Collect);
                assert_eq!(args.targets, vec![6000.0]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn h0_requires_om0() {
        assert!(Cli::try_parse_from(["cosmo", "show", "--h0", "70"]).is_err());
    }
}
