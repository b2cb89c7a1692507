//! Shared workflow between the subcommands.
//!
//! Every subcommand needs the same first step: turn the cosmology flags into
//! a validated `Cosmology`. The per-command steps (grid building, solver
//! options) live here too so `app` only dispatches and prints.

use crate::cli::{CosmologyArgs, DarkEnergyKind, QuadratureArgs, SolveArgs, Spacing, TableArgs};
use crate::cosmology::Cosmology;
use crate::domain::{Overrides, ParameterSet};
use crate::error::AppError;
use crate::io::Table;
use crate::math::{QuadratureOptions, linear_space, log1p_space};
use crate::models::DarkEnergySpec;
use crate::realizations::Realization;
use crate::solve::SolverOptions;

/// Build the cosmology selected on the command line.
///
/// `--h0` selects a custom cosmology from the parameter flags; otherwise a
/// realization is used (Planck18 unless `--cosmology` or
/// `COSMO_REALIZATION` says otherwise). `--set` overrides, `--name` and
/// `--ob0` are applied last in both cases.
pub fn resolve_cosmology(args: &CosmologyArgs) -> Result<Cosmology, AppError> {
    let mut overrides = Overrides::parse_pairs(&args.overrides)?;

    let base = match args.h0 {
        Some(h0) => {
            let om0 = args
                .om0
                .ok_or_else(|| AppError::new(2, "--h0 needs --om0 for a custom cosmology"))?;
            let params = match args.ode0 {
                Some(ode0) => ParameterSet::curved(h0, om0, ode0),
                None => ParameterSet::flat(h0, om0),
            }
            .with_tcmb0(args.tcmb0)
            .with_neff(args.neff)
            .with_m_nu(args.m_nu.clone());
            Cosmology::from_spec(params, dark_energy_spec(args))?
        }
        None => {
            if args.dark_energy != DarkEnergyKind::Lambda {
                return Err(AppError::new(
                    2,
                    "--dark-energy applies to custom cosmologies; pass --h0 and --om0 as well",
                ));
            }
            let realization = args.cosmology.unwrap_or(Realization::Planck18);
            tracing::debug!(realization = realization.name(), "using published realization");
            realization.cosmology()?
        }
    };

    if let Some(name) = &args.name {
        overrides = overrides.name(Some(name.clone()));
    }
    if let Some(ob0) = args.ob0 {
        overrides = overrides.ob0(Some(ob0));
    }

    let cosmo = if overrides.is_empty() {
        base
    } else {
        base.clone_with(&overrides)?
    };
    tracing::info!(cosmology = %cosmo, "resolved cosmology");
    Ok(cosmo)
}

/// Resolve the cosmology and apply the integration tolerances.
pub fn resolve_with_quadrature(args: &CosmologyArgs, quadrature: &QuadratureArgs) -> Result<Cosmology, AppError> {
    let opts = QuadratureOptions {
        epsabs: quadrature.epsabs,
        epsrel: quadrature.epsrel,
        max_subdivisions: quadrature.max_subdivisions,
    };
    Ok(resolve_cosmology(args)?.with_quadrature(opts)?)
}

pub fn dark_energy_spec(args: &CosmologyArgs) -> DarkEnergySpec {
    match args.dark_energy {
        DarkEnergyKind::Lambda => DarkEnergySpec::Lambda,
        DarkEnergyKind::W => DarkEnergySpec::ConstantW { w0: args.w0 },
        DarkEnergyKind::W0wa => DarkEnergySpec::Cpl {
            w0: args.w0,
            wa: args.wa,
        },
        DarkEnergyKind::Wpwa => DarkEnergySpec::PivotCpl {
            wp: args.wp,
            wa: args.wa,
            zp: args.zp,
        },
        DarkEnergyKind::W0wz => DarkEnergySpec::LinearW {
            w0: args.w0,
            wz: args.wz,
        },
    }
}

pub fn solver_options(args: &SolveArgs) -> SolverOptions {
    SolverOptions {
        zmin: args.zmin,
        zmax: args.zmax,
        ztol: args.ztol,
        max_iterations: args.max_iterations,
        scan_points: args.scan_points,
        batch_mode: args.batch_mode,
    }
}

/// Evaluate the requested grid. Returns the table and the number of undefined cells.
pub fn build_table(cosmo: &Cosmology, args: &TableArgs) -> Result<(Table, usize), AppError> {
    let z = match args.spacing {
        Spacing::Linear => linear_space(args.zmin, args.zmax, args.steps)?,
        Spacing::Log1p => log1p_space(args.zmin, args.zmax, args.steps)?,
    };
    let (table, failed) = Table::evaluate(cosmo, z, &args.observables);
    if failed > 0 {
        tracing::warn!(failed, "some table cells are undefined and were left empty");
    }
    Ok((table, failed))
}
