//! `cosmo-flrw` library crate.
//!
//! Homogeneous, isotropic (FLRW) background cosmology: expansion history,
//! distances, ages and volumes for ΛCDM and its dark-energy extensions, with
//! radiation and massive neutrinos, plus the inverse `z_at_value` solver.
//!
//! The binary (`cosmo`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numerics are reusable from other crates

pub mod app;
pub mod cli;
pub mod constants;
pub mod cosmology;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod realizations;
pub mod report;
pub mod solve;

pub use cosmology::{Cosmology, ExpansionPath, Redshifts};
pub use domain::{Observable, Overrides, ParameterSet};
pub use error::{AppError, CosmologyError, IntegrationWarning, Result};
pub use models::{DarkEnergy, DarkEnergySpec};
pub use realizations::Realization;
pub use solve::{BatchMode, SolverOptions};
