//! Inverse problems: redshift from a target value.

pub mod z_at_value;

pub use z_at_value::{
    BatchMode, DEFAULT_ZMAX, DEFAULT_ZMIN, SolverOptions, collect_solutions, solve_each, z_at_value,
    z_at_values,
};
