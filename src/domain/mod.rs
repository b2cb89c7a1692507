//! Domain types shared by the library and the CLI.
//!
//! - `ParameterSet` / `Overrides`: physical parameters and clone overrides
//! - `Observable`: every single-redshift accessor, by name

pub mod observable;
pub mod params;

pub use observable::*;
pub use params::*;
