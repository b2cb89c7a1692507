//! Physical components that enter the expansion rate.
//!
//! Dark energy is a trait object so user-defined equations of state plug in
//! next to the built-in ones; radiation is a concrete model derived from the
//! CMB temperature and neutrino content.

pub mod dark_energy;
pub mod neutrino;
pub mod neutrino_table;

pub use dark_energy::*;
pub use neutrino::*;
