//! Input/output helpers.
//!
//! - tabulated observables + JSON export (`table`)
//! - CSV export (`export`)

pub mod export;
pub mod table;

pub use export::*;
pub use table::*;
