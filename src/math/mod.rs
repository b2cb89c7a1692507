//! Numerical building blocks: quadrature, elliptic integrals, root finding, grids.

pub mod elliptic;
pub mod grid;
pub mod quadrature;
pub mod roots;

pub use elliptic::*;
pub use grid::*;
pub use quadrature::*;
pub use roots::*;
