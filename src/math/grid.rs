//! Redshift grids.
//!
//! Cosmological functions vary on scales set by `ln(1+z)`, so grids are
//! uniform in that variable: dense at low redshift, sparse out to z ~ 1000.
//! Used for bracket scans in the inverse solver and for tabulated exports.

use crate::error::{CosmologyError, Result};

/// Generate `steps` points between `zmin` and `zmax` (inclusive), uniform in `ln(1+z)`.
pub fn log1p_space(zmin: f64, zmax: f64, steps: usize) -> Result<Vec<f64>> {
    if !(zmin.is_finite() && zmax.is_finite() && zmin > -1.0 && zmax > zmin) {
        return Err(CosmologyError::validation(
            "redshift range",
            format!("zmin={zmin}, zmax={zmax} (must be finite, > -1, and zmax > zmin)"),
        ));
    }
    if steps < 2 {
        return Err(CosmologyError::validation("steps", "grid needs at least 2 points"));
    }

    let lo = zmin.ln_1p();
    let hi = zmax.ln_1p();
    let step = (hi - lo) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    out.push(zmin);
    for i in 1..steps - 1 {
        out.push((lo + step * i as f64).exp_m1());
    }
    // Pin the endpoints exactly so callers can rely on them.
    out.push(zmax);
    Ok(out)
}

/// Generate `steps` points linearly spaced between `zmin` and `zmax` (inclusive).
pub fn linear_space(zmin: f64, zmax: f64, steps: usize) -> Result<Vec<f64>> {
    if !(zmin.is_finite() && zmax.is_finite() && zmax > zmin) {
        return Err(CosmologyError::validation(
            "redshift range",
            format!("zmin={zmin}, zmax={zmax} (must be finite and zmax > zmin)"),
        ));
    }
    if steps < 2 {
        return Err(CosmologyError::validation("steps", "grid needs at least 2 points"));
    }
    let step = (zmax - zmin) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps - 1).map(|i| zmin + step * i as f64).collect();
    out.push(zmax);
    Ok(out)
}
