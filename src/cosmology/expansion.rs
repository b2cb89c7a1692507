//! The dimensionless Hubble function and density fractions.
//!
//! ```text
//! E(z)² = Om0 (1+z)³ + Ok0 (1+z)² + Ogamma0 (1+z)⁴ (1 + Onu/Ogamma) + Ode0 f_DE(z)
//! ```
//!
//! The fast paths in `e2` expand the same polynomial for the common
//! cosmological-constant cases; `e2_generic` is always available as the
//! reference composition.

use super::{Cosmology, ExpansionPath};
use crate::error::{CosmologyError, Result};

/// Reject redshifts outside the physical range `z ≥ -1`.
pub(crate) fn check_redshift(z: f64) -> Result<()> {
    if z.is_nan() || z.is_infinite() {
        return Err(CosmologyError::domain(format!("redshift must be finite, got z={z}")));
    }
    if z < -1.0 {
        return Err(CosmologyError::domain(format!(
            "redshift z={z} is below -1 (negative scale factor)"
        )));
    }
    Ok(())
}

impl Cosmology {
    /// `E(z)²`, dispatched through the fast path selected at construction.
    pub(crate) fn e2(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        match self.path {
            ExpansionPath::FlatLambdaNoRadiation => self.params.om0 * zp1 * zp1 * zp1 + self.ode0,
            ExpansionPath::LambdaNoRadiation => {
                zp1 * zp1 * (self.params.om0 * zp1 + self.ok0) + self.ode0
            }
            ExpansionPath::LambdaMasslessRadiation => {
                let or0 = self.ogamma0() + self.onu0();
                zp1 * zp1 * ((or0 * zp1 + self.params.om0) * zp1 + self.ok0) + self.ode0
            }
            ExpansionPath::Generic => self.e2_generic(z),
        }
    }

    /// `E(z)²` from the full composition, ignoring the fast path.
    pub(crate) fn e2_generic(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        let matter = self.params.om0 * zp1 * zp1 * zp1;
        let curvature = self.ok0 * zp1 * zp1;
        let radiation = self.neutrinos().ogamma_scaled(z) + self.neutrinos().onu_scaled(z);
        let dark_energy = if self.ode0 == 0.0 {
            0.0
        } else {
            self.ode0 * self.dark_energy.density_scale(z)
        };
        matter + curvature + radiation + dark_energy
    }

    /// Checked `E(z)²`: finite and non-negative, with `E(0)² = 1` exactly.
    pub(crate) fn e2_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        if z == 0.0 {
            return Ok(1.0);
        }
        let e2 = self.e2(z);
        if !e2.is_finite() {
            return Err(CosmologyError::numerical(format!(
                "E(z)² is not finite at z={z} (got {e2})"
            )));
        }
        if e2 < 0.0 {
            return Err(CosmologyError::domain(format!(
                "E(z)² = {e2} is negative at z={z}: this universe does not reach that redshift"
            )));
        }
        Ok(e2)
    }

    pub(crate) fn efunc_at(&self, z: f64) -> Result<f64> {
        Ok(self.e2_at(z)?.sqrt())
    }

    pub(crate) fn inv_efunc_at(&self, z: f64) -> Result<f64> {
        let e = self.efunc_at(z)?;
        if e == 0.0 {
            return Err(CosmologyError::numerical(format!(
                "expansion rate vanishes at z={z}; 1/E(z) diverges"
            )));
        }
        Ok(1.0 / e)
    }

    /// `H(z)` in km/s/Mpc.
    pub(crate) fn h_at(&self, z: f64) -> Result<f64> {
        Ok(self.params.h0 * self.efunc_at(z)?)
    }

    pub(crate) fn w_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        Ok(self.dark_energy.w(z))
    }

    pub(crate) fn de_density_scale_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        Ok(self.dark_energy.density_scale(z))
    }

    pub(crate) fn scale_factor_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        if z == -1.0 {
            return Err(CosmologyError::domain("scale factor diverges at z=-1"));
        }
        Ok(1.0 / (1.0 + z))
    }

    /// CMB temperature at `z` in K.
    pub(crate) fn tcmb_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        Ok(self.params.tcmb0 * (1.0 + z))
    }

    /// Neutrino temperature at `z` in K.
    pub(crate) fn tnu_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        Ok(self.tnu0() * (1.0 + z))
    }

    /// `Onu(z) / Ogamma(z)`.
    pub(crate) fn nu_relative_density_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        Ok(self.neutrinos().relative_density(z))
    }

    /// Critical density at `z` in g/cm³.
    pub(crate) fn critical_density_at(&self, z: f64) -> Result<f64> {
        Ok(self.critical_density0 * self.e2_at(z)?)
    }

    pub(crate) fn om_at(&self, z: f64) -> Result<f64> {
        let zp1 = 1.0 + z;
        self.fraction(z, self.params.om0 * zp1 * zp1 * zp1)
    }

    pub(crate) fn ob_at(&self, z: f64) -> Result<f64> {
        let ob0 = self.require_ob0()?;
        let zp1 = 1.0 + z;
        self.fraction(z, ob0 * zp1 * zp1 * zp1)
    }

    pub(crate) fn odm_at(&self, z: f64) -> Result<f64> {
        let odm0 = self.odm0()?;
        let zp1 = 1.0 + z;
        self.fraction(z, odm0 * zp1 * zp1 * zp1)
    }

    pub(crate) fn ok_at(&self, z: f64) -> Result<f64> {
        if self.ok0 == 0.0 {
            check_redshift(z)?;
            return Ok(0.0);
        }
        let zp1 = 1.0 + z;
        self.fraction(z, self.ok0 * zp1 * zp1)
    }

    pub(crate) fn ode_at(&self, z: f64) -> Result<f64> {
        if self.ode0 == 0.0 {
            check_redshift(z)?;
            return Ok(0.0);
        }
        self.fraction(z, self.ode0 * self.dark_energy.density_scale(z))
    }

    pub(crate) fn ogamma_at(&self, z: f64) -> Result<f64> {
        self.fraction(z, self.neutrinos().ogamma_scaled(z))
    }

    pub(crate) fn onu_at(&self, z: f64) -> Result<f64> {
        self.fraction(z, self.neutrinos().onu_scaled(z))
    }

    /// `component / E(z)²`. Today the component is returned unscaled.
    fn fraction(&self, z: f64, component: f64) -> Result<f64> {
        let e2 = self.e2_at(z)?;
        if e2 == 0.0 {
            return Err(CosmologyError::numerical(format!(
                "expansion rate vanishes at z={z}; density fractions are undefined"
            )));
        }
        Ok(component / e2)
    }
}
