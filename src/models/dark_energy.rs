//! Dark-energy equations of state.
//!
//! Every variant answers two questions at redshift `z`:
//! - `w(z)`, the pressure-to-density ratio
//! - `f_DE(z) = ρ_DE(z) / ρ_DE(0)`, the density evolution factor that
//!   multiplies `Ode0` inside `E(z)²`
//!
//! The two are linked by
//!
//! ```text
//! f_DE(z) = exp( 3 ∫_0^{ln(1+z)} (1 + w(z')) d ln(1+z') )
//! ```
//!
//! which is the default `density_scale`, so a new model only has to supply
//! `w`. The built-in variants override it with their closed forms.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CosmologyError, Result};
use crate::math::{QuadratureOptions, integrate};

/// A dark-energy component.
pub trait DarkEnergy: fmt::Debug + Send + Sync {
    /// Class stem used when displaying a cosmology (`LambdaCDM`, `wCDM`, ...).
    fn label(&self) -> &'static str;

    /// Equation of state `w(z)`.
    fn w(&self, z: f64) -> f64;

    /// Density evolution factor `f_DE(z)`.
    fn density_scale(&self, z: f64) -> f64 {
        if z == 0.0 {
            return 1.0;
        }
        let opts = QuadratureOptions {
            epsabs: 1e-12,
            epsrel: 1e-10,
            max_subdivisions: 100,
        };
        let q = integrate(|u| 1.0 + self.w(u.exp_m1()), 0.0, z.ln_1p(), &opts);
        (3.0 * q.value).exp()
    }

    /// True when `f_DE(z) = 1` for all z.
    fn is_cosmological_constant(&self) -> bool {
        false
    }

    /// Named parameters in display order.
    fn parameters(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }

    /// Copy of this model with one parameter replaced.
    fn with_parameter(&self, key: &str, value: f64) -> Result<Arc<dyn DarkEnergy>> {
        let _ = value;
        Err(unknown(key, self.label()))
    }

    /// Reject non-physical parameter values.
    fn validate(&self) -> Result<()> {
        for (name, value) in self.parameters() {
            if !value.is_finite() {
                return Err(CosmologyError::validation(name, format!("must be finite, got {value}")));
            }
        }
        Ok(())
    }

    /// Serializable description, for the built-in models.
    fn spec(&self) -> Option<DarkEnergySpec> {
        None
    }
}

fn unknown(key: &str, model: &str) -> CosmologyError {
    CosmologyError::UnknownParameter {
        key: key.to_string(),
        model: model.to_string(),
    }
}

/// Cosmological constant: `w = -1`, `f_DE = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lambda;

impl DarkEnergy for Lambda {
    fn label(&self) -> &'static str {
        "LambdaCDM"
    }

    fn w(&self, _z: f64) -> f64 {
        -1.0
    }

    fn density_scale(&self, _z: f64) -> f64 {
        1.0
    }

    fn is_cosmological_constant(&self) -> bool {
        true
    }

    fn spec(&self) -> Option<DarkEnergySpec> {
        Some(DarkEnergySpec::Lambda)
    }
}

/// Constant equation of state `w = w0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantW {
    pub w0: f64,
}

impl DarkEnergy for ConstantW {
    fn label(&self) -> &'static str {
        "wCDM"
    }

    fn w(&self, _z: f64) -> f64 {
        self.w0
    }

    fn density_scale(&self, z: f64) -> f64 {
        (1.0 + z).powf(3.0 * (1.0 + self.w0))
    }

    fn is_cosmological_constant(&self) -> bool {
        self.w0 == -1.0
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("w0", self.w0)]
    }

    fn with_parameter(&self, key: &str, value: f64) -> Result<Arc<dyn DarkEnergy>> {
        match key {
            "w0" => Ok(Arc::new(Self { w0: value })),
            _ => Err(unknown(key, self.label())),
        }
    }

    fn spec(&self) -> Option<DarkEnergySpec> {
        Some(DarkEnergySpec::ConstantW { w0: self.w0 })
    }
}

/// Chevallier–Polarski–Linder: `w(z) = w0 + wa z/(1+z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cpl {
    pub w0: f64,
    pub wa: f64,
}

impl DarkEnergy for Cpl {
    fn label(&self) -> &'static str {
        "w0waCDM"
    }

    fn w(&self, z: f64) -> f64 {
        self.w0 + self.wa * z / (1.0 + z)
    }

    fn density_scale(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        zp1.powf(3.0 * (1.0 + self.w0 + self.wa)) * (-3.0 * self.wa * z / zp1).exp()
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("w0", self.w0), ("wa", self.wa)]
    }

    fn with_parameter(&self, key: &str, value: f64) -> Result<Arc<dyn DarkEnergy>> {
        match key {
            "w0" => Ok(Arc::new(Self { w0: value, ..*self })),
            "wa" => Ok(Arc::new(Self { wa: value, ..*self })),
            _ => Err(unknown(key, self.label())),
        }
    }

    fn spec(&self) -> Option<DarkEnergySpec> {
        Some(DarkEnergySpec::Cpl {
            w0: self.w0,
            wa: self.wa,
        })
    }
}

/// CPL re-centred on a pivot redshift: `w(z) = wp + wa (a_p - 1/(1+z))`,
/// `a_p = 1/(1+zp)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotCpl {
    pub wp: f64,
    pub wa: f64,
    pub zp: f64,
}

impl PivotCpl {
    fn pivot_scale_factor(&self) -> f64 {
        1.0 / (1.0 + self.zp)
    }
}

impl DarkEnergy for PivotCpl {
    fn label(&self) -> &'static str {
        "wpwaCDM"
    }

    fn w(&self, z: f64) -> f64 {
        self.wp + self.wa * (self.pivot_scale_factor() - 1.0 / (1.0 + z))
    }

    fn density_scale(&self, z: f64) -> f64 {
        let zp1 = 1.0 + z;
        let ap = self.pivot_scale_factor();
        zp1.powf(3.0 * (1.0 + self.wp + ap * self.wa)) * (-3.0 * self.wa * z / zp1).exp()
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("wp", self.wp), ("wa", self.wa), ("zp", self.zp)]
    }

    fn with_parameter(&self, key: &str, value: f64) -> Result<Arc<dyn DarkEnergy>> {
        match key {
            "wp" => Ok(Arc::new(Self { wp: value, ..*self })),
            "wa" => Ok(Arc::new(Self { wa: value, ..*self })),
            "zp" => Ok(Arc::new(Self { zp: value, ..*self })),
            _ => Err(unknown(key, self.label())),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in self.parameters() {
            if !value.is_finite() {
                return Err(CosmologyError::validation(name, format!("must be finite, got {value}")));
            }
        }
        if self.zp <= -1.0 {
            return Err(CosmologyError::validation(
                "zp",
                format!("pivot redshift must be > -1 (positive scale factor), got {}", self.zp),
            ));
        }
        Ok(())
    }

    fn spec(&self) -> Option<DarkEnergySpec> {
        Some(DarkEnergySpec::PivotCpl {
            wp: self.wp,
            wa: self.wa,
            zp: self.zp,
        })
    }
}

/// Equation of state linear in redshift: `w(z) = w0 + wz z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearW {
    pub w0: f64,
    pub wz: f64,
}

impl DarkEnergy for LinearW {
    fn label(&self) -> &'static str {
        "w0wzCDM"
    }

    fn w(&self, z: f64) -> f64 {
        self.w0 + self.wz * z
    }

    fn density_scale(&self, z: f64) -> f64 {
        (1.0 + z).powf(3.0 * (1.0 + self.w0 - self.wz)) * (3.0 * self.wz * z).exp()
    }

    fn parameters(&self) -> Vec<(&'static str, f64)> {
        vec![("w0", self.w0), ("wz", self.wz)]
    }

    fn with_parameter(&self, key: &str, value: f64) -> Result<Arc<dyn DarkEnergy>> {
        match key {
            "w0" => Ok(Arc::new(Self { w0: value, ..*self })),
            "wz" => Ok(Arc::new(Self { wz: value, ..*self })),
            _ => Err(unknown(key, self.label())),
        }
    }

    fn spec(&self) -> Option<DarkEnergySpec> {
        Some(DarkEnergySpec::LinearW {
            w0: self.w0,
            wz: self.wz,
        })
    }
}

/// Serializable tag for the built-in dark-energy models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DarkEnergySpec {
    Lambda,
    ConstantW { w0: f64 },
    Cpl { w0: f64, wa: f64 },
    PivotCpl { wp: f64, wa: f64, zp: f64 },
    LinearW { w0: f64, wz: f64 },
}

impl DarkEnergySpec {
    pub fn build(self) -> Arc<dyn DarkEnergy> {
        match self {
            DarkEnergySpec::Lambda => Arc::new(Lambda),
            DarkEnergySpec::ConstantW { w0 } => Arc::new(ConstantW { w0 }),
            DarkEnergySpec::Cpl { w0, wa } => Arc::new(Cpl { w0, wa }),
            DarkEnergySpec::PivotCpl { wp, wa, zp } => Arc::new(PivotCpl { wp, wa, zp }),
            DarkEnergySpec::LinearW { w0, wz } => Arc::new(LinearW { w0, wz }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A model that only supplies `w`, exercising the integrated default.
    #[derive(Debug)]
    struct OnlyW<T: DarkEnergy>(T);

    impl<T: DarkEnergy> DarkEnergy for OnlyW<T> {
        fn label(&self) -> &'static str {
            "custom"
        }

        fn w(&self, z: f64) -> f64 {
            self.0.w(z)
        }
    }

    fn assert_default_matches_closed_form<T: DarkEnergy + Clone>(model: T) {
        let integrated = OnlyW(model.clone());
        for z in [0.0, 0.1, 0.5, 1.0, 3.0, 10.0] {
            let closed = model.density_scale(z);
            let numeric = integrated.density_scale(z);
            assert!(
                (numeric / closed - 1.0).abs() < 1e-9,
                "{} z={z}: closed {closed} vs integrated {numeric}",
                model.label()
            );
        }
    }

    #[test]
    fn closed_forms_match_integrated_equation_of_state() {
        assert_default_matches_closed_form(Lambda);
        assert_default_matches_closed_form(ConstantW { w0: -0.8 });
        assert_default_matches_closed_form(Cpl { w0: -0.9, wa: 0.2 });
        assert_default_matches_closed_form(PivotCpl {
            wp: -0.9,
            wa: 0.2,
            zp: 0.5,
        });
        assert_default_matches_closed_form(LinearW { w0: -0.9, wz: 0.1 });
    }

    #[test]
    fn density_scale_is_one_today() {
        let models: Vec<Arc<dyn DarkEnergy>> = vec![
            Arc::new(Lambda),
            Arc::new(ConstantW { w0: -0.7 }),
            Arc::new(Cpl { w0: -1.1, wa: 0.5 }),
            Arc::new(LinearW { w0: -1.0, wz: 0.3 }),
        ];
        for m in models {
            assert!((m.density_scale(0.0) - 1.0).abs() < 1e-15, "{}", m.label());
        }
    }

    #[test]
    fn pivot_cpl_reduces_to_cpl_at_zero_pivot() {
        let pivot = PivotCpl {
            wp: -0.9,
            wa: 0.3,
            zp: 0.0,
        };
        let cpl = Cpl { w0: -0.9, wa: 0.3 };
        for z in [0.0, 0.5, 2.0, 8.0] {
            assert!((pivot.w(z) - cpl.w(z)).abs() < 1e-14);
            assert!((pivot.density_scale(z) / cpl.density_scale(z) - 1.0).abs() < 1e-13);
        }
    }

    #[test]
    fn with_parameter_rejects_foreign_keys() {
        let model = ConstantW { w0: -0.9 };
        let err = model.with_parameter("wa", 0.1).unwrap_err();
        assert_eq!(
            err,
            CosmologyError::UnknownParameter {
                key: "wa".into(),
                model: "wCDM".into()
            }
        );
        let updated = model.with_parameter("w0", -1.2).unwrap();
        assert_eq!(updated.parameters(), vec![("w0", -1.2)]);
    }

    #[test]
    fn pivot_redshift_must_keep_scale_factor_positive() {
        let bad = PivotCpl {
            wp: -1.0,
            wa: 0.0,
            zp: -1.0,
        };
        assert!(matches!(bad.validate(), Err(CosmologyError::Validation { .. })));
    }

    #[test]
    fn spec_round_trips_through_build() {
        let spec = DarkEnergySpec::Cpl { w0: -0.95, wa: 0.1 };
        let model = spec.build();
        assert_eq!(model.spec(), Some(spec));
        assert_eq!(model.label(), "w0waCDM");
    }
}
