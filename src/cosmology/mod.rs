//! The FLRW cosmology value.
//!
//! A `Cosmology` is a validated `ParameterSet` plus a dark-energy model.
//! Everything derived from them (radiation densities, the curvature or
//! dark-energy closure, Hubble scales, the expansion fast path) is computed
//! once in `new` and never changes; "modifying" a cosmology means building
//! a new one through `clone_with`.
//!
//! The accessors are spread over submodules:
//! - `expansion`: `E(z)` and density fractions
//! - `distances`: integrated distances, volumes and times
//! - `broadcast`: the shape-preserving public accessors

use std::sync::Arc;

use crate::constants::{GYR_S, MPC_M, SPEED_OF_LIGHT_KM_S};
use crate::domain::{Overrides, ParameterSet};
use crate::error::{CosmologyError, Result};
use crate::math::QuadratureOptions;
use crate::models::{
    ConstantW, Cpl, DarkEnergy, DarkEnergySpec, Lambda, LinearW, NeutrinoModel, PivotCpl,
    critical_density0,
};

pub mod broadcast;
pub mod display;
pub mod distances;
pub mod expansion;

pub use broadcast::{Redshifts, broadcast};
pub use display::significant;

/// How `E(z)²` is evaluated. Chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionPath {
    /// `Om0 (1+z)³ + Ode0`.
    FlatLambdaNoRadiation,
    /// `(1+z)² (Om0 (1+z) + Ok0) + Ode0`.
    LambdaNoRadiation,
    /// Cosmological constant with photons and massless neutrinos only.
    LambdaMasslessRadiation,
    /// Full composition with the dark-energy model's `f_DE(z)`.
    Generic,
}

/// An immutable FLRW universe.
#[derive(Debug, Clone)]
pub struct Cosmology {
    params: ParameterSet,
    dark_energy: Arc<dyn DarkEnergy>,
    neutrinos: NeutrinoModel,
    ode0: f64,
    ok0: f64,
    path: ExpansionPath,
    quadrature: QuadratureOptions,
    hubble_time: f64,
    hubble_distance: f64,
    critical_density0: f64,
}

impl Cosmology {
    /// Validate `params` and `dark_energy` and derive the closure densities.
    pub fn new(params: ParameterSet, dark_energy: Arc<dyn DarkEnergy>) -> Result<Self> {
        params.validate()?;
        dark_energy.validate()?;

        let neutrinos = NeutrinoModel::new(params.h0, params.tcmb0, params.neff, &params.m_nu);
        let radiation = neutrinos.ogamma0() + neutrinos.onu0();
        let (ode0, ok0) = match params.ode0 {
            None => (1.0 - params.om0 - radiation, 0.0),
            Some(ode0) => (ode0, 1.0 - params.om0 - ode0 - radiation),
        };

        let path = if !dark_energy.is_cosmological_constant() {
            ExpansionPath::Generic
        } else if params.tcmb0 == 0.0 {
            if ok0 == 0.0 {
                ExpansionPath::FlatLambdaNoRadiation
            } else {
                ExpansionPath::LambdaNoRadiation
            }
        } else if !neutrinos.has_massive() {
            ExpansionPath::LambdaMasslessRadiation
        } else {
            ExpansionPath::Generic
        };

        let h0_per_s = params.h0 * 1000.0 / MPC_M;
        let cosmo = Self {
            hubble_time: 1.0 / h0_per_s / GYR_S,
            hubble_distance: SPEED_OF_LIGHT_KM_S / params.h0,
            critical_density0: critical_density0(params.h0),
            params,
            dark_energy,
            neutrinos,
            ode0,
            ok0,
            path,
            quadrature: QuadratureOptions::default(),
        };
        tracing::debug!(
            class = %cosmo.class_name(),
            path = ?cosmo.path,
            ode0 = cosmo.ode0,
            ok0 = cosmo.ok0,
            "built cosmology"
        );
        Ok(cosmo)
    }

    /// Build from a serializable dark-energy tag.
    pub fn from_spec(params: ParameterSet, spec: DarkEnergySpec) -> Result<Self> {
        Self::new(params, spec.build())
    }

    pub fn flat_lambda_cdm(h0: f64, om0: f64) -> Result<Self> {
        Self::new(ParameterSet::flat(h0, om0), Arc::new(Lambda))
    }

    pub fn lambda_cdm(h0: f64, om0: f64, ode0: f64) -> Result<Self> {
        Self::new(ParameterSet::curved(h0, om0, ode0), Arc::new(Lambda))
    }

    pub fn flat_w_cdm(h0: f64, om0: f64, w0: f64) -> Result<Self> {
        Self::new(ParameterSet::flat(h0, om0), Arc::new(ConstantW { w0 }))
    }

    pub fn w_cdm(h0: f64, om0: f64, ode0: f64, w0: f64) -> Result<Self> {
        Self::new(ParameterSet::curved(h0, om0, ode0), Arc::new(ConstantW { w0 }))
    }

    pub fn flat_w0wa_cdm(h0: f64, om0: f64, w0: f64, wa: f64) -> Result<Self> {
        Self::new(ParameterSet::flat(h0, om0), Arc::new(Cpl { w0, wa }))
    }

    pub fn w0wa_cdm(h0: f64, om0: f64, ode0: f64, w0: f64, wa: f64) -> Result<Self> {
        Self::new(ParameterSet::curved(h0, om0, ode0), Arc::new(Cpl { w0, wa }))
    }

    pub fn flat_wpwa_cdm(h0: f64, om0: f64, wp: f64, wa: f64, zp: f64) -> Result<Self> {
        Self::new(ParameterSet::flat(h0, om0), Arc::new(PivotCpl { wp, wa, zp }))
    }

    pub fn wpwa_cdm(h0: f64, om0: f64, ode0: f64, wp: f64, wa: f64, zp: f64) -> Result<Self> {
        Self::new(ParameterSet::curved(h0, om0, ode0), Arc::new(PivotCpl { wp, wa, zp }))
    }

    pub fn flat_w0wz_cdm(h0: f64, om0: f64, w0: f64, wz: f64) -> Result<Self> {
        Self::new(ParameterSet::flat(h0, om0), Arc::new(LinearW { w0, wz }))
    }

    pub fn w0wz_cdm(h0: f64, om0: f64, ode0: f64, w0: f64, wz: f64) -> Result<Self> {
        Self::new(ParameterSet::curved(h0, om0, ode0), Arc::new(LinearW { w0, wz }))
    }

    /// Replace the integration tolerances used by every integrated accessor.
    ///
    /// Rejects non-finite or non-positive tolerances and a zero subdivision
    /// bound with a `Validation` error.
    pub fn with_quadrature(mut self, quadrature: QuadratureOptions) -> Result<Self> {
        quadrature.validate()?;
        self.quadrature = quadrature;
        Ok(self)
    }

    /// A new cosmology of the same class with some parameters replaced.
    ///
    /// Keys not understood by either the parameter set or the dark-energy
    /// model are rejected with `UnknownParameter`; the flat/curved topology
    /// never changes.
    pub fn clone_with(&self, overrides: &Overrides) -> Result<Self> {
        let mut params = self.params.clone();
        let mut dark_energy = Arc::clone(&self.dark_energy);

        for (key, value) in &overrides.values {
            if params.apply(key, *value) {
                continue;
            }
            dark_energy = dark_energy.with_parameter(key, *value).map_err(|err| match err {
                CosmologyError::UnknownParameter { key, .. } => CosmologyError::UnknownParameter {
                    key,
                    model: self.class_name(),
                },
                other => other,
            })?;
        }
        if let Some(m_nu) = &overrides.m_nu {
            params.m_nu = m_nu.clone();
        }
        if let Some(name) = &overrides.name {
            params.name = name.clone();
        }
        if let Some(ob0) = overrides.ob0 {
            params.ob0 = ob0;
        }

        Self::new(params, dark_energy)?.with_quadrature(self.quadrature)
    }

    /// `Flat` + the dark-energy label for flat universes, the bare label otherwise.
    pub fn class_name(&self) -> String {
        if self.is_flat() {
            format!("Flat{}", self.dark_energy.label())
        } else {
            self.dark_energy.label().to_string()
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn name(&self) -> Option<&str> {
        self.params.name.as_deref()
    }

    pub fn dark_energy(&self) -> &dyn DarkEnergy {
        self.dark_energy.as_ref()
    }

    pub fn is_flat(&self) -> bool {
        self.params.is_flat()
    }

    pub fn expansion_path(&self) -> ExpansionPath {
        self.path
    }

    pub fn quadrature(&self) -> &QuadratureOptions {
        &self.quadrature
    }

    pub fn h0(&self) -> f64 {
        self.params.h0
    }

    pub fn om0(&self) -> f64 {
        self.params.om0
    }

    pub fn ode0(&self) -> f64 {
        self.ode0
    }

    pub fn ok0(&self) -> f64 {
        self.ok0
    }

    pub fn ogamma0(&self) -> f64 {
        self.neutrinos.ogamma0()
    }

    pub fn onu0(&self) -> f64 {
        self.neutrinos.onu0()
    }

    pub fn ob0(&self) -> Option<f64> {
        self.params.ob0
    }

    /// Dark-matter density today, `Om0 - Ob0`.
    pub fn odm0(&self) -> Result<f64> {
        Ok(self.params.om0 - self.require_ob0()?)
    }

    pub fn tcmb0(&self) -> f64 {
        self.params.tcmb0
    }

    pub fn tnu0(&self) -> f64 {
        self.neutrinos.tnu0()
    }

    pub fn neff(&self) -> f64 {
        self.params.neff
    }

    pub fn m_nu(&self) -> &[f64] {
        &self.params.m_nu
    }

    pub fn has_massive_nu(&self) -> bool {
        self.neutrinos.has_massive()
    }

    /// `1/H0` in Gyr.
    pub fn hubble_time(&self) -> f64 {
        self.hubble_time
    }

    /// `c/H0` in Mpc.
    pub fn hubble_distance(&self) -> f64 {
        self.hubble_distance
    }

    /// Critical density today in g/cm³.
    pub fn critical_density0(&self) -> f64 {
        self.critical_density0
    }

    pub(crate) fn neutrinos(&self) -> &NeutrinoModel {
        &self.neutrinos
    }

    pub(crate) fn require_ob0(&self) -> Result<f64> {
        self.params.ob0.ok_or_else(|| {
            CosmologyError::domain(format!(
                "baryonic density (Ob0) is not set for {}; dark-matter and baryon fractions are undefined",
                self.class_name()
            ))
        })
    }
}

impl PartialEq for Cosmology {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.dark_energy.label() == other.dark_energy.label()
            && self.dark_energy.parameters() == other.dark_energy.parameters()
            && self.quadrature == other.quadrature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_closure_absorbs_radiation() {
        let params = ParameterSet::flat(67.66, 0.30966)
            .with_tcmb0(2.7255)
            .with_neff(3.046)
            .with_m_nu(vec![0.0, 0.0, 0.06]);
        let c = Cosmology::new(params, Arc::new(Lambda)).unwrap();
        let total = c.om0() + c.ode0() + c.ogamma0() + c.onu0();
        assert!((total - 1.0).abs() < 1e-15);
        assert_eq!(c.ok0(), 0.0);
        assert_eq!(c.expansion_path(), ExpansionPath::Generic);
    }

    #[test]
    fn invalid_quadrature_options_are_rejected() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let bad = [
            QuadratureOptions { epsrel: 0.0, ..QuadratureOptions::default() },
            QuadratureOptions { epsabs: f64::NAN, ..QuadratureOptions::default() },
            QuadratureOptions { max_subdivisions: 0, ..QuadratureOptions::default() },
        ];
        for opts in bad {
            let err = c.clone().with_quadrature(opts).unwrap_err();
            assert!(matches!(err, CosmologyError::Validation { .. }), "{opts:?}: {err:?}");
        }
        let loose = QuadratureOptions { epsrel: 1e-4, ..QuadratureOptions::default() };
        assert!(c.with_quadrature(loose).is_ok());
    }

    #[test]
    fn curved_closure_goes_to_curvature() {
        let c = Cosmology::lambda_cdm(70.0, 0.3, 0.5).unwrap();
        assert!((c.ok0() - 0.2).abs() < 1e-15);
        assert_eq!(c.expansion_path(), ExpansionPath::LambdaNoRadiation);
    }

    #[test]
    fn fast_path_selection() {
        let flat = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        assert_eq!(flat.expansion_path(), ExpansionPath::FlatLambdaNoRadiation);

        let massless = Cosmology::new(
            ParameterSet::flat(70.0, 0.3).with_tcmb0(2.725),
            Arc::new(Lambda),
        )
        .unwrap();
        assert_eq!(massless.expansion_path(), ExpansionPath::LambdaMasslessRadiation);

        let w = Cosmology::flat_w_cdm(70.0, 0.3, -0.9).unwrap();
        assert_eq!(w.expansion_path(), ExpansionPath::Generic);
    }

    #[test]
    fn class_names() {
        assert_eq!(Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap().class_name(), "FlatLambdaCDM");
        assert_eq!(Cosmology::w_cdm(70.0, 0.3, 0.7, -0.9).unwrap().class_name(), "wCDM");
        assert_eq!(
            Cosmology::flat_w0wa_cdm(70.0, 0.3, -0.9, 0.1).unwrap().class_name(),
            "Flatw0waCDM"
        );
    }

    #[test]
    fn hubble_scales() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        assert!((c.hubble_distance() - 4282.749_400).abs() < 1e-6);
        assert!((c.hubble_time() - 13.968_460_309_725_56).abs() < 1e-9);
    }

    #[test]
    fn clone_without_overrides_is_equal() {
        let c = Cosmology::w0wa_cdm(70.0, 0.3, 0.6, -0.9, 0.2).unwrap();
        assert_eq!(c.clone_with(&Overrides::new()).unwrap(), c);
    }

    #[test]
    fn clone_with_replaces_fields() {
        let c = Cosmology::flat_w_cdm(70.0, 0.3, -0.9).unwrap();
        let changed = c
            .clone_with(
                &Overrides::new()
                    .set("H0", 68.0)
                    .set("w0", -1.1)
                    .name(Some("mine".into()))
                    .ob0(Some(0.05)),
            )
            .unwrap();
        assert_eq!(changed.h0(), 68.0);
        assert_eq!(changed.dark_energy().parameters(), vec![("w0", -1.1)]);
        assert_eq!(changed.name(), Some("mine"));
        assert_eq!(changed.ob0(), Some(0.05));
        assert!(changed.is_flat());
        assert_eq!(c.h0(), 70.0);
    }

    #[test]
    fn clone_with_rejects_unknown_keys() {
        let flat = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        for key in ["Ok0", "Ode0", "wa"] {
            let err = flat.clone_with(&Overrides::new().set(key, 0.1)).unwrap_err();
            assert_eq!(
                err,
                CosmologyError::UnknownParameter {
                    key: key.into(),
                    model: "FlatLambdaCDM".into()
                }
            );
        }
        let w = Cosmology::w_cdm(70.0, 0.3, 0.7, -1.0).unwrap();
        let err = w.clone_with(&Overrides::new().set("wa", 0.1)).unwrap_err();
        assert!(matches!(err, CosmologyError::UnknownParameter { .. }));
    }

    #[test]
    fn clone_with_validates_values() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let err = c.clone_with(&Overrides::new().set("H0", -5.0)).unwrap_err();
        assert!(matches!(err, CosmologyError::Validation { field, .. } if field == "H0"));
    }

    #[test]
    fn odm0_requires_baryons() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let err = c.odm0().unwrap_err();
        assert!(err.to_string().contains("baryonic density"));

        let with_b = c.clone_with(&Overrides::new().set("Ob0", 0.05)).unwrap();
        assert!((with_b.odm0().unwrap() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn cosmology_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Cosmology>();
    }
}
