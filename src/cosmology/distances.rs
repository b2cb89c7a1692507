//! Distances, volumes and times obtained by integrating `1/E(z)`.
//!
//! All integrals go through `integrate_checked`, which:
//! - surfaces the first error raised inside the integrand (a redshift where
//!   `E(z)²` is negative, for instance) instead of a NaN
//! - turns non-finite results into `Numerical` errors
//! - reports non-converged quadratures as `IntegrationWarning`s
//!
//! Flat ΛCDM without radiation has closed forms for the comoving distance
//! (an incomplete elliptic integral) and the age; those are used instead of
//! quadrature and are checked against it in the tests.

use std::cell::OnceCell;
use std::f64::consts::PI;

use super::expansion::check_redshift;
use super::{Cosmology, ExpansionPath};
use crate::constants::{ARCMIN_RAD, ARCSEC_RAD, GYR_S, MPC_M, SPEED_OF_LIGHT};
use crate::error::{CosmologyError, IntegrationWarning, Result};
use crate::math::{cubic_tail, integrate};

/// Closed-form regimes of flat ΛCDM without radiation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FlatLambda {
    /// Matter and Λ both present.
    Elliptic,
    /// `Om0 = 0`.
    DeSitter,
    /// `Ode0 = 0`.
    EinsteinDeSitter,
}

impl Cosmology {
    fn flat_lambda(&self) -> Option<FlatLambda> {
        if self.path != ExpansionPath::FlatLambdaNoRadiation {
            return None;
        }
        let om0 = self.params.om0;
        if om0 == 0.0 {
            Some(FlatLambda::DeSitter)
        } else if self.ode0 == 0.0 {
            Some(FlatLambda::EinsteinDeSitter)
        } else if om0 > 0.0 && self.ode0 > 0.0 {
            Some(FlatLambda::Elliptic)
        } else {
            None
        }
    }

    /// Integrate `f` over `[a, b]`, where `f` may fail.
    fn integrate_checked<F>(&self, what: &'static str, z: f64, f: F, a: f64, b: f64) -> Result<f64>
    where
        F: Fn(f64) -> Result<f64>,
    {
        let failure = OnceCell::new();
        let q = integrate(
            |x| match f(x) {
                Ok(v) => v,
                Err(err) => {
                    let _ = failure.set(err);
                    f64::NAN
                }
            },
            a,
            b,
            &self.quadrature,
        );
        if let Some(err) = failure.into_inner() {
            return Err(err);
        }
        if !q.value.is_finite() {
            return Err(CosmologyError::numerical(format!(
                "{what} integral is not finite at z={z}"
            )));
        }
        if !q.converged {
            IntegrationWarning {
                what,
                z,
                value: q.value,
                abs_error: q.abs_error,
            }
            .emit();
        }
        Ok(q.value)
    }

    /// `∫ dz/E` between two redshifts (dimensionless).
    fn comoving_integral(&self, z1: f64, z2: f64) -> Result<f64> {
        check_redshift(z1)?;
        check_redshift(z2)?;
        match self.flat_lambda() {
            Some(FlatLambda::DeSitter) => Ok(z2 - z1),
            Some(FlatLambda::EinsteinDeSitter) => {
                Ok(2.0 * ((1.0 + z1).powf(-0.5) - (1.0 + z2).powf(-0.5)))
            }
            Some(FlatLambda::Elliptic) => {
                // t = (1+z) s maps E² onto Ode0 (t³ + 1).
                let s = (self.params.om0 / self.ode0).cbrt();
                let scale = 1.0 / (s * self.ode0.sqrt());
                Ok(scale * (cubic_tail((1.0 + z1) * s) - cubic_tail((1.0 + z2) * s)))
            }
            None => self.integrate_checked(
                "comoving distance",
                z2,
                |z| self.inv_efunc_at(z),
                z1,
                z2,
            ),
        }
    }

    /// Comoving distance `d_C(z)` in Mpc.
    pub(crate) fn comoving_distance_at(&self, z: f64) -> Result<f64> {
        Ok(self.hubble_distance * self.comoving_integral(0.0, z)?)
    }

    /// Comoving distance between `z1` and `z2` in Mpc.
    pub(crate) fn comoving_distance_between(&self, z1: f64, z2: f64) -> Result<f64> {
        Ok(self.hubble_distance * self.comoving_integral(z1, z2)?)
    }

    /// Apply the curvature correction to a line-of-sight comoving distance.
    fn transverse_from_comoving(&self, dc: f64) -> f64 {
        let dh = self.hubble_distance;
        if self.ok0 == 0.0 {
            dc
        } else if self.ok0 > 0.0 {
            let sqrt_ok = self.ok0.sqrt();
            dh / sqrt_ok * (sqrt_ok * dc / dh).sinh()
        } else {
            let sqrt_ok = (-self.ok0).sqrt();
            dh / sqrt_ok * (sqrt_ok * dc / dh).sin()
        }
    }

    /// Transverse comoving distance `d_M(z)` in Mpc.
    pub(crate) fn transverse_comoving_distance_at(&self, z: f64) -> Result<f64> {
        Ok(self.transverse_from_comoving(self.comoving_distance_at(z)?))
    }

    pub(crate) fn luminosity_distance_at(&self, z: f64) -> Result<f64> {
        Ok(self.transverse_comoving_distance_at(z)? * (1.0 + z))
    }

    pub(crate) fn angular_diameter_distance_at(&self, z: f64) -> Result<f64> {
        let dm = self.transverse_comoving_distance_at(z)?;
        if z == -1.0 {
            return Err(CosmologyError::domain("angular diameter distance diverges at z=-1"));
        }
        Ok(dm / (1.0 + z))
    }

    /// Angular diameter distance of an object at `z2` seen from `z1`.
    pub(crate) fn angular_diameter_distance_between(&self, z1: f64, z2: f64) -> Result<f64> {
        if z2 < z1 {
            return Err(CosmologyError::domain(format!(
                "angular diameter distance between z1={z1} and z2={z2} requires z2 >= z1"
            )));
        }
        let dc = self.comoving_distance_between(z1, z2)?;
        Ok(self.transverse_from_comoving(dc) / (1.0 + z2))
    }

    /// Distance modulus `5 log10(d_L / 10 pc)` in magnitudes.
    pub(crate) fn distmod_at(&self, z: f64) -> Result<f64> {
        let dl = self.luminosity_distance_at(z)?;
        if dl <= 0.0 {
            return Err(CosmologyError::domain(format!(
                "distance modulus needs a positive luminosity distance, got {dl} Mpc at z={z}"
            )));
        }
        // 1 Mpc = 1e5 × 10 pc
        Ok(5.0 * dl.log10() + 25.0)
    }

    pub(crate) fn kpc_comoving_per_arcmin_at(&self, z: f64) -> Result<f64> {
        Ok(self.transverse_comoving_distance_at(z)? * 1000.0 * ARCMIN_RAD)
    }

    pub(crate) fn kpc_proper_per_arcmin_at(&self, z: f64) -> Result<f64> {
        Ok(self.angular_diameter_distance_at(z)? * 1000.0 * ARCMIN_RAD)
    }

    pub(crate) fn arcsec_per_kpc_comoving_at(&self, z: f64) -> Result<f64> {
        let kpc = self.transverse_comoving_distance_at(z)? * 1000.0;
        inverse_angle(kpc, z)
    }

    pub(crate) fn arcsec_per_kpc_proper_at(&self, z: f64) -> Result<f64> {
        let kpc = self.angular_diameter_distance_at(z)? * 1000.0;
        inverse_angle(kpc, z)
    }

    /// Comoving volume inside redshift `z` over the full sky, in Mpc³.
    pub(crate) fn comoving_volume_at(&self, z: f64) -> Result<f64> {
        let dm = self.transverse_comoving_distance_at(z)?;
        if self.ok0 == 0.0 {
            return Ok(4.0 / 3.0 * PI * dm * dm * dm);
        }
        let dh = self.hubble_distance;
        let x = dm / dh;
        let sqrt_ok = self.ok0.abs().sqrt();
        let shell = x * (1.0 + self.ok0 * x * x).sqrt();
        let angle = if self.ok0 > 0.0 {
            (sqrt_ok * x).asinh()
        } else {
            (sqrt_ok * x).asin()
        };
        Ok(4.0 * PI * dh * dh * dh / (2.0 * self.ok0) * (shell - angle / sqrt_ok))
    }

    /// `dV_C / dz dΩ` in Mpc³/sr.
    pub(crate) fn differential_comoving_volume_at(&self, z: f64) -> Result<f64> {
        let dm = self.transverse_comoving_distance_at(z)?;
        Ok(self.hubble_distance * dm * dm * self.inv_efunc_at(z)?)
    }

    /// Age of the universe at `z` in Gyr.
    pub(crate) fn age_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        if z == -1.0 {
            return Err(CosmologyError::domain("age is unbounded at z=-1"));
        }
        let zp1 = 1.0 + z;
        match self.flat_lambda() {
            Some(FlatLambda::Elliptic) => {
                let ode0 = self.ode0;
                let om0 = self.params.om0;
                Ok(self.hubble_time * 2.0 / (3.0 * ode0.sqrt())
                    * ((ode0 / om0).sqrt() * zp1.powf(-1.5)).asinh())
            }
            Some(FlatLambda::EinsteinDeSitter) => {
                Ok(2.0 / 3.0 * self.hubble_time * zp1.powf(-1.5))
            }
            Some(FlatLambda::DeSitter) => Err(CosmologyError::numerical(
                "age diverges in a de Sitter universe (no matter or radiation)",
            )),
            None => {
                // Integrate in the scale factor so the domain is finite.
                let a_max = 1.0 / zp1;
                let value = self.integrate_checked(
                    "age",
                    z,
                    |a| Ok(1.0 / (a * self.efunc_at(1.0 / a - 1.0)?)),
                    0.0,
                    a_max,
                )?;
                Ok(self.hubble_time * value)
            }
        }
    }

    /// Lookback time to `z` in Gyr.
    pub(crate) fn lookback_time_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        if self.flat_lambda().is_some_and(|r| r != FlatLambda::DeSitter) {
            return Ok(self.age_at(0.0)? - self.age_at(z)?);
        }
        let value = self.integrate_checked(
            "lookback time",
            z,
            |x| Ok(self.inv_efunc_at(x)? / (1.0 + x)),
            0.0,
            z,
        )?;
        Ok(self.hubble_time * value)
    }

    /// Light-travel distance to `z` in Mpc.
    pub(crate) fn lookback_distance_at(&self, z: f64) -> Result<f64> {
        Ok(self.lookback_time_at(z)? * GYR_S * SPEED_OF_LIGHT / MPC_M)
    }

    /// Absorption distance `X(z) = ∫ (1+z)²/E dz` (dimensionless).
    pub(crate) fn absorption_distance_at(&self, z: f64) -> Result<f64> {
        check_redshift(z)?;
        self.integrate_checked(
            "absorption distance",
            z,
            |x| Ok((1.0 + x) * (1.0 + x) * self.inv_efunc_at(x)?),
            0.0,
            z,
        )
    }
}

fn inverse_angle(kpc: f64, z: f64) -> Result<f64> {
    if kpc == 0.0 {
        return Err(CosmologyError::domain(format!(
            "angular scale is undefined where the distance vanishes (z={z})"
        )));
    }
    Ok(1.0 / (kpc * ARCSEC_RAD))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ParameterSet;
    use crate::math::QuadratureOptions;
    use crate::models::Lambda;

    fn tight() -> QuadratureOptions {
        QuadratureOptions {
            epsabs: 1e-13,
            epsrel: 1e-12,
            max_subdivisions: 200,
        }
    }

    /// Same parameters, pushed off the elliptic closed form by a 1e-15
    /// curvature residual so distances come from quadrature on the
    /// radiation-free polynomial `E(z)`.
    fn numeric_twin(om0: f64, ode0: f64) -> Cosmology {
        let c = Cosmology::lambda_cdm(70.0, om0, ode0 - 1e-15).unwrap();
        c.with_quadrature(tight()).unwrap()
    }

    #[test]
    fn flat_lambda_reference_values() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let age = c.age_at(0.0).unwrap();
        assert!((age - 13.4669).abs() < 0.01, "age {age}");
        let dc = c.comoving_distance_at(1.0).unwrap();
        assert!((dc - 3303.83).abs() < 5.0, "dc {dc}");
    }

    #[test]
    fn elliptic_distance_matches_quadrature() {
        let analytic = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let numeric = numeric_twin(0.3, 0.7);
        assert_ne!(numeric.expansion_path(), ExpansionPath::FlatLambdaNoRadiation);
        for z in [0.01, 0.5, 1.0, 3.0, 10.0, 1000.0] {
            let a = analytic.comoving_distance_at(z).unwrap();
            let n = numeric.comoving_distance_at(z).unwrap();
            assert!((a / n - 1.0).abs() < 1e-7, "z={z}: {a} vs {n}");
        }
    }

    #[test]
    fn analytic_age_matches_quadrature() {
        let analytic = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let numeric = numeric_twin(0.3, 0.7);
        for z in [0.0, 0.5, 2.0, 20.0] {
            let a = analytic.age_at(z).unwrap();
            let n = numeric.age_at(z).unwrap();
            assert!((a / n - 1.0).abs() < 1e-7, "z={z}: {a} vs {n}");
        }
    }

    #[test]
    fn degenerate_flat_limits() {
        let de_sitter = Cosmology::flat_lambda_cdm(70.0, 0.0).unwrap();
        let dh = de_sitter.hubble_distance();
        assert!((de_sitter.comoving_distance_at(2.0).unwrap() - 2.0 * dh).abs() < 1e-9);
        assert!(matches!(
            de_sitter.age_at(0.0).unwrap_err(),
            CosmologyError::Numerical { .. }
        ));

        let eds = Cosmology::flat_lambda_cdm(70.0, 1.0).unwrap();
        let expected = 2.0 * eds.hubble_distance() * (1.0 - 3.0_f64.powf(-0.5));
        assert!((eds.comoving_distance_at(2.0).unwrap() - expected).abs() < 1e-9);
        let age = eds.age_at(0.0).unwrap();
        assert!((age - 2.0 / 3.0 * eds.hubble_time()).abs() < 1e-12);
    }

    #[test]
    fn lookback_plus_age_is_age_today() {
        let cases = [
            Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap(),
            Cosmology::lambda_cdm(70.0, 0.3, 0.6).unwrap(),
            Cosmology::flat_w0wa_cdm(68.0, 0.31, -0.9, 0.2).unwrap(),
        ];
        for c in &cases {
            let age0 = c.age_at(0.0).unwrap();
            for z in [0.3, 1.0, 5.0] {
                let sum = c.lookback_time_at(z).unwrap() + c.age_at(z).unwrap();
                assert!((sum - age0).abs() < 1e-6, "{} z={z}", c.class_name());
            }
        }
    }

    #[test]
    fn curvature_corrections() {
        let open = Cosmology::lambda_cdm(70.0, 0.3, 0.5).unwrap();
        let closed = Cosmology::lambda_cdm(70.0, 0.3, 0.9).unwrap();
        for c in [&open, &closed] {
            let dc = c.comoving_distance_at(1.0).unwrap();
            let dm = c.transverse_comoving_distance_at(1.0).unwrap();
            let dh = c.hubble_distance();
            let k = c.ok0().abs().sqrt();
            let expected = if c.ok0() > 0.0 {
                dh / k * (k * dc / dh).sinh()
            } else {
                dh / k * (k * dc / dh).sin()
            };
            assert!((dm - expected).abs() < 1e-9);
        }
        assert!(
            open.transverse_comoving_distance_at(1.0).unwrap()
                > open.comoving_distance_at(1.0).unwrap()
        );
        assert!(
            closed.transverse_comoving_distance_at(1.0).unwrap()
                < closed.comoving_distance_at(1.0).unwrap()
        );
    }

    #[test]
    fn distance_duality() {
        let c = Cosmology::lambda_cdm(70.0, 0.3, 0.6).unwrap();
        for z in [0.1, 1.0, 4.0] {
            let dl = c.luminosity_distance_at(z).unwrap();
            let da = c.angular_diameter_distance_at(z).unwrap();
            assert!((dl / (da * (1.0 + z).powi(2)) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn angular_diameter_between_redshifts() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let from_zero = c.angular_diameter_distance_between(0.0, 2.0).unwrap();
        assert!((from_zero - c.angular_diameter_distance_at(2.0).unwrap()).abs() < 1e-9);
        assert!(c.angular_diameter_distance_between(0.5, 2.0).unwrap() > 0.0);
        assert!(c.angular_diameter_distance_between(2.0, 0.5).unwrap_err().is_domain());
    }

    #[test]
    fn distmod_needs_positive_distance() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        assert!(c.distmod_at(0.0).unwrap_err().is_domain());
        let dl = c.luminosity_distance_at(0.5).unwrap();
        let mu = c.distmod_at(0.5).unwrap();
        assert!((mu - 5.0 * (dl * 1e6 / 10.0).log10()).abs() < 1e-12);
    }

    #[test]
    fn flat_volume_is_a_sphere() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let dc = c.comoving_distance_at(1.0).unwrap();
        let v = c.comoving_volume_at(1.0).unwrap();
        assert!((v / (4.0 / 3.0 * PI * dc.powi(3)) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn curved_volume_matches_shell_integral() {
        let c = Cosmology::lambda_cdm(70.0, 0.3, 0.5).unwrap().with_quadrature(tight()).unwrap();
        let shells = integrate(
            |z| 4.0 * PI * c.differential_comoving_volume_at(z).unwrap(),
            0.0,
            2.0,
            &tight(),
        );
        let v = c.comoving_volume_at(2.0).unwrap();
        assert!((shells.value / v - 1.0).abs() < 1e-8);
    }

    #[test]
    fn angular_scales_are_reciprocal() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let kpc_per_arcmin = c.kpc_proper_per_arcmin_at(1.0).unwrap();
        let arcsec_per_kpc = c.arcsec_per_kpc_proper_at(1.0).unwrap();
        assert!((kpc_per_arcmin * arcsec_per_kpc - 60.0).abs() < 1e-9);
        assert!(c.arcsec_per_kpc_comoving_at(0.0).unwrap_err().is_domain());
    }

    #[test]
    fn lookback_distance_uses_light_travel() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let t = c.lookback_time_at(1.0).unwrap();
        let d = c.lookback_distance_at(1.0).unwrap();
        assert!((d / t - 306.601_394).abs() < 1e-3);
    }

    #[test]
    fn absorption_distance_exceeds_comoving_integral() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let x = c.absorption_distance_at(2.0).unwrap();
        let dc = c.comoving_distance_at(2.0).unwrap() / c.hubble_distance();
        assert!(x > dc);
    }

    #[test]
    fn integrand_errors_surface_unchanged() {
        let c = Cosmology::lambda_cdm(70.0, 0.0, 2.0).unwrap();
        let err = c.comoving_distance_at(5.0).unwrap_err();
        assert!(err.is_domain(), "{err}");
    }

    #[test]
    fn radiation_lowers_the_age() {
        let cold = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        let warm = Cosmology::new(
            ParameterSet::flat(70.0, 0.3).with_tcmb0(2.725),
            Arc::new(Lambda),
        )
        .unwrap();
        assert!(warm.age_at(0.0).unwrap() < cold.age_at(0.0).unwrap());
    }
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use crate::cosmology::Cosmology;
    use crate::domain::ParameterSet;
    use crate::math::QuadratureOptions;
    use crate::models::DarkEnergySpec;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn efunc_is_one_today(
            h0 in 50.0_f64..90.0,
            om0 in 0.05_f64..0.95,
            ode0 in 0.0_f64..1.0,
            radiation in any::<bool>(),
        ) {
            let tcmb0 = if radiation { 2.7255 } else { 0.0 };
            let c = Cosmology::from_spec(
                ParameterSet::curved(h0, om0, ode0).with_tcmb0(tcmb0).with_m_nu(vec![0.0, 0.0, 0.06]),
                DarkEnergySpec::Cpl { w0: -0.9, wa: 0.1 },
            ).unwrap();
            prop_assert_eq!(c.efunc_at(0.0).unwrap(), 1.0);
            prop_assert_eq!(c.h_at(0.0).unwrap(), h0);
        }

        // Covers every expansion path: the closed forms, the radiation-free
        // polynomial, and the generic integrand with massive neutrinos.
        #[test]
        fn comoving_distance_increases(
            om0 in 0.1_f64..0.9,
            ode0 in 0.0_f64..0.9,
            flat in any::<bool>(),
            radiation in any::<bool>(),
            massive_nu in any::<bool>(),
            evolving in any::<bool>(),
            z1 in 0.0_f64..20.0,
            dz in 0.0_f64..20.0,
        ) {
            let params = if flat {
                ParameterSet::flat(70.0, om0)
            } else {
                ParameterSet::curved(70.0, om0, ode0)
            };
            let m_nu = if massive_nu { vec![0.0, 0.0, 0.06] } else { vec![0.0] };
            let params = params.with_tcmb0(if radiation { 2.7255 } else { 0.0 }).with_m_nu(m_nu);
            let spec = if evolving {
                DarkEnergySpec::Cpl { w0: -0.9, wa: 0.1 }
            } else {
                DarkEnergySpec::Lambda
            };
            let c = Cosmology::from_spec(params, spec)
                .unwrap()
                .with_quadrature(QuadratureOptions {
                    epsabs: 0.0,
                    epsrel: 1e-12,
                    max_subdivisions: 200,
                })
                .unwrap();
            let near = c.comoving_distance_at(z1).unwrap();
            let far = c.comoving_distance_at(z1 + dz).unwrap();
            prop_assert!(
                near <= far * (1.0 + 1e-10) + 1e-9,
                "{:?}: dc({z1}) = {near} > dc({}) = {far}",
                c.expansion_path(),
                z1 + dz
            );
        }

        #[test]
        fn distance_duality(om0 in 0.1_f64..0.5, ode0 in 0.3_f64..0.9, z in 0.01_f64..5.0) {
            let c = Cosmology::lambda_cdm(70.0, om0, ode0).unwrap();
            let dl = c.luminosity_distance_at(z).unwrap();
            let da = c.angular_diameter_distance_at(z).unwrap();
            let ratio = dl / (da * (1.0 + z) * (1.0 + z));
            prop_assert!((ratio - 1.0).abs() < 1e-12, "dL/(dA (1+z)^2) = {ratio}");
        }
    }

    #[test]
    fn subdivision_bound_returns_best_effort_value() {
        let converged = Cosmology::flat_w0wa_cdm(70.0, 0.3, -0.9, 0.2).unwrap();
        let starved = converged
            .clone()
            .with_quadrature(QuadratureOptions {
                epsabs: 0.0,
                epsrel: 1e-15,
                max_subdivisions: 1,
            })
            .unwrap();
        for z in [0.5, 3.0] {
            let reference = converged.comoving_distance_at(z).unwrap();
            let rough = starved.comoving_distance_at(z).unwrap();
            assert!(rough.is_finite());
            assert!((rough / reference - 1.0).abs() < 1e-6, "z={z}: {rough} vs {reference}");
        }
    }
}
