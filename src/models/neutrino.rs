//! Photon and relic-neutrino radiation densities.
//!
//! Photons scale as `(1+z)⁴`. Neutrinos are tracked relative to photons:
//! massless species contribute a constant `7/8 (4/11)^(4/3)` each, massive
//! ones are weighted by the tabulated `F(y)` so they interpolate smoothly
//! from radiation-like to matter-like behaviour as the universe cools.

use crate::constants::{
    BOLTZMANN_EV, GRAVITATIONAL, MPC_M, NU_ENERGY_PER_SPECIES, TNU_OVER_TCMB,
    radiation_density_constant,
};
use crate::models::neutrino_table::density_ratio;

/// Critical density today [g cm⁻³] for `h0` in km/s/Mpc.
pub fn critical_density0(h0: f64) -> f64 {
    let h0_si = h0 * 1000.0 / MPC_M;
    // kg m^-3 -> g cm^-3
    3.0 * h0_si * h0_si / (8.0 * std::f64::consts::PI * GRAVITATIONAL) * 1e-3
}

/// Radiation content derived once from `(Tcmb0, Neff, m_nu)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NeutrinoModel {
    tcmb0: f64,
    neff: f64,
    /// `floor(Neff)`.
    species: usize,
    massless: usize,
    /// `m c² / (k_B T_nu0)` for each massive species.
    massive_y0: Vec<f64>,
    ogamma0: f64,
    onu0: f64,
}

impl NeutrinoModel {
    /// Build the model. Inputs are assumed validated; `m_nu` holds either a
    /// single mass shared by every species or one mass per species.
    pub fn new(h0: f64, tcmb0: f64, neff: f64, m_nu: &[f64]) -> Self {
        let species = if neff >= 1.0 { neff.floor() as usize } else { 0 };

        let ogamma0 = if tcmb0 > 0.0 {
            radiation_density_constant() * tcmb0.powi(4) / critical_density0(h0)
        } else {
            0.0
        };

        let mut massive_y0 = Vec::new();
        if tcmb0 > 0.0 && species > 0 {
            let tnu0 = TNU_OVER_TCMB * tcmb0;
            let masses: Vec<f64> = match m_nu {
                [single] => vec![*single; species],
                many => many.to_vec(),
            };
            massive_y0 = masses
                .into_iter()
                .filter(|&m| m > 0.0)
                .map(|m| m / (BOLTZMANN_EV * tnu0))
                .collect();
        }
        let massless = species.saturating_sub(massive_y0.len());

        let mut model = Self {
            tcmb0,
            neff,
            species,
            massless,
            massive_y0,
            ogamma0,
            onu0: 0.0,
        };
        model.onu0 = model.ogamma0 * model.relative_density(0.0);
        model
    }

    /// True when at least one species carries mass and radiation is enabled.
    pub fn has_massive(&self) -> bool {
        !self.massive_y0.is_empty()
    }

    pub fn species(&self) -> usize {
        self.species
    }

    pub fn massless_species(&self) -> usize {
        self.massless
    }

    pub fn ogamma0(&self) -> f64 {
        self.ogamma0
    }

    pub fn onu0(&self) -> f64 {
        self.onu0
    }

    /// Neutrino temperature today [K].
    pub fn tnu0(&self) -> f64 {
        TNU_OVER_TCMB * self.tcmb0
    }

    /// `Onu(z) / Ogamma(z)`.
    pub fn relative_density(&self, z: f64) -> f64 {
        if self.tcmb0 == 0.0 || self.neff == 0.0 {
            return 0.0;
        }
        if !self.has_massive() {
            return NU_ENERGY_PER_SPECIES * self.neff;
        }
        let zp1 = 1.0 + z;
        let massive: f64 = self.massive_y0.iter().map(|y0| density_ratio(y0 / zp1)).sum();
        let per_species = self.neff / self.species as f64;
        NU_ENERGY_PER_SPECIES * per_species * (massive + self.massless as f64)
    }

    /// `Ogamma(z) = Ogamma0 (1+z)⁴` in units of today's critical density.
    pub fn ogamma_scaled(&self, z: f64) -> f64 {
        self.ogamma0 * (1.0 + z).powi(4)
    }

    /// `Onu(z)` in units of today's critical density.
    ///
    /// Vanishes at `z = -1`, where the massive species' `(1+z)³` dust limit
    /// and the massless `(1+z)⁴` term both reach zero.
    pub fn onu_scaled(&self, z: f64) -> f64 {
        if 1.0 + z == 0.0 {
            return 0.0;
        }
        self.ogamma_scaled(z) * self.relative_density(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{QuadratureOptions, integrate};

    fn planck18_like() -> NeutrinoModel {
        NeutrinoModel::new(67.66, 2.7255, 3.046, &[0.0, 0.0, 0.06])
    }

    #[test]
    fn density_vanishes_at_infinite_expansion() {
        let nu = planck18_like();
        assert_eq!(nu.onu_scaled(-1.0), 0.0);
        let near = nu.onu_scaled(-1.0 + 1e-6);
        assert!(near.is_finite() && near >= 0.0 && near < 1e-15, "{near}");
    }

    fn direct_f(y: f64) -> f64 {
        let opts = QuadratureOptions {
            epsabs: 1e-13,
            epsrel: 1e-11,
            max_subdivisions: 200,
        };
        let norm = 120.0 / (7.0 * std::f64::consts::PI.powi(4));
        let q = integrate(
            |x| x * x * (x * x + y * y).sqrt() / (x.exp() + 1.0),
            0.0,
            80.0,
            &opts,
        );
        norm * q.value
    }

    #[test]
    fn critical_density_matches_reference() {
        let rho = critical_density0(67.66);
        assert!((rho / 8.598_814_256_622_896e-30 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn planck18_radiation_densities() {
        let nu = planck18_like();
        assert!((nu.ogamma0() / 5.402_015_137_139_35e-5 - 1.0).abs() < 1e-10);
        assert!((nu.onu0() / 1.439_709_251_273_479_4e-3 - 1.0).abs() < 1e-5);
        assert!(nu.has_massive());
        assert_eq!(nu.species(), 3);
        assert_eq!(nu.massless_species(), 2);
    }

    #[test]
    fn table_agrees_with_direct_momentum_integral() {
        let nu = planck18_like();
        let y0 = 0.06 / (BOLTZMANN_EV * nu.tnu0());
        for z in [0.0, 0.5, 3.0, 30.0, 300.0, 3000.0] {
            let expected =
                NU_ENERGY_PER_SPECIES * (3.046 / 3.0) * (direct_f(y0 / (1.0 + z)) + 2.0);
            let got = nu.relative_density(z);
            assert!((got / expected - 1.0).abs() < 1e-4, "z={z}: {got} vs {expected}");
        }
    }

    #[test]
    fn massless_neutrinos_track_photons() {
        let nu = NeutrinoModel::new(70.0, 2.725, 3.04, &[0.0]);
        assert!(!nu.has_massive());
        let ratio = NU_ENERGY_PER_SPECIES * 3.04;
        for z in [0.0, 1.0, 1e3] {
            assert!((nu.relative_density(z) - ratio).abs() < 1e-15);
        }
        assert!((nu.onu0() / nu.ogamma0() - ratio).abs() < 1e-14);
    }

    #[test]
    fn single_mass_is_shared_by_every_species() {
        let shared = NeutrinoModel::new(70.0, 2.725, 3.0, &[0.1]);
        let listed = NeutrinoModel::new(70.0, 2.725, 3.0, &[0.1, 0.1, 0.1]);
        assert_eq!(shared, listed);
        assert_eq!(shared.massless_species(), 0);
    }

    #[test]
    fn no_radiation_without_temperature_or_species() {
        let cold = NeutrinoModel::new(70.0, 0.0, 3.046, &[0.06]);
        assert_eq!(cold.ogamma0(), 0.0);
        assert_eq!(cold.onu0(), 0.0);
        assert!(!cold.has_massive());

        let no_nu = NeutrinoModel::new(70.0, 2.725, 0.0, &[0.0]);
        assert!(no_nu.ogamma0() > 0.0);
        assert_eq!(no_nu.onu0(), 0.0);
    }

    #[test]
    fn neutrino_density_vanishes_as_temperature_drops() {
        let mut prev = f64::INFINITY;
        for t in [2.7, 1.0, 0.1, 0.01, 0.0] {
            let onu0 = NeutrinoModel::new(70.0, t, 3.046, &[0.0, 0.0, 0.06]).onu0();
            assert!(onu0 <= prev);
            prev = onu0;
        }
        assert_eq!(prev, 0.0);
    }
}
