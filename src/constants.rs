//! Physical constants and unit conversions (SI, CODATA 2018 exact values where defined).
//!
//! Everything downstream works in plain `f64`; these constants are the only
//! place where unit conventions live.

use std::f64::consts::PI;

/// Planck constant [J s].
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Boltzmann constant [J K⁻¹].
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// Speed of light in vacuum [m s⁻¹].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Speed of light in km/s (for Hubble distances in Mpc).
pub const SPEED_OF_LIGHT_KM_S: f64 = SPEED_OF_LIGHT / 1000.0;

/// Newtonian gravitational constant [m³ kg⁻¹ s⁻²].
pub const GRAVITATIONAL: f64 = 6.674_30e-11;

/// Elementary charge [C].
pub const ELECTRON_CHARGE: f64 = 1.602_176_634e-19;

/// Astronomical unit [m].
pub const ASTRONOMICAL_UNIT: f64 = 1.495_978_707_00e11;

/// Megaparsec [m].
pub const MPC_M: f64 = 648_000.0 / PI * ASTRONOMICAL_UNIT * 1e6;

/// Gigayear (Julian) [s].
pub const GYR_S: f64 = 3600.0 * 24.0 * 365.25 * 1e9;

/// One arcminute in radians.
pub const ARCMIN_RAD: f64 = PI / (180.0 * 60.0);

/// One arcsecond in radians.
pub const ARCSEC_RAD: f64 = PI / (180.0 * 3600.0);

/// Boltzmann constant in eV/K.
pub const BOLTZMANN_EV: f64 = BOLTZMANN / ELECTRON_CHARGE;

/// Stefan–Boltzmann constant [W m⁻² K⁻⁴].
pub fn stefan_boltzmann() -> f64 {
    2.0 * PI.powi(5) * BOLTZMANN.powi(4) / (15.0 * PLANCK.powi(3) * SPEED_OF_LIGHT.powi(2))
}

/// Radiation constant over c², `4σ/c³`, in g cm⁻³ K⁻⁴.
pub fn radiation_density_constant() -> f64 {
    // kg m^-3 -> g cm^-3
    4.0 * stefan_boltzmann() / SPEED_OF_LIGHT.powi(3) * 1e-3
}

/// Neutrino-to-photon temperature ratio after e⁺e⁻ annihilation, `(4/11)^(1/3)`.
pub const TNU_OVER_TCMB: f64 = 0.713_765_855_503_608_2;

/// Energy density of one massless neutrino species relative to photons,
/// `7/8 (4/11)^(4/3)`.
pub const NU_ENERGY_PER_SPECIES: f64 = 0.227_107_317_66;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn megaparsec_matches_iau_definition() {
        assert!((MPC_M / 3.085_677_581_491_367e22 - 1.0).abs() < 1e-15);
    }

    #[test]
    fn stefan_boltzmann_is_codata_value() {
        assert!((stefan_boltzmann() / 5.670_374_419e-8 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn neutrino_temperature_ratio_is_cube_root() {
        let expected = (4.0_f64 / 11.0).cbrt();
        assert!((TNU_OVER_TCMB - expected).abs() < 1e-15);
        let per_species = 7.0 / 8.0 * (4.0_f64 / 11.0).powf(4.0 / 3.0);
        assert!((NU_ENERGY_PER_SPECIES - per_species).abs() < 1e-10);
    }
}
