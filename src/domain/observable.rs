//! Named redshift-dependent quantities.
//!
//! `Observable` lets the CLI, the exporters and the inverse solver refer to
//! any single-redshift accessor by name.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cosmology::Cosmology;
use crate::error::{CosmologyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Observable {
    Efunc,
    InvEfunc,
    /// Hubble parameter `H(z)`.
    Hubble,
    ComovingDistance,
    TransverseComovingDistance,
    LuminosityDistance,
    AngularDiameterDistance,
    Distmod,
    KpcProperPerArcmin,
    KpcComovingPerArcmin,
    ArcsecPerKpcProper,
    ArcsecPerKpcComoving,
    ComovingVolume,
    DifferentialComovingVolume,
    Age,
    LookbackTime,
    LookbackDistance,
    AbsorptionDistance,
    CriticalDensity,
    ScaleFactor,
    Tcmb,
    Tnu,
    W,
    DeDensityScale,
    NuRelativeDensity,
    Om,
    Ob,
    Odm,
    Ode,
    Ok,
    Ogamma,
    Onu,
}

impl Observable {
    pub const ALL: [Observable; 32] = [
        Observable::Efunc,
        Observable::InvEfunc,
        Observable::Hubble,
        Observable::ComovingDistance,
        Observable::TransverseComovingDistance,
        Observable::LuminosityDistance,
        Observable::AngularDiameterDistance,
        Observable::Distmod,
        Observable::KpcProperPerArcmin,
        Observable::KpcComovingPerArcmin,
        Observable::ArcsecPerKpcProper,
        Observable::ArcsecPerKpcComoving,
        Observable::ComovingVolume,
        Observable::DifferentialComovingVolume,
        Observable::Age,
        Observable::LookbackTime,
        Observable::LookbackDistance,
        Observable::AbsorptionDistance,
        Observable::CriticalDensity,
        Observable::ScaleFactor,
        Observable::Tcmb,
        Observable::Tnu,
        Observable::W,
        Observable::DeDensityScale,
        Observable::NuRelativeDensity,
        Observable::Om,
        Observable::Ob,
        Observable::Odm,
        Observable::Ode,
        Observable::Ok,
        Observable::Ogamma,
        Observable::Onu,
    ];

    /// Stable identifier, as used on the command line and in exports.
    pub fn name(self) -> &'static str {
        match self {
            Observable::Efunc => "efunc",
            Observable::InvEfunc => "inv_efunc",
            Observable::Hubble => "hubble",
            Observable::ComovingDistance => "comoving_distance",
            Observable::TransverseComovingDistance => "transverse_comoving_distance",
            Observable::LuminosityDistance => "luminosity_distance",
            Observable::AngularDiameterDistance => "angular_diameter_distance",
            Observable::Distmod => "distmod",
            Observable::KpcProperPerArcmin => "kpc_proper_per_arcmin",
            Observable::KpcComovingPerArcmin => "kpc_comoving_per_arcmin",
            Observable::ArcsecPerKpcProper => "arcsec_per_kpc_proper",
            Observable::ArcsecPerKpcComoving => "arcsec_per_kpc_comoving",
            Observable::ComovingVolume => "comoving_volume",
            Observable::DifferentialComovingVolume => "differential_comoving_volume",
            Observable::Age => "age",
            Observable::LookbackTime => "lookback_time",
            Observable::LookbackDistance => "lookback_distance",
            Observable::AbsorptionDistance => "absorption_distance",
            Observable::CriticalDensity => "critical_density",
            Observable::ScaleFactor => "scale_factor",
            Observable::Tcmb => "tcmb",
            Observable::Tnu => "tnu",
            Observable::W => "w",
            Observable::DeDensityScale => "de_density_scale",
            Observable::NuRelativeDensity => "nu_relative_density",
            Observable::Om => "om",
            Observable::Ob => "ob",
            Observable::Odm => "odm",
            Observable::Ode => "ode",
            Observable::Ok => "ok",
            Observable::Ogamma => "ogamma",
            Observable::Onu => "onu",
        }
    }

    /// Unit label of the returned value; empty for dimensionless quantities.
    pub fn unit(self) -> &'static str {
        match self {
            Observable::Hubble => "km / (Mpc s)",
            Observable::ComovingDistance
            | Observable::TransverseComovingDistance
            | Observable::LuminosityDistance
            | Observable::AngularDiameterDistance
            | Observable::LookbackDistance => "Mpc",
            Observable::Distmod => "mag",
            Observable::KpcProperPerArcmin | Observable::KpcComovingPerArcmin => "kpc / arcmin",
            Observable::ArcsecPerKpcProper | Observable::ArcsecPerKpcComoving => "arcsec / kpc",
            Observable::ComovingVolume => "Mpc3",
            Observable::DifferentialComovingVolume => "Mpc3 / sr",
            Observable::Age | Observable::LookbackTime => "Gyr",
            Observable::CriticalDensity => "g / cm3",
            Observable::Tcmb | Observable::Tnu => "K",
            Observable::Efunc
            | Observable::InvEfunc
            | Observable::AbsorptionDistance
            | Observable::ScaleFactor
            | Observable::W
            | Observable::DeDensityScale
            | Observable::NuRelativeDensity
            | Observable::Om
            | Observable::Ob
            | Observable::Odm
            | Observable::Ode
            | Observable::Ok
            | Observable::Ogamma
            | Observable::Onu => "",
        }
    }

    /// Evaluate at a single redshift.
    ///
    /// A NaN or infinite result (for example `w` of a CPL model at `z = -1`)
    /// is reported as a numerical failure rather than returned.
    pub fn evaluate(self, cosmo: &Cosmology, z: f64) -> Result<f64> {
        let value = self.evaluate_raw(cosmo, z)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CosmologyError::numerical(format!(
                "{} is not finite at z={z} (got {value})",
                self.name()
            )))
        }
    }

    fn evaluate_raw(self, cosmo: &Cosmology, z: f64) -> Result<f64> {
        match self {
            Observable::Efunc => cosmo.efunc_at(z),
            Observable::InvEfunc => cosmo.inv_efunc_at(z),
            Observable::Hubble => cosmo.h_at(z),
            Observable::ComovingDistance => cosmo.comoving_distance_at(z),
            Observable::TransverseComovingDistance => cosmo.transverse_comoving_distance_at(z),
            Observable::LuminosityDistance => cosmo.luminosity_distance_at(z),
            Observable::AngularDiameterDistance => cosmo.angular_diameter_distance_at(z),
            Observable::Distmod => cosmo.distmod_at(z),
            Observable::KpcProperPerArcmin => cosmo.kpc_proper_per_arcmin_at(z),
            Observable::KpcComovingPerArcmin => cosmo.kpc_comoving_per_arcmin_at(z),
            Observable::ArcsecPerKpcProper => cosmo.arcsec_per_kpc_proper_at(z),
            Observable::ArcsecPerKpcComoving => cosmo.arcsec_per_kpc_comoving_at(z),
            Observable::ComovingVolume => cosmo.comoving_volume_at(z),
            Observable::DifferentialComovingVolume => cosmo.differential_comoving_volume_at(z),
            Observable::Age => cosmo.age_at(z),
            Observable::LookbackTime => cosmo.lookback_time_at(z),
            Observable::LookbackDistance => cosmo.lookback_distance_at(z),
            Observable::AbsorptionDistance => cosmo.absorption_distance_at(z),
            Observable::CriticalDensity => cosmo.critical_density_at(z),
            Observable::ScaleFactor => cosmo.scale_factor_at(z),
            Observable::Tcmb => cosmo.tcmb_at(z),
            Observable::Tnu => cosmo.tnu_at(z),
            Observable::W => cosmo.w_at(z),
            Observable::DeDensityScale => cosmo.de_density_scale_at(z),
            Observable::NuRelativeDensity => cosmo.nu_relative_density_at(z),
            Observable::Om => cosmo.om_at(z),
            Observable::Ob => cosmo.ob_at(z),
            Observable::Odm => cosmo.odm_at(z),
            Observable::Ode => cosmo.ode_at(z),
            Observable::Ok => cosmo.ok_at(z),
            Observable::Ogamma => cosmo.ogamma_at(z),
            Observable::Onu => cosmo.onu_at(z),
        }
    }
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_are_numerical_failures() {
        let phantom = Cosmology::flat_w_cdm(70.0, 0.3, -1.5).unwrap();
        let err = phantom.de_density_scale(-1.0).unwrap_err();
        assert!(matches!(err, CosmologyError::Numerical { .. }), "{err:?}");
        assert!(err.to_string().contains("de_density_scale"));

        let pivot = Cosmology::flat_wpwa_cdm(70.0, 0.3, -1.0, 0.5, 0.5).unwrap();
        let err = pivot.w(-1.0).unwrap_err();
        assert!(matches!(err, CosmologyError::Numerical { .. }), "{err:?}");

        // Finite values at z = -1 still come through.
        assert!(pivot.scale_factor(-1.0).unwrap_err().is_domain());
        assert_eq!(Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap().w(-1.0).unwrap(), -1.0);
    }

    #[test]
    fn names_match_serde_and_clap() {
        for obs in Observable::ALL {
            let json = serde_json::to_string(&obs).unwrap();
            assert_eq!(json, format!("\"{}\"", obs.name()));
            let parsed = Observable::from_str(&obs.name().replace('_', "-"), false).unwrap();
            assert_eq!(parsed, obs);
        }
    }

    #[test]
    fn every_observable_evaluates_for_a_full_cosmology() {
        let c = crate::realizations::Realization::Planck18.cosmology().unwrap();
        for obs in Observable::ALL {
            let v = obs.evaluate(&c, 0.5).unwrap();
            assert!(v.is_finite(), "{obs}: {v}");
        }
    }
}
