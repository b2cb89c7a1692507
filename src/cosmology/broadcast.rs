//! Shape-preserving evaluation over scalars, slices, arrays and matrices.
//!
//! Every public accessor takes any `Redshifts` input and returns the same
//! shape: `f64` in, `f64` out; `&[f64]` in, `Vec<f64>` out; `DMatrix` in,
//! `DMatrix` of the same dimensions out. Multi-element inputs are evaluated
//! in parallel. Elements are independent, so one bad redshift does not stop
//! the others; all failures are reported together in a `Batch` error.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use super::Cosmology;
use crate::domain::Observable;
use crate::error::{CosmologyError, Result};

/// Redshift input of any supported shape.
pub trait Redshifts {
    type Output;

    /// Elements in storage order.
    fn values(&self) -> &[f64];

    /// Output of the same shape, from values in storage order.
    fn rebuild(&self, values: Vec<f64>) -> Self::Output;

    /// Scalars report their own error instead of a one-element `Batch`.
    fn is_scalar(&self) -> bool {
        false
    }
}

impl Redshifts for f64 {
    type Output = f64;

    fn values(&self) -> &[f64] {
        std::slice::from_ref(self)
    }

    fn rebuild(&self, values: Vec<f64>) -> f64 {
        values.first().copied().unwrap_or(f64::NAN)
    }

    fn is_scalar(&self) -> bool {
        true
    }
}

impl Redshifts for &[f64] {
    type Output = Vec<f64>;

    fn values(&self) -> &[f64] {
        self
    }

    fn rebuild(&self, values: Vec<f64>) -> Vec<f64> {
        values
    }
}

impl Redshifts for Vec<f64> {
    type Output = Vec<f64>;

    fn values(&self) -> &[f64] {
        self
    }

    fn rebuild(&self, values: Vec<f64>) -> Vec<f64> {
        values
    }
}

impl Redshifts for &Vec<f64> {
    type Output = Vec<f64>;

    fn values(&self) -> &[f64] {
        self
    }

    fn rebuild(&self, values: Vec<f64>) -> Vec<f64> {
        values
    }
}

impl<const N: usize> Redshifts for [f64; N] {
    type Output = [f64; N];

    fn values(&self) -> &[f64] {
        self
    }

    fn rebuild(&self, values: Vec<f64>) -> [f64; N] {
        std::array::from_fn(|i| values[i])
    }
}

impl Redshifts for &DVector<f64> {
    type Output = DVector<f64>;

    fn values(&self) -> &[f64] {
        self.as_slice()
    }

    fn rebuild(&self, values: Vec<f64>) -> DVector<f64> {
        DVector::from_vec(values)
    }
}

impl Redshifts for &DMatrix<f64> {
    type Output = DMatrix<f64>;

    fn values(&self) -> &[f64] {
        self.as_slice()
    }

    fn rebuild(&self, values: Vec<f64>) -> DMatrix<f64> {
        // Column-major on both sides.
        DMatrix::from_vec(self.nrows(), self.ncols(), values)
    }
}

/// Apply `f` to every element of `z`, preserving its shape.
pub fn broadcast<Z, F>(z: &Z, f: F) -> Result<Z::Output>
where
    Z: Redshifts + ?Sized,
    F: Fn(f64) -> Result<f64> + Sync,
{
    if z.is_scalar() {
        let value = f(z.values()[0])?;
        return Ok(z.rebuild(vec![value]));
    }
    let results: Vec<Result<f64>> = z.values().par_iter().map(|&v| f(v)).collect();
    collect_batch(results).map(|values| z.rebuild(values))
}

/// Unwrap per-element results, or report every failure with its index.
pub fn collect_batch(results: Vec<Result<f64>>) -> Result<Vec<f64>> {
    let total = results.len();
    let mut values = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(v) => values.push(v),
            Err(err) => failures.push((i, err)),
        }
    }
    if failures.is_empty() {
        Ok(values)
    } else {
        Err(CosmologyError::Batch { failures, total })
    }
}

impl Cosmology {
    /// Evaluate `observable` at every redshift in `z`.
    pub fn evaluate<Z: Redshifts>(&self, observable: Observable, z: Z) -> Result<Z::Output> {
        broadcast(&z, |v| observable.evaluate(self, v))
    }

    /// Per-element results, for callers that want the valid values even
    /// when some redshifts fail.
    pub fn evaluate_each(&self, observable: Observable, z: &[f64]) -> Vec<Result<f64>> {
        z.par_iter().map(|&v| observable.evaluate(self, v)).collect()
    }

    /// Comoving distance between paired redshifts, in Mpc.
    pub fn comoving_distance_z1z2<Z: Redshifts>(&self, z1: Z, z2: Z) -> Result<Z::Output> {
        self.pairwise(&z1, &z2, |a, b| self.comoving_distance_between(a, b))
    }

    /// Angular diameter distance of objects at `z2` seen from `z1`, in Mpc.
    pub fn angular_diameter_distance_z1z2<Z: Redshifts>(&self, z1: Z, z2: Z) -> Result<Z::Output> {
        self.pairwise(&z1, &z2, |a, b| self.angular_diameter_distance_between(a, b))
    }

    fn pairwise<Z, F>(&self, z1: &Z, z2: &Z, f: F) -> Result<Z::Output>
    where
        Z: Redshifts,
        F: Fn(f64, f64) -> Result<f64> + Sync,
    {
        let (a, b) = (z1.values(), z2.values());
        if a.len() != b.len() {
            return Err(CosmologyError::validation(
                "z2",
                format!("expected {} redshifts to pair with z1, got {}", a.len(), b.len()),
            ));
        }
        if z1.is_scalar() {
            return Ok(z1.rebuild(vec![f(a[0], b[0])?]));
        }
        let results: Vec<Result<f64>> =
            a.par_iter().zip(b.par_iter()).map(|(&x, &y)| f(x, y)).collect();
        collect_batch(results).map(|values| z1.rebuild(values))
    }
}

macro_rules! accessors {
    ($($(#[$doc:meta])* $name:ident => $observable:ident;)*) => {
        impl Cosmology {
            $(
                $(#[$doc])*
                pub fn $name<Z: Redshifts>(&self, z: Z) -> Result<Z::Output> {
                    self.evaluate(Observable::$observable, z)
                }
            )*
        }
    };
}

accessors! {
    /// Dimensionless Hubble function `E(z) = H(z)/H0`.
    efunc => Efunc;
    inv_efunc => InvEfunc;
    /// `H(z)` in km/s/Mpc.
    h => Hubble;
    /// Line-of-sight comoving distance in Mpc.
    comoving_distance => ComovingDistance;
    /// Transverse comoving distance `d_M` in Mpc.
    transverse_comoving_distance => TransverseComovingDistance;
    /// Luminosity distance in Mpc.
    luminosity_distance => LuminosityDistance;
    /// Angular diameter distance in Mpc.
    angular_diameter_distance => AngularDiameterDistance;
    /// Distance modulus in magnitudes.
    distmod => Distmod;
    kpc_proper_per_arcmin => KpcProperPerArcmin;
    kpc_comoving_per_arcmin => KpcComovingPerArcmin;
    arcsec_per_kpc_proper => ArcsecPerKpcProper;
    arcsec_per_kpc_comoving => ArcsecPerKpcComoving;
    /// Full-sky comoving volume in Mpc³.
    comoving_volume => ComovingVolume;
    /// Comoving volume per unit redshift and solid angle in Mpc³/sr.
    differential_comoving_volume => DifferentialComovingVolume;
    /// Age of the universe in Gyr.
    age => Age;
    /// Lookback time in Gyr.
    lookback_time => LookbackTime;
    /// Light-travel distance in Mpc.
    lookback_distance => LookbackDistance;
    absorption_distance => AbsorptionDistance;
    /// Critical density in g/cm³.
    critical_density => CriticalDensity;
    scale_factor => ScaleFactor;
    /// CMB temperature in K.
    tcmb => Tcmb;
    /// Neutrino temperature in K.
    tnu => Tnu;
    /// Dark-energy equation of state.
    w => W;
    /// `ρ_DE(z) / ρ_DE(0)`.
    de_density_scale => DeDensityScale;
    /// Neutrino over photon density.
    nu_relative_density => NuRelativeDensity;
    om => Om;
    ob => Ob;
    odm => Odm;
    ode => Ode;
    ok => Ok;
    ogamma => Ogamma;
    onu => Onu;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planck_like() -> Cosmology {
        Cosmology::flat_lambda_cdm(67.7, 0.31).unwrap()
    }

    #[test]
    fn scalar_in_scalar_out() {
        let c = planck_like();
        let d: f64 = c.comoving_distance(1.0).unwrap();
        assert!(d > 3000.0);
    }

    #[test]
    fn shapes_are_preserved() {
        let c = planck_like();
        let zs = vec![0.1, 0.5, 1.0];
        let from_vec = c.luminosity_distance(&zs).unwrap();
        let from_slice = c.luminosity_distance(zs.as_slice()).unwrap();
        let from_array: [f64; 3] = c.luminosity_distance([0.1, 0.5, 1.0]).unwrap();
        assert_eq!(from_vec, from_slice);
        assert_eq!(from_vec.as_slice(), from_array.as_slice());

        let v = DVector::from_vec(zs.clone());
        let out = c.luminosity_distance(&v).unwrap();
        assert_eq!(out.len(), 3);

        let m = DMatrix::from_row_slice(2, 2, &[0.1, 0.2, 0.3, 0.4]);
        let out = c.age(&m).unwrap();
        assert_eq!((out.nrows(), out.ncols()), (2, 2));
        assert!((out[(1, 0)] - c.age(0.3).unwrap()).abs() < 1e-12);
        assert!((out[(0, 1)] - c.age(0.2).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn mixed_inputs_report_every_failing_index() {
        let c = planck_like();
        let err = c.comoving_distance([0.5, -2.0, 1.0, f64::NAN]).unwrap_err();
        match err {
            CosmologyError::Batch { failures, total } => {
                assert_eq!(total, 4);
                let idx: Vec<usize> = failures.iter().map(|(i, _)| *i).collect();
                assert_eq!(idx, vec![1, 3]);
                assert!(failures.iter().all(|(_, e)| e.is_domain()));
            }
            other => panic!("expected batch error, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_each_keeps_valid_elements() {
        let c = planck_like();
        let out = c.evaluate_each(Observable::ComovingDistance, &[0.5, -2.0, 1.0]);
        assert!(out[0].is_ok());
        assert!(out[1].as_ref().unwrap_err().is_domain());
        assert!(out[2].is_ok());
    }

    #[test]
    fn scalar_errors_are_not_wrapped() {
        let c = planck_like();
        assert!(c.efunc(-3.0).unwrap_err().is_domain());
    }

    #[test]
    fn pairwise_distances() {
        let c = planck_like();
        let d = c.comoving_distance_z1z2(vec![0.0, 0.5], vec![1.0, 1.0]).unwrap();
        let full = c.comoving_distance(1.0).unwrap();
        assert!((d[0] - full).abs() < 1e-9);
        assert!((d[1] - (full - c.comoving_distance(0.5).unwrap())).abs() < 1e-9);

        let err = c.comoving_distance_z1z2(vec![0.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, CosmologyError::Validation { .. }));

        let err = c.angular_diameter_distance_z1z2(2.0, 1.0).unwrap_err();
        assert!(err.is_domain());
    }
}
