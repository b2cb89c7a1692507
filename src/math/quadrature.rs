//! Adaptive Gauss–Kronrod quadrature.
//!
//! Every integral in this crate is a one-dimensional integral of a smooth,
//! bounded integrand over a finite interval (improper integrals are mapped to
//! finite ones by the caller). We use the 21-point Kronrod extension of the
//! 10-point Gauss rule and bisect the interval with the largest error
//! estimate until the requested tolerance is met:
//!
//! ```text
//! |I - Q| <= max(epsabs, epsrel * |Q|)
//! ```
//!
//! The subdivision count is bounded; when the bound is hit the best estimate
//! is returned with `converged = false` so the caller can decide whether to
//! warn or fail.

use serde::{Deserialize, Serialize};

use crate::error::{CosmologyError, Result};

/// Kronrod abscissae on [-1, 1] (positive half, descending). Odd indices are
/// the Gauss nodes.
const XGK: [f64; 11] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.294_392_862_701_460_198_131_126_603_103_866,
    0.148_874_338_981_631_210_884_826_001_129_720,
    0.0,
];

/// Kronrod weights matching `XGK`.
const WGK: [f64; 11] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.123_491_976_262_065_851_077_600_525_165_474,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.147_739_104_901_338_491_374_841_515_972_068,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// Gauss weights for the nodes `XGK[1], XGK[3], ..., XGK[9]`.
const WG: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

/// Tolerances and work bound for adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureOptions {
    /// Absolute error target.
    pub epsabs: f64,
    /// Relative error target.
    pub epsrel: f64,
    /// Maximum number of subintervals before giving up.
    pub max_subdivisions: usize,
}

impl Default for QuadratureOptions {
    fn default() -> Self {
        Self {
            epsabs: 1.49e-8,
            epsrel: 1.49e-8,
            max_subdivisions: 100,
        }
    }
}

impl QuadratureOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.epsabs.is_finite() && self.epsabs >= 0.0) {
            return Err(CosmologyError::validation("epsabs", format!("{} (must be finite and >= 0)", self.epsabs)));
        }
        if !(self.epsrel.is_finite() && self.epsrel > 0.0) {
            return Err(CosmologyError::validation("epsrel", format!("{} (must be finite and > 0)", self.epsrel)));
        }
        if self.max_subdivisions == 0 {
            return Err(CosmologyError::validation("max_subdivisions", "must be at least 1"));
        }
        Ok(())
    }
}

/// Result of an adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub value: f64,
    pub abs_error: f64,
    pub subdivisions: usize,
    /// False when the subdivision bound was reached before the tolerance.
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

/// Integrate `f` over `[a, b]`. Reversed bounds flip the sign.
pub fn integrate<F>(f: F, a: f64, b: f64, opts: &QuadratureOptions) -> Quadrature
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return Quadrature {
            value: 0.0,
            abs_error: 0.0,
            subdivisions: 0,
            converged: true,
        };
    }
    if b < a {
        let q = integrate(f, b, a, opts);
        return Quadrature { value: -q.value, ..q };
    }

    let first = kronrod21(&f, a, b);
    let mut segments = vec![first];
    let mut total = first.value;
    let mut total_err = first.error;
    let limit = opts.max_subdivisions.max(1);

    loop {
        let tol = opts.epsabs.max(opts.epsrel * total.abs());
        if total_err <= tol || !total.is_finite() {
            break;
        }
        if segments.len() >= limit {
            return Quadrature {
                value: total,
                abs_error: total_err,
                subdivisions: segments.len(),
                converged: false,
            };
        }

        // Bisect the segment with the largest error.
        let (worst_idx, worst) = segments
            .iter()
            .copied()
            .enumerate()
            .max_by(|x, y| x.1.error.partial_cmp(&y.1.error).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or((0, first));

        let mid = 0.5 * (worst.a + worst.b);
        if mid <= worst.a || mid >= worst.b {
            // Interval collapsed to adjacent floats; no further refinement possible.
            return Quadrature {
                value: total,
                abs_error: total_err,
                subdivisions: segments.len(),
                converged: false,
            };
        }

        let left = kronrod21(&f, worst.a, mid);
        let right = kronrod21(&f, mid, worst.b);
        segments[worst_idx] = left;
        segments.push(right);

        total = segments.iter().map(|s| s.value).sum();
        total_err = segments.iter().map(|s| s.error).sum();
    }

    Quadrature {
        value: total,
        abs_error: total_err,
        subdivisions: segments.len(),
        converged: total.is_finite(),
    }
}

/// One 21-point Kronrod evaluation with the QUADPACK error heuristic.
fn kronrod21<F>(f: &F, a: f64, b: f64) -> Segment
where
    F: Fn(f64) -> f64,
{
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let f_center = f(center);
    let mut res_k = WGK[10] * f_center;
    let mut res_g = 0.0;
    let mut res_abs = res_k.abs();

    let mut f_lo = [0.0; 10];
    let mut f_hi = [0.0; 10];
    for j in 0..10 {
        let dx = half * XGK[j];
        let v1 = f(center - dx);
        let v2 = f(center + dx);
        f_lo[j] = v1;
        f_hi[j] = v2;
        res_k += WGK[j] * (v1 + v2);
        res_abs += WGK[j] * (v1.abs() + v2.abs());
        if j % 2 == 1 {
            res_g += WG[j / 2] * (v1 + v2);
        }
    }

    let mean = 0.5 * res_k;
    let mut res_asc = WGK[10] * (f_center - mean).abs();
    for j in 0..10 {
        res_asc += WGK[j] * ((f_lo[j] - mean).abs() + (f_hi[j] - mean).abs());
    }

    let value = res_k * half;
    res_abs *= half.abs();
    res_asc *= half.abs();
    let mut error = ((res_k - res_g) * half).abs();
    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }

    Segment { a, b, value, error }
}
