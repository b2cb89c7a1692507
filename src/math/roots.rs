//! Brent's bracketing root finder, and a golden-section extremum search.
//!
//! Brent combines bisection, secant and inverse quadratic interpolation.
//! Given a bracket `[a, b]` with `f(a)` and `f(b)` of opposite sign it always
//! converges, which is why the inverse solver uses it instead of a
//! derivative-based method. The golden-section search locates a turning
//! point between scan samples, where two roots can hide inside one cell.

use crate::error::{CosmologyError, Result};

/// Stopping rule for [`brent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrentOptions {
    /// Absolute tolerance on the root location.
    pub xtol: f64,
    pub max_iterations: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            xtol: 1e-8,
            max_iterations: 500,
        }
    }
}

/// Find `x` in `[a, b]` with `f(x) = 0`, given precomputed `fa = f(a)` and `fb = f(b)`.
///
/// Errors from `f` propagate. A bracket without a sign change is a
/// `Domain` error; exhausting the iteration budget is `Numerical`.
pub fn brent<F>(f: F, a: f64, b: f64, fa: f64, fb: f64, opts: &BrentOptions) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(CosmologyError::domain(format!(
            "interval [{a}, {b}] does not bracket a root: f(a)={fa}, f(b)={fb}"
        )));
    }

    let (mut a, mut b, mut fa, mut fb) = (a, b, fa, fb);
    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for iteration in 0..opts.max_iterations {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * opts.xtol;
        let m = 0.5 * (c - b);
        if m.abs() <= tol || fb == 0.0 {
            tracing::trace!(iteration, root = b, "brent converged");
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Attempt interpolation.
            let s = fb / fa;
            let mut p;
            let mut q;
            if a == c {
                p = 2.0 * m * s;
                q = 1.0 - s;
            } else {
                let q0 = fa / fc;
                let r = fb / fc;
                p = s * (2.0 * m * q0 * (q0 - r) - (b - a) * (r - 1.0));
                q = (q0 - 1.0) * (r - 1.0) * (s - 1.0);
            }
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }
            let min1 = 3.0 * m * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = d;
            }
        } else {
            d = m;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(m) };
        fb = f(b)?;
        if !fb.is_finite() {
            return Err(CosmologyError::numerical(format!(
                "function value at z={b} is not finite during root refinement"
            )));
        }
    }

    Err(CosmologyError::numerical(format!(
        "root finder did not converge within {} iterations (last estimate z={b})",
        opts.max_iterations
    )))
}

/// Which turning point [`golden_section`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Minimum,
    Maximum,
}

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Locate the extremum of a unimodal `f` on `[a, b]`.
///
/// Stops when the interval is narrower than `opts.xtol` or after
/// `opts.max_iterations` shrink steps. Returns `(x, f(x))` for the best
/// point evaluated. Errors from `f` propagate.
pub fn golden_section<F>(f: F, a: f64, b: f64, kind: Extremum, opts: &BrentOptions) -> Result<(f64, f64)>
where
    F: Fn(f64) -> Result<f64>,
{
    // Minimize s*f so one loop serves both kinds.
    let s = match kind {
        Extremum::Minimum => 1.0,
        Extremum::Maximum => -1.0,
    };
    let (mut a, mut b) = if a <= b { (a, b) } else { (b, a) };
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = s * f(c)?;
    let mut fd = s * f(d)?;

    for _ in 0..opts.max_iterations {
        if (b - a).abs() <= opts.xtol {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = s * f(c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = s * f(d)?;
        }
    }

    let (x, v) = if fc < fd { (c, fc) } else { (d, fd) };
    if !v.is_finite() {
        return Err(CosmologyError::numerical(format!(
            "function value at z={x} is not finite during extremum search"
        )));
    }
    Ok((x, s * v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve<F: Fn(f64) -> f64>(f: F, a: f64, b: f64) -> Result<f64> {
        let fa = f(a);
        let fb = f(b);
        brent(|x| Ok(f(x)), a, b, fa, fb, &BrentOptions::default())
    }

    #[test]
    fn finds_cube_root() {
        let root = solve(|x| x * x * x - 2.0, 0.0, 3.0).unwrap();
        assert!((root - 2.0_f64.cbrt()).abs() < 1e-8);
    }

    #[test]
    fn endpoint_root_is_returned_directly() {
        assert_eq!(solve(|x| x - 1.0, 1.0, 2.0).unwrap(), 1.0);
    }

    #[test]
    fn rejects_interval_without_sign_change() {
        let err = solve(|x| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert!(err.is_domain());
    }

    #[test]
    fn iteration_budget_is_enforced() {
        let opts = BrentOptions {
            xtol: 1e-15,
            max_iterations: 2,
        };
        let f = |x: f64| (x - 0.3).tan();
        let err = brent(|x| Ok(f(x)), 0.0, 1.0, f(0.0), f(1.0), &opts).unwrap_err();
        assert!(matches!(err, CosmologyError::Numerical { .. }));
    }

    #[test]
    fn function_errors_propagate() {
        let err = brent(
            |x| {
                if x > 0.4 && x < 0.6 {
                    Err(CosmologyError::domain("hole"))
                } else {
                    Ok(x - 0.5)
                }
            },
            0.0,
            1.0,
            -0.5,
            0.5,
            &BrentOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, CosmologyError::domain("hole"));
    }

    #[test]
    fn golden_section_finds_both_kinds() {
        let opts = BrentOptions {
            xtol: 1e-10,
            max_iterations: 200,
        };
        let (x, v) = golden_section(|x| Ok(-(x - 0.7) * (x - 0.7) + 2.0), 0.0, 1.0, Extremum::Maximum, &opts)
            .unwrap();
        assert!((x - 0.7).abs() < 1e-8);
        assert!((v - 2.0).abs() < 1e-14);

        let (x, v) = golden_section(|x| Ok(x.cos()), 2.0, 4.0, Extremum::Minimum, &opts).unwrap();
        assert!((x - std::f64::consts::PI).abs() < 1e-8);
        assert!((v + 1.0).abs() < 1e-14);
    }

    #[test]
    fn golden_section_propagates_errors() {
        let err = golden_section(
            |_| Err(CosmologyError::domain("hole")),
            0.0,
            1.0,
            Extremum::Minimum,
            &BrentOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_domain());
    }
}
