//! Find the redshift at which a function takes a given value.
//!
//! The search is global-then-local:
//! - sample `f(z) - target` on a grid uniform in `ln(1+z)`
//! - count the sign changes to locate every bracket
//! - refine each sampled turning point, since two roots close to a maximum
//!   or minimum can share one grid cell without a visible sign change
//! - refine the single bracket with Brent's method
//!
//! Non-monotone functions (the angular diameter distance, or the luminosity
//! distance of a closed universe) can reach the target more than once. That
//! is reported as `RootAmbiguous` with the brackets found rather than
//! silently picking one; the caller narrows `zmin`/`zmax` to choose.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cosmology::{Cosmology, Redshifts};
use crate::domain::Observable;
use crate::error::{CosmologyError, Result};
use crate::math::{BrentOptions, Extremum, brent, golden_section, log1p_space};

/// Lower edge of the default search bracket.
pub const DEFAULT_ZMIN: f64 = 0.0;
/// Upper edge of the default search bracket.
pub const DEFAULT_ZMAX: f64 = 1000.0;

/// What an array-valued solve does when some targets fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Return the failure of the lowest index.
    #[default]
    FailFast,
    /// Solve everything and report every failure in one `Batch` error.
    Collect,
}

/// Search bracket, tolerances and batch behaviour for [`z_at_value`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
    /// Absolute tolerance on the returned redshift.
    pub ztol: f64,
    pub max_iterations: usize,
    /// Grid size for the bracket scan.
    pub scan_points: usize,
    pub batch_mode: BatchMode,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            zmin: None,
            zmax: None,
            ztol: 1e-8,
            max_iterations: 500,
            scan_points: 256,
            batch_mode: BatchMode::FailFast,
        }
    }
}

impl SolverOptions {
    pub fn with_bracket(mut self, zmin: f64, zmax: f64) -> Self {
        self.zmin = Some(zmin);
        self.zmax = Some(zmax);
        self
    }

    pub fn with_zmax(mut self, zmax: f64) -> Self {
        self.zmax = Some(zmax);
        self
    }

    pub fn with_batch_mode(mut self, batch_mode: BatchMode) -> Self {
        self.batch_mode = batch_mode;
        self
    }

    fn bracket(&self) -> (f64, f64) {
        (self.zmin.unwrap_or(DEFAULT_ZMIN), self.zmax.unwrap_or(DEFAULT_ZMAX))
    }
}

/// Solve `f(z) = target` for `z` inside the configured bracket.
pub fn z_at_value<F>(f: F, target: f64, opts: &SolverOptions) -> Result<f64>
where
    F: Fn(f64) -> Result<f64> + Sync,
{
    if !target.is_finite() {
        return Err(CosmologyError::validation("target", format!("must be finite, got {target}")));
    }
    let (zmin, zmax) = opts.bracket();
    let grid = log1p_space(zmin, zmax, opts.scan_points.max(2))?;

    // Points where f is undefined (e.g. a closed universe that never reaches
    // that redshift) are dropped from the scan.
    let sampled: Vec<Option<f64>> = grid
        .par_iter()
        .map(|&z| match f(z) {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            Ok(_) => Ok(None),
            Err(err) if err.is_domain() => Ok(None),
            Err(err) => Err(err),
        })
        .collect::<Result<_>>()?;
    let points: Vec<(f64, f64)> = grid
        .iter()
        .zip(&sampled)
        .filter_map(|(&z, v)| v.map(|v| (z, v - target)))
        .collect();

    if points.is_empty() {
        return Err(CosmologyError::domain(format!(
            "function is undefined everywhere in [{zmin}, {zmax}]"
        )));
    }

    let brent_opts = BrentOptions {
        xtol: opts.ztol,
        max_iterations: opts.max_iterations,
    };
    let mut brackets = find_brackets(&points);
    let (hidden, extremes) = turning_point_brackets(&f, &points, target, &brent_opts)?;
    brackets.extend(hidden);
    brackets.sort_by(|a, b| (a.0).0.total_cmp(&(b.0).0));
    tracing::debug!(
        target,
        zmin,
        zmax,
        brackets = brackets.len(),
        turning_points = extremes.len(),
        "scanned for roots"
    );

    match brackets.as_slice() {
        [] => {
            let (fmin, fmax) = points
                .iter()
                .map(|p| p.1 + target)
                .chain(extremes.iter().copied())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, v| (acc.0.min(v), acc.1.max(v)));
            Err(CosmologyError::RootNotFound {
                target,
                zmin,
                zmax,
                fmin,
                fmax,
            })
        }
        [bracket] => {
            let ((za, ga), (zb, gb)) = *bracket;
            if ga == 0.0 {
                return Ok(za);
            }
            brent(|z| Ok(f(z)? - target), za, zb, ga, gb, &brent_opts)
        }
        many => Err(CosmologyError::RootAmbiguous {
            target,
            brackets: many.iter().map(|((za, _), (zb, _))| (*za, *zb)).collect(),
        }),
    }
}

type Bracket = ((f64, f64), (f64, f64));

/// Intervals between consecutive samples where `g` changes sign, plus
/// samples where `g` is exactly zero (as degenerate intervals).
fn find_brackets(points: &[(f64, f64)]) -> Vec<Bracket> {
    let mut out = Vec::new();
    for (i, &p) in points.iter().enumerate() {
        if p.1 == 0.0 {
            out.push((p, p));
            continue;
        }
        if let Some(&q) = points.get(i + 1) {
            if q.1 != 0.0 && p.1.signum() != q.1.signum() {
                out.push((p, q));
            }
        }
    }
    out
}

/// Brackets hidden inside the cells around sampled turning points.
///
/// A sample larger (or smaller) than both neighbours marks a maximum (or
/// minimum) somewhere in the two adjacent cells. It is refined with a
/// golden-section search; when the refined value lies on the other side of
/// the target from the samples, each cell holds one root. Also returns the
/// refined extreme values of `f`, for range reporting.
fn turning_point_brackets<F>(
    f: &F,
    points: &[(f64, f64)],
    target: f64,
    opts: &BrentOptions,
) -> Result<(Vec<Bracket>, Vec<f64>)>
where
    F: Fn(f64) -> Result<f64> + Sync,
{
    let g = |z: f64| match f(z) {
        Ok(v) if v.is_finite() => Ok(v - target),
        Ok(v) => Err(CosmologyError::domain(format!("f({z}) = {v}"))),
        Err(err) => Err(err),
    };

    let mut brackets = Vec::new();
    let mut extremes = Vec::new();
    for window in points.windows(3) {
        let [p0, p1, p2] = [window[0], window[1], window[2]];
        let kind = match (p1.1 - p0.1, p2.1 - p1.1) {
            (rise, fall) if rise > 0.0 && fall < 0.0 => Extremum::Maximum,
            (fall, rise) if fall < 0.0 && rise > 0.0 => Extremum::Minimum,
            _ => continue,
        };
        let (z_ext, g_ext) = match golden_section(&g, p0.0, p2.0, kind, opts) {
            Ok(found) => found,
            Err(err) if err.is_domain() => continue,
            Err(err) => return Err(err),
        };
        // Never report a turning point worse than the sample that found it.
        let beyond_sample = match kind {
            Extremum::Maximum => g_ext > p1.1,
            Extremum::Minimum => g_ext < p1.1,
        };
        let (z_ext, g_ext) = if beyond_sample { (z_ext, g_ext) } else { p1 };
        extremes.push(g_ext + target);

        if p1.1 == 0.0 {
            continue;
        }
        if g_ext == 0.0 {
            brackets.push(((z_ext, 0.0), (z_ext, 0.0)));
        } else if g_ext.signum() != p1.1.signum() {
            brackets.push((p0, (z_ext, g_ext)));
            brackets.push(((z_ext, g_ext), p2));
        }
    }
    Ok((brackets, extremes))
}

/// Solve for every target independently, preserving the input's shape.
pub fn z_at_values<F, Z>(f: F, targets: Z, opts: &SolverOptions) -> Result<Z::Output>
where
    F: Fn(f64) -> Result<f64> + Sync,
    Z: Redshifts,
{
    if targets.is_scalar() {
        let z = z_at_value(&f, targets.values()[0], opts)?;
        return Ok(targets.rebuild(vec![z]));
    }
    let results = solve_each(&f, targets.values(), opts);
    collect_solutions(results, opts.batch_mode).map(|values| targets.rebuild(values))
}

/// Fold per-target results according to `mode`.
///
/// `FailFast` returns the failure with the lowest index; `Collect` reports
/// every failure in one `Batch` error.
pub fn collect_solutions(results: Vec<Result<f64>>, mode: BatchMode) -> Result<Vec<f64>> {
    let total = results.len();
    let mut values = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(z) => values.push(z),
            Err(err) => match mode {
                BatchMode::FailFast => return Err(err),
                BatchMode::Collect => failures.push((i, err)),
            },
        }
    }
    if failures.is_empty() {
        Ok(values)
    } else {
        Err(CosmologyError::Batch { failures, total })
    }
}

/// Per-target results, for callers that want the successful solutions.
pub fn solve_each<F>(f: F, targets: &[f64], opts: &SolverOptions) -> Vec<Result<f64>>
where
    F: Fn(f64) -> Result<f64> + Sync,
{
    targets.par_iter().map(|&t| z_at_value(&f, t, opts)).collect()
}

impl Cosmology {
    /// Redshift at which `observable` equals `target`.
    pub fn z_at_value(&self, observable: Observable, target: f64, opts: &SolverOptions) -> Result<f64> {
        z_at_value(|z| observable.evaluate(self, z), target, opts)
    }

    /// Shape-preserving [`Cosmology::z_at_value`] over many targets.
    pub fn z_at_values<Z: Redshifts>(
        &self,
        observable: Observable,
        targets: Z,
        opts: &SolverOptions,
    ) -> Result<Z::Output> {
        z_at_values(|z| observable.evaluate(self, z), targets, opts)
    }
}
