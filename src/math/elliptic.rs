//! Elliptic integrals for closed-form flat ΛCDM distances.
//!
//! For a flat universe of matter plus a cosmological constant,
//!
//! ```text
//! E(z)² = Om0 (1+z)³ + Ode0 = Ode0 (t³ + 1),   t = (1+z) (Om0/Ode0)^(1/3)
//! ```
//!
//! so the comoving distance reduces to differences of
//! `G(x) = ∫_x^∞ dt / sqrt(t³ + 1)`, an incomplete elliptic integral of the
//! first kind with modulus `m = (2 + √3)/4`.

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Parameter `m = k²` of the cubic reduction.
const CUBIC_M: f64 = (2.0 + SQRT_3) / 4.0;

/// Carlson's symmetric elliptic integral of the first kind,
/// `R_F(x, y, z) = ½ ∫_0^∞ dt / sqrt((t+x)(t+y)(t+z))`.
///
/// Arguments must be non-negative with at most one zero. Uses the
/// duplication theorem; the stopping threshold gives full double precision.
pub fn carlson_rf(x: f64, y: f64, z: f64) -> f64 {
    const ERRTOL: f64 = 0.0025;
    let (mut x, mut y, mut z) = (x, y, z);
    loop {
        let (sx, sy, sz) = (x.sqrt(), y.sqrt(), z.sqrt());
        let lambda = sx * (sy + sz) + sy * sz;
        x = 0.25 * (x + lambda);
        y = 0.25 * (y + lambda);
        z = 0.25 * (z + lambda);
        let avg = (x + y + z) / 3.0;
        let dx = (avg - x) / avg;
        let dy = (avg - y) / avg;
        let dz = (avg - z) / avg;
        if dx.abs().max(dy.abs()).max(dz.abs()) <= ERRTOL || !avg.is_finite() {
            let e2 = dx * dy - dz * dz;
            let e3 = dx * dy * dz;
            return (1.0 + (e2 / 24.0 - 0.1 - 3.0 * e3 / 44.0) * e2 + e3 / 14.0) / avg.sqrt();
        }
    }
}

/// Complete elliptic integral of the first kind `K(m)`.
pub fn complete_k(m: f64) -> f64 {
    carlson_rf(0.0, 1.0 - m, 1.0)
}

/// `∫_x^∞ dt / sqrt(t³ + 1)` for `x ≥ 0`.
pub fn cubic_tail(x: f64) -> f64 {
    // With cos ψ = (x + 1 - √3)/(x + 1 + √3) the tail is 3^(-1/4) F(ψ | m).
    // For ψ > π/2 use F(ψ) = 2K - F(π - ψ); sin ψ is shared by both.
    let den = x + 1.0 + SQRT_3;
    let cos_psi = (x + 1.0 - SQRT_3) / den;
    let one_minus_cos = 2.0 * SQRT_3 / den;
    let sin2 = one_minus_cos * (1.0 + cos_psi);
    let sin_psi = sin2.sqrt();
    let partial = sin_psi * carlson_rf(cos_psi * cos_psi, 1.0 - CUBIC_M * sin2, 1.0);
    let f = if cos_psi >= 0.0 {
        partial
    } else {
        2.0 * complete_k(CUBIC_M) - partial
    };
    f / SQRT_3.sqrt()
}
