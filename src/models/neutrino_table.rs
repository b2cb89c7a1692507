//! Tabulated relic-neutrino energy density.
//!
//! A neutrino species of mass `m` at temperature `T` carries energy density
//! proportional to
//!
//! ```text
//! F(y) = 120 / (7π⁴) ∫_0^∞ x² sqrt(x² + y²) / (eˣ + 1) dx,   y = m c² / (k_B T)
//! ```
//!
//! normalised so that `F(0) = 1` (a massless species). The integral is
//! smooth in `ln y`, so it is baked into a table of `(ln F, d ln F / d ln y)`
//! pairs on a uniform `ln y` grid and evaluated with cubic Hermite
//! interpolation. Outside the grid the small- and large-mass expansions take
//! over.

/// `ln y` of the first node (`y = 0.01`).
pub const LN_Y_MIN: f64 = -4.605_170_185_988_092;
/// `ln y` of the last node (`y = 200`).
pub const LN_Y_MAX: f64 = 5.298_317_366_548_036;
/// Node spacing in `ln y`.
pub const LN_Y_STEP: f64 = (LN_Y_MAX - LN_Y_MIN) / (NODES.len() as f64 - 1.0);

/// Coefficient of `y²` in the relativistic expansion, `5 / (7π²)`.
const SMALL_Y_COEFF: f64 = 0.072_372_274_030_241_27;
/// Coefficient of `y` in the non-relativistic expansion, `180 ζ(3) / (7π⁴)`.
const LARGE_Y_LINEAR: f64 = 0.317_321_867_236_042_33;
/// Coefficient of `1/y` in the non-relativistic expansion, `1350 ζ(5) / (7π⁴)`.
const LARGE_Y_INVERSE: f64 = 2.052_980_087_211_932;

/// `(ln F(y), d ln F / d ln y)` at `ln y = LN_Y_MIN + i * LN_Y_STEP`.
const NODES: [(f64, f64); 64] = [
    (7.23665917369801923e-06, 1.44722913044253648e-05),
    (9.90986112836914056e-06, 1.98178604991153189e-05),
    (1.35704236372504700e-05, 2.71374762541664219e-05),
    (1.85829426333188227e-05, 3.71597888909624646e-05),
    (2.54465736778648966e-05, 5.08821365305536796e-05),
    (3.48446361496537813e-05, 6.96694127917524806e-05),
    (4.77124589341960996e-05, 9.53891513316365303e-05),
    (6.53301412568794027e-05, 1.30595969214887363e-04),
    (8.94493175236389096e-05, 1.78783185618369022e-04),
    (1.22466284518004022e-04, 2.44725699264966567e-04),
    (1.67658260488490343e-04, 3.34946557640188394e-04),
    (2.29505471830122220e-04, 4.58350686076303029e-04),
    (3.14129680867703703e-04, 6.27083674857985642e-04),
    (4.29890272218477624e-04, 8.57692127745326971e-04),
    (5.88192822282260805e-04, 1.17268560961999373e-03),
    (8.04583007564307570e-04, 1.60262921785910744e-03),
    (1.10022162424821190e-03, 2.18893014812605565e-03),
    (1.50386514985050273e-03, 2.98751993786419093e-03),
    (2.05451104218169018e-03, 4.07367251840231193e-03),
    (2.80490729850102352e-03, 5.54822871216456744e-03),
    (3.82616937208837739e-03, 7.54550534623899503e-03),
    (5.21378889914328892e-03, 1.02431259681817956e-02),
    (7.09534716613741123e-03, 1.38738790733153039e-02),
    (9.64024318475927879e-03, 1.87394274549241673e-02),
    (1.30716815702144398e-02, 2.52251750464253278e-02),
    (1.76809944435201878e-02, 3.38147451702498977e-02),
    (2.38440339526197406e-02, 4.51012439361268627e-02),
    (3.20387970032562711e-02, 5.97907488089119074e-02),
    (4.28625688067500038e-02, 7.86914282783064550e-02),
    (5.70456834532067428e-02, 1.02679869539460483e-01),
    (7.54576046898234321e-02, 1.32635620346120475e-01),
    (9.90997506037127746e-02, 1.69337315446776410e-01),
    (1.29078938999909520e-01, 2.13321021001058486e-01),
    (1.66556397315144211e-01, 2.64714727128051053e-01),
    (2.12670831469716104e-01, 3.23080592885310658e-01),
    (2.68440339464788069e-01, 3.87312260834505540e-01),
    (3.34655883710136159e-01, 4.55637749673871828e-01),
    (4.11785809293686689e-01, 5.25759472710907505e-01),
    (4.99912854489536151e-01, 5.95121891617377607e-01),
    (5.98719784102031749e-01, 6.61249526632363582e-01),
    (7.07528038139462079e-01, 7.22068226023508730e-01),
    (8.25380051396565562e-01, 7.76128425658384802e-01),
    (9.51145828492377277e-01, 8.22687536411948805e-01),
    (1.08363153572568138e+00, 8.61658029307096118e-01),
    (1.22167205573789617e+00, 8.93464255062735857e-01),
    (1.36419748181433698e+00, 9.18862950307251070e-01),
    (1.51027165745346537e+00, 9.38773237812156158e-01),
    (1.65910662666479669e+00, 9.54142942492215429e-01),
    (1.81005957115271943e+00, 9.65859597283671767e-01),
    (1.96261905278849147e+00, 9.74702012975680487e-01),
    (2.11638619536362738e+00, 9.81322479607045217e-01),
    (2.27105476090635428e+00, 9.86248800727914654e-01),
    (2.42639249711031502e+00, 9.89897141882823406e-01),
    (2.58222491896331308e+00, 9.92589306739430910e-01),
    (2.73842188261922592e+00, 9.94570505278338013e-01),
    (2.89488684552359166e+00, 9.96025535819921037e-01),
    (3.05154848394415890e+00, 9.97092525696963827e-01),
    (3.20835426619706876e+00, 9.97874086915245373e-01),
    (3.36526558912990925e+00, 9.98446102145734593e-01),
    (3.52225413260403064e+00, 9.98864499293640185e-01),
    (3.67929914601301977e+00, 9.99170397110847985e-01),
    (3.83638543888642491e+00, 9.99393971571970519e-01),
    (3.99350189846907666e+00, 9.99557338489464819e-01),
    (4.15064039907998339e+00, 9.99676690572702142e-01),
];

/// Energy density of one species relative to a massless one, `F(y)`.
///
/// `y` is the mass over the species temperature in the same energy units.
/// Negative or NaN input yields NaN.
pub fn density_ratio(y: f64) -> f64 {
    if !(y >= 0.0) {
        return f64::NAN;
    }
    if y == 0.0 {
        return 1.0;
    }
    let ln_y = y.ln();
    if ln_y <= LN_Y_MIN {
        return 1.0 + SMALL_Y_COEFF * y * y;
    }
    if ln_y >= LN_Y_MAX {
        return LARGE_Y_LINEAR * y + LARGE_Y_INVERSE / y;
    }

    let t = (ln_y - LN_Y_MIN) / LN_Y_STEP;
    let i = (t as usize).min(NODES.len() - 2);
    let u = t - i as f64;
    let (f0, d0) = NODES[i];
    let (f1, d1) = NODES[i + 1];

    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;
    (h00 * f0 + h10 * LN_Y_STEP * d0 + h01 * f1 + h11 * LN_Y_STEP * d1).exp()
}
