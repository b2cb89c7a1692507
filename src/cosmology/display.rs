//! Human-readable rendering of a cosmology.

use std::fmt;

use super::Cosmology;

/// Format `value` with `digits` significant digits, dropping trailing zeros.
pub fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let exponent = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    let mut s = format!("{value:.decimals$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}

impl fmt::Display for Cosmology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig = |v: f64| significant(v, 4);

        write!(f, "{}(", self.class_name())?;
        if let Some(name) = self.name() {
            write!(f, "name=\"{name}\", ")?;
        }
        write!(f, "H0={}, Om0={}", sig(self.h0()), sig(self.om0()))?;
        if !self.is_flat() {
            write!(f, ", Ode0={}", sig(self.ode0()))?;
        }
        for (key, value) in self.dark_energy.parameters() {
            write!(f, ", {key}={}", sig(value))?;
        }
        let masses: Vec<String> = self.m_nu().iter().map(|&m| sig(m)).collect();
        write!(
            f,
            ", Tcmb0={}, Neff={}, m_nu=[{}], Ob0=",
            sig(self.tcmb0()),
            sig(self.neff()),
            masses.join(", ")
        )?;
        match self.ob0() {
            Some(ob0) => write!(f, "{})", sig(ob0)),
            None => write!(f, "None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Overrides;

    #[test]
    fn significant_digits() {
        assert_eq!(significant(67.66, 4), "67.66");
        assert_eq!(significant(0.30966, 4), "0.3097");
        assert_eq!(significant(70.0, 4), "70");
        assert_eq!(significant(0.06, 4), "0.06");
        assert_eq!(significant(-0.9, 4), "-0.9");
        assert_eq!(significant(0.0, 4), "0");
        assert_eq!(significant(12345.0, 4), "12345");
    }

    #[test]
    fn flat_display() {
        let c = Cosmology::flat_lambda_cdm(70.0, 0.3).unwrap();
        assert_eq!(
            c.to_string(),
            "FlatLambdaCDM(H0=70, Om0=0.3, Tcmb0=0, Neff=3.04, m_nu=[0], Ob0=None)"
        );
    }

    #[test]
    fn curved_display_with_dark_energy_parameters() {
        let c = Cosmology::w0wa_cdm(70.0, 0.3, 0.6, -0.9, 0.2)
            .unwrap()
            .clone_with(&Overrides::new().name(Some("test".into())).ob0(Some(0.05)))
            .unwrap();
        assert_eq!(
            c.to_string(),
            "w0waCDM(name=\"test\", H0=70, Om0=0.3, Ode0=0.6, w0=-0.9, wa=0.2, Tcmb0=0, Neff=3.04, m_nu=[0], Ob0=0.05)"
        );
    }
}
