//! Physical parameters of an FLRW universe.
//!
//! `ParameterSet` holds everything except the dark-energy equation of state,
//! which lives in the `DarkEnergy` variant. Units at this boundary:
//!
//! - `h0` in km/s/Mpc
//! - `tcmb0` in K
//! - `m_nu` in eV
//!
//! Topology is chosen by `ode0`: `None` means flat (dark energy absorbs
//! whatever the other components leave), `Some` means curved (curvature
//! absorbs it).

use serde::{Deserialize, Serialize};

use crate::error::{CosmologyError, Result};

/// Validated-on-construction physical parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "H0")]
    pub h0: f64,
    #[serde(rename = "Om0")]
    pub om0: f64,
    #[serde(rename = "Ode0", default, skip_serializing_if = "Option::is_none")]
    pub ode0: Option<f64>,
    #[serde(rename = "Tcmb0", default)]
    pub tcmb0: f64,
    #[serde(rename = "Neff", default = "default_neff")]
    pub neff: f64,
    #[serde(default = "default_m_nu")]
    pub m_nu: Vec<f64>,
    #[serde(rename = "Ob0", default)]
    pub ob0: Option<f64>,
}

fn default_neff() -> f64 {
    3.04
}

fn default_m_nu() -> Vec<f64> {
    vec![0.0]
}

impl ParameterSet {
    /// Flat topology with no radiation and massless neutrinos.
    pub fn flat(h0: f64, om0: f64) -> Self {
        Self {
            name: None,
            h0,
            om0,
            ode0: None,
            tcmb0: 0.0,
            neff: default_neff(),
            m_nu: default_m_nu(),
            ob0: None,
        }
    }

    /// Curved topology with an explicit dark-energy density.
    pub fn curved(h0: f64, om0: f64, ode0: f64) -> Self {
        Self {
            ode0: Some(ode0),
            ..Self::flat(h0, om0)
        }
    }

    pub fn with_tcmb0(mut self, tcmb0: f64) -> Self {
        self.tcmb0 = tcmb0;
        self
    }

    pub fn with_neff(mut self, neff: f64) -> Self {
        self.neff = neff;
        self
    }

    pub fn with_m_nu(mut self, m_nu: Vec<f64>) -> Self {
        self.m_nu = m_nu;
        self
    }

    pub fn with_ob0(mut self, ob0: f64) -> Self {
        self.ob0 = Some(ob0);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_flat(&self) -> bool {
        self.ode0.is_none()
    }

    /// Number of neutrino species, `floor(Neff)`.
    pub fn neutrino_species(&self) -> usize {
        if self.neff >= 1.0 { self.neff.floor() as usize } else { 0 }
    }

    /// Check every physical constraint, naming the first violated field.
    pub fn validate(&self) -> Result<()> {
        finite("H0", self.h0)?;
        if self.h0 <= 0.0 {
            return Err(CosmologyError::validation("H0", format!("must be > 0, got {}", self.h0)));
        }

        finite("Om0", self.om0)?;
        if self.om0 < 0.0 {
            return Err(CosmologyError::validation("Om0", format!("must be >= 0, got {}", self.om0)));
        }

        if let Some(ode0) = self.ode0 {
            finite("Ode0", ode0)?;
        }

        finite("Tcmb0", self.tcmb0)?;
        if self.tcmb0 < 0.0 {
            return Err(CosmologyError::validation(
                "Tcmb0",
                format!("temperature must be >= 0 K, got {}", self.tcmb0),
            ));
        }

        finite("Neff", self.neff)?;
        if self.neff < 0.0 {
            return Err(CosmologyError::validation("Neff", format!("must be >= 0, got {}", self.neff)));
        }

        for (i, &m) in self.m_nu.iter().enumerate() {
            if !m.is_finite() || m < 0.0 {
                return Err(CosmologyError::validation(
                    "m_nu",
                    format!("neutrino mass [{i}] must be finite and >= 0 eV, got {m}"),
                ));
            }
        }
        // Without a CMB temperature the neutrino sector is switched off, so
        // the mass list is not checked against the species count.
        if self.tcmb0 > 0.0 {
            let species = self.neutrino_species();
            let len = self.m_nu.len();
            if len != 1 && len != species {
                return Err(CosmologyError::validation(
                    "m_nu",
                    format!(
                        "expected 1 mass or one per species (floor(Neff) = {species}), got {len}"
                    ),
                ));
            }
        }

        if let Some(ob0) = self.ob0 {
            finite("Ob0", ob0)?;
            if ob0 < 0.0 {
                return Err(CosmologyError::validation("Ob0", format!("must be >= 0, got {ob0}")));
            }
            if ob0 > self.om0 {
                return Err(CosmologyError::validation(
                    "Ob0",
                    format!("baryonic density {ob0} exceeds total matter density Om0 = {}", self.om0),
                ));
            }
        }

        Ok(())
    }

    /// Apply one named override. Returns `false` when `key` is not a
    /// parameter of this set (the caller may route it elsewhere).
    pub(crate) fn apply(&mut self, key: &str, value: f64) -> bool {
        match key {
            "H0" => self.h0 = value,
            "Om0" => self.om0 = value,
            "Tcmb0" => self.tcmb0 = value,
            "Neff" => self.neff = value,
            "Ob0" => self.ob0 = Some(value),
            "Ode0" if !self.is_flat() => self.ode0 = Some(value),
            _ => return false,
        }
        true
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CosmologyError::validation(field, format!("must be finite, got {value}")))
    }
}

/// Field replacements for `Cosmology::clone_with`.
///
/// Numeric parameters are addressed by their conventional names (`H0`,
/// `Om0`, `Ode0`, `Tcmb0`, `Neff`, `Ob0`, and the dark-energy keys such as
/// `w0` or `wa`). The non-scalar fields have dedicated setters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub(crate) values: Vec<(String, f64)>,
    pub(crate) m_nu: Option<Vec<f64>>,
    pub(crate) name: Option<Option<String>>,
    pub(crate) ob0: Option<Option<f64>>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a numeric parameter. Later calls for the same key win.
    pub fn set(mut self, key: impl Into<String>, value: f64) -> Self {
        self.values.push((key.into(), value));
        self
    }

    pub fn m_nu(mut self, m_nu: Vec<f64>) -> Self {
        self.m_nu = Some(m_nu);
        self
    }

    /// Rename, or clear the name with `None`.
    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = Some(name);
        self
    }

    /// Set or clear the baryon density.
    pub fn ob0(mut self, ob0: Option<f64>) -> Self {
        self.ob0 = Some(ob0);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.m_nu.is_none() && self.name.is_none() && self.ob0.is_none()
    }

    /// Parse `KEY=VALUE` pairs, as given on the command line.
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, raw) = pair.split_once('=').ok_or_else(|| {
                CosmologyError::validation("override", format!("expected KEY=VALUE, got `{pair}`"))
            })?;
            let key = key.trim();
            let raw = raw.trim();
            if key == "m_nu" {
                let masses = raw
                    .split(',')
                    .map(|s| s.trim().parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| CosmologyError::validation("m_nu", format!("`{raw}`: {e}")))?;
                out = out.m_nu(masses);
                continue;
            }
            let value: f64 = raw
                .parse()
                .map_err(|e| CosmologyError::validation(key, format!("`{raw}`: {e}")))?;
            out = out.set(key, value);
        }
        Ok(out)
    }
}
