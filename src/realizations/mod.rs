//! Published cosmological parameter sets.
//!
//! All built-in realizations are flat ΛCDM. Parameters are the values from
//! the cited papers; `Ode0` follows from flatness once radiation and
//! neutrinos are accounted for.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cosmology::Cosmology;
use crate::domain::ParameterSet;
use crate::error::Result;
use crate::models::DarkEnergySpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Realization {
    #[value(name = "planck18")]
    Planck18,
    #[value(name = "planck15")]
    Planck15,
    #[value(name = "planck13")]
    Planck13,
    #[value(name = "wmap9")]
    WMAP9,
    #[value(name = "wmap7")]
    WMAP7,
    #[value(name = "wmap5")]
    WMAP5,
}

/// A registry record: parameters plus the dark-energy tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub params: ParameterSet,
    pub dark_energy: DarkEnergySpec,
    pub reference: String,
}

struct Published {
    h0: f64,
    om0: f64,
    ob0: f64,
    tcmb0: f64,
    neff: f64,
    m_nu: &'static [f64],
}

const PLANCK_M_NU: &[f64] = &[0.0, 0.0, 0.06];
const WMAP_M_NU: &[f64] = &[0.0];

impl Realization {
    pub const ALL: [Realization; 6] = [
        Realization::Planck18,
        Realization::Planck15,
        Realization::Planck13,
        Realization::WMAP9,
        Realization::WMAP7,
        Realization::WMAP5,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Realization::Planck18 => "Planck18",
            Realization::Planck15 => "Planck15",
            Realization::Planck13 => "Planck13",
            Realization::WMAP9 => "WMAP9",
            Realization::WMAP7 => "WMAP7",
            Realization::WMAP5 => "WMAP5",
        }
    }

    /// Bibliographic source of the parameter values.
    pub fn reference(self) -> &'static str {
        match self {
            Realization::Planck18 => {
                "Planck Collaboration 2018, A&A, 641, A6 (Paper VI), Table 2 (TT, TE, EE + lowE + lensing + BAO)"
            }
            Realization::Planck15 => {
                "Planck Collaboration 2016, A&A, 594, A13 (Paper XIII), Table 4 (TT, TE, EE + lowP + lensing + ext)"
            }
            Realization::Planck13 => {
                "Planck Collaboration 2014, A&A, 571, A16 (Paper XVI), Table 5 (Planck + WP + highL + BAO)"
            }
            Realization::WMAP9 => {
                "Hinshaw et al. 2013, ApJS, 208, 19, doi: 10.1088/0067-0049/208/2/19. Table 4 (WMAP9 + eCMB + BAO + H0, last column)"
            }
            Realization::WMAP7 => {
                "Komatsu et al. 2011, ApJS, 192, 18, doi: 10.1088/0067-0049/192/2/18. Table 1 (WMAP + BAO + H0 ML)"
            }
            Realization::WMAP5 => {
                "Komatsu et al. 2009, ApJS, 180, 330, doi: 10.1088/0067-0049/180/2/330. Table 1 (WMAP + BAO + SN ML)"
            }
        }
    }

    fn published(self) -> Published {
        match self {
            Realization::Planck18 => Published {
                h0: 67.66,
                om0: 0.30966,
                ob0: 0.04897,
                tcmb0: 2.7255,
                neff: 3.046,
                m_nu: PLANCK_M_NU,
            },
            Realization::Planck15 => Published {
                h0: 67.74,
                om0: 0.3075,
                ob0: 0.0486,
                tcmb0: 2.7255,
                neff: 3.046,
                m_nu: PLANCK_M_NU,
            },
            Realization::Planck13 => Published {
                h0: 67.77,
                om0: 0.30712,
                ob0: 0.048252,
                tcmb0: 2.7255,
                neff: 3.046,
                m_nu: PLANCK_M_NU,
            },
            Realization::WMAP9 => Published {
                h0: 69.32,
                om0: 0.2865,
                ob0: 0.04628,
                tcmb0: 2.725,
                neff: 3.04,
                m_nu: WMAP_M_NU,
            },
            Realization::WMAP7 => Published {
                h0: 70.4,
                om0: 0.272,
                ob0: 0.0455,
                tcmb0: 2.725,
                neff: 3.04,
                m_nu: WMAP_M_NU,
            },
            Realization::WMAP5 => Published {
                h0: 70.2,
                om0: 0.277,
                ob0: 0.0459,
                tcmb0: 2.725,
                neff: 3.04,
                m_nu: WMAP_M_NU,
            },
        }
    }

    pub fn parameters(self) -> ParameterSet {
        let p = self.published();
        ParameterSet::flat(p.h0, p.om0)
            .with_tcmb0(p.tcmb0)
            .with_neff(p.neff)
            .with_m_nu(p.m_nu.to_vec())
            .with_ob0(p.ob0)
            .with_name(self.name())
    }

    pub fn entry(self) -> RegistryEntry {
        RegistryEntry {
            params: self.parameters(),
            dark_energy: DarkEnergySpec::Lambda,
            reference: self.reference().to_string(),
        }
    }

    pub fn cosmology(self) -> Result<Cosmology> {
        let entry = self.entry();
        Cosmology::from_spec(entry.params, entry.dark_energy)
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for Realization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
