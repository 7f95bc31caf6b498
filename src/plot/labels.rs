use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogueError;

// ---------------------------------------------------------------------------
// Stellar parameters
// ---------------------------------------------------------------------------

/// Stellar parameter derived by GF+21 from Gaia photometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    /// Stellar mass, in solar masses.
    Mass,
    /// Effective temperature, in kelvins.
    Teff,
    /// Log of surface gravity, in cm/s^2.
    Logg,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [Parameter::Mass, Parameter::Teff, Parameter::Logg];
    pub const NAMES: &'static [&'static str] = &["mass", "teff", "logg"];

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Mass => "mass",
            Parameter::Teff => "teff",
            Parameter::Logg => "logg",
        }
    }

    pub fn labels(self) -> &'static AxisLabels {
        match self {
            Parameter::Mass => &MASS_LABELS,
            Parameter::Teff => &TEFF_LABELS,
            Parameter::Logg => &LOGG_LABELS,
        }
    }
}

impl FromStr for Parameter {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CatalogueError::InvalidValue {
                kind: "parameter",
                value: s.to_string(),
                allowed: Parameter::NAMES,
            })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Atmospheric compositions
// ---------------------------------------------------------------------------

/// Atmospheric composition assumed when fitting the parameters (GF+21, Sec. 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Composition {
    /// Pure hydrogen.
    H,
    /// Pure helium.
    He,
    /// Mixed hydrogen and helium.
    #[serde(rename = "mixed")]
    Mixed,
}

impl Composition {
    pub const ALL: [Composition; 3] = [Composition::H, Composition::He, Composition::Mixed];
    pub const NAMES: &'static [&'static str] = &["H", "He", "mixed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Composition::H => "H",
            Composition::He => "He",
            Composition::Mixed => "mixed",
        }
    }
}

impl FromStr for Composition {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Composition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogueError::InvalidValue {
                kind: "composition",
                value: s.to_string(),
                allowed: Composition::NAMES,
            })
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Column names and file names
// ---------------------------------------------------------------------------

/// Catalogue column holding the parameter, e.g. `mass_H`.
pub fn value_column(parameter: Parameter, composition: Composition) -> String {
    format!("{parameter}_{composition}")
}

/// Catalogue column holding the 1-sigma uncertainty, e.g. `emass_H`.
pub fn sigma_column(parameter: Parameter, composition: Composition) -> String {
    format!("e{parameter}_{composition}")
}

/// Output file stem, e.g. `MassVsSigmaH`, `LoggVsSigmaMixed`.
pub fn file_stem(parameter: Parameter, composition: Composition) -> String {
    format!(
        "{}VsSigma{}",
        capitalize(parameter.as_str()),
        capitalize(composition.as_str())
    )
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Axis labels
// ---------------------------------------------------------------------------

/// Axis titles, written in LaTeX math as in the GF+21 figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisLabels {
    pub x: &'static str,
    pub y: &'static str,
}

const MASS_LABELS: AxisLabels = AxisLabels {
    x: r"mass [$M_\odot$]",
    y: r"uncertainty [$M_\odot$]",
};

const TEFF_LABELS: AxisLabels = AxisLabels {
    x: r"$T_\mathrm{eff}$ [K]",
    y: r"uncertainty [K]",
};

const LOGG_LABELS: AxisLabels = AxisLabels {
    x: r"log(surface gravity / [cm s$^{-2}$])",
    y: r"log(uncertainty / [cm s$^{-2}$])",
};

/// Colour bar title.
pub const PWD_LABEL: &str = r"$P_{WD}$";

/// Render the small LaTeX subset used in labels as plain Latin-1 text.
pub fn plain_text(latex: &str) -> String {
    latex
        .replace(r"\odot", "sun")
        .replace(r"\mathrm", "")
        .chars()
        .filter(|c| !matches!(c, '$' | '{' | '}'))
        .collect()
}
