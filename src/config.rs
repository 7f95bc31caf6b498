use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalogue::{CandidateCriteria, DEFAULT_CATALOGUE};
use crate::plot::{Composition, Parameter, PlotFormat, PlotOptions};

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// One requested plot, in the catalogue spelling (`"mass"`, `"H"`, ...).
/// Names are validated when the plot is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub parameter: String,
    pub composition: String,
}

/// Everything the `wd-candidates` binary needs; every field has a default.
///
/// ```json
/// {
///   "catalogue": "GaiaEDR3_WD_main.fits",
///   "criteria": { "pwd": 0.75, "sdss_spec": true, "sdss_clean": true },
///   "plots": [{ "parameter": "mass", "composition": "H" }],
///   "output_dir": "plots",
///   "format": "pdf",
///   "export": "candidates.parquet"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub catalogue: PathBuf,
    pub criteria: CandidateCriteria,
    pub plots: Vec<PlotRequest>,
    pub output_dir: PathBuf,
    pub format: PlotFormat,
    /// Where to save the filtered candidates (`.csv` or `.parquet`), if anywhere.
    pub export: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalogue: PathBuf::from(DEFAULT_CATALOGUE),
            criteria: CandidateCriteria::default(),
            plots: all_plots(),
            output_dir: PathBuf::from("."),
            format: PlotFormat::default(),
            export: None,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            output_dir: self.output_dir.clone(),
            format: self.format,
        }
    }
}

/// Every parameter/composition pair the catalogue provides.
pub fn all_plots() -> Vec<PlotRequest> {
    Parameter::ALL
        .into_iter()
        .flat_map(|parameter| {
            Composition::ALL.into_iter().map(move |composition| PlotRequest {
                parameter: parameter.to_string(),
                composition: composition.to_string(),
            })
        })
        .collect()
}
