//! Load the Gaia EDR3 white dwarf catalogue, keep the high-confidence
//! candidates and plot their stellar parameters against the uncertainties.
pub mod catalogue;
pub mod color;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod plot;

pub use catalogue::{
    extract_high_confidence_candidates, load_default, load_file, CandidateCriteria,
    CatalogueTable,
};
pub use config::PipelineConfig;
pub use error::{CatalogueError, Result};
pub use plot::{stellar_parameter_vs_uncertainty, Composition, Parameter, PlotFormat, PlotOptions};
