//! Parameter-vs-uncertainty scatter plots.
//!
//! The caller's table is only read: the three columns the plot needs are
//! projected into a fresh table before anything is drawn.
pub mod labels;
pub mod pdf;
pub mod scatter;

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalogue::filter::PWD_COLUMN;
use crate::catalogue::model::CatalogueTable;
use crate::error::{CatalogueError, Result};

pub use labels::{Composition, Parameter};
use labels::{file_stem, sigma_column, value_column};
use pdf::PdfBackend;
use scatter::{draw_figure, figure_size, ScatterData};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    #[default]
    Pdf,
    Svg,
}

impl PlotFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PlotFormat::Pdf => "pdf",
            PlotFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Directory the plot file is written to.
    pub output_dir: PathBuf,
    pub format: PlotFormat,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: PlotFormat::Pdf,
        }
    }
}

/// Path the plot for this parameter/composition pair is written to.
pub fn output_path(parameter: Parameter, composition: Composition, options: &PlotOptions) -> PathBuf {
    options.output_dir.join(format!(
        "{}.{}",
        file_stem(parameter, composition),
        options.format.extension()
    ))
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Like [`stellar_parameter_vs_uncertainty`], taking the catalogue spellings
/// (`"mass"`, `"teff"`, `"logg"` and `"H"`, `"He"`, `"mixed"`).
pub fn plot_by_name(
    table: &CatalogueTable,
    parameter: &str,
    composition: &str,
    options: &PlotOptions,
) -> Result<PathBuf> {
    let parameter: Parameter = parameter.parse()?;
    let composition: Composition = composition.parse()?;
    stellar_parameter_vs_uncertainty(table, parameter, composition, options)
}

/// Plot a stellar parameter against its uncertainty (log scale), coloured by
/// `Pwd`, and save it as `{Parameter}VsSigma{Composition}.pdf` (or `.svg`).
///
/// Returns the path written. An existing file of the same name is replaced.
pub fn stellar_parameter_vs_uncertainty(
    table: &CatalogueTable,
    parameter: Parameter,
    composition: Composition,
    options: &PlotOptions,
) -> Result<PathBuf> {
    log::info!("Plotting {parameter} vs uncertainty...");

    let value_col = value_column(parameter, composition);
    let sigma_col = sigma_column(parameter, composition);
    let projected = table.select(&[&value_col, &sigma_col, PWD_COLUMN])?;

    let data = ScatterData::from_table(&projected, &value_col, &sigma_col, PWD_COLUMN)?;
    if data.skipped > 0 {
        log::debug!(
            "{} of {} sources have no finite {value_col} / positive {sigma_col}; not plotted",
            data.skipped,
            projected.num_rows()
        );
    }
    if data.points.is_empty() {
        log::warn!("No plottable sources for {value_col}; writing an empty chart");
    }

    let path = output_path(parameter, composition, options);
    render(&path, options.format, &data, parameter)?;

    log::info!("Plot file {} saved.", path.display());
    Ok(path)
}

fn render(path: &Path, format: PlotFormat, data: &ScatterData, parameter: Parameter) -> Result<()> {
    let render_error = |reason: String| CatalogueError::Render {
        path: path.to_path_buf(),
        reason,
    };
    let labels = parameter.labels();

    match format {
        PlotFormat::Pdf => {
            let root = PdfBackend::new(path, figure_size()).into_drawing_area();
            draw_figure(root, data, labels).map_err(|e| render_error(e.to_string()))
        }
        PlotFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, figure_size()).into_drawing_area();
                draw_figure(root, data, labels).map_err(|e| render_error(e.to_string()))?;
            }
            std::fs::write(path, svg).map_err(|e| CatalogueError::io(path, e))
        }
    }
}
