use std::ops::Range;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use super::labels::{plain_text, AxisLabels, PWD_LABEL};
use crate::catalogue::model::CatalogueTable;
use crate::color::{Colormap, ValueScale};
use crate::error::Result;

/// Figure size in inches.
pub const FIGURE_INCHES: (f64, f64) = (5.0, 3.0);
/// Backend units per inch (PostScript points).
pub const POINTS_PER_INCH: f64 = 72.0;

const FONT: &str = "sans-serif";
const LABEL_SIZE: f64 = 8.0;
const TITLE_SIZE: f64 = 9.0;
const COLORBAR_WIDTH: i32 = 64;
const GRADIENT_STEPS: usize = 64;

pub fn figure_size() -> (u32, u32) {
    (
        (FIGURE_INCHES.0 * POINTS_PER_INCH).round() as u32,
        (FIGURE_INCHES.1 * POINTS_PER_INCH).round() as u32,
    )
}

// ---------------------------------------------------------------------------
// Plottable points
// ---------------------------------------------------------------------------

/// Points that can be placed on a linear-x / log-y chart, with their colour
/// value. Rows with a non-finite value or a non-positive sigma are skipped.
#[derive(Debug, Clone)]
pub struct ScatterData {
    /// `(value, sigma, pwd)` per plotted source.
    pub points: Vec<(f64, f64, f64)>,
    pub skipped: usize,
}

impl ScatterData {
    pub fn from_table(
        table: &CatalogueTable,
        value_column: &str,
        sigma_column: &str,
        color_column: &str,
    ) -> Result<Self> {
        let values = table.numeric(value_column)?;
        let sigmas = table.numeric(sigma_column)?;
        let colors = table.numeric(color_column)?;

        let points: Vec<(f64, f64, f64)> = values
            .into_iter()
            .zip(sigmas)
            .zip(colors)
            .map(|((v, s), c)| (v, s, c))
            .filter(|&(v, s, _)| v.is_finite() && s.is_finite() && s > 0.0)
            .collect();
        let skipped = table.num_rows() - points.len();

        Ok(ScatterData { points, skipped })
    }

    /// x range with 5% padding either side.
    pub fn x_range(&self) -> Range<f64> {
        let Some(scale) = ValueScale::from_values(self.points.iter().map(|p| p.0)) else {
            return 0.0..1.0;
        };
        let span = scale.max - scale.min;
        let pad = if span > 0.0 {
            0.05 * span
        } else if scale.min != 0.0 {
            0.05 * scale.min.abs()
        } else {
            0.5
        };
        (scale.min - pad)..(scale.max + pad)
    }

    /// y range with 5% padding either side, in decades.
    pub fn y_range(&self) -> Range<f64> {
        let Some(scale) = ValueScale::from_values(self.points.iter().map(|p| p.1)) else {
            return 0.1..1.0;
        };
        let factor = if scale.max > scale.min {
            (scale.max / scale.min).powf(0.05)
        } else {
            2.0
        };
        (scale.min / factor)..(scale.max * factor)
    }

    /// Range of the colour values; widened when all points share one value.
    pub fn color_scale(&self) -> ValueScale {
        match ValueScale::from_values(self.points.iter().map(|p| p.2)) {
            Some(scale) if scale.max > scale.min => scale,
            Some(scale) => ValueScale {
                min: scale.min - 0.5,
                max: scale.max + 0.5,
            },
            None => ValueScale { min: 0.0, max: 1.0 },
        }
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// Draw the scatter chart and its colour bar onto `root` and present it.
pub fn draw_figure<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    data: &ScatterData,
    labels: &AxisLabels,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let cmap = Colormap::inferno_r();
    let scale = data.color_scale();
    let label_font = (FONT, LABEL_SIZE).into_font();
    let title_font = (FONT, TITLE_SIZE).into_font();

    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (main, bar) = root.split_horizontally(width as i32 - COLORBAR_WIDTH);

    let mut chart = ChartBuilder::on(&main)
        .margin(4)
        .margin_top(18)
        .x_label_area_size(30)
        .y_label_area_size(46)
        .build_cartesian_2d(data.x_range(), data.y_range().log_scale())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(5)
        .y_labels(4)
        .label_style(label_font.clone())
        .axis_desc_style(title_font.clone())
        .x_desc(plain_text(labels.x))
        .y_desc(plain_text(labels.y))
        .draw()?;

    chart.draw_series(
        data.points
            .iter()
            .map(|&(x, y, c)| Pixel::new((x, y), cmap.color_at(scale.normalize(c)))),
    )?;

    let mut colorbar = ChartBuilder::on(&bar)
        .caption(plain_text(PWD_LABEL), title_font)
        .margin(4)
        .x_label_area_size(30)
        .y_label_area_size(30)
        .build_cartesian_2d(0.0..1.0, scale.min..scale.max)?;

    colorbar
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .label_style(label_font)
        .draw()?;

    let step = (scale.max - scale.min) / GRADIENT_STEPS as f64;
    colorbar.draw_series((0..GRADIENT_STEPS).map(|i| {
        let y0 = scale.min + step * i as f64;
        let color = cmap.color_at(scale.normalize(y0 + step / 2.0));
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], color.filled())
    }))?;

    root.present()?;
    Ok(())
}
