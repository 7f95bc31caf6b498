use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::catalogue::{extract_high_confidence_candidates, load_file, writer};
use crate::config::PipelineConfig;
use crate::plot::plot_by_name;

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub sources_loaded: usize,
    pub candidates: usize,
    pub exported: Option<PathBuf>,
    pub plots: Vec<PathBuf>,
}

/// Load → filter → (export) → plot. The first failure aborts the run.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let table = load_file(&config.catalogue)
        .with_context(|| format!("loading catalogue {}", config.catalogue.display()))?;
    log::debug!(
        "Mass columns: {:?}",
        table.column_names_containing("mass")
    );

    let candidates = extract_high_confidence_candidates(&table, &config.criteria)
        .context("selecting high-confidence candidates")?;
    if log::log_enabled!(log::Level::Debug) {
        if let Ok(preview) = writer::preview(&candidates, 5) {
            log::debug!("First candidates:\n{preview}");
        }
    }

    if let Some(export) = &config.export {
        writer::write_file(&candidates, export)
            .with_context(|| format!("exporting candidates to {}", export.display()))?;
    }

    if !config.plots.is_empty() {
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("creating {}", config.output_dir.display()))?;
    }

    let options = config.plot_options();
    let plots = config
        .plots
        .iter()
        .map(|request| {
            plot_by_name(&candidates, &request.parameter, &request.composition, &options)
                .with_context(|| {
                    format!(
                        "plotting {} ({}) vs uncertainty",
                        request.parameter, request.composition
                    )
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PipelineReport {
        sources_loaded: table.num_rows(),
        candidates: candidates.num_rows(),
        exported: config.export.clone(),
        plots,
    })
}
