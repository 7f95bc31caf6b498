use std::path::PathBuf;

use anyhow::Result;
use wd_candidates::{pipeline, PipelineConfig};

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => PipelineConfig::from_file(&path)?,
        None => PipelineConfig::default(),
    };

    let report = pipeline::run(&config)?;
    log::info!(
        "{} of {} sources kept; {} plot(s) written",
        report.candidates,
        report.sources_loaded,
        report.plots.len()
    );
    if let Some(export) = &report.exported {
        log::info!("Candidates exported to {}", export.display());
    }
    Ok(())
}
