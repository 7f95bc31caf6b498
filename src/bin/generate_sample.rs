use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wd_candidates::catalogue::model::{CatalogueTable, Column, ColumnData};
use wd_candidates::catalogue::writer::write_file;
use wd_candidates::plot::labels::{sigma_column, value_column};
use wd_candidates::{Composition, Parameter};

const SOURCES: usize = 2000;

/// Normal deviate (Box-Muller; the cosine branch only).
fn normal(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-15);
    let u2: f64 = rng.random();
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Typical value, scatter and unit per parameter.
fn parameter_model(parameter: Parameter) -> (f64, f64, &'static str) {
    match parameter {
        Parameter::Mass => (0.62, 0.12, "Msun"),
        Parameter::Teff => (11000.0, 4000.0, "K"),
        Parameter::Logg => (8.0, 0.25, "log(cm.s**-2)"),
    }
}

/// Fake a source name from its sky position (`WDJhhmmss.ss+ddmmss.ss`).
fn source_name(rng: &mut impl Rng) -> String {
    let ra = rng.random::<f64>() * 24.0;
    let dec = rng.random::<f64>() * 180.0 - 90.0;
    let sexagesimal = |v: f64| {
        let v = v.abs();
        let minutes = v.fract() * 60.0;
        let seconds = minutes.fract() * 60.0;
        format!("{:02}{:02}{:05.2}", v.trunc(), minutes.trunc(), seconds)
    };
    let sign = if dec < 0.0 { '-' } else { '+' };
    format!("WDJ{}{sign}{}", sexagesimal(ra), sexagesimal(dec))
}

fn build(rng: &mut impl Rng) -> Result<CatalogueTable> {
    let names: Vec<String> = (0..SOURCES).map(|_| source_name(rng)).collect();
    // Most sources are either clear white dwarfs or clear contaminants.
    let pwd: Vec<f64> = (0..SOURCES)
        .map(|_| {
            if rng.random_bool(0.05) {
                f64::NAN
            } else if rng.random_bool(0.6) {
                (1.0 - rng.random::<f64>().powi(3) * 0.3).min(1.0)
            } else {
                rng.random::<f64>() * 0.75
            }
        })
        .collect();
    let sdss_spec: Vec<i64> = (0..SOURCES)
        .map(|_| if rng.random_bool(0.2) { rng.random_range(1..=3) } else { 0 })
        .collect();
    let sdss_clean: Vec<i64> = (0..SOURCES).map(|_| i64::from(rng.random_bool(0.7))).collect();

    let mut columns = vec![
        Column::new("WDJ_name", ColumnData::Text(names)),
        Column::new("Pwd", ColumnData::Float(pwd)),
        Column::new("SDSS_spec", ColumnData::Integer(sdss_spec)),
        Column::new("sdss_clean", ColumnData::Integer(sdss_clean)),
    ];

    for parameter in Parameter::ALL {
        let (mean, spread, unit) = parameter_model(parameter);
        for composition in Composition::ALL {
            let mut values = Vec::with_capacity(SOURCES);
            let mut sigmas = Vec::with_capacity(SOURCES);
            for _ in 0..SOURCES {
                // Fits fail for a few sources; the catalogue leaves them blank.
                if rng.random_bool(0.03) {
                    values.push(f64::NAN);
                    sigmas.push(f64::NAN);
                    continue;
                }
                let value = normal(rng, mean, spread).abs();
                // Relative uncertainties span roughly two decades.
                let relative = 10f64.powf(normal(rng, -1.8, 0.5));
                values.push(value);
                sigmas.push(value * relative);
            }
            columns.push(
                Column::new(value_column(parameter, composition), ColumnData::Float(values))
                    .with_unit(unit),
            );
            columns.push(
                Column::new(sigma_column(parameter, composition), ColumnData::Float(sigmas))
                    .with_unit(unit),
            );
        }
    }

    CatalogueTable::new(columns).context("assembling sample catalogue")
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_catalogue.parquet"));

    let mut rng = StdRng::seed_from_u64(42);
    let table = build(&mut rng)?;
    write_file(&table, &output_path)
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {} synthetic sources ({} columns) to {}",
        table.num_rows(),
        table.num_columns(),
        output_path.display()
    );
    Ok(())
}
