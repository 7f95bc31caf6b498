use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::concat_batches;
use arrow::compute::kernels::cast::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type};
use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::tables::{ColumnDataType, ConcreteColumnDescription};
use fitsio::FitsFile;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::diagnostics::QuietDiagnostics;
use super::model::{CatalogueTable, Column, ColumnData, Value};
use super::units;
use crate::error::{CatalogueError, Result};

/// The GF+21 catalogue file name as distributed by VizieR.
pub const DEFAULT_CATALOGUE: &str = "GaiaEDR3_WD_main.fits";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load [`DEFAULT_CATALOGUE`] from the current directory.
pub fn load_default() -> Result<CatalogueTable> {
    load_file(Path::new(DEFAULT_CATALOGUE))
}

/// Load a catalogue table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.fits` / `.fit` / `.fts` – binary table in the first extension (HDU 1)
/// * `.parquet` / `.pq`        – one column per catalogue column
/// * `.csv`                    – header row, one record per source
/// * `.json`                   – `[{ "Pwd": 0.9, ... }, ...]`
pub fn load_file(path: &Path) -> Result<CatalogueTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !matches!(
        ext.as_str(),
        "fits" | "fit" | "fts" | "parquet" | "pq" | "csv" | "json"
    ) {
        return Err(CatalogueError::Format(format!(
            "unsupported file extension: .{ext}"
        )));
    }

    let file = File::open(path).map_err(|e| CatalogueError::io(path, e))?;
    log::info!("Opened file {}.", path.display());

    log::info!("Creating table from catalogue...");
    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(file)?,
        "csv" => load_csv(file)?,
        "json" => load_json(file)?,
        _ => {
            // cfitsio opens the path itself.
            drop(file);
            load_fits(path)?
        }
    };

    // GF+21 unit strings are not FITS units; only those warnings are silenced.
    let nonstandard_units = {
        let _quiet = QuietDiagnostics::enter();
        units::check_columns(table.columns())
    };

    if nonstandard_units > 0 {
        log::debug!("{nonstandard_units} column(s) carry non-FITS unit strings");
    }
    log::info!(
        "Table created ({} rows, {} columns).",
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// FITS loader
// ---------------------------------------------------------------------------

/// Read the binary table in HDU 1. Scalar columns are materialised with their
/// `TUNITn` unit; vector columns are skipped. Integer cells equal to the
/// column's `TNULLn` turn the column into floats with NaN in those rows.
fn load_fits(path: &Path) -> Result<CatalogueTable> {
    let fits_error = |what: &str, e: fitsio::errors::Error| {
        CatalogueError::Format(format!("{}: {what}: {e}", path.display()))
    };

    let mut fptr = FitsFile::open(path).map_err(|e| fits_error("not a FITS file", e))?;
    let hdu = fptr
        .hdu(1)
        .map_err(|e| fits_error("no extension after the primary HDU", e))?;

    let (descriptions, num_rows) = match &hdu.info {
        HduInfo::TableInfo {
            column_descriptions,
            num_rows,
        } => (column_descriptions, *num_rows),
        HduInfo::ImageInfo { .. } => {
            return Err(CatalogueError::Format(format!(
                "{}: HDU 1 is an image, not a table",
                path.display()
            )));
        }
        HduInfo::AnyInfo => {
            return Err(CatalogueError::Format(format!(
                "{}: HDU 1 has an unknown type",
                path.display()
            )));
        }
    };
    log::debug!(
        "HDU 1: {} columns, {num_rows} rows",
        descriptions.len()
    );

    let mut columns = Vec::with_capacity(descriptions.len());
    for (i, desc) in descriptions.iter().enumerate() {
        let data = read_fits_column(&hdu, &mut fptr, desc)
            .map_err(|e| fits_error(&format!("reading column '{}'", desc.name), e))?;
        let Some(data) = data else {
            continue;
        };
        let data = match data {
            ColumnData::Integer(values) => {
                let null = hdu.read_key::<i64>(&mut fptr, &format!("TNULL{}", i + 1)).ok();
                with_null_sentinel(values, null)
            }
            other => other,
        };

        let mut column = Column::new(desc.name.clone(), data);
        // TUNITn is optional; absence means dimensionless.
        if let Ok(unit) = hdu.read_key::<String>(&mut fptr, &format!("TUNIT{}", i + 1)) {
            column.unit = Some(unit.trim().to_string());
        }
        columns.push(column);
    }

    CatalogueTable::new(columns)
}

fn read_fits_column(
    hdu: &FitsHdu,
    fptr: &mut FitsFile,
    desc: &ConcreteColumnDescription,
) -> fitsio::errors::Result<Option<ColumnData>> {
    let name = desc.name.as_str();
    let is_string = matches!(desc.data_type.typ, ColumnDataType::String);

    if !is_string && desc.data_type.repeat > 1 {
        log::warn!(
            "Skipping vector column '{name}' ({} elements per row)",
            desc.data_type.repeat
        );
        return Ok(None);
    }

    let data = match &desc.data_type.typ {
        ColumnDataType::Float | ColumnDataType::Double => {
            ColumnData::Float(hdu.read_col(fptr, name)?)
        }
        ColumnDataType::Short
        | ColumnDataType::UnsignedShort
        | ColumnDataType::Int
        | ColumnDataType::Long
        | ColumnDataType::UnsignedLong
        | ColumnDataType::LongLong => ColumnData::Integer(hdu.read_col::<i64>(fptr, name)?),
        ColumnDataType::String => ColumnData::Text(trimmed(hdu.read_col(fptr, name)?)),
        // Remaining cfitsio types (bytes, 64-bit, logicals): let cfitsio convert.
        other => match hdu.read_col::<f64>(fptr, name) {
            Ok(values) => ColumnData::Float(values),
            Err(_) => match hdu.read_col::<String>(fptr, name) {
                Ok(values) => ColumnData::Text(trimmed(values)),
                Err(e) => {
                    log::warn!("Skipping column '{name}' of type {other:?}: {e}");
                    return Ok(None);
                }
            },
        },
    };
    Ok(Some(data))
}

/// cfitsio hands `TNULLn` cells back verbatim; widen to floats with NaN there.
fn with_null_sentinel(values: Vec<i64>, null: Option<i64>) -> ColumnData {
    match null {
        Some(null) if values.contains(&null) => ColumnData::Float(
            values
                .into_iter()
                .map(|v| if v == null { f64::NAN } else { v as f64 })
                .collect(),
        ),
        _ => ColumnData::Integer(values),
    }
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|s| s.trim_end().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file: every top-level primitive column becomes a table
/// column. The optional `unit` field metadata entry becomes the column unit.
fn load_parquet(file: File) -> Result<CatalogueTable> {
    let parquet_error =
        |what: &str, e: &dyn std::fmt::Display| CatalogueError::Format(format!("{what}: {e}"));

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parquet_error("reading parquet metadata", &e))?;
    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| parquet_error("building parquet reader", &e))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| parquet_error("reading parquet record batch", &e))?;
    let batch = concat_batches(&schema, &batches)
        .map_err(|e| parquet_error("joining parquet record batches", &e))?;

    let columns = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| {
            let mut column = Column::new(field.name().clone(), arrow_column(field, array)?);
            column.unit = field.metadata().get("unit").cloned();
            Ok(column)
        })
        .collect::<Result<Vec<_>>>()?;

    CatalogueTable::new(columns)
}

/// Convert one Arrow array into typed column data.
fn arrow_column(field: &Field, array: &ArrayRef) -> Result<ColumnData> {
    let cast_to = |to: &DataType| {
        cast(array.as_ref(), to).map_err(|e| {
            CatalogueError::Format(format!("column '{}': {e}", field.name()))
        })
    };

    let data = match field.data_type() {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let values = cast_to(&DataType::Float64)?;
            ColumnData::Float(
                values
                    .as_primitive::<Float64Type>()
                    .iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect(),
            )
        }
        dt if dt.is_integer() => {
            let values = cast_to(&DataType::Int64)?;
            let ints = values.as_primitive::<Int64Type>();
            if ints.null_count() > 0 {
                ColumnData::Float(ints.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect())
            } else {
                ColumnData::Integer(ints.values().to_vec())
            }
        }
        DataType::Boolean => ColumnData::Bool(
            array
                .as_boolean()
                .iter()
                .map(|v| v.unwrap_or(false))
                .collect(),
        ),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let values = cast_to(&DataType::Utf8)?;
            ColumnData::Text(
                values
                    .as_string::<i32>()
                    .iter()
                    .map(|v| v.unwrap_or("").to_string())
                    .collect(),
            )
        }
        other => {
            return Err(CatalogueError::Format(format!(
                "column '{}' has unsupported type {other:?}",
                field.name()
            )));
        }
    };
    Ok(data)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per source.
/// Column types are inferred from the cells.
fn load_csv(file: File) -> Result<CatalogueTable> {
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CatalogueError::Format(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| CatalogueError::Format(format!("CSV row {row_no}: {e}")))?;

        let row: BTreeMap<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.clone(), guess_value_type(cell)))
            .collect();
        records.push(row);
    }

    CatalogueTable::from_records(&records, &headers)
}

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, e.g. `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "WDJ_name": "WDJ000006.13+163313.40", "Pwd": 0.98, "SDSS_spec": 1 },
///   ...
/// ]
/// ```
fn load_json(file: File) -> Result<CatalogueTable> {
    let root: JsonValue = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CatalogueError::Format(format!("parsing JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| CatalogueError::Format("expected top-level JSON array".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    // Column order follows the file (serde_json keeps key order).
    let mut order: Vec<String> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| CatalogueError::Format(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !order.contains(key) {
                order.push(key.clone());
            }
        }
        records.push(
            obj.iter()
                .map(|(key, val)| (key.clone(), json_to_value(val)))
                .collect::<BTreeMap<_, _>>(),
        );
    }

    CatalogueTable::from_records(&records, &order)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.fits")).unwrap_err();
        match err {
            CatalogueError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "catalogue.xlsx", "");
        assert!(matches!(
            load_file(&path).unwrap_err(),
            CatalogueError::Format(_)
        ));
    }

    #[test]
    fn garbage_fits_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "broken.fits", "this is not a FITS file");
        assert!(matches!(
            load_file(&path).unwrap_err(),
            CatalogueError::Format(_)
        ));
    }

    #[test]
    fn csv_columns_get_inferred_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "wd.csv",
            "WDJ_name,Pwd,SDSS_spec,sdss_clean,mass_H\n\
             WDJ0001,0.9,2,1,0.6\n\
             WDJ0002,0.5,0,0,\n",
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(
            table.column_names(),
            vec!["WDJ_name", "Pwd", "SDSS_spec", "sdss_clean", "mass_H"]
        );
        assert_eq!(
            table.column("SDSS_spec").unwrap().data,
            ColumnData::Integer(vec![2, 0])
        );
        assert_eq!(table.value("WDJ_name", 1).unwrap(), Value::String("WDJ0002".into()));

        let mass = table.numeric("mass_H").unwrap();
        assert_eq!(mass[0], 0.6);
        assert!(mass[1].is_nan());
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "wd.json",
            r#"[{"Pwd": 0.9, "SDSS_spec": 2, "sdss_clean": 1},
                {"Pwd": 0.4, "SDSS_spec": 0, "sdss_clean": 0}]"#,
        );

        let table = load_file(&path).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.numeric("Pwd").unwrap(), vec![0.9, 0.4]);
        assert_eq!(
            table.column("sdss_clean").unwrap().data,
            ColumnData::Integer(vec![1, 0])
        );
    }

    #[test]
    fn json_columns_keep_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "wd.json",
            r#"[{"WDJ_name": "WDJ0001", "Pwd": 0.9, "sdss_clean": 1},
                {"WDJ_name": "WDJ0002", "Pwd": 0.4, "sdss_clean": 0, "SDSS_spec": 3}]"#,
        );

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["WDJ_name", "Pwd", "sdss_clean", "SDSS_spec"]
        );
        assert!(table.numeric("SDSS_spec").unwrap()[0].is_nan());
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "wd.json", r#"{"Pwd": 0.9}"#);
        assert!(matches!(
            load_file(&path).unwrap_err(),
            CatalogueError::Format(_)
        ));
    }

    #[test]
    fn fits_binary_table_is_read_from_first_extension() {
        use fitsio::tables::ColumnDescription;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wd.fits");
        {
            let mut fptr = FitsFile::create(&path).open().unwrap();
            let columns = [
                ColumnDescription::new("Pwd")
                    .with_type(ColumnDataType::Double)
                    .create()
                    .unwrap(),
                ColumnDescription::new("SDSS_spec")
                    .with_type(ColumnDataType::Int)
                    .create()
                    .unwrap(),
                ColumnDescription::new("mass_H")
                    .with_type(ColumnDataType::Double)
                    .create()
                    .unwrap(),
            ];
            let hdu = fptr.create_table("WD".to_string(), &columns).unwrap();
            hdu.write_col(&mut fptr, "Pwd", &[0.9f64, 0.5]).unwrap();
            hdu.write_col(&mut fptr, "SDSS_spec", &[2i32, 0]).unwrap();
            hdu.write_col(&mut fptr, "mass_H", &[0.6f64, 0.7]).unwrap();
            hdu.write_key(&mut fptr, "TUNIT3", "Msun").unwrap();
        }

        let table = load_file(&path).unwrap();
        assert_eq!(table.column_names(), vec!["Pwd", "SDSS_spec", "mass_H"]);
        assert_eq!(table.numeric("Pwd").unwrap(), vec![0.9, 0.5]);
        assert_eq!(table.numeric("SDSS_spec").unwrap(), vec![2.0, 0.0]);
        assert_eq!(table.column("mass_H").unwrap().unit.as_deref(), Some("Msun"));
        assert_eq!(table.column("Pwd").unwrap().unit, None);
    }

    fn fits_table(path: &Path, columns: &[ConcreteColumnDescription]) -> (FitsFile, FitsHdu) {
        let mut fptr = FitsFile::create(path).open().unwrap();
        let hdu = fptr.create_table("WD".to_string(), columns).unwrap();
        (fptr, hdu)
    }

    fn fits_column(name: &str, typ: ColumnDataType) -> ConcreteColumnDescription {
        fitsio::tables::ColumnDescription::new(name)
            .with_type(typ)
            .create()
            .unwrap()
    }

    #[test]
    fn fits_64_bit_integers_are_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.fits");
        {
            let (mut fptr, hdu) = fits_table(
                &path,
                &[
                    fits_column("source_id", ColumnDataType::LongLong),
                    fits_column("Pwd", ColumnDataType::Double),
                ],
            );
            hdu.write_col(&mut fptr, "source_id", &[1234567890123456789i64, 2])
                .unwrap();
            hdu.write_col(&mut fptr, "Pwd", &[0.9f64, 0.5]).unwrap();
        }

        let table = load_file(&path).unwrap();
        assert_eq!(
            table.column("source_id").unwrap().data,
            ColumnData::Integer(vec![1234567890123456789, 2])
        );
    }

    #[test]
    fn fits_null_sentinels_become_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nulls.fits");
        {
            let (mut fptr, hdu) = fits_table(
                &path,
                &[
                    fits_column("Pwd", ColumnDataType::Double),
                    fits_column("SDSS_spec", ColumnDataType::Int),
                    fits_column("sdss_clean", ColumnDataType::Int),
                ],
            );
            hdu.write_col(&mut fptr, "Pwd", &[0.9f64, 0.8]).unwrap();
            hdu.write_col(&mut fptr, "SDSS_spec", &[1i32, 99]).unwrap();
            hdu.write_col(&mut fptr, "sdss_clean", &[1i32, 1]).unwrap();
            hdu.write_key(&mut fptr, "TNULL2", 99i64).unwrap();
            // Declared but never used: the column stays integer.
            hdu.write_key(&mut fptr, "TNULL3", -1i64).unwrap();
        }

        let table = load_file(&path).unwrap();
        let spec = table.numeric("SDSS_spec").unwrap();
        assert_eq!(spec[0], 1.0);
        assert!(spec[1].is_nan());
        assert!(matches!(
            table.column("SDSS_spec").unwrap().data,
            ColumnData::Float(_)
        ));
        assert_eq!(
            table.column("sdss_clean").unwrap().data,
            ColumnData::Integer(vec![1, 1])
        );
    }

    #[test]
    fn null_sentinel_only_widens_when_present() {
        assert_eq!(
            with_null_sentinel(vec![1, 2], Some(-999)),
            ColumnData::Integer(vec![1, 2])
        );
        assert_eq!(with_null_sentinel(vec![1, 2], None), ColumnData::Integer(vec![1, 2]));
        let widened = with_null_sentinel(vec![-999, 2], Some(-999));
        assert_eq!(widened.f64_at(1), Some(2.0));
        assert!(matches!(widened, ColumnData::Float(ref v) if v[0].is_nan()));
    }

    #[test]
    fn fits_vector_columns_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vector.fits");
        {
            let flux = fitsio::tables::ColumnDescription::new("flux")
                .with_type(ColumnDataType::Double)
                .that_repeats(3)
                .create()
                .unwrap();
            let (mut fptr, hdu) = fits_table(
                &path,
                &[
                    fits_column("Pwd", ColumnDataType::Double),
                    flux,
                    fits_column("WDJ_name", ColumnDataType::String),
                ],
            );
            hdu.write_col(&mut fptr, "Pwd", &[0.9f64, 0.5]).unwrap();
        }

        let table = load_file(&path).unwrap();
        assert_eq!(table.column_names(), vec!["Pwd", "WDJ_name"]);
        assert_eq!(table.num_rows(), 2);
    }
}
