use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use super::model::{CatalogueTable, ColumnData};
use crate::error::{CatalogueError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a table to a file.  Dispatch by extension (`.csv`, `.parquet`, `.pq`).
pub fn write_file(table: &CatalogueTable, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(table, path)?,
        "parquet" | "pq" => write_parquet(table, path)?,
        other => {
            return Err(CatalogueError::Format(format!(
                "cannot export to .{other}; use .csv or .parquet"
            )))
        }
    }
    log::info!(
        "Wrote {} rows x {} columns to {}",
        table.num_rows(),
        table.num_columns(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Arrow conversion
// ---------------------------------------------------------------------------

/// Convert the table into a single Arrow record batch. Units travel as the
/// `unit` field metadata entry.
pub fn to_record_batch(table: &CatalogueTable) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for col in table.columns() {
        let (data_type, array): (DataType, ArrayRef) = match &col.data {
            ColumnData::Float(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
            ColumnData::Integer(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
            ColumnData::Bool(v) => (DataType::Boolean, Arc::new(BooleanArray::from(v.clone()))),
            ColumnData::Text(v) => (
                DataType::Utf8,
                Arc::new(StringArray::from(
                    v.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                )),
            ),
        };

        let mut field = Field::new(col.name.as_str(), data_type, false);
        if let Some(unit) = &col.unit {
            field = field.with_metadata(HashMap::from([("unit".to_string(), unit.clone())]));
        }
        fields.push(field);
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(|e| CatalogueError::Format(format!("building record batch: {e}")))
}

/// Render the first `rows` rows as an ASCII table, for logging.
pub fn preview(table: &CatalogueTable, rows: usize) -> Result<String> {
    let head: Vec<usize> = (0..table.num_rows().min(rows)).collect();
    let batch = to_record_batch(&table.take_rows(&head))?;
    pretty_format_batches(&[batch])
        .map(|formatted| formatted.to_string())
        .map_err(|e| CatalogueError::Format(format!("formatting preview: {e}")))
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_parquet(table: &CatalogueTable, path: &Path) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = File::create(path).map_err(|e| CatalogueError::io(path, e))?;
    let parquet_error = |e: parquet::errors::ParquetError| {
        CatalogueError::Format(format!("writing {}: {e}", path.display()))
    };

    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).map_err(parquet_error)?;
    writer.write(&batch).map_err(parquet_error)?;
    writer.close().map_err(parquet_error)?;
    Ok(())
}

fn write_csv(table: &CatalogueTable, path: &Path) -> Result<()> {
    let csv_error = |e: csv::Error| {
        CatalogueError::Format(format!("writing {}: {e}", path.display()))
    };

    let file = File::create(path).map_err(|e| CatalogueError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(table.column_names())
        .map_err(csv_error)?;

    for row in 0..table.num_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|col| {
                let cell = col.data.value(row);
                match cell.as_f64() {
                    Some(v) if v.is_nan() => String::new(),
                    _ => cell.to_string(),
                }
            })
            .collect();
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer
        .flush()
        .map_err(|e| CatalogueError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::loader::load_file;
    use crate::catalogue::model::Column;

    fn table() -> CatalogueTable {
        CatalogueTable::new(vec![
            Column::new("WDJ_name", ColumnData::Text(vec!["WDJ0001".into(), "WDJ0002".into()])),
            Column::new("Pwd", ColumnData::Float(vec![0.9, f64::NAN])),
            Column::new("SDSS_spec", ColumnData::Integer(vec![2, 0])),
            Column::new("mass_H", ColumnData::Float(vec![0.6, 0.7])).with_unit("Msun"),
        ])
        .unwrap()
    }

    #[test]
    fn parquet_export_keeps_types_and_units() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.parquet");
        write_file(&table(), &path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.column_names(), table().column_names());
        assert_eq!(loaded.column("SDSS_spec").unwrap().data, ColumnData::Integer(vec![2, 0]));
        assert_eq!(loaded.column("mass_H").unwrap().unit.as_deref(), Some("Msun"));
        assert!(loaded.numeric("Pwd").unwrap()[1].is_nan());
    }

    #[test]
    fn csv_export_writes_nan_as_empty_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        write_file(&table(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "WDJ_name,Pwd,SDSS_spec,mass_H");
        assert_eq!(lines[1], "WDJ0001,0.9,2,0.6");
        assert_eq!(lines[2], "WDJ0002,,0,0.7");
    }

    #[test]
    fn unsupported_export_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_file(&table(), &dir.path().join("candidates.fits")).unwrap_err();
        assert!(matches!(err, CatalogueError::Format(_)));
    }

    #[test]
    fn preview_shows_header_and_rows() {
        let text = preview(&table(), 1).unwrap();
        assert!(text.contains("WDJ_name"));
        assert!(text.contains("WDJ0001"));
        assert!(!text.contains("WDJ0002"));
    }
}
