use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{CatalogueError, Result};

// ---------------------------------------------------------------------------
// Value – a single cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, used by row-oriented loaders and display.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnData – typed storage for one column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<f64>),
    Integer(Vec<i64>),
    Bool(Vec<bool>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Float(_) => "float",
            ColumnData::Integer(_) => "integer",
            ColumnData::Bool(_) => "bool",
            ColumnData::Text(_) => "text",
        }
    }

    /// Numeric value at `row`; `None` for text columns or out-of-range rows.
    pub fn f64_at(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Float(v) => v.get(row).copied(),
            ColumnData::Integer(v) => v.get(row).map(|&i| i as f64),
            ColumnData::Bool(v) => v.get(row).map(|&b| if b { 1.0 } else { 0.0 }),
            ColumnData::Text(_) => None,
        }
    }

    pub fn value(&self, row: usize) -> Value {
        match self {
            ColumnData::Float(v) => v.get(row).map_or(Value::Null, |&x| Value::Float(x)),
            ColumnData::Integer(v) => v.get(row).map_or(Value::Null, |&x| Value::Integer(x)),
            ColumnData::Bool(v) => v.get(row).map_or(Value::Null, |&x| Value::Bool(x)),
            ColumnData::Text(v) => v
                .get(row)
                .map_or(Value::Null, |x| Value::String(x.clone())),
        }
    }

    /// Gather the given rows, in the given order.
    fn take(&self, indices: &[usize]) -> ColumnData {
        fn gather<T: Clone>(v: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| v[i].clone()).collect()
        }
        match self {
            ColumnData::Float(v) => ColumnData::Float(gather(v, indices)),
            ColumnData::Integer(v) => ColumnData::Integer(gather(v, indices)),
            ColumnData::Bool(v) => ColumnData::Bool(gather(v, indices)),
            ColumnData::Text(v) => ColumnData::Text(gather(v, indices)),
        }
    }

    /// Build a column from loosely-typed cells, picking the narrowest type
    /// that holds all of them. Integers with nulls widen to floats (NaN).
    pub fn from_values(values: &[Value]) -> ColumnData {
        let mut kinds = BTreeSet::new();
        for v in values {
            kinds.insert(match v {
                Value::Null => continue,
                Value::Bool(_) => 0u8,
                Value::Integer(_) => 1,
                Value::Float(_) => 2,
                Value::String(_) => 3,
            });
        }
        let has_null = values.iter().any(|v| matches!(v, Value::Null));

        match (kinds.len(), kinds.iter().next().copied()) {
            (1, Some(0)) => {
                ColumnData::Bool(values.iter().map(|v| matches!(v, Value::Bool(true))).collect())
            }
            (1, Some(1)) if !has_null => ColumnData::Integer(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Integer(i) => *i,
                        _ => 0,
                    })
                    .collect(),
            ),
            _ if !kinds.is_empty() && !kinds.contains(&3) && !kinds.contains(&0) => {
                ColumnData::Float(values.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect())
            }
            (0, _) => ColumnData::Float(vec![f64::NAN; values.len()]),
            _ => ColumnData::Text(values.iter().map(|v| v.to_string()).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – named, optionally unit-tagged data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Physical unit string as found in the source (e.g. `TUNITn`).
    pub unit: Option<String>,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            unit: None,
            data,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

// ---------------------------------------------------------------------------
// CatalogueTable – row-aligned columns
// ---------------------------------------------------------------------------

/// An in-memory columnar table. All columns share one row count and column
/// names are unique. Every narrowing operation returns a fresh table.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueTable {
    columns: Vec<Column>,
    num_rows: usize,
}

impl CatalogueTable {
    /// Build a table, checking that columns are row-aligned and uniquely named.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |c| c.data.len());
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(CatalogueError::DuplicateColumn(col.name.clone()));
            }
            if col.data.len() != num_rows {
                return Err(CatalogueError::RaggedColumn {
                    column: col.name.clone(),
                    expected: num_rows,
                    found: col.data.len(),
                });
            }
        }
        Ok(CatalogueTable { columns, num_rows })
    }

    /// Build a table from row records. Column order is the order in which
    /// names are first seen; cells missing from a record are nulls.
    pub fn from_records(records: &[BTreeMap<String, Value>], order: &[String]) -> Result<Self> {
        let mut names: Vec<String> = order.to_vec();
        for rec in records {
            for key in rec.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let cells: Vec<Value> = records
                    .iter()
                    .map(|rec| rec.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                Column::new(name, ColumnData::from_values(&cells))
            })
            .collect();

        CatalogueTable::new(columns)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Names of the columns whose name contains `needle`.
    pub fn column_names_containing(&self, needle: &str) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| name.contains(needle))
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CatalogueError::MissingColumn(name.to_string()))
    }

    /// Column data that must be numeric (float, integer or bool).
    pub fn numeric_column(&self, name: &str) -> Result<&ColumnData> {
        let data = &self.column(name)?.data;
        if let ColumnData::Text(_) = data {
            return Err(CatalogueError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
                found: data.type_name(),
            });
        }
        Ok(data)
    }

    /// A numeric column widened to `f64`.
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        let data = self.numeric_column(name)?;
        Ok((0..self.num_rows)
            .map(|row| data.f64_at(row).unwrap_or(f64::NAN))
            .collect())
    }

    pub fn value(&self, name: &str, row: usize) -> Result<Value> {
        Ok(self.column(name)?.data.value(row))
    }

    /// New table holding the given rows (in the given order) and every column.
    pub fn take_rows(&self, indices: &[usize]) -> CatalogueTable {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                unit: c.unit.clone(),
                data: c.data.take(indices),
            })
            .collect();
        CatalogueTable {
            columns,
            num_rows: indices.len(),
        }
    }

    /// New table holding only the named columns, in the order given.
    pub fn select(&self, names: &[&str]) -> Result<CatalogueTable> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        CatalogueTable::new(columns)
    }
}
