use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, filtering, exporting or plotting a catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed catalogue table: {0}")]
    Format(String),

    #[error("{kind} '{value}' not available in catalogue. Available {kind}s: {allowed:?}.")]
    InvalidValue {
        kind: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Column '{0}' not found in table")]
    MissingColumn(String),

    #[error("Column '{column}' holds {found} values, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Column '{column}' has {found} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("Failed to render plot {}: {reason}", path.display())]
    Render { path: PathBuf, reason: String },
}

impl CatalogueError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogueError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = CatalogueError> = std::result::Result<T, E>;
