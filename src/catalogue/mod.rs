//! Catalogue layer: table model, loading, quality cuts and export.
//!
//! Architecture:
//! ```text
//!  .fits / .parquet / .csv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → CatalogueTable   (unit warnings silenced)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ CatalogueTable │  named, row-aligned, typed columns
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  Pwd / SDSS_spec / sdss_clean cuts → new table
//!   └──────────┘
//!        │
//!        ├──▶ writer  (csv / parquet export)
//!        ▼
//!      plot
//! ```

pub mod diagnostics;
pub mod filter;
pub mod loader;
pub mod model;
pub mod units;
pub mod writer;

pub use filter::{extract_high_confidence_candidates, CandidateCriteria};
pub use loader::{load_default, load_file, DEFAULT_CATALOGUE};
pub use model::{CatalogueTable, Column, ColumnData, Value};
