use serde::{Deserialize, Serialize};

use super::model::{CatalogueTable, ColumnData};
use crate::error::Result;

/// Probability of being a white dwarf (GF+21, Sec. 2).
pub const PWD_COLUMN: &str = "Pwd";
/// Number of SDSS spectra available for the source (GF+21 Table 2, row 160).
pub const SDSS_SPEC_COLUMN: &str = "SDSS_spec";
/// Clean SDSS photometry flag; 1 means clean (GF+21 Table 2, row 148).
pub const SDSS_CLEAN_COLUMN: &str = "sdss_clean";

// ---------------------------------------------------------------------------
// Quality cuts
// ---------------------------------------------------------------------------

/// The three quality cuts selecting high-confidence white dwarf candidates.
///
/// With the defaults, the GF+21 catalogue (1,280,266 sources, retrieved
/// 2023-04-20) yields 359,074 sources with `Pwd >= 0.75`, of which 25,632
/// have SDSS spectroscopy. Higher `pwd` gives cleaner but less complete sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateCriteria {
    /// Minimum accepted probability of being a white dwarf.
    pub pwd: f64,
    /// Keep only sources with at least one SDSS spectrum.
    pub sdss_spec: bool,
    /// Keep only sources with clean SDSS photometry.
    pub sdss_clean: bool,
}

impl Default for CandidateCriteria {
    fn default() -> Self {
        Self {
            pwd: 0.75,
            sdss_spec: true,
            sdss_clean: true,
        }
    }
}

impl CandidateCriteria {
    /// Criteria that keep every row whose `Pwd` is a number.
    pub fn permissive() -> Self {
        Self {
            pwd: 0.0,
            sdss_spec: false,
            sdss_clean: false,
        }
    }
}

/// Return indices of rows that pass all enabled cuts, in table order.
///
/// Columns are only required for the cuts that are enabled. A NaN `Pwd`
/// never passes.
pub fn candidate_indices(table: &CatalogueTable, criteria: &CandidateCriteria) -> Result<Vec<usize>> {
    let pwd = table.numeric_column(PWD_COLUMN)?;
    let sdss_spec = criteria
        .sdss_spec
        .then(|| table.numeric_column(SDSS_SPEC_COLUMN))
        .transpose()?;
    let sdss_clean = criteria
        .sdss_clean
        .then(|| table.numeric_column(SDSS_CLEAN_COLUMN))
        .transpose()?;

    let passes = |col: Option<&ColumnData>, row: usize, test: fn(f64) -> bool| {
        col.map_or(true, |c| c.f64_at(row).is_some_and(test))
    };

    Ok((0..table.num_rows())
        .filter(|&row| pwd.f64_at(row).is_some_and(|p| p >= criteria.pwd))
        .filter(|&row| passes(sdss_spec, row, |n| n >= 1.0))
        .filter(|&row| passes(sdss_clean, row, |flag| flag == 1.0))
        .collect())
}

/// Select and extract high-confidence white dwarf candidates.
///
/// Returns a new table with the passing rows and every original column; the
/// input table is not modified.
pub fn extract_high_confidence_candidates(
    table: &CatalogueTable,
    criteria: &CandidateCriteria,
) -> Result<CatalogueTable> {
    let indices = candidate_indices(table, criteria)?;
    log::info!(
        "Kept {} of {} sources (Pwd >= {}, SDSS spectroscopy: {}, clean SDSS photometry: {})",
        indices.len(),
        table.num_rows(),
        criteria.pwd,
        criteria.sdss_spec,
        criteria.sdss_clean
    );
    Ok(table.take_rows(&indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::model::Column;
    use crate::error::CatalogueError;

    fn catalogue() -> CatalogueTable {
        CatalogueTable::new(vec![
            Column::new(
                "Pwd",
                ColumnData::Float(vec![0.9, 0.5, 0.75, 0.99, 0.8, 0.1, 1.0]),
            ),
            Column::new("SDSS_spec", ColumnData::Integer(vec![2, 0, 1, 0, 3, 1, 1])),
            Column::new("sdss_clean", ColumnData::Integer(vec![1, 0, 1, 1, 0, 1, 1])),
            Column::new(
                "mass_H",
                ColumnData::Float(vec![0.6, 0.7, 0.55, 0.8, 1.1, 0.4, 0.62]),
            )
            .with_unit("Msun"),
        ])
        .unwrap()
    }

    #[test]
    fn default_cuts_match_catalogue_conventions() {
        let criteria = CandidateCriteria::default();
        assert_eq!(criteria.pwd, 0.75);
        assert!(criteria.sdss_spec);
        assert!(criteria.sdss_clean);

        assert_eq!(candidate_indices(&catalogue(), &criteria).unwrap(), vec![0, 2, 6]);
    }

    #[test]
    fn every_kept_row_satisfies_all_cuts() {
        let table = extract_high_confidence_candidates(&catalogue(), &CandidateCriteria::default())
            .unwrap();
        let pwd = table.numeric("Pwd").unwrap();
        let spec = table.numeric("SDSS_spec").unwrap();
        let clean = table.numeric("sdss_clean").unwrap();
        for row in 0..table.num_rows() {
            assert!(pwd[row] >= 0.75);
            assert!(spec[row] >= 1.0);
            assert_eq!(clean[row], 1.0);
        }
        assert_eq!(table.column("mass_H").unwrap().unit.as_deref(), Some("Msun"));
    }

    #[test]
    fn permissive_cuts_return_the_input() {
        let table = catalogue();
        let kept = extract_high_confidence_candidates(&table, &CandidateCriteria::permissive())
            .unwrap();
        assert_eq!(kept, table);
    }

    #[test]
    fn tightening_pwd_never_adds_rows() {
        let table = catalogue();
        let mut previous = usize::MAX;
        for step in 0..=20 {
            let criteria = CandidateCriteria {
                pwd: step as f64 * 0.05,
                ..CandidateCriteria::permissive()
            };
            let kept = candidate_indices(&table, &criteria).unwrap().len();
            assert!(kept <= previous);
            previous = kept;
        }
    }

    #[test]
    fn enabling_flags_never_adds_rows() {
        let table = catalogue();
        let count = |sdss_spec, sdss_clean| {
            let criteria = CandidateCriteria {
                pwd: 0.5,
                sdss_spec,
                sdss_clean,
            };
            candidate_indices(&table, &criteria).unwrap().len()
        };
        assert!(count(true, false) <= count(false, false));
        assert!(count(false, true) <= count(false, false));
        assert!(count(true, true) <= count(true, false));
        assert!(count(true, true) <= count(false, true));
    }

    #[test]
    fn out_of_range_threshold_is_degenerate_not_an_error() {
        let table = catalogue();
        let all = CandidateCriteria {
            pwd: -1.0,
            ..CandidateCriteria::permissive()
        };
        let none = CandidateCriteria {
            pwd: 1.5,
            ..CandidateCriteria::permissive()
        };
        assert_eq!(candidate_indices(&table, &all).unwrap().len(), 7);
        assert!(candidate_indices(&table, &none).unwrap().is_empty());
    }

    #[test]
    fn input_is_not_mutated() {
        let table = catalogue();
        let before = table.clone();
        let _ = extract_high_confidence_candidates(&table, &CandidateCriteria::default()).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn nan_probability_never_passes() {
        let table = CatalogueTable::new(vec![Column::new(
            "Pwd",
            ColumnData::Float(vec![f64::NAN, 0.9]),
        )])
        .unwrap();
        assert_eq!(
            candidate_indices(&table, &CandidateCriteria::permissive()).unwrap(),
            vec![1]
        );
    }

    #[test]
    fn columns_for_disabled_cuts_are_not_required() {
        let table = CatalogueTable::new(vec![Column::new("Pwd", ColumnData::Float(vec![0.9]))])
            .unwrap();

        let err = candidate_indices(&table, &CandidateCriteria::default()).unwrap_err();
        assert!(matches!(err, CatalogueError::MissingColumn(name) if name == "SDSS_spec"));

        let criteria = CandidateCriteria {
            sdss_spec: false,
            sdss_clean: false,
            ..CandidateCriteria::default()
        };
        assert_eq!(candidate_indices(&table, &criteria).unwrap(), vec![0]);
    }

    #[test]
    fn missing_probability_column_is_reported() {
        let table = CatalogueTable::new(vec![Column::new(
            "SDSS_spec",
            ColumnData::Integer(vec![1]),
        )])
        .unwrap();
        let err = extract_high_confidence_candidates(&table, &CandidateCriteria::permissive())
            .unwrap_err();
        assert!(matches!(err, CatalogueError::MissingColumn(name) if name == "Pwd"));
    }

    #[test]
    fn criteria_deserialize_with_defaults() {
        let criteria: CandidateCriteria = serde_json::from_str(r#"{"pwd": 0.9}"#).unwrap();
        assert_eq!(
            criteria,
            CandidateCriteria {
                pwd: 0.9,
                ..CandidateCriteria::default()
            }
        );
    }
}
