use std::collections::HashMap;

use crate::error::ReconError;
use crate::model::{
    candidate_column, reference_column, status_column, CellStatus, ComparisonTable, Reading,
    ReportCell, ReportColumn, RowKey, SeriesTable,
};

/// Default generation tolerance in MW.
pub const DEFAULT_TOLERANCE: f64 = 3.0;

/// How candidate rows are paired with reference rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Row `i` of the reference pairs with row `i` of the candidate. Both
    /// tables must have the same row count.
    #[default]
    Positional,
    /// Rows pair by the display form of their row key.
    RowKey,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    pub tolerance: f64,
    pub alignment: Alignment,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            alignment: Alignment::Positional,
        }
    }
}

/// Compare positionally aligned tables under `tolerance`.
pub fn compare(
    reference: &SeriesTable,
    candidate: &SeriesTable,
    tolerance: f64,
) -> Result<ComparisonTable, ReconError> {
    compare_with(
        reference,
        candidate,
        &CompareOptions {
            tolerance,
            alignment: Alignment::Positional,
        },
    )
}

/// Build the comparison table: for every reference plant, its reference
/// readings, the matching candidate readings and a status column. Columns are
/// sorted by name.
pub fn compare_with(
    reference: &SeriesTable,
    candidate: &SeriesTable,
    options: &CompareOptions,
) -> Result<ComparisonTable, ReconError> {
    let tolerance = options.tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ReconError::InvalidTolerance(tolerance));
    }

    let row_map = match options.alignment {
        Alignment::Positional => positional_rows(reference, candidate)?,
        Alignment::RowKey => keyed_rows(reference, candidate)?,
    };

    for extra in candidate.plants().filter(|p| reference.column(p).is_none()) {
        log::debug!("candidate plant '{extra}' has no reference column, ignored");
    }

    let mut columns = Vec::with_capacity(reference.columns.len() * 3);
    for ref_col in &reference.columns {
        let plant = &ref_col.plant;
        let cand_col = candidate
            .column(plant)
            .ok_or_else(|| ReconError::MissingPlant(plant.clone()))?;
        if ref_col.values.len() != reference.row_count()
            || cand_col.values.len() != candidate.row_count()
        {
            return Err(ReconError::RowCountMismatch {
                reference: ref_col.values.len(),
                candidate: cand_col.values.len(),
            });
        }

        let mut cand_cells = Vec::with_capacity(row_map.len());
        let mut status_cells = Vec::with_capacity(row_map.len());
        for (i, &j) in row_map.iter().enumerate() {
            let ref_value = &ref_col.values[i];
            let cand_value = &cand_col.values[j];
            let status = cell_status(ref_value, cand_value, tolerance).map_err(|value| {
                ReconError::NonNumeric {
                    plant: plant.clone(),
                    row: reference.row_keys[i].to_string(),
                    value,
                }
            })?;
            cand_cells.push(ReportCell::Reading(cand_value.clone()));
            status_cells.push(ReportCell::Status(status));
        }

        columns.push(ReportColumn {
            name: reference_column(plant),
            cells: ref_col.values.iter().cloned().map(ReportCell::Reading).collect(),
        });
        columns.push(ReportColumn {
            name: candidate_column(plant),
            cells: cand_cells,
        });
        columns.push(ReportColumn {
            name: status_column(plant),
            cells: status_cells,
        });
    }

    columns.sort_by(|a, b| a.name.cmp(&b.name));

    log::info!(
        "compared {} plants over {} rows (tolerance {tolerance})",
        reference.columns.len(),
        reference.row_count()
    );

    Ok(ComparisonTable {
        row_keys: reference.row_keys.clone(),
        columns,
    })
}

/// Verdict for one reference/candidate pair. `Err` carries the offending
/// non-numeric text.
pub fn cell_status(
    reference: &Reading,
    candidate: &Reading,
    tolerance: f64,
) -> Result<CellStatus, String> {
    match (reference, candidate) {
        (Reading::Text(s), _) | (_, Reading::Text(s)) => Err(s.clone()),
        (Reading::Value(a), Reading::Value(b)) => {
            if (a - b).abs() <= tolerance {
                Ok(CellStatus::Success)
            } else {
                Ok(CellStatus::Mismatch(round3(*a)))
            }
        }
        (Reading::Value(a), Reading::Missing) => Ok(CellStatus::Mismatch(round3(*a))),
        (Reading::Missing, _) => Ok(CellStatus::Missing),
    }
}

/// Round to 3 decimal places, working from the exact binary value.
///
/// `1.0005` is stored just below the tie and rounds to `1.0`; scaling by
/// 1000 first would push it onto the tie and up to `1.001`.
pub fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}

fn positional_rows(
    reference: &SeriesTable,
    candidate: &SeriesTable,
) -> Result<Vec<usize>, ReconError> {
    if reference.row_count() != candidate.row_count() {
        return Err(ReconError::RowCountMismatch {
            reference: reference.row_count(),
            candidate: candidate.row_count(),
        });
    }
    Ok((0..reference.row_count()).collect())
}

fn keyed_rows(reference: &SeriesTable, candidate: &SeriesTable) -> Result<Vec<usize>, ReconError> {
    let cand_index = index_keys("candidate", &candidate.row_keys)?;
    index_keys("reference", &reference.row_keys)?;

    let map = reference
        .row_keys
        .iter()
        .map(|key| {
            let key = key.to_string();
            cand_index
                .get(&key)
                .copied()
                .ok_or(ReconError::RowKeyMismatch(key))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if candidate.row_count() > reference.row_count() {
        log::debug!(
            "{} candidate rows have no reference row, ignored",
            candidate.row_count() - reference.row_count()
        );
    }
    Ok(map)
}

fn index_keys(side: &'static str, keys: &[RowKey]) -> Result<HashMap<String, usize>, ReconError> {
    let mut index = HashMap::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        let key = key.to_string();
        if index.insert(key.clone(), i).is_some() {
            return Err(ReconError::DuplicateRowKey { side, key });
        }
    }
    Ok(index)
}
