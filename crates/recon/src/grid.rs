use crate::error::ReconError;
use crate::model::{Cell, RawSheet, Reading, RowKey, SeriesColumn, SeriesTable};

/// Separates the plant identifier from annotation text in a header cell,
/// e.g. `"CETR:Demanda Ativa Del"`.
pub const PLANT_DELIMITER: char = ':';

/// Plant identifier of a header cell: the text before the first delimiter.
pub fn plant_id(header: &Cell) -> String {
    let text = header.to_string();
    let id = match text.split_once(PLANT_DELIMITER) {
        Some((left, _)) => left,
        None => text.as_str(),
    };
    id.trim().to_string()
}

/// Turn a raw grid into a series table.
///
/// Row 0 (minus its first cell) names the plants, column 0 (minus its first
/// cell) holds the row keys, and every other cell is a reading. Row order is
/// kept as-is.
pub fn normalize(raw: &RawSheet) -> Result<SeriesTable, ReconError> {
    let header = raw
        .rows
        .first()
        .ok_or_else(|| ReconError::EmptySheet("no header row".into()))?;

    if header.len() < 2 {
        return Err(ReconError::EmptySheet("no plant columns".into()));
    }
    if raw.rows.len() < 2 {
        return Err(ReconError::EmptySheet("no data rows".into()));
    }

    let width = header.len();
    let mut columns: Vec<SeriesColumn> = Vec::with_capacity(width - 1);
    for (col, cell) in header.iter().enumerate().skip(1) {
        let plant = plant_id(cell);
        if plant.is_empty() {
            return Err(ReconError::EmptyPlantId { column: col });
        }
        if columns.iter().any(|c| c.plant == plant) {
            return Err(ReconError::DuplicatePlant(plant));
        }
        columns.push(SeriesColumn {
            plant,
            values: Vec::with_capacity(raw.rows.len() - 1),
        });
    }

    let mut row_keys = Vec::with_capacity(raw.rows.len() - 1);
    for (row_idx, row) in raw.rows.iter().enumerate().skip(1) {
        if row.len() != width {
            return Err(ReconError::RaggedRow {
                row: row_idx,
                expected: width,
                found: row.len(),
            });
        }
        row_keys.push(RowKey::from(&row[0]));
        for (column, cell) in columns.iter_mut().zip(&row[1..]) {
            column.values.push(Reading::from(cell));
        }
    }

    log::debug!(
        "normalized sheet: {} rows x {} plants",
        row_keys.len(),
        columns.len()
    );

    Ok(SeriesTable { row_keys, columns })
}
