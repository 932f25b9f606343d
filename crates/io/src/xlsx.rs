// Excel input (xlsx, xls, xlsb, ods)
//
// Only the first worksheet is read. Its grid keeps absolute positions: row 0
// is spreadsheet row 1 and column 0 is column A, even when the used range
// starts further in.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use genverify_recon::model::{Cell, RawSheet, SeriesTable};
use genverify_recon::{merge_plants, normalize, MergeRule};

use crate::error::IoError;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Read a series spreadsheet from disk, merging plants when `merge` is set.
pub fn read_series(path: &Path, merge: Option<&MergeRule>) -> Result<SeriesTable, IoError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| IoError::Open(format!("{}: {}", path.display(), e)))?;
    let raw = first_sheet(&mut workbook)?;
    build_series(&raw, merge)
}

/// Read a series spreadsheet held in memory (an upload).
pub fn read_series_bytes(bytes: &[u8], merge: Option<&MergeRule>) -> Result<SeriesTable, IoError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IoError::Open(e.to_string()))?;
    let raw = first_sheet(&mut workbook)?;
    build_series(&raw, merge)
}

fn build_series(raw: &RawSheet, merge: Option<&MergeRule>) -> Result<SeriesTable, IoError> {
    let mut table = normalize(raw)?;
    if let Some(rule) = merge {
        merge_plants(&mut table, rule)?;
    }
    log::info!(
        "read {} rows for {} plants",
        table.row_count(),
        table.columns.len()
    );
    Ok(table)
}

pub(crate) fn first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<RawSheet, IoError> {
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IoError::NoSheets)?
        .map_err(|e| IoError::Read(e.to_string()))?;
    Ok(raw_from_range(&range))
}

/// Materialize a calamine range as an A1-anchored grid. Trailing rows with no
/// content are dropped.
pub(crate) fn raw_from_range(range: &Range<Data>) -> RawSheet {
    let Some((start_row, start_col)) = range.start() else {
        return RawSheet::default();
    };
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let width = start_col + range.width();

    let mut rows: Vec<Vec<Cell>> = vec![vec![Cell::Empty; width]; start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }

    while rows.last().is_some_and(|r| r.iter().all(Cell::is_empty)) {
        rows.pop();
    }

    RawSheet::new(rows)
}

pub(crate) fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            serial_to_datetime(serial)
                .map(Cell::DateTime)
                .unwrap_or(Cell::Number(serial))
        }
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        other => Cell::Text(other.to_string()),
    }
}

fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Convert a 1900-system spreadsheet serial (days since 1899-12-30) into a
/// date-time, rounded to the millisecond.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * MS_PER_DAY).round() as i64;
    serial_epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// Inverse of [`serial_to_datetime`].
pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    (*dt - serial_epoch()).num_milliseconds() as f64 / MS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_round_trip() {
        let dt = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        let serial = datetime_to_serial(&dt);
        assert!((serial - 45413.5625).abs() < 1e-9);
        assert_eq!(serial_to_datetime(serial), Some(dt));
    }

    #[test]
    fn time_only_serial() {
        let dt = serial_to_datetime(0.5).unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "1899-12-30 12:00");
        assert_eq!(serial_to_datetime(-1.0), None);
    }

    #[test]
    fn cell_conversion() {
        assert_eq!(to_cell(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(to_cell(&Data::Float(1.25)), Cell::Number(1.25));
        assert_eq!(to_cell(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(to_cell(&Data::String("CETR".into())), Cell::Text("CETR".into()));
        assert_eq!(to_cell(&Data::Bool(true)), Cell::Bool(true));
    }

    #[test]
    fn range_anchored_at_a1() {
        let mut range: Range<Data> = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("CETR".into()));
        range.set_value((2, 1), Data::Float(3.0));
        range.set_value((2, 2), Data::Float(4.0));

        let raw = raw_from_range(&range);
        assert_eq!(raw.rows.len(), 3);
        assert!(raw.rows[0].iter().all(Cell::is_empty));
        assert_eq!(raw.rows[1][1], Cell::Text("CETR".into()));
        assert_eq!(raw.rows[2], [Cell::Empty, Cell::Number(3.0), Cell::Number(4.0)]);
    }

    #[test]
    fn trailing_blank_rows_dropped() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((0, 1), Data::String("CETR".into()));
        range.set_value((1, 0), Data::String("00:30".into()));
        range.set_value((1, 1), Data::Float(1.0));

        let raw = raw_from_range(&range);
        assert_eq!(raw.rows.len(), 2);
    }

    #[test]
    fn garbage_bytes_fail_to_open() {
        let err = read_series_bytes(b"not a spreadsheet", None).unwrap_err();
        assert!(matches!(err, IoError::Open(_)));
    }
}
