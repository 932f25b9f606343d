// Styled multi-sheet report (xlsx export) and re-reading of such reports.
//
// One worksheet per plant. Column A holds the row keys, row 1 the column
// names; both bold with a thin border. The plant's status column is filled
// light green for passing cells and light red for failures.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Reader};
use genverify_recon::model::{
    is_time_only, status_column, Cell, CellStatus, PlantReport, Reading, ReportCell, RowKey,
    SUCCESS_MARKER,
};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

use crate::error::IoError;
use crate::xlsx::{datetime_to_serial, raw_from_range};

/// Fill for status cells that passed (light green).
pub const PASS_FILL: u32 = 0x90EE90;
/// Fill for status cells that failed (light red).
pub const FAIL_FILL: u32 = 0xFFCCCB;

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm";
const TIME_FORMAT: &str = "hh:mm";

struct Styles {
    header: Format,
    key: Format,
    key_datetime: Format,
    key_time: Format,
    pass: Format,
    fail: Format,
    plain: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new().set_bold().set_border(FormatBorder::Thin);
        Self {
            key: header.clone(),
            key_datetime: header.clone().set_num_format(DATETIME_FORMAT),
            key_time: header.clone().set_num_format(TIME_FORMAT),
            header,
            pass: Format::new().set_background_color(PASS_FILL),
            fail: Format::new().set_background_color(FAIL_FILL),
            plain: Format::new(),
        }
    }
}

/// Render `reports` into an xlsx workbook, one sheet per entry of
/// `sheet_order` that has a report. Entries without a report are skipped.
pub fn write_report(
    reports: &BTreeMap<String, PlantReport>,
    sheet_order: &[String],
) -> Result<Vec<u8>, IoError> {
    let mut workbook = build_workbook(reports, sheet_order)?;
    workbook
        .save_to_buffer()
        .map_err(|e| IoError::Write(format!("failed to save report: {e}")))
}

/// Same as [`write_report`], saved to `path`.
pub fn save_report(
    reports: &BTreeMap<String, PlantReport>,
    sheet_order: &[String],
    path: &Path,
) -> Result<(), IoError> {
    let mut workbook = build_workbook(reports, sheet_order)?;
    workbook
        .save(path)
        .map_err(|e| IoError::Write(format!("failed to save {}: {e}", path.display())))
}

fn build_workbook(
    reports: &BTreeMap<String, PlantReport>,
    sheet_order: &[String],
) -> Result<Workbook, IoError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let mut sheets = 0;

    for sheet_name in sheet_order {
        let Some(report) = reports.get(sheet_name) else {
            log::debug!("no report for sheet '{sheet_name}', skipped");
            continue;
        };
        let worksheet = workbook
            .add_worksheet()
            .set_name(sheet_name)
            .map_err(|e| IoError::Write(format!("failed to create sheet '{sheet_name}': {e}")))?;
        write_sheet(worksheet, sheet_name, report, &styles)?;
        sheets += 1;
    }

    if sheets == 0 {
        return Err(IoError::Write("no plant reports to write".into()));
    }

    log::info!("report built with {sheets} sheets");
    Ok(workbook)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    report: &PlantReport,
    styles: &Styles,
) -> Result<(), IoError> {
    let status_name = status_column(sheet_name);

    for (c, column) in report.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(c + 1)?, &column.name, &styles.header)?;
    }

    for (r, key) in report.row_keys.iter().enumerate() {
        let row = row_index(r + 1)?;
        match key {
            RowKey::Text(s) => {
                worksheet.write_string_with_format(row, 0, s, &styles.key)?;
            }
            RowKey::Number(n) => {
                worksheet.write_number_with_format(row, 0, *n, &styles.key)?;
            }
            RowKey::DateTime(dt) => {
                let format = if is_time_only(dt) { &styles.key_time } else { &styles.key_datetime };
                worksheet.write_number_with_format(row, 0, datetime_to_serial(dt), format)?;
            }
        }
    }

    for (c, column) in report.columns.iter().enumerate() {
        let col = col_index(c + 1)?;
        let is_status = column.name == status_name;
        for (r, cell) in column.cells.iter().enumerate() {
            let row = row_index(r + 1)?;
            match cell {
                ReportCell::Status(status) => {
                    let fill = match (is_status, status.is_success()) {
                        (false, _) => &styles.plain,
                        (true, true) => &styles.pass,
                        (true, false) => &styles.fail,
                    };
                    match status {
                        CellStatus::Success => {
                            worksheet.write_string_with_format(row, col, SUCCESS_MARKER, fill)?;
                        }
                        CellStatus::Mismatch(v) => {
                            worksheet.write_number_with_format(row, col, *v, fill)?;
                        }
                        CellStatus::Missing => {
                            worksheet.write_blank(row, col, fill)?;
                        }
                    }
                }
                ReportCell::Reading(Reading::Value(v)) => {
                    worksheet.write_number(row, col, *v)?;
                }
                ReportCell::Reading(Reading::Missing) => {}
                ReportCell::Reading(Reading::Text(s)) | ReportCell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
            }
        }
    }

    worksheet.set_freeze_panes(1, 1)?;
    worksheet.autofit();
    Ok(())
}

fn row_index(r: usize) -> Result<u32, IoError> {
    u32::try_from(r).map_err(|_| IoError::Write(format!("row {r} out of range")))
}

fn col_index(c: usize) -> Result<u16, IoError> {
    u16::try_from(c).map_err(|_| IoError::Write(format!("column {c} out of range")))
}

// ---------------------------------------------------------------------------
// Re-reading
// ---------------------------------------------------------------------------

/// A report worksheet read back into cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub row_keys: Vec<Cell>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportSheet {
    /// Cells of the column named `header`.
    pub fn column(&self, header: &str) -> Option<Vec<&Cell>> {
        let idx = self.headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(|row| row.get(idx).unwrap_or(&Cell::Empty)).collect())
    }

    /// (passed, failed) counts of the sheet's status column.
    pub fn status_counts(&self) -> (usize, usize) {
        let Some(cells) = self.column(&status_column(&self.name)) else {
            return (0, 0);
        };
        let passed = cells
            .iter()
            .filter(|c| matches!(c, Cell::Text(s) if s == SUCCESS_MARKER))
            .count();
        (passed, cells.len() - passed)
    }
}

/// Parse a report workbook back into its sheets, in workbook order.
pub fn read_report(bytes: &[u8]) -> Result<Vec<ReportSheet>, IoError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IoError::Open(e.to_string()))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(IoError::NoSheets);
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| IoError::Read(format!("sheet '{name}': {e}")))?;
        let raw = raw_from_range(&range);
        let mut rows = raw.rows.into_iter();

        let headers = rows
            .next()
            .map(|header| header.iter().skip(1).map(|c| c.to_string()).collect())
            .unwrap_or_default();

        let mut row_keys = Vec::new();
        let mut body = Vec::new();
        for mut row in rows {
            if row.is_empty() {
                continue;
            }
            let key = row.remove(0);
            row_keys.push(key);
            body.push(row);
        }

        sheets.push(ReportSheet {
            name,
            headers,
            row_keys,
            rows: body,
        });
    }

    Ok(sheets)
}
