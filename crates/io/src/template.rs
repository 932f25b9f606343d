// Blank settlement-entry template: one column per plant, one row per
// half-hour of the day.

use rust_xlsxwriter::{Format, FormatBorder, Workbook};

use crate::error::IoError;

pub const TEMPLATE_SHEET: &str = "SAGER - GER. VERIFICADA";

/// The 48 half-hour labels of a day, `00:30` through `23:30`, closing with
/// `00:00` for the last interval.
pub fn half_hour_labels() -> Vec<String> {
    (1..=48)
        .map(|slot: u32| {
            let minutes = (slot * 30) % (24 * 60);
            format!("{:02}:{:02}", minutes / 60, minutes % 60)
        })
        .collect()
}

/// Build the template workbook for `plants`.
pub fn write_template(plants: &[String]) -> Result<Vec<u8>, IoError> {
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(TEMPLATE_SHEET)?;

    for (c, plant) in plants.iter().enumerate() {
        let col = u16::try_from(c + 1).map_err(|_| IoError::Write("too many plants".into()))?;
        worksheet.write_string_with_format(0, col, plant, &header)?;
    }
    for (r, label) in half_hour_labels().iter().enumerate() {
        worksheet.write_string_with_format(r as u32 + 1, 0, label, &header)?;
    }
    worksheet.set_freeze_panes(1, 1)?;

    workbook
        .save_to_buffer()
        .map_err(|e| IoError::Write(format!("failed to save template: {e}")))
}
