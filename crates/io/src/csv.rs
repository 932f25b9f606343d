// CSV export of a full comparison table

use std::io::Write;

use genverify_recon::model::ComparisonTable;

use crate::error::IoError;

/// Write `table` as CSV: an unnamed row-key column, then every comparison
/// column in table order. Status cells use the success marker text or the
/// reference value.
pub fn write_comparison_csv<W: Write>(table: &ComparisonTable, writer: W) -> Result<(), IoError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push(String::new());
    header.extend(table.columns.iter().map(|c| c.name.clone()));
    csv_writer
        .write_record(&header)
        .map_err(|e| IoError::Write(format!("CSV write error: {}", e)))?;

    for (r, key) in table.row_keys.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(key.to_string());
        for column in &table.columns {
            record.push(column.cells.get(r).map(|c| c.to_string()).unwrap_or_default());
        }
        csv_writer
            .write_record(&record)
            .map_err(|e| IoError::Write(format!("CSV write error: {}", e)))?;
    }

    csv_writer
        .flush()
        .map_err(|e| IoError::Write(format!("CSV flush error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genverify_recon::model::{CellStatus, Reading, ReportCell, ReportColumn, RowKey};

    #[test]
    fn csv_layout() {
        let table = ComparisonTable {
            row_keys: vec![RowKey::Text("00:30".into()), RowKey::Text("01:00".into())],
            columns: vec![
                ReportColumn {
                    name: "A PIM".into(),
                    cells: vec![
                        ReportCell::Reading(Reading::Value(10.0)),
                        ReportCell::Reading(Reading::Missing),
                    ],
                },
                ReportColumn {
                    name: "A STATUS".into(),
                    cells: vec![
                        ReportCell::Status(CellStatus::Success),
                        ReportCell::Status(CellStatus::Mismatch(2.25)),
                    ],
                },
            ],
        };

        let mut out = Vec::new();
        write_comparison_csv(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, ",A PIM,A STATUS\n00:30,10,Dado Correto\n01:00,,2.25\n");
    }
}
