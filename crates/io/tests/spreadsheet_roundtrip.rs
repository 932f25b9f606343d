use std::path::Path;

use genverify_io::report::{read_report, save_report, write_report};
use genverify_io::xlsx::{datetime_to_serial, read_series};
use genverify_io::IoError;
use genverify_recon::model::{Cell, Reading, RowKey, SUCCESS_MARKER};
use genverify_recon::{compare, partition, MergeRule, PlantOrder, ReconError};
use rust_xlsxwriter::{Format, Workbook};

fn timestamps() -> Vec<chrono::NaiveDateTime> {
    let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    vec![
        day.and_hms_opt(0, 30, 0).unwrap(),
        day.and_hms_opt(1, 0, 0).unwrap(),
        day.and_hms_opt(1, 30, 0).unwrap(),
    ]
}

/// Write a header-less grid: plants in row 1 from column B, timestamps in
/// column A from row 2.
fn write_grid(path: &Path, headers: &[&str], rows: &[Vec<f64>]) {
    let date = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, h) in headers.iter().enumerate() {
        sheet.write_string(0, c as u16 + 1, *h).unwrap();
    }
    for (r, (stamp, values)) in timestamps().iter().zip(rows).enumerate() {
        let row = r as u32 + 1;
        sheet.write_number_with_format(row, 0, datetime_to_serial(stamp), &date).unwrap();
        for (c, v) in values.iter().enumerate() {
            sheet.write_number(row, c as u16 + 1, *v).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

fn fixtures(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let pim = dir.join("pim.xlsx");
    let sager = dir.join("sager.xlsx");
    write_grid(
        &pim,
        &["CETR:Demanda Ativa Del", "CESM:Demanda Ativa Del", "CEAB:Demanda Ativa Del"],
        &[vec![5.0, 1.5, 20.0], vec![4.0, 2.0, 21.0], vec![3.0, 0.5, 19.5]],
    );
    write_grid(
        &sager,
        &["CEAB", "CETR"],
        &[vec![20.0, 6.5], vec![21.0, 10.0], vec![15.0, 3.5]],
    );
    (pim, sager)
}

#[test]
fn reads_annotated_grid_with_merge() {
    let dir = tempfile::tempdir().unwrap();
    let (pim, _) = fixtures(dir.path());

    let table = read_series(&pim, Some(&MergeRule::default())).unwrap();
    let plants: Vec<&str> = table.plants().collect();
    assert_eq!(plants, ["CETR", "CEAB"]);
    assert_eq!(
        table.column("CETR").unwrap().values,
        [Reading::Value(6.5), Reading::Value(6.0), Reading::Value(3.5)]
    );
    assert_eq!(table.row_keys[0], RowKey::DateTime(timestamps()[0]));
}

#[test]
fn missing_merge_column_is_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (_, sager) = fixtures(dir.path());
    let err = read_series(&sager, Some(&MergeRule::default())).unwrap_err();
    assert!(matches!(err, IoError::Parse(ReconError::MissingPlant(ref p)) if p == "CESM"));
}

#[test]
fn missing_file_is_open_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_series(&dir.path().join("nope.xlsx"), None).unwrap_err();
    assert!(matches!(err, IoError::Open(_)));
    assert!(err.is_input());
}

#[test]
fn report_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (pim, sager) = fixtures(dir.path());

    let pim = read_series(&pim, Some(&MergeRule::default())).unwrap();
    let sager = read_series(&sager, None).unwrap();
    let comparison = compare(&pim, &sager, 3.0).unwrap();
    let order = PlantOrder::parse("CETR,CEAB");
    let reports = partition(&comparison, &order);

    let bytes = write_report(&reports, order.configured()).unwrap();
    let sheets = read_report(&bytes).unwrap();
    assert_eq!(sheets.len(), 2);

    let cetr = &sheets[0];
    assert_eq!(cetr.name, "CETR");
    assert_eq!(cetr.headers, ["CETR PIM", "CETR SAGER", "CETR STATUS"]);
    let keys: Vec<Cell> = timestamps().into_iter().map(Cell::DateTime).collect();
    assert_eq!(cetr.row_keys, keys);
    assert_eq!(cetr.rows[0], [Cell::Number(6.5), Cell::Number(6.5), Cell::Text(SUCCESS_MARKER.into())]);
    assert_eq!(cetr.rows[1], [Cell::Number(6.0), Cell::Number(10.0), Cell::Number(6.0)]);
    assert_eq!(cetr.status_counts(), (2, 1));

    let ceab = &sheets[1];
    // 19.5 vs 15.0
    assert_eq!(ceab.rows[2][2], Cell::Number(19.5));
    assert_eq!(ceab.status_counts(), (2, 1));

    let out = dir.path().join("geracao_verificada.xlsx");
    save_report(&reports, order.configured(), &out).unwrap();
    assert!(out.exists());
}
