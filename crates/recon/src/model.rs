use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Text written in a status cell whose readings agree within tolerance.
pub const SUCCESS_MARKER: &str = "Dado Correto";

/// Column suffix for the reference (telemetry) readings.
pub const REFERENCE_SUFFIX: &str = "PIM";
/// Column suffix for the candidate (settlement) readings.
pub const CANDIDATE_SUFFIX: &str = "SAGER";
/// Column suffix for the per-cell verdict.
pub const STATUS_SUFFIX: &str = "STATUS";

pub fn reference_column(plant: &str) -> String {
    format!("{plant} {REFERENCE_SUFFIX}")
}

pub fn candidate_column(plant: &str) -> String {
    format!("{plant} {CANDIDATE_SUFFIX}")
}

pub fn status_column(plant: &str) -> String {
    format!("{plant} {STATUS_SUFFIX}")
}

/// Integers without decimals, everything else with the shortest exact form.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ---------------------------------------------------------------------------
// Raw grid
// ---------------------------------------------------------------------------

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Cell::DateTime(dt) => write!(f, "{}", format_datetime(dt)),
        }
    }
}

/// Grid exactly as read from the first worksheet. Row 0 is the header row,
/// column 0 the timestamp column.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }
}

// ---------------------------------------------------------------------------
// Normalized series
// ---------------------------------------------------------------------------

/// Opaque row identifier, usually a timestamp. Never reparsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowKey {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl From<&Cell> for RowKey {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Number(n) => RowKey::Number(*n),
            Cell::DateTime(dt) => RowKey::DateTime(*dt),
            other => RowKey::Text(other.to_string()),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Text(s) => write!(f, "{s}"),
            RowKey::Number(n) => write!(f, "{}", format_number(*n)),
            RowKey::DateTime(dt) => write!(f, "{}", format_datetime(dt)),
        }
    }
}

/// Spreadsheets store bare times as a datetime on the serial epoch day.
pub fn is_time_only(dt: &NaiveDateTime) -> bool {
    NaiveDate::from_ymd_opt(1899, 12, 30).is_some_and(|epoch| dt.date() == epoch)
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    if is_time_only(dt) {
        dt.format("%H:%M").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// One generation reading (MWh/h or MW).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Value(f64),
    Missing,
    /// Non-numeric content kept verbatim; rejected when compared.
    Text(String),
}

impl From<&Cell> for Reading {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Empty => Reading::Missing,
            Cell::Number(n) => Reading::Value(*n),
            other => Reading::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Value(v) => write!(f, "{}", format_number(*v)),
            Reading::Missing => Ok(()),
            Reading::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub plant: String,
    pub values: Vec<Reading>,
}

/// Readings keyed by row (timestamp) and plant. Plant identifiers are unique
/// and row order is the order of the source sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesTable {
    pub row_keys: Vec<RowKey>,
    pub columns: Vec<SeriesColumn>,
}

impl SeriesTable {
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    pub fn plants(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.plant.as_str())
    }

    pub fn column(&self, plant: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.plant == plant)
    }

    pub fn column_index(&self, plant: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.plant == plant)
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Per-cell verdict of a reference/candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CellStatus {
    Success,
    /// Readings differ by more than the tolerance; carries the reference
    /// reading rounded to 3 decimals.
    Mismatch(f64),
    /// No reference reading to compare.
    Missing,
}

impl CellStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CellStatus::Success)
    }
}

impl fmt::Display for CellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellStatus::Success => write!(f, "{SUCCESS_MARKER}"),
            CellStatus::Mismatch(v) => write!(f, "{}", format_number(*v)),
            CellStatus::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportCell {
    Reading(Reading),
    Status(CellStatus),
    Text(String),
}

impl fmt::Display for ReportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportCell::Reading(r) => write!(f, "{r}"),
            ReportCell::Status(s) => write!(f, "{s}"),
            ReportCell::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportColumn {
    pub name: String,
    pub cells: Vec<ReportCell>,
}

/// Reference and candidate readings side by side with a status column per
/// plant. Columns are sorted by full name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub row_keys: Vec<RowKey>,
    pub columns: Vec<ReportColumn>,
}

impl ComparisonTable {
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    pub fn column(&self, name: &str) -> Option<&ReportColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Plants that have a reference column, in lexicographic order.
    pub fn plants(&self) -> Vec<String> {
        let suffix = format!(" {REFERENCE_SUFFIX}");
        let mut plants: Vec<String> = self
            .columns
            .iter()
            .filter_map(|c| c.name.strip_suffix(&suffix).map(str::to_string))
            .collect();
        plants.sort();
        plants.dedup();
        plants
    }
}

/// One plant's slice of a comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantReport {
    pub plant: String,
    pub row_keys: Vec<RowKey>,
    pub columns: Vec<ReportColumn>,
}

impl PlantReport {
    pub fn column(&self, name: &str) -> Option<&ReportColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of status cells that did not pass.
    pub fn failures(&self) -> usize {
        self.column(&status_column(&self.plant))
            .map(|c| {
                c.cells
                    .iter()
                    .filter(|cell| matches!(cell, ReportCell::Status(s) if !s.is_success()))
                    .count()
            })
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Plant ordering
// ---------------------------------------------------------------------------

/// Configured plant list. Reports and sheets are labelled from this value:
/// `configured()` is the display order, `sorted()` the lexicographic order of
/// the identifiers, which is the order reports are keyed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlantOrder {
    configured: Vec<String>,
}

impl PlantOrder {
    /// Trims identifiers, drops blanks and keeps the first of any duplicate.
    pub fn new<I, S>(plants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut configured: Vec<String> = Vec::new();
        for plant in plants {
            let plant = plant.as_ref().trim();
            if !plant.is_empty() && !configured.iter().any(|p| p == plant) {
                configured.push(plant.to_string());
            }
        }
        Self { configured }
    }

    /// Parse a comma-delimited list such as `"CETR,CEAB,CEMA"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Every plant present in a comparison table, lexicographically.
    pub fn from_table(table: &ComparisonTable) -> Self {
        Self::new(table.plants())
    }

    pub fn configured(&self) -> &[String] {
        &self.configured
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut sorted = self.configured.clone();
        sorted.sort();
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.configured.is_empty()
    }

    pub fn len(&self) -> usize {
        self.configured.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_order_parse_trims_and_dedups() {
        let order = PlantOrder::parse(" CEMA, CETR,,CEMA ,CEAB");
        assert_eq!(order.configured(), ["CEMA", "CETR", "CEAB"]);
        assert_eq!(order.sorted(), ["CEAB", "CEMA", "CETR"]);
    }

    #[test]
    fn row_key_display() {
        let time = NaiveDate::from_ymd_opt(1899, 12, 30)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        assert_eq!(RowKey::DateTime(time).to_string(), "00:30");

        let stamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(13, 0, 0)
            .unwrap();
        assert_eq!(RowKey::DateTime(stamp).to_string(), "2024-05-01 13:00");
        assert_eq!(RowKey::Number(44000.0).to_string(), "44000");
    }

    #[test]
    fn status_display() {
        assert_eq!(CellStatus::Success.to_string(), SUCCESS_MARKER);
        assert_eq!(CellStatus::Mismatch(10.0).to_string(), "10");
        assert_eq!(CellStatus::Mismatch(10.125).to_string(), "10.125");
        assert_eq!(CellStatus::Missing.to_string(), "");
    }

    #[test]
    fn reading_from_cell() {
        assert_eq!(Reading::from(&Cell::Number(1.5)), Reading::Value(1.5));
        assert_eq!(Reading::from(&Cell::Empty), Reading::Missing);
        assert_eq!(Reading::from(&Cell::Text("n/a".into())), Reading::Text("n/a".into()));
    }

    #[test]
    fn table_plants_from_reference_columns() {
        let col = |name: &str| ReportColumn { name: name.into(), cells: vec![] };
        let table = ComparisonTable {
            row_keys: vec![],
            columns: vec![
                col("B PIM"),
                col("B SAGER"),
                col("B STATUS"),
                col("A PIM"),
                col("A SAGER"),
                col("A STATUS"),
            ],
        };
        assert_eq!(table.plants(), ["A", "B"]);
    }
}
