use std::collections::BTreeMap;

use crate::error::ReconError;
use crate::model::{
    candidate_column, reference_column, status_column, ComparisonTable, PlantOrder, PlantReport,
};

/// Split a generation comparison table into one report per plant.
///
/// Reports are keyed by plant and iterate in lexicographic order, the same
/// order the comparison columns are sorted in. Each report holds exactly the
/// plant's `PIM`, `SAGER` and `STATUS` columns. Configured plants with no
/// columns in the table are skipped.
pub fn partition(table: &ComparisonTable, order: &PlantOrder) -> BTreeMap<String, PlantReport> {
    let mut reports = BTreeMap::new();

    for plant in order.sorted() {
        let names = [
            reference_column(&plant),
            candidate_column(&plant),
            status_column(&plant),
        ];
        let columns: Vec<_> = names.iter().filter_map(|n| table.column(n)).cloned().collect();
        if columns.len() != names.len() {
            log::warn!("plant '{plant}' not present in comparison, skipped");
            continue;
        }
        reports.insert(
            plant.clone(),
            PlantReport {
                plant,
                row_keys: table.row_keys.clone(),
                columns,
            },
        );
    }

    reports
}

/// Verify the sorted layout: columns `3i..3i+3` belong to the `i`-th plant
/// when plants are ordered by their column names. That order differs from
/// `order.sorted()` once an identifier continues another past a space
/// (`"CEAB 2 PIM"` sorts before `"CEAB PIM"`).
pub fn check_stride(table: &ComparisonTable, order: &PlantOrder) -> Result<(), ReconError> {
    let mut sorted = order.configured().to_vec();
    sorted.sort_by_cached_key(|plant| reference_column(plant));
    if table.columns.len() != sorted.len() * 3 {
        return Err(ReconError::StrideMismatch(format!(
            "{} columns for {} plants",
            table.columns.len(),
            sorted.len()
        )));
    }

    for (plant, chunk) in sorted.iter().zip(table.columns.chunks(3)) {
        let expected = [
            reference_column(plant),
            candidate_column(plant),
            status_column(plant),
        ];
        for (want, got) in expected.iter().zip(chunk) {
            if *want != got.name {
                return Err(ReconError::StrideMismatch(format!(
                    "expected column '{want}', found '{}'",
                    got.name
                )));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Operational restrictions
// ---------------------------------------------------------------------------

/// Fields of an operational restriction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionField {
    StartTime,
    EndTime,
    Reason,
    Origin,
    Limitation,
}

impl RestrictionField {
    pub const ALL: [RestrictionField; 5] = [
        Self::StartTime,
        Self::EndTime,
        Self::Reason,
        Self::Origin,
        Self::Limitation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::StartTime => "HORA-INÍCIO",
            Self::EndTime => "HORA-FIM",
            Self::Reason => "RAZÃO",
            Self::Origin => "ORIGEM",
            Self::Limitation => "LIMITAÇÃO",
        }
    }
}

/// Column template of a restriction report: the five status columns, then
/// the SIGO/SAGER pair of each field.
pub fn restriction_columns(plant: &str) -> Vec<String> {
    let mut names = Vec::with_capacity(15);
    for field in RestrictionField::ALL {
        names.push(format!("{plant} {} STATUS", field.label()));
    }
    for field in RestrictionField::ALL {
        names.push(format!("{plant} {} SIGO", field.label()));
        names.push(format!("{plant} {} SAGER", field.label()));
    }
    names
}

/// Select the template columns of `plant` that exist in `table`, in template
/// order.
pub fn partition_restrictions(table: &ComparisonTable, plant: &str) -> PlantReport {
    let columns = restriction_columns(plant)
        .iter()
        .filter_map(|name| table.column(name))
        .cloned()
        .collect();
    PlantReport {
        plant: plant.to_string(),
        row_keys: table.row_keys.clone(),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportCell, ReportColumn, RowKey};

    fn col(name: &str) -> ReportColumn {
        ReportColumn {
            name: name.into(),
            cells: vec![ReportCell::Text(name.into())],
        }
    }

    fn generation_table(plants: &[&str]) -> ComparisonTable {
        let mut columns: Vec<ReportColumn> = plants
            .iter()
            .flat_map(|p| [col(&format!("{p} PIM")), col(&format!("{p} SAGER")), col(&format!("{p} STATUS"))])
            .collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));
        ComparisonTable {
            row_keys: vec![RowKey::Text("00:30".into())],
            columns,
        }
    }

    #[test]
    fn three_plants_nine_columns() {
        let table = generation_table(&["CETR", "CEAB", "CEMA"]);
        let order = PlantOrder::parse("CETR,CEAB,CEMA");
        let reports = partition(&table, &order);

        let keys: Vec<&str> = reports.keys().map(String::as_str).collect();
        assert_eq!(keys, ["CEAB", "CEMA", "CETR"]);
        for (plant, report) in &reports {
            assert_eq!(
                report.column_names(),
                [
                    format!("{plant} PIM"),
                    format!("{plant} SAGER"),
                    format!("{plant} STATUS")
                ]
            );
        }
        assert!(check_stride(&table, &order).is_ok());
    }

    #[test]
    fn unknown_configured_plant_skipped() {
        let table = generation_table(&["CEAB"]);
        let reports = partition(&table, &PlantOrder::parse("CEAB,GONE"));
        assert_eq!(reports.len(), 1);
        assert!(reports.contains_key("CEAB"));
    }

    #[test]
    fn prefix_plant_names_stay_separate() {
        let table = generation_table(&["A", "AB"]);
        let order = PlantOrder::parse("AB,A");
        let reports = partition(&table, &order);
        assert_eq!(reports["A"].column_names(), ["A PIM", "A SAGER", "A STATUS"]);
        assert_eq!(reports["AB"].column_names(), ["AB PIM", "AB SAGER", "AB STATUS"]);
        assert!(check_stride(&table, &order).is_ok());
    }

    #[test]
    fn space_suffixed_plant_follows_column_order() {
        let table = generation_table(&["CEAB", "CEAB 2"]);
        assert_eq!(table.columns[0].name, "CEAB 2 PIM");

        let order = PlantOrder::parse("CEAB,CEAB 2");
        assert!(check_stride(&table, &order).is_ok());

        let reports = partition(&table, &order);
        assert_eq!(reports["CEAB"].column_names(), ["CEAB PIM", "CEAB SAGER", "CEAB STATUS"]);
        assert_eq!(
            reports["CEAB 2"].column_names(),
            ["CEAB 2 PIM", "CEAB 2 SAGER", "CEAB 2 STATUS"]
        );
    }

    #[test]
    fn stride_mismatch_detected() {
        let table = generation_table(&["CEAB", "CETR"]);
        assert!(matches!(
            check_stride(&table, &PlantOrder::parse("CEAB")),
            Err(ReconError::StrideMismatch(_))
        ));
        assert!(matches!(
            check_stride(&table, &PlantOrder::parse("CEAB,CEXX")),
            Err(ReconError::StrideMismatch(_))
        ));
    }

    #[test]
    fn restriction_template_order() {
        let names = restriction_columns("CETR");
        assert_eq!(names.len(), 15);
        assert_eq!(names[0], "CETR HORA-INÍCIO STATUS");
        assert_eq!(names[4], "CETR LIMITAÇÃO STATUS");
        assert_eq!(names[5], "CETR HORA-INÍCIO SIGO");
        assert_eq!(names[14], "CETR LIMITAÇÃO SAGER");
    }

    #[test]
    fn restriction_subset_in_template_order() {
        let table = ComparisonTable {
            row_keys: vec![RowKey::Text("1".into())],
            columns: vec![
                col("CETR RAZÃO SAGER"),
                col("CEAB RAZÃO SAGER"),
                col("CETR HORA-FIM STATUS"),
                col("CETR RAZÃO SIGO"),
            ],
        };
        let report = partition_restrictions(&table, "CETR");
        assert_eq!(
            report.column_names(),
            ["CETR HORA-FIM STATUS", "CETR RAZÃO SIGO", "CETR RAZÃO SAGER"]
        );
        assert!(report.columns.len() <= 15);
    }
}
