use serde::Serialize;

use crate::model::{status_column, CellStatus, ComparisonTable, ReportCell};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlantSummary {
    pub plant: String,
    pub checked: usize,
    pub passed: usize,
    pub mismatched: usize,
    pub missing: usize,
}

impl PlantSummary {
    pub fn failed(&self) -> usize {
        self.mismatched + self.missing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub rows: usize,
    pub checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub plants: Vec<PlantSummary>,
}

impl ComparisonSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Count pass/fail cells per plant.
pub fn compute_summary(table: &ComparisonTable) -> ComparisonSummary {
    let mut summary = ComparisonSummary {
        rows: table.row_count(),
        ..Default::default()
    };

    for plant in table.plants() {
        let mut ps = PlantSummary {
            plant: plant.clone(),
            ..Default::default()
        };
        if let Some(column) = table.column(&status_column(&plant)) {
            for cell in &column.cells {
                let ReportCell::Status(status) = cell else {
                    continue;
                };
                ps.checked += 1;
                match status {
                    CellStatus::Success => ps.passed += 1,
                    CellStatus::Mismatch(_) => ps.mismatched += 1,
                    CellStatus::Missing => ps.missing += 1,
                }
            }
        }
        summary.checked += ps.checked;
        summary.passed += ps.passed;
        summary.failed += ps.failed();
        summary.plants.push(ps);
    }

    summary
}
