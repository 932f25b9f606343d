use crate::error::ReconError;
use crate::model::{Reading, SeriesTable};

/// Two plants reported jointly by one source and separately by the other.
/// The absorbed plant's readings are added into the target plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    pub target: String,
    pub absorbed: String,
}

impl Default for MergeRule {
    fn default() -> Self {
        Self {
            target: "CETR".into(),
            absorbed: "CESM".into(),
        }
    }
}

/// Add `absorbed` into `target` row by row and drop `absorbed`.
///
/// A missing reading on either side leaves the merged reading missing.
/// Other columns keep their values and order.
pub fn merge_plants(table: &mut SeriesTable, rule: &MergeRule) -> Result<(), ReconError> {
    let target_idx = table
        .column_index(&rule.target)
        .ok_or_else(|| ReconError::MissingPlant(rule.target.clone()))?;
    let absorbed_idx = table
        .column_index(&rule.absorbed)
        .ok_or_else(|| ReconError::MissingPlant(rule.absorbed.clone()))?;

    if target_idx == absorbed_idx {
        return Ok(());
    }

    let absorbed = table.columns.remove(absorbed_idx);
    let target_idx = if absorbed_idx < target_idx { target_idx - 1 } else { target_idx };
    let target = &mut table.columns[target_idx];

    for (row, (value, extra)) in target.values.iter_mut().zip(&absorbed.values).enumerate() {
        let merged = match (&*value, extra) {
            (Reading::Value(a), Reading::Value(b)) => Reading::Value(a + b),
            (Reading::Text(s), _) => {
                return Err(non_numeric(&rule.target, table.row_keys.get(row), s));
            }
            (_, Reading::Text(s)) => {
                return Err(non_numeric(&rule.absorbed, table.row_keys.get(row), s));
            }
            _ => Reading::Missing,
        };
        *value = merged;
    }

    log::debug!("merged plant '{}' into '{}'", rule.absorbed, rule.target);
    Ok(())
}

fn non_numeric(plant: &str, row: Option<&crate::model::RowKey>, value: &str) -> ReconError {
    ReconError::NonNumeric {
        plant: plant.to_string(),
        row: row.map(|k| k.to_string()).unwrap_or_default(),
        value: value.to_string(),
    }
}
