//! One verification run: read both inputs, reconcile, partition, format.
//!
//! A run either produces a complete [`RunOutput`] or fails with a single
//! [`RunError`] naming the stage that failed. Nothing partial escapes.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use genverify_config::{AlignmentSetting, Settings};
use genverify_io::{read_series, read_series_bytes, write_report, IoError};
use genverify_recon::{
    compare_with, compute_summary, partition, Alignment, CompareOptions, ComparisonSummary,
    ComparisonTable, MergeRule, PlantOrder, PlantReport, SeriesTable,
};

/// Which of the two inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pim,
    Sager,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Pim => write!(f, "PIM"),
            Source::Sager => write!(f, "SAGER"),
        }
    }
}

/// An uploaded spreadsheet, on disk or already in memory.
#[derive(Debug, Clone)]
pub enum InputFile {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl InputFile {
    fn is_missing(&self) -> bool {
        match self {
            InputFile::Path(path) => !path.is_file(),
            InputFile::Bytes(bytes) => bytes.is_empty(),
        }
    }

    fn read(&self, merge: Option<&MergeRule>) -> Result<SeriesTable, IoError> {
        match self {
            InputFile::Path(path) => read_series(path, merge),
            InputFile::Bytes(bytes) => read_series_bytes(bytes, merge),
        }
    }
}

impl From<PathBuf> for InputFile {
    fn from(path: PathBuf) -> Self {
        InputFile::Path(path)
    }
}

impl From<Vec<u8>> for InputFile {
    fn from(bytes: Vec<u8>) -> Self {
        InputFile::Bytes(bytes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// An input was not supplied (no file, or an empty upload).
    InputMissing(Source),
    /// An input could not be opened or is not a valid series grid.
    Parse { source: Source, reason: String },
    /// The two tables cannot be reconciled.
    Comparison(String),
    /// The report artifact could not be built.
    Format(String),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::InputMissing(source) => write!(f, "{source} input missing"),
            RunError::Parse { source, reason } => {
                write!(f, "failed to read {source} input: {reason}")
            }
            RunError::Comparison(reason) => write!(f, "comparison failed: {reason}"),
            RunError::Format(reason) => write!(f, "report generation failed: {reason}"),
        }
    }
}

impl std::error::Error for RunError {}

/// Everything a run needs besides the two inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    pub options: CompareOptions,
    /// Applied to the PIM input only
    pub merge: Option<MergeRule>,
    /// Sheet order. Empty means every plant of the comparison, sorted.
    pub plants: PlantOrder,
}

impl Default for RunParams {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RunParams {
    pub fn from_settings(settings: &Settings) -> Self {
        let alignment = match settings.alignment {
            AlignmentSetting::Positional => Alignment::Positional,
            AlignmentSetting::RowKey => Alignment::RowKey,
        };
        let merge = settings.merge.enabled.then(|| MergeRule {
            target: settings.merge.target.clone(),
            absorbed: settings.merge.absorbed.clone(),
        });
        Self {
            options: CompareOptions {
                tolerance: settings.tolerance_generation,
                alignment,
            },
            merge,
            plants: PlantOrder::new(settings.plant_list()),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub comparison: ComparisonTable,
    pub reports: BTreeMap<String, PlantReport>,
    /// Sheet names of `artifact`, in workbook order
    pub sheet_order: Vec<String>,
    pub summary: ComparisonSummary,
    /// The formatted xlsx report
    pub artifact: Vec<u8>,
}

/// Run the full pipeline on `pim` (reference) and `sager` (candidate).
pub fn execute(pim: &InputFile, sager: &InputFile, params: &RunParams) -> Result<RunOutput, RunError> {
    if pim.is_missing() {
        return Err(RunError::InputMissing(Source::Pim));
    }
    if sager.is_missing() {
        return Err(RunError::InputMissing(Source::Sager));
    }

    let reference = pim
        .read(params.merge.as_ref())
        .map_err(|e| parse_error(Source::Pim, e))?;
    let candidate = sager.read(None).map_err(|e| parse_error(Source::Sager, e))?;

    let comparison = compare_with(&reference, &candidate, &params.options)
        .map_err(|e| RunError::Comparison(e.to_string()))?;

    let order = if params.plants.is_empty() {
        PlantOrder::from_table(&comparison)
    } else {
        params.plants.clone()
    };
    let reports = partition(&comparison, &order);
    let sheet_order: Vec<String> = order
        .configured()
        .iter()
        .filter(|p| reports.contains_key(*p))
        .cloned()
        .collect();

    let artifact = write_report(&reports, &sheet_order).map_err(|e| RunError::Format(e.to_string()))?;
    let summary = compute_summary(&comparison);

    log::info!(
        "run complete: {} sheets, {} of {} cells passed",
        sheet_order.len(),
        summary.passed,
        summary.checked
    );

    Ok(RunOutput {
        comparison,
        reports,
        sheet_order,
        summary,
        artifact,
    })
}

fn parse_error(source: Source, err: IoError) -> RunError {
    log::debug!("{source} input rejected: {err:?}");
    RunError::Parse {
        source,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_follow_settings() {
        let mut settings = Settings::default();
        settings.tolerance_generation = 1.0;
        settings.alignment = AlignmentSetting::RowKey;
        settings.merge.enabled = false;
        settings.plants = "CEMA, CEAB".into();

        let params = RunParams::from_settings(&settings);
        assert_eq!(params.options.tolerance, 1.0);
        assert_eq!(params.options.alignment, Alignment::RowKey);
        assert_eq!(params.merge, None);
        assert_eq!(params.plants.configured(), ["CEMA", "CEAB"]);
    }

    #[test]
    fn default_params_merge_cetr() {
        let params = RunParams::default();
        assert_eq!(params.merge, Some(MergeRule::default()));
        assert_eq!(params.options.tolerance, 3.0);
        assert!(params.plants.is_empty());
    }

    #[test]
    fn missing_inputs_reported_by_source() {
        let params = RunParams::default();
        let err = execute(&InputFile::Bytes(Vec::new()), &InputFile::Bytes(vec![1]), &params).unwrap_err();
        assert_eq!(err, RunError::InputMissing(Source::Pim));

        let err = execute(
            &InputFile::Bytes(vec![1]),
            &InputFile::Path(PathBuf::from("/nonexistent/sager.xlsx")),
            &params,
        )
        .unwrap_err();
        assert_eq!(err, RunError::InputMissing(Source::Sager));
    }

    #[test]
    fn unreadable_input_is_parse_error() {
        let err = execute(
            &InputFile::Bytes(b"garbage".to_vec()),
            &InputFile::Bytes(b"garbage".to_vec()),
            &RunParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Parse { source: Source::Pim, .. }));
        assert!(err.to_string().starts_with("failed to read PIM input"));
    }
}
