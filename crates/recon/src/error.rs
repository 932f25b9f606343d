use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Grid has no header row, no plant columns or no data rows.
    EmptySheet(String),
    /// A row does not have as many cells as the header row.
    RaggedRow { row: usize, expected: usize, found: usize },
    /// Header cell is blank once the annotation is stripped.
    EmptyPlantId { column: usize },
    /// The same plant identifier appears twice in one table.
    DuplicatePlant(String),
    /// A plant required by a merge rule or by the reference table is absent.
    MissingPlant(String),
    /// A reading that should be numeric holds text.
    NonNumeric { plant: String, row: String, value: String },
    /// Positional alignment requires equal row counts.
    RowCountMismatch { reference: usize, candidate: usize },
    /// Row-key join: a reference row has no candidate counterpart.
    RowKeyMismatch(String),
    /// Row-key join: the same key appears twice on one side.
    DuplicateRowKey { side: &'static str, key: String },
    /// Tolerance is negative, NaN or infinite.
    InvalidTolerance(f64),
    /// Comparison columns do not follow the 3-per-plant sorted layout.
    StrideMismatch(String),
}

/// Pipeline stage an engine error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Parse,
    Comparison,
}

impl ReconError {
    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::EmptySheet(_)
            | Self::RaggedRow { .. }
            | Self::EmptyPlantId { .. }
            | Self::DuplicatePlant(_) => ErrorStage::Parse,
            Self::MissingPlant(_)
            | Self::NonNumeric { .. }
            | Self::RowCountMismatch { .. }
            | Self::RowKeyMismatch(_)
            | Self::DuplicateRowKey { .. }
            | Self::InvalidTolerance(_)
            | Self::StrideMismatch(_) => ErrorStage::Comparison,
        }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySheet(msg) => write!(f, "empty sheet: {msg}"),
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row}: expected {expected} cells, found {found}")
            }
            Self::EmptyPlantId { column } => {
                write!(f, "column {column}: empty plant identifier in header row")
            }
            Self::DuplicatePlant(plant) => write!(f, "duplicate plant identifier '{plant}'"),
            Self::MissingPlant(plant) => write!(f, "plant '{plant}' not found"),
            Self::NonNumeric { plant, row, value } => {
                write!(f, "plant '{plant}', row '{row}': non-numeric value '{value}'")
            }
            Self::RowCountMismatch { reference, candidate } => write!(
                f,
                "row count mismatch: reference has {reference} rows, candidate has {candidate}"
            ),
            Self::RowKeyMismatch(key) => write!(f, "row '{key}' missing from candidate"),
            Self::DuplicateRowKey { side, key } => {
                write!(f, "{side}: row key '{key}' appears more than once")
            }
            Self::InvalidTolerance(tol) => {
                write!(f, "tolerance must be a finite non-negative number, got {tol}")
            }
            Self::StrideMismatch(msg) => write!(f, "column layout mismatch: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
