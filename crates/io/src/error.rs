use std::fmt;

use genverify_recon::ReconError;

#[derive(Debug)]
pub enum IoError {
    /// File could not be opened or is not a spreadsheet.
    Open(String),
    /// Workbook has no worksheets.
    NoSheets,
    /// A worksheet could not be read.
    Read(String),
    /// Grid was read but is not a valid series layout.
    Parse(ReconError),
    /// Artifact could not be built or written.
    Write(String),
}

impl IoError {
    /// True for every failure that happens while reading an input.
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::Write(_))
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(msg) => write!(f, "cannot open spreadsheet: {msg}"),
            Self::NoSheets => write!(f, "spreadsheet contains no sheets"),
            Self::Read(msg) => write!(f, "cannot read sheet: {msg}"),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Write(msg) => write!(f, "cannot write spreadsheet: {msg}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReconError> for IoError {
    fn from(err: ReconError) -> Self {
        Self::Parse(err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for IoError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(err.to_string())
    }
}
