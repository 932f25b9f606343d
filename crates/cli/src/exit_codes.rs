//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (every compared cell within tolerance)       |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad arguments)                      |
//! | 3    | Run completed, mismatches found                      |
//! | 4    | An input file is missing                             |
//! | 5    | An input could not be parsed                         |
//! | 6    | The inputs could not be compared                     |
//! | 7    | The report could not be written                      |
//! | 8    | Configuration could not be saved or is invalid       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use genverify_cli::RunError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// The report was written but at least one cell failed.
pub const EXIT_MISMATCH: u8 = 3;

/// PIM or SAGER input not found or empty.
pub const EXIT_INPUT_MISSING: u8 = 4;

/// Input unreadable or not a valid series grid.
pub const EXIT_PARSE: u8 = 5;

/// Row counts, plants or values do not line up.
pub const EXIT_COMPARISON: u8 = 6;

/// Report workbook could not be built or saved.
pub const EXIT_FORMAT: u8 = 7;

/// Settings rejected or not writable.
pub const EXIT_CONFIG: u8 = 8;

pub fn run_exit_code(err: &RunError) -> u8 {
    match err {
        RunError::InputMissing(_) => EXIT_INPUT_MISSING,
        RunError::Parse { .. } => EXIT_PARSE,
        RunError::Comparison(_) => EXIT_COMPARISON,
        RunError::Format(_) => EXIT_FORMAT,
    }
}
